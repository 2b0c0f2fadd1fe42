use actix_web::{App, HttpServer, web};
use anyhow::Context;
use chrono::Local; // timestamp in log lines
use env_logger::{Env, Target};
use std::io::Write; // for env_logger custom formatter

use subtrack_backend::{
    config::Config,
    database::{create_pool, run_migrations},
    error::ErrorEncoder,
    handlers,
    middlewares::{RequestLogger, create_cors},
    services::SubscribeService,
    swagger::swagger_config,
};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let ts = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");
            let level = record.level().as_str().to_ascii_lowercase();
            let msg_json = serde_json::to_string(&format!("{}", record.args()))
                .unwrap_or_else(|_| "\"<invalid utf8>\"".to_string());
            writeln!(
                buf,
                "{{\"timestamp\":\"{}\",\"level\":\"{}\",\"message\":{},\"target\":\"{}\"}}",
                ts,
                level,
                msg_json,
                record.target(),
            )
        })
        .target(Target::Stdout)
        .init();

    let config = Config::from_toml().context("failed to load configuration")?;

    let pool = create_pool(&config.database)
        .await
        .context("failed to create database connection pool")?;

    run_migrations(&pool)
        .await
        .context("failed to run database migrations")?;

    let subscribe_service = SubscribeService::new(pool);
    let error_encoder = ErrorEncoder::new(config.notifications.internal_error_notice.clone());

    log::info!(
        "Starting HTTP server at {}:{}",
        config.server.host,
        config.server.port
    );

    let shutdown_timeout = config.server.shutdown_timeout;
    HttpServer::new(move || {
        App::new()
            .wrap(create_cors())
            .wrap(RequestLogger)
            .app_data(web::Data::new(subscribe_service.clone()))
            .app_data(web::Data::new(error_encoder.clone()))
            .configure(swagger_config)
            .service(web::scope("/api/v1").configure(handlers::subscribe_config))
            .default_service(web::route().to(handlers::subscribe::not_found))
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .shutdown_timeout(shutdown_timeout)
    .run()
    .await?;

    Ok(())
}
