use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub notifications: NotificationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Seconds in-flight requests get to finish after SIGTERM/SIGINT.
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct NotificationConfig {
    /// Appended to the client-facing message of every 500 response.
    #[serde(default)]
    pub internal_error_notice: String,
}

fn default_shutdown_timeout() -> u64 {
    10
}

fn default_connect_timeout() -> u64 {
    30
}

impl Config {
    pub fn from_toml() -> anyhow::Result<Self> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        use std::io::ErrorKind;

        let config_result = std::fs::read_to_string(&config_path);

        let mut config: Config = match config_result {
            Ok(config_str) => toml::from_str(&config_str)
                .with_context(|| format!("failed to parse {config_path}"))?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                // No config file: build from environment variables and defaults.
                fn get_env(name: &str) -> Option<String> {
                    env::var(name).ok()
                }
                fn get_env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
                    env::var(name)
                        .ok()
                        .and_then(|v| v.parse::<T>().ok())
                        .unwrap_or(default)
                }

                let database_url = get_env("DATABASE_URL")
                    .context("DATABASE_URL is not set and no config.toml was found")?;

                Config {
                    server: ServerConfig {
                        host: get_env("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                        port: get_env_parse("SERVER_PORT", 8080u16),
                        shutdown_timeout: get_env_parse(
                            "SERVER_SHUTDOWN_TIMEOUT",
                            default_shutdown_timeout(),
                        ),
                    },
                    database: DatabaseConfig {
                        url: database_url,
                        max_connections: get_env_parse("DB_MAX_CONNECTIONS", 10u32),
                        connect_timeout: get_env_parse(
                            "DB_CONNECT_TIMEOUT",
                            default_connect_timeout(),
                        ),
                    },
                    notifications: NotificationConfig {
                        internal_error_notice: get_env("INTERNAL_ERROR_NOTICE")
                            .unwrap_or_default(),
                    },
                }
            }
            Err(e) => {
                return Err(e).with_context(|| format!("failed to read {config_path}"));
            }
        };

        // Environment overrides win even when the file exists.
        if let Ok(v) = env::var("SERVER_HOST") {
            config.server.host = v;
        }
        if let Ok(v) = env::var("SERVER_PORT")
            && let Ok(p) = v.parse()
        {
            config.server.port = p;
        }
        if let Ok(v) = env::var("SERVER_SHUTDOWN_TIMEOUT")
            && let Ok(t) = v.parse()
        {
            config.server.shutdown_timeout = t;
        }
        if let Ok(v) = env::var("DATABASE_URL") {
            config.database.url = v;
        }
        if let Ok(v) = env::var("DB_MAX_CONNECTIONS")
            && let Ok(mc) = v.parse()
        {
            config.database.max_connections = mc;
        }
        if let Ok(v) = env::var("DB_CONNECT_TIMEOUT")
            && let Ok(t) = v.parse()
        {
            config.database.connect_timeout = t;
        }
        if let Ok(v) = env::var("INTERNAL_ERROR_NOTICE") {
            config.notifications.internal_error_notice = v;
        }

        if config.notifications.internal_error_notice.is_empty() {
            log::warn!(
                "INTERNAL_ERROR_NOTICE is not set. The notice is optional, but you may want an \
                 extra note on 500 responses (e.g. 'Please notify the administrator.')"
            );
        }

        Ok(config)
    }
}
