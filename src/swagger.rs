use actix_web::web;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::error::ErrorBody;
use crate::handlers;
use crate::models::SubscribeDto;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::subscribe::create,
        handlers::subscribe::get_by_id,
        handlers::subscribe::list,
        handlers::subscribe::update_put,
        handlers::subscribe::update_patch,
        handlers::subscribe::delete,
    ),
    components(schemas(SubscribeDto, ErrorBody)),
    tags(
        (name = "subscribe", description = "Subscription records")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    );
}
