use actix_web::http::header::{self, ContentType};
use actix_web::{HttpRequest, HttpResponse, web};

use crate::error::{AppError, AppResult, ErrorBody, ErrorEncoder};
use crate::models::{ListFilter, ListQuery, SubscribeDto};
use crate::services::SubscribeService;

const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Mutating endpoints insist on the exact JSON content type.
fn require_json(req: &HttpRequest) -> AppResult<()> {
    let matches = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value == JSON_CONTENT_TYPE);
    if matches {
        Ok(())
    } else {
        Err(AppError::InvalidContentType)
    }
}

fn parse_id(raw: &str) -> AppResult<i64> {
    match raw.parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        Ok(id) => Err(AppError::InvalidId(format!("id = {id} is not positive"))),
        Err(e) => Err(AppError::InvalidId(e.to_string())),
    }
}

fn decode_body(body: &web::Bytes) -> AppResult<SubscribeDto> {
    serde_json::from_slice(body).map_err(|e| AppError::InvalidBody(e.to_string()))
}

#[utoipa::path(
    post,
    path = "/subscribes",
    tag = "subscribe",
    request_body = SubscribeDto,
    responses(
        (status = 201, description = "Subscription created"),
        (status = 400, description = "Invalid payload", body = ErrorBody),
        (status = 500, description = "Store failure", body = ErrorBody)
    )
)]
pub async fn create(
    service: web::Data<SubscribeService>,
    encoder: web::Data<ErrorEncoder>,
    req: HttpRequest,
    body: web::Bytes,
) -> HttpResponse {
    create_inner(&service, &req, &body)
        .await
        .unwrap_or_else(|e| encoder.render(&e))
}

async fn create_inner(
    service: &SubscribeService,
    req: &HttpRequest,
    body: &web::Bytes,
) -> AppResult<HttpResponse> {
    require_json(req)?;
    let dto = decode_body(body)?;
    service.create(&dto).await?;
    Ok(HttpResponse::Created().finish())
}

#[utoipa::path(
    get,
    path = "/subscribes/{id}",
    tag = "subscribe",
    params(("id" = i64, Path, description = "Subscription id")),
    responses(
        (status = 200, description = "The subscription", body = SubscribeDto),
        (status = 400, description = "Invalid id", body = ErrorBody),
        (status = 404, description = "No such subscription", body = ErrorBody)
    )
)]
pub async fn get_by_id(
    service: web::Data<SubscribeService>,
    encoder: web::Data<ErrorEncoder>,
    path: web::Path<String>,
) -> HttpResponse {
    get_by_id_inner(&service, &path)
        .await
        .unwrap_or_else(|e| encoder.render(&e))
}

async fn get_by_id_inner(service: &SubscribeService, raw_id: &str) -> AppResult<HttpResponse> {
    let id = parse_id(raw_id)?;
    let dto = service.find_by_id(id).await?;
    let body = serde_json::to_vec(&dto)?;
    Ok(HttpResponse::Ok()
        .content_type(ContentType::json())
        .body(body))
}

#[utoipa::path(
    get,
    path = "/subscribe",
    tag = "subscribe",
    params(
        ("sort" = Option<String>, Query, description = "USER_ID or SERVICE_NAME, case-insensitive"),
        ("value" = Option<String>, Query, description = "Exact value the sort field must equal")
    ),
    responses(
        (status = 200, description = "Matching subscriptions", body = [SubscribeDto]),
        (status = 400, description = "Invalid query pair", body = ErrorBody)
    )
)]
pub async fn list(
    service: web::Data<SubscribeService>,
    encoder: web::Data<ErrorEncoder>,
    query: web::Query<ListQuery>,
) -> HttpResponse {
    list_inner(&service, &query)
        .await
        .unwrap_or_else(|e| encoder.render(&e))
}

async fn list_inner(service: &SubscribeService, query: &ListQuery) -> AppResult<HttpResponse> {
    let filter = ListFilter::resolve(&query.sort, &query.value)?;
    let subscribes = service.list(&filter).await?;
    let body = serde_json::to_vec(&subscribes)?;
    Ok(HttpResponse::Ok()
        .content_type(ContentType::json())
        .body(body))
}

#[utoipa::path(
    put,
    path = "/subscribes/{id}",
    tag = "subscribe",
    params(("id" = i64, Path, description = "Subscription id")),
    request_body = SubscribeDto,
    responses(
        (status = 204, description = "Subscription replaced"),
        (status = 400, description = "Invalid payload", body = ErrorBody),
        (status = 404, description = "No such subscription", body = ErrorBody)
    )
)]
pub async fn update_put(
    service: web::Data<SubscribeService>,
    encoder: web::Data<ErrorEncoder>,
    req: HttpRequest,
    path: web::Path<String>,
    body: web::Bytes,
) -> HttpResponse {
    update_inner(&service, &req, &path, &body, false)
        .await
        .unwrap_or_else(|e| encoder.render(&e))
}

#[utoipa::path(
    patch,
    path = "/subscribes/{id}",
    tag = "subscribe",
    params(("id" = i64, Path, description = "Subscription id")),
    request_body = SubscribeDto,
    responses(
        (status = 204, description = "Subscription updated"),
        (status = 400, description = "Invalid payload", body = ErrorBody),
        (status = 404, description = "No such subscription", body = ErrorBody)
    )
)]
pub async fn update_patch(
    service: web::Data<SubscribeService>,
    encoder: web::Data<ErrorEncoder>,
    req: HttpRequest,
    path: web::Path<String>,
    body: web::Bytes,
) -> HttpResponse {
    update_inner(&service, &req, &path, &body, true)
        .await
        .unwrap_or_else(|e| encoder.render(&e))
}

async fn update_inner(
    service: &SubscribeService,
    req: &HttpRequest,
    raw_id: &str,
    body: &web::Bytes,
    partial: bool,
) -> AppResult<HttpResponse> {
    require_json(req)?;
    let id = parse_id(raw_id)?;
    let dto = decode_body(body)?;
    service.update(id, &dto, partial).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[utoipa::path(
    delete,
    path = "/subscribes/{id}",
    tag = "subscribe",
    params(("id" = i64, Path, description = "Subscription id")),
    responses(
        (status = 204, description = "Subscription deleted"),
        (status = 400, description = "Invalid id", body = ErrorBody),
        (status = 404, description = "No such subscription", body = ErrorBody)
    )
)]
pub async fn delete(
    service: web::Data<SubscribeService>,
    encoder: web::Data<ErrorEncoder>,
    path: web::Path<String>,
) -> HttpResponse {
    delete_inner(&service, &path)
        .await
        .unwrap_or_else(|e| encoder.render(&e))
}

async fn delete_inner(service: &SubscribeService, raw_id: &str) -> AppResult<HttpResponse> {
    let id = parse_id(raw_id)?;
    service.delete(id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Default service for anything the routes above do not match.
pub async fn not_found(encoder: web::Data<ErrorEncoder>) -> HttpResponse {
    encoder.render(&AppError::UrlNotFound)
}

pub fn subscribe_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/subscribes")
            .route("", web::post().to(create))
            .route("/{id}", web::get().to(get_by_id))
            .route("/{id}", web::put().to(update_put))
            .route("/{id}", web::patch().to(update_patch))
            .route("/{id}", web::delete().to(delete)),
    )
    .service(web::scope("/subscribe").route("", web::get().to(list)));
}
