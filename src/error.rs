use actix_web::HttpResponse;
use actix_web::http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("The fields 'service_name', 'price', 'user_id' and 'start_date' are required")]
    MissingRequiredFields,

    #[error("The field 'end_date' should not be before the 'start_date'")]
    InvalidDateRange,

    #[error("{0}")]
    InvalidQuery(String),

    #[error("The request body must be in JSON format")]
    InvalidContentType,

    #[error("Incorrect JSON body")]
    InvalidBody(String),

    #[error("Incorrect id in the URL path. Please specify a positive number")]
    InvalidId(String),

    #[error("the subscribe with id = {0} is not found")]
    NotFound(i64),

    #[error("URL not found")]
    UrlNotFound,

    #[error("{context}")]
    Store {
        context: String,
        #[source]
        source: sea_orm::DbErr,
    },

    #[error("Failed to serialize a response")]
    Serialize(#[from] serde_json::Error),
}

impl AppError {
    pub fn store(context: impl Into<String>, source: sea_orm::DbErr) -> Self {
        AppError::Store {
            context: context.into(),
            source,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::MissingRequiredFields
            | AppError::InvalidDateRange
            | AppError::InvalidQuery(_)
            | AppError::InvalidContentType
            | AppError::InvalidBody(_)
            | AppError::InvalidId(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) | AppError::UrlNotFound => StatusCode::NOT_FOUND,
            AppError::Store { .. } | AppError::Serialize(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Diagnostic string for the access log. Client-caused decode failures
    /// carry the decoder message, store failures the driver message.
    /// Serialization failures stay opaque: their detail never leaves the
    /// process.
    pub fn detail(&self) -> String {
        match self {
            AppError::InvalidBody(detail) | AppError::InvalidId(detail) => detail.clone(),
            AppError::Store { source, .. } => source.to_string(),
            _ => String::new(),
        }
    }
}

/// Wire shape of every error response. `full_error_message` is populated
/// while the response travels through the request logger and is blanked
/// before the body reaches the client.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct ErrorBody {
    pub status_code: u16,
    pub error_message: String,
    #[serde(default)]
    pub full_error_message: String,
}

/// Renders `AppError`s into HTTP responses. Built once at startup from the
/// configured operator notice and shared as app data.
#[derive(Debug, Clone, Default)]
pub struct ErrorEncoder {
    notice: String,
}

impl ErrorEncoder {
    pub fn new(notice: impl Into<String>) -> Self {
        Self {
            notice: notice.into(),
        }
    }

    pub fn body(&self, err: &AppError) -> ErrorBody {
        let status = err.status_code();
        let mut message = err.to_string();
        if status == StatusCode::INTERNAL_SERVER_ERROR && !self.notice.is_empty() {
            message = format!("{message}. {}", self.notice);
        }
        ErrorBody {
            status_code: status.as_u16(),
            error_message: message,
            full_error_message: err.detail(),
        }
    }

    pub fn render(&self, err: &AppError) -> HttpResponse {
        let status = err.status_code();
        if status.is_server_error() {
            log::error!("{err}: {}", err.detail());
        } else if status == StatusCode::BAD_REQUEST {
            log::warn!("{err}");
        }
        HttpResponse::build(status).json(self.body(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_error() -> AppError {
        AppError::store(
            "Failed to create the subscribe",
            sea_orm::DbErr::Custom("connection refused".to_string()),
        )
    }

    #[test]
    fn client_errors_map_to_400() {
        for err in [
            AppError::MissingRequiredFields,
            AppError::InvalidDateRange,
            AppError::InvalidQuery("bad".to_string()),
            AppError::InvalidContentType,
            AppError::InvalidBody("eof".to_string()),
            AppError::InvalidId("nan".to_string()),
        ] {
            assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn not_found_maps_to_404() {
        assert_eq!(AppError::NotFound(7).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::UrlNotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::NotFound(7).to_string(),
            "the subscribe with id = 7 is not found"
        );
    }

    #[test]
    fn store_and_serialize_errors_map_to_500() {
        assert_eq!(
            store_error().status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert_eq!(
            AppError::from(json_err).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn serialize_failure_suppresses_detail() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert_eq!(AppError::from(json_err).detail(), "");
    }

    #[test]
    fn notice_is_appended_to_500_messages_only() {
        let encoder = ErrorEncoder::new("Please notify the administrator.");

        let body = encoder.body(&store_error());
        assert_eq!(
            body.error_message,
            "Failed to create the subscribe. Please notify the administrator."
        );
        assert_eq!(body.full_error_message, "connection refused");

        let body = encoder.body(&AppError::MissingRequiredFields);
        assert!(!body.error_message.contains("administrator"));
    }

    #[test]
    fn unconfigured_notice_leaves_the_message_alone() {
        let body = ErrorEncoder::default().body(&store_error());
        assert_eq!(body.error_message, "Failed to create the subscribe");
    }

    #[test]
    fn error_body_always_carries_all_three_fields() {
        let value =
            serde_json::to_value(ErrorEncoder::default().body(&AppError::UrlNotFound)).unwrap();
        assert_eq!(value["status_code"], 404);
        assert_eq!(value["error_message"], "URL not found");
        assert_eq!(value["full_error_message"], "");
    }
}
