use actix_web::body::{self, BoxBody, MessageBody};
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready};
use actix_web::http::StatusCode;
use actix_web::web::Bytes;
use actix_web::Error;
use futures_util::future::LocalBoxFuture;
use std::future::{Ready, ready};

use crate::error::ErrorBody;

/// What was sent to the client, captured for the access log. Starts in the
/// pending state and is finalized exactly once with the response the
/// downstream handler produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessRecord {
    pub status_code: StatusCode,
    pub status_line: String,
}

impl AccessRecord {
    pub fn pending() -> Self {
        Self {
            status_code: StatusCode::OK,
            status_line: "OK".to_string(),
        }
    }

    /// Records the response status and, when the body carries the error
    /// shape, folds its messages into the status line. Returns the
    /// client-facing body: diagnostic detail is blanked before it leaves
    /// the server. Anything that is not an error body passes through
    /// untouched and the line degrades to the bare status text.
    pub fn finalize(&mut self, status: StatusCode, body: &[u8]) -> Option<Bytes> {
        self.status_code = status;
        self.status_line = status
            .canonical_reason()
            .map(str::to_string)
            .unwrap_or_else(|| status.as_u16().to_string());

        let Ok(mut err_body) = serde_json::from_slice::<ErrorBody>(body) else {
            return None;
        };
        if err_body.error_message.is_empty() {
            return None;
        }

        self.status_line.push_str(": ");
        self.status_line.push_str(&err_body.error_message);
        if !err_body.full_error_message.is_empty() {
            self.status_line.push_str(": ");
            self.status_line.push_str(&err_body.full_error_message);
        }

        err_body.full_error_message.clear();
        match serde_json::to_vec(&err_body) {
            Ok(redacted) => Some(Bytes::from(redacted)),
            // fails closed
            Err(_) => None,
        }
    }
}

/// Emits one access-log line per request: method, path, numeric status and
/// the composite status line extracted from the response.
pub struct RequestLogger;

impl<S, B> Transform<S, ServiceRequest> for RequestLogger
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type InitError = ();
    type Transform = RequestLoggerService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestLoggerService { service }))
    }
}

pub struct RequestLoggerService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for RequestLoggerService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let fut = self.service.call(req);
        Box::pin(async move {
            let res = fut.await?;
            let method = res.request().method().clone();
            let path = res.request().path().to_owned();

            let (req, res) = res.into_parts();
            let status = res.status();
            let (head, res_body) = res.into_parts();
            let bytes = body::to_bytes(res_body)
                .await
                .unwrap_or_else(|_| Bytes::new());

            let mut record = AccessRecord::pending();
            let client_body = record.finalize(status, &bytes).unwrap_or(bytes);

            log::info!(
                "{} {}: {} - {}",
                method,
                path,
                record.status_code.as_u16(),
                record.status_line
            );

            let res = head.set_body(client_body);
            Ok(ServiceResponse::new(req, res).map_into_boxed_body())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_pending_with_ok() {
        let record = AccessRecord::pending();
        assert_eq!(record.status_code, StatusCode::OK);
        assert_eq!(record.status_line, "OK");
    }

    #[test]
    fn error_body_builds_a_composite_line_and_is_redacted() {
        let body = serde_json::to_vec(&ErrorBody {
            status_code: 404,
            error_message: "the subscribe with id = 7 is not found".to_string(),
            full_error_message: "record not found".to_string(),
        })
        .unwrap();

        let mut record = AccessRecord::pending();
        let redacted = record
            .finalize(StatusCode::NOT_FOUND, &body)
            .expect("error bodies are rewritten");

        assert_eq!(record.status_code, StatusCode::NOT_FOUND);
        assert_eq!(
            record.status_line,
            "Not Found: the subscribe with id = 7 is not found: record not found"
        );

        let client: ErrorBody = serde_json::from_slice(&redacted).unwrap();
        assert_eq!(
            client.error_message,
            "the subscribe with id = 7 is not found"
        );
        assert_eq!(client.full_error_message, "");
    }

    #[test]
    fn error_body_without_detail_keeps_a_short_line() {
        let body = serde_json::to_vec(&ErrorBody {
            status_code: 400,
            error_message: "URL not found".to_string(),
            full_error_message: String::new(),
        })
        .unwrap();

        let mut record = AccessRecord::pending();
        record.finalize(StatusCode::BAD_REQUEST, &body);
        assert_eq!(record.status_line, "Bad Request: URL not found");
    }

    #[test]
    fn success_bodies_pass_through_untouched() {
        let body = br#"{"id":1,"service_name":"Netflix","price":199}"#;
        let mut record = AccessRecord::pending();
        assert!(record.finalize(StatusCode::OK, body).is_none());
        assert_eq!(record.status_line, "OK");
    }

    #[test]
    fn empty_bodies_degrade_to_the_bare_status_text() {
        let mut record = AccessRecord::pending();
        assert!(record.finalize(StatusCode::NO_CONTENT, b"").is_none());
        assert_eq!(record.status_code, StatusCode::NO_CONTENT);
        assert_eq!(record.status_line, "No Content");
    }

    #[test]
    fn unparseable_bodies_never_error() {
        let mut record = AccessRecord::pending();
        assert!(
            record
                .finalize(StatusCode::INTERNAL_SERVER_ERROR, b"not json at all")
                .is_none()
        );
        assert_eq!(record.status_line, "Internal Server Error");
    }
}
