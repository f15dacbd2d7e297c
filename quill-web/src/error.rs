//! Translation from the error taxonomy to HTTP responses
//!
//! Handlers bubble `QuillError` up with `?`; this wrapper decides the status
//! code and a client-safe body. Storage internals are logged, never echoed.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
};
use quill_core::QuillError;
use serde_json::json;

/// Wrapper turning a `QuillError` into an HTTP response
#[derive(Debug)]
pub struct ApiError(pub QuillError);

impl From<QuillError> for ApiError {
    fn from(err: QuillError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        err.log();

        let (status, error_code, message) = match &err {
            QuillError::Validation { message, field, .. } => {
                let detail = match field {
                    Some(field) => format!("{} ({})", message, field),
                    None => message.clone(),
                };
                (StatusCode::UNPROCESSABLE_ENTITY, "validation_failed", detail)
            }
            QuillError::Duplicate { field, .. } if field.as_str() == "email" => (
                StatusCode::CONFLICT,
                "duplicate_email",
                "This email is already registered - log in instead".to_string(),
            ),
            QuillError::Duplicate { field, .. } if field.as_str() == "title" => (
                StatusCode::CONFLICT,
                "duplicate_title",
                "A post with this title already exists".to_string(),
            ),
            QuillError::Duplicate { .. } => (
                StatusCode::CONFLICT,
                "duplicate",
                "The value is already taken".to_string(),
            ),
            QuillError::NotFound { resource, .. } => (
                StatusCode::NOT_FOUND,
                "not_found",
                format!("{} does not exist", resource),
            ),
            QuillError::AuthenticationRequired { message, .. } => (
                StatusCode::UNAUTHORIZED,
                "authentication_required",
                message.clone(),
            ),
            QuillError::Forbidden { message, .. } => {
                (StatusCode::FORBIDDEN, "forbidden", message.clone())
            }
            QuillError::Integrity { message, .. } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "integrity_violation",
                message.clone(),
            ),
            QuillError::Unavailable { .. } => (
                StatusCode::SERVICE_UNAVAILABLE,
                "storage_unavailable",
                "The service is temporarily busy, retry shortly".to_string(),
            ),
            // Storage, Config, Io, Serialization: internals stay server-side
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "Internal server error".to_string(),
            ),
        };

        let retry_after_secs = err
            .retry_delay_ms()
            .map(|ms| ms.div_ceil(1000).max(1));

        let body = Json(json!({
            "error": error_code,
            "message": message,
        }));

        let mut response = (status, body).into_response();
        if let Some(secs) = retry_after_secs {
            let value = HeaderValue::from_str(&secs.to_string())
                .unwrap_or_else(|_| HeaderValue::from_static("1"));
            response.headers_mut().insert(header::RETRY_AFTER, value);
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_core::ErrorContext;

    #[test]
    fn not_found_maps_to_404() {
        let response = ApiError(QuillError::NotFound {
            resource: "post 42".to_string(),
            context: ErrorContext::new("test"),
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn unavailable_maps_to_503_with_retry_hint() {
        let response = ApiError(QuillError::Unavailable {
            message: "pool exhausted".to_string(),
            retry_after_ms: Some(500),
            context: ErrorContext::new("test"),
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            response.headers().get(header::RETRY_AFTER).map(|v| v.to_str().unwrap()),
            Some("1")
        );
    }

    #[test]
    fn storage_details_are_not_exposed() {
        let response = ApiError(QuillError::Storage {
            message: "UNIQUE constraint failed: secret internals".to_string(),
            source: None,
            context: ErrorContext::new("repository"),
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
