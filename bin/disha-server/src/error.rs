//! Unified server error type.
//!
//! Every handler returns `Result<T, ServerError>`, which implements
//! [`axum::response::IntoResponse`] so errors are rendered in the same
//! `{status, message, data, error}` envelope as successful responses.
//!
//! Internal errors (storage, migrations) are logged with full detail; the
//! client only sees a generic `INTERNAL_ERROR`.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use disha_app_core::CoreError;
use thiserror::Error;
use tracing::{error, warn};

use crate::schemas::response::ApiResponse;

/// All errors that can occur in the disha-server request lifecycle.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The caller sent an invalid or malformed request.
    #[error("{code}: {detail}")]
    Validation { code: &'static str, detail: String },

    /// The request body or query string could not be extracted.
    ///
    /// `status` is 400 for malformed input, or the more specific status
    /// axum reported (413 oversized body, 415 wrong content type).
    #[error("rejected request ({status}): {detail}")]
    Rejected { status: StatusCode, detail: String },

    /// The caller referenced a resource that does not exist.
    #[error("{code}: {detail}")]
    NotFound { code: &'static str, detail: String },

    /// Propagated from the core services.
    #[error(transparent)]
    Core(CoreError),

    /// An unclassified internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServerError {
    pub fn validation(code: &'static str, detail: impl Into<String>) -> Self {
        ServerError::Validation { code, detail: detail.into() }
    }

    /// Keep 413 and 415 as reported; every other rejection is a plain 400.
    fn rejected(status: StatusCode, detail: String) -> Self {
        let status = match status {
            StatusCode::PAYLOAD_TOO_LARGE | StatusCode::UNSUPPORTED_MEDIA_TYPE => status,
            _ => StatusCode::BAD_REQUEST,
        };
        ServerError::Rejected { status, detail }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, message, code, detail) = match self {
            ServerError::Validation { code, detail } => {
                (StatusCode::BAD_REQUEST, "Validation error", code, detail)
            }
            ServerError::Rejected { status, detail } => {
                (status, "Invalid request", "INVALID_REQUEST", detail)
            }
            ServerError::NotFound { code, detail } => {
                (StatusCode::NOT_FOUND, "Not found", code, detail)
            }
            ServerError::Core(e) => {
                error!(error = %e, "core service error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error",
                    "INTERNAL_ERROR",
                    "internal server error".to_owned(),
                )
            }
            ServerError::Internal(m) => {
                error!(message = %m, "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error",
                    "INTERNAL_ERROR",
                    "internal server error".to_owned(),
                )
            }
        };
        (status, Json(ApiResponse::<()>::failure(message, code, detail))).into_response()
    }
}

impl From<CoreError> for ServerError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::UserNotFound(id) => ServerError::NotFound {
                code: "USER_NOT_FOUND",
                detail: format!("User {id} not found"),
            },
            other => ServerError::Core(other),
        }
    }
}

impl From<JsonRejection> for ServerError {
    fn from(rejection: JsonRejection) -> Self {
        warn!(error = %rejection, status = rejection.status().as_u16(), "rejected request body");
        ServerError::rejected(rejection.status(), rejection.body_text())
    }
}

impl From<QueryRejection> for ServerError {
    fn from(rejection: QueryRejection) -> Self {
        warn!(error = %rejection, "rejected query string");
        ServerError::rejected(rejection.status(), rejection.body_text())
    }
}

impl From<validator::ValidationErrors> for ServerError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ServerError::validation("VALIDATION_ERROR", errors.to_string())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use http_body_util::BodyExt;
    use serde_json::Value;

    async fn render(err: ServerError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn validation_error_envelope() {
        let (status, body) =
            render(ServerError::validation("EMPTY_MESSAGE", "Message cannot be empty")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], false);
        assert_eq!(body["message"], "Validation error");
        assert_eq!(body["data"], Value::Null);
        assert_eq!(body["error"]["code"], "EMPTY_MESSAGE");
        assert_eq!(body["error"]["detail"], "Message cannot be empty");
    }

    #[tokio::test]
    async fn rejection_keeps_specific_status() {
        let (status, body) =
            render(ServerError::rejected(StatusCode::PAYLOAD_TOO_LARGE, "too big".into())).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body["message"], "Invalid request");
        assert_eq!(body["error"]["code"], "INVALID_REQUEST");

        let (status, _) = render(ServerError::rejected(
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            "Expected request with `Content-Type: application/json`".into(),
        ))
        .await;
        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);

        let (status, _) =
            render(ServerError::rejected(StatusCode::UNPROCESSABLE_ENTITY, "missing field".into()))
                .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unknown_user_maps_to_404() {
        let (status, body) = render(CoreError::UserNotFound(9).into()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "USER_NOT_FOUND");
    }

    #[tokio::test]
    async fn internal_detail_is_not_leaked() {
        let (status, body) = render(ServerError::Internal("/var/lib/disha.db locked".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["code"], "INTERNAL_ERROR");
        assert_eq!(body["error"]["detail"], "internal server error");
    }
}
