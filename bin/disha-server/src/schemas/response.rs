//! The envelope wrapped around every response body.

use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// Machine-readable code, e.g. `EMPTY_MESSAGE`.
    pub code: String,
    pub detail: String,
}

/// `{status, message, data, error}`; `data` and `error` serialize as `null`
/// when absent.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub status: bool,
    pub message: String,
    pub data: Option<T>,
    pub error: Option<ApiError>,
}

impl<T> ApiResponse<T> {
    pub fn success(message: &str, data: T) -> Json<Self> {
        Json(Self {
            status: true,
            message: message.to_owned(),
            data: Some(data),
            error: None,
        })
    }

    pub fn failure(message: &str, code: &str, detail: impl Into<String>) -> Self {
        Self {
            status: false,
            message: message.to_owned(),
            data: None,
            error: Some(ApiError {
                code: code.to_owned(),
                detail: detail.into(),
            }),
        }
    }
}
