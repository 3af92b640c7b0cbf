//! Health / heartbeat endpoint.

use std::sync::Arc;

use axum::routing::get;
use axum::{Json, Router};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};

use crate::schemas::response::ApiResponse;
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(paths(get_health), components(schemas(HealthData)))]
pub struct HealthApi;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthData {
    pub service: String,
    /// Current UTC time, RFC 3339.
    pub timestamp: String,
}

/// Register health-check routes.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(get_health))
}

/// Heartbeat endpoint.
///
/// Always 200; no dependency is checked.
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = ApiResponse<HealthData>)
    )
)]
pub async fn get_health() -> Json<ApiResponse<HealthData>> {
    ApiResponse::success(
        "Service is healthy",
        HealthData {
            service: "disha-api".to_owned(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        },
    )
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use super::*;
    use chrono::DateTime;

    #[tokio::test]
    async fn health_names_the_service() {
        let Json(body) = get_health().await;
        assert!(body.status);
        assert_eq!(body.message, "Service is healthy");
        assert_eq!(body.data.map(|d| d.service).as_deref(), Some("disha-api"));
    }

    #[tokio::test]
    async fn health_timestamp_is_rfc3339() {
        let Json(body) = get_health().await;
        let timestamp = body.data.map(|d| d.timestamp).unwrap_or_default();
        assert!(DateTime::parse_from_rfc3339(&timestamp).is_ok());
    }
}
