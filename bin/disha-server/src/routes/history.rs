use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;
use validator::Validate;

use crate::error::ServerError;
use crate::extract::AppQuery;
use crate::schemas::history::{HistoryData, HistoryQuery};
use crate::schemas::response::ApiResponse;
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(paths(get_history), components(schemas(HistoryData)))]
pub struct HistoryApi;

/// Register history routes.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/chat/history", get(get_history))
}

/// Page backwards through a user's messages.
///
/// Pass the smallest `id` of the current page as `before_id` to load the
/// previous page.
#[utoipa::path(
    get,
    path = "/chat/history",
    tag = "chat",
    params(HistoryQuery),
    responses(
        (status = 200, description = "History page", body = ApiResponse<HistoryData>),
        (status = 400, description = "Invalid query", body = ApiResponse<HistoryData>),
        (status = 500, description = "Storage error", body = ApiResponse<HistoryData>),
    )
)]
pub async fn get_history(
    State(state): State<Arc<AppState>>,
    AppQuery(query): AppQuery<HistoryQuery>,
) -> Result<Json<ApiResponse<HistoryData>>, ServerError> {
    query.validate()?;
    let limit = u32::try_from(query.limit)
        .map_err(|_| ServerError::Internal(format!("limit {} out of range", query.limit)))?;

    let page = state
        .history
        .get_history(query.user_id, query.before_id, limit)
        .await?;
    Ok(ApiResponse::success(
        "Chat history fetched successfully",
        HistoryData {
            messages: page.messages.into_iter().map(Into::into).collect(),
            has_more: page.has_more,
        },
    ))
}

// ── Tests ──────────────────────────────────────────────────────────────────────
