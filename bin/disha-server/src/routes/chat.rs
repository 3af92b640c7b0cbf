use std::sync::Arc;

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use tracing::debug;
use utoipa::OpenApi;

use crate::error::ServerError;
use crate::extract::AppJson;
use crate::schemas::chat::{ChatInitData, ChatInitRequest, ChatMessageRequest, MessageDto};
use crate::schemas::response::{ApiError, ApiResponse};
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(init_chat, send_message),
    components(schemas(
        ChatInitRequest,
        ChatMessageRequest,
        ChatInitData,
        MessageDto,
        ApiError
    ))
)]
pub struct ChatApi;

/// Register chat routes.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/chat/init", post(init_chat))
        .route("/chat/message", post(send_message))
}

/// Resume a conversation, or start one with a greeting.
#[utoipa::path(
    post,
    path = "/chat/init",
    tag = "chat",
    request_body = ChatInitRequest,
    responses(
        (status = 200, description = "Chat initialized", body = ApiResponse<ChatInitData>),
        (status = 400, description = "Malformed body", body = ApiResponse<ChatInitData>),
        (status = 500, description = "Storage error", body = ApiResponse<ChatInitData>),
    )
)]
pub async fn init_chat(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<ChatInitRequest>,
) -> Result<Json<ApiResponse<ChatInitData>>, ServerError> {
    let (message, user_id) = state.chat.init_chat(req.user_id).await?;
    Ok(ApiResponse::success(
        "Chat initialized successfully",
        ChatInitData {
            user_id,
            message: message.into(),
        },
    ))
}

/// Send one user message and get the stored assistant reply.
#[utoipa::path(
    post,
    path = "/chat/message",
    tag = "chat",
    request_body = ChatMessageRequest,
    responses(
        (status = 200, description = "Message processed", body = ApiResponse<MessageDto>),
        (status = 400, description = "Empty or malformed message", body = ApiResponse<MessageDto>),
        (status = 404, description = "Unknown user", body = ApiResponse<MessageDto>),
        (status = 500, description = "Storage error", body = ApiResponse<MessageDto>),
    )
)]
pub async fn send_message(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<ChatMessageRequest>,
) -> Result<Json<ApiResponse<MessageDto>>, ServerError> {
    if req.message.trim().is_empty() {
        debug!(user_id = req.user_id, "rejected empty message");
        return Err(ServerError::validation("EMPTY_MESSAGE", "Message cannot be empty"));
    }

    let reply = state.chat.send_message(req.user_id, &req.message).await?;
    Ok(ApiResponse::success("Message processed successfully", reply.into()))
}

// ── Tests ──────────────────────────────────────────────────────────────────────
