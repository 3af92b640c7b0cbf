//! Axum router construction.
//!
//! [`build`] assembles the complete application router, including:
//! - Middleware layers (CORS, per-request trace-ID injection)
//! - Optional OpenAPI document (disable with `DISHA_ENABLE_OPENAPI=false`)
//! - Health route
//! - Chat and history routes

mod chat;
pub mod doc;
mod health;
mod history;

use std::sync::Arc;

use axum::routing::get;
use axum::{middleware, Json, Router};
use tower::ServiceBuilder;

use crate::middleware::{cors, trace};
use crate::state::AppState;

/// Build the complete Axum [`Router`] for the application.
pub fn build(state: Arc<AppState>) -> Router {
    let mut app = Router::new()
        .merge(health::router())
        .merge(chat::router())
        .merge(history::router());

    if state.config.enable_openapi {
        let api_doc = doc::get_docs();
        app = app.route(
            "/api-docs/openapi.json",
            get(move || {
                let api_doc = api_doc.clone();
                async move { Json(api_doc) }
            }),
        );
    }

    app
        // Outermost layers execute first on the way in.
        .layer(ServiceBuilder::new().layer(cors::cors_layer(&state.config)))
        .layer(middleware::from_fn(trace::trace_middleware))
        .with_state(state)
}

#[cfg(test)]
pub(crate) mod testing {
    //! Router fixtures backed by an in-memory store and a scripted model.

    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::Router;
    use disha_app_core::llm::{ChatModel, ModelError, ModelReply, Turn};
    use disha_app_core::services::ChatService;
    use disha_app_core::SqliteStore;
    use http_body_util::BodyExt;
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::config::Config;
    use crate::state::AppState;

    pub enum ScriptedModel {
        Reply(&'static str),
        Fail { status: u16, message: &'static str },
    }

    impl ScriptedModel {
        pub fn replying(text: &'static str) -> Arc<Self> {
            Arc::new(Self::Reply(text))
        }

        pub fn failing(status: u16, message: &'static str) -> Arc<Self> {
            Arc::new(Self::Fail { status, message })
        }
    }

    #[async_trait]
    impl ChatModel for ScriptedModel {
        async fn generate(&self, _system: &str, _turns: &[Turn]) -> Result<ModelReply, ModelError> {
            match self {
                Self::Reply(text) => Ok(ModelReply {
                    text: (*text).to_owned(),
                    finish_reason: Some("STOP".into()),
                }),
                Self::Fail { status, message } => Err(ModelError::Api {
                    status: *status,
                    message: (*message).to_owned(),
                }),
            }
        }
    }

    pub async fn test_app(model: Arc<ScriptedModel>) -> Router {
        test_app_with(Config::for_tests(), model).await
    }

    pub async fn test_app_with(config: Config, model: Arc<ScriptedModel>) -> Router {
        let store = Arc::new(SqliteStore::connect_in_memory().await.unwrap());
        let chat = ChatService::new(Arc::clone(&store), model, Arc::from("You are Disha."));
        super::build(Arc::new(AppState::new(config, chat, store)))
    }

    pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    pub async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        send(app, request).await
    }

    pub async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
        send(app, Request::get(uri).body(Body::empty()).unwrap()).await
    }
}
