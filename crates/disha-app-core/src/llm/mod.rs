//! Language-model seam.
//!
//! The orchestrator only talks to [`ChatModel`]; [`GeminiClient`] is the
//! production implementation. Tests substitute a scripted model.

pub mod gemini;

pub use gemini::{GeminiClient, GeminiConfig};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};
use thiserror::Error;

use crate::entities::Sender;

/// Role of a conversation turn as the model sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

impl From<Sender> for Role {
    fn from(sender: Sender) -> Self {
        match sender {
            Sender::User => Role::User,
            // Everything that is not the user speaks as the model.
            _ => Role::Model,
        }
    }
}

/// One role-tagged text supplied to the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub role: Role,
    pub text: String,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self { role: Role::User, text: text.into() }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self { role: Role::Model, text: text.into() }
    }
}

/// What the model produced for a single generation call.
///
/// An empty `text` means the output was blocked or withheld; `finish_reason`
/// then carries the model-reported cause when there is one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelReply {
    pub text: String,
    pub finish_reason: Option<String>,
}

/// Failures raised by a model invocation.
#[derive(Debug, Error)]
pub enum ModelError {
    /// The request never produced an HTTP response (DNS, TLS, timeout, ...).
    #[error("request to Gemini API failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("Gemini API returned HTTP {status}: {message}")]
    Api { status: u16, message: String },

    /// The API answered 2xx but the body was not a generateContent response.
    #[error("invalid Gemini response: {0}")]
    InvalidResponse(String),
}

/// A language model that turns a system instruction plus ordered turns into text.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn generate(
        &self,
        system_instruction: &str,
        turns: &[Turn],
    ) -> Result<ModelReply, ModelError>;
}
