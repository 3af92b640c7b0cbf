//! Request/response DTOs shared by the route handlers and the OpenAPI document.

pub mod chat;
pub mod history;
pub mod response;
