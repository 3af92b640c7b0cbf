//! `Json` / `Query` extractors whose rejections render as [`ServerError`].

use axum::extract::{FromRequest, FromRequestParts};

use crate::error::ServerError;

#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ServerError))]
pub struct AppJson<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ServerError))]
pub struct AppQuery<T>(pub T);
