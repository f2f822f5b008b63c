//! HTTP request handlers.
//!
//! This module contains all the endpoint handlers for the gateway API.

pub mod accounts;
pub mod health;
pub mod profile;
pub mod tokens;

use axum::extract::FromRequest;

use crate::error::ApiError;

/// JSON body extractor. Oversized bodies answer `413 Payload Too Large`,
/// every other rejection `400 Bad Request`.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ValidJson<T>(pub T);
