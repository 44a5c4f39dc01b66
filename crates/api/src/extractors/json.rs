//! JSON body extractor whose rejections use the API error shape.

use axum::extract::FromRequest;

use crate::error::ApiError;

/// Like [`axum::Json`], but malformed or mistyped bodies become a 400
/// `validation_error` instead of axum's plain-text rejection.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);
