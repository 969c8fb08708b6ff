use axum::extract::FromRequest;

use crate::error::AppError;

/// `axum::Json` whose rejections render as `{"message": ...}` with a 400.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);
