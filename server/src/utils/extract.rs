use axum::extract::FromRequest;

use crate::utils::error::AppError;

/// `axum::Json` with malformed bodies reported as `ValidationError`.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);
