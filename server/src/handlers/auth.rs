use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use serde::Deserialize;
use tower_sessions::Session;

use crate::auth::AdminPrincipal;
use crate::routes::AppState;
use crate::utils::response::message;
use crate::utils::{ApiJson, AppError};

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

pub async fn login(
    State(state): State<AppState>,
    session: Session,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> Result<Response, AppError> {
    if !state.admin.matches(&payload.username, &payload.password) {
        tracing::warn!(username = %payload.username, "Admin login rejected");
        return Ok(message(
            StatusCode::UNAUTHORIZED,
            false,
            "Invalid credentials",
        ));
    }

    AdminPrincipal::sign_in(&session, &payload.username).await?;
    tracing::info!(username = %payload.username, "Admin logged in");

    Ok(message(StatusCode::OK, true, "Login successful"))
}

pub async fn logout(session: Session) -> Result<Response, AppError> {
    AdminPrincipal::sign_out(&session).await?;
    Ok(Redirect::to("/login").into_response())
}
