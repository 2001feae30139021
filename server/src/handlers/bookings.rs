use axum::extract::State;
use axum::Json;

use crate::auth::AdminPrincipal;
use crate::models::Ticket;
use crate::routes::AppState;
use crate::utils::AppError;

/// Every ticket, newest checkout first.
pub async fn list_bookings(
    State(state): State<AppState>,
    admin: AdminPrincipal,
) -> Result<Json<Vec<Ticket>>, AppError> {
    let tickets = state.booking.list_tickets().await?;
    tracing::debug!(admin = %admin.username, count = tickets.len(), "Listed tickets");
    Ok(Json(tickets))
}
