use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use crate::auth::AdminPrincipal;
use crate::booking::CheckInOutcome;
use crate::models::Ticket;
use crate::routes::AppState;
use crate::utils::AppError;

#[derive(Debug, Serialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum CheckInFailure {
    InvalidTicketId,
    AlreadyCheckedIn,
}

#[derive(Serialize)]
pub struct ValidateTicketResponse {
    pub success: bool,
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<CheckInFailure>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticket: Option<Ticket>,
}

impl From<CheckInOutcome> for ValidateTicketResponse {
    fn from(outcome: CheckInOutcome) -> Self {
        match outcome {
            CheckInOutcome::CheckedIn(ticket) => Self {
                success: true,
                message: "Check-in Successful!",
                reason: None,
                ticket: Some(ticket),
            },
            CheckInOutcome::AlreadyCheckedIn(ticket) => Self {
                success: false,
                message: "This ticket has already been checked in.",
                reason: Some(CheckInFailure::AlreadyCheckedIn),
                ticket: Some(ticket),
            },
            CheckInOutcome::InvalidTicketId => Self {
                success: false,
                message: "Invalid Ticket ID.",
                reason: Some(CheckInFailure::InvalidTicketId),
                ticket: None,
            },
        }
    }
}

/// Door check-in. Soft failures still answer 200.
pub async fn validate_ticket(
    State(state): State<AppState>,
    admin: AdminPrincipal,
    Path(id): Path<String>,
) -> Result<Json<ValidateTicketResponse>, AppError> {
    let outcome = state.booking.validate_ticket(&id).await?;

    match &outcome {
        CheckInOutcome::CheckedIn(_) => {}
        CheckInOutcome::AlreadyCheckedIn(_) => {
            tracing::info!(ticket_id = %id, admin = %admin.username, "Repeat check-in attempt")
        }
        CheckInOutcome::InvalidTicketId => {
            tracing::info!(ticket_id = %id, admin = %admin.username, "Unknown ticket presented")
        }
    }

    Ok(Json(outcome.into()))
}
