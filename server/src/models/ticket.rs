use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "kebab-case")]
#[sqlx(rename_all = "kebab-case")]
pub enum TicketStatus {
    Confirmed,
    CheckedIn,
}

impl TicketStatus {
    /// The only allowed transition is `confirmed -> checked-in`.
    pub fn check_in(self) -> Option<TicketStatus> {
        match self {
            TicketStatus::Confirmed => Some(TicketStatus::CheckedIn),
            TicketStatus::CheckedIn => None,
        }
    }
}

/// One attendee's admission record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Ticket {
    pub id: Uuid,
    pub transaction_id: Uuid,
    pub name: String,
    pub email: String,
    pub whatsapp_number: Option<String>,
    pub age_group: Option<String>,
    pub event: String,
    pub status: TicketStatus,
    pub is_student: bool,
    pub prn_number: Option<String>,
}

impl Ticket {
    pub fn is_checked_in(&self) -> bool {
        self.status == TicketStatus::CheckedIn
    }
}
