//! Ticket delivery: PDF rendering and email dispatch.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::Ticket;

pub mod pdf;
pub mod smtp;

pub use pdf::render_ticket_pdf;
pub use smtp::SmtpNotifier;

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("failed to render ticket: {0}")]
    Render(String),

    #[error("invalid email address: {0}")]
    Address(String),

    #[error("failed to send email: {0}")]
    Transport(String),
}

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Renders the ticket and mails it to the attendee.
    async fn send_ticket(&self, ticket: &Ticket) -> Result<(), NotificationError>;
}
