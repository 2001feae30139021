//! Persistence for transactions and tickets.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Ticket, TicketStatus, Transaction};

pub mod sqlite;

pub use sqlite::SqliteStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record with id {0} already exists")]
    DuplicateId(Uuid),

    #[error("transaction {0} does not exist")]
    ForeignKeyViolation(Uuid),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("corrupt row: {0}")]
    Corrupt(String),
}

#[async_trait]
pub trait Store: Send + Sync {
    async fn create_transaction(&self, transaction: &Transaction) -> Result<(), StoreError>;

    async fn create_ticket(&self, ticket: &Ticket) -> Result<(), StoreError>;

    /// Inserts a transaction together with all of its tickets. Either every
    /// row lands or none does.
    async fn record_booking(
        &self,
        transaction: &Transaction,
        tickets: &[Ticket],
    ) -> Result<(), StoreError>;

    /// All tickets, newest transaction first, attendee order within a transaction.
    async fn list_tickets(&self) -> Result<Vec<Ticket>, StoreError>;

    async fn get_ticket(&self, id: Uuid) -> Result<Option<Ticket>, StoreError>;

    async fn get_transaction(&self, id: Uuid) -> Result<Option<Transaction>, StoreError>;

    /// Unconditional overwrite. Callers enforce the one-way transition.
    async fn set_ticket_status(&self, id: Uuid, status: TicketStatus) -> Result<(), StoreError>;

    /// Moves a ticket from `confirmed` to `checked-in` only if it is still
    /// `confirmed`. Returns `true` when this call made the transition.
    async fn check_in(&self, id: Uuid) -> Result<bool, StoreError>;
}
