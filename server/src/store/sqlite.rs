use std::str::FromStr;

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, Sqlite, SqlitePool};
use uuid::Uuid;

use super::{Store, StoreError};
use crate::models::{Ticket, TicketStatus, Transaction};

const INSERT_TRANSACTION: &str = "INSERT INTO transactions \
    (id, purchaser_email, purchaser_phone, event, quantity, total_amount, \
     razorpay_payment_id, razorpay_order_id, created_at) \
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)";

const INSERT_TICKET: &str = "INSERT INTO tickets \
    (id, transaction_id, name, email, whatsapp_number, age_group, event, status, \
     is_student, prn_number) \
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)";

const SELECT_TICKET: &str = "SELECT id, transaction_id, name, email, whatsapp_number, \
    age_group, event, status, is_student, prn_number FROM tickets";

#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Opens (creating if missing) the database file and runs migrations.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        Self::with_pool(pool).await
    }

    /// Private in-memory database on a single connection.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        Self::with_pool(pool).await
    }

    pub async fn with_pool(pool: SqlitePool) -> Result<Self, StoreError> {
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| StoreError::Database(e.into()))?;

        tracing::info!("Ticket store migrations applied");
        Ok(Self { pool })
    }
}

fn insert_transaction_query(
    transaction: &Transaction,
) -> sqlx::query::Query<'_, Sqlite, sqlx::sqlite::SqliteArguments<'_>> {
    sqlx::query(INSERT_TRANSACTION)
        .bind(transaction.id)
        .bind(&transaction.purchaser_email)
        .bind(&transaction.purchaser_phone)
        .bind(&transaction.event)
        .bind(transaction.quantity)
        .bind(transaction.total_amount.to_string())
        .bind(&transaction.razorpay_payment_id)
        .bind(&transaction.razorpay_order_id)
        .bind(transaction.created_at)
}

fn insert_ticket_query(
    ticket: &Ticket,
) -> sqlx::query::Query<'_, Sqlite, sqlx::sqlite::SqliteArguments<'_>> {
    sqlx::query(INSERT_TICKET)
        .bind(ticket.id)
        .bind(ticket.transaction_id)
        .bind(&ticket.name)
        .bind(&ticket.email)
        .bind(&ticket.whatsapp_number)
        .bind(&ticket.age_group)
        .bind(&ticket.event)
        .bind(ticket.status)
        .bind(ticket.is_student)
        .bind(&ticket.prn_number)
}

/// Translates constraint failures into the store's own error kinds.
fn classify(err: sqlx::Error, id: Uuid, parent: Option<Uuid>) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return StoreError::DuplicateId(id);
        }
        if db_err.is_foreign_key_violation() {
            return StoreError::ForeignKeyViolation(parent.unwrap_or(id));
        }
    }
    StoreError::Database(err)
}

#[async_trait]
impl Store for SqliteStore {
    async fn create_transaction(&self, transaction: &Transaction) -> Result<(), StoreError> {
        insert_transaction_query(transaction)
            .execute(&self.pool)
            .await
            .map_err(|e| classify(e, transaction.id, None))?;
        Ok(())
    }

    async fn create_ticket(&self, ticket: &Ticket) -> Result<(), StoreError> {
        insert_ticket_query(ticket)
            .execute(&self.pool)
            .await
            .map_err(|e| classify(e, ticket.id, Some(ticket.transaction_id)))?;
        Ok(())
    }

    async fn record_booking(
        &self,
        transaction: &Transaction,
        tickets: &[Ticket],
    ) -> Result<(), StoreError> {
        // Dropping `tx` without commit rolls everything back.
        let mut tx = self.pool.begin().await?;

        insert_transaction_query(transaction)
            .execute(&mut *tx)
            .await
            .map_err(|e| classify(e, transaction.id, None))?;

        for ticket in tickets {
            insert_ticket_query(ticket)
                .execute(&mut *tx)
                .await
                .map_err(|e| classify(e, ticket.id, Some(ticket.transaction_id)))?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn list_tickets(&self) -> Result<Vec<Ticket>, StoreError> {
        let query = format!("{} ORDER BY transaction_id DESC, rowid ASC", SELECT_TICKET);
        let tickets = sqlx::query_as::<_, Ticket>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(tickets)
    }

    async fn get_ticket(&self, id: Uuid) -> Result<Option<Ticket>, StoreError> {
        let query = format!("{} WHERE id = ?", SELECT_TICKET);
        let ticket = sqlx::query_as::<_, Ticket>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(ticket)
    }

    async fn get_transaction(&self, id: Uuid) -> Result<Option<Transaction>, StoreError> {
        let row = sqlx::query(
            "SELECT id, purchaser_email, purchaser_phone, event, quantity, total_amount, \
             razorpay_payment_id, razorpay_order_id, created_at \
             FROM transactions WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let raw_amount: String = row.try_get("total_amount")?;
        let total_amount = Decimal::from_str(&raw_amount)
            .map_err(|e| StoreError::Corrupt(format!("total_amount '{}': {}", raw_amount, e)))?;

        Ok(Some(Transaction {
            id: row.try_get("id")?,
            purchaser_email: row.try_get("purchaser_email")?,
            purchaser_phone: row.try_get("purchaser_phone")?,
            event: row.try_get("event")?,
            quantity: row.try_get("quantity")?,
            total_amount,
            razorpay_payment_id: row.try_get("razorpay_payment_id")?,
            razorpay_order_id: row.try_get("razorpay_order_id")?,
            created_at: row.try_get("created_at")?,
        }))
    }

    async fn set_ticket_status(&self, id: Uuid, status: TicketStatus) -> Result<(), StoreError> {
        sqlx::query("UPDATE tickets SET status = ? WHERE id = ?")
            .bind(status)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn check_in(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("UPDATE tickets SET status = ? WHERE id = ? AND status = ?")
            .bind(TicketStatus::CheckedIn)
            .bind(id)
            .bind(TicketStatus::Confirmed)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }
}
