use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One checkout. Owns every ticket issued for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub purchaser_email: String,
    pub purchaser_phone: String,
    pub event: String,
    pub quantity: i64,
    pub total_amount: Decimal,
    /// `None` for free events.
    pub razorpay_payment_id: Option<String>,
    pub razorpay_order_id: Option<String>,
    pub created_at: DateTime<Utc>,
}
