//! Payment gateway seam: order creation and checkout signature checks.

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use rust_decimal::Decimal;
use serde::Serialize;
use sha2::Sha256;
use thiserror::Error;

pub mod razorpay;

pub use razorpay::RazorpayGateway;

/// Payment id the checkout page submits for events that cost nothing.
pub const FREE_EVENT_PAYMENT_ID: &str = "N/A_free_event";

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("payment gateway credentials are not configured")]
    NotConfigured,

    #[error("invalid order amount: {0}")]
    InvalidAmount(String),

    #[error("gateway request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("gateway rejected the request: {code} - {description}")]
    Api { code: String, description: String },

    #[error("unexpected gateway response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Handle returned to the checkout page. `amount` is in minor units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Order {
    pub id: String,
    pub amount: u64,
    pub currency: String,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// `amount` is in major currency units.
    async fn create_order(&self, amount: Decimal) -> Result<Order, GatewayError>;

    /// Looks up an existing order, to learn what the payer was actually charged.
    async fn fetch_order(&self, order_id: &str) -> Result<Order, GatewayError>;

    fn verify_signature(&self, order_id: &str, payment_id: &str, signature: &str) -> bool;
}

/// Largest order accepted, in major units.
pub const MAX_ORDER_AMOUNT: Decimal = Decimal::from_parts(10_000_000, 0, 0, false, 0);

/// Converts a major-unit amount to minor units (paise), rounding half away from zero.
pub fn to_minor_units(amount: Decimal) -> Result<u64, GatewayError> {
    use rust_decimal::prelude::ToPrimitive;
    use rust_decimal::RoundingStrategy;

    if amount < Decimal::ONE {
        return Err(GatewayError::InvalidAmount(format!(
            "{} is below the minimum of 1",
            amount
        )));
    }
    amount
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|minor| {
            minor
                .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
                .to_u64()
        })
        .ok_or_else(|| GatewayError::InvalidAmount(format!("{} is out of range", amount)))
}

/// Checks a checkout signature: hex(HMAC-SHA256(secret, "<order_id>|<payment_id>")).
///
/// The sentinel free-event payment id always verifies; callers must make
/// sure the booking really is free before trusting it.
pub fn verify_signature(order_id: &str, payment_id: &str, signature: &str, secret: &str) -> bool {
    if payment_id == FREE_EVENT_PAYMENT_ID {
        return true;
    }

    let Ok(expected) = hex::decode(signature.trim()) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(order_id.as_bytes());
    mac.update(b"|");
    mac.update(payment_id.as_bytes());
    mac.verify_slice(&expected).is_ok()
}

/// Hex-encoded signature for `order_id|payment_id`, as the gateway would produce it.
pub fn sign(
    order_id: &str,
    payment_id: &str,
    secret: &str,
) -> Result<String, hmac::digest::InvalidLength> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())?;
    mac.update(format!("{}|{}", order_id, payment_id).as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}
