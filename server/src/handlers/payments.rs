use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::booking::{BookingDetails, PaymentProof};
use crate::payment::{Order, MAX_ORDER_AMOUNT};
use crate::routes::AppState;
use crate::utils::response::message;
use crate::utils::{ApiJson, AppError};

#[derive(Deserialize)]
pub struct CreateOrderRequest {
    /// Major currency units.
    pub amount: Decimal,
}

#[derive(Serialize)]
pub struct CreateOrderResponse {
    pub success: bool,
    pub order: Order,
}

#[derive(Deserialize)]
pub struct VerifyPaymentRequest {
    #[serde(default)]
    pub razorpay_order_id: Option<String>,
    #[serde(default)]
    pub razorpay_payment_id: Option<String>,
    #[serde(default)]
    pub razorpay_signature: Option<String>,
    #[serde(rename = "bookingDetails", default)]
    pub booking_details: Option<BookingDetails>,
}

pub async fn create_order(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateOrderRequest>,
) -> Result<Json<CreateOrderResponse>, AppError> {
    if payload.amount < Decimal::ONE || payload.amount > MAX_ORDER_AMOUNT {
        return Err(AppError::ValidationError(
            "A valid amount is required.".to_string(),
        ));
    }

    let order = state.gateway.create_order(payload.amount).await?;

    Ok(Json(CreateOrderResponse {
        success: true,
        order,
    }))
}

pub async fn verify_payment(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<VerifyPaymentRequest>,
) -> Result<Response, AppError> {
    let details = payload
        .booking_details
        .filter(|d| !d.attendees.is_empty())
        .ok_or_else(|| AppError::ValidationError("Booking details are missing.".to_string()))?;

    let proof = PaymentProof::from_parts(
        payload.razorpay_order_id,
        payload.razorpay_payment_id,
        payload.razorpay_signature,
    );

    let receipt = state.booking.complete_booking(proof, details).await?;
    tracing::info!(
        transaction_id = %receipt.transaction_id,
        tickets = receipt.ticket_ids.len(),
        "Booking confirmed"
    );

    Ok(message(
        StatusCode::OK,
        true,
        "Booking confirmed! Individual tickets have been sent.",
    ))
}
