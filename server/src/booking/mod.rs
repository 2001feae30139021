//! Booking orchestration: payment proof -> records -> ticket emails, and
//! door check-in.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;
use validator::Validate;

use crate::models::{EventCatalog, Ticket, TicketStatus, Transaction};
use crate::notify::{NotificationError, Notifier};
use crate::payment::{to_minor_units, GatewayError, PaymentGateway, FREE_EVENT_PAYMENT_ID};
use crate::store::{Store, StoreError};

pub mod pricing;

pub use pricing::{quote, quote_event, Quote};

#[derive(Debug, Error)]
pub enum BookingError {
    #[error("{0}")]
    Validation(String),

    #[error("submitted total {submitted} does not match the price {expected}")]
    PriceMismatch { expected: Decimal, submitted: Decimal },

    #[error("payment verification failed")]
    PaymentVerificationFailed,

    #[error("payment gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("failed to save booking: {0}")]
    Persistence(#[from] StoreError),

    #[error("booking saved but ticket delivery failed: {0}")]
    Notification(#[from] NotificationError),
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AttendeeDetails {
    #[validate(length(min = 1, message = "Attendee name is required."))]
    pub name: String,
    #[validate(email(message = "Attendee email is invalid."))]
    pub email: String,
    #[serde(default)]
    pub whatsapp_number: Option<String>,
    #[serde(default)]
    pub age_group: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct BookingDetails {
    #[validate(email(message = "Purchaser email is invalid."))]
    pub purchaser_email: String,
    #[validate(length(min = 1, message = "Purchaser phone is required."))]
    pub purchaser_phone: String,
    #[validate(length(min = 1, message = "Event is required."))]
    pub event: String,
    #[validate(range(min = 1, message = "Quantity must be at least 1."))]
    pub quantity: u32,
    #[serde(default)]
    pub is_student: bool,
    #[serde(default)]
    pub prn_number: Option<String>,
    #[validate(length(min = 1, message = "At least one attendee is required."))]
    #[validate(nested)]
    pub attendees: Vec<AttendeeDetails>,
    /// Total the client computed. Checked, never trusted.
    #[serde(default)]
    pub total_amount: Option<Decimal>,
}

/// What the checkout page sends back as evidence of payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentProof {
    FreeEvent,
    Gateway {
        order_id: String,
        payment_id: String,
        signature: String,
    },
    Incomplete,
}

impl PaymentProof {
    pub fn from_parts(
        order_id: Option<String>,
        payment_id: Option<String>,
        signature: Option<String>,
    ) -> Self {
        match (order_id, payment_id, signature) {
            (_, Some(payment_id), _) if payment_id == FREE_EVENT_PAYMENT_ID => {
                PaymentProof::FreeEvent
            }
            (Some(order_id), Some(payment_id), Some(signature))
                if !order_id.is_empty() && !payment_id.is_empty() && !signature.is_empty() =>
            {
                PaymentProof::Gateway {
                    order_id,
                    payment_id,
                    signature,
                }
            }
            _ => PaymentProof::Incomplete,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BookingReceipt {
    pub transaction_id: Uuid,
    pub ticket_ids: Vec<Uuid>,
    pub quote: Quote,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CheckInOutcome {
    CheckedIn(Ticket),
    AlreadyCheckedIn(Ticket),
    InvalidTicketId,
}

/// Payment references that survived verification.
enum Verified {
    Free,
    Paid { order_id: String, payment_id: String },
}

pub struct BookingService {
    store: Arc<dyn Store>,
    gateway: Arc<dyn PaymentGateway>,
    notifier: Arc<dyn Notifier>,
    catalog: EventCatalog,
}

impl BookingService {
    pub fn new(
        store: Arc<dyn Store>,
        gateway: Arc<dyn PaymentGateway>,
        notifier: Arc<dyn Notifier>,
        catalog: EventCatalog,
    ) -> Self {
        Self {
            store,
            gateway,
            notifier,
            catalog,
        }
    }

    /// Verifies payment, persists the transaction with one ticket per
    /// attendee, then mails each attendee their ticket in order.
    ///
    /// Records are written atomically before any email goes out. A delivery
    /// failure is reported but leaves the records (and earlier emails) in place.
    pub async fn complete_booking(
        &self,
        proof: PaymentProof,
        details: BookingDetails,
    ) -> Result<BookingReceipt, BookingError> {
        details
            .validate()
            .map_err(|e| BookingError::Validation(e.to_string()))?;

        if details.attendees.len() != details.quantity as usize {
            return Err(BookingError::Validation(format!(
                "Quantity {} does not match {} attendee(s).",
                details.quantity,
                details.attendees.len()
            )));
        }

        let quote = quote_event(&self.catalog, &details.event, details.quantity)
            .ok_or_else(|| BookingError::Validation(format!("Unknown event '{}'.", details.event)))?;

        if let Some(submitted) = details.total_amount {
            if submitted.round_dp(2) != quote.total {
                tracing::warn!(
                    event = %details.event,
                    expected = %quote.total,
                    submitted = %submitted,
                    "Rejecting booking with mismatched total"
                );
                return Err(BookingError::PriceMismatch {
                    expected: quote.total,
                    submitted,
                });
            }
        }

        let verified = self.verify(proof, &quote).await?;

        let (razorpay_order_id, razorpay_payment_id) = match verified {
            Verified::Free => (None, None),
            Verified::Paid {
                order_id,
                payment_id,
            } => (Some(order_id), Some(payment_id)),
        };

        let transaction = Transaction {
            id: Uuid::now_v7(),
            purchaser_email: details.purchaser_email,
            purchaser_phone: details.purchaser_phone,
            event: details.event,
            quantity: i64::from(details.quantity),
            total_amount: quote.total,
            razorpay_payment_id,
            razorpay_order_id,
            created_at: Utc::now(),
        };

        let prn_number = details
            .prn_number
            .filter(|prn| details.is_student && !prn.trim().is_empty());

        let tickets: Vec<Ticket> = details
            .attendees
            .into_iter()
            .map(|attendee| Ticket {
                id: Uuid::now_v7(),
                transaction_id: transaction.id,
                name: attendee.name,
                email: attendee.email,
                whatsapp_number: attendee.whatsapp_number,
                age_group: attendee.age_group,
                event: transaction.event.clone(),
                status: TicketStatus::Confirmed,
                is_student: details.is_student,
                prn_number: prn_number.clone(),
            })
            .collect();

        self.store.record_booking(&transaction, &tickets).await?;

        tracing::info!(
            transaction_id = %transaction.id,
            event = %transaction.event,
            tickets = tickets.len(),
            total = %transaction.total_amount,
            "Booking recorded"
        );

        for ticket in &tickets {
            if let Err(e) = self.notifier.send_ticket(ticket).await {
                tracing::error!(
                    transaction_id = %transaction.id,
                    ticket_id = %ticket.id,
                    error = %e,
                    "Ticket delivery failed"
                );
                return Err(e.into());
            }
            tracing::info!(ticket_id = %ticket.id, attendee = %ticket.name, "Ticket delivered");
        }

        Ok(BookingReceipt {
            transaction_id: transaction.id,
            ticket_ids: tickets.iter().map(|t| t.id).collect(),
            quote,
        })
    }

    /// A gateway payment counts only if the signature holds and the order it
    /// signs was created for exactly the quoted total.
    async fn verify(&self, proof: PaymentProof, quote: &Quote) -> Result<Verified, BookingError> {
        match proof {
            PaymentProof::FreeEvent if quote.is_free() => Ok(Verified::Free),
            PaymentProof::FreeEvent => {
                tracing::warn!(total = %quote.total, "Free-event claim on a paid booking");
                Err(BookingError::PaymentVerificationFailed)
            }
            PaymentProof::Gateway {
                order_id,
                payment_id,
                signature,
            } => {
                if !self
                    .gateway
                    .verify_signature(&order_id, &payment_id, &signature)
                {
                    return Err(BookingError::PaymentVerificationFailed);
                }

                let order = self.gateway.fetch_order(&order_id).await?;
                if to_minor_units(quote.total).ok() != Some(order.amount) {
                    let charged = Decimal::from(order.amount) / Decimal::ONE_HUNDRED;
                    tracing::warn!(
                        order_id = %order_id,
                        expected = %quote.total,
                        charged = %charged,
                        "Rejecting payment for an order of the wrong amount"
                    );
                    return Err(BookingError::PriceMismatch {
                        expected: quote.total,
                        submitted: charged,
                    });
                }

                Ok(Verified::Paid {
                    order_id,
                    payment_id,
                })
            }
            PaymentProof::Incomplete => Err(BookingError::PaymentVerificationFailed),
        }
    }

    /// Checks a ticket in at the door. Only the first call for a ticket succeeds.
    pub async fn validate_ticket(&self, ticket_id: &str) -> Result<CheckInOutcome, StoreError> {
        let Ok(id) = Uuid::parse_str(ticket_id.trim()) else {
            return Ok(CheckInOutcome::InvalidTicketId);
        };

        let Some(ticket) = self.store.get_ticket(id).await? else {
            return Ok(CheckInOutcome::InvalidTicketId);
        };

        if ticket.is_checked_in() {
            return Ok(CheckInOutcome::AlreadyCheckedIn(ticket));
        }

        let transitioned = self.store.check_in(id).await?;
        let current = self.store.get_ticket(id).await?.unwrap_or(ticket);

        if transitioned {
            tracing::info!(ticket_id = %id, attendee = %current.name, "Ticket checked in");
            Ok(CheckInOutcome::CheckedIn(current))
        } else {
            Ok(CheckInOutcome::AlreadyCheckedIn(current))
        }
    }

    pub async fn list_tickets(&self) -> Result<Vec<Ticket>, StoreError> {
        self.store.list_tickets().await
    }
}
