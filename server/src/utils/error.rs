use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::{error, warn};

use crate::booking::BookingError;
use crate::notify::NotificationError;
use crate::payment::GatewayError;
use crate::store::StoreError;
use crate::utils::response::error as error_response;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Authentication error: {0}")]
    AuthError(String),

    #[error("Payment gateway error: {0}")]
    GatewayError(#[from] GatewayError),

    #[error("Payment verification failed")]
    PaymentVerificationFailed,

    #[error("Booking persistence error: {0}")]
    BookingPersistence(StoreError),

    #[error("Notification error: {0}")]
    NotificationError(#[from] NotificationError),

    #[error("Database error: {0}")]
    DatabaseError(#[from] StoreError),

    #[error("Internal server error: {0}")]
    InternalServerError(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) | AppError::PaymentVerificationFailed => {
                StatusCode::BAD_REQUEST
            }
            AppError::AuthError(_) => StatusCode::UNAUTHORIZED,
            AppError::GatewayError(_)
            | AppError::BookingPersistence(_)
            | AppError::NotificationError(_)
            | AppError::DatabaseError(_)
            | AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::AuthError(_) => "AUTH_ERROR",
            AppError::GatewayError(_) => "GATEWAY_ERROR",
            AppError::PaymentVerificationFailed => "PAYMENT_VERIFICATION_FAILED",
            AppError::BookingPersistence(_) => "BOOKING_PERSISTENCE_ERROR",
            AppError::NotificationError(_) => "NOTIFICATION_ERROR",
            AppError::DatabaseError(_) => "DATABASE_ERROR",
            AppError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
        }
    }

    /// What the caller gets to see. Internals stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            AppError::ValidationError(msg) | AppError::AuthError(msg) => msg.clone(),
            AppError::GatewayError(_) => "Could not create order.".to_string(),
            AppError::PaymentVerificationFailed => "Payment verification failed.".to_string(),
            AppError::BookingPersistence(_) => "Server error while saving booking.".to_string(),
            AppError::NotificationError(_) => {
                "Payment received but sending tickets failed. Please contact the organizers."
                    .to_string()
            }
            AppError::DatabaseError(_) => "A database error occurred".to_string(),
            AppError::InternalServerError(_) => "Internal server error".to_string(),
        }
    }

    fn log(&self) {
        if self.status_code().is_server_error() {
            error!(error = %self, code = self.code(), "Application error");
        } else {
            warn!(error = %self, code = self.code(), "Request rejected");
        }
    }
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::Validation(msg) => AppError::ValidationError(msg),
            mismatch @ BookingError::PriceMismatch { .. } => {
                AppError::ValidationError(mismatch.to_string())
            }
            BookingError::PaymentVerificationFailed => AppError::PaymentVerificationFailed,
            BookingError::Gateway(e) => AppError::GatewayError(e),
            BookingError::Persistence(e) => AppError::BookingPersistence(e),
            BookingError::Notification(e) => AppError::NotificationError(e),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::ValidationError(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.log();
        error_response(self.code(), self.public_message(), self.status_code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_taxonomy_status_codes() {
        assert_eq!(
            AppError::ValidationError("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::PaymentVerificationFailed.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::AuthError("x".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::GatewayError(GatewayError::NotConfigured).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::NotificationError(NotificationError::Transport("down".into())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_gateway_details_are_not_exposed() {
        let err = AppError::GatewayError(GatewayError::Api {
            code: "BAD_REQUEST_ERROR".into(),
            description: "key rzp_live_secret invalid".into(),
        });
        assert_eq!(err.public_message(), "Could not create order.");
    }

    #[test]
    fn test_booking_errors_map_to_taxonomy() {
        let err: AppError = BookingError::PaymentVerificationFailed.into();
        assert_eq!(err.code(), "PAYMENT_VERIFICATION_FAILED");

        let err: AppError = BookingError::Validation("Quantity mismatch".into()).into();
        assert_eq!(err.public_message(), "Quantity mismatch");

        let err: AppError = BookingError::Persistence(StoreError::Corrupt("x".into())).into();
        assert_eq!(err.code(), "BOOKING_PERSISTENCE_ERROR");
    }
}
