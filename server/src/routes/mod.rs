use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tower_sessions::MemoryStore;

use crate::auth::session_layer;
use crate::booking::BookingService;
use crate::config::{apply_security_headers, create_cors_layer, AdminCredentials, Config};
use crate::handlers::{auth, bookings, health_check, payments, tickets};
use crate::payment::PaymentGateway;

#[derive(Clone)]
pub struct AppState {
    pub booking: Arc<BookingService>,
    pub gateway: Arc<dyn PaymentGateway>,
    pub admin: AdminCredentials,
}

pub fn create_routes(state: AppState, config: &Config) -> Router {
    let router = Router::new()
        .route("/health", get(health_check))
        .route("/api/login", post(auth::login))
        .route("/api/logout", get(auth::logout))
        .route("/api/bookings", get(bookings::list_bookings))
        .route("/api/create-order", post(payments::create_order))
        .route("/api/verify-payment", post(payments::verify_payment))
        .route("/api/validate-ticket/:id", post(tickets::validate_ticket))
        .with_state(state)
        .layer(session_layer(
            MemoryStore::default(),
            &config.session_secret,
            config.production,
        ));

    apply_security_headers(router, config.production).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(create_cors_layer(&config.allowed_origins)),
    )
}
