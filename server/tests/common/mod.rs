use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use axum::Router;
use rust_decimal::Decimal;
use secrecy::Secret;
use tower::ServiceExt;

use ticket_desk::booking::BookingService;
use ticket_desk::config::{AdminCredentials, RazorpayConfig, SmtpConfig};
use ticket_desk::models::{EventCatalog, Ticket};
use ticket_desk::notify::{NotificationError, Notifier};
use ticket_desk::payment::{self, GatewayError, Order, PaymentGateway};
use ticket_desk::store::SqliteStore;
use ticket_desk::{create_routes, AppState, Config};

pub const GATEWAY_SECRET: &str = "rzp_test_secret";
pub const ADMIN_USER: &str = "door";
pub const ADMIN_PASSWORD: &str = "let-me-in";

/// Gateway double: real signature checks, remembered orders, call counting.
#[derive(Default)]
pub struct FakeGateway {
    pub orders_created: AtomicUsize,
    orders: Mutex<HashMap<String, Order>>,
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    async fn create_order(&self, amount: Decimal) -> Result<Order, GatewayError> {
        let n = self.orders_created.fetch_add(1, Ordering::SeqCst) + 1;
        let order = Order {
            id: format!("order_test_{}", n),
            amount: payment::to_minor_units(amount)?,
            currency: "INR".to_string(),
        };
        self.orders
            .lock()
            .unwrap()
            .insert(order.id.clone(), order.clone());
        Ok(order)
    }

    async fn fetch_order(&self, order_id: &str) -> Result<Order, GatewayError> {
        self.orders
            .lock()
            .unwrap()
            .get(order_id)
            .cloned()
            .ok_or_else(|| GatewayError::Api {
                code: "BAD_REQUEST_ERROR".to_string(),
                description: "The id provided does not exist".to_string(),
            })
    }

    fn verify_signature(&self, order_id: &str, payment_id: &str, signature: &str) -> bool {
        payment::verify_signature(order_id, payment_id, signature, GATEWAY_SECRET)
    }
}

/// Records delivered tickets. Refuses delivery to `fail_on`, when set.
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<Ticket>>,
    pub fail_on: Option<String>,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send_ticket(&self, ticket: &Ticket) -> Result<(), NotificationError> {
        if self.fail_on.as_deref() == Some(ticket.email.as_str()) {
            return Err(NotificationError::Transport(
                "550 mailbox unavailable".to_string(),
            ));
        }
        self.sent.lock().unwrap().push(ticket.clone());
        Ok(())
    }
}

pub struct TestApp {
    pub router: Router,
    pub gateway: Arc<FakeGateway>,
    pub notifier: Arc<RecordingNotifier>,
}

fn test_config() -> Config {
    Config {
        database_url: "sqlite::memory:".to_string(),
        bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
        razorpay: RazorpayConfig {
            key_id: "rzp_test_key".to_string(),
            key_secret: Secret::new(GATEWAY_SECRET.to_string()),
            api_base_url: "http://127.0.0.1:9".to_string(),
            currency: "INR".to_string(),
        },
        smtp: SmtpConfig {
            host: "smtp.example.com".to_string(),
            port: 587,
            username: "tickets@example.com".to_string(),
            password: Secret::new("unused".to_string()),
            from_name: "Ticket Desk".to_string(),
        },
        admin: AdminCredentials {
            username: ADMIN_USER.to_string(),
            password: Secret::new(ADMIN_PASSWORD.to_string()),
        },
        session_secret: Secret::new("0123456789abcdef0123456789abcdef".to_string()),
        catalog: EventCatalog::default(),
        allowed_origins: Vec::new(),
        production: false,
    }
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::with_notifier(RecordingNotifier::default()).await
    }

    /// An app whose mail delivery fails for `email`.
    pub async fn with_failing_delivery(email: &str) -> Self {
        Self::with_notifier(RecordingNotifier {
            fail_on: Some(email.to_string()),
            ..Default::default()
        })
        .await
    }

    async fn with_notifier(notifier: RecordingNotifier) -> Self {
        let config = test_config();
        let store = SqliteStore::in_memory().await.expect("in-memory store");
        let gateway = Arc::new(FakeGateway::default());
        let notifier = Arc::new(notifier);

        let booking = BookingService::new(
            Arc::new(store),
            gateway.clone(),
            notifier.clone(),
            config.catalog.clone(),
        );

        let state = AppState {
            booking: Arc::new(booking),
            gateway: gateway.clone(),
            admin: config.admin.clone(),
        };

        Self {
            router: create_routes(state, &config),
            gateway,
            notifier,
        }
    }

    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        body: Option<serde_json::Value>,
        cookie: Option<&str>,
    ) -> Response<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        self.router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap()
    }

    /// Logs in as the configured admin and returns the session cookie.
    pub async fn login(&self) -> String {
        let response = self
            .request(
                "POST",
                "/api/login",
                Some(serde_json::json!({ "username": ADMIN_USER, "password": ADMIN_PASSWORD })),
                None,
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);

        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .expect("login sets a session cookie")
            .to_str()
            .unwrap();
        set_cookie.split(';').next().unwrap().to_string()
    }
}

pub async fn json_body(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn booking_details(event: &str, names: &[&str], total: serde_json::Value) -> serde_json::Value {
    let attendees: Vec<serde_json::Value> = names
        .iter()
        .map(|name| {
            serde_json::json!({
                "name": name,
                "email": format!("{}@example.com", name.to_lowercase()),
                "whatsapp_number": "9876543210",
                "age_group": "21-28"
            })
        })
        .collect();

    serde_json::json!({
        "purchaser_email": "buyer@example.com",
        "purchaser_phone": "9999999999",
        "event": event,
        "quantity": names.len(),
        "is_student": false,
        "prn_number": null,
        "attendees": attendees,
        "total_amount": total
    })
}
