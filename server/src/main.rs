use std::sync::Arc;

use dotenvy::dotenv;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use ticket_desk::booking::BookingService;
use ticket_desk::notify::SmtpNotifier;
use ticket_desk::payment::{PaymentGateway, RazorpayGateway};
use ticket_desk::store::SqliteStore;
use ticket_desk::{create_routes, AppState, Config};

#[tokio::main]
async fn main() {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=info")),
        )
        .init();

    let config = Config::from_env().expect("Invalid configuration");

    let store = SqliteStore::connect(&config.database_url)
        .await
        .expect("Failed to open ticket database");

    tracing::info!(database = %config.database_url, "Connected to ticket database");

    let gateway: Arc<dyn PaymentGateway> = Arc::new(RazorpayGateway::new(config.razorpay.clone()));
    let notifier = SmtpNotifier::new(&config.smtp).expect("Failed to set up SMTP transport");

    tracing::info!(events = config.catalog.len(), "Event catalog loaded");

    let booking = BookingService::new(
        Arc::new(store),
        gateway.clone(),
        Arc::new(notifier),
        config.catalog.clone(),
    );

    let state = AppState {
        booking: Arc::new(booking),
        gateway,
        admin: config.admin.clone(),
    };

    let app = create_routes(state, &config);

    tracing::info!("🚀 Server running at http://{}", config.bind_addr);

    let listener = TcpListener::bind(config.bind_addr)
        .await
        .expect("Failed to bind address");

    axum::serve(listener, app).await.expect("Server failed");
}
