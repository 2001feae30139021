pub mod auth;
pub mod booking;
pub mod config;
pub mod handlers;
pub mod models;
pub mod notify;
pub mod payment;
pub mod routes;
pub mod store;
pub mod utils;

pub use config::Config;
pub use routes::{create_routes, AppState};
