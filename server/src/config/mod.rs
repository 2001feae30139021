use std::env;
use std::net::SocketAddr;

use secrecy::{ExposeSecret, Secret};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use thiserror::Error;

use crate::models::EventCatalog;

pub mod cors;
pub mod security;

pub use cors::create_cors_layer;
pub use security::apply_security_headers;

const DEFAULT_DATABASE_URL: &str = "sqlite://tickets.db";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_RAZORPAY_API_BASE: &str = "https://api.razorpay.com/v1";
const DEFAULT_CURRENCY: &str = "INR";
const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
const DEFAULT_SMTP_PORT: u16 = 587;
const DEFAULT_FROM_NAME: &str = "Ticket Desk";
const MIN_SESSION_SECRET_LEN: usize = 32;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[derive(Clone)]
pub struct RazorpayConfig {
    pub key_id: String,
    pub key_secret: Secret<String>,
    pub api_base_url: String,
    pub currency: String,
}

#[derive(Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: Secret<String>,
    pub from_name: String,
}

#[derive(Clone)]
pub struct AdminCredentials {
    pub username: String,
    pub password: Secret<String>,
}

impl AdminCredentials {
    /// Constant-time check of both fields. Inputs are hashed first so the
    /// comparison length does not depend on what the caller sent.
    pub fn matches(&self, username: &str, password: &str) -> bool {
        let user_ok = digest_eq(&self.username, username);
        let pass_ok = digest_eq(self.password.expose_secret(), password);
        bool::from(user_ok & pass_ok)
    }
}

fn digest_eq(expected: &str, given: &str) -> subtle::Choice {
    let expected = Sha256::digest(expected.as_bytes());
    let given = Sha256::digest(given.as_bytes());
    expected.as_slice().ct_eq(given.as_slice())
}

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub razorpay: RazorpayConfig,
    pub smtp: SmtpConfig,
    pub admin: AdminCredentials,
    pub session_secret: Secret<String>,
    pub catalog: EventCatalog,
    pub allowed_origins: Vec<String>,
    pub production: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let session_secret = required("SESSION_SECRET")?;
        if session_secret.len() < MIN_SESSION_SECRET_LEN {
            return Err(ConfigError::Invalid {
                name: "SESSION_SECRET",
                reason: format!("must be at least {} bytes", MIN_SESSION_SECRET_LEN),
            });
        }

        let bind_addr = optional("BIND_ADDR", DEFAULT_BIND_ADDR)
            .parse()
            .map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
                name: "BIND_ADDR",
                reason: e.to_string(),
            })?;

        let smtp_port = match env::var("SMTP_PORT") {
            Ok(raw) => raw.parse().map_err(|e: std::num::ParseIntError| ConfigError::Invalid {
                name: "SMTP_PORT",
                reason: e.to_string(),
            })?,
            Err(_) => DEFAULT_SMTP_PORT,
        };

        let catalog = match env::var("EVENT_PRICES") {
            Ok(raw) => EventCatalog::parse(&raw).map_err(|reason| ConfigError::Invalid {
                name: "EVENT_PRICES",
                reason,
            })?,
            Err(_) => EventCatalog::default(),
        };

        let production = env::var("RUST_ENV")
            .map(|v| v.to_lowercase() == "production")
            .unwrap_or(false);

        Ok(Self {
            database_url: optional("DATABASE_URL", DEFAULT_DATABASE_URL),
            bind_addr,
            razorpay: RazorpayConfig {
                key_id: required("RAZORPAY_KEY_ID")?,
                key_secret: Secret::new(required("RAZORPAY_KEY_SECRET")?),
                api_base_url: optional("RAZORPAY_API_BASE", DEFAULT_RAZORPAY_API_BASE),
                currency: optional("PAYMENT_CURRENCY", DEFAULT_CURRENCY),
            },
            smtp: SmtpConfig {
                host: optional("SMTP_HOST", DEFAULT_SMTP_HOST),
                port: smtp_port,
                username: required("SMTP_USERNAME")?,
                password: Secret::new(required("SMTP_PASSWORD")?),
                from_name: optional("MAIL_FROM_NAME", DEFAULT_FROM_NAME),
            },
            admin: AdminCredentials {
                username: required("ADMIN_USERNAME")?,
                password: Secret::new(required("ADMIN_PASSWORD")?),
            },
            session_secret: Secret::new(session_secret),
            catalog,
            allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .map(|raw| split_origins(&raw))
                .unwrap_or_default(),
            production,
        })
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::Missing(name))
}

fn optional(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_origins_skips_blanks() {
        assert_eq!(
            split_origins("http://localhost:3000, ,https://tickets.example.com"),
            vec!["http://localhost:3000", "https://tickets.example.com"]
        );
    }

    #[test]
    fn test_admin_credentials_match_both_fields() {
        let admin = AdminCredentials {
            username: "door".to_string(),
            password: Secret::new("s3cret".to_string()),
        };
        assert!(admin.matches("door", "s3cret"));
        assert!(!admin.matches("door", "wrong"));
        assert!(!admin.matches("other", "s3cret"));
        assert!(!admin.matches("door", "s3cret-and-more"));
        assert!(!admin.matches("", ""));
    }

    #[test]
    fn test_missing_variable_is_named() {
        let err = required("TICKET_DESK_SURELY_UNSET_VARIABLE").unwrap_err();
        assert!(matches!(err, ConfigError::Missing("TICKET_DESK_SURELY_UNSET_VARIABLE")));
    }
}
