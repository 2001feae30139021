//! Admin sessions: cookie-backed, server-side store, request-scoped principal.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use secrecy::{ExposeSecret, Secret};
use sha2::{Digest, Sha512};
use tower_sessions::cookie::Key;
use tower_sessions::service::SignedCookie;
use tower_sessions::{Expiry, Session, SessionManagerLayer, SessionStore};

use crate::utils::AppError;

const ADMIN_KEY: &str = "admin_user";
const SESSION_TTL_MINUTES: i64 = 60;

/// The authenticated admin behind the current request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminPrincipal {
    pub username: String,
}

impl AdminPrincipal {
    /// Binds `username` to the session under a fresh session id.
    pub async fn sign_in(session: &Session, username: &str) -> Result<(), AppError> {
        session
            .cycle_id()
            .await
            .map_err(|e| AppError::InternalServerError(e.to_string()))?;
        session
            .insert(ADMIN_KEY, username)
            .await
            .map_err(|e| AppError::InternalServerError(e.to_string()))
    }

    pub async fn sign_out(session: &Session) -> Result<(), AppError> {
        session
            .flush()
            .await
            .map_err(|e| AppError::InternalServerError(e.to_string()))
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AdminPrincipal
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|(_, msg)| AppError::InternalServerError(msg.to_string()))?;

        let username: Option<String> = session
            .get(ADMIN_KEY)
            .await
            .map_err(|e| AppError::InternalServerError(e.to_string()))?;

        username
            .map(|username| AdminPrincipal { username })
            .ok_or_else(|| AppError::AuthError("Login required".to_string()))
    }
}

/// Session layer over any server-side store, with cookies signed by a key
/// derived from the configured secret.
pub fn session_layer<Store>(
    store: Store,
    secret: &Secret<String>,
    secure: bool,
) -> SessionManagerLayer<Store, SignedCookie>
where
    Store: SessionStore + Clone,
{
    let key = Key::from(Sha512::digest(secret.expose_secret().as_bytes()).as_slice());

    SessionManagerLayer::new(store)
        .with_secure(secure)
        .with_http_only(true)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(
            SESSION_TTL_MINUTES,
        )))
        .with_signed(key)
}
