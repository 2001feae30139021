use axum::http::{header, HeaderName, HeaderValue};
use axum::Router;
use tower_http::set_header::SetResponseHeaderLayer;

const NOSNIFF: &str = "nosniff";
const DENY: &str = "DENY";
const HSTS_VALUE: &str = "max-age=31536000; includeSubDomains";
const CSP_API_VALUE: &str = "default-src 'none'; frame-ancestors 'none'";
const REFERRER_POLICY_VALUE: &str = "strict-origin-when-cross-origin";
const PERMISSIONS_POLICY_VALUE: &str = "geolocation=(), microphone=(), camera=()";

fn if_missing(name: HeaderName, value: &'static str) -> SetResponseHeaderLayer<HeaderValue> {
    SetResponseHeaderLayer::if_not_present(name, HeaderValue::from_static(value))
}

/// Hardening headers on every response. HSTS only in production, where
/// the service sits behind TLS.
pub fn apply_security_headers<S>(router: Router<S>, production: bool) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    let router = router
        .layer(if_missing(header::X_CONTENT_TYPE_OPTIONS, NOSNIFF))
        .layer(if_missing(header::X_FRAME_OPTIONS, DENY))
        .layer(if_missing(header::CONTENT_SECURITY_POLICY, CSP_API_VALUE))
        .layer(if_missing(header::REFERRER_POLICY, REFERRER_POLICY_VALUE))
        .layer(if_missing(
            HeaderName::from_static("permissions-policy"),
            PERMISSIONS_POLICY_VALUE,
        ));

    if production {
        tracing::info!("Security: HSTS header enabled (production mode)");
        router.layer(if_missing(header::STRICT_TRANSPORT_SECURITY, HSTS_VALUE))
    } else {
        tracing::info!("Security: HSTS header disabled (development mode)");
        router
    }
}
