//! Cookie session configuration.
//!
//! Sessions are signed with a key derived from `SESSION_SECRET` and expire
//! after `SESSION_MAX_AGE_MS` of inactivity. The cookie is `Secure` only in
//! production.

use anyhow::{Context, Result};
use sha2::{Digest, Sha512};
use time::Duration;
use tower_sessions::cookie::{Key, SameSite};
use tower_sessions::service::SignedCookie;
use tower_sessions::{Expiry, SessionManagerLayer, SessionStore};

use crate::config::Config;

pub const SESSION_COOKIE: &str = "ats.sid";

pub fn session_layer<S: SessionStore + Clone>(
    store: S,
    config: &Config,
) -> Result<SessionManagerLayer<S, SignedCookie>> {
    let max_age_ms =
        i64::try_from(config.session_max_age_ms).context("SESSION_MAX_AGE_MS is out of range")?;

    Ok(SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE)
        .with_http_only(true)
        .with_secure(config.production)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(Duration::milliseconds(max_age_ms)))
        .with_signed(signing_key(&config.session_secret)?))
}

/// Stretches an arbitrary-length secret to the 64 bytes a cookie `Key` needs.
fn signing_key(secret: &str) -> Result<Key> {
    let digest = Sha512::digest(secret.as_bytes());
    Key::try_from(digest.as_slice()).context("failed to derive session signing key")
}
