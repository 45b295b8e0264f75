use std::sync::Arc;

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use tracing::warn;

use crate::auth::AuthService;
use crate::catalog::Catalog;

#[derive(Clone)]
pub struct AppState {
    pub auth: AuthService,
    pub catalog: Arc<Catalog>,
    pub cookie_key: Key,
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

/// Signing key for the session cookie. Secrets are validated to be at least 32 bytes by
/// the config loader; without one, a random key is used and sessions do not survive restarts.
pub fn cookie_key(secret: Option<&str>) -> Key {
    match secret {
        Some(secret) => Key::derive_from(secret.as_bytes()),
        None => {
            warn!("no session secret configured; using a random cookie signing key");
            Key::generate()
        }
    }
}
