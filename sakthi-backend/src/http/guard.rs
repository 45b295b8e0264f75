//! Request guards for protected routes.
//!
//! [`RequireSession`] and [`RequireAdmin`] are extractors: a handler that takes one never
//! runs for a request the guard rejects. The `require_*` functions are the same checks in
//! plain form.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::cookie::SignedCookieJar;
use tracing::{debug, warn};

use crate::accounts::AdminAccount;
use crate::sessions::Session;

use super::error::ApiError;
use super::state::AppState;

/// Admits any request carrying a live session.
pub struct RequireSession(pub Session);

/// Admits only sessions that resolve to an administrator account.
pub struct RequireAdmin(pub AdminAccount);

pub fn require_authenticated(
    state: &AppState,
    jar: &SignedCookieJar,
) -> Result<Session, ApiError> {
    state.auth.session(jar).map_err(|err| {
        debug!("request rejected: no session");
        ApiError::from(err)
    })
}

pub async fn require_admin(
    state: &AppState,
    jar: &SignedCookieJar,
) -> Result<AdminAccount, ApiError> {
    let session = require_authenticated(state, jar)?;
    state.auth.admin_for_session(&session).await.map_err(|err| {
        warn!(user_id = %session.user_id, "admin access denied");
        ApiError::from(err)
    })
}

fn request_jar(parts: &Parts, state: &AppState) -> SignedCookieJar {
    SignedCookieJar::from_headers(&parts.headers, state.cookie_key.clone())
}

impl FromRequestParts<AppState> for RequireSession {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = request_jar(parts, state);
        require_authenticated(state, &jar).map(Self)
    }
}

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = request_jar(parts, state);
        require_admin(state, &jar).await.map(Self)
    }
}
