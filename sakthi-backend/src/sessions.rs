//! Server-side sessions carried by a signed cookie.
//!
//! The cookie holds only an opaque session id. Cookies that fail signature verification, or
//! that name a session the store no longer holds, read as "no session".

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum_extra::extract::cookie::{Cookie, SameSite, SignedCookieJar};
use dashmap::DashMap;
use tracing::debug;

use crate::accounts::Role;

pub const SESSION_COOKIE: &str = "sakthi_session";

/// Longest session lifetime accepted; browsers cap cookie Max-Age at 400 days.
pub const MAX_SESSION_TTL: Duration = Duration::from_secs(400 * 24 * 60 * 60);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: String,
    pub role: Role,
    pub expires_at: Instant,
}

/// Session id -> session. Expired entries are dropped on lookup and by
/// [`SessionStore::purge_expired`].
#[derive(Debug, Clone)]
pub struct SessionStore {
    inner: Arc<DashMap<String, Session>>,
    ttl: Duration,
    secure_cookie: bool,
}

impl SessionStore {
    pub fn new(ttl: Duration, secure_cookie: bool) -> Self {
        Self {
            inner: Arc::new(DashMap::new()),
            ttl: ttl.min(MAX_SESSION_TTL),
            secure_cookie,
        }
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Start a session for `user_id`, replacing whatever session the jar pointed at.
    /// Returns the jar carrying the new cookie and the opaque session id.
    pub fn open(
        &self,
        jar: SignedCookieJar,
        user_id: &str,
        role: Role,
    ) -> (SignedCookieJar, String) {
        if let Some(previous) = session_id(&jar) {
            self.inner.remove(&previous);
        }

        let now = Instant::now();
        let expires_at = now
            .checked_add(self.ttl)
            .or_else(|| now.checked_add(MAX_SESSION_TTL))
            .unwrap_or(now);
        let token = uuid::Uuid::new_v4().to_string();
        self.inner.insert(
            token.clone(),
            Session {
                user_id: user_id.to_string(),
                role,
                expires_at,
            },
        );
        debug!(user_id, role = role.as_str(), "session opened");

        let jar = jar.add(self.cookie(token.clone()));
        (jar, token)
    }

    /// The live session the jar's cookie names, carrying the user id and role.
    pub fn current(&self, jar: &SignedCookieJar) -> Option<Session> {
        let token = session_id(jar)?;
        self.get(&token)
    }

    /// Drop the session and clear the cookie. Safe to call without a session.
    pub fn close(&self, jar: SignedCookieJar) -> SignedCookieJar {
        if let Some(token) = session_id(&jar) {
            if self.inner.remove(&token).is_some() {
                debug!("session closed");
            }
        }
        jar.remove(Cookie::build(SESSION_COOKIE).path("/"))
    }

    fn get(&self, token: &str) -> Option<Session> {
        let entry = self.inner.get(token)?;
        if entry.expires_at > Instant::now() {
            Some(entry.clone())
        } else {
            drop(entry);
            self.inner.remove(token);
            None
        }
    }

    /// Remove every expired session; returns how many were dropped.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.inner.len();
        self.inner.retain(|_, session| session.expires_at > now);
        before.saturating_sub(self.inner.len())
    }

    fn cookie(&self, token: String) -> Cookie<'static> {
        let max_age = i64::try_from(self.ttl.as_secs()).unwrap_or(i64::MAX);
        Cookie::build((SESSION_COOKIE, token))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure_cookie)
            .max_age(cookie::time::Duration::seconds(max_age))
            .build()
    }
}

fn session_id(jar: &SignedCookieJar) -> Option<String> {
    jar.get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty())
}
