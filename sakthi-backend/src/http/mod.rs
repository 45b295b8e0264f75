//! HTTP layer: Axum router, guards, handlers and responses.
//!
//! Exposes the auth endpoints under `/api/auth`, the public catalog, and the
//! session-gated `/api/user` and admin-gated `/api/admin` routes.

mod error;
mod guard;
mod handlers;
mod responses;
mod state;

#[cfg(test)]
mod tests;

pub use handlers::router;
pub use state::{cookie_key, AppState};
