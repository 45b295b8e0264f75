//! # sakthi-backend
//!
//! Session-authenticated JSON API for the Sakthi Sai Biotech catalog site.
//!
//! ## Architecture
//!
//! - **Accounts**: in-memory administrator and customer collections, seeded at startup
//! - **Sessions**: server-side sessions behind a signed, persistent cookie
//! - **Auth**: admin and customer login, self-registration, current-user resolution
//! - **Catalog**: fixed products, blog posts and export markets
//! - **HTTP**: Axum router with session/admin guards, request IDs and graceful shutdown

#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used, clippy::expect_used)]

mod accounts;
mod auth;
mod catalog;
mod config;
mod http;
mod password;
mod sessions;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::serve;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::accounts::{load_seed, AccountStore};
use crate::auth::AuthService;
use crate::catalog::Catalog;
use crate::config::{AppConfig, Cli};
use crate::http::{cookie_key, router, AppState};
use crate::password::PasswordHasher;
use crate::sessions::SessionStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging().context("failed to initialize logging")?;

    let cli = Cli::parse();
    let config = AppConfig::from_cli(cli).context("failed to load configuration")?;
    info!(
        bind = %config.bind,
        seed_file = ?config.seed_file.as_ref().map(|path| path.display().to_string()),
        session_ttl = %humantime::format_duration(config.session_ttl),
        secure_cookie = config.secure_cookie,
        "configuration loaded"
    );

    let hasher =
        PasswordHasher::new(config.password_cost).context("invalid password hashing cost")?;
    let seed = load_seed(config.seed_file.as_deref()).context("failed to load seed accounts")?;
    let seed_hasher = hasher.clone();
    let accounts = tokio::task::spawn_blocking(move || AccountStore::from_seed(seed, &seed_hasher))
        .await
        .context("seed hashing task failed")?
        .context("failed to hash seed accounts")?;
    info!(
        admins = accounts.admin_count(),
        customers = accounts.customer_count().await,
        "accounts seeded"
    );

    let sessions = SessionStore::new(config.session_ttl, config.secure_cookie);
    spawn_session_purge(sessions.clone(), config.session_purge_interval);

    let auth = AuthService::new(Arc::new(accounts), sessions, hasher)
        .context("failed to initialize auth service")?;
    let catalog = Catalog::seeded();
    info!(
        products = catalog.products().len(),
        blog_posts = catalog.blog_posts().len(),
        export_markets = catalog.export_markets().len(),
        "catalog loaded"
    );

    let state = AppState {
        auth,
        catalog: Arc::new(catalog),
        cookie_key: cookie_key(config.session_secret.as_deref()),
    };

    let app = router(state);
    let listener = TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;

    if config.bind.ip().is_loopback() {
        tracing::warn!(
            bind = %config.bind,
            "binding to loopback; use --bind 0.0.0.0:5000 for LAN access"
        );
    }

    let shutdown = tokio::signal::ctrl_c();
    info!(bind = %config.bind, "sakthi-backend listening");

    serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = shutdown.await;
            info!("shutting down gracefully");
        })
        .await
        .context("server exited with error")
}

/// Initialize tracing subscriber with `RUST_LOG` env filter (default: `info`).
fn init_logging() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    Ok(())
}

/// Spawns a background task that drops expired sessions at the given interval.
fn spawn_session_purge(sessions: SessionStore, interval: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            let purged = sessions.purge_expired();
            if purged > 0 {
                debug!(purged, remaining = sessions.len(), "expired sessions purged");
            }
        }
    });
}
