#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::module_inception)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use anyhow::Result;
    use axum::http::{HeaderName, HeaderValue, StatusCode};
    use axum_extra::extract::cookie::{Cookie, Key};
    use axum_test::TestServer;
    use serde_json::{json, Value};

    use crate::accounts::{demo_seed, AccountStore};
    use crate::auth::AuthService;
    use crate::catalog::Catalog;
    use crate::password::cheap_hasher;
    use crate::sessions::{SessionStore, SESSION_COOKIE};

    use crate::http::{router, AppState};

    fn test_app_state() -> AppState {
        let hasher = cheap_hasher();
        let accounts = Arc::new(AccountStore::from_seed(demo_seed(), &hasher).unwrap());
        let sessions = SessionStore::new(Duration::from_secs(3600), false);
        AppState {
            auth: AuthService::new(accounts, sessions, hasher).unwrap(),
            catalog: Arc::new(Catalog::seeded()),
            cookie_key: Key::generate(),
        }
    }

    fn test_server() -> Result<TestServer> {
        let mut server = TestServer::new(router(test_app_state()))?;
        server.save_cookies();
        Ok(server)
    }

    fn error_message(body: &Value) -> Option<&str> {
        body.get("error").and_then(Value::as_str)
    }

    async fn login_admin(server: &TestServer) {
        let response = server
            .post("/api/auth/login")
            .json(&json!({ "username": "admin", "password": "admin123" }))
            .await;
        assert_eq!(response.status_code(), StatusCode::OK);
    }

    async fn login_customer(server: &TestServer) {
        let response = server
            .post("/api/auth/user-login")
            .json(&json!({ "email": "user@example.com", "password": "password" }))
            .await;
        assert_eq!(response.status_code(), StatusCode::OK);
    }

    #[tokio::test]
    async fn health_reports_status_and_version() -> Result<()> {
        let server = test_server()?;
        let response = server.get("/api/health").await;
        assert_eq!(response.status_code(), StatusCode::OK);

        let body: Value = response.json();
        assert_eq!(body.get("status"), Some(&Value::String("healthy".into())));
        assert_eq!(
            body.get("version").and_then(Value::as_str),
            Some(env!("CARGO_PKG_VERSION"))
        );
        assert!(body.get("timestamp").and_then(Value::as_str).is_some());
        assert!(response.headers().contains_key("x-request-id"));
        Ok(())
    }

    #[tokio::test]
    async fn every_response_carries_a_request_id() -> Result<()> {
        let server = test_server()?;

        let generated = server.get("/api/products/prod-404").await;
        assert_eq!(generated.status_code(), StatusCode::NOT_FOUND);
        let id = generated
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        assert!(uuid::Uuid::parse_str(id).is_ok(), "{id:?}");

        let echoed = server
            .get("/api/health")
            .add_header(
                HeaderName::from_static("x-request-id"),
                HeaderValue::from_static("req-42"),
            )
            .await;
        assert_eq!(
            echoed.headers().get("x-request-id"),
            Some(&HeaderValue::from_static("req-42"))
        );
        Ok(())
    }

    #[tokio::test]
    async fn admin_login_returns_user_view_and_sets_cookie() -> Result<()> {
        let server = test_server()?;
        let response = server
            .post("/api/auth/login")
            .json(&json!({ "username": "admin", "password": "admin123" }))
            .await;
        assert_eq!(response.status_code(), StatusCode::OK);

        let cookie = response.cookie(SESSION_COOKIE);
        assert_eq!(cookie.http_only(), Some(true));
        assert!(cookie.max_age().is_some());

        let body: Value = response.json();
        assert_eq!(body.get("success"), Some(&Value::Bool(true)));
        assert_eq!(
            body.get("token"),
            Some(&Value::String("admin-token-admin-1".into()))
        );
        let user = body.get("user").cloned().unwrap_or_default();
        assert_eq!(user.get("id"), Some(&Value::String("admin-1".into())));
        assert_eq!(user.get("username"), Some(&Value::String("admin".into())));
        assert_eq!(user.get("role"), Some(&Value::String("admin".into())));
        assert_eq!(
            user.get("name"),
            Some(&Value::String("Administrator".into()))
        );
        assert!(user.get("password_hash").is_none());
        Ok(())
    }

    #[tokio::test]
    async fn admin_login_then_me_returns_admin() -> Result<()> {
        let server = test_server()?;
        login_admin(&server).await;

        let response = server.get("/api/auth/me").await;
        assert_eq!(response.status_code(), StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(
            body.pointer("/user/role"),
            Some(&Value::String("admin".into()))
        );
        assert!(body.pointer("/user/password_hash").is_none());
        Ok(())
    }

    #[tokio::test]
    async fn customer_login_then_me_returns_customer() -> Result<()> {
        let server = test_server()?;
        let response = server
            .post("/api/auth/user-login")
            .json(&json!({ "email": "user@example.com", "password": "password" }))
            .await;
        assert_eq!(response.status_code(), StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(
            body.get("token"),
            Some(&Value::String("user-token-user-1".into()))
        );
        assert_eq!(
            body.pointer("/user/username"),
            Some(&Value::String("user@example.com".into()))
        );

        let me: Value = server.get("/api/auth/me").await.json();
        assert_eq!(me.pointer("/user/id"), Some(&Value::String("user-1".into())));
        assert_eq!(me.pointer("/user/role"), Some(&Value::String("user".into())));
        Ok(())
    }

    #[tokio::test]
    async fn login_with_missing_fields_is_bad_request() -> Result<()> {
        let server = test_server()?;

        let response = server
            .post("/api/auth/login")
            .json(&json!({ "username": "admin" }))
            .await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            error_message(&response.json()),
            Some("Username and password required")
        );

        let response = server
            .post("/api/auth/user-login")
            .json(&json!({ "email": "", "password": "password" }))
            .await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            error_message(&response.json()),
            Some("Email and password required")
        );
        Ok(())
    }

    #[tokio::test]
    async fn malformed_body_is_bad_request() -> Result<()> {
        let server = test_server()?;
        let response = server.post("/api/auth/login").text("username=admin").await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(error_message(&response.json()), Some("Invalid request body"));
        Ok(())
    }

    #[tokio::test]
    async fn bad_credentials_get_uniform_unauthorized() -> Result<()> {
        let server = test_server()?;

        let wrong_password = server
            .post("/api/auth/login")
            .json(&json!({ "username": "admin", "password": "nope" }))
            .await;
        let unknown_user = server
            .post("/api/auth/login")
            .json(&json!({ "username": "ghost", "password": "admin123" }))
            .await;
        let unknown_email = server
            .post("/api/auth/user-login")
            .json(&json!({ "email": "ghost@example.com", "password": "password" }))
            .await;

        for response in [wrong_password, unknown_user, unknown_email] {
            assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
            assert_eq!(error_message(&response.json()), Some("Invalid credentials"));
        }
        Ok(())
    }

    #[tokio::test]
    async fn me_without_session_is_unauthorized() -> Result<()> {
        let server = test_server()?;
        let response = server.get("/api/auth/me").await;
        assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            error_message(&response.json()),
            Some("Authentication required")
        );
        Ok(())
    }

    #[tokio::test]
    async fn tampered_cookie_is_treated_as_no_session() -> Result<()> {
        let server = TestServer::new(router(test_app_state()))?;
        let response = server
            .get("/api/user/orders")
            .add_cookie(Cookie::new(SESSION_COOKIE, "forged-session-id"))
            .await;
        assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
        Ok(())
    }

    #[tokio::test]
    async fn admin_dashboard_admits_admin_and_forbids_customer() -> Result<()> {
        let server = test_server()?;

        login_admin(&server).await;
        let response = server.get("/api/admin/dashboard").await;
        assert_eq!(response.status_code(), StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(
            body.pointer("/stats/inquiries"),
            Some(&Value::Number(156.into()))
        );
        assert_eq!(
            body.get("recent_activity")
                .and_then(Value::as_array)
                .map(Vec::len),
            Some(3)
        );
        assert_eq!(
            body.pointer("/recent_activity/0/type"),
            Some(&Value::String("login".into()))
        );

        login_customer(&server).await;
        let response = server.get("/api/admin/dashboard").await;
        assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            error_message(&response.json()),
            Some("Admin access required")
        );

        // The same customer session still passes the plain session guard.
        let response = server.get("/api/user/orders").await;
        assert_eq!(response.status_code(), StatusCode::OK);
        Ok(())
    }

    #[tokio::test]
    async fn admin_routes_without_session_are_unauthorized() -> Result<()> {
        let server = test_server()?;
        for path in ["/api/admin/dashboard", "/api/admin/users"] {
            let response = server.get(path).await;
            assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
        }
        Ok(())
    }

    #[tokio::test]
    async fn admin_user_listing_never_exposes_hashes() -> Result<()> {
        let server = test_server()?;
        login_admin(&server).await;

        let response = server.get("/api/admin/users").await;
        assert_eq!(response.status_code(), StatusCode::OK);
        let body: Value = response.json();

        let users = body
            .get("users")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        let customers = body
            .get("user_accounts")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        assert_eq!(users.len(), 1);
        assert_eq!(customers.len(), 2);
        for account in users.iter().chain(customers.iter()) {
            assert!(account.get("password_hash").is_none());
            assert!(account.get("created_at").is_some());
        }
        assert!(!response.text().contains("argon2"));
        Ok(())
    }

    #[tokio::test]
    async fn register_then_duplicate_conflicts() -> Result<()> {
        let server = test_server()?;
        let payload = json!({ "name": "Jane", "email": "jane@x.com", "password": "pw1" });

        let first = server.post("/api/auth/register").json(&payload).await;
        assert_eq!(first.status_code(), StatusCode::OK);
        let body: Value = first.json();
        assert_eq!(body.get("success"), Some(&Value::Bool(true)));
        assert_eq!(
            body.get("message"),
            Some(&Value::String("Registration successful".into()))
        );
        assert_eq!(body.pointer("/user/id"), Some(&Value::String("user-3".into())));
        assert_eq!(body.pointer("/user/role"), Some(&Value::String("user".into())));
        assert!(body.pointer("/user/password_hash").is_none());

        let second = server.post("/api/auth/register").json(&payload).await;
        assert_eq!(second.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            error_message(&second.json()),
            Some("Email already registered")
        );

        login_admin(&server).await;
        let listing: Value = server.get("/api/admin/users").await.json();
        let jane_count = listing
            .get("user_accounts")
            .and_then(Value::as_array)
            .map(|accounts| {
                accounts
                    .iter()
                    .filter(|a| a.get("email") == Some(&Value::String("jane@x.com".into())))
                    .count()
            });
        assert_eq!(jane_count, Some(1));
        Ok(())
    }

    #[tokio::test]
    async fn register_does_not_log_in() -> Result<()> {
        let server = test_server()?;
        let response = server
            .post("/api/auth/register")
            .json(&json!({ "name": "Jane", "email": "jane@x.com", "password": "pw1" }))
            .await;
        assert_eq!(response.status_code(), StatusCode::OK);

        let me = server.get("/api/auth/me").await;
        assert_eq!(me.status_code(), StatusCode::UNAUTHORIZED);

        let login = server
            .post("/api/auth/user-login")
            .json(&json!({ "email": "jane@x.com", "password": "pw1" }))
            .await;
        assert_eq!(login.status_code(), StatusCode::OK);
        Ok(())
    }

    #[tokio::test]
    async fn register_requires_all_fields() -> Result<()> {
        let server = test_server()?;
        let response = server
            .post("/api/auth/register")
            .json(&json!({ "name": "Jane", "email": "jane@x.com" }))
            .await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            error_message(&response.json()),
            Some("Name, email, and password are required")
        );
        Ok(())
    }

    #[tokio::test]
    async fn logout_ends_session_and_is_idempotent() -> Result<()> {
        let server = test_server()?;
        login_customer(&server).await;
        assert_eq!(
            server.get("/api/user/profile").await.status_code(),
            StatusCode::OK
        );

        for _ in 0..2 {
            let response = server.post("/api/auth/logout").await;
            assert_eq!(response.status_code(), StatusCode::OK);
            let body: Value = response.json();
            assert_eq!(body.get("success"), Some(&Value::Bool(true)));
            assert_eq!(
                body.get("message"),
                Some(&Value::String("Logged out successfully".into()))
            );
        }

        for path in ["/api/auth/me", "/api/user/profile", "/api/user/orders"] {
            let response = server.get(path).await;
            assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
        }
        Ok(())
    }

    #[tokio::test]
    async fn logout_without_session_succeeds() -> Result<()> {
        let server = test_server()?;
        let response = server.post("/api/auth/logout").await;
        assert_eq!(response.status_code(), StatusCode::OK);
        Ok(())
    }

    #[tokio::test]
    async fn customer_profile_and_orders() -> Result<()> {
        let server = test_server()?;
        login_customer(&server).await;

        let profile: Value = server.get("/api/user/profile").await.json();
        assert_eq!(
            profile.pointer("/profile/id"),
            Some(&Value::String("user-1".into()))
        );
        assert_eq!(
            profile.pointer("/profile/member_since"),
            Some(&Value::String("2024-01-15".into()))
        );
        assert_eq!(
            profile.pointer("/profile/orders_count"),
            Some(&Value::Number(12.into()))
        );

        let orders: Value = server.get("/api/user/orders").await.json();
        assert_eq!(
            orders.get("orders").and_then(Value::as_array).map(Vec::len),
            Some(2)
        );
        assert_eq!(
            orders.pointer("/orders/0/id"),
            Some(&Value::String("ORD-001".into()))
        );
        Ok(())
    }

    #[tokio::test]
    async fn admin_has_no_customer_profile() -> Result<()> {
        let server = test_server()?;
        login_admin(&server).await;
        let response = server.get("/api/user/profile").await;
        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(error_message(&response.json()), Some("Profile not found"));
        Ok(())
    }

    #[tokio::test]
    async fn products_are_public_and_unchanged() -> Result<()> {
        let server = test_server()?;
        let response = server.get("/api/products").await;
        assert_eq!(response.status_code(), StatusCode::OK);

        let body: Value = response.json();
        let expected = serde_json::to_value(Catalog::seeded().products())?;
        assert_eq!(body, expected);
        assert_eq!(body.as_array().map(Vec::len), Some(7));
        Ok(())
    }

    #[tokio::test]
    async fn blog_posts_and_markets_are_public() -> Result<()> {
        let server = test_server()?;

        let posts: Value = server.get("/api/blog-posts").await.json();
        assert_eq!(posts.as_array().map(Vec::len), Some(3));
        assert_eq!(
            posts.pointer("/0/slug"),
            Some(&Value::String("modern-agricultural-practices".into()))
        );

        let markets: Value = server.get("/api/export-markets").await.json();
        assert_eq!(markets.as_array().map(Vec::len), Some(6));
        assert_eq!(
            markets.pointer("/5/countryCode"),
            Some(&Value::String("NL".into()))
        );
        Ok(())
    }

    #[tokio::test]
    async fn single_product_and_post_lookups() -> Result<()> {
        let server = test_server()?;

        let product = server.get("/api/products/prod-2").await;
        assert_eq!(product.status_code(), StatusCode::OK);
        let body: Value = product.json();
        assert_eq!(body.get("name"), Some(&Value::String("Cito Max".into())));

        let missing = server.get("/api/products/prod-404").await;
        assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(error_message(&missing.json()), Some("Product not found"));

        let post = server
            .get("/api/blog-posts/micronutrients-crop-nutrition")
            .await;
        assert_eq!(post.status_code(), StatusCode::OK);

        let missing = server.get("/api/blog-posts/nope").await;
        assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);
        Ok(())
    }
}
