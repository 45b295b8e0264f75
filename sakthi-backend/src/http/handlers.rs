use std::any::Any;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::header::HeaderName;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use axum_extra::extract::cookie::SignedCookieJar;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, error};

use crate::catalog::{BlogPost, ExportMarket, Product};

use super::error::ApiError;
use super::guard::{RequireAdmin, RequireSession};
use super::responses::{
    dashboard_payload, orders_payload, AdminLoginRequest, CustomerLoginRequest,
    DashboardResponse, HealthResponse, LoginResponse, MeResponse, MessageResponse,
    OrdersResponse, Profile, ProfileResponse, RegisterRequest, RegisterResponse, UsersResponse,
};
use super::state::AppState;

const REQUEST_ID_HEADER: &str = "x-request-id";

pub fn router(state: AppState) -> Router {
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    Router::new()
        .route("/api/health", get(health))
        .route("/api/auth/login", post(login))
        .route("/api/auth/user-login", post(user_login))
        .route("/api/auth/me", get(me))
        .route("/api/auth/register", post(register))
        .route("/api/auth/logout", post(logout))
        .route("/api/products", get(products))
        .route("/api/products/{id}", get(product_by_id))
        .route("/api/blog-posts", get(blog_posts))
        .route("/api/blog-posts/{slug}", get(blog_post_by_slug))
        .route("/api/export-markets", get(export_markets))
        .route("/api/admin/dashboard", get(admin_dashboard))
        .route("/api/admin/users", get(admin_users))
        .route("/api/user/profile", get(user_profile))
        .route("/api/user/orders", get(user_orders))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        // Outermost last: the id is set on the request before propagation copies it back.
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid::default()))
        .with_state(state)
}

fn handle_panic(_panic: Box<dyn Any + Send + 'static>) -> Response {
    error!("request handler panicked");
    ApiError::Internal.into_response()
}

fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload.map(|Json(value)| value).map_err(|rejection| {
        debug!(error = %rejection.body_text(), "invalid request body");
        ApiError::BadRequest("Invalid request body")
    })
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse::now())
}

async fn login(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    payload: Result<Json<AdminLoginRequest>, JsonRejection>,
) -> Result<(SignedCookieJar, Json<LoginResponse>), ApiError> {
    let request = json_body(payload)?;
    let outcome = state
        .auth
        .login_admin(
            jar,
            request.username.as_deref().unwrap_or_default(),
            request.password.as_deref().unwrap_or_default(),
        )
        .await?;
    Ok((outcome.jar, Json(LoginResponse::new(outcome.user))))
}

async fn user_login(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    payload: Result<Json<CustomerLoginRequest>, JsonRejection>,
) -> Result<(SignedCookieJar, Json<LoginResponse>), ApiError> {
    let request = json_body(payload)?;
    let outcome = state
        .auth
        .login_customer(
            jar,
            request.email.as_deref().unwrap_or_default(),
            request.password.as_deref().unwrap_or_default(),
        )
        .await?;
    Ok((outcome.jar, Json(LoginResponse::new(outcome.user))))
}

async fn me(
    State(state): State<AppState>,
    jar: SignedCookieJar,
) -> Result<Json<MeResponse>, ApiError> {
    let user = state.auth.current_user(&jar).await?;
    debug!(user_id = %user.id, "current user requested");
    Ok(Json(MeResponse { user }))
}

async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<Json<RegisterResponse>, ApiError> {
    let request = json_body(payload)?;
    let user = state
        .auth
        .register(
            request.name.as_deref().unwrap_or_default(),
            request.email.as_deref().unwrap_or_default(),
            request.password.as_deref().unwrap_or_default(),
        )
        .await?;
    Ok(Json(RegisterResponse {
        success: true,
        message: "Registration successful",
        user,
    }))
}

async fn logout(
    State(state): State<AppState>,
    jar: SignedCookieJar,
) -> (SignedCookieJar, Json<MessageResponse>) {
    let jar = state.auth.logout(jar);
    (
        jar,
        Json(MessageResponse {
            success: true,
            message: "Logged out successfully",
        }),
    )
}

async fn products(State(state): State<AppState>) -> Json<Vec<Product>> {
    let products = state.catalog.products().to_vec();
    debug!(products = products.len(), "products requested");
    Json(products)
}

async fn product_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Product>, ApiError> {
    let product = state
        .catalog
        .product(&id)
        .cloned()
        .ok_or(ApiError::NotFound("Product not found"))?;
    Ok(Json(product))
}

async fn blog_posts(State(state): State<AppState>) -> Json<Vec<BlogPost>> {
    let posts = state.catalog.blog_posts().to_vec();
    debug!(posts = posts.len(), "blog posts requested");
    Json(posts)
}

async fn blog_post_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<BlogPost>, ApiError> {
    let post = state
        .catalog
        .blog_post(&slug)
        .cloned()
        .ok_or(ApiError::NotFound("Blog post not found"))?;
    Ok(Json(post))
}

async fn export_markets(State(state): State<AppState>) -> Json<Vec<ExportMarket>> {
    let markets = state.catalog.export_markets().to_vec();
    debug!(markets = markets.len(), "export markets requested");
    Json(markets)
}

async fn admin_dashboard(RequireAdmin(admin): RequireAdmin) -> Json<DashboardResponse> {
    debug!(user_id = %admin.id, "admin dashboard requested");
    Json(dashboard_payload())
}

async fn admin_users(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> Json<UsersResponse> {
    let accounts = state.auth.accounts();
    let users = accounts.admins().iter().map(|a| a.summary()).collect();
    let user_accounts = accounts
        .customers()
        .await
        .iter()
        .map(|c| c.summary())
        .collect();
    debug!(user_id = %admin.id, "account listing requested");
    Json(UsersResponse {
        users,
        user_accounts,
    })
}

async fn user_profile(
    State(state): State<AppState>,
    RequireSession(session): RequireSession,
) -> Result<Json<ProfileResponse>, ApiError> {
    let customer = state
        .auth
        .accounts()
        .find_customer_by_id(&session.user_id)
        .await
        .ok_or(ApiError::NotFound("Profile not found"))?;
    Ok(Json(ProfileResponse {
        profile: Profile::for_customer(&customer),
    }))
}

async fn user_orders(RequireSession(session): RequireSession) -> Json<OrdersResponse> {
    debug!(user_id = %session.user_id, "orders requested");
    Json(orders_payload())
}
