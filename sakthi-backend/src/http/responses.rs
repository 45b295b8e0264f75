use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::accounts::{AccountSummary, CustomerAccount, PublicUser, Role};

#[derive(Debug, Deserialize)]
pub struct AdminLoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CustomerLoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    /// Display-only; authorization relies on the session cookie.
    pub token: String,
    pub user: PublicUser,
}

impl LoginResponse {
    pub fn new(user: PublicUser) -> Self {
        let prefix = match user.role {
            Role::Admin => "admin",
            Role::User => "user",
        };
        Self {
            success: true,
            token: format!("{prefix}-token-{}", user.id),
            user,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: PublicUser,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub success: bool,
    pub message: &'static str,
    pub user: PublicUser,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
    pub version: &'static str,
}

impl HealthResponse {
    pub fn now() -> Self {
        Self {
            status: "healthy",
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION"),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub stats: DashboardStats,
    pub recent_activity: Vec<Activity>,
}

#[derive(Debug, Serialize)]
pub struct DashboardStats {
    pub inquiries: u32,
    pub leads: u32,
    pub products: u32,
    pub countries: u32,
}

#[derive(Debug, Serialize)]
pub struct Activity {
    #[serde(rename = "type")]
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<&'static str>,
    pub time: &'static str,
}

pub fn dashboard_payload() -> DashboardResponse {
    DashboardResponse {
        stats: DashboardStats {
            inquiries: 156,
            leads: 89,
            products: 45,
            countries: 23,
        },
        recent_activity: vec![
            Activity {
                kind: "login",
                user: Some("admin"),
                customer: None,
                product: None,
                time: "2024-12-08 18:30:00",
            },
            Activity {
                kind: "quote_request",
                user: None,
                customer: Some("John Doe"),
                product: None,
                time: "2024-12-08 17:45:00",
            },
            Activity {
                kind: "product_view",
                user: None,
                customer: None,
                product: Some("Zinc Sulphate"),
                time: "2024-12-08 16:20:00",
            },
        ],
    }
}

#[derive(Debug, Serialize)]
pub struct UsersResponse {
    pub users: Vec<AccountSummary>,
    pub user_accounts: Vec<AccountSummary>,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub profile: Profile,
}

#[derive(Debug, Serialize)]
pub struct Profile {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub member_since: NaiveDate,
    pub orders_count: u32,
    pub last_login: String,
}

impl Profile {
    pub fn for_customer(customer: &CustomerAccount) -> Self {
        Self {
            id: customer.id.clone(),
            email: customer.email.clone(),
            name: customer.display_name.clone(),
            role: customer.role(),
            member_since: customer.created_at,
            orders_count: 12,
            last_login: Utc::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OrdersResponse {
    pub orders: Vec<Order>,
}

#[derive(Debug, Serialize)]
pub struct Order {
    pub id: &'static str,
    pub date: &'static str,
    pub product: &'static str,
    pub quantity: &'static str,
    pub status: &'static str,
    pub total: &'static str,
}

pub fn orders_payload() -> OrdersResponse {
    OrdersResponse {
        orders: vec![
            Order {
                id: "ORD-001",
                date: "2024-11-15",
                product: "Zinc Sulphate Heptahydrate",
                quantity: "500 kg",
                status: "Delivered",
                total: "$2,500",
            },
            Order {
                id: "ORD-002",
                date: "2024-10-20",
                product: "Ferrous Sulphate",
                quantity: "1000 kg",
                status: "Processing",
                total: "$1,800",
            },
        ],
    }
}
