//! Credential store: administrator and customer accounts held in memory.
//!
//! ## Seed file format
//!
//! Accounts are seeded at startup, either from the built-in demo accounts or from a TOML file:
//!
//! ```toml
//! [[admins]]
//! id = "admin-1"
//! username = "admin"
//! email = "admin@sakthisaibiotech.com"
//! password = "admin123"
//! name = "Administrator"
//! created_at = "2024-01-01"
//!
//! [[customers]]
//! id = "user-1"
//! email = "user@example.com"
//! password = "password"
//! name = "Customer User"
//! ```
//!
//! Ids are optional (`admin-N` / `user-N` are assigned in file order, skipping ids already
//! taken) and `created_at` defaults to today. An explicit id used by two accounts is an error.
//! Entries with an empty username, email or password are skipped. Duplicate admin usernames
//! are deduplicated (last wins). At least one admin is required.
//!
//! **Security:** seed files carry plaintext passwords. Use `chmod 600`; the server warns if the
//! file is world-readable (Unix).

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::warn;

use crate::password::{PasswordError, PasswordHasher};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }
}

#[derive(Debug, Clone)]
pub struct AdminAccount {
    pub id: String,
    pub login_name: String,
    pub email: String,
    pub password_hash: String,
    pub display_name: String,
    pub created_at: NaiveDate,
}

#[derive(Debug, Clone)]
pub struct CustomerAccount {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub display_name: String,
    pub created_at: NaiveDate,
}

/// Account view safe to hand to clients: never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublicUser {
    pub id: String,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub name: String,
}

/// Admin-listing view of an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountSummary {
    pub id: String,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub name: String,
    pub created_at: NaiveDate,
}

impl AdminAccount {
    pub fn role(&self) -> Role {
        Role::Admin
    }

    pub fn public(&self) -> PublicUser {
        PublicUser {
            id: self.id.clone(),
            username: self.login_name.clone(),
            email: self.email.clone(),
            role: self.role(),
            name: self.display_name.clone(),
        }
    }

    pub fn summary(&self) -> AccountSummary {
        AccountSummary {
            id: self.id.clone(),
            username: self.login_name.clone(),
            email: self.email.clone(),
            role: self.role(),
            name: self.display_name.clone(),
            created_at: self.created_at,
        }
    }
}

impl CustomerAccount {
    pub fn role(&self) -> Role {
        Role::User
    }

    pub fn public(&self) -> PublicUser {
        PublicUser {
            id: self.id.clone(),
            username: self.email.clone(),
            email: self.email.clone(),
            role: self.role(),
            name: self.display_name.clone(),
        }
    }

    pub fn summary(&self) -> AccountSummary {
        AccountSummary {
            id: self.id.clone(),
            username: self.email.clone(),
            email: self.email.clone(),
            role: self.role(),
            name: self.display_name.clone(),
            created_at: self.created_at,
        }
    }
}

/// Customer record ready to be appended; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewCustomer {
    pub email: String,
    pub password_hash: String,
    pub display_name: String,
    pub created_at: NaiveDate,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("email already registered")]
    DuplicateEmail,
}

const ADMIN_ID_PREFIX: &str = "admin-";
const CUSTOMER_ID_PREFIX: &str = "user-";

pub fn is_admin_shaped(id: &str) -> bool {
    id.starts_with(ADMIN_ID_PREFIX)
}

/// Administrators keyed by login name (immutable after startup) and an append-only
/// customer list. Appends hold the write lock across the uniqueness check and the insert.
#[derive(Debug)]
pub struct AccountStore {
    admins: BTreeMap<String, AdminAccount>,
    customers: RwLock<Vec<CustomerAccount>>,
}

impl AccountStore {
    pub fn new(admins: Vec<AdminAccount>, customers: Vec<CustomerAccount>) -> Self {
        let admins = admins
            .into_iter()
            .map(|admin| (admin.login_name.clone(), admin))
            .collect();
        Self {
            admins,
            customers: RwLock::new(customers),
        }
    }

    /// Hash the seed passwords and build the store.
    pub fn from_seed(seed: SeedAccounts, hasher: &PasswordHasher) -> Result<Self, PasswordError> {
        let mut admins = Vec::with_capacity(seed.admins.len());
        for admin in seed.admins {
            admins.push(AdminAccount {
                password_hash: hasher.hash(&admin.password)?,
                id: admin.id,
                login_name: admin.username,
                email: admin.email,
                display_name: admin.name,
                created_at: admin.created_at,
            });
        }

        let mut customers = Vec::with_capacity(seed.customers.len());
        for customer in seed.customers {
            customers.push(CustomerAccount {
                password_hash: hasher.hash(&customer.password)?,
                id: customer.id,
                email: customer.email,
                display_name: customer.name,
                created_at: customer.created_at,
            });
        }

        Ok(Self::new(admins, customers))
    }

    pub fn admin_count(&self) -> usize {
        self.admins.len()
    }

    pub async fn customer_count(&self) -> usize {
        self.customers.read().await.len()
    }

    pub fn find_admin_by_login(&self, login_name: &str) -> Option<&AdminAccount> {
        self.admins.get(login_name)
    }

    pub fn find_admin_by_id(&self, id: &str) -> Option<&AdminAccount> {
        self.admins.values().find(|admin| admin.id == id)
    }

    pub async fn find_customer_by_email(&self, email: &str) -> Option<CustomerAccount> {
        let customers = self.customers.read().await;
        customers.iter().find(|c| c.email == email).cloned()
    }

    pub async fn find_customer_by_id(&self, id: &str) -> Option<CustomerAccount> {
        let customers = self.customers.read().await;
        customers.iter().find(|c| c.id == id).cloned()
    }

    pub fn admins(&self) -> Vec<AdminAccount> {
        self.admins.values().cloned().collect()
    }

    pub async fn customers(&self) -> Vec<CustomerAccount> {
        self.customers.read().await.clone()
    }

    pub async fn append_customer(&self, new: NewCustomer) -> Result<CustomerAccount, StoreError> {
        let mut customers = self.customers.write().await;
        if customers.iter().any(|c| c.email == new.email) {
            return Err(StoreError::DuplicateEmail);
        }

        let id = Self::next_customer_id(&customers);
        let account = CustomerAccount {
            id,
            email: new.email,
            password_hash: new.password_hash,
            display_name: new.display_name,
            created_at: new.created_at,
        };
        customers.push(account.clone());
        Ok(account)
    }

    /// `user-N` above every numeric customer id in use. Admin ids never carry this prefix.
    fn next_customer_id(customers: &[CustomerAccount]) -> String {
        let highest = customers
            .iter()
            .filter_map(|c| c.id.strip_prefix(CUSTOMER_ID_PREFIX))
            .filter_map(|n| n.parse::<u64>().ok())
            .max()
            .unwrap_or(0);

        let mut next = highest + 1;
        loop {
            let candidate = format!("{CUSTOMER_ID_PREFIX}{next}");
            if !customers.iter().any(|c| c.id == candidate) {
                return candidate;
            }
            next += 1;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedAdmin {
    pub id: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub name: String,
    pub created_at: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedCustomer {
    pub id: String,
    pub email: String,
    pub password: String,
    pub name: String,
    pub created_at: NaiveDate,
}

#[derive(Debug, Clone, Default)]
pub struct SeedAccounts {
    pub admins: Vec<SeedAdmin>,
    pub customers: Vec<SeedCustomer>,
}

#[derive(Debug, Error)]
pub enum SeedFileError {
    #[error("failed to read seed file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid seed file {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
    #[error("seed file {path} does not define an administrator")]
    NoAdmin { path: String },
    #[error("seed file {path} assigns id {id} to more than one account")]
    DuplicateId { path: String, id: String },
}

#[derive(Debug, Default, Deserialize)]
struct SeedFile {
    #[serde(default)]
    admins: Vec<SeedAdminEntry>,
    #[serde(default)]
    customers: Vec<SeedCustomerEntry>,
}

#[derive(Debug, Deserialize)]
struct SeedAdminEntry {
    id: Option<String>,
    username: String,
    email: String,
    password: String,
    name: Option<String>,
    created_at: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
struct SeedCustomerEntry {
    id: Option<String>,
    email: String,
    password: String,
    name: Option<String>,
    created_at: Option<NaiveDate>,
}

fn seed_date(raw: &str) -> NaiveDate {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").unwrap_or_else(|_| Utc::now().date_naive())
}

/// Demo accounts used when no seed file is configured.
pub fn demo_seed() -> SeedAccounts {
    SeedAccounts {
        admins: vec![SeedAdmin {
            id: String::from("admin-1"),
            username: String::from("admin"),
            email: String::from("admin@sakthisaibiotech.com"),
            password: String::from("admin123"),
            name: String::from("Administrator"),
            created_at: seed_date("2024-01-01"),
        }],
        customers: vec![
            SeedCustomer {
                id: String::from("user-1"),
                email: String::from("user@example.com"),
                password: String::from("password"),
                name: String::from("Customer User"),
                created_at: seed_date("2024-01-15"),
            },
            SeedCustomer {
                id: String::from("user-2"),
                email: String::from("distributor@example.com"),
                password: String::from("password"),
                name: String::from("Distributor Account"),
                created_at: seed_date("2024-02-01"),
            },
        ],
    }
}

/// Load seed accounts from a file, or the demo accounts if path is None.
/// Warns if the seed file is world-readable (Unix only).
pub fn load_seed(path: Option<&Path>) -> Result<SeedAccounts, SeedFileError> {
    let Some(path) = path else {
        return Ok(demo_seed());
    };
    check_seed_file_permissions(path);

    let raw = std::fs::read_to_string(path).map_err(|source| SeedFileError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let parsed: SeedFile = toml::from_str(&raw).map_err(|source| SeedFileError::Parse {
        path: path.display().to_string(),
        source,
    })?;

    let seed = seed_from_file(parsed).map_err(|id| SeedFileError::DuplicateId {
        path: path.display().to_string(),
        id,
    })?;
    if seed.admins.is_empty() {
        return Err(SeedFileError::NoAdmin {
            path: path.display().to_string(),
        });
    }
    Ok(seed)
}

/// Normalize seed entries and assign ids. Explicit ids must be unique across both collections
/// (the offending id is returned otherwise); missing ids take the first free `prefix-N`.
fn seed_from_file(file: SeedFile) -> Result<SeedAccounts, String> {
    let today = Utc::now().date_naive();

    let mut admins: BTreeMap<String, (usize, SeedAdminEntry)> = BTreeMap::new();
    for (idx, entry) in file.admins.into_iter().enumerate() {
        let username = entry.username.trim().to_string();
        if username.is_empty() || entry.password.trim().is_empty() {
            continue;
        }
        admins.insert(username, (idx, entry));
    }

    let mut customers: Vec<(usize, SeedCustomerEntry)> = Vec::new();
    for (idx, entry) in file.customers.into_iter().enumerate() {
        let email = entry.email.trim();
        if email.is_empty() || entry.password.trim().is_empty() {
            continue;
        }
        if customers.iter().any(|(_, c)| c.email.trim() == email) {
            warn!(email = %email, "duplicate customer email in seed file; keeping the first");
            continue;
        }
        customers.push((idx, entry));
    }

    let mut used: HashSet<String> = HashSet::new();
    let admin_ids = admins
        .values()
        .map(|(_, entry)| entry.id.clone().filter(|id| is_admin_shaped(id)));
    let customer_ids = customers
        .iter()
        .map(|(_, entry)| entry.id.clone().filter(|id| id.starts_with(CUSTOMER_ID_PREFIX)));
    for id in admin_ids.chain(customer_ids).flatten() {
        if !used.insert(id.clone()) {
            return Err(id);
        }
    }

    let admins = admins
        .into_iter()
        .map(|(username, (idx, entry))| {
            let id = match entry.id.filter(|id| is_admin_shaped(id)) {
                Some(id) => id,
                None => free_seed_id(ADMIN_ID_PREFIX, idx + 1, &mut used),
            };
            SeedAdmin {
                id,
                name: entry.name.unwrap_or_else(|| username.clone()),
                username,
                email: entry.email.trim().to_string(),
                password: entry.password.trim().to_string(),
                created_at: entry.created_at.unwrap_or(today),
            }
        })
        .collect();

    let customers = customers
        .into_iter()
        .map(|(idx, entry)| {
            let id = match entry.id.filter(|id| id.starts_with(CUSTOMER_ID_PREFIX)) {
                Some(id) => id,
                None => free_seed_id(CUSTOMER_ID_PREFIX, idx + 1, &mut used),
            };
            let email = entry.email.trim().to_string();
            SeedCustomer {
                id,
                name: entry.name.unwrap_or_else(|| email.clone()),
                email,
                password: entry.password.trim().to_string(),
                created_at: entry.created_at.unwrap_or(today),
            }
        })
        .collect();

    Ok(SeedAccounts { admins, customers })
}

fn free_seed_id(prefix: &str, start: usize, used: &mut HashSet<String>) -> String {
    let mut n = start;
    loop {
        let candidate = format!("{prefix}{n}");
        if used.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}

#[cfg(unix)]
fn check_seed_file_permissions(path: &Path) {
    use std::os::unix::fs::PermissionsExt;
    if let Ok(meta) = std::fs::metadata(path) {
        let mode = meta.permissions().mode();
        if mode & 0o004 != 0 {
            warn!(
                path = %path.display(),
                "seed file is world-readable; consider chmod 600"
            );
        }
    }
}

#[cfg(not(unix))]
fn check_seed_file_permissions(_path: &Path) {}
