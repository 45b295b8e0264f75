//! Login, registration and session resolution over the two account collections.
//!
//! Both login flows fail with the same "Invalid credentials" error whether the account is
//! missing or the password is wrong, and a missing account is verified against a decoy hash
//! so the two cases cost the same.

use std::sync::Arc;

use axum_extra::extract::cookie::SignedCookieJar;
use chrono::Utc;
use thiserror::Error;
use tracing::{info, warn};

use crate::accounts::{
    is_admin_shaped, AccountStore, AdminAccount, CustomerAccount, NewCustomer, PublicUser, Role,
    StoreError,
};
use crate::password::{PasswordError, PasswordHasher};
use crate::sessions::{Session, SessionStore};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("{0}")]
    Validation(&'static str),
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Authentication required")]
    AuthRequired,
    #[error("Admin access required")]
    Forbidden,
    #[error("{0}")]
    Conflict(&'static str),
    #[error("{0}")]
    NotFound(&'static str),
    #[error("internal server error")]
    Internal,
}

/// Account resolved from a session.
#[derive(Debug, Clone)]
pub enum CurrentAccount {
    Admin(AdminAccount),
    Customer(CustomerAccount),
}

impl CurrentAccount {
    pub fn public(&self) -> PublicUser {
        match self {
            CurrentAccount::Admin(admin) => admin.public(),
            CurrentAccount::Customer(customer) => customer.public(),
        }
    }
}

/// Successful login: the cookie jar to send back and the user view.
#[derive(Debug)]
pub struct LoginOutcome {
    pub jar: SignedCookieJar,
    pub user: PublicUser,
}

#[derive(Debug, Clone)]
pub struct AuthService {
    accounts: Arc<AccountStore>,
    sessions: SessionStore,
    hasher: PasswordHasher,
    decoy_hash: Arc<str>,
}

impl AuthService {
    pub fn new(
        accounts: Arc<AccountStore>,
        sessions: SessionStore,
        hasher: PasswordHasher,
    ) -> Result<Self, PasswordError> {
        let decoy_hash = Arc::from(hasher.decoy_hash()?);
        Ok(Self {
            accounts,
            sessions,
            hasher,
            decoy_hash,
        })
    }

    pub fn accounts(&self) -> &AccountStore {
        &self.accounts
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub async fn login_admin(
        &self,
        jar: SignedCookieJar,
        login_name: &str,
        password: &str,
    ) -> Result<LoginOutcome, AuthError> {
        if login_name.is_empty() || password.is_empty() {
            return Err(AuthError::Validation("Username and password required"));
        }

        let admin = self.accounts.find_admin_by_login(login_name);
        let hash = admin.map_or(&*self.decoy_hash, |a| a.password_hash.as_str());
        let verified = self.verify(password, hash).await?;
        let Some(admin) = admin.filter(|_| verified) else {
            warn!(username = %login_name, "admin login rejected");
            return Err(AuthError::InvalidCredentials);
        };

        let (jar, _) = self.sessions.open(jar, &admin.id, admin.role());
        info!(user_id = %admin.id, "admin logged in");
        Ok(LoginOutcome {
            jar,
            user: admin.public(),
        })
    }

    pub async fn login_customer(
        &self,
        jar: SignedCookieJar,
        email: &str,
        password: &str,
    ) -> Result<LoginOutcome, AuthError> {
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::Validation("Email and password required"));
        }

        let customer = self.accounts.find_customer_by_email(email).await;
        let hash = customer
            .as_ref()
            .map_or(&*self.decoy_hash, |c| c.password_hash.as_str());
        let verified = self.verify(password, hash).await?;
        let Some(customer) = customer.filter(|_| verified) else {
            warn!(email = %email, "customer login rejected");
            return Err(AuthError::InvalidCredentials);
        };

        let (jar, _) = self.sessions.open(jar, &customer.id, customer.role());
        info!(user_id = %customer.id, "customer logged in");
        Ok(LoginOutcome {
            jar,
            user: customer.public(),
        })
    }

    /// Create a customer account. Does not log the new account in.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<PublicUser, AuthError> {
        if name.is_empty() || email.is_empty() || password.is_empty() {
            return Err(AuthError::Validation(
                "Name, email, and password are required",
            ));
        }

        // Fast path; append_customer re-checks under the write lock.
        if self.accounts.find_customer_by_email(email).await.is_some() {
            return Err(AuthError::Conflict("Email already registered"));
        }

        let password_hash = self
            .hasher
            .spawn_hash(password.to_string())
            .await
            .map_err(|err| {
                warn!(error = %err, "password hashing failed during registration");
                AuthError::Internal
            })?;

        let account = self
            .accounts
            .append_customer(NewCustomer {
                email: email.to_string(),
                password_hash,
                display_name: name.to_string(),
                created_at: Utc::now().date_naive(),
            })
            .await
            .map_err(|err| match err {
                StoreError::DuplicateEmail => AuthError::Conflict("Email already registered"),
            })?;

        info!(user_id = %account.id, "customer registered");
        Ok(account.public())
    }

    async fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        self.hasher
            .spawn_verify(password.to_string(), hash.to_string())
            .await
            .map_err(|err| {
                warn!(error = %err, "password verification failed to run");
                AuthError::Internal
            })
    }

    pub fn logout(&self, jar: SignedCookieJar) -> SignedCookieJar {
        self.sessions.close(jar)
    }

    pub fn session(&self, jar: &SignedCookieJar) -> Result<Session, AuthError> {
        self.sessions.current(jar).ok_or(AuthError::AuthRequired)
    }

    /// Resolve a session's user id against admins (for admin-shaped ids), then customers.
    pub async fn resolve(&self, session: &Session) -> Option<CurrentAccount> {
        if is_admin_shaped(&session.user_id) {
            if let Some(admin) = self.accounts.find_admin_by_id(&session.user_id) {
                return Some(CurrentAccount::Admin(admin.clone()));
            }
        }
        self.accounts
            .find_customer_by_id(&session.user_id)
            .await
            .map(CurrentAccount::Customer)
    }

    /// The administrator behind a session; any other account is forbidden.
    pub async fn admin_for_session(&self, session: &Session) -> Result<AdminAccount, AuthError> {
        if session.role != Role::Admin {
            return Err(AuthError::Forbidden);
        }
        match self.resolve(session).await {
            Some(CurrentAccount::Admin(admin)) => Ok(admin),
            _ => Err(AuthError::Forbidden),
        }
    }

    pub async fn current_user(&self, jar: &SignedCookieJar) -> Result<PublicUser, AuthError> {
        let session = self.session(jar)?;
        self.user_for_session(&session).await
    }

    pub async fn user_for_session(&self, session: &Session) -> Result<PublicUser, AuthError> {
        match self.resolve(session).await {
            Some(account) => Ok(account.public()),
            None => {
                warn!(user_id = %session.user_id, "session refers to unknown account");
                Err(AuthError::NotFound("User not found"))
            }
        }
    }
}
