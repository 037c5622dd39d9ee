//! Session Manager
//! Mission: Drive the login/refresh/logout state machine

use crate::errors::ApiError;
use crate::models::{
    LoginRequest, PublicUser, RegisterRequest, Role, TokenPair, UserAccount,
};
use crate::password;
use crate::store::UserStore;
use crate::tokens::TokenIssuer;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Successful login: sanitized account plus both freshly minted tokens.
#[derive(Debug)]
pub struct LoginOutcome {
    pub user: PublicUser,
    pub access_token: String,
    pub refresh_token: String,
}

/// Orchestrates the credential store and token issuer.
///
/// Per account the state machine is Anonymous -> Authenticated (stored
/// refresh token) -> Anonymous on logout, with refresh replacing the
/// stored token in place. At most one refresh token is live per account.
pub struct SessionManager {
    store: Arc<UserStore>,
    issuer: Arc<TokenIssuer>,
}

impl SessionManager {
    pub fn new(store: Arc<UserStore>, issuer: Arc<TokenIssuer>) -> Self {
        Self { store, issuer }
    }

    /// Create an account. Usernames are stored lowercased; the password
    /// is hashed before it ever reaches the store.
    pub fn register(&self, req: RegisterRequest) -> Result<PublicUser, ApiError> {
        let email = req.email.trim().to_string();
        let username = req.username.trim().to_lowercase();

        if email.is_empty() || username.is_empty() || req.password.trim().is_empty() {
            return Err(ApiError::Validation("All fields are required".to_string()));
        }

        if self.store.find_by_identifier(&email)?.is_some()
            || self.store.find_by_identifier(&username)?.is_some()
        {
            return Err(ApiError::Conflict(
                "User already exists with this email or username".to_string(),
            ));
        }

        let digest = password::hash_password(&req.password)?;
        let account = self
            .store
            .create_user(&username, &email, &digest, Role::User)?;

        Ok(PublicUser::from_account(&account))
    }

    /// Authenticate by username or email and mint a token pair.
    ///
    /// Persisting the new refresh token overwrites any previous one, so
    /// a fresh login invalidates the prior session.
    pub fn login(&self, req: LoginRequest) -> Result<LoginOutcome, ApiError> {
        let identifier = login_identifier(&req).ok_or_else(|| {
            ApiError::Validation("Username or email is required".to_string())
        })?;

        let account = self
            .store
            .find_by_identifier(&identifier)?
            .ok_or_else(|| ApiError::NotFound("User does not exist".to_string()))?;

        if !password::verify_password(&req.password, &account.password_hash)? {
            warn!("Failed login attempt for {}", account.username);
            return Err(ApiError::Unauthorized(
                "Invalid user credentials".to_string(),
            ));
        }

        let tokens = self.mint_and_store(&account)?;
        info!("Login successful: {} ({})", account.username, account.role.as_str());

        Ok(LoginOutcome {
            user: PublicUser::from_account(&account),
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
        })
    }

    /// Exchange a refresh token for a new pair, rotating the stored one.
    ///
    /// Strict single-active-token policy: the incoming token must
    /// byte-match the stored one, so a superseded token is rejected as
    /// invalid rather than treated as merely stale.
    pub fn refresh(&self, incoming: Option<&str>) -> Result<TokenPair, ApiError> {
        let incoming = incoming
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ApiError::Unauthorized("Unauthorized request".to_string()))?;

        let claims = self.issuer.verify_refresh(incoming)?;
        let id = Uuid::parse_str(&claims.sub)
            .map_err(|_| ApiError::Unauthorized("Invalid refresh token".to_string()))?;

        let account = self
            .store
            .find_by_id(&id)?
            .ok_or_else(|| ApiError::Unauthorized("Invalid refresh token".to_string()))?;

        match account.refresh_token.as_deref() {
            Some(stored) if stored == incoming => {}
            _ => {
                warn!("Stale or reused refresh token for account {}", account.id);
                return Err(ApiError::Unauthorized(
                    "Refresh token is expired or already used".to_string(),
                ));
            }
        }

        self.mint_and_store(&account)
    }

    /// Drop the stored refresh token. Safe to call repeatedly.
    pub fn logout(&self, account_id: &Uuid) -> Result<(), ApiError> {
        self.store.set_refresh_token(account_id, None)
    }

    fn mint_and_store(&self, account: &UserAccount) -> Result<TokenPair, ApiError> {
        let access_token = self.issuer.issue_access_token(account)?;
        let refresh_token = self.issuer.issue_refresh_token(account)?;
        self.store
            .set_refresh_token(&account.id, Some(&refresh_token))?;

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }
}

fn login_identifier(req: &LoginRequest) -> Option<String> {
    if let Some(username) = req.username.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        return Some(username.to_lowercase());
    }
    req.email
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}
