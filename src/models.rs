//! Account Models
//! Mission: Define user account and token data structures

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User account as persisted in the credential store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // bcrypt hash - never serialize
    #[serde(skip_serializing)]
    pub refresh_token: Option<String>, // single active session token - never serialize
    pub role: Role,
    pub created_at: String,
    pub updated_at: String,
}

/// Account roles for RBAC
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Role {
    #[serde(rename = "admin")]
    Admin, // Full access to all endpoints
    #[serde(rename = "manager")]
    Manager, // Account listing + destructive operations
    #[serde(rename = "user")]
    User, // Own profile only
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::User => "user",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "admin" => Some(Role::Admin),
            "manager" => Some(Role::Manager),
            "user" => Some(Role::User),
            _ => None,
        }
    }
}

/// Access token claims payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    pub sub: String, // subject (account id)
    pub email: String,
    pub username: String,
    pub exp: usize, // expiration timestamp
}

/// Refresh token claims payload (id only)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshClaims {
    pub sub: String,
    pub exp: usize,
}

/// Registration request body
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub password: String,
}

/// Login request body - username or email plus password
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: String,
}

/// Refresh request body (token may also arrive via cookie)
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: Option<String>,
}

/// Role update request body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRoleRequest {
    pub new_role: String,
}

/// Sanitized account response - the only shape sent to clients
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub created_at: String,
    pub updated_at: String,
}

impl PublicUser {
    pub fn from_account(account: &UserAccount) -> Self {
        Self {
            id: account.id,
            username: account.username.clone(),
            email: account.email.clone(),
            role: account.role,
            created_at: account.created_at.clone(),
            updated_at: account.updated_at.clone(),
        }
    }
}

/// Reduced shape returned by the account listing
#[derive(Debug, Serialize)]
pub struct ListedUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub role: Role,
}

impl ListedUser {
    pub fn from_account(account: &UserAccount) -> Self {
        Self {
            id: account.id,
            username: account.username.clone(),
            email: account.email.clone(),
            role: account.role,
        }
    }
}

/// Freshly minted access/refresh pair
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Login response data - sanitized user plus both tokens
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginData {
    pub user: PublicUser,
    pub access_token: String,
    pub refresh_token: String,
}
