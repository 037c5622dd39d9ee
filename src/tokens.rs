//! Token Issuer
//! Mission: Mint and validate access/refresh JWT pairs

use crate::errors::ApiError;
use crate::models::{AccessClaims, RefreshClaims, UserAccount};
use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use tracing::debug;

/// Issues and verifies JWTs with two independent secrets: a short-lived
/// access token carrying identity claims and a long-lived refresh token
/// carrying only the account id.
pub struct TokenIssuer {
    access_secret: String,
    refresh_secret: String,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenIssuer {
    pub fn new(
        access_secret: String,
        refresh_secret: String,
        access_ttl_minutes: i64,
        refresh_ttl_days: i64,
    ) -> Self {
        Self {
            access_secret,
            refresh_secret,
            access_ttl: Duration::minutes(access_ttl_minutes),
            refresh_ttl: Duration::days(refresh_ttl_days),
        }
    }

    /// Generate an access token for an account
    pub fn issue_access_token(&self, account: &UserAccount) -> Result<String> {
        let claims = AccessClaims {
            sub: account.id.to_string(),
            email: account.email.clone(),
            username: account.username.clone(),
            exp: expiry(self.access_ttl)?,
        };

        debug!("Issuing access token for {} ({})", account.username, account.id);

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.access_secret.as_bytes()),
        )
        .context("Failed to sign access token")
    }

    /// Generate a refresh token for an account
    pub fn issue_refresh_token(&self, account: &UserAccount) -> Result<String> {
        let claims = RefreshClaims {
            sub: account.id.to_string(),
            exp: expiry(self.refresh_ttl)?,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.refresh_secret.as_bytes()),
        )
        .context("Failed to sign refresh token")
    }

    /// Validate an access token and extract its claims.
    ///
    /// Bad signature, expiry and malformed input all collapse into the
    /// same 401 so the client learns nothing about the cause.
    pub fn verify_access(&self, token: &str) -> Result<AccessClaims, ApiError> {
        decode::<AccessClaims>(
            token,
            &DecodingKey::from_secret(self.access_secret.as_bytes()),
            &Validation::default(),
        )
        .map(|data| data.claims)
        .map_err(|_| ApiError::Unauthorized("Invalid or expired token".to_string()))
    }

    /// Validate a refresh token and extract its claims.
    pub fn verify_refresh(&self, token: &str) -> Result<RefreshClaims, ApiError> {
        decode::<RefreshClaims>(
            token,
            &DecodingKey::from_secret(self.refresh_secret.as_bytes()),
            &Validation::default(),
        )
        .map(|data| data.claims)
        .map_err(|_| ApiError::Unauthorized("Invalid refresh token".to_string()))
    }
}

fn expiry(ttl: Duration) -> Result<usize> {
    Ok(Utc::now()
        .checked_add_signed(ttl)
        .context("Invalid expiry timestamp")?
        .timestamp() as usize)
}
