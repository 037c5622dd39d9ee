//! Authentication Middleware
//! Mission: Resolve the access token into an authenticated account

use crate::api::AppState;
use crate::errors::ApiError;
use crate::models::Role;
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use uuid::Uuid;

/// Identity attached to the request after access-token verification.
///
/// The role comes from the store, not the token, so a role change takes
/// effect on the next request instead of at token expiry.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub role: Role,
}

/// Validates the access token from the `Authorization: Bearer` header or
/// the `accessToken` cookie and inserts a [`CurrentUser`] into request
/// extensions for downstream handlers.
pub async fn require_auth(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token_from_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(|t| t.to_string());

    let token_from_cookie = jar.get("accessToken").map(|c| c.value().to_string());

    let token = token_from_header
        .or(token_from_cookie)
        .ok_or_else(|| ApiError::Unauthorized("Missing authorization token".to_string()))?;

    let claims = state.issuer.verify_access(&token)?;

    let id = Uuid::parse_str(&claims.sub)
        .map_err(|_| ApiError::Unauthorized("Invalid or expired token".to_string()))?;

    // Token may outlive the account
    let account = state
        .store
        .find_by_id(&id)?
        .ok_or_else(|| ApiError::Unauthorized("Invalid or expired token".to_string()))?;

    req.extensions_mut().insert(CurrentUser {
        id: account.id,
        username: account.username,
        email: account.email,
        role: account.role,
    });

    Ok(next.run(req).await)
}
