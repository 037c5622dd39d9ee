//! API Handlers
//! Mission: Translate HTTP requests into session/store operations

use crate::api::AppState;
use crate::authorize::{authorize, authorize_profile_access, authorize_role_change, ADMIN_ROLES};
use crate::errors::{ApiError, ApiResponse};
use crate::middleware::CurrentUser;
use crate::models::{
    ListedUser, LoginData, LoginRequest, PublicUser, RefreshRequest, RegisterRequest,
    UpdateRoleRequest,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde_json::json;
use time::Duration;
use uuid::Uuid;

const ACCESS_COOKIE: &str = "accessToken";
const REFRESH_COOKIE: &str = "refreshToken";
const COOKIE_MAX_AGE_DAYS: i64 = 7;

/// Both auth cookies share the same attributes: HttpOnly, Secure,
/// SameSite=None, Path=/, 7-day max-age.
fn auth_cookie(name: &'static str, value: String) -> Cookie<'static> {
    Cookie::build((name, value))
        .http_only(true)
        .secure(true)
        .path("/")
        .same_site(SameSite::None)
        .max_age(Duration::days(COOKIE_MAX_AGE_DAYS))
        .build()
}

fn removal_cookie(name: &'static str) -> Cookie<'static> {
    Cookie::build((name, ""))
        .http_only(true)
        .secure(true)
        .path("/")
        .same_site(SameSite::None)
        .max_age(Duration::ZERO)
        .build()
}

fn parse_user_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::Validation("Invalid user ID format".to_string()))
}

/// POST /register
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state.sessions.register(payload)?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::ok("User registered successfully", user),
    ))
}

/// POST /login
///
/// Tokens are delivered twice: as cookies and in the response body.
/// Clients read whichever channel suits them, so both must stay.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let outcome = state.sessions.login(payload)?;

    let jar = jar
        .add(auth_cookie(ACCESS_COOKIE, outcome.access_token.clone()))
        .add(auth_cookie(REFRESH_COOKIE, outcome.refresh_token.clone()));

    let data = LoginData {
        user: outcome.user,
        access_token: outcome.access_token,
        refresh_token: outcome.refresh_token,
    };

    Ok((jar, ApiResponse::ok("User logged in successfully", data)))
}

/// POST /refresh-token
///
/// The incoming refresh token is taken from the cookie first, then the
/// request body.
pub async fn refresh_token(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Option<Json<RefreshRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    let incoming = jar
        .get(REFRESH_COOKIE)
        .map(|c| c.value().to_string())
        .or_else(|| payload.and_then(|Json(p)| p.refresh_token));

    let pair = state.sessions.refresh(incoming.as_deref())?;

    let jar = jar
        .add(auth_cookie(ACCESS_COOKIE, pair.access_token.clone()))
        .add(auth_cookie(REFRESH_COOKIE, pair.refresh_token.clone()));

    Ok((
        jar,
        ApiResponse::ok("Access token refreshed successfully", pair),
    ))
}

/// POST /logout
pub async fn logout(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    jar: CookieJar,
) -> Result<impl IntoResponse, ApiError> {
    state.sessions.logout(&current.id)?;

    let jar = jar
        .add(removal_cookie(ACCESS_COOKIE))
        .add(removal_cookie(REFRESH_COOKIE));

    Ok((jar, ApiResponse::ok("User logged out successfully", json!({}))))
}

/// GET / — admin/manager only, reduced field set
pub async fn list_users(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<impl IntoResponse, ApiError> {
    authorize(current.role, &ADMIN_ROLES)?;

    let users = state.store.list_users()?;
    let listed: Vec<ListedUser> = users.iter().map(ListedUser::from_account).collect();

    let message = if listed.is_empty() {
        "no users found"
    } else {
        "Users fetched successfully"
    };

    Ok(ApiResponse::ok(message, listed))
}

/// GET /:userId — self or admin
pub async fn get_user(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let target = parse_user_id(&user_id)?;
    authorize_profile_access(&current.id, current.role, &target)?;

    let account = state
        .store
        .find_by_id(&target)?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(ApiResponse::ok(
        "User profile fetched successfully",
        PublicUser::from_account(&account),
    ))
}

/// DELETE /:userId — admin/manager only
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    authorize(current.role, &ADMIN_ROLES)?;

    let target = parse_user_id(&user_id)?;
    let account = state
        .store
        .find_by_id(&target)?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    state.store.delete_user(&target)?;

    Ok(ApiResponse::ok(
        "User deleted successfully",
        PublicUser::from_account(&account),
    ))
}

/// PATCH /:userId/role — admin/manager only, never self
pub async fn update_role(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(user_id): Path<String>,
    Json(payload): Json<UpdateRoleRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let target = parse_user_id(&user_id)?;
    let new_role = authorize_role_change(&current.id, current.role, &target, &payload.new_role)?;

    let account = state.store.update_role(&target, new_role)?;

    Ok(ApiResponse::ok(
        "User role updated successfully",
        PublicUser::from_account(&account),
    ))
}

/// GET /health
pub async fn health_check() -> impl IntoResponse {
    ApiResponse::ok("ok", json!({ "status": "up" }))
}
