//! Route Assembly
//! Mission: Wire public and protected endpoints into one router

use crate::api::{handlers, AppState};
use crate::middleware::require_auth;
use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};
use tower_http::cors::CorsLayer;

pub fn router(state: AppState) -> Router {
    let public = Router::new()
        .route("/register", post(handlers::register))
        .route("/login", post(handlers::login))
        .route("/refresh-token", post(handlers::refresh_token))
        .route("/health", get(handlers::health_check));

    let protected = Router::new()
        .route("/logout", post(handlers::logout))
        .route("/", get(handlers::list_users))
        .route(
            "/:user_id",
            get(handlers::get_user).delete(handlers::delete_user),
        )
        .route("/:user_id/role", patch(handlers::update_role))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ));

    Router::new()
        .merge(public)
        .merge(protected)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
