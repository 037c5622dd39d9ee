//! Authbolt - Account & Session Service
//! Mission: Issue, rotate and revoke JWT session pairs over a user store

use anyhow::{Context, Result};
use authbolt::{
    api::{routes, AppState},
    config::Config,
    store::UserStore,
    tokens::TokenIssuer,
};
use dotenv::dotenv;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "authbolt=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let store = Arc::new(UserStore::open(&config.db_path)?);
    let issuer = Arc::new(TokenIssuer::new(
        config.access_secret.clone(),
        config.refresh_secret.clone(),
        config.access_ttl_minutes,
        config.refresh_ttl_days,
    ));

    let state = AppState::new(store, issuer);
    let app = routes::router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!("🔐 Auth service listening on {addr}");

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
