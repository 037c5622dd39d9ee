//! Authbolt
//!
//! Username/email + password authentication service with JWT
//! access/refresh token pairs and role-based authorization.

pub mod api;
pub mod authorize;
pub mod config;
pub mod errors;
pub mod middleware;
pub mod models;
pub mod password;
pub mod session;
pub mod store;
pub mod tokens;
