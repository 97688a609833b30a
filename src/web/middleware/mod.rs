//! Middleware for the Plaza web API.

mod auth;
mod cors;

pub use auth::{jwt_auth, AuthUser, JwtState};
pub use cors::create_cors_layer;
