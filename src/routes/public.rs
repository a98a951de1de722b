use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Defines the endpoints reachable without a token: the health probe and the
/// two gateway operations of the identity flow (registration and login).
/// Everything else in the API requires authentication.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Unauthenticated liveness endpoint for monitoring and load balancers.
        .route("/health", get(|| async { "ok" }))
        // POST /users
        // Account registration. Hashes the credential before persisting.
        .route("/users", post(handlers::register_user))
        // POST /login
        // Exchanges credentials for a signed bearer token.
        .route("/login", post(handlers::login))
}
