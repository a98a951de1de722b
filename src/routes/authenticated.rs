use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Authenticated Router Module
///
/// Every route here sits behind the authentication layer applied in
/// `create_router`, so handlers can rely on a validated `AuthUser`. Handlers
/// that mutate owner-scoped resources additionally run the ownership checks
/// from `authz` before writing.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // --- Users ---
        // GET /users?user=...
        // Searches users by name or nick.
        .route("/users", get(handlers::search_users))
        // GET/PUT/DELETE /users/{id}
        // Retrieval is open to any authenticated user; update and delete are
        // owner-only (the path ID must match the principal).
        .route(
            "/users/{id}",
            get(handlers::get_user)
                .put(handlers::update_user)
                .delete(handlers::delete_user),
        )
        // POST /users/{id}/follow, /users/{id}/unfollow
        // Follow-graph mutations, guarded against self-reference.
        .route("/users/{id}/follow", post(handlers::follow_user))
        .route("/users/{id}/unfollow", post(handlers::unfollow_user))
        // GET /users/{id}/followers, /users/{id}/following
        .route("/users/{id}/followers", get(handlers::get_followers))
        .route("/users/{id}/following", get(handlers::get_following))
        // POST /users/{id}/password
        // Owner-only, plus re-verification of the current credential.
        .route("/users/{id}/password", post(handlers::change_password))
        // GET /users/{id}/publications
        .route(
            "/users/{id}/publications",
            get(handlers::get_user_publications),
        )
        // --- Publications ---
        // POST /publications (author = principal), GET /publications (feed).
        .route(
            "/publications",
            post(handlers::create_publication).get(handlers::get_feed),
        )
        // GET/PUT/DELETE /publications/{id}
        // Update and delete fetch the current owner from storage and compare
        // against the principal before mutating.
        .route(
            "/publications/{id}",
            get(handlers::get_publication)
                .put(handlers::update_publication)
                .delete(handlers::delete_publication),
        )
        // POST /publications/{id}/like, /publications/{id}/unlike
        .route("/publications/{id}/like", post(handlers::like_publication))
        .route(
            "/publications/{id}/unlike",
            post(handlers::unlike_publication),
        )
}
