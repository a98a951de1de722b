use axum::{
    Router,
    extract::{FromRef, Request},
    http::HeaderName,
    middleware::{self, Next},
    response::Response,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Core application services and components.
pub mod auth;
pub mod authz;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod security;

// Module for routing segregation (Public, Authenticated).
pub mod routes;
use auth::AuthUser; // The resolved authenticated user identity.
use routes::{authenticated, public};

// --- Public Re-exports ---

// Makes core state types easily accessible to the main application entry point.
pub use auth::TokenService;
pub use config::AppConfig;
pub use repository::{PostgresRepository, RepositoryState};

/// ApiDoc
///
/// Auto-generates the OpenAPI documentation (Swagger JSON) by aggregating all
/// handler paths and data schemas decorated with the `#[utoipa::path]` and
/// `#[derive(utoipa::ToSchema)]` macros. Served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::login, handlers::register_user, handlers::search_users,
        handlers::get_user, handlers::update_user, handlers::delete_user,
        handlers::follow_user, handlers::unfollow_user, handlers::get_followers,
        handlers::get_following, handlers::change_password,
        handlers::create_publication, handlers::get_feed, handlers::get_publication,
        handlers::update_publication, handlers::delete_publication,
        handlers::get_user_publications, handlers::like_publication,
        handlers::unlike_publication,
    ),
    components(
        schemas(
            models::User, models::Publication, models::RegisterUserRequest,
            models::UpdateUserRequest, models::LoginRequest, models::TokenResponse,
            models::ChangePasswordRequest, models::CreatePublicationRequest,
            models::UpdatePublicationRequest,
        )
    ),
    tags(
        (name = "devlink", description = "Small social network API")
    )
)]
struct ApiDoc;

/// AppState
///
/// The single, thread-safe, immutable container holding all essential
/// application services and configuration, shared across all incoming
/// requests. All members are read-only after startup: the repository is an
/// `Arc`, the token service holds the fixed signing keys, and the config is
/// never mutated, so concurrent access needs no synchronization.
#[derive(Clone)]
pub struct AppState {
    /// Repository Layer: abstracts database access.
    pub repo: RepositoryState,
    /// Token issuance and validation, built once from the signing secret.
    pub tokens: TokenService,
    /// The loaded, immutable environment configuration.
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

// These implementations let extractors pull individual components out of the
// shared AppState, keeping handler and extractor dependencies explicit.

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for TokenService {
    fn from_ref(app_state: &AppState) -> TokenService {
        app_state.tokens.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// auth_middleware
///
/// Enforces authentication for the authenticated route set.
///
/// *Mechanism*: it attempts to extract `AuthUser` from the request. Since
/// `AuthUser` implements `FromRequestParts`, a failed extraction (missing,
/// forged or expired token) rejects the request with the corresponding 401
/// body before the wrapped handler ever runs. On success the request is
/// forwarded unchanged; handlers re-extract the principal as an argument.
async fn auth_middleware(_auth_user: AuthUser, request: Request, next: Next) -> Response {
    next.run(request).await
}

/// create_router
///
/// Assembles the application's entire routing structure. Composition is fixed
/// here, once, at router-build time:
///
/// - protected routes run as Logger(Authenticate(handler)),
/// - public routes run as Logger(handler),
///
/// so every request is logged regardless of its authentication outcome, and
/// authentication is evaluated strictly before any handler logic.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    // Header name constant for request correlation.
    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        // Documentation: serve the auto-generated Swagger UI.
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Public routes: no authentication layer.
        .merge(public::public_routes())
        // Authenticated routes: wrapped by the auth middleware. The layer is
        // applied per-route so the 401 short-circuit happens inside the
        // logging span.
        .merge(
            authenticated::authenticated_routes()
                .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware)),
        )
        .with_state(state);

    // Observability and correlation layers (outermost). Every request gets a
    // generated x-request-id and a tracing span covering its full lifecycle,
    // including requests the auth layer rejects.
    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Helper used by `TraceLayer` to customize span creation. Extracts the
/// `x-request-id` header (if present) and includes it in the structured
/// logging metadata alongside the HTTP method and URI, so every log line for
/// a single request is correlated by a unique ID.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
