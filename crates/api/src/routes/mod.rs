//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                       - Liveness check
//! GET  /health/ready                 - Store reachability check
//! GET  /images/*                     - Uploaded product images
//!
//! # Catalog
//! GET  /api/products                 - All products
//! GET  /api/product/{productID}      - One product
//! GET  /api/photo/{photoID}          - One photo record
//! GET  /api/photos/{productID}       - Photos of a product
//!
//! # Comments
//! GET  /api/comments/{productID}     - Comments on a product
//! POST /api/comment/{productID}      - Create (requires auth)
//! POST /api/comment/edit/{commentID} - Replace (requires auth)
//! POST /api/comment/remove/{commentID} - Remove (requires auth)
//!
//! # Users
//! POST   /api/users                  - Register and log in
//! POST   /api/users/login            - Log in
//! GET    /api/users                  - Current session identity (requires auth)
//! DELETE /api/users                  - Log out
//! ```

pub mod comments;
pub mod photos;
pub mod products;
pub mod users;

use axum::{
    Router,
    extract::State,
    http::{Request, StatusCode},
    routing::{get, post},
};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tower_sessions::service::SignedCookie;
use tower_sessions::{SessionManagerLayer, SessionStore};

use crate::middleware::request_id_middleware;
use crate::state::AppState;

/// Create the catalog routes router.
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(products::index))
        .route("/product/{product_id}", get(products::show))
        .route("/photo/{photo_id}", get(photos::show))
        .route("/photos/{product_id}", get(photos::for_product))
}

/// Create the comment routes router.
pub fn comment_routes() -> Router<AppState> {
    Router::new()
        .route("/comments/{product_id}", get(comments::index))
        .route("/comment/{product_id}", post(comments::create))
        .route("/comment/edit/{comment_id}", post(comments::edit))
        .route("/comment/remove/{comment_id}", post(comments::remove))
}

/// Create the user routes router.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/users",
            post(users::register)
                .get(users::current)
                .delete(users::logout),
        )
        .route("/users/login", post(users::login))
}

/// Create all `/api` routes.
pub fn routes() -> Router<AppState> {
    Router::new().nest(
        "/api",
        Router::new()
            .merge(catalog_routes())
            .merge(comment_routes())
            .merge(user_routes()),
    )
}

/// Assemble the full application: routes, health checks, static images and
/// the middleware stack.
///
/// Sentry layers are added by the binary on top of this router.
pub fn app<S>(state: AppState, session_layer: SessionManagerLayer<S, SignedCookie>) -> Router
where
    S: SessionStore + Clone,
{
    let images = ServeDir::new(&state.config().upload_dir);

    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes())
        .nest_service("/images", images)
        .layer(session_layer)
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = tracing::field::Empty,
                )
            }),
        )
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the document store is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.store().ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
