//! HTTP middleware stack.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request span with a `request_id` field)
//! 3. Request ID (fill the span field, echo the header)
//! 4. Session layer (signed `session` cookie, tower-sessions)
//!
//! Identity resolution is not a layer: handlers opt in through the
//! [`RequireAuth`] and [`Identity`] extractors.

pub mod auth;
pub mod request_id;
pub mod session;

pub use auth::{Identity, RequireAuth, clear_current_user, set_current_user};
pub use request_id::{REQUEST_ID_HEADER, RequestId, request_id_middleware};
pub use session::{
    EXPIRED_SESSION_CLEANUP_INTERVAL, SESSION_COOKIE_NAME, create_session_layer, signing_key,
    spawn_expired_session_cleanup,
};
