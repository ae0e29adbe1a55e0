//! Account and session route handlers.
//!
//! Registration and login both end by writing a fresh [`CurrentUser`] into
//! the session; logout destroys the session record.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::Deserialize;
use tower_sessions::Session;

use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{RequireAuth, clear_current_user, set_current_user};
use crate::models::{CurrentUser, User};
use crate::services::auth::AuthService;
use crate::state::AppState;

/// Username and password pair posted by clients.
#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

async fn start_session(session: &Session, user: &User) -> Result<()> {
    let current = CurrentUser::issue(user.id, user.username.clone());
    set_current_user(session, &current).await?;
    set_sentry_user(&user.id, user.username.as_str());
    Ok(())
}

/// Register a new account and log it in.
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    payload: std::result::Result<Json<Credentials>, JsonRejection>,
) -> Result<(StatusCode, Json<User>)> {
    let Json(credentials) = payload?;
    let user = AuthService::new(state.store())
        .register(&credentials.username, &credentials.password)
        .await?;

    start_session(&session, &user).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Log in with a username and password.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    payload: std::result::Result<Json<Credentials>, JsonRejection>,
) -> Result<Json<User>> {
    let Json(credentials) = payload?;
    let user = match AuthService::new(state.store())
        .login(&credentials.username, &credentials.password)
        .await
    {
        Ok(user) => user,
        Err(e) => {
            tracing::warn!(username = %credentials.username, error = %e, "Login failed");
            return Err(e.into());
        }
    };

    start_session(&session, &user).await?;
    tracing::info!(user_id = %user.id, username = %user.username, "User logged in");
    Ok(Json(user))
}

/// The identity behind the current session.
pub async fn current(RequireAuth(user): RequireAuth) -> Json<CurrentUser> {
    Json(user)
}

/// Log out by destroying the session.
pub async fn logout(session: Session) -> Result<StatusCode> {
    clear_current_user(&session).await?;
    clear_sentry_user();
    Ok(StatusCode::OK)
}
