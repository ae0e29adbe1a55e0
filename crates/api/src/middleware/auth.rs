//! Identity resolution and the authorization gate.
//!
//! Every request resolves, exactly once, to an [`Identity`]:
//!
//! ```text
//! Unresolved ──► Anonymous
//!            └─► Authenticated(CurrentUser)
//! ```
//!
//! The session layer has already verified the cookie signature; a missing,
//! tampered or unknown cookie arrives here as an empty session. What this
//! module adds is decoding the stored identity and enforcing the fixed
//! 24-hour lifetime counted from login. A session store that cannot be read
//! is a server error, never an anonymous caller.
//!
//! Mutating handlers take [`RequireAuth`] as an extractor. Because it runs
//! before any body extractor, an anonymous caller is rejected with 401 before
//! the payload is parsed or the store is touched.

use axum::{extract::FromRequestParts, http::request::Parts};
use chrono::{DateTime, Utc};
use tower_sessions::Session;
use tower_sessions::session::Error as SessionError;

use crate::error::AppError;
use crate::models::{CurrentUser, session_keys};

/// Who is making the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    /// No valid session.
    Anonymous,
    /// The session asserts this user and is within its lifetime.
    Authenticated(CurrentUser),
}

impl Identity {
    /// Decide the identity for a stored session value at `now`.
    #[must_use]
    pub fn from_stored(stored: Option<CurrentUser>, now: DateTime<Utc>) -> Self {
        match stored {
            Some(user) if !user.is_expired_at(now) => Self::Authenticated(user),
            Some(user) => {
                tracing::debug!(
                    username = %user.username,
                    expired_at = %user.expires_at(),
                    "Ignoring expired session"
                );
                Self::Anonymous
            }
            None => Self::Anonymous,
        }
    }

    /// Resolve the identity carried by `session`.
    ///
    /// A stored value that cannot be decoded counts as anonymous.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Session` if the session store itself fails.
    pub async fn resolve(session: Option<&Session>) -> Result<Self, AppError> {
        let Some(session) = session else {
            return Ok(Self::Anonymous);
        };

        let stored = match session.get::<CurrentUser>(session_keys::CURRENT_USER).await {
            Ok(stored) => stored,
            Err(SessionError::SerdeJson(e)) => {
                tracing::warn!(error = %e, "Undecodable session treated as anonymous");
                None
            }
            Err(e) => return Err(AppError::Session(e)),
        };

        Ok(Self::from_stored(stored, Utc::now()))
    }

    /// The authenticated user, if any.
    #[must_use]
    pub const fn user(&self) -> Option<&CurrentUser> {
        match self {
            Self::Authenticated(user) => Some(user),
            Self::Anonymous => None,
        }
    }

    /// Pass the gate: return the authenticated user or fail with `Unauthorized`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Unauthorized` for anonymous callers.
    pub fn require(self) -> Result<CurrentUser, AppError> {
        match self {
            Self::Authenticated(user) => Ok(user),
            Self::Anonymous => Err(AppError::Unauthorized),
        }
    }
}

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Self::resolve(parts.extensions.get::<Session>()).await
    }
}

/// Extractor that requires an authenticated session.
///
/// Anonymous callers get a 401 JSON error; a failing session store gives 500.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(user): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", user.username)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let identity = Identity::resolve(parts.extensions.get::<Session>()).await?;
        identity.require().map(Self)
    }
}

/// Store `user` as the session identity (login).
///
/// The session ID is cycled first so a pre-login cookie cannot be reused.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_USER, user).await
}

/// Destroy the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be deleted from the store.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::response::IntoResponse;
    use bionicle_core::{UserId, Username};
    use chrono::TimeDelta;
    use tower_sessions::MemoryStore;
    use tower_sessions::session::{Id, Record};
    use tower_sessions::session_store;

    use super::*;

    fn current_user(issued_at: DateTime<Utc>) -> CurrentUser {
        CurrentUser {
            id: UserId::generate(),
            username: Username::parse("tahu").unwrap(),
            issued_at,
        }
    }

    /// Session backend that is always unreachable.
    #[derive(Debug, Clone)]
    struct UnreachableStore;

    #[async_trait]
    impl tower_sessions::SessionStore for UnreachableStore {
        async fn save(&self, _record: &Record) -> session_store::Result<()> {
            Err(session_store::Error::Backend("db down".to_string()))
        }

        async fn load(&self, _id: &Id) -> session_store::Result<Option<Record>> {
            Err(session_store::Error::Backend("db down".to_string()))
        }

        async fn delete(&self, _id: &Id) -> session_store::Result<()> {
            Err(session_store::Error::Backend("db down".to_string()))
        }
    }

    fn empty_session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    #[test]
    fn test_no_stored_user_is_anonymous() {
        assert_eq!(Identity::from_stored(None, Utc::now()), Identity::Anonymous);
    }

    #[test]
    fn test_fresh_session_is_authenticated() {
        let now = Utc::now();
        let user = current_user(now - TimeDelta::hours(1));
        assert_eq!(
            Identity::from_stored(Some(user.clone()), now),
            Identity::Authenticated(user)
        );
    }

    #[test]
    fn test_session_older_than_a_day_is_anonymous() {
        let now = Utc::now();
        let user = current_user(now - TimeDelta::hours(25));
        assert_eq!(Identity::from_stored(Some(user), now), Identity::Anonymous);
    }

    #[test]
    fn test_require_rejects_anonymous() {
        assert!(matches!(
            Identity::Anonymous.require(),
            Err(AppError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn test_resolve_without_session_layer() {
        assert_eq!(Identity::resolve(None).await.unwrap(), Identity::Anonymous);
    }

    #[tokio::test]
    async fn test_resolve_round_trips_through_session() {
        let session = empty_session();
        assert_eq!(Identity::resolve(Some(&session)).await.unwrap(), Identity::Anonymous);

        let user = current_user(Utc::now());
        set_current_user(&session, &user).await.unwrap();
        assert_eq!(
            Identity::resolve(Some(&session)).await.unwrap(),
            Identity::Authenticated(user)
        );

        clear_current_user(&session).await.unwrap();
        assert_eq!(Identity::resolve(Some(&session)).await.unwrap(), Identity::Anonymous);
    }

    #[tokio::test]
    async fn test_resolve_ignores_malformed_session_value() {
        let session = empty_session();
        session
            .insert(session_keys::CURRENT_USER, "not a user")
            .await
            .unwrap();
        assert_eq!(Identity::resolve(Some(&session)).await.unwrap(), Identity::Anonymous);
    }

    #[tokio::test]
    async fn test_resolve_rejects_expired_stored_user() {
        let session = empty_session();
        let stale = current_user(Utc::now() - TimeDelta::days(2));
        session
            .insert(session_keys::CURRENT_USER, &stale)
            .await
            .unwrap();
        assert_eq!(Identity::resolve(Some(&session)).await.unwrap(), Identity::Anonymous);
    }

    #[tokio::test]
    async fn test_resolve_surfaces_session_store_outage() {
        let session = Session::new(Some(Id::default()), Arc::new(UnreachableStore), None);

        let err = Identity::resolve(Some(&session)).await.unwrap_err();
        assert!(matches!(err, AppError::Session(_)));
        assert_eq!(err.code(), "session_failure");
        assert_eq!(
            err.into_response().status(),
            axum::http::StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
