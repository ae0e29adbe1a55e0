//! Session-related types.
//!
//! Types stored in the session for authentication state.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use bionicle_core::{UserId, Username};

/// How long a login stays valid, counted from issuance.
pub const SESSION_TTL_HOURS: i64 = 24;

/// Session-stored user identity.
///
/// Minimal data stored in the session to identify the logged-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User's database ID.
    pub id: UserId,
    /// The username asserted by this session.
    pub username: Username,
    /// When the login happened. Activity never moves this forward.
    pub issued_at: DateTime<Utc>,
}

impl CurrentUser {
    /// Create a session identity issued now.
    #[must_use]
    pub fn issue(id: UserId, username: Username) -> Self {
        Self {
            id,
            username,
            issued_at: Utc::now(),
        }
    }

    /// When this identity stops being accepted.
    #[must_use]
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.issued_at + TimeDelta::hours(SESSION_TTL_HOURS)
    }

    /// Whether the identity has expired at `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at()
    }
}

/// Session keys for authentication data.
pub mod session_keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn user_issued_at(issued_at: DateTime<Utc>) -> CurrentUser {
        CurrentUser {
            id: UserId::generate(),
            username: Username::parse("gali").unwrap(),
            issued_at,
        }
    }

    #[test]
    fn test_fresh_session_not_expired() {
        let user = CurrentUser::issue(UserId::generate(), Username::parse("gali").unwrap());
        assert!(!user.is_expired_at(Utc::now()));
    }

    #[test]
    fn test_expires_exactly_after_ttl() {
        let issued = Utc::now();
        let user = user_issued_at(issued);
        assert!(!user.is_expired_at(issued + TimeDelta::hours(23)));
        assert!(user.is_expired_at(issued + TimeDelta::hours(24)));
        assert!(user.is_expired_at(issued + TimeDelta::days(3)));
    }
}
