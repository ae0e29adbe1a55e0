//! User domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use bionicle_core::{UserId, Username};

/// A registered account.
///
/// The password hash never leaves the repository layer, so it is not part of
/// this type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: UserId,
    pub username: Username,
    pub created_at: DateTime<Utc>,
}
