//! User management commands.

use bionicle_api::db::PgStore;
use bionicle_api::services::auth::{AuthError, AuthService};
use thiserror::Error;

use super::{CommandError, connect};

#[derive(Debug, Error)]
pub enum UserError {
    #[error(transparent)]
    Command(#[from] CommandError),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// Create a new user account.
///
/// # Errors
///
/// Returns an error if the username or password is rejected, the username is
/// taken, or the database is unreachable.
pub async fn create(username: &str, password: &str) -> Result<(), UserError> {
    let store = PgStore::new(connect().await?);

    let user = AuthService::new(&store).register(username, password).await?;

    tracing::info!(user_id = %user.id, username = %user.username, "User created");
    Ok(())
}
