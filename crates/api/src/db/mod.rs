//! Document store access.
//!
//! # Collections
//!
//! - `product` - Catalog entries (read-only over HTTP)
//! - `photo` - Product images (read-only over HTTP)
//! - `comment` - Per-product comments
//! - `app_user` - Accounts for session login
//!
//! Handlers never reach a store directly through a global. The store is a
//! capability held by [`crate::state::AppState`] as `Arc<dyn DocumentStore>`,
//! with two implementations:
//!
//! - [`PgStore`] - `PostgreSQL` via sqlx (production)
//! - [`MemoryStore`] - in-process collections (development and tests)
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p bionicle-cli -- migrate
//! ```

pub mod memory;
pub mod postgres;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use bionicle_core::{CommentId, PhotoId, ProductId, Username};

use crate::models::{Comment, Photo, Product, User};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the store is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Constraint violation (e.g., duplicate username).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Restricts a comment write to one document owned by one author.
///
/// Both the replace and the remove path go through this filter, so a caller
/// can only ever touch comments whose `name` is their own username.
#[derive(Debug, Clone, Copy)]
pub struct OwnerFilter<'a> {
    pub id: CommentId,
    pub author: &'a Username,
}

impl OwnerFilter<'_> {
    /// Whether `comment` is selected by this filter.
    #[must_use]
    pub fn matches(&self, comment: &Comment) -> bool {
        comment.id == self.id && &comment.name == self.author
    }
}

/// Read access to products and photos.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Look up one product.
    async fn find_product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError>;

    /// Every product.
    async fn list_products(&self) -> Result<Vec<Product>, RepositoryError>;

    /// Look up one photo.
    async fn find_photo(&self, id: PhotoId) -> Result<Option<Photo>, RepositoryError>;

    /// Photos attached to `product`.
    async fn list_photos(&self, product: ProductId) -> Result<Vec<Photo>, RepositoryError>;
}

/// Comment collection access.
#[async_trait]
pub trait CommentStore: Send + Sync {
    /// Comments on `product`, oldest first.
    async fn list_comments(&self, product: ProductId) -> Result<Vec<Comment>, RepositoryError>;

    /// Insert a new comment. Fails with `Conflict` if the ID exists.
    async fn save_comment(&self, comment: &Comment) -> Result<(), RepositoryError>;

    /// Overwrite the comment selected by `filter` with `replacement`.
    ///
    /// Returns the number of documents replaced (0 or 1).
    async fn replace_comment(
        &self,
        filter: OwnerFilter<'_>,
        replacement: &Comment,
    ) -> Result<u64, RepositoryError>;

    /// Delete the comment selected by `filter`.
    ///
    /// Returns the number of documents removed (0 or 1).
    async fn remove_comment(&self, filter: OwnerFilter<'_>) -> Result<u64, RepositoryError>;
}

/// Account storage for the login subsystem.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new account.
    ///
    /// Returns `RepositoryError::Conflict` if the username is taken.
    async fn create_user(
        &self,
        username: &Username,
        password_hash: &str,
    ) -> Result<User, RepositoryError>;

    /// Look up an account and its password hash by username.
    async fn find_credentials(
        &self,
        username: &Username,
    ) -> Result<Option<(User, String)>, RepositoryError>;
}

/// Everything the HTTP layer needs from a backing store.
#[async_trait]
pub trait DocumentStore: CatalogStore + CommentStore + UserStore {
    /// Check that the store is reachable.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Apply the schema migrations in `crates/api/migrations/`.
///
/// # Errors
///
/// Returns an error if a migration fails to apply.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
