//! `PostgreSQL` implementation of the document store.
//!
//! Queries are built at runtime with `query_as` so the crate builds without a
//! live database.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use bionicle_core::{PhotoId, ProductId, UserId, Username};

use super::{
    CatalogStore, CommentStore, DocumentStore, OwnerFilter, RepositoryError, UserStore,
};
use crate::models::{Comment, Photo, Product, User};

/// Document store backed by a `PostgreSQL` pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: UserId,
    username: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}

impl UserRow {
    fn into_parts(self) -> Result<(User, String), RepositoryError> {
        let username = Username::parse(&self.username).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid username in database: {e}"))
        })?;

        Ok((
            User {
                id: self.id,
                username,
                created_at: self.created_at,
            },
            self.password_hash,
        ))
    }
}

impl PgStore {
    /// Create a store over an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get a reference to the underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Insert or overwrite a product (catalog seeding).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn upsert_product(&self, product: &Product) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO product (id, description, price, count)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO UPDATE
            SET description = EXCLUDED.description,
                price = EXCLUDED.price,
                count = EXCLUDED.count
            ",
        )
        .bind(product.id)
        .bind(&product.description)
        .bind(&product.price)
        .bind(product.count)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Insert or overwrite a photo (catalog seeding).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn upsert_photo(&self, photo: &Photo) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO photo (id, product_id, title, path)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO UPDATE
            SET product_id = EXCLUDED.product_id,
                title = EXCLUDED.title,
                path = EXCLUDED.path
            ",
        )
        .bind(photo.id)
        .bind(photo.product)
        .bind(&photo.title)
        .bind(&photo.path)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl CatalogStore for PgStore {
    async fn find_product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(
            "SELECT id, description, price, count FROM product WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(product)
    }

    async fn list_products(&self) -> Result<Vec<Product>, RepositoryError> {
        let products =
            sqlx::query_as::<_, Product>("SELECT id, description, price, count FROM product")
                .fetch_all(&self.pool)
                .await?;
        Ok(products)
    }

    async fn find_photo(&self, id: PhotoId) -> Result<Option<Photo>, RepositoryError> {
        let photo = sqlx::query_as::<_, Photo>(
            "SELECT id, product_id, title, path FROM photo WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(photo)
    }

    async fn list_photos(&self, product: ProductId) -> Result<Vec<Photo>, RepositoryError> {
        let photos = sqlx::query_as::<_, Photo>(
            "SELECT id, product_id, title, path FROM photo WHERE product_id = $1",
        )
        .bind(product)
        .fetch_all(&self.pool)
        .await?;
        Ok(photos)
    }
}

#[async_trait]
impl CommentStore for PgStore {
    async fn list_comments(&self, product: ProductId) -> Result<Vec<Comment>, RepositoryError> {
        let comments = sqlx::query_as::<_, Comment>(
            r"
            SELECT id, product_id, author, body, created_at
            FROM comment
            WHERE product_id = $1
            ORDER BY created_at
            ",
        )
        .bind(product)
        .fetch_all(&self.pool)
        .await?;
        Ok(comments)
    }

    async fn save_comment(&self, comment: &Comment) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO comment (id, product_id, author, body, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(comment.id)
        .bind(comment.product)
        .bind(&comment.name)
        .bind(&comment.body)
        .bind(comment.created)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("comment id already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;
        Ok(())
    }

    async fn replace_comment(
        &self,
        filter: OwnerFilter<'_>,
        replacement: &Comment,
    ) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE comment
            SET product_id = $3, author = $4, body = $5, created_at = $6
            WHERE id = $1 AND author = $2
            ",
        )
        .bind(filter.id)
        .bind(filter.author)
        .bind(replacement.product)
        .bind(&replacement.name)
        .bind(&replacement.body)
        .bind(replacement.created)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn remove_comment(&self, filter: OwnerFilter<'_>) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM comment WHERE id = $1 AND author = $2")
            .bind(filter.id)
            .bind(filter.author)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn create_user(
        &self,
        username: &Username,
        password_hash: &str,
    ) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            INSERT INTO app_user (id, username, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, username, password_hash, created_at
            ",
        )
        .bind(UserId::generate())
        .bind(username)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("username already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        let (user, _) = row.into_parts()?;
        Ok(user)
    }

    async fn find_credentials(
        &self,
        username: &Username,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            SELECT id, username, password_hash, created_at
            FROM app_user
            WHERE username = $1
            ",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        row.map(UserRow::into_parts).transpose()
    }
}

#[async_trait]
impl DocumentStore for PgStore {
    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
