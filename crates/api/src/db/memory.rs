//! In-process implementation of the document store.
//!
//! Used when no database URL is configured, and by tests. All collections sit
//! behind a single lock; every operation takes it exactly once, which gives
//! the same per-document atomicity the database provides.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use bionicle_core::{PhotoId, ProductId, UserId, Username};

use super::{
    CatalogStore, CommentStore, DocumentStore, OwnerFilter, RepositoryError, UserStore,
};
use crate::models::{Comment, Photo, Product, User};

/// Document store holding everything in memory.
///
/// Cloning is cheap and clones share the same collections.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Collections>>,
}

#[derive(Debug, Default)]
struct Collections {
    products: Vec<Product>,
    photos: Vec<Photo>,
    comments: Vec<Comment>,
    users: Vec<(User, String)>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a product.
    pub async fn upsert_product(&self, product: Product) {
        let mut guard = self.inner.write().await;
        match guard.products.iter_mut().find(|p| p.id == product.id) {
            Some(existing) => *existing = product,
            None => guard.products.push(product),
        }
    }

    /// Insert or overwrite a photo.
    pub async fn upsert_photo(&self, photo: Photo) {
        let mut guard = self.inner.write().await;
        match guard.photos.iter_mut().find(|p| p.id == photo.id) {
            Some(existing) => *existing = photo,
            None => guard.photos.push(photo),
        }
    }

    /// Total number of comment documents, across all products.
    pub async fn comment_count(&self) -> usize {
        self.inner.read().await.comments.len()
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn find_product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let guard = self.inner.read().await;
        Ok(guard.products.iter().find(|p| p.id == id).cloned())
    }

    async fn list_products(&self) -> Result<Vec<Product>, RepositoryError> {
        Ok(self.inner.read().await.products.clone())
    }

    async fn find_photo(&self, id: PhotoId) -> Result<Option<Photo>, RepositoryError> {
        let guard = self.inner.read().await;
        Ok(guard.photos.iter().find(|p| p.id == id).cloned())
    }

    async fn list_photos(&self, product: ProductId) -> Result<Vec<Photo>, RepositoryError> {
        let guard = self.inner.read().await;
        Ok(guard
            .photos
            .iter()
            .filter(|p| p.product == product)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl CommentStore for MemoryStore {
    async fn list_comments(&self, product: ProductId) -> Result<Vec<Comment>, RepositoryError> {
        let guard = self.inner.read().await;
        Ok(guard
            .comments
            .iter()
            .filter(|c| c.product == product)
            .cloned()
            .collect())
    }

    async fn save_comment(&self, comment: &Comment) -> Result<(), RepositoryError> {
        let mut guard = self.inner.write().await;
        if guard.comments.iter().any(|c| c.id == comment.id) {
            return Err(RepositoryError::Conflict(
                "comment id already exists".to_owned(),
            ));
        }
        guard.comments.push(comment.clone());
        Ok(())
    }

    async fn replace_comment(
        &self,
        filter: OwnerFilter<'_>,
        replacement: &Comment,
    ) -> Result<u64, RepositoryError> {
        let mut guard = self.inner.write().await;
        match guard.comments.iter_mut().find(|c| filter.matches(c)) {
            Some(existing) => {
                *existing = Comment {
                    id: filter.id,
                    ..replacement.clone()
                };
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn remove_comment(&self, filter: OwnerFilter<'_>) -> Result<u64, RepositoryError> {
        let mut guard = self.inner.write().await;
        match guard.comments.iter().position(|c| filter.matches(c)) {
            Some(index) => {
                guard.comments.remove(index);
                Ok(1)
            }
            None => Ok(0),
        }
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(
        &self,
        username: &Username,
        password_hash: &str,
    ) -> Result<User, RepositoryError> {
        let mut guard = self.inner.write().await;
        if guard.users.iter().any(|(u, _)| &u.username == username) {
            return Err(RepositoryError::Conflict(
                "username already exists".to_owned(),
            ));
        }

        let user = User {
            id: UserId::generate(),
            username: username.clone(),
            created_at: Utc::now(),
        };
        guard.users.push((user.clone(), password_hash.to_owned()));
        Ok(user)
    }

    async fn find_credentials(
        &self,
        username: &Username,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let guard = self.inner.read().await;
        Ok(guard
            .users
            .iter()
            .find(|(u, _)| &u.username == username)
            .cloned())
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}
