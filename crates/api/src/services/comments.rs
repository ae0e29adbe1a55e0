//! Comment lifecycle.
//!
//! Every write path takes the already-authenticated [`CurrentUser`] and uses
//! its username as the comment author. Replace and remove select their target
//! through an [`OwnerFilter`], so a user can never modify another user's
//! comment: an edit reports not found, a removal silently matches nothing.

use chrono::Utc;

use bionicle_core::{CommentId, ProductId};

use crate::db::{CommentStore, OwnerFilter};
use crate::error::{AppError, Resource, Result};
use crate::models::{Comment, CommentForm, CurrentUser};

/// Longest comment body accepted, in characters.
pub const MAX_BODY_CHARS: usize = 2000;

fn validate_body(body: &str) -> Result<()> {
    if body.trim().is_empty() {
        return Err(AppError::bad_request("invalid_body", "Comment body is empty"));
    }
    if body.chars().count() > MAX_BODY_CHARS {
        return Err(AppError::bad_request(
            "invalid_body",
            format!("Comment body exceeds {MAX_BODY_CHARS} characters"),
        ));
    }
    Ok(())
}

fn parse_product_id(raw: &str) -> Result<ProductId> {
    ProductId::parse(raw)
        .map_err(|_| AppError::bad_request("invalid_id", format!("Invalid product ID: {raw}")))
}

/// All comments on a product, in store order.
///
/// A malformed product ID cannot have comments and yields an empty list.
///
/// # Errors
///
/// Returns `AppError::Store` if the store query fails.
pub async fn list<S: CommentStore + ?Sized>(store: &S, raw_product_id: &str) -> Result<Vec<Comment>> {
    let Ok(product) = ProductId::parse(raw_product_id) else {
        return Ok(Vec::new());
    };

    Ok(store.list_comments(product).await?)
}

/// Create a comment on `raw_product_id` authored by `author`.
///
/// The product reference is not checked for existence.
///
/// # Errors
///
/// Returns `AppError::BadRequest` for an invalid body or product ID, or
/// `AppError::Store` if the write fails.
pub async fn create<S: CommentStore + ?Sized>(
    store: &S,
    author: &CurrentUser,
    raw_product_id: &str,
    form: CommentForm,
) -> Result<Comment> {
    let product = parse_product_id(raw_product_id)?;
    validate_body(&form.body)?;

    let comment = Comment {
        id: CommentId::generate(),
        product,
        name: author.username.clone(),
        body: form.body,
        created: Utc::now(),
    };
    store.save_comment(&comment).await?;

    tracing::info!(
        comment_id = %comment.id,
        product_id = %comment.product,
        author = %comment.name,
        "Comment created"
    );

    Ok(comment)
}

/// Replace one of `author`'s comments wholesale.
///
/// The stored document becomes exactly `{id, productID, author, body, now}`;
/// nothing from the previous version survives except its ID.
///
/// # Errors
///
/// Returns `AppError::NotFound` if the ID is malformed or does not name a
/// comment owned by `author`, `AppError::BadRequest` for an invalid body or
/// missing product ID, or `AppError::Store` if the write fails.
pub async fn edit<S: CommentStore + ?Sized>(
    store: &S,
    author: &CurrentUser,
    raw_comment_id: &str,
    form: CommentForm,
) -> Result<Comment> {
    let Ok(id) = CommentId::parse(raw_comment_id) else {
        return Err(AppError::NotFound(Resource::Comment));
    };
    let product = match form.product_id.as_deref() {
        Some(raw) => parse_product_id(raw)?,
        None => return Err(AppError::bad_request("invalid_id", "productID is required")),
    };
    validate_body(&form.body)?;

    let replacement = Comment {
        id,
        product,
        name: author.username.clone(),
        body: form.body,
        created: Utc::now(),
    };
    let filter = OwnerFilter {
        id,
        author: &author.username,
    };

    if store.replace_comment(filter, &replacement).await? == 0 {
        tracing::debug!(comment_id = %id, author = %author.username, "Edit matched no owned comment");
        return Err(AppError::NotFound(Resource::Comment));
    }

    tracing::info!(comment_id = %id, author = %author.username, "Comment replaced");
    Ok(replacement)
}

/// Remove one of `author`'s comments.
///
/// Returns whether a comment was removed. Callers do not surface the
/// difference, so non-owners learn nothing about which IDs exist.
///
/// # Errors
///
/// Returns `AppError::Store` if the delete fails.
pub async fn remove<S: CommentStore + ?Sized>(
    store: &S,
    author: &CurrentUser,
    raw_comment_id: &str,
) -> Result<bool> {
    let Ok(id) = CommentId::parse(raw_comment_id) else {
        return Ok(false);
    };

    let removed = store
        .remove_comment(OwnerFilter {
            id,
            author: &author.username,
        })
        .await?;

    if removed > 0 {
        tracing::info!(comment_id = %id, author = %author.username, "Comment removed");
    }
    Ok(removed > 0)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use bionicle_core::{UserId, Username};

    fn user(name: &str) -> CurrentUser {
        CurrentUser::issue(UserId::generate(), Username::parse(name).unwrap())
    }

    fn form(body: &str, product_id: Option<String>) -> CommentForm {
        CommentForm {
            body: body.to_string(),
            product_id,
        }
    }

    #[tokio::test]
    async fn test_create_stamps_session_author() {
        let store = MemoryStore::new();
        let tahu = user("tahu");
        let product = ProductId::generate();

        let created = create(&store, &tahu, &product.to_string(), form("Hot", None))
            .await
            .unwrap();

        assert_eq!(created.name, tahu.username);
        assert_eq!(created.product, product);
        assert_eq!(
            list(&store, &product.to_string()).await.unwrap(),
            vec![created]
        );
    }

    #[tokio::test]
    async fn test_create_rejects_bad_input_without_writing() {
        let store = MemoryStore::new();
        let tahu = user("tahu");
        let product = ProductId::generate().to_string();

        let blank = create(&store, &tahu, &product, form("   ", None)).await;
        assert!(matches!(blank, Err(AppError::BadRequest { code: "invalid_body", .. })));

        let long = "x".repeat(MAX_BODY_CHARS + 1);
        let too_long = create(&store, &tahu, &product, form(&long, None)).await;
        assert!(matches!(too_long, Err(AppError::BadRequest { code: "invalid_body", .. })));

        let bad_id = create(&store, &tahu, "not-an-id", form("ok", None)).await;
        assert!(matches!(bad_id, Err(AppError::BadRequest { code: "invalid_id", .. })));

        assert_eq!(store.comment_count().await, 0);
    }

    #[tokio::test]
    async fn test_body_at_limit_is_accepted() {
        let store = MemoryStore::new();
        let body = "ö".repeat(MAX_BODY_CHARS);
        let created = create(
            &store,
            &user("gali"),
            &ProductId::generate().to_string(),
            form(&body, None),
        )
        .await
        .unwrap();
        assert_eq!(created.body, body);
    }

    #[tokio::test]
    async fn test_edit_replaces_every_field_but_id() {
        let store = MemoryStore::new();
        let tahu = user("tahu");
        let original_product = ProductId::generate();
        let original = create(&store, &tahu, &original_product.to_string(), form("old", None))
            .await
            .unwrap();

        let new_product = ProductId::generate();
        let edited = edit(
            &store,
            &tahu,
            &original.id.to_string(),
            form("new", Some(new_product.to_string())),
        )
        .await
        .unwrap();

        assert_eq!(edited.id, original.id);
        assert_eq!(edited.name, tahu.username);
        assert_eq!(edited.body, "new");
        assert_eq!(edited.product, new_product);
        assert!(edited.created >= original.created);
        assert!(
            list(&store, &original_product.to_string())
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_edit_by_non_owner_is_not_found() {
        let store = MemoryStore::new();
        let product = ProductId::generate().to_string();
        let original = create(&store, &user("tahu"), &product, form("mine", None))
            .await
            .unwrap();

        let result = edit(
            &store,
            &user("lewa"),
            &original.id.to_string(),
            form("hijacked", Some(product.clone())),
        )
        .await;
        assert!(matches!(result, Err(AppError::NotFound(Resource::Comment))));
        assert_eq!(list(&store, &product).await.unwrap(), vec![original]);
    }

    #[tokio::test]
    async fn test_edit_requires_product_id() {
        let store = MemoryStore::new();
        let tahu = user("tahu");
        let original = create(
            &store,
            &tahu,
            &ProductId::generate().to_string(),
            form("x", None),
        )
        .await
        .unwrap();

        let result = edit(&store, &tahu, &original.id.to_string(), form("y", None)).await;
        assert!(matches!(result, Err(AppError::BadRequest { code: "invalid_id", .. })));
    }

    #[tokio::test]
    async fn test_edit_malformed_id_is_not_found() {
        let store = MemoryStore::new();
        let result = edit(
            &store,
            &user("tahu"),
            "garbage",
            form("y", Some(ProductId::generate().to_string())),
        )
        .await;
        assert!(matches!(result, Err(AppError::NotFound(Resource::Comment))));
    }

    #[tokio::test]
    async fn test_remove_by_non_owner_is_silent_noop() {
        let store = MemoryStore::new();
        let tahu = user("tahu");
        let c = create(
            &store,
            &tahu,
            &ProductId::generate().to_string(),
            form("x", None),
        )
        .await
        .unwrap();

        assert!(!remove(&store, &user("onua"), &c.id.to_string()).await.unwrap());
        assert_eq!(store.comment_count().await, 1);

        assert!(remove(&store, &tahu, &c.id.to_string()).await.unwrap());
        assert_eq!(store.comment_count().await, 0);
    }

    #[tokio::test]
    async fn test_remove_malformed_id_is_noop() {
        let store = MemoryStore::new();
        assert!(!remove(&store, &user("tahu"), "???").await.unwrap());
    }

    #[tokio::test]
    async fn test_list_malformed_product_is_empty() {
        let store = MemoryStore::new();
        assert!(list(&store, "nope").await.unwrap().is_empty());
    }
}
