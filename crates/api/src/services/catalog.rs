//! Product and photo lookups.
//!
//! Identifiers arrive as raw path segments. A segment that is not a valid ID
//! cannot name any document, so lookups report it as not found and list
//! queries return nothing.

use bionicle_core::{PhotoId, ProductId};

use crate::db::CatalogStore;
use crate::error::{AppError, Resource, Result};
use crate::models::{Photo, Product};

/// Fetch one product.
///
/// # Errors
///
/// Returns `AppError::NotFound` if no product has this ID.
pub async fn get_product<S: CatalogStore + ?Sized>(store: &S, raw_id: &str) -> Result<Product> {
    let Ok(id) = ProductId::parse(raw_id) else {
        return Err(AppError::NotFound(Resource::Product));
    };

    store
        .find_product(id)
        .await?
        .ok_or(AppError::NotFound(Resource::Product))
}

/// Fetch every product.
///
/// # Errors
///
/// Returns `AppError::Store` if the store query fails.
pub async fn list_products<S: CatalogStore + ?Sized>(store: &S) -> Result<Vec<Product>> {
    Ok(store.list_products().await?)
}

/// Fetch one photo.
///
/// # Errors
///
/// Returns `AppError::NotFound` if no photo has this ID.
pub async fn get_photo<S: CatalogStore + ?Sized>(store: &S, raw_id: &str) -> Result<Photo> {
    let Ok(id) = PhotoId::parse(raw_id) else {
        return Err(AppError::NotFound(Resource::Photo));
    };

    store
        .find_photo(id)
        .await?
        .ok_or(AppError::NotFound(Resource::Photo))
}

/// Fetch the photos attached to a product.
///
/// # Errors
///
/// Returns `AppError::Store` if the store query fails.
pub async fn list_photos<S: CatalogStore + ?Sized>(
    store: &S,
    raw_product_id: &str,
) -> Result<Vec<Photo>> {
    let Ok(product) = ProductId::parse(raw_product_id) else {
        return Ok(Vec::new());
    };

    Ok(store.list_photos(product).await?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;

    async fn seeded() -> (MemoryStore, Product, Photo) {
        let store = MemoryStore::new();
        let product = Product {
            id: ProductId::generate(),
            description: "Tahu Nuva".to_string(),
            price: "$9.99".to_string(),
            count: 4,
        };
        let photo = Photo {
            id: PhotoId::generate(),
            product: product.id,
            title: "front".to_string(),
            path: "/images/tahu-front.jpg".to_string(),
        };
        store.upsert_product(product.clone()).await;
        store.upsert_photo(photo.clone()).await;
        (store, product, photo)
    }

    #[tokio::test]
    async fn test_get_product_found() {
        let (store, product, _) = seeded().await;
        let found = get_product(&store, &product.id.to_string()).await.unwrap();
        assert_eq!(found, product);
    }

    #[tokio::test]
    async fn test_get_product_missing_or_malformed_is_not_found() {
        let (store, _, _) = seeded().await;
        let missing = ProductId::generate().to_string();
        assert!(matches!(
            get_product(&store, &missing).await,
            Err(AppError::NotFound(Resource::Product))
        ));
        assert!(matches!(
            get_product(&store, "5e9f8f8f8f8f8f8f8f8f8f8f").await,
            Err(AppError::NotFound(Resource::Product))
        ));
    }

    #[tokio::test]
    async fn test_get_photo() {
        let (store, _, photo) = seeded().await;
        assert_eq!(get_photo(&store, &photo.id.to_string()).await.unwrap(), photo);
        assert!(matches!(
            get_photo(&store, "nope").await,
            Err(AppError::NotFound(Resource::Photo))
        ));
    }

    #[tokio::test]
    async fn test_list_photos_for_unknown_product_is_empty() {
        let (store, product, photo) = seeded().await;
        assert_eq!(
            list_photos(&store, &product.id.to_string()).await.unwrap(),
            vec![photo]
        );
        assert!(
            list_photos(&store, &ProductId::generate().to_string())
                .await
                .unwrap()
                .is_empty()
        );
        assert!(list_photos(&store, "garbage").await.unwrap().is_empty());
    }
}
