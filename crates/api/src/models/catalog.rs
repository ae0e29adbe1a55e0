//! Catalog documents: products and their photos.
//!
//! Both are read-only through the HTTP surface; they are written by the CLI
//! seeding command.

use serde::{Deserialize, Serialize};

use bionicle_core::{PhotoId, ProductId};

/// A product listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: ProductId,
    /// Free-text description.
    #[serde(rename = "desc")]
    pub description: String,
    /// Display price. Stored as text; no numeric guarantee.
    pub price: String,
    /// Units on hand.
    pub count: i64,
}

/// An image attached to a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Photo {
    #[serde(rename = "_id")]
    pub id: PhotoId,
    #[sqlx(rename = "product_id")]
    pub product: ProductId,
    pub title: String,
    /// Path of the image relative to the public `/images` mount.
    pub path: String,
}
