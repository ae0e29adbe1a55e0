//! Catalog seeding from YAML.
//!
//! ```yaml
//! products:
//!   - id: 6f1c1c0e-7d2a-4b53-9a51-0c6f1f0e2b11   # optional
//!     desc: Tahu Nuva
//!     price: "$9.99"
//!     count: 4
//!     photos:
//!       - title: front
//!         path: /images/tahu-front.jpg
//! ```
//!
//! Entries with an `id` are upserted, so re-running a file with IDs is safe.
//! Entries without one get a fresh ID on every run.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use bionicle_api::db::PgStore;
use bionicle_api::models::{Photo, Product};
use bionicle_core::{PhotoId, ProductId};

use super::{CommandError, connect};

#[derive(Debug, Error)]
pub enum SeedError {
    #[error(transparent)]
    Command(#[from] CommandError),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid catalog file: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid catalog entry: {0}")]
    Invalid(String),

    #[error("Store error: {0}")]
    Store(#[from] bionicle_api::db::RepositoryError),
}

/// Top-level catalog file.
#[derive(Debug, Deserialize)]
pub struct CatalogFile {
    #[serde(default)]
    pub products: Vec<ProductEntry>,
}

/// One product and its photos.
#[derive(Debug, Deserialize)]
pub struct ProductEntry {
    #[serde(default)]
    pub id: Option<ProductId>,
    pub desc: String,
    pub price: String,
    #[serde(default)]
    pub count: i64,
    #[serde(default)]
    pub photos: Vec<PhotoEntry>,
}

/// A photo attached to a [`ProductEntry`].
#[derive(Debug, Deserialize)]
pub struct PhotoEntry {
    #[serde(default)]
    pub id: Option<PhotoId>,
    pub title: String,
    pub path: String,
}

impl CatalogFile {
    /// Turn the file into store documents, assigning missing IDs.
    ///
    /// # Errors
    ///
    /// Returns `SeedError::Invalid` for negative stock counts or empty
    /// photo paths.
    pub fn into_documents(self) -> Result<Vec<(Product, Vec<Photo>)>, SeedError> {
        self.products
            .into_iter()
            .map(|entry| {
                if entry.count < 0 {
                    return Err(SeedError::Invalid(format!(
                        "'{}' has a negative count",
                        entry.desc
                    )));
                }

                let product = Product {
                    id: entry.id.unwrap_or_else(ProductId::generate),
                    description: entry.desc,
                    price: entry.price,
                    count: entry.count,
                };

                let photos = entry
                    .photos
                    .into_iter()
                    .map(|photo| {
                        if photo.path.trim().is_empty() {
                            return Err(SeedError::Invalid(format!(
                                "photo '{}' of '{}' has no path",
                                photo.title, product.description
                            )));
                        }
                        Ok(Photo {
                            id: photo.id.unwrap_or_else(PhotoId::generate),
                            product: product.id,
                            title: photo.title,
                            path: photo.path,
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?;

                Ok((product, photos))
            })
            .collect()
    }
}

/// Seed products and photos from a YAML file.
///
/// # Errors
///
/// Returns an error if the file is missing or invalid, or a database write
/// fails.
pub async fn catalog(file_path: &str) -> Result<(), SeedError> {
    let path = Path::new(file_path);
    if !path.exists() {
        return Err(SeedError::NotFound(file_path.to_owned()));
    }

    info!(path = %file_path, "Loading catalog from file");

    // Read and validate before connecting to the database
    let content = tokio::fs::read_to_string(path).await?;
    let documents = serde_yaml::from_str::<CatalogFile>(&content)?.into_documents()?;

    info!(products = documents.len(), "Parsed catalog");

    let store = PgStore::new(connect().await?);

    let mut photo_count = 0usize;
    for (product, photos) in &documents {
        store.upsert_product(product).await?;
        for photo in photos {
            store.upsert_photo(photo).await?;
        }
        photo_count += photos.len();
    }

    info!("Seeding complete!");
    info!("  Products upserted: {}", documents.len());
    info!("  Photos upserted: {photo_count}");

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_and_links_photos() {
        let yaml = r#"
products:
  - id: 00000000-0000-0000-0000-000000000007
    desc: Kopaka Nuva
    price: "$9.99"
    count: 2
    photos:
      - title: front
        path: /images/kopaka.jpg
  - desc: Pohatu Nuva
    price: "$9.99"
"#;
        let documents = serde_yaml::from_str::<CatalogFile>(yaml)
            .unwrap()
            .into_documents()
            .unwrap();

        assert_eq!(documents.len(), 2);
        let (kopaka, photos) = &documents[0];
        assert_eq!(
            kopaka.id.to_string(),
            "00000000-0000-0000-0000-000000000007"
        );
        assert_eq!(photos.len(), 1);
        assert_eq!(photos[0].product, kopaka.id);

        let (pohatu, photos) = &documents[1];
        assert_eq!(pohatu.count, 0);
        assert!(photos.is_empty());
    }

    #[test]
    fn test_rejects_negative_count() {
        let yaml = "products:\n  - desc: Onua\n    price: \"$1\"\n    count: -1\n";
        let result = serde_yaml::from_str::<CatalogFile>(yaml)
            .unwrap()
            .into_documents();
        assert!(matches!(result, Err(SeedError::Invalid(_))));
    }

    #[test]
    fn test_rejects_photo_without_path() {
        let yaml = "products:\n  - desc: Gali\n    price: \"$1\"\n    photos:\n      - title: x\n        path: \"  \"\n";
        let result = serde_yaml::from_str::<CatalogFile>(yaml)
            .unwrap()
            .into_documents();
        assert!(matches!(result, Err(SeedError::Invalid(_))));
    }

    #[test]
    fn test_empty_file_seeds_nothing() {
        let documents = serde_yaml::from_str::<CatalogFile>("{}")
            .unwrap()
            .into_documents()
            .unwrap();
        assert!(documents.is_empty());
    }
}
