//! Photo route handlers.

use axum::{
    Json,
    extract::{Path, State},
};

use crate::error::Result;
use crate::models::Photo;
use crate::services::catalog;
use crate::state::AppState;

/// Show one photo record.
pub async fn show(
    State(state): State<AppState>,
    Path(photo_id): Path<String>,
) -> Result<Json<Photo>> {
    Ok(Json(catalog::get_photo(state.store(), &photo_id).await?))
}

/// Photos attached to a product. Unknown products have no photos.
pub async fn for_product(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> Result<Json<Vec<Photo>>> {
    Ok(Json(catalog::list_photos(state.store(), &product_id).await?))
}
