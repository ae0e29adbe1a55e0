//! Product route handlers.

use axum::{
    Json,
    extract::{Path, State},
};

use crate::error::Result;
use crate::models::Product;
use crate::services::catalog;
use crate::state::AppState;

/// List every product.
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<Product>>> {
    Ok(Json(catalog::list_products(state.store()).await?))
}

/// Show one product.
pub async fn show(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> Result<Json<Product>> {
    Ok(Json(catalog::get_product(state.store(), &product_id).await?))
}
