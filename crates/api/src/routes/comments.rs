//! Comment route handlers.
//!
//! The mutating handlers list [`RequireAuth`] before the JSON body, so an
//! anonymous request is rejected before its payload is read.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};

use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::models::{Comment, CommentPayload};
use crate::services::comments;
use crate::state::AppState;

/// List the comments on a product.
pub async fn index(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> Result<Json<Vec<Comment>>> {
    Ok(Json(comments::list(state.store(), &product_id).await?))
}

/// Create a comment as the session user.
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(product_id): Path<String>,
    payload: std::result::Result<Json<CommentPayload>, JsonRejection>,
) -> Result<Json<Comment>> {
    let Json(payload) = payload?;
    let comment = comments::create(state.store(), &user, &product_id, payload.form_data).await?;
    Ok(Json(comment))
}

/// Replace one of the session user's comments.
pub async fn edit(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(comment_id): Path<String>,
    payload: std::result::Result<Json<CommentPayload>, JsonRejection>,
) -> Result<Json<Comment>> {
    let Json(payload) = payload?;
    let comment = comments::edit(state.store(), &user, &comment_id, payload.form_data).await?;
    Ok(Json(comment))
}

/// Remove one of the session user's comments.
///
/// Always answers 200 with an empty body, whether or not anything matched.
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(comment_id): Path<String>,
) -> Result<StatusCode> {
    comments::remove(state.store(), &user, &comment_id).await?;
    Ok(StatusCode::OK)
}
