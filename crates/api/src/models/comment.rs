//! Comment documents and the request payloads that produce them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bionicle_core::{CommentId, ProductId, Username};

/// A comment left on a product.
///
/// `name` is always the username of the session that created or last
/// replaced the comment. It is never read from a request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    #[serde(rename = "_id")]
    pub id: CommentId,
    #[sqlx(rename = "product_id")]
    pub product: ProductId,
    /// Author username.
    #[sqlx(rename = "author")]
    pub name: Username,
    pub body: String,
    #[sqlx(rename = "created_at")]
    pub created: DateTime<Utc>,
}

/// Request body for creating or editing a comment.
///
/// Clients wrap their form fields in a `formData` object. Unknown fields
/// (including any author-like `name`) are ignored.
#[derive(Debug, Deserialize)]
pub struct CommentPayload {
    #[serde(rename = "formData")]
    pub form_data: CommentForm,
}

/// The form fields inside [`CommentPayload`].
#[derive(Debug, Deserialize)]
pub struct CommentForm {
    pub body: String,
    /// Target product, only read by the edit endpoint.
    #[serde(rename = "productID", default)]
    pub product_id: Option<String>,
}
