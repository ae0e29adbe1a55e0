//! Domain models for the shop backend.
//!
//! Field names on the wire follow the document-store shape (`_id`, `desc`,
//! `name`, `created`, ...) so existing front-end clients keep working.

pub mod catalog;
pub mod comment;
pub mod session;
pub mod user;

pub use catalog::{Photo, Product};
pub use comment::{Comment, CommentForm, CommentPayload};
pub use session::{CurrentUser, session_keys};
pub use user::User;
