//! Business logic services.
//!
//! # Services
//!
//! - `auth` - Username/password registration and login
//! - `catalog` - Product and photo lookups
//! - `comments` - Comment lifecycle behind the identity gate
//!
//! Services return [`crate::error::AppError`] outcomes and never build HTTP
//! responses themselves.

pub mod auth;
pub mod catalog;
pub mod comments;
