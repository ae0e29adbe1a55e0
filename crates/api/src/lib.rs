//! Bionicle shop REST backend library.
//!
//! Serves the product catalog, product photos and per-product comments as
//! JSON. Comment writes are gated on a signed session cookie established by
//! the `/api/users` endpoints.
//!
//! The crate is a library so the router can be driven in tests and reused by
//! the CLI; the `bionicle-api` binary wires it to a listener.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
