//! Souq API library.
//!
//! REST backend for the Souq storefront and admin console, exposed as a
//! library so the router can be tested and the CLI can reuse the
//! repositories and password hashing.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod telemetry;
