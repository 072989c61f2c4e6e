//! Business logic services.
//!
//! - `auth` - Password authentication and bearer tokens
//! - `cache` - Cached category tree and site info
//! - `uploads` - Image upload validation and storage

pub mod auth;
pub mod cache;
pub mod uploads;
