//! Souq Core - Shared types library.
//!
//! This crate provides common types used across all Souq components:
//! - `api` - REST backend for the storefront and the admin console
//! - `cli` - Command-line tools for migrations, seeding and admin users
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no database
//! access, no HTTP. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, emails, and roles
//! - [`catalog`] - Catalog rules shared by every reader (the "new" badge)
//! - [`cart`] - The client-held shopping cart and its stock-checked merge

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod types;

pub use cart::{Cart, CartError, CartItem, CartKey};
pub use types::*;
