//! Sproutly Core - Shared domain types library.
//!
//! This crate provides common types used across all Sproutly components:
//! - `api` - Public REST API server
//! - `cli` - Command-line tools for migrations, seeding, and management
//!
//! # Architecture
//!
//! The core crate contains only types and pure domain logic - no I/O, no
//! database access, no HTTP. This keeps it lightweight and allows it to be
//! used anywhere, including tests that run without a database.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, emails, roles, and care levels
//! - [`cart`] - The cart aggregate and its mutation operations

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod types;

pub use types::*;
