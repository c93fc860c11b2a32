//! Core types for Sproutly.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod care;
pub mod email;
pub mod id;
pub mod role;

pub use care::{CareLevel, MoistureLevel};
pub use email::{Email, EmailError};
pub use id::*;
pub use role::Role;
