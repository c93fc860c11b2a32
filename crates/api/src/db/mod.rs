//! Database operations for the Sproutly `PostgreSQL` database.
//!
//! # Tables (schema `shop`)
//!
//! - `app_user` - Site authentication and roles
//! - `category` - Plant categories (soft-deleted via `is_active`)
//! - `plant` - The plant catalog
//! - `plant_category` - Plant/category many-to-many join
//! - `cart` - One JSONB cart document per account
//!
//! Sessions live in the `tower_sessions` schema (tower-sessions store).
//!
//! Queries use the runtime sqlx API (`query`, `query_as`, `QueryBuilder`)
//! so the workspace builds without a live database.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p sproutly-cli -- migrate
//! ```

pub mod carts;
pub mod categories;
pub mod plants;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use carts::CartRepository;
pub use categories::CategoryRepository;
pub use plants::PlantRepository;
pub use users::UserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email, referenced category).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
