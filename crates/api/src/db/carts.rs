//! Account cart persistence.
//!
//! Each account has at most one cart row, stored as a single JSONB document.
//! The whole document is written on every mutation; last write wins, which
//! matches how a single shopper's concurrent tabs should behave.

use sqlx::PgPool;

use sproutly_core::UserId;
use sproutly_core::cart::CartAggregate;

use super::RepositoryError;

/// Repository for account cart documents.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Load an account's cart. An absent row is an empty cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` if the stored document does
    /// not deserialize.
    pub async fn load(&self, user_id: UserId) -> Result<CartAggregate, RepositoryError> {
        let row: Option<(serde_json::Value,)> =
            sqlx::query_as("SELECT document FROM shop.cart WHERE user_id = $1")
                .bind(user_id.as_i32())
                .fetch_optional(self.pool)
                .await?;

        match row {
            Some((document,)) => serde_json::from_value(document).map_err(|e| {
                RepositoryError::DataCorruption(format!("invalid cart document: {e}"))
            }),
            None => Ok(CartAggregate::empty()),
        }
    }

    /// Persist an account's cart, replacing any existing document.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the upsert fails.
    pub async fn save(
        &self,
        user_id: UserId,
        cart: &CartAggregate,
    ) -> Result<(), RepositoryError> {
        let document = serde_json::to_value(cart).map_err(|e| {
            RepositoryError::DataCorruption(format!("cart document serialization: {e}"))
        })?;

        sqlx::query(
            "INSERT INTO shop.cart (user_id, document) VALUES ($1, $2) \
             ON CONFLICT (user_id) DO UPDATE \
             SET document = EXCLUDED.document, updated_at = now()",
        )
        .bind(user_id.as_i32())
        .bind(document)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Delete an account's cart row.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn clear(&self, user_id: UserId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM shop.cart WHERE user_id = $1")
            .bind(user_id.as_i32())
            .execute(self.pool)
            .await?;

        Ok(())
    }
}
