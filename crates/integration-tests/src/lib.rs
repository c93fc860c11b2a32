//! Integration tests for Sproutly.
//!
//! The cart service and reconciler are exercised against in-memory
//! implementations of [`Catalog`] and [`CartStore`], so these tests need no
//! database or running server.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p sproutly-integration-tests
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]
// Test support code; lock poisoning aborts the test run loudly.
#![allow(clippy::unwrap_used)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use rust_decimal::Decimal;

use sproutly_api::db::RepositoryError;
use sproutly_api::services::cart::{Catalog, CartServiceError, CartStore};
use sproutly_core::PlantId;
use sproutly_core::cart::{CartAggregate, CatalogEntry, PriceBook};

/// In-memory plant catalog.
#[derive(Default)]
pub struct MemoryCatalog {
    entries: Mutex<HashMap<PlantId, CatalogEntry>>,
}

impl MemoryCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a plant.
    pub fn insert(&self, plant_id: PlantId, price: Decimal, available: bool) {
        self.entries.lock().unwrap().insert(
            plant_id,
            CatalogEntry {
                plant_id,
                price,
                available,
            },
        );
    }

    /// Remove a plant, as if it were deleted from the shop.
    pub fn delete(&self, plant_id: PlantId) {
        self.entries.lock().unwrap().remove(&plant_id);
    }
}

impl Catalog for MemoryCatalog {
    async fn lookup(&self, id: PlantId) -> Result<Option<CatalogEntry>, CartServiceError> {
        Ok(self.entries.lock().unwrap().get(&id).cloned())
    }

    async fn price_book(&self, ids: &[PlantId]) -> Result<PriceBook, CartServiceError> {
        let entries = self.entries.lock().unwrap();
        Ok(ids
            .iter()
            .filter_map(|id| entries.get(id).map(|e| (*id, e.price)))
            .collect())
    }
}

/// In-memory cart store. Saves can be made to fail to test fault handling.
#[derive(Default)]
pub struct MemoryCartStore {
    cart: Mutex<Option<CartAggregate>>,
    fail_saves: AtomicBool,
}

impl MemoryCartStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate the stored cart.
    #[must_use]
    pub fn with_cart(cart: CartAggregate) -> Self {
        Self {
            cart: Mutex::new(Some(cart)),
            fail_saves: AtomicBool::new(false),
        }
    }

    /// Make every subsequent save fail.
    pub fn fail_saves(&self) {
        self.fail_saves.store(true, Ordering::SeqCst);
    }

    /// The stored cart as-is, without repricing.
    #[must_use]
    pub fn stored(&self) -> Option<CartAggregate> {
        self.cart.lock().unwrap().clone()
    }
}

impl CartStore for MemoryCartStore {
    async fn load(&self) -> Result<CartAggregate, CartServiceError> {
        Ok(self.cart.lock().unwrap().clone().unwrap_or_default())
    }

    async fn save(&self, cart: &CartAggregate) -> Result<(), CartServiceError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(CartServiceError::Repository(RepositoryError::Conflict(
                "storage offline".to_string(),
            )));
        }
        *self.cart.lock().unwrap() = Some(cart.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<(), CartServiceError> {
        *self.cart.lock().unwrap() = None;
        Ok(())
    }
}
