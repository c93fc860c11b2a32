//! The cart aggregate and its mutation operations.
//!
//! A [`CartAggregate`] is the full set of line items plus derived totals for
//! one owner, whether that owner is an account (persisted cart) or an
//! anonymous device (session cart). Both storage backends share this single
//! implementation of the mutation operations; the storage layers only load
//! and save the aggregate.
//!
//! # Invariants
//!
//! - Items are unique by plant ID; adding the same plant twice folds into
//!   one line by quantity summation.
//! - A stored quantity is always >= 1. Setting a quantity to zero or below
//!   removes the line.
//! - `item_count` and `total` are pure functions of the items (plus current
//!   catalog prices) and are recomputed by every mutation before the
//!   aggregate is returned. They are never adjusted incrementally.
//!
//! Prices come from a [`PriceBook`] snapshot of the catalog taken by the
//! caller at mutation/read time, so totals always reflect current prices
//! rather than the price at the time an item was added. A plant that has
//! since been removed from the catalog prices at zero.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::PlantId;

/// Errors produced by cart mutation operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CartError {
    /// The referenced plant does not exist in the catalog or is flagged
    /// unavailable. The cart is left unchanged.
    #[error("plant is not available")]
    ProductUnavailable,

    /// `add` was called with a quantity of zero.
    #[error("quantity must be at least 1")]
    InvalidQuantity,
}

/// A catalog answer for one plant: its current price and availability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub plant_id: PlantId,
    pub price: Decimal,
    pub available: bool,
}

/// A snapshot of current catalog prices, keyed by plant ID.
///
/// Plants missing from the book (deleted or discontinued after being added
/// to a cart) price at zero, so a stale cart still totals without error.
#[derive(Debug, Clone, Default)]
pub struct PriceBook(HashMap<PlantId, Decimal>);

impl PriceBook {
    /// Create an empty price book.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the current price for a plant.
    pub fn insert(&mut self, plant_id: PlantId, price: Decimal) {
        self.0.insert(plant_id, price);
    }

    /// The current price of a plant, or zero if the plant is unknown.
    #[must_use]
    pub fn price_of(&self, plant_id: PlantId) -> Decimal {
        self.0.get(&plant_id).copied().unwrap_or(Decimal::ZERO)
    }
}

impl FromIterator<(PlantId, Decimal)> for PriceBook {
    fn from_iter<I: IntoIterator<Item = (PlantId, Decimal)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// One line item in a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// The plant this line refers to. Must reference an existing plant at
    /// the time of mutation; the plant may later be deleted.
    pub plant_id: PlantId,
    /// Always >= 1; lines never store a zero or negative quantity.
    pub quantity: u32,
    /// When the plant first entered the cart. Not updated on quantity change.
    pub added_at: DateTime<Utc>,
}

/// The full set of line items plus derived totals for one cart owner.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartAggregate {
    items: Vec<CartItem>,
    item_count: u32,
    total: Decimal,
}

impl CartAggregate {
    /// An empty cart.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// The line items, unique by plant ID.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Sum of all line quantities.
    #[must_use]
    pub const fn item_count(&self) -> u32 {
        self.item_count
    }

    /// Sum of (current catalog price x quantity) over all lines, as of the
    /// last recompute.
    #[must_use]
    pub const fn total(&self) -> Decimal {
        self.total
    }

    /// Whether the cart holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The plant IDs of all line items, for catalog price lookups.
    #[must_use]
    pub fn plant_ids(&self) -> Vec<PlantId> {
        self.items.iter().map(|item| item.plant_id).collect()
    }

    /// The quantity currently in the cart for a plant, if present.
    #[must_use]
    pub fn quantity_of(&self, plant_id: PlantId) -> Option<u32> {
        self.items
            .iter()
            .find(|item| item.plant_id == plant_id)
            .map(|item| item.quantity)
    }

    /// Add `quantity` of a plant to the cart.
    ///
    /// If the plant is already present its quantity is incremented;
    /// otherwise a new line is appended with `added_at` set to now.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InvalidQuantity`] if `quantity` is zero and
    /// [`CartError::ProductUnavailable`] if the catalog entry is flagged
    /// unavailable. The cart is unchanged on error.
    pub fn add(
        &mut self,
        entry: &CatalogEntry,
        quantity: u32,
        prices: &PriceBook,
    ) -> Result<(), CartError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity);
        }
        if !entry.available {
            return Err(CartError::ProductUnavailable);
        }

        match self
            .items
            .iter_mut()
            .find(|item| item.plant_id == entry.plant_id)
        {
            Some(item) => item.quantity = item.quantity.saturating_add(quantity),
            None => self.items.push(CartItem {
                plant_id: entry.plant_id,
                quantity,
                added_at: Utc::now(),
            }),
        }

        self.recompute(prices);
        Ok(())
    }

    /// Set the quantity of a plant to `quantity` exactly.
    ///
    /// A quantity <= 0 removes the line if present. A positive quantity
    /// replaces the stored quantity. No-op if the plant is not in the cart.
    pub fn set_quantity(&mut self, plant_id: PlantId, quantity: i64, prices: &PriceBook) {
        if quantity <= 0 {
            self.items.retain(|item| item.plant_id != plant_id);
        } else if let Some(item) = self.items.iter_mut().find(|item| item.plant_id == plant_id) {
            item.quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        }

        self.recompute(prices);
    }

    /// Remove a plant from the cart. No-op if absent.
    pub fn remove(&mut self, plant_id: PlantId, prices: &PriceBook) {
        self.items.retain(|item| item.plant_id != plant_id);
        self.recompute(prices);
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.items.clear();
        self.item_count = 0;
        self.total = Decimal::ZERO;
    }

    /// Recompute the derived `item_count` and `total` from the items and
    /// the given price snapshot.
    ///
    /// Every mutation calls this before returning; callers only need it
    /// directly on read paths, where totals must reflect current prices.
    pub fn recompute(&mut self, prices: &PriceBook) {
        self.item_count = self.items.iter().map(|item| item.quantity).sum();
        self.total = self
            .items
            .iter()
            .map(|item| prices.price_of(item.plant_id) * Decimal::from(item.quantity))
            .sum();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: i32, price: Decimal, available: bool) -> CatalogEntry {
        CatalogEntry {
            plant_id: PlantId::new(id),
            price,
            available,
        }
    }

    fn book(entries: &[CatalogEntry]) -> PriceBook {
        entries.iter().map(|e| (e.plant_id, e.price)).collect()
    }

    #[test]
    fn add_folds_duplicate_plants_into_one_line() {
        let fern = entry(1, Decimal::new(1999, 2), true);
        let prices = book(&[fern]);

        let mut cart = CartAggregate::empty();
        cart.add(&fern, 2, &prices).expect("first add");
        cart.add(&fern, 3, &prices).expect("second add");

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.quantity_of(fern.plant_id), Some(5));
        assert_eq!(cart.item_count(), 5);
        assert_eq!(cart.total(), Decimal::new(9995, 2));
    }

    #[test]
    fn add_preserves_added_at_on_quantity_change() {
        let fern = entry(1, Decimal::ONE, true);
        let prices = book(&[fern]);

        let mut cart = CartAggregate::empty();
        cart.add(&fern, 1, &prices).expect("add");
        let first_added_at = cart.items()[0].added_at;

        cart.add(&fern, 4, &prices).expect("increment");
        assert_eq!(cart.items()[0].added_at, first_added_at);
    }

    #[test]
    fn add_rejects_unavailable_plants_without_touching_the_cart() {
        let fern = entry(1, Decimal::ONE, true);
        let cactus = entry(2, Decimal::TEN, false);
        let prices = book(&[fern, cactus]);

        let mut cart = CartAggregate::empty();
        cart.add(&fern, 2, &prices).expect("add fern");
        let before = cart.clone();

        assert_eq!(
            cart.add(&cactus, 1, &prices),
            Err(CartError::ProductUnavailable)
        );
        assert_eq!(cart, before);
    }

    #[test]
    fn add_rejects_zero_quantity() {
        let fern = entry(1, Decimal::ONE, true);
        let mut cart = CartAggregate::empty();

        assert_eq!(
            cart.add(&fern, 0, &book(&[fern])),
            Err(CartError::InvalidQuantity)
        );
        assert!(cart.is_empty());
    }

    #[test]
    fn set_quantity_replaces_rather_than_increments() {
        let fern = entry(1, Decimal::new(500, 2), true);
        let prices = book(&[fern]);

        let mut cart = CartAggregate::empty();
        cart.add(&fern, 2, &prices).expect("add");
        cart.set_quantity(fern.plant_id, 7, &prices);

        assert_eq!(cart.quantity_of(fern.plant_id), Some(7));
        assert_eq!(cart.total(), Decimal::new(3500, 2));
    }

    #[test]
    fn set_quantity_zero_removes_the_line() {
        let fern = entry(1, Decimal::ONE, true);
        let prices = book(&[fern]);

        let mut cart = CartAggregate::empty();
        cart.add(&fern, 3, &prices).expect("add");
        cart.set_quantity(fern.plant_id, 0, &prices);

        assert!(cart.is_empty());
        assert_eq!(cart.item_count(), 0);
        assert_eq!(cart.total(), Decimal::ZERO);
    }

    #[test]
    fn set_quantity_on_absent_plant_is_a_noop() {
        let fern = entry(1, Decimal::ONE, true);
        let prices = book(&[fern]);

        let mut cart = CartAggregate::empty();
        cart.add(&fern, 3, &prices).expect("add");
        let before = cart.clone();

        cart.set_quantity(PlantId::new(99), 0, &prices);
        assert_eq!(cart, before);

        cart.set_quantity(PlantId::new(99), 5, &prices);
        assert_eq!(cart, before);
    }

    #[test]
    fn remove_is_a_noop_when_absent() {
        let fern = entry(1, Decimal::ONE, true);
        let prices = book(&[fern]);

        let mut cart = CartAggregate::empty();
        cart.add(&fern, 1, &prices).expect("add");
        cart.remove(PlantId::new(42), &prices);

        assert_eq!(cart.item_count(), 1);
    }

    #[test]
    fn clear_empties_any_cart() {
        let fern = entry(1, Decimal::ONE, true);
        let palm = entry(2, Decimal::TEN, true);
        let prices = book(&[fern, palm]);

        let mut cart = CartAggregate::empty();
        cart.add(&fern, 2, &prices).expect("add fern");
        cart.add(&palm, 1, &prices).expect("add palm");

        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.item_count(), 0);
        assert_eq!(cart.total(), Decimal::ZERO);

        // clearing an already-empty cart is fine
        cart.clear();
        assert!(cart.is_empty());
    }

    #[test]
    fn totals_always_match_a_fresh_recompute() {
        let fern = entry(1, Decimal::new(1250, 2), true);
        let palm = entry(2, Decimal::new(899, 2), true);
        let prices = book(&[fern, palm]);

        let mut cart = CartAggregate::empty();
        cart.add(&fern, 2, &prices).expect("add fern");
        cart.add(&palm, 1, &prices).expect("add palm");
        cart.set_quantity(fern.plant_id, 1, &prices);
        cart.remove(palm.plant_id, &prices);

        let mut recomputed = cart.clone();
        recomputed.recompute(&prices);
        assert_eq!(cart.item_count(), recomputed.item_count());
        assert_eq!(cart.total(), recomputed.total());

        let expected: u32 = cart.items().iter().map(|i| i.quantity).sum();
        assert_eq!(cart.item_count(), expected);
    }

    #[test]
    fn delisted_plants_price_at_zero_on_recompute() {
        let fern = entry(1, Decimal::TEN, true);
        let prices = book(&[fern]);

        let mut cart = CartAggregate::empty();
        cart.add(&fern, 2, &prices).expect("add");
        assert_eq!(cart.total(), Decimal::from(20));

        // The plant disappears from the catalog; the line remains but
        // contributes nothing to the total.
        cart.recompute(&PriceBook::new());
        assert_eq!(cart.item_count(), 2);
        assert_eq!(cart.total(), Decimal::ZERO);
    }

    #[test]
    fn serializes_with_camel_case_fields() {
        let fern = entry(1, Decimal::ONE, true);
        let prices = book(&[fern]);

        let mut cart = CartAggregate::empty();
        cart.add(&fern, 2, &prices).expect("add");

        let json = serde_json::to_value(&cart).expect("serialize");
        assert_eq!(json["itemCount"], 2);
        assert!(json["items"][0].get("plantId").is_some());
        assert!(json["items"][0].get("addedAt").is_some());
    }
}
