//! Cart service.
//!
//! One code path serves both logged-in and anonymous shoppers: every
//! operation runs against a [`CartStore`], and the store decides where the
//! document lives. Account carts persist in `PostgreSQL`; guest carts live
//! in the session and follow the device until login merges them (see
//! [`reconcile`]).

pub mod guest;
pub mod reconcile;

pub use guest::SessionCart;
pub use reconcile::{ReconcileOutcome, merge_guest_cart};

use sqlx::PgPool;
use thiserror::Error;

use sproutly_core::cart::{CartAggregate, CartError, CatalogEntry, PriceBook};
use sproutly_core::{PlantId, UserId};

use crate::db::{CartRepository, PlantRepository, RepositoryError};

/// Errors from cart operations.
#[derive(Debug, Error)]
pub enum CartServiceError {
    /// The cart aggregate rejected the mutation.
    #[error("{0}")]
    Cart(#[from] CartError),

    /// The referenced plant does not exist in the catalog.
    #[error("plant not found")]
    PlantNotFound,

    /// Database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Session store error (guest carts).
    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),
}

/// Read access to plant pricing and availability.
pub trait Catalog {
    /// Price and availability for one plant, `None` if it does not exist.
    async fn lookup(&self, id: PlantId) -> Result<Option<CatalogEntry>, CartServiceError>;

    /// Current prices for a set of plants. Missing plants are absent from
    /// the book and price at zero.
    async fn price_book(&self, ids: &[PlantId]) -> Result<PriceBook, CartServiceError>;
}

/// Where a shopper's cart document lives.
pub trait CartStore {
    /// Load the cart. An absent document is an empty cart.
    async fn load(&self) -> Result<CartAggregate, CartServiceError>;

    /// Persist the cart, replacing any existing document.
    async fn save(&self, cart: &CartAggregate) -> Result<(), CartServiceError>;

    /// Drop the cart document entirely.
    async fn clear(&self) -> Result<(), CartServiceError>;
}

impl Catalog for PlantRepository<'_> {
    async fn lookup(&self, id: PlantId) -> Result<Option<CatalogEntry>, CartServiceError> {
        Ok(self.catalog_entry(id).await?)
    }

    async fn price_book(&self, ids: &[PlantId]) -> Result<PriceBook, CartServiceError> {
        Ok(self.prices_for(ids).await?)
    }
}

/// Cart store backed by the `shop.cart` table, one row per account.
pub struct AccountCart<'a> {
    carts: CartRepository<'a>,
    user_id: UserId,
}

impl<'a> AccountCart<'a> {
    /// Create a store for one account's cart.
    #[must_use]
    pub const fn new(pool: &'a PgPool, user_id: UserId) -> Self {
        Self {
            carts: CartRepository::new(pool),
            user_id,
        }
    }
}

impl CartStore for AccountCart<'_> {
    async fn load(&self) -> Result<CartAggregate, CartServiceError> {
        Ok(self.carts.load(self.user_id).await?)
    }

    async fn save(&self, cart: &CartAggregate) -> Result<(), CartServiceError> {
        Ok(self.carts.save(self.user_id, cart).await?)
    }

    async fn clear(&self) -> Result<(), CartServiceError> {
        Ok(self.carts.clear(self.user_id).await?)
    }
}

/// The cart store for the current request: account if logged in, session
/// otherwise.
pub enum ActiveCart<'a> {
    Account(AccountCart<'a>),
    Guest(SessionCart<'a>),
}

impl CartStore for ActiveCart<'_> {
    async fn load(&self) -> Result<CartAggregate, CartServiceError> {
        match self {
            Self::Account(store) => store.load().await,
            Self::Guest(store) => store.load().await,
        }
    }

    async fn save(&self, cart: &CartAggregate) -> Result<(), CartServiceError> {
        match self {
            Self::Account(store) => store.save(cart).await,
            Self::Guest(store) => store.save(cart).await,
        }
    }

    async fn clear(&self) -> Result<(), CartServiceError> {
        match self {
            Self::Account(store) => store.clear().await,
            Self::Guest(store) => store.clear().await,
        }
    }
}

/// Cart operations over any catalog and store.
///
/// Loads the document, applies the aggregate mutation, and writes the
/// result back. Reads reprice against the live catalog so stale totals
/// never reach the client.
pub struct CartService<'a, C, S> {
    catalog: &'a C,
    store: &'a S,
}

impl<'a, C: Catalog, S: CartStore> CartService<'a, C, S> {
    /// Create a cart service.
    #[must_use]
    pub const fn new(catalog: &'a C, store: &'a S) -> Self {
        Self { catalog, store }
    }

    /// The current cart, repriced against the live catalog.
    ///
    /// # Errors
    ///
    /// Returns `CartServiceError` if the store or catalog fails.
    pub async fn get(&self) -> Result<CartAggregate, CartServiceError> {
        let mut cart = self.store.load().await?;
        let book = self.catalog.price_book(&cart.plant_ids()).await?;
        cart.recompute(&book);
        Ok(cart)
    }

    /// Add a plant to the cart, folding into an existing line.
    ///
    /// # Errors
    ///
    /// Returns `CartServiceError::PlantNotFound` if the plant does not exist.
    /// Returns `CartServiceError::Cart` if it is unavailable or the quantity
    /// is zero. The stored cart is untouched on error.
    pub async fn add(
        &self,
        plant_id: PlantId,
        quantity: u32,
    ) -> Result<CartAggregate, CartServiceError> {
        let entry = self
            .catalog
            .lookup(plant_id)
            .await?
            .ok_or(CartServiceError::PlantNotFound)?;

        let mut cart = self.store.load().await?;
        let mut ids = cart.plant_ids();
        ids.push(plant_id);
        let book = self.catalog.price_book(&ids).await?;

        cart.add(&entry, quantity, &book)?;
        self.store.save(&cart).await?;
        Ok(cart)
    }

    /// Set a line's quantity. Zero or negative removes the line; a plant not
    /// in the cart is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `CartServiceError` if the store or catalog fails.
    pub async fn set_quantity(
        &self,
        plant_id: PlantId,
        quantity: i64,
    ) -> Result<CartAggregate, CartServiceError> {
        let mut cart = self.store.load().await?;
        let book = self.catalog.price_book(&cart.plant_ids()).await?;

        cart.set_quantity(plant_id, quantity, &book);
        self.store.save(&cart).await?;
        Ok(cart)
    }

    /// Remove a line from the cart.
    ///
    /// # Errors
    ///
    /// Returns `CartServiceError` if the store or catalog fails.
    pub async fn remove(&self, plant_id: PlantId) -> Result<CartAggregate, CartServiceError> {
        let mut cart = self.store.load().await?;
        let book = self.catalog.price_book(&cart.plant_ids()).await?;

        cart.remove(plant_id, &book);
        self.store.save(&cart).await?;
        Ok(cart)
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns `CartServiceError` if the store fails.
    pub async fn clear(&self) -> Result<CartAggregate, CartServiceError> {
        self.store.clear().await?;
        Ok(CartAggregate::empty())
    }
}
