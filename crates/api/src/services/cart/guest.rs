//! Session-backed guest cart.
//!
//! Anonymous shoppers get a cart document stored in their session, scoped
//! to the device like the session cookie itself. It survives until the
//! session expires or a login merges it into the account cart.

use tower_sessions::Session;

use sproutly_core::cart::CartAggregate;

use super::{CartServiceError, CartStore};
use crate::models::session_keys;

/// Cart store backed by the request session.
pub struct SessionCart<'a> {
    session: &'a Session,
}

impl<'a> SessionCart<'a> {
    /// Create a store over the request's session.
    #[must_use]
    pub const fn new(session: &'a Session) -> Self {
        Self { session }
    }
}

impl CartStore for SessionCart<'_> {
    async fn load(&self) -> Result<CartAggregate, CartServiceError> {
        let cart = self
            .session
            .get::<CartAggregate>(session_keys::GUEST_CART)
            .await?;
        Ok(cart.unwrap_or_default())
    }

    async fn save(&self, cart: &CartAggregate) -> Result<(), CartServiceError> {
        self.session.insert(session_keys::GUEST_CART, cart).await?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), CartServiceError> {
        self.session
            .remove::<CartAggregate>(session_keys::GUEST_CART)
            .await?;
        Ok(())
    }
}
