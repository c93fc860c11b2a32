//! Guest cart reconciliation on login.
//!
//! When a shopper logs in with items in their guest cart, those items move
//! into the account cart. Rules:
//!
//! - A non-empty account cart always wins: the guest cart is discarded,
//!   nothing is merged.
//! - Otherwise each guest line is re-added through the normal add path, so
//!   it is validated against the live catalog. Lines whose plant has been
//!   deleted or delisted since the shopper added them are skipped, never
//!   failing the login.
//! - The guest cart is cleared once, after the merge attempt, so running
//!   reconciliation again is a no-op.

use tracing::warn;

use sproutly_core::cart::CartAggregate;

use super::{CartService, CartServiceError, CartStore, Catalog};

/// Result of reconciling the guest cart into the account cart.
#[derive(Debug)]
pub struct ReconcileOutcome {
    /// The account cart after reconciliation, repriced.
    pub cart: CartAggregate,
    /// How many guest lines were moved into the account cart.
    pub migrated: u32,
}

impl ReconcileOutcome {
    /// Client-facing notification, suppressed when nothing moved.
    #[must_use]
    pub fn notification(&self) -> Option<String> {
        if self.migrated == 0 {
            None
        } else {
            Some(format!("{} item(s) moved to your account!", self.migrated))
        }
    }
}

/// Merge the guest cart into the account cart after login.
///
/// # Errors
///
/// Returns `CartServiceError` if a store or the catalog fails. Individual
/// guest lines that no longer resolve to a purchasable plant are skipped,
/// not errors.
pub async fn merge_guest_cart<C, G, A>(
    catalog: &C,
    guest: &G,
    account: &A,
) -> Result<ReconcileOutcome, CartServiceError>
where
    C: Catalog,
    G: CartStore,
    A: CartStore,
{
    let account_service = CartService::new(catalog, account);

    let guest_cart = guest.load().await?;
    if guest_cart.is_empty() {
        return Ok(ReconcileOutcome {
            cart: account_service.get().await?,
            migrated: 0,
        });
    }

    // A shopper returning to an account they already filled keeps that
    // cart; the anonymous browsing session does not overwrite it.
    let account_cart = account.load().await?;
    if !account_cart.is_empty() {
        guest.clear().await?;
        return Ok(ReconcileOutcome {
            cart: account_service.get().await?,
            migrated: 0,
        });
    }

    let mut migrated: u32 = 0;
    for item in guest_cart.items() {
        match account_service.add(item.plant_id, item.quantity).await {
            Ok(_) => migrated += 1,
            Err(
                e @ (CartServiceError::PlantNotFound | CartServiceError::Cart(_)),
            ) => {
                warn!(
                    plant_id = %item.plant_id,
                    quantity = item.quantity,
                    error = %e,
                    "skipping guest cart line during reconciliation"
                );
            }
            Err(e) => return Err(e),
        }
    }

    guest.clear().await?;

    Ok(ReconcileOutcome {
        cart: account_service.get().await?,
        migrated,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notification_suppressed_when_nothing_moved() {
        let outcome = ReconcileOutcome {
            cart: CartAggregate::empty(),
            migrated: 0,
        };
        assert!(outcome.notification().is_none());
    }

    #[test]
    fn notification_counts_lines() {
        let outcome = ReconcileOutcome {
            cart: CartAggregate::empty(),
            migrated: 3,
        };
        assert_eq!(
            outcome.notification().as_deref(),
            Some("3 item(s) moved to your account!")
        );
    }
}
