//! Guest cart reconciliation behavior.

#![allow(clippy::unwrap_used)]

use rust_decimal::Decimal;

use sproutly_api::services::cart::{CartService, merge_guest_cart};
use sproutly_core::PlantId;
use sproutly_core::cart::{CartAggregate, CatalogEntry, PriceBook};
use sproutly_integration_tests::{MemoryCartStore, MemoryCatalog};

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn catalog() -> MemoryCatalog {
    let catalog = MemoryCatalog::new();
    catalog.insert(PlantId::new(1), dec("899.00"), true);
    catalog.insert(PlantId::new(2), dec("599.00"), true);
    catalog.insert(PlantId::new(3), dec("299.00"), true);
    catalog
}

/// Build a cart aggregate directly, bypassing the service.
fn cart_of(lines: &[(i32, u32, &str)]) -> CartAggregate {
    let mut cart = CartAggregate::empty();
    let mut book = PriceBook::new();
    for &(id, _, price) in lines {
        book.insert(PlantId::new(id), dec(price));
    }
    for &(id, quantity, price) in lines {
        let entry = CatalogEntry {
            plant_id: PlantId::new(id),
            price: dec(price),
            available: true,
        };
        cart.add(&entry, quantity, &book).unwrap();
    }
    cart
}

#[tokio::test]
async fn empty_guest_cart_changes_nothing() {
    let catalog = catalog();
    let guest = MemoryCartStore::new();
    let account = MemoryCartStore::with_cart(cart_of(&[(1, 2, "899.00")]));

    let outcome = merge_guest_cart(&catalog, &guest, &account).await.unwrap();

    assert_eq!(outcome.migrated, 0);
    assert!(outcome.notification().is_none());
    assert_eq!(outcome.cart.quantity_of(PlantId::new(1)), Some(2));
}

#[tokio::test]
async fn guest_items_move_into_empty_account_cart() {
    let catalog = catalog();
    let guest = MemoryCartStore::with_cart(cart_of(&[(1, 1, "899.00"), (2, 3, "599.00")]));
    let account = MemoryCartStore::new();

    let outcome = merge_guest_cart(&catalog, &guest, &account).await.unwrap();

    assert_eq!(outcome.migrated, 2);
    assert_eq!(
        outcome.notification().as_deref(),
        Some("2 item(s) moved to your account!")
    );
    assert_eq!(outcome.cart.quantity_of(PlantId::new(1)), Some(1));
    assert_eq!(outcome.cart.quantity_of(PlantId::new(2)), Some(3));
    assert_eq!(outcome.cart.total(), dec("2696.00"));

    // Guest cart is consumed
    assert!(guest.stored().is_none());
    // Account store holds the merged cart
    assert_eq!(account.stored().unwrap().item_count(), 4);
}

#[tokio::test]
async fn nonempty_account_cart_wins_over_guest_cart() {
    let catalog = catalog();
    let guest = MemoryCartStore::with_cart(cart_of(&[(2, 5, "599.00")]));
    let account = MemoryCartStore::with_cart(cart_of(&[(1, 1, "899.00")]));

    let outcome = merge_guest_cart(&catalog, &guest, &account).await.unwrap();

    assert_eq!(outcome.migrated, 0);
    assert!(outcome.notification().is_none());
    // Account cart untouched, guest cart discarded
    assert_eq!(outcome.cart.quantity_of(PlantId::new(1)), Some(1));
    assert_eq!(outcome.cart.quantity_of(PlantId::new(2)), None);
    assert!(guest.stored().is_none());
}

#[tokio::test]
async fn deleted_plant_lines_are_skipped_not_fatal() {
    let catalog = catalog();
    let guest = MemoryCartStore::with_cart(cart_of(&[(1, 1, "899.00"), (2, 2, "599.00")]));
    let account = MemoryCartStore::new();

    // Plant 2 was deleted between browsing and login
    catalog.delete(PlantId::new(2));

    let outcome = merge_guest_cart(&catalog, &guest, &account).await.unwrap();

    assert_eq!(outcome.migrated, 1);
    assert_eq!(outcome.cart.quantity_of(PlantId::new(1)), Some(1));
    assert_eq!(outcome.cart.quantity_of(PlantId::new(2)), None);
    assert!(guest.stored().is_none());
}

#[tokio::test]
async fn unavailable_plant_lines_are_skipped() {
    let catalog = catalog();
    catalog.insert(PlantId::new(3), dec("299.00"), false);
    let guest = MemoryCartStore::with_cart(cart_of(&[(3, 1, "299.00"), (1, 1, "899.00")]));
    let account = MemoryCartStore::new();

    let outcome = merge_guest_cart(&catalog, &guest, &account).await.unwrap();

    assert_eq!(outcome.migrated, 1);
    assert_eq!(outcome.cart.quantity_of(PlantId::new(3)), None);
    assert_eq!(outcome.cart.quantity_of(PlantId::new(1)), Some(1));
}

#[tokio::test]
async fn rerunning_reconciliation_is_idempotent() {
    let catalog = catalog();
    let guest = MemoryCartStore::with_cart(cart_of(&[(1, 2, "899.00")]));
    let account = MemoryCartStore::new();

    // One line of quantity 2: migrated counts lines
    let first = merge_guest_cart(&catalog, &guest, &account).await.unwrap();
    assert_eq!(first.migrated, 1);
    assert_eq!(first.cart.quantity_of(PlantId::new(1)), Some(2));

    let second = merge_guest_cart(&catalog, &guest, &account).await.unwrap();
    assert_eq!(second.migrated, 0);
    assert!(second.notification().is_none());
    assert_eq!(second.cart, first.cart);
}

#[tokio::test]
async fn merged_cart_uses_live_prices() {
    let catalog = catalog();
    // Guest added plant 1 when it cost 899; the price has since gone up
    let guest = MemoryCartStore::with_cart(cart_of(&[(1, 1, "899.00")]));
    catalog.insert(PlantId::new(1), dec("999.00"), true);
    let account = MemoryCartStore::new();

    let outcome = merge_guest_cart(&catalog, &guest, &account).await.unwrap();

    assert_eq!(outcome.cart.total(), dec("999.00"));
}

#[tokio::test]
async fn migration_count_counts_lines_not_units() {
    let catalog = catalog();
    let guest = MemoryCartStore::with_cart(cart_of(&[(1, 7, "899.00")]));
    let account = MemoryCartStore::new();

    let outcome = merge_guest_cart(&catalog, &guest, &account).await.unwrap();

    assert_eq!(outcome.migrated, 1);
    assert_eq!(
        outcome.notification().as_deref(),
        Some("1 item(s) moved to your account!")
    );
    assert_eq!(outcome.cart.item_count(), 7);
}

#[tokio::test]
async fn reconciliation_after_reconciled_login_keeps_account_cart() {
    let catalog = catalog();
    let guest = MemoryCartStore::with_cart(cart_of(&[(2, 1, "599.00")]));
    let account = MemoryCartStore::new();

    // First login merges the guest cart
    merge_guest_cart(&catalog, &guest, &account).await.unwrap();

    // Shopper browses anonymously again, then logs back in; the account
    // cart is non-empty now so the new guest cart is discarded.
    let service = CartService::new(&catalog, &guest);
    service.add(PlantId::new(3), 4).await.unwrap();

    let outcome = merge_guest_cart(&catalog, &guest, &account).await.unwrap();

    assert_eq!(outcome.migrated, 0);
    assert_eq!(outcome.cart.quantity_of(PlantId::new(2)), Some(1));
    assert_eq!(outcome.cart.quantity_of(PlantId::new(3)), None);
}
