//! Cart service behavior against an in-memory catalog and store.

#![allow(clippy::unwrap_used)]

use rust_decimal::Decimal;

use sproutly_api::services::cart::{CartService, CartServiceError};
use sproutly_core::PlantId;
use sproutly_core::cart::CartError;
use sproutly_integration_tests::{MemoryCartStore, MemoryCatalog};

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn catalog_with_monstera() -> MemoryCatalog {
    let catalog = MemoryCatalog::new();
    catalog.insert(PlantId::new(1), dec("899.00"), true);
    catalog.insert(PlantId::new(2), dec("599.00"), true);
    catalog
}

#[tokio::test]
async fn add_creates_a_line_and_persists() {
    let catalog = catalog_with_monstera();
    let store = MemoryCartStore::new();
    let service = CartService::new(&catalog, &store);

    let cart = service.add(PlantId::new(1), 2).await.unwrap();

    assert_eq!(cart.item_count(), 2);
    assert_eq!(cart.total(), dec("1798.00"));
    assert_eq!(store.stored().unwrap(), cart);
}

#[tokio::test]
async fn adding_same_plant_folds_into_one_line() {
    let catalog = catalog_with_monstera();
    let store = MemoryCartStore::new();
    let service = CartService::new(&catalog, &store);

    service.add(PlantId::new(1), 1).await.unwrap();
    let cart = service.add(PlantId::new(1), 3).await.unwrap();

    assert_eq!(cart.items().len(), 1);
    assert_eq!(cart.quantity_of(PlantId::new(1)), Some(4));
    assert_eq!(cart.item_count(), 4);
}

#[tokio::test]
async fn unknown_plant_is_not_found() {
    let catalog = catalog_with_monstera();
    let store = MemoryCartStore::new();
    let service = CartService::new(&catalog, &store);

    let err = service.add(PlantId::new(99), 1).await.unwrap_err();
    assert!(matches!(err, CartServiceError::PlantNotFound));
}

#[tokio::test]
async fn unavailable_plant_rejected_and_store_untouched() {
    let catalog = catalog_with_monstera();
    catalog.insert(PlantId::new(3), dec("199.00"), false);
    let store = MemoryCartStore::new();
    let service = CartService::new(&catalog, &store);

    service.add(PlantId::new(1), 1).await.unwrap();
    let before = store.stored().unwrap();

    let err = service.add(PlantId::new(3), 1).await.unwrap_err();
    assert!(matches!(
        err,
        CartServiceError::Cart(CartError::ProductUnavailable)
    ));
    assert_eq!(store.stored().unwrap(), before);
}

#[tokio::test]
async fn zero_quantity_add_rejected() {
    let catalog = catalog_with_monstera();
    let store = MemoryCartStore::new();
    let service = CartService::new(&catalog, &store);

    let err = service.add(PlantId::new(1), 0).await.unwrap_err();
    assert!(matches!(
        err,
        CartServiceError::Cart(CartError::InvalidQuantity)
    ));
    assert!(store.stored().is_none());
}

#[tokio::test]
async fn set_quantity_zero_removes_the_line() {
    let catalog = catalog_with_monstera();
    let store = MemoryCartStore::new();
    let service = CartService::new(&catalog, &store);

    service.add(PlantId::new(1), 2).await.unwrap();
    service.add(PlantId::new(2), 1).await.unwrap();
    let cart = service.set_quantity(PlantId::new(1), 0).await.unwrap();

    assert_eq!(cart.items().len(), 1);
    assert_eq!(cart.quantity_of(PlantId::new(1)), None);
    assert_eq!(cart.total(), dec("599.00"));
}

#[tokio::test]
async fn negative_quantity_also_removes() {
    let catalog = catalog_with_monstera();
    let store = MemoryCartStore::new();
    let service = CartService::new(&catalog, &store);

    service.add(PlantId::new(1), 2).await.unwrap();
    let cart = service.set_quantity(PlantId::new(1), -5).await.unwrap();

    assert!(cart.is_empty());
}

#[tokio::test]
async fn set_quantity_for_absent_plant_is_a_noop() {
    let catalog = catalog_with_monstera();
    let store = MemoryCartStore::new();
    let service = CartService::new(&catalog, &store);

    service.add(PlantId::new(1), 2).await.unwrap();
    let cart = service.set_quantity(PlantId::new(2), 5).await.unwrap();

    assert_eq!(cart.items().len(), 1);
    assert_eq!(cart.quantity_of(PlantId::new(2)), None);
}

#[tokio::test]
async fn get_reprices_against_the_live_catalog() {
    let catalog = catalog_with_monstera();
    let store = MemoryCartStore::new();
    let service = CartService::new(&catalog, &store);

    service.add(PlantId::new(1), 1).await.unwrap();

    // Price change after the cart was stored
    catalog.insert(PlantId::new(1), dec("999.00"), true);
    let cart = service.get().await.unwrap();

    assert_eq!(cart.total(), dec("999.00"));
}

#[tokio::test]
async fn deleted_plant_line_prices_at_zero() {
    let catalog = catalog_with_monstera();
    let store = MemoryCartStore::new();
    let service = CartService::new(&catalog, &store);

    service.add(PlantId::new(1), 1).await.unwrap();
    service.add(PlantId::new(2), 2).await.unwrap();

    catalog.delete(PlantId::new(2));
    let cart = service.get().await.unwrap();

    // The line survives so the client can show it, but it costs nothing.
    assert_eq!(cart.quantity_of(PlantId::new(2)), Some(2));
    assert_eq!(cart.total(), dec("899.00"));
    assert_eq!(cart.item_count(), 3);
}

#[tokio::test]
async fn remove_deletes_the_line() {
    let catalog = catalog_with_monstera();
    let store = MemoryCartStore::new();
    let service = CartService::new(&catalog, &store);

    service.add(PlantId::new(1), 1).await.unwrap();
    let cart = service.remove(PlantId::new(1)).await.unwrap();

    assert!(cart.is_empty());
    assert_eq!(store.stored().unwrap(), cart);
}

#[tokio::test]
async fn clear_empties_the_store() {
    let catalog = catalog_with_monstera();
    let store = MemoryCartStore::new();
    let service = CartService::new(&catalog, &store);

    service.add(PlantId::new(1), 3).await.unwrap();
    let cart = service.clear().await.unwrap();

    assert!(cart.is_empty());
    assert!(store.stored().is_none());
}

#[tokio::test]
async fn save_failure_surfaces_as_an_error() {
    let catalog = catalog_with_monstera();
    let store = MemoryCartStore::new();
    let service = CartService::new(&catalog, &store);

    store.fail_saves();
    let err = service.add(PlantId::new(1), 1).await.unwrap_err();

    assert!(matches!(err, CartServiceError::Repository(_)));
    assert!(store.stored().is_none());
}
