//! Cart behavior through the service layer over the memory adapter.

mod common;

use aurum_commerce::Error;
use common::{bangle, harness, pendant, OWNER};

#[tokio::test]
async fn repeated_add_replaces_quantity() {
    let h = harness();
    h.cart.add_item(OWNER, pendant(2)).await.unwrap();
    let items = h.cart.add_item(OWNER, pendant(5)).await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].quantity, 5); // replaced, not summed
}

#[tokio::test]
async fn distinct_products_coexist() {
    let h = harness();
    h.cart.add_item(OWNER, pendant(1)).await.unwrap();
    let items = h.cart.add_item(OWNER, bangle(2)).await.unwrap();
    assert_eq!(items.len(), 2);
}

#[tokio::test]
async fn quantity_zero_removes_item() {
    let h = harness();
    h.cart.add_item(OWNER, pendant(3)).await.unwrap();
    let items = h.cart.set_quantity(OWNER, "42", 0).await.unwrap();
    assert!(items.is_empty());
}

#[tokio::test]
async fn set_quantity_requires_existing_item() {
    let h = harness();
    h.cart.add_item(OWNER, pendant(1)).await.unwrap();
    let err = h.cart.set_quantity(OWNER, "no-such", 2).await.unwrap_err();
    assert!(matches!(err, Error::ItemNotFound { .. }));
}

#[tokio::test]
async fn remove_is_idempotent() {
    let h = harness();
    h.cart.add_item(OWNER, pendant(1)).await.unwrap();
    h.cart.remove_item(OWNER, "42").await.unwrap();
    let items = h.cart.remove_item(OWNER, "42").await.unwrap();
    assert!(items.is_empty());
}

#[tokio::test]
async fn owner_must_be_an_email() {
    let h = harness();
    let err = h.cart.get("not-an-email").await.unwrap_err();
    assert!(matches!(err, Error::InvalidOwner));
    let err = h.cart.add_item("", pendant(1)).await.unwrap_err();
    assert!(matches!(err, Error::InvalidOwner));
}

#[tokio::test]
async fn add_rejects_non_positive_quantity_and_price() {
    let h = harness();
    assert!(matches!(
        h.cart.add_item(OWNER, pendant(0)).await.unwrap_err(),
        Error::InvalidQuantity
    ));
    let mut freebie = pendant(1);
    freebie.unit_price = 0;
    assert!(matches!(
        h.cart.add_item(OWNER, freebie).await.unwrap_err(),
        Error::InvalidPrice
    ));
    assert!(h.cart.get(OWNER).await.unwrap().is_empty());
}

#[tokio::test]
async fn add_rejects_prices_and_quantities_beyond_caps() {
    let h = harness();
    let mut heist = pendant(1);
    heist.unit_price = i64::MAX / 2;
    assert!(matches!(
        h.cart.add_item(OWNER, heist).await.unwrap_err(),
        Error::InvalidPrice
    ));
    let hoard = pendant(10_001);
    assert!(matches!(
        h.cart.add_item(OWNER, hoard).await.unwrap_err(),
        Error::InvalidQuantity
    ));
    h.cart.add_item(OWNER, pendant(1)).await.unwrap();
    assert!(matches!(
        h.cart.set_quantity(OWNER, "42", 10_001).await.unwrap_err(),
        Error::InvalidQuantity
    ));
}

#[tokio::test]
async fn owner_email_is_case_insensitive() {
    let h = harness();
    h.cart.add_item("Meera@Example.COM", pendant(2)).await.unwrap();
    let cart = h.cart.get(OWNER).await.unwrap();
    assert_eq!(cart.items.len(), 1);
}

#[tokio::test]
async fn clear_empties_but_keeps_the_cart() {
    let h = harness();
    h.cart.add_item(OWNER, pendant(2)).await.unwrap();
    h.cart.clear(OWNER).await.unwrap();
    let cart = h.cart.get(OWNER).await.unwrap();
    assert!(cart.is_empty());
}

#[tokio::test]
async fn carts_are_isolated_per_owner() {
    let h = harness();
    h.cart.add_item(OWNER, pendant(1)).await.unwrap();
    let other = h.cart.get("asha@example.com").await.unwrap();
    assert!(other.is_empty());
}
