use flower_delivery::model::ShopperId;
use flower_delivery::repository::{AbsCartRepo, CartInMemRepo};

use crate::model::ut_setup_products;

use super::ut_inmem_datastore;

#[tokio::test]
async fn fetch_or_create_reuses_open_cart() {
    let ds = ut_inmem_datastore();
    let repo = CartInMemRepo::new(ds).await.unwrap();
    let owner = ShopperId::Authenticated(126);
    let cart1 = repo.fetch_or_create(&owner).await.unwrap();
    assert!(cart1.saved_lines.is_empty());
    assert!(!cart1.closed);
    let cart2 = repo.fetch_or_create(&owner).await.unwrap();
    assert_eq!(cart1.id_, cart2.id_);
    // another shopper never sees this cart
    let other = ShopperId::Guest("sess-beef1234".to_string());
    let cart3 = repo.fetch_or_create(&other).await.unwrap();
    assert_ne!(cart1.id_, cart3.id_);
}

#[tokio::test]
async fn closed_cart_replaced_on_next_fetch() {
    let ds = ut_inmem_datastore();
    let repo = CartInMemRepo::new(ds).await.unwrap();
    let owner = ShopperId::Authenticated(126);
    let mut cart = repo.fetch_or_create(&owner).await.unwrap();
    let old_id = cart.id_.clone();
    cart.closed = true;
    let _num = repo.update(cart).await.unwrap();
    let fresh = repo.fetch_or_create(&owner).await.unwrap();
    assert_ne!(fresh.id_, old_id);
    assert!(!fresh.closed);
}

#[tokio::test]
async fn update_persists_and_drops_stale_lines() {
    let ds = ut_inmem_datastore();
    let repo = CartInMemRepo::new(ds).await.unwrap();
    let products = ut_setup_products();
    let owner = ShopperId::Authenticated(126);
    let mut cart = repo.fetch_or_create(&owner).await.unwrap();
    cart.add_line(&products[0], 2);
    cart.add_line(&products[1], 1);
    let _num = repo.update(cart).await.unwrap();
    let mut cart = repo.fetch_or_create(&owner).await.unwrap();
    assert_eq!(cart.saved_lines.len(), 2);
    assert!(cart.remove_line(products[0].id_));
    let _num = repo.update(cart).await.unwrap();
    let cart = repo.fetch_or_create(&owner).await.unwrap();
    assert_eq!(cart.saved_lines.len(), 1);
    assert_eq!(cart.saved_lines[0].product_id, products[1].id_);
}

#[tokio::test]
async fn discard_keeps_newer_cart() {
    let ds = ut_inmem_datastore();
    let repo = CartInMemRepo::new(ds).await.unwrap();
    let products = ut_setup_products();
    let owner = ShopperId::Authenticated(126);
    let mut cart = repo.fetch_or_create(&owner).await.unwrap();
    let old_id = cart.id_.clone();
    cart.closed = true;
    let _num = repo.update(cart).await.unwrap();
    // the shopper already moved on to a new open cart
    let mut newer = repo.fetch_or_create(&owner).await.unwrap();
    newer.add_line(&products[2], 1);
    let newer_id = newer.id_.clone();
    let _num = repo.update(newer).await.unwrap();
    repo.discard(&owner, old_id.as_str()).await.unwrap();
    let kept = repo.fetch_or_create(&owner).await.unwrap();
    assert_eq!(kept.id_, newer_id);
    assert_eq!(kept.saved_lines.len(), 1);
}

#[tokio::test]
async fn discard_current_cart() {
    let ds = ut_inmem_datastore();
    let repo = CartInMemRepo::new(ds).await.unwrap();
    let owner = ShopperId::Authenticated(126);
    let cart = repo.fetch_or_create(&owner).await.unwrap();
    let cart_id = cart.id_.clone();
    repo.discard(&owner, cart_id.as_str()).await.unwrap();
    let fresh = repo.fetch_or_create(&owner).await.unwrap();
    assert_ne!(fresh.id_, cart_id);
}
