use std::result::Result as DefaultResult;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use flower_delivery::api::web::dto::{OrderCreateErrorReason, OrderCreateReqDto};
use flower_delivery::error::AppError;
use flower_delivery::model::{CartModel, OrderStatus, ShopperId};
use flower_delivery::notify::AbstractOrderNotifier;
use flower_delivery::repository::{
    app_repo_cart, app_repo_order, app_repo_order_history, app_repo_product, AbsCartRepo,
};
use flower_delivery::usecase::{
    CheckoutCartUseCase, CheckoutUsKsResult, RepeatOrderUseCase, RepeatOrderUsKsResult,
};
use flower_delivery::AppSharedState;

use crate::model::ut_setup_products;
use crate::ut_setup_share_state;

use super::{ut_mock_notifier, ut_seed_catalog};

fn ut_checkout_req() -> OrderCreateReqDto {
    OrderCreateReqDto {
        delivery_date: "2023-11-24".to_string(),
        delivery_time: "14:30".to_string(),
        address: "5 Rue du Marche".to_string(),
        comment: Some("ring the bell twice".to_string()),
        contact: None,
    }
}

async fn ut_checkout_uc(
    shr_state: &AppSharedState,
    notifier: Arc<Box<dyn AbstractOrderNotifier>>,
    shopper: ShopperId,
) -> CheckoutCartUseCase {
    CheckoutCartUseCase {
        cart_repo: app_repo_cart(shr_state.datastore()).await.unwrap(),
        product_repo: app_repo_product(shr_state.datastore()).await.unwrap(),
        order_repo: app_repo_order(shr_state.datastore()).await.unwrap(),
        history_repo: app_repo_order_history(shr_state.datastore()).await.unwrap(),
        notifier,
        log_ctx: shr_state.log_context().clone(),
        shopper,
    }
}

async fn ut_fill_cart(shr_state: &AppSharedState, shopper: &ShopperId) -> String {
    let products = ut_setup_products();
    let repo = app_repo_cart(shr_state.datastore()).await.unwrap();
    let mut cart = repo.fetch_or_create(shopper).await.unwrap();
    let cart_id = cart.id_.clone();
    cart.add_line(&products[0], 2);
    cart.add_line(&products[1], 1);
    let _num = repo.update(cart).await.unwrap();
    cart_id
}

#[tokio::test]
async fn checkout_success_notifies_and_records() {
    let shr_state = ut_setup_share_state();
    ut_seed_catalog(shr_state.datastore()).await;
    let shopper = ShopperId::Authenticated(126);
    let old_cart_id = ut_fill_cart(&shr_state, &shopper).await;
    let (notifier, sent) = ut_mock_notifier(false);
    let uc = ut_checkout_uc(&shr_state, notifier, shopper.clone()).await;
    let result = uc.execute(ut_checkout_req()).await;
    let reply = if let CheckoutUsKsResult::Success(r) = result {
        r
    } else {
        panic!("checkout failed");
    };
    assert_eq!(reply.status.as_str(), "pending");
    assert_eq!(reply.lines.len(), 2);
    assert_eq!(reply.total_price.as_str(), "78.48");
    assert!(reply.notified);
    {
        let guard = sent.lock().unwrap();
        assert_eq!(guard.len(), 1);
        let (caption, image_ref) = &guard[0];
        assert!(caption.contains("rose bouquet x 2"));
        assert!(caption.contains("Comment: ring the bell twice"));
        assert_eq!(image_ref.as_deref(), Some("img/rose.jpg"));
    }
    // the checked-out cart is closed, the shopper gets a fresh one
    let cart_repo = app_repo_cart(shr_state.datastore()).await.unwrap();
    let fresh = cart_repo.fetch_or_create(&shopper).await.unwrap();
    assert_ne!(fresh.id_, old_cart_id);
    assert!(fresh.saved_lines.is_empty());
    // one history entry per order line
    let history_repo = app_repo_order_history(shr_state.datastore()).await.unwrap();
    let entries = history_repo.fetch_by_account(126).await.unwrap();
    assert_eq!(entries.len(), 2);
} // end of fn checkout_success_notifies_and_records

#[tokio::test]
async fn checkout_empty_cart_rejected() {
    let shr_state = ut_setup_share_state();
    ut_seed_catalog(shr_state.datastore()).await;
    let (notifier, sent) = ut_mock_notifier(false);
    let uc = ut_checkout_uc(&shr_state, notifier, ShopperId::Authenticated(126)).await;
    let result = uc.execute(ut_checkout_req()).await;
    if let CheckoutUsKsResult::ValidationFailure(e) = result {
        assert!(matches!(e.nonfield, Some(OrderCreateErrorReason::EmptyCart)));
    } else {
        panic!("empty cart was accepted");
    }
    assert!(sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn checkout_malformed_delivery_rejected() {
    let shr_state = ut_setup_share_state();
    ut_seed_catalog(shr_state.datastore()).await;
    let shopper = ShopperId::Authenticated(126);
    let _cart_id = ut_fill_cart(&shr_state, &shopper).await;
    let (notifier, sent) = ut_mock_notifier(false);
    let uc = ut_checkout_uc(&shr_state, notifier, shopper).await;
    let mut data = ut_checkout_req();
    data.delivery_date = "24/11/2023".to_string();
    let result = uc.execute(data).await;
    if let CheckoutUsKsResult::ValidationFailure(e) = result {
        assert!(e.delivery_date.is_some());
        assert!(e.nonfield.is_none());
    } else {
        panic!("malformed delivery date was accepted");
    }
    assert!(sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn checkout_empty_cart_reported_before_bad_input() {
    let shr_state = ut_setup_share_state();
    ut_seed_catalog(shr_state.datastore()).await;
    let (notifier, sent) = ut_mock_notifier(false);
    let uc = ut_checkout_uc(&shr_state, notifier, ShopperId::Authenticated(126)).await;
    // nothing in the cart AND a malformed delivery date, the empty
    // cart has to be the reported failure
    let mut data = ut_checkout_req();
    data.delivery_date = "24/11/2023".to_string();
    let result = uc.execute(data).await;
    if let CheckoutUsKsResult::ValidationFailure(e) = result {
        assert!(matches!(e.nonfield, Some(OrderCreateErrorReason::EmptyCart)));
        assert!(e.delivery_date.is_none());
    } else {
        panic!("empty cart was accepted");
    }
    assert!(sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn checkout_concurrent_duplicate() {
    let shr_state = ut_setup_share_state();
    ut_seed_catalog(shr_state.datastore()).await;
    let shopper = ShopperId::Authenticated(126);
    let _cart_id = ut_fill_cart(&shr_state, &shopper).await;
    let (notifier, sent) = ut_mock_notifier(false);
    let uc0 = ut_checkout_uc(&shr_state, notifier.clone(), shopper.clone()).await;
    let uc1 = ut_checkout_uc(&shr_state, notifier, shopper).await;
    let h0 = tokio::spawn(uc0.execute(ut_checkout_req()));
    let h1 = tokio::spawn(uc1.execute(ut_checkout_req()));
    let results = [h0.await.unwrap(), h1.await.unwrap()];
    let num_created = results
        .iter()
        .filter(|r| matches!(r, CheckoutUsKsResult::Success(_)))
        .count();
    // the loser observes either the taken cart or the fresh empty one
    // left behind by the winner, both are validation failures
    let num_rejected = results
        .iter()
        .filter(|r| matches!(r, CheckoutUsKsResult::ValidationFailure(_)))
        .count();
    assert_eq!(num_created, 1);
    assert_eq!(num_rejected, 1);
    assert_eq!(sent.lock().unwrap().len(), 1);
} // end of fn checkout_concurrent_duplicate

#[tokio::test]
async fn checkout_cart_already_ordered() {
    let shr_state = ut_setup_share_state();
    ut_seed_catalog(shr_state.datastore()).await;
    let shopper = ShopperId::Authenticated(126);
    let cart_id = ut_fill_cart(&shr_state, &shopper).await;
    // another order already took this cart
    let mut taken = crate::model::order::ut_setup_order(shopper.clone(), None);
    taken.cart_id = cart_id;
    let order_repo = app_repo_order(shr_state.datastore()).await.unwrap();
    order_repo.create(taken).await.unwrap();
    let (notifier, sent) = ut_mock_notifier(false);
    let uc = ut_checkout_uc(&shr_state, notifier, shopper).await;
    let result = uc.execute(ut_checkout_req()).await;
    if let CheckoutUsKsResult::ValidationFailure(e) = result {
        assert!(matches!(
            e.nonfield,
            Some(OrderCreateErrorReason::DuplicateOrder)
        ));
    } else {
        panic!("second order on one cart was accepted");
    }
    assert!(sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn checkout_survives_notifier_outage() {
    let shr_state = ut_setup_share_state();
    ut_seed_catalog(shr_state.datastore()).await;
    let shopper = ShopperId::Guest("sess-beef1234".to_string());
    let _cart_id = ut_fill_cart(&shr_state, &shopper).await;
    let (notifier, _sent) = ut_mock_notifier(true);
    let uc = ut_checkout_uc(&shr_state, notifier, shopper).await;
    let result = uc.execute(ut_checkout_req()).await;
    let reply = if let CheckoutUsKsResult::Success(r) = result {
        r
    } else {
        panic!("checkout aborted on notifier outage");
    };
    assert!(!reply.notified);
    let order_repo = app_repo_order(shr_state.datastore()).await.unwrap();
    let saved = order_repo.fetch(reply.order_id.as_str()).await.unwrap();
    assert_eq!(saved.status, OrderStatus::Pending);
}

#[tokio::test]
async fn repeat_order_charges_recorded_price() {
    let shr_state = ut_setup_share_state();
    ut_seed_catalog(shr_state.datastore()).await;
    let shopper = ShopperId::Authenticated(126);
    let _cart_id = ut_fill_cart(&shr_state, &shopper).await;
    let (notifier, _sent) = ut_mock_notifier(false);
    let uc = ut_checkout_uc(&shr_state, notifier.clone(), shopper.clone()).await;
    let _result = uc.execute(ut_checkout_req()).await;
    let history_repo = app_repo_order_history(shr_state.datastore()).await.unwrap();
    let entries = history_repo.fetch_by_account(126).await.unwrap();
    let entry = entries.iter().find(|e| e.product_id == 140).unwrap();
    let uc = RepeatOrderUseCase {
        cart_repo: app_repo_cart(shr_state.datastore()).await.unwrap(),
        product_repo: app_repo_product(shr_state.datastore()).await.unwrap(),
        order_repo: app_repo_order(shr_state.datastore()).await.unwrap(),
        history_repo: app_repo_order_history(shr_state.datastore()).await.unwrap(),
        notifier,
        log_ctx: shr_state.log_context().clone(),
        shopper,
    };
    let result = uc.execute(entry.id_.as_str()).await;
    let reply = if let RepeatOrderUsKsResult::Success(r) = result {
        r
    } else {
        panic!("repeat order failed");
    };
    assert_eq!(reply.lines.len(), 1);
    assert_eq!(reply.lines[0].product_id, 140);
    assert_eq!(reply.lines[0].quantity, 2);
    assert_eq!(reply.lines[0].unit_price.as_str(), "29.99");
    assert_eq!(reply.total_price.as_str(), "59.98");
} // end of fn repeat_order_charges_recorded_price

#[tokio::test]
async fn repeat_order_unknown_entry() {
    let shr_state = ut_setup_share_state();
    ut_seed_catalog(shr_state.datastore()).await;
    let (notifier, _sent) = ut_mock_notifier(false);
    let uc = RepeatOrderUseCase {
        cart_repo: app_repo_cart(shr_state.datastore()).await.unwrap(),
        product_repo: app_repo_product(shr_state.datastore()).await.unwrap(),
        order_repo: app_repo_order(shr_state.datastore()).await.unwrap(),
        history_repo: app_repo_order_history(shr_state.datastore()).await.unwrap(),
        notifier,
        log_ctx: shr_state.log_context().clone(),
        shopper: ShopperId::Authenticated(126),
    };
    let result = uc.execute("deadbeef00000000deadbeef00000000").await;
    assert!(matches!(result, RepeatOrderUsKsResult::NotFound));
}

// hands out the shopper's real cart once, every later fetch sees it
// already emptied by another actor
struct UtRacyCartRepo {
    inner: Box<dyn AbsCartRepo>,
    num_fetches: AtomicUsize,
}

#[async_trait]
impl AbsCartRepo for UtRacyCartRepo {
    async fn fetch_or_create(&self, owner: &ShopperId) -> DefaultResult<CartModel, AppError> {
        let mut cart = self.inner.fetch_or_create(owner).await?;
        if self.num_fetches.fetch_add(1, Ordering::SeqCst) > 0 {
            cart.saved_lines.clear();
        }
        Ok(cart)
    }
    async fn update(&self, obj: CartModel) -> DefaultResult<usize, AppError> {
        self.inner.update(obj).await
    }
    async fn discard(&self, owner: &ShopperId, cart_id: &str) -> DefaultResult<(), AppError> {
        self.inner.discard(owner, cart_id).await
    }
} // end of impl AbsCartRepo for UtRacyCartRepo

#[tokio::test]
async fn repeat_order_cart_taken_by_concurrent_checkout() {
    let shr_state = ut_setup_share_state();
    ut_seed_catalog(shr_state.datastore()).await;
    let shopper = ShopperId::Authenticated(126);
    let _cart_id = ut_fill_cart(&shr_state, &shopper).await;
    let (notifier, sent) = ut_mock_notifier(false);
    let uc = ut_checkout_uc(&shr_state, notifier.clone(), shopper.clone()).await;
    let _result = uc.execute(ut_checkout_req()).await;
    let history_repo = app_repo_order_history(shr_state.datastore()).await.unwrap();
    let entries = history_repo.fetch_by_account(126).await.unwrap();
    let num_recorded = entries.len();
    let entry = entries.iter().find(|e| e.product_id == 140).unwrap();
    sent.lock().unwrap().clear();
    let racy_cart_repo: Box<dyn AbsCartRepo> = Box::new(UtRacyCartRepo {
        inner: app_repo_cart(shr_state.datastore()).await.unwrap(),
        num_fetches: AtomicUsize::new(0),
    });
    let uc = RepeatOrderUseCase {
        cart_repo: racy_cart_repo,
        product_repo: app_repo_product(shr_state.datastore()).await.unwrap(),
        order_repo: app_repo_order(shr_state.datastore()).await.unwrap(),
        history_repo: app_repo_order_history(shr_state.datastore()).await.unwrap(),
        notifier,
        log_ctx: shr_state.log_context().clone(),
        shopper,
    };
    let result = uc.execute(entry.id_.as_str()).await;
    assert!(matches!(result, RepeatOrderUsKsResult::ServerError(_)));
    // no zero-line order was written, the records stay as they were
    let entries = history_repo.fetch_by_account(126).await.unwrap();
    assert_eq!(entries.len(), num_recorded);
    assert!(sent.lock().unwrap().is_empty());
} // end of fn repeat_order_cart_taken_by_concurrent_checkout
