use flower_delivery::api::web::dto::{OrderStatusTransitReqDto, PaymentNoticeReqDto};
use flower_delivery::model::{OrderHistoryModel, OrderStatus, ShopperId};
use flower_delivery::repository::{app_repo_cart, app_repo_order, app_repo_order_history};
use flower_delivery::usecase::{
    PaymentNoticeUseCase, PaymentNoticeUsKsResult, RetrieveOrderHistoryUseCase,
    RetrieveOrderHistoryUsKsResult, TransitOrderStatusUseCase, TransitOrderStatusUsKsResult,
};
use flower_delivery::AppSharedState;

use crate::model::order::ut_setup_order;
use crate::ut_setup_share_state;

async fn ut_transit_uc(shr_state: &AppSharedState) -> TransitOrderStatusUseCase {
    TransitOrderStatusUseCase {
        repo: app_repo_order(shr_state.datastore()).await.unwrap(),
        log_ctx: shr_state.log_context().clone(),
    }
}

async fn ut_payment_uc(shr_state: &AppSharedState) -> PaymentNoticeUseCase {
    PaymentNoticeUseCase {
        order_repo: app_repo_order(shr_state.datastore()).await.unwrap(),
        cart_repo: app_repo_cart(shr_state.datastore()).await.unwrap(),
        log_ctx: shr_state.log_context().clone(),
    }
}

async fn ut_persist_order(shr_state: &AppSharedState, owner: ShopperId) -> String {
    let order = ut_setup_order(owner, None);
    let oid = order.id_.clone();
    let repo = app_repo_order(shr_state.datastore()).await.unwrap();
    repo.create(order).await.unwrap();
    oid
}

#[tokio::test]
async fn transit_confirm_persisted() {
    let shr_state = ut_setup_share_state();
    let oid = ut_persist_order(&shr_state, ShopperId::Authenticated(126)).await;
    let uc = ut_transit_uc(&shr_state).await;
    let data = OrderStatusTransitReqDto {
        event: "confirm".to_string(),
    };
    let result = uc.execute(oid.as_str(), data).await;
    if let TransitOrderStatusUsKsResult::Success(resp) = result {
        assert_eq!(resp.order_id, oid);
        assert_eq!(resp.status.as_str(), "confirmed");
    } else {
        panic!("status transition failed");
    }
    let repo = app_repo_order(shr_state.datastore()).await.unwrap();
    let saved = repo.fetch(oid.as_str()).await.unwrap();
    assert_eq!(saved.status, OrderStatus::Confirmed);
}

#[tokio::test]
async fn transit_unknown_event() {
    let shr_state = ut_setup_share_state();
    let oid = ut_persist_order(&shr_state, ShopperId::Authenticated(126)).await;
    let uc = ut_transit_uc(&shr_state).await;
    let data = OrderStatusTransitReqDto {
        event: "ship".to_string(),
    };
    let result = uc.execute(oid.as_str(), data).await;
    assert!(matches!(result, TransitOrderStatusUsKsResult::InvalidEvent));
}

#[tokio::test]
async fn transit_unknown_order() {
    let shr_state = ut_setup_share_state();
    // table exists but the row does not
    let _oid = ut_persist_order(&shr_state, ShopperId::Authenticated(126)).await;
    let uc = ut_transit_uc(&shr_state).await;
    let data = OrderStatusTransitReqDto {
        event: "confirm".to_string(),
    };
    let result = uc
        .execute("deadbeef00000000deadbeef00000000", data)
        .await;
    assert!(matches!(result, TransitOrderStatusUsKsResult::NotFound));
}

#[tokio::test]
async fn transit_rejected_from_delivered() {
    let shr_state = ut_setup_share_state();
    let oid = ut_persist_order(&shr_state, ShopperId::Authenticated(126)).await;
    let repo = app_repo_order(shr_state.datastore()).await.unwrap();
    repo.update_status(oid.as_str(), OrderStatus::Delivered)
        .await
        .unwrap();
    let uc = ut_transit_uc(&shr_state).await;
    let data = OrderStatusTransitReqDto {
        event: "confirm".to_string(),
    };
    let result = uc.execute(oid.as_str(), data).await;
    if let TransitOrderStatusUsKsResult::InvalidTransition(detail) = result {
        assert!(detail.contains("delivered"));
    } else {
        panic!("transition out of delivered was accepted");
    }
    let saved = repo.fetch(oid.as_str()).await.unwrap();
    assert_eq!(saved.status, OrderStatus::Delivered);
}

#[tokio::test]
async fn payment_success_confirms_and_discards_cart() {
    let shr_state = ut_setup_share_state();
    let shopper = ShopperId::Authenticated(126);
    let cart_repo = app_repo_cart(shr_state.datastore()).await.unwrap();
    let cart = cart_repo.fetch_or_create(&shopper).await.unwrap();
    let mut order = ut_setup_order(shopper.clone(), None);
    order.cart_id = cart.id_.clone();
    let oid = order.id_.clone();
    let order_repo = app_repo_order(shr_state.datastore()).await.unwrap();
    order_repo.create(order).await.unwrap();
    let uc = ut_payment_uc(&shr_state).await;
    let result = uc
        .execute(oid.as_str(), PaymentNoticeReqDto { succeeded: true })
        .await;
    if let PaymentNoticeUsKsResult::Success(resp) = result {
        assert_eq!(resp.status.as_str(), "confirmed");
    } else {
        panic!("payment confirmation failed");
    }
    let saved = order_repo.fetch(oid.as_str()).await.unwrap();
    assert_eq!(saved.status, OrderStatus::Confirmed);
    let fresh = cart_repo.fetch_or_create(&shopper).await.unwrap();
    assert_ne!(fresh.id_, cart.id_);
} // end of fn payment_success_confirms_and_discards_cart

#[tokio::test]
async fn payment_failure_keeps_pending() {
    let shr_state = ut_setup_share_state();
    let oid = ut_persist_order(&shr_state, ShopperId::Authenticated(126)).await;
    let uc = ut_payment_uc(&shr_state).await;
    let result = uc
        .execute(oid.as_str(), PaymentNoticeReqDto { succeeded: false })
        .await;
    if let PaymentNoticeUsKsResult::Success(resp) = result {
        assert_eq!(resp.status.as_str(), "pending");
    } else {
        panic!("failed payment was not acknowledged");
    }
    let repo = app_repo_order(shr_state.datastore()).await.unwrap();
    let saved = repo.fetch(oid.as_str()).await.unwrap();
    assert_eq!(saved.status, OrderStatus::Pending);
}

#[tokio::test]
async fn history_scoped_to_one_account() {
    let shr_state = ut_setup_share_state();
    let repo = app_repo_order_history(shr_state.datastore()).await.unwrap();
    let mine = ut_setup_order(ShopperId::Authenticated(126), None);
    let other = ut_setup_order(ShopperId::Authenticated(127), None);
    for o in [&mine, &other] {
        let _num = repo.create(OrderHistoryModel::from_order(o)).await.unwrap();
    }
    let uc = RetrieveOrderHistoryUseCase {
        repo: app_repo_order_history(shr_state.datastore()).await.unwrap(),
        account: 126,
    };
    let result = uc.execute().await;
    if let RetrieveOrderHistoryUsKsResult::Success(entries) = result {
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|e| e.cost.parse::<f64>().is_ok()));
        let names = entries
            .iter()
            .map(|e| e.product_name.as_str())
            .collect::<Vec<_>>();
        assert!(names.contains(&"rose bouquet"));
        assert!(names.contains(&"tulip bouquet"));
    } else {
        panic!("history retrieval failed");
    }
}
