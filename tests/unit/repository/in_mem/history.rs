use chrono::DateTime;
use rust_decimal::Decimal;

use flower_delivery::constant::app_meta;
use flower_delivery::error::AppErrorCode;
use flower_delivery::model::{OrderHistoryModel, ShopperId};
use flower_delivery::repository::{AbsOrderHistoryRepo, OrderHistoryInMemRepo};

use crate::model::order::ut_setup_order;

use super::ut_inmem_datastore;

#[tokio::test]
async fn create_and_fetch_one() {
    let ds = ut_inmem_datastore();
    let repo = OrderHistoryInMemRepo::new(ds).await.unwrap();
    let order = ut_setup_order(
        ShopperId::Authenticated(126),
        Some("no lilies please".to_string()),
    );
    let entries = OrderHistoryModel::from_order(&order);
    assert_eq!(entries.len(), 2);
    let entry_id = entries[0].id_.clone();
    let expect_cost = entries[0].cost;
    let num = repo.create(entries).await.unwrap();
    assert_eq!(num, 2);
    let saved = repo.fetch_one(entry_id.as_str()).await.unwrap();
    assert_eq!(saved.account, 126);
    assert_eq!(saved.cost, expect_cost);
    assert_eq!(saved.comment.as_deref(), Some("no lilies please"));
    assert_eq!(saved.completed_at, order.create_time);
}

#[tokio::test]
async fn fetch_by_account_recent_first() {
    let ds = ut_inmem_datastore();
    let repo = OrderHistoryInMemRepo::new(ds).await.unwrap();
    let mut older = ut_setup_order(ShopperId::Authenticated(126), None);
    older.create_time = DateTime::parse_from_rfc3339("2023-11-10T09:00:00+02:00").unwrap();
    let mut newer = ut_setup_order(ShopperId::Authenticated(126), None);
    newer.create_time = DateTime::parse_from_rfc3339("2023-11-21T09:12:00+02:00").unwrap();
    let unrelated = ut_setup_order(ShopperId::Authenticated(127), None);
    for o in [&older, &newer, &unrelated] {
        let _num = repo.create(OrderHistoryModel::from_order(o)).await.unwrap();
    }
    let entries = repo.fetch_by_account(126).await.unwrap();
    assert_eq!(entries.len(), 4);
    assert!(entries.iter().all(|e| e.account == 126));
    assert_eq!(entries[0].completed_at, newer.create_time);
    assert_eq!(entries[3].completed_at, older.create_time);
}

#[tokio::test]
async fn guest_entries_land_on_shared_account() {
    let ds = ut_inmem_datastore();
    let repo = OrderHistoryInMemRepo::new(ds).await.unwrap();
    let order = ut_setup_order(ShopperId::Guest("sess-beef1234".to_string()), None);
    let _num = repo
        .create(OrderHistoryModel::from_order(&order))
        .await
        .unwrap();
    let entries = repo.fetch_by_account(app_meta::GUEST_ACCOUNT).await.unwrap();
    assert_eq!(entries.len(), 2);
    let total = entries.iter().map(|e| e.cost).sum::<Decimal>();
    assert_eq!(total, order.total_price());
}

#[tokio::test]
async fn fetch_one_unknown_entry() {
    let ds = ut_inmem_datastore();
    let repo = OrderHistoryInMemRepo::new(ds).await.unwrap();
    let result = repo.fetch_one("deadbeef00000000deadbeef00000000").await;
    assert!(result.is_err());
    assert_eq!(result.err().unwrap().code, AppErrorCode::ObjectNotExist);
}
