mod checkout;
mod manage_cart;
mod manage_catalog;
mod manage_order;
mod manage_review;
mod report;

use std::boxed::Box;
use std::sync::Arc;

use flower_delivery::notify::AbstractOrderNotifier;
use flower_delivery::repository::app_repo_product;
use flower_delivery::AppDataStoreContext;

use crate::model::ut_setup_products;
use crate::MockOrderNotifier;

pub(crate) async fn ut_seed_catalog(ds: Arc<AppDataStoreContext>) {
    let repo = app_repo_product(ds).await.unwrap();
    let _num = repo.save(ut_setup_products()).await.unwrap();
}

pub(crate) fn ut_mock_notifier(
    fail: bool,
) -> (
    Arc<Box<dyn AbstractOrderNotifier>>,
    Arc<std::sync::Mutex<Vec<(String, Option<String>)>>>,
) {
    let (mock, sent) = MockOrderNotifier::new(fail);
    let obj: Box<dyn AbstractOrderNotifier> = Box::new(mock);
    (Arc::new(obj), sent)
}
