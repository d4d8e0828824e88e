use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate};
use std::boxed::Box;
use std::result::Result as DefaultResult;
use std::sync::Arc;

use crate::error::{AppError, AppErrorCode};
use crate::model::{
    CartModel, OrderHistoryModel, OrderModel, OrderStatus, ProductModel, ProductReviewModel,
    SalesReportModel, ShopperId,
};
use crate::AppDataStoreContext;

mod in_mem;
// make in-memory repos visible for testing purpose
pub use in_mem::cart::CartInMemRepo;
pub use in_mem::history::OrderHistoryInMemRepo;
pub use in_mem::order::OrderInMemRepo;
pub use in_mem::product::ProductInMemRepo;
pub use in_mem::report::SalesReportInMemRepo;
pub use in_mem::review::ProductReviewInMemRepo;

#[cfg(feature = "mariadb")]
mod mariadb;

#[cfg(feature = "mariadb")]
use mariadb::cart::CartMariaDbRepo;
#[cfg(feature = "mariadb")]
use mariadb::history::OrderHistoryMariaDbRepo;
#[cfg(feature = "mariadb")]
use mariadb::order::OrderMariaDbRepo;
#[cfg(feature = "mariadb")]
use mariadb::product::ProductMariaDbRepo;
#[cfg(feature = "mariadb")]
use mariadb::report::SalesReportMariaDbRepo;
#[cfg(feature = "mariadb")]
use mariadb::review::ProductReviewMariaDbRepo;

// the repository instance may be used across an await,
// the future created by app callers has to be able to pass to different threads
// , it is the reason to add `Send` and `Sync` as super-traits
#[async_trait]
pub trait AbsProductRepo: Sync + Send {
    async fn save(&self, items: Vec<ProductModel>) -> DefaultResult<usize, AppError>;
    async fn fetch(&self, ids: Vec<u64>) -> DefaultResult<Vec<ProductModel>, AppError>;
    async fn fetch_all(&self) -> DefaultResult<Vec<ProductModel>, AppError>;
}

#[async_trait]
pub trait AbsCartRepo: Sync + Send {
    // returns the shopper's open cart, creating one when none exists or
    // the stored cart was closed by a previous checkout, two concurrent
    // calls never end up with two open carts
    async fn fetch_or_create(&self, owner: &ShopperId) -> DefaultResult<CartModel, AppError>;

    async fn update(&self, obj: CartModel) -> DefaultResult<usize, AppError>;

    // drops the given cart, the shopper may already have opened a newer
    // cart which must stay untouched
    async fn discard(&self, owner: &ShopperId, cart_id: &str) -> DefaultResult<(), AppError>;
}

#[async_trait]
pub trait AbsOrderRepo: Sync + Send {
    // fails with `DuplicateOrder` when another order already references
    // the same cart, the check and the insert happen atomically
    async fn create(&self, order: OrderModel) -> DefaultResult<(), AppError>;

    async fn exists_for_cart(&self, cart_id: &str) -> DefaultResult<bool, AppError>;

    async fn fetch(&self, order_id: &str) -> DefaultResult<OrderModel, AppError>;

    async fn update_status(
        &self,
        order_id: &str,
        status: OrderStatus,
    ) -> DefaultResult<(), AppError>;

    async fn fetch_by_created_time(
        &self,
        start: DateTime<FixedOffset>,
        end: DateTime<FixedOffset>,
    ) -> DefaultResult<Vec<OrderModel>, AppError>;
} // end of trait AbsOrderRepo

#[async_trait]
pub trait AbsOrderHistoryRepo: Sync + Send {
    // append-only, entries are never updated after checkout
    async fn create(&self, entries: Vec<OrderHistoryModel>) -> DefaultResult<usize, AppError>;

    /// entries of one account, most recent first
    async fn fetch_by_account(
        &self,
        account: u32,
    ) -> DefaultResult<Vec<OrderHistoryModel>, AppError>;

    async fn fetch_one(&self, entry_id: &str) -> DefaultResult<OrderHistoryModel, AppError>;
}

#[async_trait]
pub trait AbsProductReviewRepo: Sync + Send {
    // append-only, a submitted review is never edited
    async fn create(&self, entry: ProductReviewModel) -> DefaultResult<(), AppError>;

    /// reviews of one catalog item, most recent first
    async fn fetch_by_product(
        &self,
        product_id: u64,
    ) -> DefaultResult<Vec<ProductReviewModel>, AppError>;
}

#[async_trait]
pub trait AbsSalesReportRepo: Sync + Send {
    // replaces any previously stored report with the same date range
    async fn save(&self, report: SalesReportModel) -> DefaultResult<(), AppError>;

    async fn fetch(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> DefaultResult<Option<SalesReportModel>, AppError>;
}

pub async fn app_repo_product(
    ds: Arc<AppDataStoreContext>,
) -> DefaultResult<Box<dyn AbsProductRepo>, AppError> {
    #[cfg(feature = "mariadb")]
    if let Some(dbs) = ds.sql_dbs.as_ref() {
        let obj = ProductMariaDbRepo::new(dbs.clone())?;
        Ok(Box::new(obj))
    } else {
        Err(AppError {
            code: AppErrorCode::FeatureDisabled,
            detail: Some("mariadb".to_string()),
        })
    }
    #[cfg(not(feature = "mariadb"))]
    if let Some(m) = ds.in_mem.as_ref() {
        let obj = ProductInMemRepo::new(m.clone()).await?;
        Ok(Box::new(obj))
    } else {
        Err(AppError {
            code: AppErrorCode::MissingDataStore,
            detail: Some("unknown-type".to_string()),
        })
    }
}

pub async fn app_repo_cart(
    ds: Arc<AppDataStoreContext>,
) -> DefaultResult<Box<dyn AbsCartRepo>, AppError> {
    #[cfg(feature = "mariadb")]
    if let Some(dbs) = ds.sql_dbs.as_ref() {
        let obj = CartMariaDbRepo::new(dbs.clone())?;
        Ok(Box::new(obj))
    } else {
        Err(AppError {
            code: AppErrorCode::FeatureDisabled,
            detail: Some("mariadb".to_string()),
        })
    }
    #[cfg(not(feature = "mariadb"))]
    if let Some(m) = ds.in_mem.as_ref() {
        let obj = CartInMemRepo::new(m.clone()).await?;
        Ok(Box::new(obj))
    } else {
        Err(AppError {
            code: AppErrorCode::MissingDataStore,
            detail: Some("unknown-type".to_string()),
        })
    }
}

pub async fn app_repo_order(
    ds: Arc<AppDataStoreContext>,
) -> DefaultResult<Box<dyn AbsOrderRepo>, AppError> {
    #[cfg(feature = "mariadb")]
    if let Some(dbs) = ds.sql_dbs.as_ref() {
        let obj = OrderMariaDbRepo::new(dbs.clone())?;
        Ok(Box::new(obj))
    } else {
        Err(AppError {
            code: AppErrorCode::FeatureDisabled,
            detail: Some("mariadb".to_string()),
        })
    }
    #[cfg(not(feature = "mariadb"))]
    if let Some(m) = ds.in_mem.as_ref() {
        let obj = OrderInMemRepo::new(m.clone()).await?;
        Ok(Box::new(obj))
    } else {
        Err(AppError {
            code: AppErrorCode::MissingDataStore,
            detail: Some("unknown-type".to_string()),
        })
    }
}

pub async fn app_repo_order_history(
    ds: Arc<AppDataStoreContext>,
) -> DefaultResult<Box<dyn AbsOrderHistoryRepo>, AppError> {
    #[cfg(feature = "mariadb")]
    if let Some(dbs) = ds.sql_dbs.as_ref() {
        let obj = OrderHistoryMariaDbRepo::new(dbs.clone())?;
        Ok(Box::new(obj))
    } else {
        Err(AppError {
            code: AppErrorCode::FeatureDisabled,
            detail: Some("mariadb".to_string()),
        })
    }
    #[cfg(not(feature = "mariadb"))]
    if let Some(m) = ds.in_mem.as_ref() {
        let obj = OrderHistoryInMemRepo::new(m.clone()).await?;
        Ok(Box::new(obj))
    } else {
        Err(AppError {
            code: AppErrorCode::MissingDataStore,
            detail: Some("unknown-type".to_string()),
        })
    }
}

pub async fn app_repo_product_review(
    ds: Arc<AppDataStoreContext>,
) -> DefaultResult<Box<dyn AbsProductReviewRepo>, AppError> {
    #[cfg(feature = "mariadb")]
    if let Some(dbs) = ds.sql_dbs.as_ref() {
        let obj = ProductReviewMariaDbRepo::new(dbs.clone())?;
        Ok(Box::new(obj))
    } else {
        Err(AppError {
            code: AppErrorCode::FeatureDisabled,
            detail: Some("mariadb".to_string()),
        })
    }
    #[cfg(not(feature = "mariadb"))]
    if let Some(m) = ds.in_mem.as_ref() {
        let obj = ProductReviewInMemRepo::new(m.clone()).await?;
        Ok(Box::new(obj))
    } else {
        Err(AppError {
            code: AppErrorCode::MissingDataStore,
            detail: Some("unknown-type".to_string()),
        })
    }
}

pub async fn app_repo_sales_report(
    ds: Arc<AppDataStoreContext>,
) -> DefaultResult<Box<dyn AbsSalesReportRepo>, AppError> {
    #[cfg(feature = "mariadb")]
    if let Some(dbs) = ds.sql_dbs.as_ref() {
        let obj = SalesReportMariaDbRepo::new(dbs.clone())?;
        Ok(Box::new(obj))
    } else {
        Err(AppError {
            code: AppErrorCode::FeatureDisabled,
            detail: Some("mariadb".to_string()),
        })
    }
    #[cfg(not(feature = "mariadb"))]
    if let Some(m) = ds.in_mem.as_ref() {
        let obj = SalesReportInMemRepo::new(m.clone()).await?;
        Ok(Box::new(obj))
    } else {
        Err(AppError {
            code: AppErrorCode::MissingDataStore,
            detail: Some("unknown-type".to_string()),
        })
    }
}
