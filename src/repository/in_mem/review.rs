use std::boxed::Box;
use std::collections::HashMap;
use std::result::Result as DefaultResult;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::DateTime;

use crate::datastore::{
    AbsDStoreFilterKeyOp, AbstInMemoryDStore, AppInMemFetchKeys, AppInMemFetchedSingleRow,
};
use crate::error::{AppError, AppErrorCode};
use crate::model::ProductReviewModel;
use crate::repository::AbsProductReviewRepo;

use super::{decode_column, decode_opt_column, encode_opt_column};

#[allow(non_snake_case)]
mod ReviewTable {
    use super::{AppInMemFetchedSingleRow, ProductReviewModel};
    pub(super) const LABEL: &'static str = "product_review";

    pub(super) fn to_row(obj: &ProductReviewModel) -> AppInMemFetchedSingleRow {
        vec![
            obj.product_id.to_string(),
            obj.account.to_string(),
            obj.rating.to_string(),
            super::encode_opt_column(&obj.comment),
            obj.create_time.to_rfc3339(),
        ]
    }
} // end of inner-mod ReviewTable

struct ReviewsOfProductOp {
    product_id: String,
}
impl AbsDStoreFilterKeyOp for ReviewsOfProductOp {
    fn filter(&self, _k: &String, v: &Vec<String>) -> bool {
        v.first()
            .map(|p| p == self.product_id.as_str())
            .unwrap_or(false)
    }
}

impl TryFrom<(String, Vec<String>)> for ProductReviewModel {
    type Error = AppError;
    fn try_from(value: (String, Vec<String>)) -> DefaultResult<Self, Self::Error> {
        let (key, row) = value;
        let create_time =
            DateTime::parse_from_rfc3339(row.get(4).map(String::as_str).unwrap_or(""))
                .map_err(|e| AppError {
                    code: AppErrorCode::DataCorruption,
                    detail: Some(format!("review-create-time:{e}")),
                })?;
        Ok(Self {
            id_: key,
            product_id: decode_column::<u64>(ReviewTable::LABEL, row.first().map(String::as_str))?,
            account: decode_column::<u32>(ReviewTable::LABEL, row.get(1).map(String::as_str))?,
            rating: decode_column::<u8>(ReviewTable::LABEL, row.get(2).map(String::as_str))?,
            comment: decode_opt_column(row.get(3)),
            create_time,
        })
    }
} // end of impl TryFrom for ProductReviewModel

pub struct ProductReviewInMemRepo {
    datastore: Arc<Box<dyn AbstInMemoryDStore>>,
}

#[async_trait]
impl AbsProductReviewRepo for ProductReviewInMemRepo {
    async fn create(&self, entry: ProductReviewModel) -> DefaultResult<(), AppError> {
        let rows = HashMap::from([(entry.id_.clone(), ReviewTable::to_row(&entry))]);
        let data = HashMap::from([(ReviewTable::LABEL.to_string(), rows)]);
        let _num = self.datastore.save(data).await?;
        Ok(())
    }

    async fn fetch_by_product(
        &self,
        product_id: u64,
    ) -> DefaultResult<Vec<ProductReviewModel>, AppError> {
        let op = ReviewsOfProductOp {
            product_id: product_id.to_string(),
        };
        let keys = self
            .datastore
            .filter_keys(ReviewTable::LABEL.to_string(), &op)
            .await?;
        let info: AppInMemFetchKeys = HashMap::from([(ReviewTable::LABEL.to_string(), keys)]);
        let mut result = self.datastore.fetch(info).await?;
        let rows = result.remove(ReviewTable::LABEL).unwrap_or_default();
        let mut entries = rows
            .into_iter()
            .map(ProductReviewModel::try_from)
            .collect::<DefaultResult<Vec<_>, _>>()?;
        entries.sort_by(|a, b| b.create_time.cmp(&a.create_time));
        Ok(entries)
    }
} // end of impl AbsProductReviewRepo for ProductReviewInMemRepo

impl ProductReviewInMemRepo {
    pub async fn new(m: Arc<Box<dyn AbstInMemoryDStore>>) -> DefaultResult<Self, AppError> {
        m.create_table(ReviewTable::LABEL).await?;
        Ok(Self { datastore: m })
    }
}
