use std::boxed::Box;
use std::collections::HashMap;
use std::result::Result as DefaultResult;
use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::datastore::{
    AbsDStoreFilterKeyOp, AbstInMemoryDStore, AppInMemFetchKeys, AppInMemFetchedSingleRow,
    AppInMemFetchedSingleTable,
};
use crate::error::AppError;
use crate::model::ProductModel;
use crate::repository::AbsProductRepo;

use super::decode_column;

#[allow(non_snake_case)]
mod ProductTable {
    use super::{AppInMemFetchedSingleRow, HashMap, ProductModel};
    pub(super) const LABEL: &'static str = "catalog_product";
    pub(super) struct UpdateArg(pub(super) Vec<ProductModel>);

    pub(super) fn pkey(product_id: u64) -> String {
        product_id.to_string()
    }

    impl Into<super::AppInMemFetchedSingleTable> for UpdateArg {
        fn into(self) -> super::AppInMemFetchedSingleTable {
            let iter = self.0.into_iter().map(|item| {
                let key = pkey(item.id_);
                let row: AppInMemFetchedSingleRow = vec![
                    item.name,
                    item.price.to_string(),
                    item.image_ref,
                    item.description,
                ];
                (key, row)
            });
            HashMap::from_iter(iter)
        }
    }
} // end of inner-mod ProductTable

impl TryFrom<(String, Vec<String>)> for ProductModel {
    type Error = AppError;
    fn try_from(value: (String, Vec<String>)) -> DefaultResult<Self, Self::Error> {
        let (key, row) = value;
        let id_ = decode_column::<u64>(ProductTable::LABEL, Some(key.as_str()))?;
        let price = decode_column::<Decimal>(ProductTable::LABEL, row.get(1).map(String::as_str))?;
        Ok(Self {
            id_,
            name: row.first().cloned().unwrap_or_default(),
            price,
            image_ref: row.get(2).cloned().unwrap_or_default(),
            description: row.get(3).cloned().unwrap_or_default(),
        })
    }
}

struct AllKeysOp;
impl AbsDStoreFilterKeyOp for AllKeysOp {
    fn filter(&self, _k: &String, _v: &Vec<String>) -> bool {
        true
    }
}

pub struct ProductInMemRepo {
    datastore: Arc<Box<dyn AbstInMemoryDStore>>,
}

#[async_trait]
impl AbsProductRepo for ProductInMemRepo {
    async fn save(&self, items: Vec<ProductModel>) -> DefaultResult<usize, AppError> {
        let num = items.len();
        let rows = ProductTable::UpdateArg(items).into();
        let data = HashMap::from([(ProductTable::LABEL.to_string(), rows)]);
        let _num_saved = self.datastore.save(data).await?;
        Ok(num)
    }

    async fn fetch(&self, ids: Vec<u64>) -> DefaultResult<Vec<ProductModel>, AppError> {
        let pkeys = ids.into_iter().map(ProductTable::pkey).collect::<Vec<_>>();
        let info: AppInMemFetchKeys = HashMap::from([(ProductTable::LABEL.to_string(), pkeys)]);
        let mut result = self.datastore.fetch(info).await?;
        let rows = result.remove(ProductTable::LABEL).unwrap_or_default();
        rows.into_iter()
            .map(ProductModel::try_from)
            .collect::<DefaultResult<Vec<_>, _>>()
    }

    async fn fetch_all(&self) -> DefaultResult<Vec<ProductModel>, AppError> {
        let op = AllKeysOp;
        let keys = self
            .datastore
            .filter_keys(ProductTable::LABEL.to_string(), &op)
            .await?;
        let info: AppInMemFetchKeys = HashMap::from([(ProductTable::LABEL.to_string(), keys)]);
        let mut result = self.datastore.fetch(info).await?;
        let rows = result.remove(ProductTable::LABEL).unwrap_or_default();
        let mut items = rows
            .into_iter()
            .map(ProductModel::try_from)
            .collect::<DefaultResult<Vec<_>, _>>()?;
        items.sort_by_key(|p| p.id_);
        Ok(items)
    }
} // end of impl AbsProductRepo for ProductInMemRepo

impl ProductInMemRepo {
    pub async fn new(m: Arc<Box<dyn AbstInMemoryDStore>>) -> DefaultResult<Self, AppError> {
        m.create_table(ProductTable::LABEL).await?;
        Ok(Self { datastore: m })
    }
}
