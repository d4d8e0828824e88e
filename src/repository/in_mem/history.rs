use std::boxed::Box;
use std::collections::HashMap;
use std::result::Result as DefaultResult;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime};
use rust_decimal::Decimal;

use crate::datastore::{
    AbsDStoreFilterKeyOp, AbstInMemoryDStore, AppInMemFetchKeys, AppInMemFetchedSingleRow,
};
use crate::error::{AppError, AppErrorCode};
use crate::model::OrderHistoryModel;
use crate::repository::AbsOrderHistoryRepo;

use super::{decode_column, decode_opt_column, encode_opt_column};

#[allow(non_snake_case)]
mod HistoryTable {
    use super::{AppInMemFetchedSingleRow, OrderHistoryModel};
    pub(super) const LABEL: &'static str = "order_history";

    pub(super) fn to_row(obj: &OrderHistoryModel) -> AppInMemFetchedSingleRow {
        vec![
            obj.account.to_string(),
            obj.product_id.to_string(),
            obj.product_name.clone(),
            obj.quantity.to_string(),
            obj.delivery_date.format("%Y-%m-%d").to_string(),
            obj.delivery_time.format("%H:%M").to_string(),
            obj.address.clone(),
            super::encode_opt_column(&obj.comment),
            obj.cost.to_string(),
            obj.completed_at.to_rfc3339(),
        ]
    }
} // end of inner-mod HistoryTable

struct EntriesOfAccountOp {
    account: String,
}
impl AbsDStoreFilterKeyOp for EntriesOfAccountOp {
    fn filter(&self, _k: &String, v: &Vec<String>) -> bool {
        v.first()
            .map(|a| a == self.account.as_str())
            .unwrap_or(false)
    }
}

impl TryFrom<(String, Vec<String>)> for OrderHistoryModel {
    type Error = AppError;
    fn try_from(value: (String, Vec<String>)) -> DefaultResult<Self, Self::Error> {
        let (key, row) = value;
        let corrupted = |d: String| AppError {
            code: AppErrorCode::DataCorruption,
            detail: Some(d),
        };
        let delivery_date =
            NaiveDate::parse_from_str(row.get(4).map(String::as_str).unwrap_or(""), "%Y-%m-%d")
                .map_err(|e| corrupted(format!("history-delivery-date:{e}")))?;
        let delivery_time =
            NaiveTime::parse_from_str(row.get(5).map(String::as_str).unwrap_or(""), "%H:%M")
                .map_err(|e| corrupted(format!("history-delivery-time:{e}")))?;
        let completed_at =
            DateTime::parse_from_rfc3339(row.get(9).map(String::as_str).unwrap_or(""))
                .map_err(|e| corrupted(format!("history-completed-at:{e}")))?;
        Ok(Self {
            id_: key,
            account: decode_column::<u32>(HistoryTable::LABEL, row.first().map(String::as_str))?,
            product_id: decode_column::<u64>(HistoryTable::LABEL, row.get(1).map(String::as_str))?,
            product_name: row.get(2).cloned().unwrap_or_default(),
            quantity: decode_column::<u32>(HistoryTable::LABEL, row.get(3).map(String::as_str))?,
            delivery_date,
            delivery_time,
            address: row.get(6).cloned().unwrap_or_default(),
            comment: decode_opt_column(row.get(7)),
            cost: decode_column::<Decimal>(HistoryTable::LABEL, row.get(8).map(String::as_str))?,
            completed_at,
        })
    }
} // end of impl TryFrom for OrderHistoryModel

pub struct OrderHistoryInMemRepo {
    datastore: Arc<Box<dyn AbstInMemoryDStore>>,
}

#[async_trait]
impl AbsOrderHistoryRepo for OrderHistoryInMemRepo {
    async fn create(&self, entries: Vec<OrderHistoryModel>) -> DefaultResult<usize, AppError> {
        let num = entries.len();
        let rows = entries
            .iter()
            .map(|e| (e.id_.clone(), HistoryTable::to_row(e)))
            .collect::<HashMap<_, _>>();
        let data = HashMap::from([(HistoryTable::LABEL.to_string(), rows)]);
        let _num_saved = self.datastore.save(data).await?;
        Ok(num)
    }

    async fn fetch_by_account(
        &self,
        account: u32,
    ) -> DefaultResult<Vec<OrderHistoryModel>, AppError> {
        let op = EntriesOfAccountOp {
            account: account.to_string(),
        };
        let keys = self
            .datastore
            .filter_keys(HistoryTable::LABEL.to_string(), &op)
            .await?;
        let info: AppInMemFetchKeys = HashMap::from([(HistoryTable::LABEL.to_string(), keys)]);
        let mut result = self.datastore.fetch(info).await?;
        let rows = result.remove(HistoryTable::LABEL).unwrap_or_default();
        let mut entries = rows
            .into_iter()
            .map(OrderHistoryModel::try_from)
            .collect::<DefaultResult<Vec<_>, _>>()?;
        entries.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
        Ok(entries)
    }

    async fn fetch_one(&self, entry_id: &str) -> DefaultResult<OrderHistoryModel, AppError> {
        let info: AppInMemFetchKeys = HashMap::from([(
            HistoryTable::LABEL.to_string(),
            vec![entry_id.to_string()],
        )]);
        let mut result = self.datastore.fetch(info).await?;
        let mut rows = result.remove(HistoryTable::LABEL).unwrap_or_default();
        let row = rows.remove(entry_id).ok_or_else(|| AppError {
            code: AppErrorCode::ObjectNotExist,
            detail: Some(format!("history-entry:{entry_id}")),
        })?;
        OrderHistoryModel::try_from((entry_id.to_string(), row))
    }
} // end of impl AbsOrderHistoryRepo for OrderHistoryInMemRepo

impl OrderHistoryInMemRepo {
    pub async fn new(m: Arc<Box<dyn AbstInMemoryDStore>>) -> DefaultResult<Self, AppError> {
        m.create_table(HistoryTable::LABEL).await?;
        Ok(Self { datastore: m })
    }
}
