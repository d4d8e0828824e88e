use std::result::Result as DefaultResult;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use sqlx::mysql::{MySqlArguments, MySqlRow};
use sqlx::query::Query;
use sqlx::{Acquire, MySql, Row};

use crate::datastore::AppMariaDbStore;
use crate::error::{AppError, AppErrorCode};
use crate::model::OrderHistoryModel;
use crate::repository::AbsOrderHistoryRepo;

use super::{run_query_once, OidBytes};

const SELECT_COLS: &str = "`entry_id`,`account`,`product_id`,`product_name`,`quantity`,\
     `delivery_date`,`delivery_time`,`address`,`comment`,`cost`,`completed_at`";

struct InsertEntriesArg(Vec<OrderHistoryModel>);

impl InsertEntriesArg {
    fn sql_pattern(num_batch: usize) -> String {
        let col_seq = (0..num_batch)
            .map(|_| "(?,?,?,?,?,?,?,?,?,?,?)")
            .collect::<Vec<_>>()
            .join(",");
        format!(
            "INSERT INTO `order_history`(`entry_id`,`account`,`product_id`,`product_name`,\
             `quantity`,`delivery_date`,`delivery_time`,`address`,`comment`,`cost`,\
             `completed_at`) VALUES {col_seq}"
        )
    }
    fn bind_on<'q>(
        self,
        mut query: Query<'q, MySql, MySqlArguments>,
    ) -> DefaultResult<Query<'q, MySql, MySqlArguments>, AppError> {
        for entry in self.0 {
            let eid = OidBytes::try_from(entry.id_.as_str())?;
            query = query
                .bind(eid.as_column())
                .bind(entry.account)
                .bind(entry.product_id)
                .bind(entry.product_name)
                .bind(entry.quantity)
                .bind(entry.delivery_date)
                .bind(entry.delivery_time)
                .bind(entry.address)
                .bind(entry.comment)
                .bind(entry.cost)
                .bind(entry.completed_at.naive_utc());
        }
        Ok(query)
    }
}

impl TryFrom<MySqlRow> for OrderHistoryModel {
    type Error = AppError;
    fn try_from(row: MySqlRow) -> DefaultResult<Self, Self::Error> {
        let id_ = OidBytes::to_app_oid(&row, 0)?;
        let completed = row.try_get::<NaiveDateTime, usize>(10)?;
        Ok(Self {
            id_,
            account: row.try_get::<u32, usize>(1)?,
            product_id: row.try_get::<u64, usize>(2)?,
            product_name: row.try_get::<String, usize>(3)?,
            quantity: row.try_get::<u32, usize>(4)?,
            delivery_date: row.try_get::<NaiveDate, usize>(5)?,
            delivery_time: row.try_get::<NaiveTime, usize>(6)?,
            address: row.try_get::<String, usize>(7)?,
            comment: row.try_get::<Option<String>, usize>(8)?,
            cost: row.try_get::<Decimal, usize>(9)?,
            completed_at: DateTime::<Utc>::from_naive_utc_and_offset(completed, Utc)
                .fixed_offset(),
        })
    }
}

pub(crate) struct OrderHistoryMariaDbRepo {
    _db: Arc<AppMariaDbStore>,
}

#[async_trait]
impl AbsOrderHistoryRepo for OrderHistoryMariaDbRepo {
    async fn create(&self, entries: Vec<OrderHistoryModel>) -> DefaultResult<usize, AppError> {
        let num = entries.len();
        if num == 0 {
            return Ok(0);
        }
        let sql_patt = InsertEntriesArg::sql_pattern(num);
        let mut conn = self._db.acquire().await?;
        let mut tx = conn.begin().await?;
        let query = InsertEntriesArg(entries).bind_on(sqlx::query(sql_patt.as_str()))?;
        let _rs = run_query_once(&mut tx, query, Some(num)).await?;
        tx.commit().await?;
        Ok(num)
    }

    async fn fetch_by_account(
        &self,
        account: u32,
    ) -> DefaultResult<Vec<OrderHistoryModel>, AppError> {
        let sql_patt = format!(
            "SELECT {SELECT_COLS} FROM `order_history` WHERE `account`=? \
             ORDER BY `completed_at` DESC"
        );
        let mut conn = self._db.acquire().await?;
        let query = sqlx::query(sql_patt.as_str()).bind(account);
        let rows = query.fetch_all(&mut *conn).await?;
        rows.into_iter()
            .map(OrderHistoryModel::try_from)
            .collect::<DefaultResult<Vec<_>, _>>()
    }

    async fn fetch_one(&self, entry_id: &str) -> DefaultResult<OrderHistoryModel, AppError> {
        let eid = OidBytes::try_from(entry_id)?;
        let sql_patt = format!("SELECT {SELECT_COLS} FROM `order_history` WHERE `entry_id`=?");
        let mut conn = self._db.acquire().await?;
        let query = sqlx::query(sql_patt.as_str()).bind(eid.as_column());
        let row = query
            .fetch_optional(&mut *conn)
            .await?
            .ok_or_else(|| AppError {
                code: AppErrorCode::ObjectNotExist,
                detail: Some(format!("history-entry:{entry_id}")),
            })?;
        OrderHistoryModel::try_from(row)
    }
} // end of impl AbsOrderHistoryRepo for OrderHistoryMariaDbRepo

impl OrderHistoryMariaDbRepo {
    pub(crate) fn new(dbs: Vec<Arc<AppMariaDbStore>>) -> DefaultResult<Self, AppError> {
        if let Some(_db) = dbs.into_iter().next() {
            Ok(Self { _db })
        } else {
            Err(AppError {
                code: AppErrorCode::MissingDataStore,
                detail: Some("mariadb".to_string()),
            })
        }
    }
}
