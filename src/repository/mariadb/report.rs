use std::result::Result as DefaultResult;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use sqlx::mysql::MySqlRow;
use sqlx::{Acquire, MySql, Row};

use crate::datastore::AppMariaDbStore;
use crate::error::{AppError, AppErrorCode};
use crate::model::SalesReportModel;
use crate::repository::AbsSalesReportRepo;

use super::run_query_once;

fn decode_row(start: NaiveDate, end: NaiveDate, row: &MySqlRow) -> DefaultResult<SalesReportModel, AppError> {
    let ctime = row.try_get::<NaiveDateTime, usize>(5)?;
    Ok(SalesReportModel {
        start_date: start,
        end_date: end,
        total_orders: row.try_get::<u32, usize>(0)?,
        total_sales: row.try_get::<Decimal, usize>(1)?,
        total_revenue: row.try_get::<Decimal, usize>(2)?,
        total_expenses: row.try_get::<Decimal, usize>(3)?,
        profit: row.try_get::<Decimal, usize>(4)?,
        create_time: DateTime::<Utc>::from_naive_utc_and_offset(ctime, Utc).fixed_offset(),
    })
}

pub(crate) struct SalesReportMariaDbRepo {
    _db: Arc<AppMariaDbStore>,
}

#[async_trait]
impl AbsSalesReportRepo for SalesReportMariaDbRepo {
    async fn save(&self, report: SalesReportModel) -> DefaultResult<(), AppError> {
        // one report per date range, recomputation overwrites the row
        let sql_patt = "INSERT INTO `sales_report`(`start_date`,`end_date`,`total_orders`,\
             `total_sales`,`total_revenue`,`total_expenses`,`profit`,`created_at`) \
             VALUES (?,?,?,?,?,?,?,?) ON DUPLICATE KEY UPDATE \
             `total_orders`=VALUES(`total_orders`),`total_sales`=VALUES(`total_sales`),\
             `total_revenue`=VALUES(`total_revenue`),`total_expenses`=VALUES(`total_expenses`),\
             `profit`=VALUES(`profit`),`created_at`=VALUES(`created_at`)";
        let mut conn = self._db.acquire().await?;
        let mut tx = conn.begin().await?;
        let query = sqlx::query(sql_patt)
            .bind(report.start_date)
            .bind(report.end_date)
            .bind(report.total_orders)
            .bind(report.total_sales)
            .bind(report.total_revenue)
            .bind(report.total_expenses)
            .bind(report.profit)
            .bind(report.create_time.naive_utc());
        let _rs = run_query_once(&mut tx, query, None).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn fetch(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> DefaultResult<Option<SalesReportModel>, AppError> {
        let sql_patt = "SELECT `total_orders`,`total_sales`,`total_revenue`,`total_expenses`,\
             `profit`,`created_at` FROM `sales_report` WHERE `start_date`=? AND `end_date`=?";
        let mut conn = self._db.acquire().await?;
        let query = sqlx::query(sql_patt).bind(start).bind(end);
        let maybe_row = query.fetch_optional(&mut *conn).await?;
        match maybe_row {
            Some(row) => Ok(Some(decode_row(start, end, &row)?)),
            None => Ok(None),
        }
    }
} // end of impl AbsSalesReportRepo for SalesReportMariaDbRepo

impl SalesReportMariaDbRepo {
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
