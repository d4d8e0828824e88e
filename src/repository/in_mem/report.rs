use std::boxed::Box;
use std::collections::HashMap;
use std::result::Result as DefaultResult;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use rust_decimal::Decimal;

use crate::datastore::{AbstInMemoryDStore, AppInMemFetchKeys, AppInMemFetchedSingleRow};
use crate::error::{AppError, AppErrorCode};
use crate::model::SalesReportModel;
use crate::repository::AbsSalesReportRepo;

use super::decode_column;

#[allow(non_snake_case)]
mod ReportTable {
    use super::{AppInMemFetchedSingleRow, NaiveDate, SalesReportModel};
    pub(super) const LABEL: &'static str = "sales_report";

    // one report per date range, recomputing overwrites the old row
    pub(super) fn pkey(start: NaiveDate, end: NaiveDate) -> String {
        format!("{}/{}", start.format("%Y-%m-%d"), end.format("%Y-%m-%d"))
    }

    pub(super) fn to_row(obj: &SalesReportModel) -> AppInMemFetchedSingleRow {
        vec![
            obj.total_orders.to_string(),
            obj.total_sales.to_string(),
            obj.total_revenue.to_string(),
            obj.total_expenses.to_string(),
            obj.profit.to_string(),
            obj.create_time.to_rfc3339(),
        ]
    }
} // end of inner-mod ReportTable

fn decode_report(
    start: NaiveDate,
    end: NaiveDate,
    row: &Vec<String>,
) -> DefaultResult<SalesReportModel, AppError> {
    let create_time = DateTime::parse_from_rfc3339(row.get(5).map(String::as_str).unwrap_or(""))
        .map_err(|e| AppError {
            code: AppErrorCode::DataCorruption,
            detail: Some(format!("report-create-time:{e}")),
        })?;
    Ok(SalesReportModel {
        start_date: start,
        end_date: end,
        total_orders: decode_column::<u32>(ReportTable::LABEL, row.first().map(String::as_str))?,
        total_sales: decode_column::<Decimal>(ReportTable::LABEL, row.get(1).map(String::as_str))?,
        total_revenue: decode_column::<Decimal>(ReportTable::LABEL, row.get(2).map(String::as_str))?,
        total_expenses: decode_column::<Decimal>(
            ReportTable::LABEL,
            row.get(3).map(String::as_str),
        )?,
        profit: decode_column::<Decimal>(ReportTable::LABEL, row.get(4).map(String::as_str))?,
        create_time,
    })
}

pub struct SalesReportInMemRepo {
    datastore: Arc<Box<dyn AbstInMemoryDStore>>,
}

#[async_trait]
impl AbsSalesReportRepo for SalesReportInMemRepo {
    async fn save(&self, report: SalesReportModel) -> DefaultResult<(), AppError> {
        let key = ReportTable::pkey(report.start_date, report.end_date);
        let rows = HashMap::from([(key, ReportTable::to_row(&report))]);
        let data = HashMap::from([(ReportTable::LABEL.to_string(), rows)]);
        let _num_saved = self.datastore.save(data).await?;
        Ok(())
    }

    async fn fetch(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> DefaultResult<Option<SalesReportModel>, AppError> {
        let key = ReportTable::pkey(start, end);
        let info: AppInMemFetchKeys =
            HashMap::from([(ReportTable::LABEL.to_string(), vec![key.clone()])]);
        let mut result = self.datastore.fetch(info).await?;
        let mut rows = result.remove(ReportTable::LABEL).unwrap_or_default();
        match rows.remove(key.as_str()) {
            Some(row) => Ok(Some(decode_report(start, end, &row)?)),
            None => Ok(None),
        }
    }
} // end of impl AbsSalesReportRepo for SalesReportInMemRepo

impl SalesReportInMemRepo {
    pub async fn new(m: Arc<Box<dyn AbstInMemoryDStore>>) -> DefaultResult<Self, AppError> {
        m.create_table(ReportTable::LABEL).await?;
        Ok(Self { datastore: m })
    }
}
