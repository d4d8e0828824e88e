use std::boxed::Box;
use std::result::Result as DefaultResult;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{Local as LocalTime, NaiveDate, TimeZone};
use rust_decimal::Decimal;

use crate::api::web::dto::{SalesReportDto, SalesReportReqDto};
use crate::config::AppReportCfg;
use crate::constant::hard_limit;
use crate::error::AppError;
use crate::logging::{app_log_event, AppLogContext, AppLogLevel};
use crate::model::SalesReportModel;
use crate::repository::{AbsOrderRepo, AbsSalesReportRepo};

pub struct GenerateSalesReportUseCase {
    pub order_repo: Box<dyn AbsOrderRepo>,
    pub report_repo: Box<dyn AbsSalesReportRepo>,
    pub log_ctx: Arc<AppLogContext>,
    pub base_expenses: Decimal,
}

pub enum SalesReportUsKsResult {
    Success(SalesReportDto),
    InvalidRange(String),
    ServerError(AppError),
}

// deployments may override the flat expense figure in the `report`
// config section, malformed overrides fall back to the default
pub fn base_expenses_from(cfg: Option<&AppReportCfg>) -> Decimal {
    cfg.and_then(|c| c.base_expenses.as_ref())
        .and_then(|raw| Decimal::from_str(raw.as_str()).ok())
        .unwrap_or_else(|| Decimal::from(hard_limit::REPORT_BASE_EXPENSES))
}

impl GenerateSalesReportUseCase {
    pub async fn execute(self, data: SalesReportReqDto) -> SalesReportUsKsResult {
        let start = match NaiveDate::parse_from_str(data.start_date.as_str(), "%Y-%m-%d") {
            Ok(d) => d,
            Err(e) => {
                return SalesReportUsKsResult::InvalidRange(format!("start_date, {e}"));
            }
        };
        let end = match NaiveDate::parse_from_str(data.end_date.as_str(), "%Y-%m-%d") {
            Ok(d) => d,
            Err(e) => {
                return SalesReportUsKsResult::InvalidRange(format!("end_date, {e}"));
            }
        };
        if start > end {
            return SalesReportUsKsResult::InvalidRange("start-after-end".to_string());
        }
        match self.compute_and_store(start, end).await {
            Ok(report) => SalesReportUsKsResult::Success((&report).into()),
            Err(e) => SalesReportUsKsResult::ServerError(e),
        }
    }

    async fn compute_and_store(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> DefaultResult<SalesReportModel, AppError> {
        // the inclusive date range covers whole days in server-local time
        let t0 = LocalTime
            .from_local_datetime(&start.and_hms_opt(0, 0, 0).unwrap_or_default())
            .earliest()
            .map(|t| t.fixed_offset())
            .unwrap_or_else(|| LocalTime::now().fixed_offset());
        let t1 = LocalTime
            .from_local_datetime(&end.and_hms_micro_opt(23, 59, 59, 999_999).unwrap_or_default())
            .latest()
            .map(|t| t.fixed_offset())
            .unwrap_or_else(|| LocalTime::now().fixed_offset());
        let orders = self.order_repo.fetch_by_created_time(t0, t1).await?;
        let now = LocalTime::now().fixed_offset();
        let report = SalesReportModel::compute(
            start,
            end,
            orders.as_slice(),
            self.base_expenses,
            now,
        );
        self.report_repo.save(report).await?;
        let logctx = &self.log_ctx;
        app_log_event!(
            logctx,
            AppLogLevel::INFO,
            "report-range:{start}..{end}, num-orders:{}",
            orders.len()
        );
        // read back the stored row so the response reflects what was
        // persisted, recomputation over the same orders is idempotent
        let stored = self.report_repo.fetch(start, end).await?;
        stored.ok_or(AppError {
            code: crate::error::AppErrorCode::DataCorruption,
            detail: Some("report-vanished-after-save".to_string()),
        })
    } // end of fn compute_and_store
} // end of impl GenerateSalesReportUseCase
