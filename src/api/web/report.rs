use axum::debug_handler;
use axum::extract::{Json as ExtractJson, State as ExtractState};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::IntoResponse;

use crate::auth::AppAuthedClaim;
use crate::constant::HTTP_CONTENT_TYPE_JSON;
use crate::logging::{app_log_event, AppLogLevel};
use crate::repository::{app_repo_order, app_repo_sales_report};
use crate::usecase::{base_expenses_from, GenerateSalesReportUseCase, SalesReportUsKsResult};
use crate::AppSharedState;

use super::dto::SalesReportReqDto;

#[debug_handler(state = AppSharedState)]
pub(super) async fn generate_handler(
    _authed: AppAuthedClaim,
    ExtractState(appstate): ExtractState<AppSharedState>,
    ExtractJson(req_body): ExtractJson<SalesReportReqDto>,
) -> impl IntoResponse {
    let hdr_map = {
        let resp_ctype_val = HeaderValue::from_str(HTTP_CONTENT_TYPE_JSON).unwrap();
        let mut hmap = HeaderMap::new();
        hmap.insert(header::CONTENT_TYPE, resp_ctype_val);
        hmap
    };
    let default_body = "{}".to_string();
    let logctx = appstate.log_context().clone();
    let ds = appstate.datastore();
    let order_repo = match app_repo_order(ds.clone()).await {
        Ok(v) => v,
        Err(e) => {
            app_log_event!(logctx, AppLogLevel::ERROR, "{:?}", e);
            return (StatusCode::INTERNAL_SERVER_ERROR, hdr_map, default_body);
        }
    };
    let report_repo = match app_repo_sales_report(ds).await {
        Ok(v) => v,
        Err(e) => {
            app_log_event!(logctx, AppLogLevel::ERROR, "{:?}", e);
            return (StatusCode::INTERNAL_SERVER_ERROR, hdr_map, default_body);
        }
    };
    let base_expenses = base_expenses_from(appstate.config().api_server.report.as_ref());
    let uc = GenerateSalesReportUseCase {
        order_repo,
        report_repo,
        log_ctx: logctx.clone(),
        base_expenses,
    };
    let (status, resp_body) = match uc.execute(req_body).await {
        SalesReportUsKsResult::Success(v) => {
            (StatusCode::OK, serde_json::to_string(&v).unwrap())
        }
        SalesReportUsKsResult::InvalidRange(detail) => (
            StatusCode::BAD_REQUEST,
            serde_json::json!({"detail": detail}).to_string(),
        ),
        SalesReportUsKsResult::ServerError(e) => {
            app_log_event!(logctx, AppLogLevel::ERROR, "{:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, default_body)
        }
    };
    (status, hdr_map, resp_body)
} // end of fn generate_handler
