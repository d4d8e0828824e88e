use axum::debug_handler;
use axum::extract::{Json as ExtractJson, State as ExtractState};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::IntoResponse;

use crate::auth::AppAuthedClaim;
use crate::constant::HTTP_CONTENT_TYPE_JSON;
use crate::logging::{app_log_event, AppLogLevel};
use crate::repository::app_repo_product;
use crate::usecase::{
    ListProductsUsKsResult, ListProductsUseCase, SeedProductsUsKsResult, SeedProductsUseCase,
};
use crate::AppSharedState;

use super::dto::ProductDto;

fn resp_json_headers() -> HeaderMap {
    let resp_ctype_val = HeaderValue::from_str(HTTP_CONTENT_TYPE_JSON).unwrap();
    let mut hdr_map = HeaderMap::new();
    hdr_map.insert(header::CONTENT_TYPE, resp_ctype_val);
    hdr_map
}

// catalog seeding is reserved to signed-in staff, the storefront itself
// never calls this endpoint
#[debug_handler(state = AppSharedState)]
pub(super) async fn seed_handler(
    _authed: AppAuthedClaim,
    ExtractState(appstate): ExtractState<AppSharedState>,
    ExtractJson(req_body): ExtractJson<Vec<ProductDto>>,
) -> impl IntoResponse {
    let hdr_map = resp_json_headers();
    let default_body = "{}".to_string();
    let logctx = appstate.log_context().clone();
    let repo = match app_repo_product(appstate.datastore()).await {
        Ok(v) => v,
        Err(e) => {
            app_log_event!(logctx, AppLogLevel::ERROR, "{:?}", e);
            return (StatusCode::INTERNAL_SERVER_ERROR, hdr_map, default_body);
        }
    };
    let uc = SeedProductsUseCase {
        repo,
        log_ctx: logctx.clone(),
    };
    let (status, resp_body) = match uc.execute(req_body).await {
        SeedProductsUsKsResult::Success(num) => (
            StatusCode::CREATED,
            serde_json::json!({"num_saved": num}).to_string(),
        ),
        SeedProductsUsKsResult::ValidationFailure(es) => (
            StatusCode::BAD_REQUEST,
            serde_json::to_string(&es).unwrap(),
        ),
        SeedProductsUsKsResult::ServerError(e) => {
            app_log_event!(logctx, AppLogLevel::ERROR, "{:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, default_body)
        }
    };
    (status, hdr_map, resp_body)
} // end of fn seed_handler

#[debug_handler(state = AppSharedState)]
pub(super) async fn list_handler(
    ExtractState(appstate): ExtractState<AppSharedState>,
) -> impl IntoResponse {
    let hdr_map = resp_json_headers();
    let default_body = "{}".to_string();
    let logctx = appstate.log_context().clone();
    let repo = match app_repo_product(appstate.datastore()).await {
        Ok(v) => v,
        Err(e) => {
            app_log_event!(logctx, AppLogLevel::ERROR, "{:?}", e);
            return (StatusCode::INTERNAL_SERVER_ERROR, hdr_map, default_body);
        }
    };
    let uc = ListProductsUseCase { repo };
    let (status, resp_body) = match uc.execute().await {
        ListProductsUsKsResult::Success(v) => {
            (StatusCode::OK, serde_json::to_string(&v).unwrap())
        }
        ListProductsUsKsResult::ServerError(e) => {
            app_log_event!(logctx, AppLogLevel::ERROR, "{:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, default_body)
        }
    };
    (status, hdr_map, resp_body)
}
