use axum::debug_handler;
use axum::extract::{Json as ExtractJson, Path as ExtractPath, State as ExtractState};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::IntoResponse;

use crate::constant::HTTP_CONTENT_TYPE_JSON;
use crate::logging::{app_log_event, AppLogLevel};
use crate::model::ShopperId;
use crate::repository::{app_repo_cart, app_repo_product};
use crate::usecase::{
    ModifyCartLinesUseCase, ModifyCartUsKsResult, RemoveCartLineUsKsResult, RemoveCartLineUseCase,
    RetrieveCartUsKsResult, RetrieveCartUseCase,
};
use crate::AppSharedState;

use super::dto::CartModifyReqDto;

fn resp_json_headers() -> HeaderMap {
    let resp_ctype_val = HeaderValue::from_str(HTTP_CONTENT_TYPE_JSON).unwrap();
    let mut hdr_map = HeaderMap::new();
    hdr_map.insert(header::CONTENT_TYPE, resp_ctype_val);
    hdr_map
}

#[debug_handler(state = AppSharedState)]
pub(super) async fn retrieve(
    shopper: ShopperId,
    ExtractState(appstate): ExtractState<AppSharedState>,
) -> impl IntoResponse {
    let hdr_map = resp_json_headers();
    let default_body = "{}".to_string();
    let logctx = appstate.log_context().clone();
    let repo = match app_repo_cart(appstate.datastore()).await {
        Ok(v) => v,
        Err(e) => {
            app_log_event!(logctx, AppLogLevel::ERROR, "{:?}", e);
            return (StatusCode::INTERNAL_SERVER_ERROR, hdr_map, default_body);
        }
    };
    let uc = RetrieveCartUseCase { repo, shopper };
    let (status, resp_body) = match uc.execute().await {
        RetrieveCartUsKsResult::Success(v) => {
            (StatusCode::OK, serde_json::to_string(&v).unwrap())
        }
        RetrieveCartUsKsResult::ServerError(e) => {
            app_log_event!(logctx, AppLogLevel::ERROR, "{:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, default_body)
        }
    };
    (status, hdr_map, resp_body)
}

#[debug_handler(state = AppSharedState)]
pub(super) async fn modify_lines(
    shopper: ShopperId,
    ExtractState(appstate): ExtractState<AppSharedState>,
    ExtractJson(req_body): ExtractJson<CartModifyReqDto>,
) -> impl IntoResponse {
    let hdr_map = resp_json_headers();
    let default_body = "{}".to_string();
    let logctx = appstate.log_context().clone();
    let ds = appstate.datastore();
    let cart_repo = match app_repo_cart(ds.clone()).await {
        Ok(v) => v,
        Err(e) => {
            app_log_event!(logctx, AppLogLevel::ERROR, "{:?}", e);
            return (StatusCode::INTERNAL_SERVER_ERROR, hdr_map, default_body);
        }
    };
    let product_repo = match app_repo_product(ds).await {
        Ok(v) => v,
        Err(e) => {
            app_log_event!(logctx, AppLogLevel::ERROR, "{:?}", e);
            return (StatusCode::INTERNAL_SERVER_ERROR, hdr_map, default_body);
        }
    };
    let uc = ModifyCartLinesUseCase {
        cart_repo,
        product_repo,
        log_ctx: logctx.clone(),
        shopper,
    };
    let (status, resp_body) = match uc.execute(req_body).await {
        ModifyCartUsKsResult::Success(v) => {
            (StatusCode::OK, serde_json::to_string(&v).unwrap())
        }
        ModifyCartUsKsResult::ProductNotFound(ids) => (
            StatusCode::BAD_REQUEST,
            serde_json::json!({"unknown_products": ids}).to_string(),
        ),
        ModifyCartUsKsResult::ExceedingLimit(num) => (
            StatusCode::BAD_REQUEST,
            serde_json::json!({"num_lines": num}).to_string(),
        ),
        ModifyCartUsKsResult::ServerError(e) => {
            app_log_event!(logctx, AppLogLevel::ERROR, "{:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, default_body)
        }
    };
    (status, hdr_map, resp_body)
} // end of fn modify_lines

#[debug_handler(state = AppSharedState)]
pub(super) async fn remove_line(
    ExtractPath(product_id): ExtractPath<u64>,
    shopper: ShopperId,
    ExtractState(appstate): ExtractState<AppSharedState>,
) -> impl IntoResponse {
    let hdr_map = resp_json_headers();
    let default_body = "{}".to_string();
    let logctx = appstate.log_context().clone();
    let repo = match app_repo_cart(appstate.datastore()).await {
        Ok(v) => v,
        Err(e) => {
            app_log_event!(logctx, AppLogLevel::ERROR, "{:?}", e);
            return (StatusCode::INTERNAL_SERVER_ERROR, hdr_map, default_body);
        }
    };
    let uc = RemoveCartLineUseCase { repo, shopper };
    let (status, resp_body) = match uc.execute(product_id).await {
        RemoveCartLineUsKsResult::Success(v) => {
            (StatusCode::OK, serde_json::to_string(&v).unwrap())
        }
        RemoveCartLineUsKsResult::NotFound => (StatusCode::NOT_FOUND, default_body),
        RemoveCartLineUsKsResult::ServerError(e) => {
            app_log_event!(logctx, AppLogLevel::ERROR, "{:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, default_body)
        }
    };
    (status, hdr_map, resp_body)
}
