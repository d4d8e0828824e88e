use axum::debug_handler;
use axum::extract::{Json as ExtractJson, Path as ExtractPath, State as ExtractState};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::IntoResponse;

use crate::auth::AppAuthedClaim;
use crate::constant::HTTP_CONTENT_TYPE_JSON;
use crate::logging::{app_log_event, AppLogLevel};
use crate::repository::{app_repo_product, app_repo_product_review};
use crate::usecase::{
    ListProductReviewsUsKsResult, ListProductReviewsUseCase, SubmitReviewUsKsResult,
    SubmitReviewUseCase,
};
use crate::AppSharedState;

use super::dto::ReviewCreateReqDto;

fn resp_json_headers() -> HeaderMap {
    let resp_ctype_val = HeaderValue::from_str(HTTP_CONTENT_TYPE_JSON).unwrap();
    let mut hdr_map = HeaderMap::new();
    hdr_map.insert(header::CONTENT_TYPE, resp_ctype_val);
    hdr_map
}

// guests browse reviews freely, submitting one requires a signed-in
// account so every review is attributable
#[debug_handler(state = AppSharedState)]
pub(super) async fn submit_handler(
    ExtractPath(product_id): ExtractPath<u64>,
    authed: AppAuthedClaim,
    ExtractState(appstate): ExtractState<AppSharedState>,
    ExtractJson(req_body): ExtractJson<ReviewCreateReqDto>,
) -> impl IntoResponse {
    let hdr_map = resp_json_headers();
    let default_body = "{}".to_string();
    let logctx = appstate.log_context().clone();
    let ds = appstate.datastore();
    let review_repo = match app_repo_product_review(ds.clone()).await {
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
    let uc = SubmitReviewUseCase {
        review_repo,
        product_repo,
        account: authed.profile,
    };
    let (status, resp_body) = match uc.execute(product_id, req_body).await {
        SubmitReviewUsKsResult::Success(v) => {
            (StatusCode::CREATED, serde_json::to_string(&v).unwrap())
        }
        SubmitReviewUsKsResult::ProductNotFound => (StatusCode::NOT_FOUND, default_body),
        SubmitReviewUsKsResult::InvalidRating(detail) => (
            StatusCode::BAD_REQUEST,
            serde_json::json!({"rating": detail}).to_string(),
        ),
        SubmitReviewUsKsResult::ServerError(e) => {
            app_log_event!(logctx, AppLogLevel::ERROR, "{:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, default_body)
        }
    };
    (status, hdr_map, resp_body)
} // end of fn submit_handler

#[debug_handler(state = AppSharedState)]
pub(super) async fn list_handler(
    ExtractPath(product_id): ExtractPath<u64>,
    ExtractState(appstate): ExtractState<AppSharedState>,
) -> impl IntoResponse {
    let hdr_map = resp_json_headers();
    let default_body = "{}".to_string();
    let logctx = appstate.log_context().clone();
    let ds = appstate.datastore();
    let review_repo = match app_repo_product_review(ds.clone()).await {
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
    let uc = ListProductReviewsUseCase {
        review_repo,
        product_repo,
    };
    let (status, resp_body) = match uc.execute(product_id).await {
        ListProductReviewsUsKsResult::Success(v) => {
            (StatusCode::OK, serde_json::to_string(&v).unwrap())
        }
        ListProductReviewsUsKsResult::ProductNotFound => (StatusCode::NOT_FOUND, default_body),
        ListProductReviewsUsKsResult::ServerError(e) => {
            app_log_event!(logctx, AppLogLevel::ERROR, "{:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, default_body)
        }
    };
    (status, hdr_map, resp_body)
} // end of fn list_handler
