use axum::debug_handler;
use axum::extract::{Json as ExtractJson, Path as ExtractPath, State as ExtractState};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::IntoResponse;

use crate::auth::AppAuthedClaim;
use crate::constant::HTTP_CONTENT_TYPE_JSON;
use crate::logging::{app_log_event, AppLogLevel};
use crate::model::ShopperId;
use crate::repository::{
    app_repo_cart, app_repo_order, app_repo_order_history, app_repo_product,
};
use crate::usecase::{
    CheckoutCartUseCase, CheckoutUsKsResult, PaymentNoticeUsKsResult, PaymentNoticeUseCase,
    RepeatOrderUsKsResult, RepeatOrderUseCase, RetrieveOrderHistoryUsKsResult,
    RetrieveOrderHistoryUseCase, TransitOrderStatusUsKsResult, TransitOrderStatusUseCase,
};
use crate::AppSharedState;

use super::dto::{OrderCreateReqDto, OrderStatusTransitReqDto, PaymentNoticeReqDto};

fn resp_json_headers() -> HeaderMap {
    let resp_ctype_val = HeaderValue::from_str(HTTP_CONTENT_TYPE_JSON).unwrap();
    let mut hdr_map = HeaderMap::new();
    hdr_map.insert(header::CONTENT_TYPE, resp_ctype_val);
    hdr_map
}

macro_rules! try_repo {
    ($builder:expr, $logctx:ident, $hdr_map:expr, $default_body:expr) => {
        match $builder.await {
            Ok(v) => v,
            Err(e) => {
                app_log_event!($logctx, AppLogLevel::ERROR, "{:?}", e);
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    $hdr_map,
                    $default_body,
                );
            }
        }
    };
}

#[debug_handler(state = AppSharedState)]
pub(super) async fn checkout_handler(
    shopper: ShopperId,
    ExtractState(appstate): ExtractState<AppSharedState>,
    ExtractJson(req_body): ExtractJson<OrderCreateReqDto>,
) -> impl IntoResponse {
    let hdr_map = resp_json_headers();
    let default_body = "{}".to_string();
    let logctx = appstate.log_context().clone();
    let ds = appstate.datastore();
    let cart_repo = try_repo!(app_repo_cart(ds.clone()), logctx, hdr_map, default_body);
    let product_repo = try_repo!(app_repo_product(ds.clone()), logctx, hdr_map, default_body);
    let order_repo = try_repo!(app_repo_order(ds.clone()), logctx, hdr_map, default_body);
    let history_repo = try_repo!(app_repo_order_history(ds), logctx, hdr_map, default_body);
    let uc = CheckoutCartUseCase {
        cart_repo,
        product_repo,
        order_repo,
        history_repo,
        notifier: appstate.notifier(),
        log_ctx: logctx.clone(),
        shopper,
    };
    let (status, resp_body) = match uc.execute(req_body).await {
        CheckoutUsKsResult::Success(v) => {
            (StatusCode::CREATED, serde_json::to_string(&v).unwrap())
        }
        CheckoutUsKsResult::ValidationFailure(e) => {
            (StatusCode::BAD_REQUEST, serde_json::to_string(&e).unwrap())
        }
        CheckoutUsKsResult::ServerError(e) => {
            app_log_event!(logctx, AppLogLevel::ERROR, "{:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, default_body)
        }
    };
    (status, hdr_map, resp_body)
} // end of fn checkout_handler

#[debug_handler(state = AppSharedState)]
pub(super) async fn repeat_handler(
    ExtractPath(entry_id): ExtractPath<String>,
    shopper: ShopperId,
    ExtractState(appstate): ExtractState<AppSharedState>,
) -> impl IntoResponse {
    let hdr_map = resp_json_headers();
    let default_body = "{}".to_string();
    let logctx = appstate.log_context().clone();
    let ds = appstate.datastore();
    let cart_repo = try_repo!(app_repo_cart(ds.clone()), logctx, hdr_map, default_body);
    let product_repo = try_repo!(app_repo_product(ds.clone()), logctx, hdr_map, default_body);
    let order_repo = try_repo!(app_repo_order(ds.clone()), logctx, hdr_map, default_body);
    let history_repo = try_repo!(app_repo_order_history(ds), logctx, hdr_map, default_body);
    let uc = RepeatOrderUseCase {
        cart_repo,
        product_repo,
        order_repo,
        history_repo,
        notifier: appstate.notifier(),
        log_ctx: logctx.clone(),
        shopper,
    };
    let (status, resp_body) = match uc.execute(entry_id.as_str()).await {
        RepeatOrderUsKsResult::Success(v) => {
            (StatusCode::CREATED, serde_json::to_string(&v).unwrap())
        }
        RepeatOrderUsKsResult::NotFound => (StatusCode::NOT_FOUND, default_body),
        RepeatOrderUsKsResult::ServerError(e) => {
            app_log_event!(logctx, AppLogLevel::ERROR, "{:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, default_body)
        }
    };
    (status, hdr_map, resp_body)
} // end of fn repeat_handler

// staff operation driven from back-office tooling
#[debug_handler(state = AppSharedState)]
pub(super) async fn transit_status_handler(
    ExtractPath(order_id): ExtractPath<String>,
    _authed: AppAuthedClaim,
    ExtractState(appstate): ExtractState<AppSharedState>,
    ExtractJson(req_body): ExtractJson<OrderStatusTransitReqDto>,
) -> impl IntoResponse {
    let hdr_map = resp_json_headers();
    let default_body = "{}".to_string();
    let logctx = appstate.log_context().clone();
    let repo = try_repo!(
        app_repo_order(appstate.datastore()),
        logctx,
        hdr_map,
        default_body
    );
    let uc = TransitOrderStatusUseCase {
        repo,
        log_ctx: logctx.clone(),
    };
    let (status, resp_body) = match uc.execute(order_id.as_str(), req_body).await {
        TransitOrderStatusUsKsResult::Success(v) => {
            (StatusCode::OK, serde_json::to_string(&v).unwrap())
        }
        TransitOrderStatusUsKsResult::NotFound => (StatusCode::NOT_FOUND, default_body),
        TransitOrderStatusUsKsResult::InvalidEvent => (StatusCode::BAD_REQUEST, default_body),
        TransitOrderStatusUsKsResult::InvalidTransition(detail) => (
            StatusCode::CONFLICT,
            serde_json::json!({"detail": detail}).to_string(),
        ),
        TransitOrderStatusUsKsResult::ServerError(e) => {
            app_log_event!(logctx, AppLogLevel::ERROR, "{:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, default_body)
        }
    };
    (status, hdr_map, resp_body)
} // end of fn transit_status_handler

#[debug_handler(state = AppSharedState)]
pub(super) async fn payment_notice_handler(
    ExtractPath(order_id): ExtractPath<String>,
    _authed: AppAuthedClaim,
    ExtractState(appstate): ExtractState<AppSharedState>,
    ExtractJson(req_body): ExtractJson<PaymentNoticeReqDto>,
) -> impl IntoResponse {
    let hdr_map = resp_json_headers();
    let default_body = "{}".to_string();
    let logctx = appstate.log_context().clone();
    let ds = appstate.datastore();
    let order_repo = try_repo!(app_repo_order(ds.clone()), logctx, hdr_map, default_body);
    let cart_repo = try_repo!(app_repo_cart(ds), logctx, hdr_map, default_body);
    let uc = PaymentNoticeUseCase {
        order_repo,
        cart_repo,
        log_ctx: logctx.clone(),
    };
    let (status, resp_body) = match uc.execute(order_id.as_str(), req_body).await {
        PaymentNoticeUsKsResult::Success(v) => {
            (StatusCode::OK, serde_json::to_string(&v).unwrap())
        }
        PaymentNoticeUsKsResult::NotFound => (StatusCode::NOT_FOUND, default_body),
        PaymentNoticeUsKsResult::InvalidTransition(detail) => (
            StatusCode::CONFLICT,
            serde_json::json!({"detail": detail}).to_string(),
        ),
        PaymentNoticeUsKsResult::ServerError(e) => {
            app_log_event!(logctx, AppLogLevel::ERROR, "{:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, default_body)
        }
    };
    (status, hdr_map, resp_body)
} // end of fn payment_notice_handler

#[debug_handler(state = AppSharedState)]
pub(super) async fn history_handler(
    authed: AppAuthedClaim,
    ExtractState(appstate): ExtractState<AppSharedState>,
) -> impl IntoResponse {
    let hdr_map = resp_json_headers();
    let default_body = "{}".to_string();
    let logctx = appstate.log_context().clone();
    let repo = try_repo!(
        app_repo_order_history(appstate.datastore()),
        logctx,
        hdr_map,
        default_body
    );
    let uc = RetrieveOrderHistoryUseCase {
        repo,
        account: authed.profile,
    };
    let (status, resp_body) = match uc.execute().await {
        RetrieveOrderHistoryUsKsResult::Success(v) => {
            (StatusCode::OK, serde_json::to_string(&v).unwrap())
        }
        RetrieveOrderHistoryUsKsResult::ServerError(e) => {
            app_log_event!(logctx, AppLogLevel::ERROR, "{:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, default_body)
        }
    };
    (status, hdr_map, resp_body)
}
