use std::collections::HashMap;

use axum::routing::{delete, get, patch, post, MethodRouter};
use http_body::Body as HttpBody;

use crate::constant::api::web as WebConst;
use crate::{AppSharedState, WebApiHdlrLabel};

mod cart;
pub mod dto;
mod order;
mod product;
mod report;
mod review;

// type parameter `B` for http body of the method router has to match the same
// type parameter in `axum::Router`
pub type ApiRouteType<HB> = MethodRouter<AppSharedState, HB>;
pub type ApiRouteTableType<HB> = HashMap<WebApiHdlrLabel, ApiRouteType<HB>>;

pub fn route_table<HB>() -> ApiRouteTableType<HB>
where
    HB: HttpBody + Send + 'static,
    <HB as HttpBody>::Data: Send,
    <HB as HttpBody>::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let mut out: ApiRouteTableType<HB> = HashMap::new();
    out.insert(WebConst::SEED_PRODUCTS, post(product::seed_handler));
    out.insert(WebConst::LIST_PRODUCTS, get(product::list_handler));
    out.insert(
        WebConst::SUBMIT_PRODUCT_REVIEW,
        post(review::submit_handler),
    );
    out.insert(WebConst::LIST_PRODUCT_REVIEWS, get(review::list_handler));
    out.insert(WebConst::RETRIEVE_CART, get(cart::retrieve));
    out.insert(WebConst::MODIFY_CART_LINES, patch(cart::modify_lines));
    out.insert(WebConst::REMOVE_CART_LINE, delete(cart::remove_line));
    out.insert(WebConst::CHECKOUT_CART, post(order::checkout_handler));
    out.insert(
        WebConst::TRANSIT_ORDER_STATUS,
        patch(order::transit_status_handler),
    );
    out.insert(WebConst::PAYMENT_NOTICE, post(order::payment_notice_handler));
    out.insert(WebConst::REPEAT_ORDER, post(order::repeat_handler));
    out.insert(
        WebConst::RETRIEVE_ORDER_HISTORY,
        get(order::history_handler),
    );
    out.insert(
        WebConst::GENERATE_SALES_REPORT,
        post(report::generate_handler),
    );
    out
}
