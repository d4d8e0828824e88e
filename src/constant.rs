use crate::WebApiHdlrLabel;

pub mod app_meta {
    pub const LABEL: &'static str = "flower-delivery";
    pub const MACHINE_CODE: u8 = 1;
    // guest checkouts are attributed to this sentinel account in order history
    pub const GUEST_ACCOUNT: u32 = 0;
}

pub const ENV_VAR_SYS_BASE_PATH: &'static str = "SYS_BASE_PATH";
pub const ENV_VAR_SERVICE_BASE_PATH: &'static str = "SERVICE_BASE_PATH";
pub const ENV_VAR_CONFIG_FILE_PATH: &'static str = "CONFIG_FILE_PATH";

pub const EXPECTED_ENV_VAR_LABELS: [&'static str; 3] = [
    ENV_VAR_SYS_BASE_PATH,
    ENV_VAR_SERVICE_BASE_PATH,
    ENV_VAR_CONFIG_FILE_PATH,
];

pub mod hard_limit {
    pub const MAX_ITEMS_STORED_PER_MODEL: u32 = 2200u32;
    pub const MAX_CART_LINES_PER_REQUEST: usize = 200;
    pub const MAX_DB_CONNECTIONS: u32 = 10000u32;
    pub const MAX_SECONDS_DB_IDLE: u16 = 600u16;
    pub const MAX_NOTIFY_RETRIES: u8 = 1;
    pub const MAX_SECONDS_NOTIFY_WAIT: u16 = 30;
    // flat expense figure applied to every sales report unless the
    // deployment overrides it in the `report` config section
    pub const REPORT_BASE_EXPENSES: i64 = 1000;
    pub const MIN_REVIEW_RATING: u8 = 1;
    pub const MAX_REVIEW_RATING: u8 = 5;
}

pub(crate) mod api {
    use super::WebApiHdlrLabel;

    #[allow(non_camel_case_types)]
    pub(crate) struct web {}

    impl web {
        pub(crate) const SEED_PRODUCTS: WebApiHdlrLabel = "seed_products";
        pub(crate) const LIST_PRODUCTS: WebApiHdlrLabel = "list_products";
        pub(crate) const SUBMIT_PRODUCT_REVIEW: WebApiHdlrLabel = "submit_product_review";
        pub(crate) const LIST_PRODUCT_REVIEWS: WebApiHdlrLabel = "list_product_reviews";
        pub(crate) const RETRIEVE_CART: WebApiHdlrLabel = "retrieve_cart";
        pub(crate) const MODIFY_CART_LINES: WebApiHdlrLabel = "modify_cart_lines";
        pub(crate) const REMOVE_CART_LINE: WebApiHdlrLabel = "remove_cart_line";
        pub(crate) const CHECKOUT_CART: WebApiHdlrLabel = "checkout_cart";
        pub(crate) const TRANSIT_ORDER_STATUS: WebApiHdlrLabel = "transit_order_status";
        pub(crate) const PAYMENT_NOTICE: WebApiHdlrLabel = "payment_notice";
        pub(crate) const REPEAT_ORDER: WebApiHdlrLabel = "repeat_order";
        pub(crate) const RETRIEVE_ORDER_HISTORY: WebApiHdlrLabel = "retrieve_order_history";
        pub(crate) const GENERATE_SALES_REPORT: WebApiHdlrLabel = "generate_sales_report";
    }
} // end of inner-mod api

pub(crate) const HTTP_CONTENT_TYPE_JSON: &str = "application/json";

// http header carrying the session key of a shopper who hasn't signed in
pub(crate) const HTTP_HEADER_GUEST_SESSION: &str = "x-guest-session";

pub(crate) mod logging {
    use serde::Deserialize;

    #[derive(Deserialize)]
    pub enum Level {
        TRACE,
        DEBUG,
        INFO,
        WARNING,
        ERROR,
        FATAL,
    }

    #[derive(Deserialize)]
    #[serde(rename_all = "lowercase")]
    pub enum Destination {
        CONSOLE,
        LOCALFS,
    }
}
