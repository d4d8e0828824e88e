use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize)]
pub struct ProductDto {
    pub id_: u64,
    pub name: String,
    // monetary figures travel as decimal strings to avoid binary
    // floating-point drift on either side
    pub price: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_ref: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductErrorReason {
    EmptyName,
    MalformedPrice,
    NegativePrice,
}

#[derive(Serialize)]
pub struct ProductErrorDto {
    pub id_: u64,
    pub reason: ProductErrorReason,
}

#[derive(Deserialize)]
pub struct ReviewCreateReqDto {
    pub rating: u8,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Serialize)]
pub struct ReviewDto {
    pub rating: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub created_at: String,
}

#[derive(Serialize)]
pub struct ProductReviewsDto {
    pub product_id: u64,
    pub average_rating: String,
    pub reviews: Vec<ReviewDto>,
}

#[derive(Deserialize)]
pub struct CartLineReqDto {
    pub product_id: u64,
    pub quantity: u32,
}

#[derive(Deserialize)]
pub struct CartModifyReqDto {
    pub lines: Vec<CartLineReqDto>,
}

#[derive(Serialize)]
pub struct CartLineDto {
    pub product_id: u64,
    pub quantity: u32,
    pub unit_price: String,
    pub amount: String,
}

#[derive(Serialize)]
pub struct CartDto {
    pub lines: Vec<CartLineDto>,
    pub total_items: u32,
    pub total_price: String,
}

#[derive(Deserialize)]
pub struct GuestContactDto {
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Deserialize)]
pub struct OrderCreateReqDto {
    pub delivery_date: String,
    pub delivery_time: String,
    pub address: String,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub contact: Option<GuestContactDto>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderCreateErrorReason {
    EmptyCart,
    DuplicateOrder,
}

// per-field validation detail, a field is present only when it failed
#[derive(Debug, Serialize, Default)]
pub struct OrderCreateErrorDto {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nonfield: Option<OrderCreateErrorReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

#[derive(Serialize)]
pub struct OrderLineDto {
    pub product_id: u64,
    pub product_name: String,
    pub quantity: u32,
    pub unit_price: String,
    pub amount: String,
}

#[derive(Serialize)]
pub struct OrderReplyDto {
    pub order_id: String,
    pub status: String,
    pub lines: Vec<OrderLineDto>,
    pub total_price: String,
    // false means the order was committed but the push notification
    // could not be delivered in time
    pub notified: bool,
}

#[derive(Deserialize)]
pub struct OrderStatusTransitReqDto {
    pub event: String,
}

#[derive(Serialize)]
pub struct OrderStatusTransitRespDto {
    pub order_id: String,
    pub status: String,
}

#[derive(Deserialize)]
pub struct PaymentNoticeReqDto {
    pub succeeded: bool,
}

#[derive(Serialize)]
pub struct OrderHistoryEntryDto {
    pub entry_id: String,
    pub product_id: u64,
    pub product_name: String,
    pub quantity: u32,
    pub delivery_date: String,
    pub delivery_time: String,
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub cost: String,
    pub completed_at: String,
}

#[derive(Deserialize)]
pub struct SalesReportReqDto {
    pub start_date: String,
    pub end_date: String,
}

#[derive(Serialize)]
pub struct SalesReportDto {
    pub start_date: String,
    pub end_date: String,
    pub total_orders: u32,
    pub total_sales: String,
    pub total_revenue: String,
    pub total_expenses: String,
    pub profit: String,
}
