use std::result::Result as DefaultResult;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime};
use rust_decimal::Decimal;

use crate::api::web::dto::{OrderCreateErrorDto, OrderCreateReqDto, OrderLineDto};
use crate::constant::app_meta;
use crate::error::{AppError, AppErrorCode};
use crate::generate_custom_uid;

use super::{CartModel, ProductModel, ShopperId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Delivered,
    Canceled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatusEvent {
    Confirm,
    MarkDelivered,
    Cancel,
    Reopen,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Delivered => "delivered",
            Self::Canceled => "canceled",
        }
    }
}
impl FromStr for OrderStatus {
    type Err = AppError;
    fn from_str(s: &str) -> DefaultResult<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "delivered" => Ok(Self::Delivered),
            "canceled" => Ok(Self::Canceled),
            _others => Err(AppError {
                code: AppErrorCode::DataCorruption,
                detail: Some(format!("order-status:{s}")),
            }),
        }
    }
}

impl OrderStatusEvent {
    pub fn try_parse(s: &str) -> Option<Self> {
        match s {
            "confirm" => Some(Self::Confirm),
            "mark-delivered" => Some(Self::MarkDelivered),
            "cancel" => Some(Self::Cancel),
            "reopen" => Some(Self::Reopen),
            _others => None,
        }
    }
}

#[derive(Clone)]
pub struct DeliveryModel {
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub address: String,
}

#[derive(Clone)]
pub struct GuestContactModel {
    pub email: Option<String>,
    pub phone: Option<String>,
}

// point-in-time snapshot of a cart line, kept even if the catalog
// item disappears later
#[derive(Clone)]
pub struct OrderLineModel {
    pub product_id: u64,
    pub product_name: String,
    pub image_ref: String,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub amount: Decimal,
}

#[derive(Clone)]
pub struct OrderModel {
    pub id_: String,
    pub owner: ShopperId,
    // exactly one order may ever reference a cart, enforced at the
    // storage layer on creation
    pub cart_id: String,
    pub lines: Vec<OrderLineModel>,
    pub delivery: DeliveryModel,
    pub contact: Option<GuestContactModel>,
    pub status: OrderStatus,
    pub comment: Option<String>,
    pub create_time: DateTime<FixedOffset>,
}

impl TryFrom<&OrderCreateReqDto> for DeliveryModel {
    type Error = OrderCreateErrorDto;
    fn try_from(value: &OrderCreateReqDto) -> DefaultResult<Self, Self::Error> {
        let mut err = OrderCreateErrorDto::default();
        let date = match NaiveDate::parse_from_str(value.delivery_date.as_str(), "%Y-%m-%d") {
            Ok(d) => Some(d),
            Err(e) => {
                err.delivery_date = Some(e.to_string());
                None
            }
        };
        let time = match NaiveTime::parse_from_str(value.delivery_time.as_str(), "%H:%M") {
            Ok(t) => Some(t),
            Err(e) => {
                err.delivery_time = Some(e.to_string());
                None
            }
        };
        let address = value.address.trim();
        if address.is_empty() {
            err.address = Some("empty".to_string());
        }
        if err.delivery_date.is_some() || err.delivery_time.is_some() || err.address.is_some() {
            Err(err)
        } else {
            Ok(Self {
                date: date.unwrap(),
                time: time.unwrap(),
                address: address.to_string(),
            })
        }
    } // end of fn try_from
}

impl From<&OrderLineModel> for OrderLineDto {
    fn from(value: &OrderLineModel) -> Self {
        Self {
            product_id: value.product_id,
            product_name: value.product_name.clone(),
            quantity: value.quantity,
            unit_price: value.unit_price.to_string(),
            amount: value.amount.to_string(),
        }
    }
}

impl OrderModel {
    // snapshot the cart lines, the product lookup supplies name and
    // image which the cart intentionally does not carry
    pub fn from_cart(
        cart: &CartModel,
        products: &[ProductModel],
        delivery: DeliveryModel,
        contact: Option<GuestContactModel>,
        comment: Option<String>,
        time: DateTime<FixedOffset>,
    ) -> DefaultResult<Self, AppError> {
        let mut lines = Vec::with_capacity(cart.saved_lines.len());
        for cline in cart.saved_lines.iter() {
            let product = products
                .iter()
                .find(|p| p.id_ == cline.product_id)
                .ok_or_else(|| AppError {
                    code: AppErrorCode::ProductNotExist,
                    detail: Some(format!("product-id:{}", cline.product_id)),
                })?;
            lines.push(OrderLineModel {
                product_id: cline.product_id,
                product_name: product.name.clone(),
                image_ref: product.image_ref.clone(),
                quantity: cline.qty_req,
                unit_price: cline.unit_price,
                amount: cline.amount(),
            });
        }
        let id_ = generate_custom_uid(app_meta::MACHINE_CODE)
            .simple()
            .to_string();
        Ok(Self {
            id_,
            owner: cart.owner.clone(),
            cart_id: cart.id_.clone(),
            lines,
            delivery,
            contact,
            status: OrderStatus::Pending,
            comment,
            create_time: time,
        })
    } // end of fn from_cart

    // always derived from the line amounts, any stored figure is a cache
    pub fn total_price(&self) -> Decimal {
        self.lines.iter().map(|l| l.amount).sum::<Decimal>()
    }

    pub fn transition(&mut self, event: OrderStatusEvent) -> DefaultResult<OrderStatus, AppError> {
        let next = match (self.status, event) {
            (OrderStatus::Pending, OrderStatusEvent::Confirm) => Some(OrderStatus::Confirmed),
            (OrderStatus::Confirmed, OrderStatusEvent::MarkDelivered) => {
                Some(OrderStatus::Delivered)
            }
            // shortcut for orders confirmed out-of-band, e.g. over the phone
            (OrderStatus::Pending, OrderStatusEvent::MarkDelivered) => {
                Some(OrderStatus::Delivered)
            }
            (OrderStatus::Pending, OrderStatusEvent::Cancel)
            | (OrderStatus::Confirmed, OrderStatusEvent::Cancel) => Some(OrderStatus::Canceled),
            // administrative correction back to the initial state
            (OrderStatus::Confirmed, OrderStatusEvent::Reopen)
            | (OrderStatus::Delivered, OrderStatusEvent::Reopen)
            | (OrderStatus::Canceled, OrderStatusEvent::Reopen) => Some(OrderStatus::Pending),
            _others => None,
        };
        if let Some(s) = next {
            self.status = s;
            Ok(s)
        } else {
            let detail = format!("current:{}, event:{:?}", self.status.as_str(), event);
            Err(AppError {
                code: AppErrorCode::InvalidStatusTransition,
                detail: Some(detail),
            })
        }
    } // end of fn transition

    // caption pushed to the messaging channel right after checkout
    pub fn summary_message(&self) -> String {
        let mut blocks = self
            .lines
            .iter()
            .map(|line| {
                format!(
                    "\u{1f338} Bouquet: {} x {}\n\u{1f4b0} Cost: {}",
                    line.product_name, line.quantity, line.amount
                )
            })
            .collect::<Vec<_>>();
        let comment = self
            .comment
            .clone()
            .unwrap_or_else(|| "No comment".to_string());
        let tail = format!(
            "\u{1f4c5} Delivery date: {}\n\u{1f551} Delivery time: {}\n\u{1f4cd} Address: {}\n\u{1f4ac} Comment: {}",
            self.delivery.date.format("%Y-%m-%d"),
            self.delivery.time.format("%H:%M"),
            self.delivery.address,
            comment,
        );
        blocks.push(tail);
        blocks.join("\n")
    }

    pub fn first_image_ref(&self) -> Option<String> {
        self.lines
            .iter()
            .find(|l| !l.image_ref.is_empty())
            .map(|l| l.image_ref.clone())
    }
} // end of impl OrderModel
