use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime};
use rust_decimal::Decimal;

use crate::api::web::dto::OrderHistoryEntryDto;
use crate::constant::app_meta;
use crate::generate_custom_uid;

use super::OrderModel;

// immutable record written once per order line at checkout, it backs
// the repeat-order feature independently of the order and cart rows
pub struct OrderHistoryModel {
    pub id_: String,
    pub account: u32,
    pub product_id: u64,
    pub product_name: String,
    pub quantity: u32,
    pub delivery_date: NaiveDate,
    pub delivery_time: NaiveTime,
    pub address: String,
    pub comment: Option<String>,
    pub cost: Decimal,
    pub completed_at: DateTime<FixedOffset>,
}

impl OrderHistoryModel {
    pub fn from_order(order: &OrderModel) -> Vec<Self> {
        let account = order.owner.history_account();
        order
            .lines
            .iter()
            .map(|line| Self {
                id_: generate_custom_uid(app_meta::MACHINE_CODE)
                    .simple()
                    .to_string(),
                account,
                product_id: line.product_id,
                product_name: line.product_name.clone(),
                quantity: line.quantity,
                delivery_date: order.delivery.date,
                delivery_time: order.delivery.time,
                address: order.delivery.address.clone(),
                comment: order.comment.clone(),
                cost: line.amount,
                completed_at: order.create_time,
            })
            .collect()
    }
}

impl From<&OrderHistoryModel> for OrderHistoryEntryDto {
    fn from(value: &OrderHistoryModel) -> Self {
        Self {
            entry_id: value.id_.clone(),
            product_id: value.product_id,
            product_name: value.product_name.clone(),
            quantity: value.quantity,
            delivery_date: value.delivery_date.format("%Y-%m-%d").to_string(),
            delivery_time: value.delivery_time.format("%H:%M").to_string(),
            address: value.address.clone(),
            comment: value.comment.clone(),
            cost: value.cost.to_string(),
            completed_at: value.completed_at.to_rfc3339(),
        }
    }
}
