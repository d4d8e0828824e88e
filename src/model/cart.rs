use chrono::{DateTime, FixedOffset, Local as LocalTime};
use rust_decimal::Decimal;

use crate::api::web::dto::{CartDto, CartLineDto};
use crate::constant::app_meta;
use crate::generate_custom_uid;

use super::{ProductModel, ShopperId};

pub struct CartLineModel {
    pub product_id: u64,
    // catalog price recorded when the line was first added, catalog
    // items never change price so this acts as a read cache
    pub unit_price: Decimal,
    pub qty_req: u32,
}

pub struct CartModel {
    pub id_: String,
    pub owner: ShopperId,
    pub create_time: DateTime<FixedOffset>,
    pub saved_lines: Vec<CartLineModel>,
    // set once an order has been finalized against this cart, a closed
    // cart no longer counts as the owner's open cart
    pub closed: bool,
}

impl CartLineModel {
    pub fn amount(&self) -> Decimal {
        self.unit_price * Decimal::from(self.qty_req)
    }
}

impl From<&CartLineModel> for CartLineDto {
    fn from(value: &CartLineModel) -> Self {
        Self {
            product_id: value.product_id,
            quantity: value.qty_req,
            unit_price: value.unit_price.to_string(),
            amount: value.amount().to_string(),
        }
    }
}

impl From<&CartModel> for CartDto {
    fn from(value: &CartModel) -> Self {
        Self {
            lines: value.saved_lines.iter().map(CartLineDto::from).collect(),
            total_items: value.total_items(),
            total_price: value.total_price().to_string(),
        }
    }
}

impl CartModel {
    pub fn new(owner: ShopperId) -> Self {
        let id_ = generate_custom_uid(app_meta::MACHINE_CODE)
            .simple()
            .to_string();
        Self {
            id_,
            owner,
            create_time: LocalTime::now().fixed_offset(),
            saved_lines: Vec::new(),
            closed: false,
        }
    }

    // adding a product already present merges into the existing line
    // by accumulating quantity, one line per product is the invariant
    pub fn add_line(&mut self, product: &ProductModel, quantity: u32) {
        let found = self
            .saved_lines
            .iter_mut()
            .find(|line| line.product_id == product.id_);
        if let Some(line) = found {
            line.qty_req += quantity;
        } else {
            self.saved_lines.push(CartLineModel {
                product_id: product.id_,
                unit_price: product.price,
                qty_req: quantity,
            });
        }
    }

    // reports whether anything was actually removed, absent lines
    // leave the cart untouched
    pub fn remove_line(&mut self, product_id: u64) -> bool {
        let pos = self
            .saved_lines
            .iter()
            .position(|line| line.product_id == product_id);
        if let Some(idx) = pos {
            let _line = self.saved_lines.remove(idx);
            true
        } else {
            false
        }
    }

    pub fn total_price(&self) -> Decimal {
        self.saved_lines
            .iter()
            .map(CartLineModel::amount)
            .sum::<Decimal>()
    }

    pub fn total_items(&self) -> u32 {
        self.saved_lines.iter().map(|line| line.qty_req).sum()
    }
} // end of impl CartModel
