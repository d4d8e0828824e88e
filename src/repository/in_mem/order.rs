use std::boxed::Box;
use std::collections::HashMap;
use std::result::Result as DefaultResult;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime};
use rust_decimal::Decimal;

use crate::datastore::{
    AbsDStoreFilterKeyOp, AbstInMemoryDStore, AppInMemFetchKeys, AppInMemFetchedSingleRow,
    AppInMemFetchedSingleTable,
};
use crate::error::{AppError, AppErrorCode};
use crate::model::{
    DeliveryModel, GuestContactModel, OrderLineModel, OrderModel, OrderStatus, ShopperId,
};
use crate::repository::AbsOrderRepo;

use super::{decode_column, decode_opt_column, encode_opt_column};

#[allow(non_snake_case)]
mod OrderTable {
    use super::{AppInMemFetchedSingleRow, OrderModel};
    pub(super) const LABEL: &'static str = "order_toplvl";

    pub(super) fn to_row(obj: &OrderModel) -> AppInMemFetchedSingleRow {
        let (email, phone) = match obj.contact.as_ref() {
            Some(c) => (
                super::encode_opt_column(&c.email),
                super::encode_opt_column(&c.phone),
            ),
            None => (String::new(), String::new()),
        };
        vec![
            obj.owner.storage_key(),
            obj.cart_id.clone(),
            obj.status.as_str().to_string(),
            obj.create_time.to_rfc3339(),
            obj.delivery.date.format("%Y-%m-%d").to_string(),
            obj.delivery.time.format("%H:%M").to_string(),
            obj.delivery.address.clone(),
            super::encode_opt_column(&obj.comment),
            email,
            phone,
        ]
    }
} // end of inner-mod OrderTable

#[allow(non_snake_case)]
mod OrderLineTable {
    use super::{AppInMemFetchedSingleTable, HashMap, OrderModel};
    pub(super) const LABEL: &'static str = "order_line";

    pub(super) fn pkey(oid: &str, product_id: u64) -> String {
        format!("{oid}/{product_id}")
    }

    pub(super) fn to_table(obj: &OrderModel) -> AppInMemFetchedSingleTable {
        let iter = obj.lines.iter().map(|line| {
            let key = pkey(obj.id_.as_str(), line.product_id);
            let row = vec![
                line.product_name.clone(),
                line.image_ref.clone(),
                line.quantity.to_string(),
                line.unit_price.to_string(),
                line.amount.to_string(),
            ];
            (key, row)
        });
        HashMap::from_iter(iter)
    }
} // end of inner-mod OrderLineTable

// maps a cart id to the single order created from it, insertion into
// this table is the authoritative one-order-per-cart gate
#[allow(non_snake_case)]
mod CartIndexTable {
    pub(super) const LABEL: &'static str = "order_cart_idx";
}

struct LinesOfOrderOp {
    oid: String,
}
impl AbsDStoreFilterKeyOp for LinesOfOrderOp {
    fn filter(&self, k: &String, _v: &Vec<String>) -> bool {
        k.split('/')
            .next()
            .map(|oid| oid == self.oid.as_str())
            .unwrap_or(false)
    }
}

struct CreatedWithinOp {
    start: DateTime<FixedOffset>,
    end: DateTime<FixedOffset>,
}
impl AbsDStoreFilterKeyOp for CreatedWithinOp {
    fn filter(&self, _k: &String, v: &Vec<String>) -> bool {
        v.get(3)
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|t| t >= self.start && t <= self.end)
            .unwrap_or(false)
    }
}

impl TryFrom<(String, Vec<String>)> for OrderLineModel {
    type Error = AppError;
    fn try_from(value: (String, Vec<String>)) -> DefaultResult<Self, Self::Error> {
        let (key, row) = value;
        let product_id = decode_column::<u64>(OrderLineTable::LABEL, key.split('/').nth(1))?;
        Ok(Self {
            product_id,
            product_name: row.first().cloned().unwrap_or_default(),
            image_ref: row.get(1).cloned().unwrap_or_default(),
            quantity: decode_column::<u32>(OrderLineTable::LABEL, row.get(2).map(String::as_str))?,
            unit_price: decode_column::<Decimal>(
                OrderLineTable::LABEL,
                row.get(3).map(String::as_str),
            )?,
            amount: decode_column::<Decimal>(OrderLineTable::LABEL, row.get(4).map(String::as_str))?,
        })
    }
}

fn decode_order(
    oid: String,
    row: &Vec<String>,
    lines: Vec<OrderLineModel>,
) -> DefaultResult<OrderModel, AppError> {
    let corrupted = |d: String| AppError {
        code: AppErrorCode::DataCorruption,
        detail: Some(d),
    };
    let owner_key = row.first().map(String::as_str).unwrap_or("");
    let owner = ShopperId::try_from_storage_key(owner_key)?;
    let status = OrderStatus::from_str(row.get(2).map(String::as_str).unwrap_or(""))?;
    let create_time = DateTime::parse_from_rfc3339(row.get(3).map(String::as_str).unwrap_or(""))
        .map_err(|e| corrupted(format!("order-create-time:{e}")))?;
    let date = NaiveDate::parse_from_str(row.get(4).map(String::as_str).unwrap_or(""), "%Y-%m-%d")
        .map_err(|e| corrupted(format!("order-delivery-date:{e}")))?;
    let time = NaiveTime::parse_from_str(row.get(5).map(String::as_str).unwrap_or(""), "%H:%M")
        .map_err(|e| corrupted(format!("order-delivery-time:{e}")))?;
    let email = decode_opt_column(row.get(8));
    let phone = decode_opt_column(row.get(9));
    let contact = if email.is_some() || phone.is_some() {
        Some(GuestContactModel { email, phone })
    } else {
        None
    };
    Ok(OrderModel {
        id_: oid,
        owner,
        cart_id: row.get(1).cloned().unwrap_or_default(),
        lines,
        delivery: DeliveryModel {
            date,
            time,
            address: row.get(6).cloned().unwrap_or_default(),
        },
        contact,
        status,
        comment: decode_opt_column(row.get(7)),
        create_time,
    })
} // end of fn decode_order

pub struct OrderInMemRepo {
    datastore: Arc<Box<dyn AbstInMemoryDStore>>,
}

#[async_trait]
impl AbsOrderRepo for OrderInMemRepo {
    async fn create(&self, order: OrderModel) -> DefaultResult<(), AppError> {
        let keys: AppInMemFetchKeys = HashMap::from([(
            CartIndexTable::LABEL.to_string(),
            vec![order.cart_id.clone()],
        )]);
        let (fetched, lock) = self.datastore.fetch_acquire(keys).await?;
        let occupied = fetched
            .get(CartIndexTable::LABEL)
            .map(|rows| rows.contains_key(order.cart_id.as_str()))
            .unwrap_or(false);
        if occupied {
            return Err(AppError {
                code: AppErrorCode::DuplicateOrder,
                detail: Some(format!("cart-id:{}", order.cart_id)),
            });
        }
        // index, top-level row and lines land in one locked write, a
        // concurrent creator for the same cart observes all or nothing
        let idx_rows = HashMap::from([(order.cart_id.clone(), vec![order.id_.clone()])]);
        let toplvl_rows = HashMap::from([(order.id_.clone(), OrderTable::to_row(&order))]);
        let line_rows = OrderLineTable::to_table(&order);
        let data = HashMap::from([
            (CartIndexTable::LABEL.to_string(), idx_rows),
            (OrderTable::LABEL.to_string(), toplvl_rows),
            (OrderLineTable::LABEL.to_string(), line_rows),
        ]);
        let _num = self.datastore.save_release(data, lock)?;
        Ok(())
    } // end of fn create

    async fn exists_for_cart(&self, cart_id: &str) -> DefaultResult<bool, AppError> {
        let keys: AppInMemFetchKeys = HashMap::from([(
            CartIndexTable::LABEL.to_string(),
            vec![cart_id.to_string()],
        )]);
        let mut result = self.datastore.fetch(keys).await?;
        let rows = result.remove(CartIndexTable::LABEL).unwrap_or_default();
        Ok(rows.contains_key(cart_id))
    }

    async fn fetch(&self, order_id: &str) -> DefaultResult<OrderModel, AppError> {
        let op = LinesOfOrderOp {
            oid: order_id.to_string(),
        };
        let line_keys = self
            .datastore
            .filter_keys(OrderLineTable::LABEL.to_string(), &op)
            .await?;
        let keys: AppInMemFetchKeys = HashMap::from([
            (OrderTable::LABEL.to_string(), vec![order_id.to_string()]),
            (OrderLineTable::LABEL.to_string(), line_keys),
        ]);
        let mut result = self.datastore.fetch(keys).await?;
        let mut rows_toplvl = result.remove(OrderTable::LABEL).unwrap_or_default();
        let rows_lines = result.remove(OrderLineTable::LABEL).unwrap_or_default();
        let row = rows_toplvl.remove(order_id).ok_or_else(|| AppError {
            code: AppErrorCode::ObjectNotExist,
            detail: Some(format!("order-id:{order_id}")),
        })?;
        let mut lines = rows_lines
            .into_iter()
            .map(OrderLineModel::try_from)
            .collect::<DefaultResult<Vec<_>, _>>()?;
        lines.sort_by_key(|l| l.product_id);
        decode_order(order_id.to_string(), &row, lines)
    } // end of fn fetch

    async fn update_status(
        &self,
        order_id: &str,
        status: OrderStatus,
    ) -> DefaultResult<(), AppError> {
        let keys: AppInMemFetchKeys = HashMap::from([(
            OrderTable::LABEL.to_string(),
            vec![order_id.to_string()],
        )]);
        let (mut fetched, lock) = self.datastore.fetch_acquire(keys).await?;
        let rows = fetched.get_mut(OrderTable::LABEL).ok_or_else(|| AppError {
            code: AppErrorCode::DataTableNotExist,
            detail: Some(OrderTable::LABEL.to_string()),
        })?;
        let row = rows.get_mut(order_id).ok_or_else(|| AppError {
            code: AppErrorCode::ObjectNotExist,
            detail: Some(format!("order-id:{order_id}")),
        })?;
        if let Some(col) = row.get_mut(2) {
            *col = status.as_str().to_string();
        }
        let _num = self.datastore.save_release(fetched, lock)?;
        Ok(())
    }

    async fn fetch_by_created_time(
        &self,
        start: DateTime<FixedOffset>,
        end: DateTime<FixedOffset>,
    ) -> DefaultResult<Vec<OrderModel>, AppError> {
        let op = CreatedWithinOp { start, end };
        let oids = self
            .datastore
            .filter_keys(OrderTable::LABEL.to_string(), &op)
            .await?;
        let mut out = Vec::with_capacity(oids.len());
        for oid in oids {
            let obj = self.fetch(oid.as_str()).await?;
            out.push(obj);
        }
        out.sort_by(|a, b| a.create_time.cmp(&b.create_time));
        Ok(out)
    }
} // end of impl AbsOrderRepo for OrderInMemRepo

impl OrderInMemRepo {
    pub async fn new(m: Arc<Box<dyn AbstInMemoryDStore>>) -> DefaultResult<Self, AppError> {
        m.create_table(OrderTable::LABEL).await?;
        m.create_table(OrderLineTable::LABEL).await?;
        m.create_table(CartIndexTable::LABEL).await?;
        Ok(Self { datastore: m })
    }
}
