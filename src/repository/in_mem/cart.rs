use std::boxed::Box;
use std::collections::HashMap;
use std::result::Result as DefaultResult;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::DateTime;
use rust_decimal::Decimal;

use crate::datastore::{
    AbsDStoreFilterKeyOp, AbstInMemoryDStore, AppInMemFetchKeys, AppInMemFetchedSingleRow,
    AppInMemFetchedSingleTable,
};
use crate::error::{AppError, AppErrorCode};
use crate::model::{CartLineModel, CartModel, ShopperId};
use crate::repository::AbsCartRepo;

use super::decode_column;

#[allow(non_snake_case)]
mod CartTable {
    use super::{AppInMemFetchedSingleRow, AppInMemFetchedSingleTable, CartModel, HashMap};
    pub(super) const LABEL: &'static str = "cart_toplvl";
    pub(super) struct UpdateArg<'a>(pub(super) &'a CartModel);

    // one open cart per shopper, the shopper key is the primary key
    pub(super) fn pkey(owner_key: &str) -> String {
        owner_key.to_string()
    }

    impl Into<AppInMemFetchedSingleRow> for UpdateArg<'_> {
        fn into(self) -> AppInMemFetchedSingleRow {
            let obj = self.0;
            vec![
                obj.id_.clone(),
                obj.create_time.to_rfc3339(),
                if obj.closed { "1" } else { "0" }.to_string(),
            ]
        }
    }
    impl Into<AppInMemFetchedSingleTable> for UpdateArg<'_> {
        fn into(self) -> AppInMemFetchedSingleTable {
            let key = pkey(self.0.owner.storage_key().as_str());
            let value: AppInMemFetchedSingleRow = self.into();
            HashMap::from([(key, value)])
        }
    }
} // end of inner-mod CartTable

#[allow(non_snake_case)]
mod CartLineTable {
    use super::{AppInMemFetchedSingleTable, CartModel, HashMap};
    pub(super) const LABEL: &'static str = "cart_line";
    pub(super) struct UpdateArg<'a>(pub(super) &'a CartModel);

    pub(super) fn pkey(cart_id: &str, product_id: u64) -> String {
        format!("{cart_id}/{product_id}")
    }

    impl Into<AppInMemFetchedSingleTable> for UpdateArg<'_> {
        fn into(self) -> AppInMemFetchedSingleTable {
            let cart_id = self.0.id_.as_str();
            let iter = self.0.saved_lines.iter().map(|line| {
                let key = pkey(cart_id, line.product_id);
                let row = vec![line.qty_req.to_string(), line.unit_price.to_string()];
                (key, row)
            });
            HashMap::from_iter(iter)
        }
    }
} // end of inner-mod CartLineTable

struct LinesOfCartOp {
    cart_id: String,
}
impl AbsDStoreFilterKeyOp for LinesOfCartOp {
    fn filter(&self, k: &String, _v: &Vec<String>) -> bool {
        k.split('/')
            .next()
            .map(|cid| cid == self.cart_id.as_str())
            .unwrap_or(false)
    }
}

impl TryFrom<(String, Vec<String>)> for CartLineModel {
    type Error = AppError;
    fn try_from(value: (String, Vec<String>)) -> DefaultResult<Self, Self::Error> {
        let (key, row) = value;
        let product_id = decode_column::<u64>(CartLineTable::LABEL, key.split('/').nth(1))?;
        let qty_req = decode_column::<u32>(CartLineTable::LABEL, row.first().map(String::as_str))?;
        let unit_price =
            decode_column::<Decimal>(CartLineTable::LABEL, row.get(1).map(String::as_str))?;
        Ok(Self {
            product_id,
            unit_price,
            qty_req,
        })
    }
}

fn decode_cart(
    owner: &ShopperId,
    row: &Vec<String>,
    lines: Vec<CartLineModel>,
) -> DefaultResult<CartModel, AppError> {
    let id_ = row.first().cloned().ok_or_else(|| AppError {
        code: AppErrorCode::DataCorruption,
        detail: Some("cart-missing-id".to_string()),
    })?;
    let raw_ctime = row.get(1).map(String::as_str).unwrap_or("");
    let create_time = DateTime::parse_from_rfc3339(raw_ctime).map_err(|e| AppError {
        code: AppErrorCode::DataCorruption,
        detail: Some(format!("cart-create-time:{e}")),
    })?;
    let closed = row.get(2).map(|c| c == "1").unwrap_or(false);
    Ok(CartModel {
        id_,
        owner: owner.clone(),
        create_time,
        saved_lines: lines,
        closed,
    })
}

pub struct CartInMemRepo {
    datastore: Arc<Box<dyn AbstInMemoryDStore>>,
}

#[async_trait]
impl AbsCartRepo for CartInMemRepo {
    async fn fetch_or_create(&self, owner: &ShopperId) -> DefaultResult<CartModel, AppError> {
        let owner_key = owner.storage_key();
        // learn the current cart id first so its line rows can be loaded
        // together with the top-level row inside the locked read below
        let line_keys = match self.current_cart_id(owner_key.as_str()).await? {
            Some(cart_id) => self.line_keys_of(cart_id.as_str()).await?,
            None => Vec::new(),
        };
        let keys: AppInMemFetchKeys = HashMap::from([
            (CartTable::LABEL.to_string(), vec![owner_key.clone()]),
            (CartLineTable::LABEL.to_string(), line_keys),
        ]);
        let (mut fetched, lock) = self.datastore.fetch_acquire(keys).await?;
        let rows_toplvl = fetched.remove(CartTable::LABEL).unwrap_or_default();
        let maybe_open = if let Some(row) = rows_toplvl.get(owner_key.as_str()) {
            let is_closed = row.get(2).map(|c| c == "1").unwrap_or(false);
            if is_closed {
                None
            } else {
                Some(row.clone())
            }
        } else {
            None
        };
        if let Some(row) = maybe_open {
            drop(lock);
            let cart_id = row.first().cloned().unwrap_or_default();
            let rows_lines = fetched.remove(CartLineTable::LABEL).unwrap_or_default();
            let lines = rows_lines
                .into_iter()
                .filter(|(k, _v)| k.starts_with(&format!("{cart_id}/")))
                .map(CartLineModel::try_from)
                .collect::<DefaultResult<Vec<_>, _>>()?;
            decode_cart(owner, &row, lines)
        } else {
            // absent or closed, a fresh cart replaces the top-level row,
            // written while the lock from the read above is still held
            let obj = CartModel::new(owner.clone());
            let rows0 = CartTable::UpdateArg(&obj).into();
            let data = HashMap::from([(CartTable::LABEL.to_string(), rows0)]);
            let _num = self.datastore.save_release(data, lock)?;
            Ok(obj)
        }
    } // end of fn fetch_or_create

    async fn update(&self, obj: CartModel) -> DefaultResult<usize, AppError> {
        // line rows removed from the model have to disappear from the
        // table as well, stale keys are deleted before the write
        let curr_keys = self.line_keys_of(obj.id_.as_str()).await?;
        let kept = obj
            .saved_lines
            .iter()
            .map(|l| CartLineTable::pkey(obj.id_.as_str(), l.product_id))
            .collect::<Vec<_>>();
        let stale = curr_keys
            .into_iter()
            .filter(|k| !kept.contains(k))
            .collect::<Vec<_>>();
        if !stale.is_empty() {
            let info = HashMap::from([(CartLineTable::LABEL.to_string(), stale)]);
            let _num = self.datastore.delete(info).await?;
        }
        let rows0 = CartTable::UpdateArg(&obj).into();
        let rows1 = CartLineTable::UpdateArg(&obj).into();
        let data = HashMap::from([
            (CartTable::LABEL.to_string(), rows0),
            (CartLineTable::LABEL.to_string(), rows1),
        ]);
        let num_saved = self.datastore.save(data).await?;
        Ok(num_saved)
    } // end of fn update

    async fn discard(&self, owner: &ShopperId, cart_id: &str) -> DefaultResult<(), AppError> {
        let owner_key = owner.storage_key();
        let line_keys = self.line_keys_of(cart_id).await?;
        // the top-level row goes away only while it still references the
        // same cart, the shopper may have opened a newer one meanwhile
        let toplvl_keys = match self.current_cart_id(owner_key.as_str()).await? {
            Some(curr) if curr == cart_id => vec![CartTable::pkey(owner_key.as_str())],
            _others => Vec::new(),
        };
        let info = HashMap::from([
            (CartTable::LABEL.to_string(), toplvl_keys),
            (CartLineTable::LABEL.to_string(), line_keys),
        ]);
        let _num_affected = self.datastore.delete(info).await?;
        Ok(())
    }
} // end of impl AbsCartRepo for CartInMemRepo

impl CartInMemRepo {
    pub async fn new(m: Arc<Box<dyn AbstInMemoryDStore>>) -> DefaultResult<Self, AppError> {
        m.create_table(CartTable::LABEL).await?;
        m.create_table(CartLineTable::LABEL).await?;
        Ok(Self { datastore: m })
    }

    async fn current_cart_id(&self, owner_key: &str) -> DefaultResult<Option<String>, AppError> {
        let keys: AppInMemFetchKeys = HashMap::from([(
            CartTable::LABEL.to_string(),
            vec![CartTable::pkey(owner_key)],
        )]);
        let mut result = self.datastore.fetch(keys).await?;
        let rows = result.remove(CartTable::LABEL).unwrap_or_default();
        let out = rows
            .into_iter()
            .next()
            .and_then(|(_k, row)| row.first().cloned());
        Ok(out)
    }

    async fn line_keys_of(&self, cart_id: &str) -> DefaultResult<Vec<String>, AppError> {
        let op = LinesOfCartOp {
            cart_id: cart_id.to_string(),
        };
        self.datastore
            .filter_keys(CartLineTable::LABEL.to_string(), &op)
            .await
    }
} // end of impl CartInMemRepo
