use std::result::Result as DefaultResult;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::mysql::{MySqlArguments, MySqlRow};
use sqlx::query::Query;
use sqlx::{Acquire, MySql, Row};

use crate::datastore::AppMariaDbStore;
use crate::error::{AppError, AppErrorCode};
use crate::model::{CartLineModel, CartModel, ShopperId};
use crate::repository::AbsCartRepo;

use super::{run_query_once, OidBytes};

struct InsertUpdateTopLvlArg<'a>(&'a CartModel, OidBytes);
struct UpsertLinesArg<'a>(&'a OidBytes, &'a Vec<CartLineModel>);
struct DeleteStaleLinesArg<'a>(&'a OidBytes, Vec<u64>);

impl<'a> InsertUpdateTopLvlArg<'a> {
    const SQL_PATT: &'static str =
        "INSERT INTO `cart_toplvl`(`shopper`,`cart_id`,`created_at`,`closed`) \
         VALUES (?,?,?,?) ON DUPLICATE KEY UPDATE `cart_id`=VALUES(`cart_id`),\
         `created_at`=VALUES(`created_at`),`closed`=VALUES(`closed`)";

    fn bind_on(self, query: Query<'a, MySql, MySqlArguments>) -> Query<'a, MySql, MySqlArguments> {
        query
            .bind(self.0.owner.storage_key())
            .bind(self.1.as_column())
            .bind(self.0.create_time.naive_utc())
            .bind(self.0.closed)
    }
}

impl<'a> UpsertLinesArg<'a> {
    fn sql_pattern(num_batch: usize) -> String {
        let col_seq = (0..num_batch)
            .map(|_| "(?,?,?,?)")
            .collect::<Vec<_>>()
            .join(",");
        format!(
            "INSERT INTO `cart_line`(`cart_id`,`product_id`,`quantity`,`unit_price`) \
             VALUES {col_seq} ON DUPLICATE KEY UPDATE `quantity`=VALUES(`quantity`),\
             `unit_price`=VALUES(`unit_price`)"
        )
    }
    fn bind_on(
        self,
        mut query: Query<'a, MySql, MySqlArguments>,
    ) -> Query<'a, MySql, MySqlArguments> {
        for line in self.1 {
            query = query
                .bind(self.0.as_column())
                .bind(line.product_id)
                .bind(line.qty_req)
                .bind(line.unit_price);
        }
        query
    }
}

impl<'a> DeleteStaleLinesArg<'a> {
    fn sql_pattern(num_kept: usize) -> String {
        let mut sql_patt = "DELETE FROM `cart_line` WHERE `cart_id`=?".to_string();
        if num_kept > 0 {
            let id_seq = (0..num_kept).map(|_| "?").collect::<Vec<_>>().join(",");
            sql_patt += format!(" AND `product_id` NOT IN ({id_seq})").as_str();
        }
        sql_patt
    }
    fn bind_on(
        self,
        mut query: Query<'a, MySql, MySqlArguments>,
    ) -> Query<'a, MySql, MySqlArguments> {
        query = query.bind(self.0.as_column());
        for product_id in self.1 {
            query = query.bind(product_id);
        }
        query
    }
}

impl TryFrom<MySqlRow> for CartLineModel {
    type Error = AppError;
    fn try_from(row: MySqlRow) -> DefaultResult<Self, Self::Error> {
        Ok(Self {
            product_id: row.try_get::<u64, usize>(0)?,
            qty_req: row.try_get::<u32, usize>(1)?,
            unit_price: row.try_get::<Decimal, usize>(2)?,
        })
    }
}

fn decode_toplvl_row(owner: &ShopperId, row: &MySqlRow) -> DefaultResult<CartModel, AppError> {
    let id_ = OidBytes::to_app_oid(row, 0)?;
    let ctime = row.try_get::<chrono::NaiveDateTime, usize>(1)?;
    let closed = row.try_get::<bool, usize>(2)?;
    Ok(CartModel {
        id_,
        owner: owner.clone(),
        create_time: DateTime::<Utc>::from_naive_utc_and_offset(ctime, Utc).fixed_offset(),
        saved_lines: Vec::new(),
        closed,
    })
}

pub(crate) struct CartMariaDbRepo {
    _db: Arc<AppMariaDbStore>,
}

#[async_trait]
impl AbsCartRepo for CartMariaDbRepo {
    async fn fetch_or_create(&self, owner: &ShopperId) -> DefaultResult<CartModel, AppError> {
        let mut conn = self._db.acquire().await?;
        let mut tx = conn.begin().await?;
        // the row lock held until commit keeps two concurrent callers
        // from materialising two open carts for the same shopper
        let sql_patt = "SELECT `cart_id`,`created_at`,`closed` FROM `cart_toplvl` \
                        WHERE `shopper`=? FOR UPDATE";
        let query = sqlx::query(sql_patt).bind(owner.storage_key());
        let maybe_row = query.fetch_optional(&mut *tx).await?;
        let maybe_open = match maybe_row {
            Some(row) => {
                let obj = decode_toplvl_row(owner, &row)?;
                if obj.closed {
                    None
                } else {
                    Some(obj)
                }
            }
            None => None,
        };
        let out = if let Some(mut obj) = maybe_open {
            let oid = OidBytes::try_from(obj.id_.as_str())?;
            let sql_patt = "SELECT `product_id`,`quantity`,`unit_price` FROM `cart_line` \
                            WHERE `cart_id`=? ORDER BY `product_id` ASC";
            let query = sqlx::query(sql_patt).bind(oid.as_column());
            let rows = query.fetch_all(&mut *tx).await?;
            obj.saved_lines = rows
                .into_iter()
                .map(CartLineModel::try_from)
                .collect::<DefaultResult<Vec<_>, _>>()?;
            obj
        } else {
            let obj = CartModel::new(owner.clone());
            let oid = OidBytes::try_from(obj.id_.as_str())?;
            let arg = InsertUpdateTopLvlArg(&obj, oid);
            let query = arg.bind_on(sqlx::query(InsertUpdateTopLvlArg::SQL_PATT));
            let _rs = run_query_once(&mut tx, query, None).await?;
            obj
        };
        tx.commit().await?;
        Ok(out)
    } // end of fn fetch_or_create

    async fn update(&self, obj: CartModel) -> DefaultResult<usize, AppError> {
        let num_lines = obj.saved_lines.len();
        let oid = OidBytes::try_from(obj.id_.as_str())?;
        let mut conn = self._db.acquire().await?;
        let mut tx = conn.begin().await?;
        {
            let oid2 = OidBytes::try_from(obj.id_.as_str())?;
            let arg = InsertUpdateTopLvlArg(&obj, oid2);
            let query = arg.bind_on(sqlx::query(InsertUpdateTopLvlArg::SQL_PATT));
            let _rs = run_query_once(&mut tx, query, None).await?;
        }
        let kept = obj
            .saved_lines
            .iter()
            .map(|l| l.product_id)
            .collect::<Vec<_>>();
        let sql_patt = DeleteStaleLinesArg::sql_pattern(kept.len());
        let query = DeleteStaleLinesArg(&oid, kept).bind_on(sqlx::query(sql_patt.as_str()));
        let _rs = run_query_once(&mut tx, query, None).await?;
        if !obj.saved_lines.is_empty() {
            let sql_patt = UpsertLinesArg::sql_pattern(num_lines);
            let arg = UpsertLinesArg(&oid, &obj.saved_lines);
            let query = arg.bind_on(sqlx::query(sql_patt.as_str()));
            let _rs = run_query_once(&mut tx, query, None).await?;
        }
        tx.commit().await?;
        Ok(num_lines)
    } // end of fn update

    async fn discard(&self, owner: &ShopperId, cart_id: &str) -> DefaultResult<(), AppError> {
        let oid = OidBytes::try_from(cart_id)?;
        let mut conn = self._db.acquire().await?;
        let mut tx = conn.begin().await?;
        let sql_patt = "DELETE FROM `cart_line` WHERE `cart_id`=?";
        let query = sqlx::query(sql_patt).bind(oid.as_column());
        let _rs = run_query_once(&mut tx, query, None).await?;
        // a newer cart of the same shopper keeps its top-level row, the
        // delete matches on both columns
        let sql_patt = "DELETE FROM `cart_toplvl` WHERE `shopper`=? AND `cart_id`=?";
        let query = sqlx::query(sql_patt)
            .bind(owner.storage_key())
            .bind(oid.as_column());
        let _rs = run_query_once(&mut tx, query, None).await?;
        tx.commit().await?;
        Ok(())
    }
} // end of impl AbsCartRepo for CartMariaDbRepo

impl CartMariaDbRepo {
    pub(crate) fn new(dbs: Vec<Arc<AppMariaDbStore>>) -> DefaultResult<Self, AppError> {
        if let Some(_db) = dbs.into_iter().next() {
            Ok(Self { _db })
        } else {
            Err(AppError {
                code: AppErrorCode::MissingDataStore,
                detail: Some("mariadb".to_string()),
            })
        }
    }
}
