use std::result::Result as DefaultResult;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use sqlx::mysql::{MySqlArguments, MySqlRow};
use sqlx::query::Query;
use sqlx::{Acquire, MySql, Row};

use crate::datastore::AppMariaDbStore;
use crate::error::{AppError, AppErrorCode};
use crate::model::{
    DeliveryModel, GuestContactModel, OrderLineModel, OrderModel, OrderStatus, ShopperId,
};
use crate::repository::AbsOrderRepo;

use super::{run_query_once, OidBytes};

struct InsertTopLvlArg<'a>(&'a OrderModel, OidBytes, OidBytes);
struct InsertLinesArg<'a>(&'a OidBytes, &'a Vec<OrderLineModel>);

impl<'a> InsertTopLvlArg<'a> {
    const SQL_PATT: &'static str =
        "INSERT INTO `order_toplvl`(`o_id`,`shopper`,`cart_id`,`status`,`created_at`,\
         `delivery_date`,`delivery_time`,`address`,`comment`,`contact_email`,\
         `contact_phone`) VALUES (?,?,?,?,?,?,?,?,?,?,?)";

    fn bind_on(self, query: Query<'a, MySql, MySqlArguments>) -> Query<'a, MySql, MySqlArguments> {
        let obj = self.0;
        let (email, phone) = match obj.contact.as_ref() {
            Some(c) => (c.email.clone(), c.phone.clone()),
            None => (None, None),
        };
        query
            .bind(self.1.as_column())
            .bind(obj.owner.storage_key())
            .bind(self.2.as_column())
            .bind(obj.status.as_str())
            .bind(obj.create_time.naive_utc())
            .bind(obj.delivery.date)
            .bind(obj.delivery.time)
            .bind(obj.delivery.address.clone())
            .bind(obj.comment.clone())
            .bind(email)
            .bind(phone)
    }
}

impl<'a> InsertLinesArg<'a> {
    fn sql_pattern(num_batch: usize) -> String {
        let col_seq = (0..num_batch)
            .map(|_| "(?,?,?,?,?,?,?)")
            .collect::<Vec<_>>()
            .join(",");
        format!(
            "INSERT INTO `order_line`(`o_id`,`product_id`,`product_name`,`image_ref`,\
             `quantity`,`unit_price`,`amount`) VALUES {col_seq}"
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
                .bind(line.product_name.clone())
                .bind(line.image_ref.clone())
                .bind(line.quantity)
                .bind(line.unit_price)
                .bind(line.amount);
        }
        query
    }
}

impl TryFrom<MySqlRow> for OrderLineModel {
    type Error = AppError;
    fn try_from(row: MySqlRow) -> DefaultResult<Self, Self::Error> {
        Ok(Self {
            product_id: row.try_get::<u64, usize>(0)?,
            product_name: row.try_get::<String, usize>(1)?,
            image_ref: row.try_get::<String, usize>(2)?,
            quantity: row.try_get::<u32, usize>(3)?,
            unit_price: row.try_get::<Decimal, usize>(4)?,
            amount: row.try_get::<Decimal, usize>(5)?,
        })
    }
}

fn decode_toplvl_row(oid: String, row: &MySqlRow) -> DefaultResult<OrderModel, AppError> {
    let owner_key = row.try_get::<String, usize>(0)?;
    let owner = ShopperId::try_from_storage_key(owner_key.as_str())?;
    let cart_id = OidBytes::to_app_oid(row, 1)?;
    let status_raw = row.try_get::<String, usize>(2)?;
    let status = OrderStatus::from_str(status_raw.as_str())?;
    let ctime = row.try_get::<NaiveDateTime, usize>(3)?;
    let email = row.try_get::<Option<String>, usize>(7)?;
    let phone = row.try_get::<Option<String>, usize>(8)?;
    let contact = if email.is_some() || phone.is_some() {
        Some(GuestContactModel { email, phone })
    } else {
        None
    };
    Ok(OrderModel {
        id_: oid,
        owner,
        cart_id,
        lines: Vec::new(),
        delivery: DeliveryModel {
            date: row.try_get::<NaiveDate, usize>(4)?,
            time: row.try_get::<NaiveTime, usize>(5)?,
            address: row.try_get::<String, usize>(6)?,
        },
        contact,
        status,
        comment: row.try_get::<Option<String>, usize>(9)?,
        create_time: DateTime::<Utc>::from_naive_utc_and_offset(ctime, Utc).fixed_offset(),
    })
} // end of fn decode_toplvl_row

pub(crate) struct OrderMariaDbRepo {
    _db: Arc<AppMariaDbStore>,
}

#[async_trait]
impl AbsOrderRepo for OrderMariaDbRepo {
    async fn create(&self, order: OrderModel) -> DefaultResult<(), AppError> {
        let oid = OidBytes::try_from(order.id_.as_str())?;
        let cart_oid = OidBytes::try_from(order.cart_id.as_str())?;
        let line_oid = OidBytes::try_from(order.id_.as_str())?;
        let mut conn = self._db.acquire().await?;
        let mut tx = conn.begin().await?;
        // the unique index on `cart_id` is the one-order-per-cart gate,
        // the loser of a concurrent insert sees a duplicate-key error
        let arg = InsertTopLvlArg(&order, oid, cart_oid);
        let query = arg.bind_on(sqlx::query(InsertTopLvlArg::SQL_PATT));
        if let Err(e) = query.execute(&mut *tx).await {
            let duplicated = e
                .as_database_error()
                .map(|de| de.is_unique_violation())
                .unwrap_or(false);
            return Err(if duplicated {
                AppError {
                    code: AppErrorCode::DuplicateOrder,
                    detail: Some(format!("cart-id:{}", order.cart_id)),
                }
            } else {
                AppError::from(e)
            });
        }
        let num_lines = order.lines.len();
        let sql_patt = InsertLinesArg::sql_pattern(num_lines);
        let arg = InsertLinesArg(&line_oid, &order.lines);
        let query = arg.bind_on(sqlx::query(sql_patt.as_str()));
        let _rs = run_query_once(&mut tx, query, Some(num_lines)).await?;
        tx.commit().await?;
        Ok(())
    } // end of fn create

    async fn exists_for_cart(&self, cart_id: &str) -> DefaultResult<bool, AppError> {
        let cart_oid = OidBytes::try_from(cart_id)?;
        let sql_patt = "SELECT COUNT(*) FROM `order_toplvl` WHERE `cart_id`=?";
        let mut conn = self._db.acquire().await?;
        let query = sqlx::query(sql_patt).bind(cart_oid.as_column());
        let row = query.fetch_one(&mut *conn).await?;
        let count = row.try_get::<i64, usize>(0)?;
        Ok(count > 0)
    }

    async fn fetch(&self, order_id: &str) -> DefaultResult<OrderModel, AppError> {
        let oid = OidBytes::try_from(order_id)?;
        let mut conn = self._db.acquire().await?;
        let sql_patt = "SELECT `shopper`,`cart_id`,`status`,`created_at`,`delivery_date`,\
                        `delivery_time`,`address`,`contact_email`,`contact_phone`,`comment` \
                        FROM `order_toplvl` WHERE `o_id`=?";
        let query = sqlx::query(sql_patt).bind(oid.as_column());
        let row = query
            .fetch_optional(&mut *conn)
            .await?
            .ok_or_else(|| AppError {
                code: AppErrorCode::ObjectNotExist,
                detail: Some(format!("order-id:{order_id}")),
            })?;
        let mut obj = decode_toplvl_row(order_id.to_string(), &row)?;
        let sql_patt = "SELECT `product_id`,`product_name`,`image_ref`,`quantity`,\
                        `unit_price`,`amount` FROM `order_line` WHERE `o_id`=? \
                        ORDER BY `product_id` ASC";
        let query = sqlx::query(sql_patt).bind(oid.as_column());
        let rows = query.fetch_all(&mut *conn).await?;
        obj.lines = rows
            .into_iter()
            .map(OrderLineModel::try_from)
            .collect::<DefaultResult<Vec<_>, _>>()?;
        Ok(obj)
    } // end of fn fetch

    async fn update_status(
        &self,
        order_id: &str,
        status: OrderStatus,
    ) -> DefaultResult<(), AppError> {
        let oid = OidBytes::try_from(order_id)?;
        let mut conn = self._db.acquire().await?;
        let mut tx = conn.begin().await?;
        let sql_patt = "SELECT COUNT(*) FROM `order_toplvl` WHERE `o_id`=? FOR UPDATE";
        let query = sqlx::query(sql_patt).bind(oid.as_column());
        let row = query.fetch_one(&mut *tx).await?;
        if row.try_get::<i64, usize>(0)? == 0 {
            return Err(AppError {
                code: AppErrorCode::ObjectNotExist,
                detail: Some(format!("order-id:{order_id}")),
            });
        }
        let sql_patt = "UPDATE `order_toplvl` SET `status`=? WHERE `o_id`=?";
        let query = sqlx::query(sql_patt)
            .bind(status.as_str())
            .bind(oid.as_column());
        let _rs = run_query_once(&mut tx, query, None).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn fetch_by_created_time(
        &self,
        start: DateTime<FixedOffset>,
        end: DateTime<FixedOffset>,
    ) -> DefaultResult<Vec<OrderModel>, AppError> {
        let sql_patt = "SELECT `o_id` FROM `order_toplvl` WHERE `created_at` >= ? \
                        AND `created_at` <= ? ORDER BY `created_at` ASC";
        let oids = {
            let mut conn = self._db.acquire().await?;
            let query = sqlx::query(sql_patt)
                .bind(start.naive_utc())
                .bind(end.naive_utc());
            let rows = query.fetch_all(&mut *conn).await?;
            rows.iter()
                .map(|row| OidBytes::to_app_oid(row, 0))
                .collect::<DefaultResult<Vec<_>, _>>()?
        };
        let mut out = Vec::with_capacity(oids.len());
        for oid in oids {
            let obj = self.fetch(oid.as_str()).await?;
            out.push(obj);
        }
        Ok(out)
    }
} // end of impl AbsOrderRepo for OrderMariaDbRepo

impl OrderMariaDbRepo {
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
