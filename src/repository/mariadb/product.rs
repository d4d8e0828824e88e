use std::result::Result as DefaultResult;
use std::sync::Arc;

use async_trait::async_trait;
use sqlx::mysql::{MySqlArguments, MySqlRow};
use sqlx::query::Query;
use sqlx::{Acquire, MySql, Row};

use rust_decimal::Decimal;

use crate::datastore::AppMariaDbStore;
use crate::error::{AppError, AppErrorCode};
use crate::model::ProductModel;
use crate::repository::AbsProductRepo;

use super::run_query_once;

struct InsertUpdateArg(Vec<ProductModel>);
struct FetchByIdArg(Vec<u64>);

impl InsertUpdateArg {
    fn sql_pattern(num_batch: usize) -> String {
        let col_seq = (0..num_batch)
            .map(|_| "(?,?,?,?,?)")
            .collect::<Vec<_>>()
            .join(",");
        format!(
            "INSERT INTO `product`(`id`,`name`,`price`,`image_ref`,`description`) \
             VALUES {col_seq} ON DUPLICATE KEY UPDATE `name`=VALUES(`name`),\
             `price`=VALUES(`price`),`image_ref`=VALUES(`image_ref`),\
             `description`=VALUES(`description`)"
        )
    }
    fn bind_on<'q>(
        self,
        mut query: Query<'q, MySql, MySqlArguments>,
    ) -> Query<'q, MySql, MySqlArguments> {
        for item in self.0 {
            query = query
                .bind(item.id_)
                .bind(item.name)
                .bind(item.price)
                .bind(item.image_ref)
                .bind(item.description);
        }
        query
    }
}

impl FetchByIdArg {
    fn sql_pattern(num_batch: usize) -> String {
        let id_seq = (0..num_batch).map(|_| "?").collect::<Vec<_>>().join(",");
        format!(
            "SELECT `id`,`name`,`price`,`image_ref`,`description` FROM `product` \
             WHERE `id` IN ({id_seq})"
        )
    }
    fn bind_on<'q>(
        self,
        mut query: Query<'q, MySql, MySqlArguments>,
    ) -> Query<'q, MySql, MySqlArguments> {
        for id_ in self.0 {
            query = query.bind(id_);
        }
        query
    }
}

impl TryFrom<MySqlRow> for ProductModel {
    type Error = AppError;
    fn try_from(row: MySqlRow) -> DefaultResult<Self, Self::Error> {
        Ok(Self {
            id_: row.try_get::<u64, usize>(0)?,
            name: row.try_get::<String, usize>(1)?,
            price: row.try_get::<Decimal, usize>(2)?,
            image_ref: row.try_get::<String, usize>(3)?,
            description: row.try_get::<String, usize>(4)?,
        })
    }
}

pub(crate) struct ProductMariaDbRepo {
    _db: Arc<AppMariaDbStore>,
}

#[async_trait]
impl AbsProductRepo for ProductMariaDbRepo {
    async fn save(&self, items: Vec<ProductModel>) -> DefaultResult<usize, AppError> {
        let num = items.len();
        if num == 0 {
            return Ok(0);
        }
        let sql_patt = InsertUpdateArg::sql_pattern(num);
        let mut conn = self._db.acquire().await?;
        let mut tx = conn.begin().await?;
        let query = InsertUpdateArg(items).bind_on(sqlx::query(sql_patt.as_str()));
        // `INSERT ON DUPLICATE KEY UPDATE` reports 1 row affected per
        // insert and 2 per update, skip the count verification here
        let _rs = run_query_once(&mut tx, query, None).await?;
        tx.commit().await?;
        Ok(num)
    }

    async fn fetch(&self, ids: Vec<u64>) -> DefaultResult<Vec<ProductModel>, AppError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql_patt = FetchByIdArg::sql_pattern(ids.len());
        let mut conn = self._db.acquire().await?;
        let query = FetchByIdArg(ids).bind_on(sqlx::query(sql_patt.as_str()));
        let rows = query.fetch_all(&mut *conn).await?;
        rows.into_iter()
            .map(ProductModel::try_from)
            .collect::<DefaultResult<Vec<_>, _>>()
    }

    async fn fetch_all(&self) -> DefaultResult<Vec<ProductModel>, AppError> {
        let sql_patt = "SELECT `id`,`name`,`price`,`image_ref`,`description` FROM `product` \
                        ORDER BY `id` ASC";
        let mut conn = self._db.acquire().await?;
        let rows = sqlx::query(sql_patt).fetch_all(&mut *conn).await?;
        rows.into_iter()
            .map(ProductModel::try_from)
            .collect::<DefaultResult<Vec<_>, _>>()
    }
} // end of impl AbsProductRepo for ProductMariaDbRepo

impl ProductMariaDbRepo {
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
