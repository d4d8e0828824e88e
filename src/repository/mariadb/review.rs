use std::result::Result as DefaultResult;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::mysql::MySqlRow;
use sqlx::{Acquire, Row};

use crate::datastore::AppMariaDbStore;
use crate::error::{AppError, AppErrorCode};
use crate::model::ProductReviewModel;
use crate::repository::AbsProductReviewRepo;

use super::{run_query_once, OidBytes};

const SELECT_COLS: &str = "`review_id`,`product_id`,`account`,`rating`,`comment`,`created_at`";

impl TryFrom<MySqlRow> for ProductReviewModel {
    type Error = AppError;
    fn try_from(row: MySqlRow) -> DefaultResult<Self, Self::Error> {
        let id_ = OidBytes::to_app_oid(&row, 0)?;
        let created = row.try_get::<NaiveDateTime, usize>(5)?;
        Ok(Self {
            id_,
            product_id: row.try_get::<u64, usize>(1)?,
            account: row.try_get::<u32, usize>(2)?,
            rating: row.try_get::<u8, usize>(3)?,
            comment: row.try_get::<Option<String>, usize>(4)?,
            create_time: DateTime::<Utc>::from_naive_utc_and_offset(created, Utc).fixed_offset(),
        })
    }
}

pub(crate) struct ProductReviewMariaDbRepo {
    _db: Arc<AppMariaDbStore>,
}

#[async_trait]
impl AbsProductReviewRepo for ProductReviewMariaDbRepo {
    async fn create(&self, entry: ProductReviewModel) -> DefaultResult<(), AppError> {
        let rid = OidBytes::try_from(entry.id_.as_str())?;
        let sql_patt = "INSERT INTO `product_review`(`review_id`,`product_id`,`account`,\
             `rating`,`comment`,`created_at`) VALUES (?,?,?,?,?,?)";
        let mut conn = self._db.acquire().await?;
        let mut tx = conn.begin().await?;
        let query = sqlx::query(sql_patt)
            .bind(rid.as_column())
            .bind(entry.product_id)
            .bind(entry.account)
            .bind(entry.rating)
            .bind(entry.comment)
            .bind(entry.create_time.naive_utc());
        let _rs = run_query_once(&mut tx, query, Some(1)).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn fetch_by_product(
        &self,
        product_id: u64,
    ) -> DefaultResult<Vec<ProductReviewModel>, AppError> {
        let sql_patt = format!(
            "SELECT {SELECT_COLS} FROM `product_review` WHERE `product_id`=? \
             ORDER BY `created_at` DESC"
        );
        let mut conn = self._db.acquire().await?;
        let query = sqlx::query(sql_patt.as_str()).bind(product_id);
        let rows = query.fetch_all(&mut *conn).await?;
        rows.into_iter()
            .map(ProductReviewModel::try_from)
            .collect::<DefaultResult<Vec<_>, _>>()
    }
} // end of impl AbsProductReviewRepo for ProductReviewMariaDbRepo

impl ProductReviewMariaDbRepo {
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
