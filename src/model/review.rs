use std::result::Result as DefaultResult;

use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;

use crate::api::web::dto::ReviewDto;
use crate::constant::{app_meta, hard_limit};
use crate::error::{AppError, AppErrorCode};
use crate::generate_custom_uid;

// verdict of a signed-in shopper on one catalog item, written once at
// submission and never edited afterwards
pub struct ProductReviewModel {
    pub id_: String,
    pub product_id: u64,
    pub account: u32,
    pub rating: u8,
    pub comment: Option<String>,
    pub create_time: DateTime<FixedOffset>,
}

impl ProductReviewModel {
    pub fn try_new(
        product_id: u64,
        account: u32,
        rating: u8,
        comment: Option<String>,
        now: DateTime<FixedOffset>,
    ) -> DefaultResult<Self, AppError> {
        let valid_range = hard_limit::MIN_REVIEW_RATING..=hard_limit::MAX_REVIEW_RATING;
        if !valid_range.contains(&rating) {
            return Err(AppError {
                code: AppErrorCode::InvalidInput,
                detail: Some(format!("rating:{rating}")),
            });
        }
        let comment = comment
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());
        Ok(Self {
            id_: generate_custom_uid(app_meta::MACHINE_CODE)
                .simple()
                .to_string(),
            product_id,
            account,
            rating,
            comment,
            create_time: now,
        })
    } // end of fn try_new

    // mean of all recorded ratings for one item, zero when the item
    // has not been rated yet
    pub fn average_rating(entries: &[Self]) -> Decimal {
        if entries.is_empty() {
            return Decimal::ZERO;
        }
        let sum = entries
            .iter()
            .map(|e| Decimal::from(e.rating))
            .sum::<Decimal>();
        (sum / Decimal::from(entries.len())).round_dp(2)
    }
} // end of impl ProductReviewModel

impl From<&ProductReviewModel> for ReviewDto {
    fn from(value: &ProductReviewModel) -> Self {
        Self {
            rating: value.rating,
            comment: value.comment.clone(),
            created_at: value.create_time.to_rfc3339(),
        }
    }
}
