use std::boxed::Box;

use chrono::Local as LocalTime;

use crate::api::web::dto::{ProductReviewsDto, ReviewCreateReqDto, ReviewDto};
use crate::error::{AppError, AppErrorCode};
use crate::model::ProductReviewModel;
use crate::repository::{AbsProductRepo, AbsProductReviewRepo};

pub struct SubmitReviewUseCase {
    pub review_repo: Box<dyn AbsProductReviewRepo>,
    pub product_repo: Box<dyn AbsProductRepo>,
    pub account: u32,
}

pub struct ListProductReviewsUseCase {
    pub review_repo: Box<dyn AbsProductReviewRepo>,
    pub product_repo: Box<dyn AbsProductRepo>,
}

pub enum SubmitReviewUsKsResult {
    Success(ReviewDto),
    ProductNotFound,
    InvalidRating(String),
    ServerError(AppError),
}

pub enum ListProductReviewsUsKsResult {
    Success(ProductReviewsDto),
    ProductNotFound,
    ServerError(AppError),
}

impl SubmitReviewUseCase {
    pub async fn execute(self, product_id: u64, data: ReviewCreateReqDto) -> SubmitReviewUsKsResult {
        match self.product_repo.fetch(vec![product_id]).await {
            Ok(found) if found.is_empty() => {
                return SubmitReviewUsKsResult::ProductNotFound;
            }
            Ok(_found) => {}
            Err(e) => {
                return SubmitReviewUsKsResult::ServerError(e);
            }
        }
        let now = LocalTime::now().fixed_offset();
        let entry = match ProductReviewModel::try_new(
            product_id,
            self.account,
            data.rating,
            data.comment,
            now,
        ) {
            Ok(m) => m,
            Err(e) if e.code == AppErrorCode::InvalidInput => {
                return SubmitReviewUsKsResult::InvalidRating(e.detail.unwrap_or_default());
            }
            Err(e) => {
                return SubmitReviewUsKsResult::ServerError(e);
            }
        };
        let reply = ReviewDto::from(&entry);
        if let Err(e) = self.review_repo.create(entry).await {
            return SubmitReviewUsKsResult::ServerError(e);
        }
        SubmitReviewUsKsResult::Success(reply)
    } // end of fn execute
} // end of impl SubmitReviewUseCase

impl ListProductReviewsUseCase {
    pub async fn execute(self, product_id: u64) -> ListProductReviewsUsKsResult {
        match self.product_repo.fetch(vec![product_id]).await {
            Ok(found) if found.is_empty() => {
                return ListProductReviewsUsKsResult::ProductNotFound;
            }
            Ok(_found) => {}
            Err(e) => {
                return ListProductReviewsUsKsResult::ServerError(e);
            }
        }
        let entries = match self.review_repo.fetch_by_product(product_id).await {
            Ok(v) => v,
            Err(e) => {
                return ListProductReviewsUsKsResult::ServerError(e);
            }
        };
        let average = ProductReviewModel::average_rating(entries.as_slice());
        ListProductReviewsUsKsResult::Success(ProductReviewsDto {
            product_id,
            average_rating: average.to_string(),
            reviews: entries.iter().map(ReviewDto::from).collect(),
        })
    } // end of fn execute
} // end of impl ListProductReviewsUseCase
