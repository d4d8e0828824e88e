use std::boxed::Box;
use std::sync::Arc;

use crate::api::web::dto::{ProductDto, ProductErrorDto};
use crate::error::AppError;
use crate::logging::{app_log_event, AppLogContext, AppLogLevel};
use crate::model::ProductModel;
use crate::repository::AbsProductRepo;

pub struct SeedProductsUseCase {
    pub repo: Box<dyn AbsProductRepo>,
    pub log_ctx: Arc<AppLogContext>,
}
pub struct ListProductsUseCase {
    pub repo: Box<dyn AbsProductRepo>,
}

pub enum SeedProductsUsKsResult {
    Success(usize),
    ValidationFailure(Vec<ProductErrorDto>),
    ServerError(AppError),
}
pub enum ListProductsUsKsResult {
    Success(Vec<ProductDto>),
    ServerError(AppError),
}

impl SeedProductsUseCase {
    pub async fn execute(self, data: Vec<ProductDto>) -> SeedProductsUsKsResult {
        let mut errors = Vec::new();
        let mut items = Vec::with_capacity(data.len());
        for d in data {
            let id_ = d.id_;
            match ProductModel::try_from(d) {
                Ok(m) => items.push(m),
                Err(reason) => errors.push(ProductErrorDto { id_, reason }),
            }
        }
        if !errors.is_empty() {
            return SeedProductsUsKsResult::ValidationFailure(errors);
        }
        match self.repo.save(items).await {
            Ok(num) => {
                let logctx = &self.log_ctx;
                app_log_event!(logctx, AppLogLevel::INFO, "num-products-seeded:{num}");
                SeedProductsUsKsResult::Success(num)
            }
            Err(e) => SeedProductsUsKsResult::ServerError(e),
        }
    }
} // end of impl SeedProductsUseCase

impl ListProductsUseCase {
    pub async fn execute(self) -> ListProductsUsKsResult {
        match self.repo.fetch_all().await {
            Ok(items) => {
                let out = items.into_iter().map(ProductDto::from).collect();
                ListProductsUsKsResult::Success(out)
            }
            Err(e) => ListProductsUsKsResult::ServerError(e),
        }
    }
}
