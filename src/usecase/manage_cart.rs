use std::boxed::Box;
use std::result::Result as DefaultResult;
use std::sync::Arc;

use crate::api::web::dto::{CartDto, CartModifyReqDto};
use crate::constant::hard_limit;
use crate::error::{AppError, AppErrorCode};
use crate::logging::{app_log_event, AppLogContext, AppLogLevel};
use crate::model::ShopperId;
use crate::repository::{AbsCartRepo, AbsProductRepo};

pub struct RetrieveCartUseCase {
    pub repo: Box<dyn AbsCartRepo>,
    pub shopper: ShopperId,
}
pub struct ModifyCartLinesUseCase {
    pub cart_repo: Box<dyn AbsCartRepo>,
    pub product_repo: Box<dyn AbsProductRepo>,
    pub log_ctx: Arc<AppLogContext>,
    pub shopper: ShopperId,
}
pub struct RemoveCartLineUseCase {
    pub repo: Box<dyn AbsCartRepo>,
    pub shopper: ShopperId,
}

pub enum RetrieveCartUsKsResult {
    Success(CartDto),
    ServerError(AppError),
}
pub enum ModifyCartUsKsResult {
    Success(CartDto),
    ProductNotFound(Vec<u64>),
    ExceedingLimit(usize),
    ServerError(AppError),
}
pub enum RemoveCartLineUsKsResult {
    Success(CartDto),
    NotFound,
    ServerError(AppError),
}

impl RetrieveCartUseCase {
    pub async fn execute(self) -> RetrieveCartUsKsResult {
        match self.repo.fetch_or_create(&self.shopper).await {
            Ok(m) => RetrieveCartUsKsResult::Success((&m).into()),
            Err(e) => RetrieveCartUsKsResult::ServerError(e),
        }
    }
}

impl ModifyCartLinesUseCase {
    pub async fn execute(self, data: CartModifyReqDto) -> ModifyCartUsKsResult {
        if data.lines.len() > hard_limit::MAX_CART_LINES_PER_REQUEST {
            return ModifyCartUsKsResult::ExceedingLimit(data.lines.len());
        }
        match self.add_lines(data).await {
            Ok(Ok(dto)) => ModifyCartUsKsResult::Success(dto),
            Ok(Err(missing)) => ModifyCartUsKsResult::ProductNotFound(missing),
            Err(e) => ModifyCartUsKsResult::ServerError(e),
        }
    }

    async fn add_lines(
        &self,
        data: CartModifyReqDto,
    ) -> DefaultResult<DefaultResult<CartDto, Vec<u64>>, AppError> {
        let ids = data.lines.iter().map(|l| l.product_id).collect::<Vec<_>>();
        let products = self.product_repo.fetch(ids.clone()).await?;
        let missing = ids
            .iter()
            .filter(|id_| !products.iter().any(|p| p.id_ == **id_))
            .copied()
            .collect::<Vec<_>>();
        if !missing.is_empty() {
            return Ok(Err(missing));
        }
        let mut cart = self.cart_repo.fetch_or_create(&self.shopper).await?;
        for req in data.lines.iter() {
            if req.quantity == 0 {
                continue;
            }
            let product = products
                .iter()
                .find(|p| p.id_ == req.product_id)
                .ok_or_else(|| AppError {
                    code: AppErrorCode::ProductNotExist,
                    detail: Some(format!("product-id:{}", req.product_id)),
                })?;
            cart.add_line(product, req.quantity);
        }
        let logctx = &self.log_ctx;
        app_log_event!(
            logctx,
            AppLogLevel::DEBUG,
            "cart-id:{}, num-lines:{}",
            cart.id_.as_str(),
            cart.saved_lines.len()
        );
        let _num_updated = self.cart_repo.update(cart).await?;
        let refreshed = self.cart_repo.fetch_or_create(&self.shopper).await?;
        Ok(Ok((&refreshed).into()))
    } // end of fn add_lines
} // end of impl ModifyCartLinesUseCase

impl RemoveCartLineUseCase {
    pub async fn execute(self, product_id: u64) -> RemoveCartLineUsKsResult {
        match self.remove(product_id).await {
            Ok(Some(dto)) => RemoveCartLineUsKsResult::Success(dto),
            Ok(None) => RemoveCartLineUsKsResult::NotFound,
            Err(e) => RemoveCartLineUsKsResult::ServerError(e),
        }
    }

    async fn remove(&self, product_id: u64) -> DefaultResult<Option<CartDto>, AppError> {
        let mut cart = self.repo.fetch_or_create(&self.shopper).await?;
        if !cart.remove_line(product_id) {
            return Ok(None);
        }
        let _num_updated = self.repo.update(cart).await?;
        let refreshed = self.repo.fetch_or_create(&self.shopper).await?;
        Ok(Some((&refreshed).into()))
    }
} // end of impl RemoveCartLineUseCase
