use std::boxed::Box;
use std::result::Result as DefaultResult;
use std::sync::Arc;

use crate::api::web::dto::{
    OrderHistoryEntryDto, OrderStatusTransitReqDto, OrderStatusTransitRespDto, PaymentNoticeReqDto,
};
use crate::error::{AppError, AppErrorCode};
use crate::logging::{app_log_event, AppLogContext, AppLogLevel};
use crate::model::OrderStatusEvent;
use crate::repository::{AbsCartRepo, AbsOrderHistoryRepo, AbsOrderRepo};

pub struct TransitOrderStatusUseCase {
    pub repo: Box<dyn AbsOrderRepo>,
    pub log_ctx: Arc<AppLogContext>,
}
pub struct PaymentNoticeUseCase {
    pub order_repo: Box<dyn AbsOrderRepo>,
    pub cart_repo: Box<dyn AbsCartRepo>,
    pub log_ctx: Arc<AppLogContext>,
}
// history lookups require a signed-in account, guest checkouts all land
// on the shared sentinel account which must not leak to other guests
pub struct RetrieveOrderHistoryUseCase {
    pub repo: Box<dyn AbsOrderHistoryRepo>,
    pub account: u32,
}

pub enum TransitOrderStatusUsKsResult {
    Success(OrderStatusTransitRespDto),
    NotFound,
    InvalidEvent,
    InvalidTransition(String),
    ServerError(AppError),
}
pub enum PaymentNoticeUsKsResult {
    Success(OrderStatusTransitRespDto),
    NotFound,
    InvalidTransition(String),
    ServerError(AppError),
}
pub enum RetrieveOrderHistoryUsKsResult {
    Success(Vec<OrderHistoryEntryDto>),
    ServerError(AppError),
}

impl TransitOrderStatusUseCase {
    pub async fn execute(
        self,
        order_id: &str,
        data: OrderStatusTransitReqDto,
    ) -> TransitOrderStatusUsKsResult {
        let event = match OrderStatusEvent::try_parse(data.event.as_str()) {
            Some(ev) => ev,
            None => {
                return TransitOrderStatusUsKsResult::InvalidEvent;
            }
        };
        match self.apply(order_id, event).await {
            Ok(resp) => TransitOrderStatusUsKsResult::Success(resp),
            Err(e) if e.code == AppErrorCode::ObjectNotExist => {
                TransitOrderStatusUsKsResult::NotFound
            }
            Err(e) if e.code == AppErrorCode::InvalidStatusTransition => {
                TransitOrderStatusUsKsResult::InvalidTransition(e.detail.unwrap_or_default())
            }
            Err(e) => TransitOrderStatusUsKsResult::ServerError(e),
        }
    }

    async fn apply(
        &self,
        order_id: &str,
        event: OrderStatusEvent,
    ) -> DefaultResult<OrderStatusTransitRespDto, AppError> {
        let mut order = self.repo.fetch(order_id).await?;
        let next = order.transition(event)?;
        self.repo.update_status(order_id, next).await?;
        let logctx = &self.log_ctx;
        app_log_event!(
            logctx,
            AppLogLevel::INFO,
            "order-id:{order_id}, status:{}",
            next.as_str()
        );
        Ok(OrderStatusTransitRespDto {
            order_id: order_id.to_string(),
            status: next.as_str().to_string(),
        })
    }
} // end of impl TransitOrderStatusUseCase

impl PaymentNoticeUseCase {
    pub async fn execute(
        self,
        order_id: &str,
        data: PaymentNoticeReqDto,
    ) -> PaymentNoticeUsKsResult {
        match self.apply(order_id, data.succeeded).await {
            Ok(resp) => PaymentNoticeUsKsResult::Success(resp),
            Err(e) if e.code == AppErrorCode::ObjectNotExist => PaymentNoticeUsKsResult::NotFound,
            Err(e) if e.code == AppErrorCode::InvalidStatusTransition => {
                PaymentNoticeUsKsResult::InvalidTransition(e.detail.unwrap_or_default())
            }
            Err(e) => PaymentNoticeUsKsResult::ServerError(e),
        }
    }

    async fn apply(
        &self,
        order_id: &str,
        succeeded: bool,
    ) -> DefaultResult<OrderStatusTransitRespDto, AppError> {
        let mut order = self.order_repo.fetch(order_id).await?;
        if !succeeded {
            // a failed payment keeps the order pending so the shopper
            // may retry, nothing to persist
            return Ok(OrderStatusTransitRespDto {
                order_id: order_id.to_string(),
                status: order.status.as_str().to_string(),
            });
        }
        let next = order.transition(OrderStatusEvent::Confirm)?;
        self.order_repo.update_status(order_id, next).await?;
        // the checkout-completed cart is no longer useful to anyone
        if let Err(e) = self
            .cart_repo
            .discard(&order.owner, order.cart_id.as_str())
            .await
        {
            let logctx = &self.log_ctx;
            app_log_event!(
                logctx,
                AppLogLevel::WARNING,
                "order-id:{order_id}, cart-discard-failure:{e}"
            );
        }
        Ok(OrderStatusTransitRespDto {
            order_id: order_id.to_string(),
            status: next.as_str().to_string(),
        })
    }
} // end of impl PaymentNoticeUseCase

impl RetrieveOrderHistoryUseCase {
    pub async fn execute(self) -> RetrieveOrderHistoryUsKsResult {
        match self.repo.fetch_by_account(self.account).await {
            Ok(entries) => {
                let out = entries.iter().map(OrderHistoryEntryDto::from).collect();
                RetrieveOrderHistoryUsKsResult::Success(out)
            }
            Err(e) => RetrieveOrderHistoryUsKsResult::ServerError(e),
        }
    }
}
