use std::boxed::Box;
use std::result::Result as DefaultResult;
use std::sync::Arc;

use chrono::Local as LocalTime;
use rust_decimal::Decimal;

use crate::api::web::dto::{
    OrderCreateErrorDto, OrderCreateErrorReason, OrderCreateReqDto, OrderLineDto, OrderReplyDto,
};
use crate::error::{AppError, AppErrorCode};
use crate::logging::{app_log_event, AppLogContext, AppLogLevel};
use crate::model::{
    CartModel, DeliveryModel, GuestContactModel, OrderHistoryModel, OrderModel, ProductModel,
    ShopperId,
};
use crate::notify::AbstractOrderNotifier;
use crate::repository::{AbsCartRepo, AbsOrderHistoryRepo, AbsOrderRepo, AbsProductRepo};

pub struct CheckoutCartUseCase {
    pub cart_repo: Box<dyn AbsCartRepo>,
    pub product_repo: Box<dyn AbsProductRepo>,
    pub order_repo: Box<dyn AbsOrderRepo>,
    pub history_repo: Box<dyn AbsOrderHistoryRepo>,
    pub notifier: Arc<Box<dyn AbstractOrderNotifier>>,
    pub log_ctx: Arc<AppLogContext>,
    pub shopper: ShopperId,
}

pub struct RepeatOrderUseCase {
    pub cart_repo: Box<dyn AbsCartRepo>,
    pub product_repo: Box<dyn AbsProductRepo>,
    pub order_repo: Box<dyn AbsOrderRepo>,
    pub history_repo: Box<dyn AbsOrderHistoryRepo>,
    pub notifier: Arc<Box<dyn AbstractOrderNotifier>>,
    pub log_ctx: Arc<AppLogContext>,
    pub shopper: ShopperId,
}

pub enum CheckoutUsKsResult {
    Success(OrderReplyDto),
    ValidationFailure(OrderCreateErrorDto),
    ServerError(AppError),
}

pub enum RepeatOrderUsKsResult {
    Success(OrderReplyDto),
    NotFound,
    ServerError(AppError),
}

fn nonfield_error(reason: OrderCreateErrorReason) -> OrderCreateErrorDto {
    OrderCreateErrorDto {
        nonfield: Some(reason),
        ..OrderCreateErrorDto::default()
    }
}

// the write sequence shared by first-time checkout and repeat-order,
// the order row is authoritative once persisted, later bookkeeping
// failures degrade to log entries instead of aborting
async fn finalize_order(
    cart_repo: &dyn AbsCartRepo,
    order_repo: &dyn AbsOrderRepo,
    history_repo: &dyn AbsOrderHistoryRepo,
    notifier: &dyn AbstractOrderNotifier,
    log_ctx: &Arc<AppLogContext>,
    mut cart: CartModel,
    products: Vec<ProductModel>,
    delivery: DeliveryModel,
    contact: Option<GuestContactModel>,
    comment: Option<String>,
) -> DefaultResult<OrderReplyDto, AppError> {
    // a concurrent checkout may have taken the cart between the caller's
    // emptiness check and this point, a zero-line order never gets created
    if cart.saved_lines.is_empty() {
        return Err(AppError {
            code: AppErrorCode::EmptyCart,
            detail: Some(format!("cart-id:{}", cart.id_)),
        });
    }
    let now = LocalTime::now().fixed_offset();
    let order = OrderModel::from_cart(&cart, products.as_slice(), delivery, contact, comment, now)?;
    order_repo.create(order.clone()).await?;
    cart.closed = true;
    if let Err(e) = cart_repo.update(cart).await {
        app_log_event!(
            log_ctx,
            AppLogLevel::ERROR,
            "order-id:{}, cart-close-failure:{e}",
            order.id_.as_str()
        );
    }
    let entries = OrderHistoryModel::from_order(&order);
    if let Err(e) = history_repo.create(entries).await {
        app_log_event!(
            log_ctx,
            AppLogLevel::ERROR,
            "order-id:{}, history-write-failure:{e}",
            order.id_.as_str()
        );
    }
    let caption = order.summary_message();
    let image_ref = order.first_image_ref();
    let notified = match notifier.send(caption, image_ref).await {
        Ok(()) => true,
        Err(e) => {
            app_log_event!(
                log_ctx,
                AppLogLevel::WARNING,
                "order-id:{}, notify-failure:{e}",
                order.id_.as_str()
            );
            false
        }
    };
    Ok(OrderReplyDto {
        order_id: order.id_.clone(),
        status: order.status.as_str().to_string(),
        lines: order.lines.iter().map(OrderLineDto::from).collect(),
        total_price: order.total_price().to_string(),
        notified,
    })
} // end of fn finalize_order

impl CheckoutCartUseCase {
    pub async fn execute(self, data: OrderCreateReqDto) -> CheckoutUsKsResult {
        // cart emptiness is checked first, then the one-order-per-cart
        // gate, the delivery input is only inspected on a viable cart
        let cart = match self.cart_repo.fetch_or_create(&self.shopper).await {
            Ok(c) => c,
            Err(e) => {
                return CheckoutUsKsResult::ServerError(e);
            }
        };
        if cart.saved_lines.is_empty() {
            return CheckoutUsKsResult::ValidationFailure(nonfield_error(
                OrderCreateErrorReason::EmptyCart,
            ));
        }
        match self.order_repo.exists_for_cart(cart.id_.as_str()).await {
            Ok(true) => {
                return CheckoutUsKsResult::ValidationFailure(nonfield_error(
                    OrderCreateErrorReason::DuplicateOrder,
                ));
            }
            Ok(false) => {}
            Err(e) => {
                return CheckoutUsKsResult::ServerError(e);
            }
        }
        let delivery = match DeliveryModel::try_from(&data) {
            Ok(d) => d,
            Err(e) => {
                return CheckoutUsKsResult::ValidationFailure(e);
            }
        };
        let ids = cart
            .saved_lines
            .iter()
            .map(|l| l.product_id)
            .collect::<Vec<_>>();
        let products = match self.product_repo.fetch(ids).await {
            Ok(p) => p,
            Err(e) => {
                return CheckoutUsKsResult::ServerError(e);
            }
        };
        let contact = data.contact.map(|c| GuestContactModel {
            email: c.email,
            phone: c.phone,
        });
        let result = finalize_order(
            self.cart_repo.as_ref(),
            self.order_repo.as_ref(),
            self.history_repo.as_ref(),
            self.notifier.as_ref().as_ref(),
            &self.log_ctx,
            cart,
            products,
            delivery,
            contact,
            data.comment,
        )
        .await;
        match result {
            Ok(reply) => CheckoutUsKsResult::Success(reply),
            // losing a concurrent race is surfaced like a repeated submit
            Err(e) if e.code == AppErrorCode::DuplicateOrder => {
                CheckoutUsKsResult::ValidationFailure(nonfield_error(
                    OrderCreateErrorReason::DuplicateOrder,
                ))
            }
            Err(e) if e.code == AppErrorCode::EmptyCart => {
                CheckoutUsKsResult::ValidationFailure(nonfield_error(
                    OrderCreateErrorReason::EmptyCart,
                ))
            }
            Err(e) => CheckoutUsKsResult::ServerError(e),
        }
    } // end of fn execute
} // end of impl CheckoutCartUseCase

impl RepeatOrderUseCase {
    pub async fn execute(self, entry_id: &str) -> RepeatOrderUsKsResult {
        match self.run(entry_id).await {
            Ok(reply) => RepeatOrderUsKsResult::Success(reply),
            Err(e)
                if matches!(
                    e.code,
                    AppErrorCode::ObjectNotExist | AppErrorCode::ProductNotExist
                ) =>
            {
                RepeatOrderUsKsResult::NotFound
            }
            Err(e) => RepeatOrderUsKsResult::ServerError(e),
        }
    }

    async fn run(&self, entry_id: &str) -> DefaultResult<OrderReplyDto, AppError> {
        let entry = self.history_repo.fetch_one(entry_id).await?;
        if entry.quantity == 0 {
            return Err(AppError {
                code: AppErrorCode::DataCorruption,
                detail: Some(format!("history-entry:{entry_id}, zero-quantity")),
            });
        }
        let products = self.product_repo.fetch(vec![entry.product_id]).await?;
        let product = products.first().ok_or_else(|| AppError {
            code: AppErrorCode::ProductNotExist,
            detail: Some(format!("product-id:{}", entry.product_id)),
        })?;
        let mut cart = self.cart_repo.fetch_or_create(&self.shopper).await?;
        // leftover lines in the open cart are dropped, the repeated
        // order reproduces exactly the recorded purchase
        cart.saved_lines.clear();
        cart.add_line(product, entry.quantity);
        // charge what the shopper paid back then, not today's price
        if let Some(line) = cart.saved_lines.first_mut() {
            line.unit_price = entry.cost / Decimal::from(entry.quantity);
        }
        let _num_updated = self.cart_repo.update(cart).await?;
        let cart = self.cart_repo.fetch_or_create(&self.shopper).await?;
        let delivery = DeliveryModel {
            date: entry.delivery_date,
            time: entry.delivery_time,
            address: entry.address.clone(),
        };
        finalize_order(
            self.cart_repo.as_ref(),
            self.order_repo.as_ref(),
            self.history_repo.as_ref(),
            self.notifier.as_ref().as_ref(),
            &self.log_ctx,
            cart,
            products,
            delivery,
            None,
            entry.comment.clone(),
        )
        .await
    } // end of fn run
} // end of impl RepeatOrderUseCase
