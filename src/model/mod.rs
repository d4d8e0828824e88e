mod cart;
mod history;
mod order;
mod product;
mod report;
mod review;

use std::result::Result as DefaultResult;

use crate::constant::app_meta;
use crate::error::{AppError, AppErrorCode};

pub use cart::{CartLineModel, CartModel};
pub use history::OrderHistoryModel;
pub use order::{
    DeliveryModel, GuestContactModel, OrderLineModel, OrderModel, OrderStatus, OrderStatusEvent,
};
pub use product::ProductModel;
pub use report::SalesReportModel;
pub use review::ProductReviewModel;

// identity of a shopper, either a signed-in user profile or the session
// key of an anonymous visitor, every cart / order operation takes this
// variant type so both kinds of shopper run the same code path
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ShopperId {
    Authenticated(u32),
    Guest(String),
}

impl ShopperId {
    // composite primary keys in the datastore embed this value, the
    // prefix octet keeps user ids and session keys from colliding
    pub fn storage_key(&self) -> String {
        match self {
            Self::Authenticated(usr_id) => format!("u{usr_id}"),
            Self::Guest(sess_key) => format!("g{sess_key}"),
        }
    }

    pub fn history_account(&self) -> u32 {
        match self {
            Self::Authenticated(usr_id) => *usr_id,
            Self::Guest(_) => app_meta::GUEST_ACCOUNT,
        }
    }

    pub fn try_from_storage_key(value: &str) -> DefaultResult<Self, AppError> {
        let (prefix, rest) = value.split_at(1);
        let invalid = |d: String| AppError {
            code: AppErrorCode::DataCorruption,
            detail: Some(d),
        };
        match prefix {
            "u" => {
                let usr_id = rest
                    .parse::<u32>()
                    .map_err(|e| invalid(format!("shopper-key:{value}, {e}")))?;
                Ok(Self::Authenticated(usr_id))
            }
            "g" if !rest.is_empty() => Ok(Self::Guest(rest.to_string())),
            _others => Err(invalid(format!("shopper-key:{value}"))),
        }
    }
} // end of impl ShopperId
