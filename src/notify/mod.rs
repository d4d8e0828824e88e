mod telegram;

use std::boxed::Box;
use std::io::ErrorKind;
use std::result::Result as DefaultResult;
use std::sync::Arc;

use async_trait::async_trait;

use crate::config::AppPushNotifierCfg;
use crate::confidentiality::AbstractConfidentiality;
use crate::error::{AppError, AppErrorCode};

pub use telegram::TelegramPushNotifier;

// delivery confirmation pushed to the shop staff right after checkout,
// implementors must not assume the message chronologically follows any
// database write visible to them
#[async_trait]
pub trait AbstractOrderNotifier: Send + Sync {
    async fn send(
        &self,
        caption: String,
        image_ref: Option<String>,
    ) -> DefaultResult<(), AppError>;
}

pub fn build_context(
    cfg: &AppPushNotifierCfg,
    confidential: Arc<Box<dyn AbstractConfidentiality>>,
) -> DefaultResult<Box<dyn AbstractOrderNotifier>, AppError> {
    let obj = TelegramPushNotifier::try_build(cfg, confidential)?;
    Ok(Box::new(obj))
}

impl From<&hyper::Error> for AppErrorCode {
    fn from(value: &hyper::Error) -> Self {
        if value.is_connect() {
            Self::IOerror(ErrorKind::NotConnected)
        } else if value.is_parse() || value.is_incomplete_message() {
            Self::DataCorruption
        } else if value.is_parse_too_large() {
            Self::ExceedingMaxLimit
        } else if value.is_user() {
            Self::IOerror(ErrorKind::InvalidInput)
        } else if value.is_timeout() {
            Self::IOerror(ErrorKind::TimedOut)
        } else if value.is_canceled() {
            Self::IOerror(ErrorKind::Interrupted)
        } else {
            Self::IOerror(ErrorKind::Other)
        }
    }
}
