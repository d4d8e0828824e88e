use std::boxed::Box;
use std::io::ErrorKind;
use std::result::Result as DefaultResult;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use hyper::body::HttpBody;
use hyper::client::conn as ClientConn;
use hyper::{header, Body as HyperBody, Request, Response, StatusCode};
use serde_json::{json, Value as JsnVal};
use tokio::net::TcpStream;
use tokio::task;
use tokio::time::timeout;
use tokio_native_tls::native_tls::TlsConnector as NativeTlsConnector;
use tokio_native_tls::{TlsConnector, TlsStream};

use crate::config::AppPushNotifierCfg;
use crate::confidentiality::AbstractConfidentiality;
use crate::constant::{hard_limit, HTTP_CONTENT_TYPE_JSON};
use crate::error::{AppError, AppErrorCode};

use super::AbstractOrderNotifier;

const MAX_NBYTES_LOADED_RESPONSE: usize = 8192;

pub struct TelegramPushNotifier {
    api_host: String,
    api_port: u16,
    chat_id: String,
    bot_token: String,
    wait_per_attempt: Duration,
    max_retries: u8,
}

#[async_trait]
impl AbstractOrderNotifier for TelegramPushNotifier {
    async fn send(
        &self,
        caption: String,
        image_ref: Option<String>,
    ) -> DefaultResult<(), AppError> {
        let (method, payload) = match image_ref {
            Some(photo) => (
                "sendPhoto",
                json!({"chat_id": self.chat_id, "photo": photo, "caption": caption}),
            ),
            None => (
                "sendMessage",
                json!({"chat_id": self.chat_id, "text": caption}),
            ),
        };
        let serial = payload.to_string();
        let mut last_error = AppError {
            code: AppErrorCode::NotificationFailure,
            detail: Some("notify-no-attempt".to_string()),
        };
        // one extra attempt on failure, the push is best-effort and the
        // caller decides whether a failure aborts anything
        for _attempt in 0..=self.max_retries {
            let fut = self.send_once(method, serial.clone());
            match timeout(self.wait_per_attempt, fut).await {
                Ok(Ok(())) => {
                    return Ok(());
                }
                Ok(Err(e)) => {
                    last_error = e;
                }
                Err(_elapsed) => {
                    last_error = AppError {
                        code: AppErrorCode::IOerror(ErrorKind::TimedOut),
                        detail: Some(format!("notify-timeout-secs:{:?}", self.wait_per_attempt)),
                    };
                }
            }
        }
        Err(AppError {
            code: AppErrorCode::NotificationFailure,
            detail: last_error.detail,
        })
    } // end of fn send
} // end of impl AbstractOrderNotifier for TelegramPushNotifier

impl TelegramPushNotifier {
    pub fn try_build(
        cfg: &AppPushNotifierCfg,
        confidential: Arc<Box<dyn AbstractConfidentiality>>,
    ) -> DefaultResult<Self, AppError> {
        let bot_token = confidential.try_get_payload(cfg.confidentiality_path.as_str())?;
        let wait_secs = cfg
            .timeout_secs
            .min(hard_limit::MAX_SECONDS_NOTIFY_WAIT as u16);
        let max_retries = cfg.max_retries.min(hard_limit::MAX_NOTIFY_RETRIES as u8);
        Ok(Self {
            api_host: cfg.api_host.clone(),
            api_port: cfg.api_port,
            chat_id: cfg.chat_id.clone(),
            bot_token,
            wait_per_attempt: Duration::new(wait_secs as u64, 0),
            max_retries,
        })
    }

    async fn send_once(&self, method: &str, serial: String) -> DefaultResult<(), AppError> {
        let (mut sender, connector) = self.setup_tls_botserver().await?;
        // the low-level connection processes inbound / outbound messages
        // in a spawned task
        let _handle = task::spawn(async move { connector.await });
        let path = format!("/bot{}/{}", self.bot_token, method);
        let req = Request::builder()
            .uri(path)
            .method(hyper::Method::POST)
            .header(header::HOST, self.api_host.as_str())
            .header(header::CONTENT_TYPE, HTTP_CONTENT_TYPE_JSON)
            .header(header::ACCEPT, HTTP_CONTENT_TYPE_JSON)
            .body(HyperBody::from(serial))
            .map_err(|e| AppError {
                code: AppErrorCode::InvalidInput,
                detail: Some(e.to_string()),
            })?;
        let resp = match sender.send_request(req).await {
            Ok(r) => r,
            Err(net_e) => {
                return Err(AppError {
                    code: AppErrorCode::from(&net_e),
                    detail: Some(net_e.to_string()),
                });
            }
        };
        if resp.status() != StatusCode::OK {
            return Err(AppError {
                code: AppErrorCode::IOerror(ErrorKind::ConnectionRefused),
                detail: Some(format!("bot-api-response-status:{}", resp.status())),
            });
        }
        Self::verify_resp_body(resp).await
    } // end of fn send_once

    async fn setup_tls_botserver(
        &self,
    ) -> DefaultResult<
        (
            ClientConn::SendRequest<HyperBody>,
            ClientConn::Connection<TlsStream<TcpStream>, HyperBody>,
        ),
        AppError,
    > {
        let addr = format!("{}:{}", self.api_host, self.api_port);
        let stream = TcpStream::connect(addr).await.map_err(|net_e| AppError {
            code: AppErrorCode::IOerror(net_e.kind()),
            detail: Some(net_e.to_string()),
        })?;
        let tls_error = |e: tokio_native_tls::native_tls::Error| AppError {
            code: AppErrorCode::IOerror(ErrorKind::NotConnected),
            detail: Some(e.to_string()),
        };
        let connector = TlsConnector::from(NativeTlsConnector::new().map_err(tls_error)?);
        let tls_stream = connector
            .connect(self.api_host.as_str(), stream)
            .await
            .map_err(tls_error)?;
        ClientConn::handshake(tls_stream)
            .await
            .map_err(|net_e| AppError {
                code: AppErrorCode::from(&net_e),
                detail: Some(net_e.to_string()),
            })
    } // end of fn setup_tls_botserver

    // the bot API reports application-level failure in the `ok` field
    // even with HTTP 200
    async fn verify_resp_body(mut resp: Response<HyperBody>) -> DefaultResult<(), AppError> {
        let body = resp.body_mut();
        let mut raw_collected: Vec<u8> = Vec::new();
        while let Some(data) = body.data().await {
            match data {
                Ok(raw) => {
                    raw_collected.extend(raw.to_vec());
                    if raw_collected.len() > MAX_NBYTES_LOADED_RESPONSE {
                        return Err(AppError {
                            code: AppErrorCode::ExceedingMaxLimit,
                            detail: Some("bot-api-resp-body".to_string()),
                        });
                    }
                }
                Err(net_e) => {
                    return Err(AppError {
                        code: AppErrorCode::from(&net_e),
                        detail: Some(net_e.to_string()),
                    });
                }
            }
        }
        let decoded = serde_json::from_slice::<JsnVal>(raw_collected.as_slice()).map_err(|e| {
            AppError {
                code: AppErrorCode::InvalidJsonFormat,
                detail: Some(e.to_string()),
            }
        })?;
        let succeeded = decoded
            .get("ok")
            .and_then(JsnVal::as_bool)
            .unwrap_or(false);
        if succeeded {
            Ok(())
        } else {
            let description = decoded
                .get("description")
                .and_then(JsnVal::as_str)
                .unwrap_or("bot-api-unspecified-error");
            Err(AppError {
                code: AppErrorCode::NotificationFailure,
                detail: Some(description.to_string()),
            })
        }
    } // end of fn verify_resp_body
} // end of impl TelegramPushNotifier
