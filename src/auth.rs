use std::boxed::Box;
use std::result::Result as DefaultResult;
use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use http::request::Parts;
use http::{header, StatusCode};
use jsonwebtoken::errors::ErrorKind as JwtErrorKind;
use jsonwebtoken::{decode as jwt_decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::config::AppAuthCfg;
use crate::confidentiality::AbstractConfidentiality;
use crate::constant::HTTP_HEADER_GUEST_SESSION;
use crate::error::{AppError, AppErrorCode};
use crate::model::ShopperId;
use crate::AppSharedState;

const GUEST_SESSION_KEY_MIN_SZ: usize = 8;
const GUEST_SESSION_KEY_MAX_SZ: usize = 64;

#[derive(Serialize, Deserialize)]
pub struct AppAuthedClaim {
    pub profile: u32,
    pub iat: i64,
    pub exp: i64,
    pub aud: Vec<String>,
}

pub struct AppJwtAuthentication {
    key: DecodingKey,
    validation: Validation,
}

impl AppJwtAuthentication {
    pub fn try_build(
        cfg: &AppAuthCfg,
        confidential: Arc<Box<dyn AbstractConfidentiality>>,
    ) -> DefaultResult<Self, AppError> {
        let secret = confidential.try_get_payload(cfg.secret_path.as_str())?;
        let key = DecodingKey::from_secret(secret.as_bytes());
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(cfg.audience.as_slice());
        Ok(Self { key, validation })
    }

    pub fn verify(&self, token: &str) -> DefaultResult<AppAuthedClaim, AppError> {
        let result = jwt_decode::<AppAuthedClaim>(token, &self.key, &self.validation);
        match result {
            Ok(data) => Ok(data.claims),
            Err(e) => {
                let (code, detail) = match e.kind() {
                    JwtErrorKind::ExpiredSignature => {
                        (AppErrorCode::CryptoFailure, "ExpiredSignature".to_string())
                    }
                    JwtErrorKind::InvalidSignature => {
                        (AppErrorCode::CryptoFailure, "invalid-signature".to_string())
                    }
                    JwtErrorKind::InvalidAudience => {
                        (AppErrorCode::CryptoFailure, "invalid-audience".to_string())
                    }
                    JwtErrorKind::Base64(b64e) => (
                        AppErrorCode::DataCorruption,
                        format!("encoder:Base64, {b64e}"),
                    ),
                    _others => (AppErrorCode::InvalidInput, e.to_string()),
                };
                Err(AppError {
                    code,
                    detail: Some(detail),
                })
            }
        }
    }
} // end of impl AppJwtAuthentication

fn unauthorized(detail: &str) -> (StatusCode, String) {
    (StatusCode::UNAUTHORIZED, detail.to_string())
}

fn bearer_token(parts: &Parts) -> Option<DefaultResult<&str, (StatusCode, String)>> {
    let raw = parts.headers.get(header::AUTHORIZATION)?;
    let out = raw
        .to_str()
        .ok()
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| unauthorized("malformed-authorization-header"));
    Some(out)
}

// the session key lands in datastore keys, restrict the charset so it
// cannot collide with composite-key separators
fn valid_guest_session_key(raw: &str) -> bool {
    let sz_ok = (GUEST_SESSION_KEY_MIN_SZ..=GUEST_SESSION_KEY_MAX_SZ).contains(&raw.len());
    sz_ok && raw.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

#[async_trait]
impl FromRequestParts<AppSharedState> for AppAuthedClaim {
    type Rejection = (StatusCode, String);
    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppSharedState,
    ) -> DefaultResult<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or_else(|| unauthorized("missing-bearer-token"))??;
        state
            .jwt_auth()
            .verify(token)
            .map_err(|e| unauthorized(e.to_string().as_str()))
    }
}

// signed-in shoppers take precedence over the guest-session header when
// both are present
#[async_trait]
impl FromRequestParts<AppSharedState> for ShopperId {
    type Rejection = (StatusCode, String);
    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppSharedState,
    ) -> DefaultResult<Self, Self::Rejection> {
        if let Some(result) = bearer_token(parts) {
            let token = result?;
            let claim = state
                .jwt_auth()
                .verify(token)
                .map_err(|e| unauthorized(e.to_string().as_str()))?;
            return Ok(ShopperId::Authenticated(claim.profile));
        }
        let raw = parts
            .headers
            .get(HTTP_HEADER_GUEST_SESSION)
            .ok_or_else(|| unauthorized("missing-shopper-identity"))?;
        let key = raw
            .to_str()
            .map_err(|_e| unauthorized("malformed-guest-session-header"))?;
        if valid_guest_session_key(key) {
            Ok(ShopperId::Guest(key.to_string()))
        } else {
            Err(unauthorized("malformed-guest-session-header"))
        }
    }
} // end of impl FromRequestParts for ShopperId
