use std::boxed::Box;
use std::sync::Arc;

use chrono::{Duration, Local as LocalTime};
use jsonwebtoken::{encode as jwt_encode, EncodingKey, Header};
use serde_json::json;

use flower_delivery::confidentiality::AbstractConfidentiality;
use flower_delivery::error::AppErrorCode;
use flower_delivery::{AppAuthCfg, AppAuthedClaim, AppJwtAuthentication};

use crate::MockConfidential;

fn ut_setup_keystore() -> AppJwtAuthentication {
    let cfg = serde_json::from_value::<AppAuthCfg>(json!({
        "secret_path": "backend_apps/auth_secret",
        "audience": ["storefront"]
    }))
    .unwrap();
    let cfdntl: Box<dyn AbstractConfidentiality> = Box::new(MockConfidential {});
    AppJwtAuthentication::try_build(&cfg, Arc::new(cfdntl)).unwrap()
}

fn ut_encode_token(claim: &AppAuthedClaim, secret: &[u8]) -> String {
    let key = EncodingKey::from_secret(secret);
    jwt_encode(&Header::default(), claim, &key).unwrap()
}

fn ut_claim(profile: u32, ttl_secs: i64, aud: &str) -> AppAuthedClaim {
    let now = LocalTime::now();
    AppAuthedClaim {
        profile,
        iat: now.timestamp(),
        exp: (now + Duration::seconds(ttl_secs)).timestamp(),
        aud: vec![aud.to_string()],
    }
}

#[test]
fn verify_ok() {
    let auth = ut_setup_keystore();
    // the mock confidentiality store hands back the literal `unit-test`
    let token = ut_encode_token(&ut_claim(126, 300, "storefront"), b"unit-test");
    let claim = auth.verify(token.as_str()).unwrap();
    assert_eq!(claim.profile, 126);
    assert_eq!(claim.aud, vec!["storefront".to_string()]);
}

#[test]
fn verify_expired_token() {
    let auth = ut_setup_keystore();
    // beyond the default validation leeway
    let token = ut_encode_token(&ut_claim(126, -120, "storefront"), b"unit-test");
    let result = auth.verify(token.as_str());
    assert!(result.is_err());
    let e = result.err().unwrap();
    assert_eq!(e.code, AppErrorCode::CryptoFailure);
    assert_eq!(e.detail.as_deref(), Some("ExpiredSignature"));
}

#[test]
fn verify_wrong_audience() {
    let auth = ut_setup_keystore();
    let token = ut_encode_token(&ut_claim(126, 300, "warehouse"), b"unit-test");
    let result = auth.verify(token.as_str());
    assert!(result.is_err());
    let e = result.err().unwrap();
    assert_eq!(e.code, AppErrorCode::CryptoFailure);
    assert_eq!(e.detail.as_deref(), Some("invalid-audience"));
}

#[test]
fn verify_tampered_signature() {
    let auth = ut_setup_keystore();
    let token = ut_encode_token(&ut_claim(126, 300, "storefront"), b"someone-else");
    let result = auth.verify(token.as_str());
    assert!(result.is_err());
    let e = result.err().unwrap();
    assert_eq!(e.code, AppErrorCode::CryptoFailure);
    assert_eq!(e.detail.as_deref(), Some("invalid-signature"));
}
