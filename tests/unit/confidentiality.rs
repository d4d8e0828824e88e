use std::fs;
use std::path::PathBuf;

use serde_json::json;

use flower_delivery::confidentiality::{AbstractConfidentiality, UserSpaceConfidentiality};
use flower_delivery::error::AppErrorCode;

fn ut_write_secret_file(fname: &str) -> PathBuf {
    let mut fullpath = std::env::temp_dir();
    fullpath.push(fname);
    let doc = json!({
        "backend_apps": {
            "auth_secret": "ut-hmac-key",
            "bot_token": "123456:ut-bot-token",
            "databases": {"store_primary": {"HOST": "localhost", "PORT": 3306}}
        }
    });
    fs::write(&fullpath, doc.to_string()).unwrap();
    fullpath
}

#[test]
fn secret_lookup_ok() {
    let fullpath = ut_write_secret_file("ut_secrets_ok.json");
    let store = UserSpaceConfidentiality::build(fullpath.to_string_lossy().to_string());
    let v = store.try_get_payload("backend_apps/auth_secret").unwrap();
    assert_eq!(v.as_str(), "ut-hmac-key");
    // a non-string node comes back serialized
    let v = store
        .try_get_payload("backend_apps/databases/store_primary")
        .unwrap();
    assert!(v.contains("localhost"));
    let _ = fs::remove_file(fullpath);
}

#[test]
fn secret_lookup_cached_after_first_read() {
    let fullpath = ut_write_secret_file("ut_secrets_cache.json");
    let store = UserSpaceConfidentiality::build(fullpath.to_string_lossy().to_string());
    let v = store.try_get_payload("backend_apps/bot_token").unwrap();
    assert_eq!(v.as_str(), "123456:ut-bot-token");
    // the source file is gone, the cached entry still resolves
    fs::remove_file(&fullpath).unwrap();
    let v = store.try_get_payload("backend_apps/bot_token").unwrap();
    assert_eq!(v.as_str(), "123456:ut-bot-token");
}

#[test]
fn secret_lookup_unknown_path() {
    let fullpath = ut_write_secret_file("ut_secrets_miss.json");
    let store = UserSpaceConfidentiality::build(fullpath.to_string_lossy().to_string());
    let result = store.try_get_payload("backend_apps/no-such-secret");
    assert!(result.is_err());
    let e = result.err().unwrap();
    assert_eq!(e.code, AppErrorCode::NoConfidentialityCfg);
    let _ = fs::remove_file(fullpath);
}

#[test]
fn secret_lookup_missing_source() {
    let store = UserSpaceConfidentiality::build("/no/such/dir/ut_secrets.json".to_string());
    let result = store.try_get_payload("backend_apps/auth_secret");
    assert!(result.is_err());
    let e = result.err().unwrap();
    assert!(matches!(e.code, AppErrorCode::IOerror(_)));
}
