use std::collections::HashMap;
use std::fs;
use std::result::Result as DefaultResult;
use std::sync::RwLock;

use serde_json::Value as JsnVal;

use super::AbstractConfidentiality;
use crate::error::{AppError, AppErrorCode};

// the secret document for this service stays tiny, its only readers
// are the database pool and the notification bot client
const SOURCE_SIZE_LIMIT_NBYTES: u64 = 8192;

fn io_failure(e: std::io::Error) -> AppError {
    AppError {
        code: AppErrorCode::IOerror(e.kind()),
        detail: Some(e.to_string()),
    }
}

pub struct UserSpaceConfidentiality {
    src_fullpath: String,
    cached: RwLock<HashMap<String, String>>,
}

impl UserSpaceConfidentiality {
    pub fn build(fullpath: String) -> Self {
        Self {
            src_fullpath: fullpath,
            cached: RwLock::new(HashMap::new()),
        }
    }

    fn load_document(&self) -> DefaultResult<JsnVal, AppError> {
        let srcpath = self.src_fullpath.as_str();
        let fsize = fs::metadata(srcpath).map_err(io_failure)?.len();
        if fsize > SOURCE_SIZE_LIMIT_NBYTES {
            return Err(AppError {
                code: AppErrorCode::ExceedingMaxLimit,
                detail: Some(format!("secret-source:{fsize}-bytes")),
            });
        }
        let raw = fs::read(srcpath).map_err(io_failure)?;
        serde_json::from_slice::<JsnVal>(&raw).map_err(|e| AppError {
            code: AppErrorCode::InvalidJsonFormat,
            detail: Some(e.to_string()),
        })
    }

    // the document is nested JSON objects, every token of the id walks
    // one object level down
    fn resolve(doc: &JsnVal, id_: &str) -> DefaultResult<String, AppError> {
        let missing = || AppError {
            code: AppErrorCode::NoConfidentialityCfg,
            detail: Some(format!("secret-id:{id_}")),
        };
        let mut node = doc;
        for tok in id_.split('/') {
            node = node
                .as_object()
                .and_then(|o| o.get(tok))
                .ok_or_else(missing)?;
        }
        match node {
            JsnVal::String(s) => Ok(s.clone()),
            _others => serde_json::to_string(node).map_err(|e| AppError {
                code: AppErrorCode::InvalidJsonFormat,
                detail: Some(e.to_string()),
            }),
        }
    } // end of fn resolve
} // end of impl UserSpaceConfidentiality

impl AbstractConfidentiality for UserSpaceConfidentiality {
    fn try_get_payload(&self, id_: &str) -> DefaultResult<String, AppError> {
        let lock_failure = |detail: String| AppError {
            code: AppErrorCode::AcquireLockFailure,
            detail: Some(detail + ", source: UserSpaceConfidentiality"),
        };
        {
            let rguard = self
                .cached
                .read()
                .map_err(|e| lock_failure(e.to_string()))?;
            if let Some(v) = rguard.get(id_) {
                return Ok(v.clone());
            }
        }
        let doc = self.load_document()?;
        let found = Self::resolve(&doc, id_)?;
        let mut wguard = self
            .cached
            .write()
            .map_err(|e| lock_failure(e.to_string()))?;
        wguard.insert(id_.to_string(), found.clone());
        Ok(found)
    } // end of fn try_get_payload
} // end of impl AbstractConfidentiality
