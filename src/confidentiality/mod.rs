mod userspace;

use std::boxed::Box;
use std::result::Result as DefaultResult;

use crate::config::{AppConfidentialCfg, AppConfig};
use crate::error::AppError;

pub use userspace::UserSpaceConfidentiality;

// read-only lookup of deployment secrets, the id is a slash-separated
// path of object keys into the backing document
pub trait AbstractConfidentiality: Send + Sync {
    fn try_get_payload(&self, id_: &str) -> DefaultResult<String, AppError>;
}

pub fn build_context(cfg: &AppConfig) -> DefaultResult<Box<dyn AbstractConfidentiality>, AppError> {
    let AppConfidentialCfg::UserSpace { sys_path } = &cfg.api_server.confidentiality;
    let fullpath = cfg.basepath.system.clone() + sys_path.as_str();
    Ok(Box::new(UserSpaceConfidentiality::build(fullpath)))
}
