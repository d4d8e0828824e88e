use std::result::Result as DefaultResult;
use std::sync::Arc;

use uuid::{Builder, NoContext, Timestamp, Uuid};

pub mod api;
pub mod confidentiality;
pub mod constant;
pub mod datastore;
pub mod error;
pub mod logging;
pub mod model;
pub mod network;
pub mod notify;
pub mod repository;
pub mod usecase;

mod config;
pub use config::{
    ApiServerCfg, AppAuthCfg, AppBasepathCfg, AppCfgHardLimit, AppConfidentialCfg, AppConfig,
    AppDataStoreCfg, AppInMemoryDbCfg, AppLogHandlerCfg, AppLoggerCfg, AppLoggingCfg,
    AppPushNotifierCfg, AppReportCfg, WebApiListenCfg, WebApiRouteCfg,
};

mod auth;
pub use auth::{AppAuthedClaim, AppJwtAuthentication};

use confidentiality::AbstractConfidentiality;
use error::AppError;
use notify::AbstractOrderNotifier;

type WebApiPath = String;
type WebApiHdlrLabel = &'static str;
type AppLogAlias = String;

pub struct AppDataStoreContext {
    pub in_mem: Option<Arc<Box<dyn datastore::AbstInMemoryDStore>>>,
    pub sql_dbs: Option<Vec<Arc<datastore::AppMariaDbStore>>>,
}

// global state shared by all threads
pub struct AppSharedState {
    _cfg: Arc<AppConfig>,
    _log: Arc<logging::AppLogContext>,
    dstore: Arc<AppDataStoreContext>,
    _auth: Arc<AppJwtAuthentication>,
    _notifier: Arc<Box<dyn AbstractOrderNotifier>>,
}

impl AppSharedState {
    pub fn new(
        cfg: AppConfig,
        log: logging::AppLogContext,
        confidential: Box<dyn AbstractConfidentiality>,
    ) -> DefaultResult<Self, AppError> {
        let confidential = Arc::new(confidential);
        let log = Arc::new(log);
        let (in_mem, sql_dbs) = datastore::build_context(
            log.clone(),
            &cfg.api_server.data_store,
            confidential.clone(),
        );
        let in_mem = in_mem.map(Arc::new);
        let ds_ctx = Arc::new(AppDataStoreContext { in_mem, sql_dbs });
        let auth = AppJwtAuthentication::try_build(&cfg.api_server.auth, confidential.clone())?;
        let notifier = notify::build_context(&cfg.api_server.notifier, confidential)?;
        Ok(Self {
            _cfg: Arc::new(cfg),
            _log: log,
            dstore: ds_ctx,
            _auth: Arc::new(auth),
            _notifier: Arc::new(notifier),
        })
    } // end of fn new

    pub fn config(&self) -> &Arc<AppConfig> {
        &self._cfg
    }

    pub fn log_context(&self) -> &Arc<logging::AppLogContext> {
        &self._log
    }

    pub fn datastore(&self) -> Arc<AppDataStoreContext> {
        self.dstore.clone()
    }

    pub fn jwt_auth(&self) -> &Arc<AppJwtAuthentication> {
        &self._auth
    }

    pub fn notifier(&self) -> Arc<Box<dyn AbstractOrderNotifier>> {
        self._notifier.clone()
    }
} // end of impl AppSharedState

impl Clone for AppSharedState {
    fn clone(&self) -> Self {
        Self {
            _cfg: self._cfg.clone(),
            _log: self._log.clone(),
            dstore: self.dstore.clone(),
            _auth: self._auth.clone(),
            _notifier: self._notifier.clone(),
        }
    }
}

fn generate_custom_uid(machine_code: u8) -> Uuid {
    // UUIDv7 is for single-node application. This app needs to consider
    // scalability of multi-node environment, UUIDv8 can be utilized cuz it
    // allows custom ID layout, so few bits of the ID can be assigned to
    // represent each machine/node ID,  rest of that should be timestamp with
    // random byte sequence
    let ts_ctx = NoContext;
    let (secs, nano) = Timestamp::now(ts_ctx).to_unix();
    let millis = (secs * 1000).saturating_add((nano as u64) / 1_000_000);
    let mut node_id = rand::random::<[u8; 10]>();
    node_id[0] = machine_code;
    let builder = Builder::from_unix_timestamp_millis(millis, &node_id);
    builder.into_uuid()
}
