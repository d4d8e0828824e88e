use std::collections::HashMap;
use std::ffi::OsStr;
use std::io::stdout;
use std::path::Path;

use tracing::dispatcher::Dispatch;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::Layer as TraceLayer;
use tracing_subscriber::prelude::__tracing_subscriber_SubscriberExt;
use tracing_subscriber::{self, Layer as LayerIntf, Registry};

use crate::config::{AppBasepathCfg, AppLogHandlerCfg, AppLoggerCfg, AppLoggingCfg};
use crate::constant::logging::{Destination as DstOption, Level as AppLogLevelInner};
use crate::AppLogAlias;

pub type AppLogLevel = AppLogLevelInner;

// this macro has to be exposed since top-level binary executable (e.g. web)
// will invoke this macro indirectly
#[macro_export]
macro_rules! to_3rdparty_level {
    ($lvlin:expr) => {
        match $lvlin {
            $crate::logging::AppLogLevel::FATAL | $crate::logging::AppLogLevel::ERROR => {
                tracing::Level::ERROR
            }
            $crate::logging::AppLogLevel::WARNING => tracing::Level::WARN,
            $crate::logging::AppLogLevel::INFO => tracing::Level::INFO,
            $crate::logging::AppLogLevel::DEBUG => tracing::Level::DEBUG,
            $crate::logging::AppLogLevel::TRACE => tracing::Level::TRACE,
        } // in `tracing` ecosystem, level comparison is like
          // TRACE > DEBUG > INFO > WARN > ERROR
    };
}

// non-blocking writer plus the level its handler defaults to, the
// worker guard has to stay alive or buffered messages never flush
struct WriterHandle {
    sink: NonBlocking,
    default_level: tracing::Level,
    guard: WorkerGuard,
}

pub struct AppLogContext {
    loggers: HashMap<AppLogAlias, Dispatch>,
    _io_guards: Vec<WorkerGuard>,
}

fn build_writer(basepath: &AppBasepathCfg, cfg: &AppLogHandlerCfg) -> (NonBlocking, WorkerGuard) {
    match (&cfg.destination, cfg.path.as_deref()) {
        (DstOption::LOCALFS, Some(rpath)) => {
            let fullpath = Path::new(basepath.system.as_str()).join(rpath);
            let dir = fullpath.parent().unwrap_or_else(|| Path::new("."));
            let fname_prefix = fullpath.file_name().unwrap_or_else(|| OsStr::new("app.log"));
            let wr_dst = RollingFileAppender::new(Rotation::NEVER, dir, fname_prefix);
            tracing_appender::non_blocking(wr_dst)
        }
        // config loading already rejects a file handler without a path,
        // everything else writes to the console
        _others => tracing_appender::non_blocking(stdout()),
    }
} // Note tracing spawns new thread dedicating to each non-blocking writer,
  // the context-switching rule depends on underlying OS platform.

fn build_dispatch(cfg: &AppLoggerCfg, writers: &HashMap<AppLogAlias, WriterHandle>) -> Dispatch {
    let iter = cfg.handlers.iter().filter_map(|alias| {
        writers.get(alias).map(|h| {
            let lvl = match cfg.level.as_ref() {
                Some(l) => to_3rdparty_level!(l),
                None => h.default_level,
            };
            TraceLayer::new()
                .with_writer(h.sink.clone())
                .with_file(false) // to prevent full path exposed
                .with_line_number(true)
                .with_thread_ids(true)
                .with_level(true)
                .with_filter(LevelFilter::from_level(lvl))
        })
    });
    let layers = Vec::from_iter(iter);
    Dispatch::new(Registry::default().with(layers))
} // end of fn build_dispatch

impl AppLogContext {
    pub fn new(basepath: &AppBasepathCfg, cfg: &AppLoggingCfg) -> Self {
        let writers = cfg
            .handlers
            .iter()
            .map(|item| {
                let (sink, guard) = build_writer(basepath, item);
                let handle = WriterHandle {
                    sink,
                    default_level: to_3rdparty_level!(&item.min_level),
                    guard,
                };
                (item.alias.clone(), handle)
            })
            .collect::<HashMap<_, _>>();
        let loggers = cfg
            .loggers
            .iter()
            .map(|item| (item.alias.clone(), build_dispatch(item, &writers)))
            .collect::<HashMap<_, _>>();
        Self {
            loggers,
            _io_guards: writers.into_values().map(|h| h.guard).collect(),
        }
    }

    pub fn get_assigner(&self, key: &str) -> Option<&Dispatch> {
        self.loggers.get(key)
    }
} // end of impl AppLogContext

#[macro_export]
macro_rules! app_log_event {
    ( $ctx:ident, $lvl:expr, $($arg:tt)+ ) => {{
        const MOD_PATH:&str = module_path!();
        if let Some(assigner) = $ctx.get_assigner(MOD_PATH) {
            const LVL_INNER: tracing::Level = $crate::logging::to_3rdparty_level!($lvl);
            tracing::dispatcher::with_default(assigner, || {
                tracing::event!(LVL_INNER, $($arg)+);
            });
        } else {
            println!("[WARN] log dispatcher not found at the module path: {}", MOD_PATH);
            println!($($arg)+);
        }
    }};
}

pub use app_log_event;
pub use to_3rdparty_level;
