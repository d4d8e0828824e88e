use std::boxed::Box;
use std::collections::HashMap;
use std::result::Result as DefaultResult;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::config::AppInMemoryDbCfg;
use crate::error::{AppError, AppErrorCode};

// one row is a sequence of column values serialized to string,
// the decoding rule is left to each repository
pub type AppInMemFetchedSingleRow = Vec<String>;
pub type AppInMemFetchedSingleTable = HashMap<String, AppInMemFetchedSingleRow>;
pub type AppInMemUpdateData = HashMap<String, AppInMemFetchedSingleTable>;
pub type AppInMemFetchedData = AppInMemUpdateData;
pub type AppInMemFetchKeys = HashMap<String, Vec<String>>;
pub type AppInMemDeleteInfo = AppInMemFetchKeys;

type InnerTableMap = HashMap<String, AppInMemFetchedSingleTable>;

// the lock is held by one caller at a time, writes through `save_release`
// are applied against the same snapshot returned by `fetch_acquire`
pub struct AppInMemDstoreLock {
    guard: OwnedMutexGuard<InnerTableMap>,
}

pub trait AbsDStoreFilterKeyOp: Send + Sync {
    fn filter(&self, k: &String, v: &Vec<String>) -> bool;
}

#[async_trait]
pub trait AbstInMemoryDStore: Send + Sync {
    async fn create_table(&self, label: &str) -> DefaultResult<(), AppError>;

    async fn save(&self, data: AppInMemUpdateData) -> DefaultResult<usize, AppError>;

    async fn fetch(&self, keys: AppInMemFetchKeys) -> DefaultResult<AppInMemFetchedData, AppError>;

    // fetch rows and keep the store locked, so the caller can modify the
    // snapshot then write it back atomically with `save_release`
    async fn fetch_acquire(
        &self,
        keys: AppInMemFetchKeys,
    ) -> DefaultResult<(AppInMemFetchedData, AppInMemDstoreLock), AppError>;

    fn save_release(
        &self,
        data: AppInMemFetchedData,
        lock: AppInMemDstoreLock,
    ) -> DefaultResult<usize, AppError>;

    async fn delete(&self, info: AppInMemDeleteInfo) -> DefaultResult<usize, AppError>;

    async fn filter_keys(
        &self,
        table: String,
        op: &dyn AbsDStoreFilterKeyOp,
    ) -> DefaultResult<Vec<String>, AppError>;
} // end of trait AbstInMemoryDStore

pub struct AppInMemoryDStore {
    max_items_per_table: u32,
    tables: Arc<Mutex<InnerTableMap>>,
}

impl AppInMemoryDStore {
    pub fn new(cfg: &AppInMemoryDbCfg) -> Self {
        Self {
            max_items_per_table: cfg.max_items,
            tables: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn table_missing_error(label: &str) -> AppError {
        AppError {
            code: AppErrorCode::DataTableNotExist,
            detail: Some(label.to_string()),
        }
    }

    fn check_capacity(
        t_label: &str,
        curr_table: &AppInMemFetchedSingleTable,
        rows: &AppInMemFetchedSingleTable,
        max_items: u32,
    ) -> DefaultResult<(), AppError> {
        let num_new = rows
            .keys()
            .filter(|k| !curr_table.contains_key(k.as_str()))
            .count();
        let total = curr_table.len() + num_new;
        if total > (max_items as usize) {
            Err(AppError {
                code: AppErrorCode::ExceedingMaxLimit,
                detail: Some(format!("table:{}, limit:{}", t_label, max_items)),
            })
        } else {
            Ok(())
        }
    }

    fn write_through(
        tables: &mut InnerTableMap,
        data: AppInMemUpdateData,
        max_items: u32,
    ) -> DefaultResult<usize, AppError> {
        for (t_label, rows) in data.iter() {
            let curr_table = tables
                .get(t_label)
                .ok_or_else(|| Self::table_missing_error(t_label))?;
            Self::check_capacity(t_label, curr_table, rows, max_items)?;
        }
        let mut num_saved = 0usize;
        for (t_label, rows) in data {
            if let Some(curr_table) = tables.get_mut(t_label.as_str()) {
                for (pkey, row) in rows {
                    let _prev = curr_table.insert(pkey, row);
                    num_saved += 1;
                }
            }
        }
        Ok(num_saved)
    } // end of fn write_through

    fn read_through(
        tables: &InnerTableMap,
        keys: AppInMemFetchKeys,
    ) -> DefaultResult<AppInMemFetchedData, AppError> {
        let mut out: AppInMemFetchedData = HashMap::new();
        for (t_label, pkeys) in keys {
            let curr_table = tables
                .get(t_label.as_str())
                .ok_or_else(|| Self::table_missing_error(t_label.as_str()))?;
            let iter = pkeys
                .into_iter()
                .filter_map(|k| curr_table.get(&k).map(|row| (k, row.clone())));
            let fetched: AppInMemFetchedSingleTable = HashMap::from_iter(iter);
            out.insert(t_label, fetched);
        }
        Ok(out)
    }
} // end of impl AppInMemoryDStore

#[async_trait]
impl AbstInMemoryDStore for AppInMemoryDStore {
    async fn create_table(&self, label: &str) -> DefaultResult<(), AppError> {
        let mut guard = self.tables.lock().await;
        if !guard.contains_key(label) {
            guard.insert(label.to_string(), HashMap::new());
        } // repositories sharing a table may initialize it more than once
        Ok(())
    }

    async fn save(&self, data: AppInMemUpdateData) -> DefaultResult<usize, AppError> {
        let mut guard = self.tables.lock().await;
        Self::write_through(&mut guard, data, self.max_items_per_table)
    }

    async fn fetch(&self, keys: AppInMemFetchKeys) -> DefaultResult<AppInMemFetchedData, AppError> {
        let guard = self.tables.lock().await;
        Self::read_through(&guard, keys)
    }

    async fn fetch_acquire(
        &self,
        keys: AppInMemFetchKeys,
    ) -> DefaultResult<(AppInMemFetchedData, AppInMemDstoreLock), AppError> {
        let guard = self.tables.clone().lock_owned().await;
        let fetched = Self::read_through(&guard, keys)?;
        Ok((fetched, AppInMemDstoreLock { guard }))
    }

    fn save_release(
        &self,
        data: AppInMemFetchedData,
        lock: AppInMemDstoreLock,
    ) -> DefaultResult<usize, AppError> {
        let mut lock = lock;
        let num_saved = Self::write_through(&mut lock.guard, data, self.max_items_per_table)?;
        drop(lock); // release as soon as the write completes
        Ok(num_saved)
    }

    async fn delete(&self, info: AppInMemDeleteInfo) -> DefaultResult<usize, AppError> {
        let mut guard = self.tables.lock().await;
        let mut num_del = 0usize;
        for (t_label, pkeys) in info {
            let curr_table = guard
                .get_mut(t_label.as_str())
                .ok_or_else(|| Self::table_missing_error(t_label.as_str()))?;
            for k in pkeys {
                if curr_table.remove(&k).is_some() {
                    num_del += 1;
                }
            }
        }
        Ok(num_del)
    }

    async fn filter_keys(
        &self,
        table: String,
        op: &dyn AbsDStoreFilterKeyOp,
    ) -> DefaultResult<Vec<String>, AppError> {
        let guard = self.tables.lock().await;
        let curr_table = guard
            .get(table.as_str())
            .ok_or_else(|| Self::table_missing_error(table.as_str()))?;
        let out = curr_table
            .iter()
            .filter(|(k, v)| op.filter(k, v))
            .map(|(k, _v)| k.clone())
            .collect::<Vec<_>>();
        Ok(out)
    }
} // end of impl AbstInMemoryDStore for AppInMemoryDStore
