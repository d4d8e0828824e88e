use std::collections::HashMap;

use flower_delivery::datastore::{
    AbsDStoreFilterKeyOp, AbstInMemoryDStore, AppInMemDeleteInfo, AppInMemFetchKeys,
    AppInMemUpdateData, AppInMemoryDStore,
};
use flower_delivery::error::AppErrorCode;
use flower_delivery::AppInMemoryDbCfg;

const UT_TABLE: &str = "ut_bouquet";

fn ut_inmem_store(max_items: u32) -> AppInMemoryDStore {
    let cfg = AppInMemoryDbCfg {
        alias: "unit-test".to_string(),
        max_items,
    };
    AppInMemoryDStore::new(&cfg)
}

fn ut_rows(items: Vec<(&str, Vec<&str>)>) -> AppInMemUpdateData {
    let rows = items
        .into_iter()
        .map(|(k, cols)| {
            let row = cols.into_iter().map(|c| c.to_string()).collect::<Vec<_>>();
            (k.to_string(), row)
        })
        .collect::<HashMap<_, _>>();
    HashMap::from([(UT_TABLE.to_string(), rows)])
}

#[tokio::test]
async fn save_fetch_ok() {
    let store = ut_inmem_store(16);
    store.create_table(UT_TABLE).await.unwrap();
    let data = ut_rows(vec![
        ("r1", vec!["rose", "7"]),
        ("r2", vec!["tulip", "3"]),
    ]);
    let num = store.save(data).await.unwrap();
    assert_eq!(num, 2);
    let keys: AppInMemFetchKeys = HashMap::from([(
        UT_TABLE.to_string(),
        vec!["r1".to_string(), "r404".to_string()],
    )]);
    let mut fetched = store.fetch(keys).await.unwrap();
    let rows = fetched.remove(UT_TABLE).unwrap();
    assert_eq!(rows.len(), 1);
    let row = rows.get("r1").unwrap();
    assert_eq!(row[0].as_str(), "rose");
    assert_eq!(row[1].as_str(), "7");
}

#[tokio::test]
async fn fetch_table_not_exist() {
    let store = ut_inmem_store(16);
    let keys: AppInMemFetchKeys =
        HashMap::from([(UT_TABLE.to_string(), vec!["r1".to_string()])]);
    let result = store.fetch(keys).await;
    assert!(result.is_err());
    let e = result.err().unwrap();
    assert_eq!(e.code, AppErrorCode::DataTableNotExist);
}

#[tokio::test]
async fn save_exceeding_capacity() {
    let store = ut_inmem_store(2);
    store.create_table(UT_TABLE).await.unwrap();
    let data = ut_rows(vec![("r1", vec!["a"]), ("r2", vec!["b"])]);
    store.save(data).await.unwrap();
    let data = ut_rows(vec![("r3", vec!["c"])]);
    let result = store.save(data).await;
    assert!(result.is_err());
    assert_eq!(result.err().unwrap().code, AppErrorCode::ExceedingMaxLimit);
    // overwriting existing keys does not count against the limit
    let data = ut_rows(vec![("r2", vec!["b2"])]);
    let num = store.save(data).await.unwrap();
    assert_eq!(num, 1);
}

#[tokio::test]
async fn delete_ok() {
    let store = ut_inmem_store(16);
    store.create_table(UT_TABLE).await.unwrap();
    let data = ut_rows(vec![("r1", vec!["a"]), ("r2", vec!["b"])]);
    store.save(data).await.unwrap();
    let info: AppInMemDeleteInfo = HashMap::from([(
        UT_TABLE.to_string(),
        vec!["r1".to_string(), "r404".to_string()],
    )]);
    let num = store.delete(info).await.unwrap();
    assert_eq!(num, 1);
    let keys: AppInMemFetchKeys =
        HashMap::from([(UT_TABLE.to_string(), vec!["r1".to_string()])]);
    let mut fetched = store.fetch(keys).await.unwrap();
    let rows = fetched.remove(UT_TABLE).unwrap();
    assert!(rows.is_empty());
}

struct PrefixOp {
    prefix: String,
}
impl AbsDStoreFilterKeyOp for PrefixOp {
    fn filter(&self, k: &String, _v: &Vec<String>) -> bool {
        k.starts_with(self.prefix.as_str())
    }
}

#[tokio::test]
async fn filter_keys_ok() {
    let store = ut_inmem_store(16);
    store.create_table(UT_TABLE).await.unwrap();
    let data = ut_rows(vec![
        ("c1/10", vec!["a"]),
        ("c1/11", vec!["b"]),
        ("c2/10", vec!["c"]),
    ]);
    store.save(data).await.unwrap();
    let op = PrefixOp {
        prefix: "c1/".to_string(),
    };
    let mut keys = store.filter_keys(UT_TABLE.to_string(), &op).await.unwrap();
    keys.sort();
    assert_eq!(keys, vec!["c1/10".to_string(), "c1/11".to_string()]);
}

#[tokio::test]
async fn locked_write_visible_after_release() {
    let store = ut_inmem_store(16);
    store.create_table(UT_TABLE).await.unwrap();
    let data = ut_rows(vec![("r1", vec!["rose", "7"])]);
    store.save(data).await.unwrap();
    let keys: AppInMemFetchKeys =
        HashMap::from([(UT_TABLE.to_string(), vec!["r1".to_string()])]);
    let (mut fetched, lock) = store.fetch_acquire(keys.clone()).await.unwrap();
    let rows = fetched.get_mut(UT_TABLE).unwrap();
    if let Some(row) = rows.get_mut("r1") {
        row[1] = "9".to_string();
    }
    let num = store.save_release(fetched, lock).unwrap();
    assert_eq!(num, 1);
    let mut refetched = store.fetch(keys).await.unwrap();
    let rows = refetched.remove(UT_TABLE).unwrap();
    assert_eq!(rows.get("r1").unwrap()[1].as_str(), "9");
}
