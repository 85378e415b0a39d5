use std::io::Read;
use std::sync::Arc;
use std::thread;

use stowage_store::{
    ChangeClass, KeyValues, LocalStore, MemoryStore, ModTime, Result, StoreError, StoreOptions,
};
use tempfile::tempdir;

fn read_all(store: &dyn KeyValues, key: &str) -> String {
    let mut out = String::new();
    store.get(key).unwrap().read_to_string(&mut out).unwrap();
    out
}

#[test]
fn test_local_store_survives_reopen() -> Result<()> {
    let dir = tempdir()?;
    let options = StoreOptions::new(dir.path()).extension(".txt");

    {
        let store = LocalStore::open(options.clone())?;
        store.set("a", &mut &b"one"[..])?;
        store.set("a", &mut &b"two"[..])?;
        store.set("b", &mut &b"three"[..])?;
    }

    let store = LocalStore::open(options)?;
    assert_eq!(store.keys()?, ["a", "b"]);
    assert_eq!(read_all(&store, "a"), "two");
    assert!(store.mod_time("a")?.is_known());

    let updated = store.since(ModTime::from_unix(0), ChangeClass::Update)?;
    assert_eq!(updated.into_iter().collect::<Vec<_>>(), ["a"]);
    Ok(())
}

#[test]
fn test_local_store_cut_records_delete() -> Result<()> {
    let dir = tempdir()?;
    let store = LocalStore::open(StoreOptions::new(dir.path()))?;

    store.set("gone", &mut &b"x"[..])?;
    assert!(store.has("gone")?);
    assert!(store.cut("gone")?);
    assert!(!store.cut("gone")?);

    assert!(!store.has("gone")?);
    assert_eq!(store.mod_time("gone")?, ModTime::UNKNOWN);
    assert!(matches!(store.get("gone"), Err(StoreError::NotFound(_))));
    assert!(store.since(ModTime::from_unix(0), ChangeClass::Delete)?.contains("gone"));
    Ok(())
}

#[test]
fn test_since_in_the_future_is_empty() -> Result<()> {
    let dir = tempdir()?;
    let store = LocalStore::open(StoreOptions::new(dir.path()))?;

    store.set("a", &mut &b"1"[..])?;
    store.set("a", &mut &b"2"[..])?;

    let future = ModTime::from_unix(ModTime::now().as_unix() + 3600);
    assert!(store.since(future, ChangeClass::Update)?.is_empty());
    Ok(())
}

#[test]
fn test_concurrent_sets_on_distinct_keys() -> Result<()> {
    let dir = tempdir()?;
    let store = Arc::new(LocalStore::open(StoreOptions::new(dir.path()))?);

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                let body = format!("value-{i}");
                store.set(&format!("key-{i}"), &mut body.as_bytes())
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap()?;
    }

    assert_eq!(store.keys()?.len(), 16);
    assert_eq!(store.since(ModTime::from_unix(0), ChangeClass::Create)?.len(), 16);
    assert_eq!(read_all(&*store, "key-7"), "value-7");

    let reopened = LocalStore::open(StoreOptions::new(dir.path()))?;
    assert_eq!(reopened.keys()?.len(), 16);
    Ok(())
}

#[test]
fn test_memory_and_local_agree_on_change_classes() -> Result<()> {
    let dir = tempdir()?;
    let local = LocalStore::open(StoreOptions::new(dir.path()))?;
    let memory = MemoryStore::new();

    for store in [&local as &dyn KeyValues, &memory] {
        store.set("k", &mut &b"v1"[..])?;
        store.set("k", &mut &b"v1"[..])?;
        store.set("k", &mut &b"v2"[..])?;

        let epoch = ModTime::from_unix(0);
        assert_eq!(store.since(epoch, ChangeClass::Create)?.len(), 1);
        assert_eq!(store.since(epoch, ChangeClass::Update)?.len(), 1);
        assert_eq!(read_all(store, "k"), "v2");

        assert!(matches!(store.get(""), Err(StoreError::InvalidKey(_))));
        assert!(matches!(store.cut(""), Err(StoreError::InvalidKey(_))));
    }
    Ok(())
}
