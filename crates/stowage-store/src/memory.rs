use std::collections::{BTreeMap, BTreeSet};
use std::io::{Cursor, Read};
use std::sync::Mutex;

use tracing::{debug, trace};

use crate::error::validate_key;
use crate::{ChangeClass, HashingReader, KeyValues, Ledger, ModTime, Result, StoreError};

#[derive(Default)]
struct State {
    ledger: Ledger,
    values: BTreeMap<String, Vec<u8>>,
}

/// In-memory store with the same change tracking as [`LocalStore`](crate::LocalStore).
#[derive(Default)]
pub struct MemoryStore {
    state:       Mutex<State>,
    fail_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self { Self::default() }

    /// Reject every `set` with [`StoreError::WriteRejected`].
    pub fn with_fail_writes(mut self, fail_writes: bool) -> Self {
        self.fail_writes = fail_writes;
        self
    }

    /// Full change history, oldest first.
    pub fn changes(&self) -> Result<Vec<crate::Change>> {
        Ok(self.state.lock()?.ledger.changes().to_vec())
    }
}

impl KeyValues for MemoryStore {
    fn set(&self, key: &str, src: &mut dyn Read) -> Result<()> {
        validate_key(key)?;
        if self.fail_writes {
            return Err(StoreError::WriteRejected(key.to_string()));
        }

        let mut reader = HashingReader::new(src);
        let mut value = Vec::new();
        reader.read_to_end(&mut value)?;
        let hash = reader.finish();

        let mut state = self.state.lock()?;
        let Some(class) = state.ledger.record_set(key, hash, ModTime::now()) else {
            trace!(key, "content unchanged, nothing recorded");
            return Ok(());
        };
        state.values.insert(key.to_string(), value);

        debug!(key, ?class, "recorded change");
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Box<dyn Read + Send>> {
        validate_key(key)?;
        let state = self.state.lock()?;
        let value = state
            .values
            .get(key)
            .ok_or_else(|| StoreError::NotFound(key.to_string()))?;
        Ok(Box::new(Cursor::new(value.clone())))
    }

    fn since(&self, ts: ModTime, class: ChangeClass) -> Result<BTreeSet<String>> {
        Ok(self.state.lock()?.ledger.since(ts, class))
    }

    fn mod_time(&self, key: &str) -> Result<ModTime> { Ok(self.state.lock()?.ledger.mod_time(key)) }

    fn has(&self, key: &str) -> Result<bool> { Ok(self.state.lock()?.ledger.contains(key)) }

    fn cut(&self, key: &str) -> Result<bool> {
        validate_key(key)?;
        let mut state = self.state.lock()?;
        state.values.remove(key);
        let removed = state.ledger.record_cut(key, ModTime::now());
        if removed {
            debug!(key, "removed");
        }
        Ok(removed)
    }

    fn keys(&self) -> Result<Vec<String>> { Ok(self.state.lock()?.ledger.keys()) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fail_writes_rejects_without_recording() {
        let store = MemoryStore::new().with_fail_writes(true);

        let result = store.set("a", &mut &b"x"[..]);
        assert!(matches!(result, Err(StoreError::WriteRejected(key)) if key == "a"));
        assert!(!store.has("a").unwrap());
        assert!(store.changes().unwrap().is_empty());
    }

    #[test]
    fn test_empty_key_is_rejected_everywhere() {
        let store = MemoryStore::new();
        assert!(matches!(store.set("", &mut &b"x"[..]), Err(StoreError::InvalidKey(_))));
        assert!(matches!(store.get(""), Err(StoreError::InvalidKey(_))));
        assert!(matches!(store.cut(""), Err(StoreError::InvalidKey(_))));
    }

    #[test]
    fn test_get_missing_key() {
        let store = MemoryStore::new();
        assert!(matches!(store.get("nope"), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn test_set_update_cut_history() {
        let store = MemoryStore::new();
        store.set("a", &mut &b"1"[..]).unwrap();
        store.set("a", &mut &b"1"[..]).unwrap();
        store.set("a", &mut &b"2"[..]).unwrap();
        assert!(store.cut("a").unwrap());
        assert!(!store.cut("a").unwrap());

        let classes: Vec<_> = store.changes().unwrap().into_iter().map(|c| c.class).collect();
        assert_eq!(classes, [ChangeClass::Create, ChangeClass::Update, ChangeClass::Delete]);
    }
}
