//! Hash-tracked key-value storage with change history.
//!
//! Every write is hashed as it streams in; a key's value is only replaced,
//! and a change only recorded, when its content hash differs from the stored
//! one. The recorded history answers "what changed since" queries and gives
//! each key a modification time.
//!
//! # Key Concepts
//!
//! - **KeyValues**: the store contract consumed by adapters.
//! - **LocalStore**: filesystem implementation with an append-only JSON-lines ledger.
//! - **MemoryStore**: in-memory implementation, also usable as a test double.
//! - **ChangeClass / ModTime**: vocabulary of the change history.
//!
//! # Example
//!
//! ```no_run
//! use stowage_store::{ChangeClass, KeyValues, LocalStore, ModTime, StoreOptions};
//!
//! let store = LocalStore::open(StoreOptions::new("/var/lib/stowage"))?;
//! let before = ModTime::now();
//!
//! store.set("catalog/item-1", &mut &b"{\"price\":3}"[..])?;
//! store.set("catalog/item-1", &mut &b"{\"price\":4}"[..])?;
//!
//! let updated = store.since(before, ChangeClass::Update)?;
//! assert!(updated.contains("catalog/item-1"));
//! # Ok::<(), stowage_store::StoreError>(())
//! ```

use std::collections::BTreeSet;
use std::io::Read;

pub use self::change::{Change, ChangeClass, ModTime};
pub use self::content::{ContentHash, HashingReader};
pub use self::error::{Result, StoreError};
pub use self::ledger::{Ledger, LedgerEntry};
pub use self::local::LocalStore;
pub use self::memory::MemoryStore;
pub use self::options::StoreOptions;

mod change;
mod content;
mod error;
mod fs;
mod ledger;
mod local;
mod memory;
mod options;

/// Key-value store with content-hash change tracking.
///
/// Implementations must be safe for concurrent `set` calls against distinct
/// keys.
pub trait KeyValues: Send + Sync {
    /// Store the full content of `src` under `key`.
    ///
    /// The whole stream is read so its hash can be compared with the stored
    /// one; identical content records no change.
    fn set(&self, key: &str, src: &mut dyn Read) -> Result<()>;

    /// Open the stored value of `key`.
    fn get(&self, key: &str) -> Result<Box<dyn Read + Send>>;

    /// Keys with a change of `class` recorded at or after `ts`.
    fn since(&self, ts: ModTime, class: ChangeClass) -> Result<BTreeSet<String>>;

    /// Time of the latest create or update of `key`, or [`ModTime::UNKNOWN`]
    /// if the key is not present.
    fn mod_time(&self, key: &str) -> Result<ModTime>;

    fn has(&self, key: &str) -> Result<bool>;

    /// Remove `key`. Returns false if it was not present.
    fn cut(&self, key: &str) -> Result<bool>;

    /// Present keys, sorted.
    fn keys(&self) -> Result<Vec<String>>;
}
