use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::ContentHash;

const DEFAULT_LEDGER_NAME: &str = "_ledger.jsonl";

// NAME_MAX on common filesystems, less room for the backup name's `.` and `.bak`.
const MAX_VALUE_NAME: usize = 255 - 5;

/// Configuration for a [`LocalStore`](crate::LocalStore).
///
/// Deserializable so it can be embedded in an application's own config file;
/// missing fields fall back to their defaults.
///
/// # Examples
///
/// ```
/// use stowage_store::StoreOptions;
///
/// let options = StoreOptions::new("/var/lib/stowage")
///     .extension(".json")
///     .ledger_name("_changes.jsonl");
/// assert_eq!(options.get_extension(), ".json");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct StoreOptions {
    root:        PathBuf,
    #[serde(default)]
    extension:   String,
    #[serde(default = "default_ledger_name")]
    ledger_name: String,
}

fn default_ledger_name() -> String { DEFAULT_LEDGER_NAME.to_string() }

impl StoreOptions {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root:        root.into(),
            extension:   String::new(),
            ledger_name: default_ledger_name(),
        }
    }

    /// Suffix appended to every value file name.
    pub fn extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// File name of the ledger inside the root directory.
    pub fn ledger_name(mut self, ledger_name: impl Into<String>) -> Self {
        self.ledger_name = ledger_name.into();
        self
    }

    pub fn get_root(&self) -> &Path { &self.root }

    pub fn get_extension(&self) -> &str { &self.extension }

    pub fn get_ledger_name(&self) -> &str { &self.ledger_name }

    pub(crate) fn ledger_path(&self) -> PathBuf { self.root.join(&self.ledger_name) }

    /// File name holding the value of `key`.
    ///
    /// Keys are hex-encoded into a flat name; keys too long for that fall
    /// back to the hash of the key, which cannot collide with a hex name.
    pub(crate) fn value_name(&self, key: &str) -> String {
        let encoded = format!("{}{}", hex::encode(key.as_bytes()), self.extension);
        if encoded.len() <= MAX_VALUE_NAME {
            return encoded;
        }
        format!("sha256-{}{}", ContentHash::of(key.as_bytes()), self.extension)
    }

    pub(crate) fn value_path(&self, key: &str) -> PathBuf { self.root.join(self.value_name(key)) }

    /// Where the previous value of `key` is parked while a change commits.
    pub(crate) fn backup_path(&self, key: &str) -> PathBuf {
        self.root.join(format!(".{}.bak", self.value_name(key)))
    }
}
