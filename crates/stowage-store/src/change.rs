use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of mutation recorded against a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeClass {
    /// First write of a key that was not present.
    Create,
    /// Write whose content hash differs from the stored one.
    Update,
    /// Removal of a present key.
    Delete,
}

impl fmt::Display for ChangeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeClass::Create => write!(f, "create"),
            ChangeClass::Update => write!(f, "update"),
            ChangeClass::Delete => write!(f, "delete"),
        }
    }
}

/// Modification time in unix seconds.
///
/// [`ModTime::UNKNOWN`] stands for "no recorded modification" and is never
/// produced by the clock, so it stays distinct from the epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModTime(i64);

impl ModTime {
    pub const UNKNOWN: ModTime = ModTime(-1);

    pub const fn from_unix(secs: i64) -> Self { Self(secs) }

    pub fn now() -> Self { Self(chrono::Utc::now().timestamp()) }

    pub const fn as_unix(self) -> i64 { self.0 }

    pub fn is_known(self) -> bool { self != Self::UNKNOWN }
}

impl fmt::Display for ModTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_known() {
            return write!(f, "unknown");
        }
        match chrono::DateTime::from_timestamp(self.0, 0) {
            Some(at) => write!(f, "{}", at.to_rfc3339()),
            None => write!(f, "{}", self.0),
        }
    }
}

/// One entry of a store's change history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change {
    pub key:   String,
    pub class: ChangeClass,
    pub at:    ModTime,
}
