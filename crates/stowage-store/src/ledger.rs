use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::{Change, ChangeClass, ContentHash, ModTime};

/// One persisted ledger record: a change, plus the content hash for writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    #[serde(flatten)]
    pub change: Change,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash:   Option<ContentHash>,
}

impl LedgerEntry {
    pub fn set(key: &str, class: ChangeClass, hash: ContentHash, at: ModTime) -> Self {
        Self {
            change: Change {
                key: key.to_string(),
                class,
                at,
            },
            hash:   Some(hash),
        }
    }

    pub fn cut(key: &str, at: ModTime) -> Self {
        Self {
            change: Change {
                key: key.to_string(),
                class: ChangeClass::Delete,
                at,
            },
            hash:   None,
        }
    }
}

/// Content hashes of present keys plus the ordered history of changes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ledger {
    hashes: BTreeMap<String, ContentHash>,
    log:    Vec<Change>,
}

impl Ledger {
    pub fn new() -> Self { Self::default() }

    /// Class a write of `hash` under `key` would record, or `None` when the
    /// content is identical to what is stored.
    pub fn classify(&self, key: &str, hash: &ContentHash) -> Option<ChangeClass> {
        match self.hashes.get(key) {
            Some(existing) if existing == hash => None,
            Some(_) => Some(ChangeClass::Update),
            None => Some(ChangeClass::Create),
        }
    }

    /// Apply a persisted or freshly built entry.
    pub fn apply(&mut self, entry: LedgerEntry) {
        let LedgerEntry { change, hash } = entry;
        match change.class {
            ChangeClass::Delete => {
                self.hashes.remove(&change.key);
            }
            ChangeClass::Create | ChangeClass::Update => {
                if let Some(hash) = hash {
                    self.hashes.insert(change.key.clone(), hash);
                }
            }
        }
        self.log.push(change);
    }

    /// Classify and apply a write in one step.
    pub fn record_set(&mut self, key: &str, hash: ContentHash, at: ModTime) -> Option<ChangeClass> {
        let class = self.classify(key, &hash)?;
        self.apply(LedgerEntry::set(key, class, hash, at));
        Some(class)
    }

    /// Record removal of `key`. Returns false if the key was not present.
    pub fn record_cut(&mut self, key: &str, at: ModTime) -> bool {
        if !self.contains(key) {
            return false;
        }
        self.apply(LedgerEntry::cut(key, at));
        true
    }

    pub fn contains(&self, key: &str) -> bool { self.hashes.contains_key(key) }

    pub fn hash(&self, key: &str) -> Option<&ContentHash> { self.hashes.get(key) }

    pub fn keys(&self) -> Vec<String> { self.hashes.keys().cloned().collect() }

    pub fn changes(&self) -> &[Change] { &self.log }

    /// Keys with a change of `class` recorded at or after `ts`.
    pub fn since(&self, ts: ModTime, class: ChangeClass) -> BTreeSet<String> {
        self.log
            .iter()
            .filter(|change| change.class == class && change.at >= ts)
            .map(|change| change.key.clone())
            .collect()
    }

    /// Time of the latest create or update of a present key.
    pub fn mod_time(&self, key: &str) -> ModTime {
        if !self.contains(key) {
            return ModTime::UNKNOWN;
        }
        self.log
            .iter()
            .rev()
            .find(|change| change.key == key && change.class != ChangeClass::Delete)
            .map_or(ModTime::UNKNOWN, |change| change.at)
    }

    /// Smallest entry list that replays to the same answers.
    ///
    /// Only the latest change per key and class is kept, in log order; the
    /// current hash rides on the last entry of each present key.
    pub fn compacted(&self) -> Vec<LedgerEntry> {
        let mut latest = HashMap::new();
        let mut last_of_key = HashMap::new();
        for (i, change) in self.log.iter().enumerate() {
            latest.insert((change.key.as_str(), change.class), i);
            last_of_key.insert(change.key.as_str(), i);
        }

        self.log
            .iter()
            .enumerate()
            .filter(|(i, change)| latest[&(change.key.as_str(), change.class)] == *i)
            .map(|(i, change)| {
                let hash = (last_of_key[change.key.as_str()] == i)
                    .then(|| self.hashes.get(&change.key).cloned())
                    .flatten();
                LedgerEntry {
                    change: change.clone(),
                    hash,
                }
            })
            .collect()
    }
}

impl FromIterator<LedgerEntry> for Ledger {
    fn from_iter<I: IntoIterator<Item = LedgerEntry>>(entries: I) -> Self {
        let mut ledger = Ledger::new();
        for entry in entries {
            ledger.apply(entry);
        }
        ledger
    }
}
