use std::collections::BTreeSet;
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tempfile::NamedTempFile;
use tracing::{debug, trace, warn};

use crate::error::validate_key;
use crate::fs::atomic_write;
use crate::{
    ChangeClass, HashingReader, KeyValues, Ledger, LedgerEntry, ModTime, Result, StoreError,
    StoreOptions,
};

/// Filesystem-backed store that tracks content hashes and change history.
///
/// Values are streamed into a staging file in the root while being hashed,
/// and only replace the stored value when the hash differs. Each change is
/// appended to a JSON-lines ledger; the ledger lock covers only the
/// compare-and-commit step, so concurrent writes to distinct keys stream in
/// parallel.
///
/// A change is visible only once its ledger line is written. If that fails,
/// the value file is put back as it was and the in-memory ledger is left
/// untouched, so a retry records the change again.
pub struct LocalStore {
    options: StoreOptions,
    ledger:  Mutex<Ledger>,
}

impl LocalStore {
    /// Open (or create) a store rooted at `options.get_root()`.
    ///
    /// A torn final ledger line, left by an interrupted append, is dropped
    /// and the ledger rewritten compacted.
    pub fn open(options: StoreOptions) -> Result<Self> {
        std::fs::create_dir_all(options.get_root())?;

        let ledger_path = options.ledger_path();
        let ledger = match std::fs::read(&ledger_path) {
            Ok(bytes) => {
                let (ledger, torn) = replay(&ledger_path, &bytes)?;
                if torn {
                    warn!(path = %ledger_path.display(), "dropping torn ledger line");
                    atomic_write(&ledger_path, &encode(&ledger.compacted())?)?;
                }
                ledger
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ledger::new(),
            Err(e) => return Err(e.into()),
        };

        debug!(
            root = %options.get_root().display(),
            keys = ledger.keys().len(),
            "opened local store"
        );

        Ok(Self {
            options,
            ledger: Mutex::new(ledger),
        })
    }

    pub fn options(&self) -> &StoreOptions { &self.options }

    /// Rewrite the ledger keeping only the latest change per key and class.
    ///
    /// Answers to `since`, `mod_time` and `keys` are unchanged.
    pub fn compact(&self) -> Result<()> {
        let mut ledger = self.ledger.lock()?;
        let entries = ledger.compacted();
        let before = ledger.changes().len();

        atomic_write(&self.options.ledger_path(), &encode(&entries)?)?;
        *ledger = entries.into_iter().collect();

        debug!(before, after = ledger.changes().len(), "compacted ledger");
        Ok(())
    }

    fn append(&self, entry: &LedgerEntry) -> Result<()> {
        let mut line = serde_json::to_vec(entry)?;
        line.push(b'\n');

        let mut journal = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.options.ledger_path())?;
        let len = journal.metadata()?.len();
        if let Err(e) = journal.write_all(&line) {
            // keep the next append on a line boundary
            let _ = journal.set_len(len);
            return Err(e.into());
        }
        Ok(())
    }

    /// Put the previous value back after a failed commit.
    fn restore(&self, value_path: &Path, backup: Option<&Path>) {
        let restored = match backup {
            Some(backup) => std::fs::rename(backup, value_path),
            None => std::fs::remove_file(value_path),
        };
        match restored {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %value_path.display(), error = %e, "failed to roll back value"),
        }
    }

    fn discard(&self, backup: Option<&Path>) {
        let Some(backup) = backup else {
            return;
        };
        if let Err(e) = std::fs::remove_file(backup) {
            warn!(path = %backup.display(), error = %e, "failed to remove backup");
        }
    }
}

impl KeyValues for LocalStore {
    fn set(&self, key: &str, src: &mut dyn Read) -> Result<()> {
        validate_key(key)?;

        let mut staged = NamedTempFile::new_in(self.options.get_root())?;
        let mut reader = HashingReader::new(src);
        io::copy(&mut reader, &mut staged)?;
        let size = reader.bytes_read();
        let hash = reader.finish();

        let mut ledger = self.ledger.lock()?;
        let Some(class) = ledger.classify(key, &hash) else {
            trace!(key, "content unchanged, nothing recorded");
            return Ok(());
        };
        let entry = LedgerEntry::set(key, class, hash, ModTime::now());

        let value_path = self.options.value_path(key);
        let backup: Option<PathBuf> =
            (class == ChangeClass::Update).then(|| self.options.backup_path(key));
        if let Some(backup) = &backup {
            std::fs::rename(&value_path, backup)?;
        }

        let committed = staged
            .persist(&value_path)
            .map_err(|e| StoreError::Io(e.error))
            .and_then(|_| self.append(&entry));
        if let Err(e) = committed {
            self.restore(&value_path, backup.as_deref());
            return Err(e);
        }
        self.discard(backup.as_deref());

        ledger.apply(entry);
        debug!(key, ?class, size, "recorded change");
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Box<dyn Read + Send>> {
        validate_key(key)?;
        match File::open(self.options.value_path(key)) {
            Ok(file) => Ok(Box::new(file)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(StoreError::NotFound(key.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    fn since(&self, ts: ModTime, class: ChangeClass) -> Result<BTreeSet<String>> {
        Ok(self.ledger.lock()?.since(ts, class))
    }

    fn mod_time(&self, key: &str) -> Result<ModTime> { Ok(self.ledger.lock()?.mod_time(key)) }

    fn has(&self, key: &str) -> Result<bool> { Ok(self.ledger.lock()?.contains(key)) }

    fn cut(&self, key: &str) -> Result<bool> {
        validate_key(key)?;

        let mut ledger = self.ledger.lock()?;
        if !ledger.contains(key) {
            return Ok(false);
        }

        let value_path = self.options.value_path(key);
        let backup = self.options.backup_path(key);
        let parked = match std::fs::rename(&value_path, &backup) {
            Ok(()) => Some(backup.as_path()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => return Err(e.into()),
        };

        let entry = LedgerEntry::cut(key, ModTime::now());
        if let Err(e) = self.append(&entry) {
            if let Some(backup) = parked {
                self.restore(&value_path, Some(backup));
            }
            return Err(e);
        }
        self.discard(parked);

        ledger.apply(entry);
        debug!(key, "removed");
        Ok(true)
    }

    fn keys(&self) -> Result<Vec<String>> { Ok(self.ledger.lock()?.keys()) }
}

/// Rebuild a ledger from its JSON lines. Returns whether a torn final line
/// (no trailing newline) was skipped.
fn replay(path: &Path, bytes: &[u8]) -> Result<(Ledger, bool)> {
    let (body, tail) = match bytes.iter().rposition(|b| *b == b'\n') {
        Some(end) => bytes.split_at(end + 1),
        None => (&bytes[..0], bytes),
    };

    let mut ledger = Ledger::new();
    for line in body.split(|b| *b == b'\n').filter(|line| !line.is_empty()) {
        let entry = serde_json::from_slice::<LedgerEntry>(line).inspect_err(|e| {
            warn!(path = %path.display(), error = %e, "ledger is unreadable");
        })?;
        ledger.apply(entry);
    }

    Ok((ledger, !tail.is_empty()))
}

fn encode(entries: &[LedgerEntry]) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    for entry in entries {
        serde_json::to_writer(&mut bytes, entry)?;
        bytes.push(b'\n');
    }
    Ok(bytes)
}
