use std::io::Read;
use std::sync::Arc;

use stowage_store::{ChangeClass, KeyValues, ModTime};

use crate::{Error, ErrorSender, IndexError, IndexResult, IndexSetter, Result, ResultSender};

/// Exposes a [`KeyValues`] store to a transfer engine through a fixed,
/// ordered list of ids.
///
/// Index `i` addresses the store key `ids[i]`. The id list and store are
/// fixed at construction; nothing about the store is cached, every query
/// goes straight through.
pub struct KeyValueIndexSetter<S: ?Sized> {
    store: Arc<S>,
    ids:   Arc<[String]>,
}

impl<S: ?Sized> Clone for KeyValueIndexSetter<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            ids:   Arc::clone(&self.ids),
        }
    }
}

impl<S: KeyValues + ?Sized> KeyValueIndexSetter<S> {
    pub fn new<I>(store: Arc<S>, ids: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self {
            store,
            ids: ids.into_iter().map(Into::<String>::into).collect(),
        }
    }

    pub fn ids(&self) -> &[String] { &self.ids }

    pub fn store(&self) -> &Arc<S> { &self.store }

    fn id(&self, index: isize) -> Option<&str> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.ids.get(i))
            .map(String::as_str)
    }

    fn require_id(&self, index: isize) -> Result<&str> {
        self.id(index).ok_or(Error::OutOfBounds {
            index,
            len: self.ids.len(),
        })
    }
}

impl<S: KeyValues + ?Sized> IndexSetter for KeyValueIndexSetter<S> {
    fn count(&self) -> usize { self.ids.len() }

    // Never report an item as present: the store hashes the full content of
    // every write to detect modification, so no write may be skipped.
    fn exists(&self, _index: isize) -> bool { false }

    fn write(
        &self,
        index: isize,
        mut src: Box<dyn Read + Send>,
        results: &ResultSender,
        errors: &ErrorSender,
    ) {
        let outcome = self
            .require_id(index)
            .and_then(|id| Ok(self.store.set(id, &mut *src)?));
        drop(src);

        // A closed receiver means the engine abandoned the batch.
        match outcome {
            Ok(()) => {
                let _ = results.send(IndexResult::new(index, true));
            }
            Err(error) => {
                let _ = errors.send(IndexError::new(index, error));
            }
        }
    }

    fn read(&self, index: isize) -> Result<Box<dyn Read + Send>> {
        let id = self.require_id(index)?;
        Ok(self.store.get(id)?)
    }

    fn is_updated_after(&self, index: isize, since: ModTime) -> Result<bool> {
        let Some(id) = self.id(index) else {
            return Ok(false);
        };
        Ok(self.store.since(since, ChangeClass::Update)?.contains(id))
    }

    fn file_mod_time(&self, index: isize) -> Result<ModTime> {
        let Some(id) = self.id(index) else {
            return Ok(ModTime::UNKNOWN);
        };
        Ok(self.store.mod_time(id)?)
    }
}
