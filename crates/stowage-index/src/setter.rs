use std::io::Read;

use stowage_store::ModTime;

use crate::{ErrorSender, Result, ResultSender};

/// What an index-driven transfer engine needs from its destination.
///
/// Items are addressed by position in `0..count()`. The engine calls these
/// methods concurrently from its workers, one index per call.
pub trait IndexSetter: Send + Sync {
    /// Number of addressable items.
    fn count(&self) -> usize;

    /// Whether the item can be skipped as already present.
    fn exists(&self, index: isize) -> bool;

    /// Consume `src` into the item at `index`.
    ///
    /// Reports exactly one message per call: an [`IndexResult`](crate::IndexResult)
    /// on `results` or an [`IndexError`](crate::IndexError) on `errors`.
    /// `src` is released before the message is sent.
    fn write(
        &self,
        index: isize,
        src: Box<dyn Read + Send>,
        results: &ResultSender,
        errors: &ErrorSender,
    );

    /// Open the stored content of the item at `index`.
    fn read(&self, index: isize) -> Result<Box<dyn Read + Send>>;

    /// Whether the item at `index` was updated at or after `since`.
    fn is_updated_after(&self, index: isize, since: ModTime) -> Result<bool>;

    /// Last recorded modification of the item at `index`.
    fn file_mod_time(&self, index: isize) -> Result<ModTime>;
}
