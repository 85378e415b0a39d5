use crate::IndexError;

/// Completion of one item in a batch, as reported on the results channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexResult {
    pub index: isize,
    pub ok:    bool,
}

impl IndexResult {
    pub fn new(index: isize, ok: bool) -> Self { Self { index, ok } }
}

/// Either channel's message, for consumers that merge the two.
#[derive(Debug)]
pub enum IndexOutcome {
    Result(IndexResult),
    Error(IndexError),
}

impl IndexOutcome {
    pub fn index(&self) -> isize {
        match self {
            IndexOutcome::Result(result) => result.index,
            IndexOutcome::Error(error) => error.index,
        }
    }

    pub fn is_ok(&self) -> bool { matches!(self, IndexOutcome::Result(IndexResult { ok: true, .. })) }
}

impl From<IndexResult> for IndexOutcome {
    fn from(result: IndexResult) -> Self { IndexOutcome::Result(result) }
}

impl From<IndexError> for IndexOutcome {
    fn from(error: IndexError) -> Self { IndexOutcome::Error(error) }
}
