use stowage_store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("index {index} out of bounds for {len} ids")]
    OutOfBounds { index: isize, len: usize },

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Failure of one item in a batch, as reported on the errors channel.
#[derive(Debug, thiserror::Error)]
#[error("item {index} failed")]
pub struct IndexError {
    pub index: isize,
    #[source]
    pub error: Error,
}

impl IndexError {
    pub fn new(index: isize, error: impl Into<Error>) -> Self {
        Self {
            index,
            error: error.into(),
        }
    }
}
