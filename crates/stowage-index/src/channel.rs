//! Completion channels between the adapter and a transfer engine.
//!
//! Both channels are many-producer and unbounded: workers report from any
//! thread without blocking, and the engine consumes completions in whatever
//! order they arrive.

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::{IndexError, IndexOutcome, IndexResult};

pub type ResultSender = UnboundedSender<IndexResult>;
pub type ErrorSender = UnboundedSender<IndexError>;

/// Create the results and errors senders plus a receiver that merges them.
pub fn completion_channels() -> (ResultSender, ErrorSender, Completions) {
    let (results_tx, results) = mpsc::unbounded_channel();
    let (errors_tx, errors) = mpsc::unbounded_channel();
    let completions = Completions {
        results,
        errors,
        results_open: true,
        errors_open: true,
    };
    (results_tx, errors_tx, completions)
}

/// Receiving half of both completion channels.
pub struct Completions {
    results:      UnboundedReceiver<IndexResult>,
    errors:       UnboundedReceiver<IndexError>,
    results_open: bool,
    errors_open:  bool,
}

impl Completions {
    /// Next completion from either channel.
    ///
    /// Returns `None` once every sender is dropped and both queues are empty.
    pub async fn recv(&mut self) -> Option<IndexOutcome> {
        loop {
            if !self.results_open && !self.errors_open {
                return None;
            }
            tokio::select! {
                result = self.results.recv(), if self.results_open => match result {
                    Some(result) => return Some(result.into()),
                    None => self.results_open = false,
                },
                error = self.errors.recv(), if self.errors_open => match error {
                    Some(error) => return Some(error.into()),
                    None => self.errors_open = false,
                },
            }
        }
    }

    /// Non-blocking form of [`recv`](Self::recv); results are drained first.
    pub fn try_recv(&mut self) -> Option<IndexOutcome> {
        if let Ok(result) = self.results.try_recv() {
            return Some(result.into());
        }
        self.errors.try_recv().ok().map(IndexOutcome::from)
    }

    /// Wait for every sender to be dropped and return all completions.
    pub async fn collect(mut self) -> Vec<IndexOutcome> {
        let mut outcomes = Vec::new();
        while let Some(outcome) = self.recv().await {
            outcomes.push(outcome);
        }
        outcomes
    }
}
