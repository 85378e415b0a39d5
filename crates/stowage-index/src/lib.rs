//! Index-addressed access to a stowage store for bulk-transfer engines.
//!
//! A transfer engine works on a numeric index space and drives many
//! concurrent writes, tracking each item's completion over a results channel
//! and an errors channel. [`KeyValueIndexSetter`] maps that index space onto
//! an ordered list of store keys and relays every call to a [`KeyValues`]
//! store.
//!
//! # Key Features
//!
//! - **One message per write**: every [`IndexSetter::write`] reports exactly
//!   one [`IndexResult`] or one [`IndexError`], never both, never neither.
//! - **Stream ownership**: the source stream is consumed and released on
//!   every exit path.
//! - **Change-aware**: freshness and modification-time queries are answered
//!   from the store's change history.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use stowage_index::{IndexSetter, KeyValueIndexSetter, completion_channels};
//! use stowage_store::{LocalStore, StoreOptions};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(LocalStore::open(StoreOptions::new("/var/lib/stowage"))?);
//! let setter = Arc::new(KeyValueIndexSetter::new(store, ["item-1", "item-2"]));
//! let (results, errors, completions) = completion_channels();
//!
//! for index in 0..setter.count() as isize {
//!     let (setter, results, errors) = (Arc::clone(&setter), results.clone(), errors.clone());
//!     tokio::task::spawn_blocking(move || {
//!         let body = format!("payload {index}");
//!         setter.write(index, Box::new(std::io::Cursor::new(body)), &results, &errors);
//!     });
//! }
//! drop((results, errors));
//!
//! for outcome in completions.collect().await {
//!     println!("item {} ok: {}", outcome.index(), outcome.is_ok());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! [`KeyValues`]: stowage_store::KeyValues

mod adapter;
mod channel;
mod data;
mod error;
mod setter;

pub use adapter::KeyValueIndexSetter;
pub use channel::{Completions, ErrorSender, ResultSender, completion_channels};
pub use data::{IndexOutcome, IndexResult};
pub use error::{Error, IndexError, Result};
pub use setter::IndexSetter;
