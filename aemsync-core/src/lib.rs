//! aemsync core library — path classification, change queue, domain types.
//!
//! Public API surface:
//! - [`classify`] — pure mapping from a watched path to repository paths
//! - [`queue`] — [`ChangeQueue`], the watcher → batch processor buffer
//! - [`types`] — [`ItemPath`], [`FilterEntry`], [`Target`]
//! - [`config`] — validated [`SyncConfig`]
//! - [`error`] — [`ConfigError`]

pub mod classify;
pub mod config;
pub mod error;
pub mod queue;
pub mod types;

pub use classify::{classify, has_hidden_segment, Classified, NAMESPACE_MARKER};
pub use config::SyncConfig;
pub use error::ConfigError;
pub use queue::ChangeQueue;
pub use types::{parse_targets, FilterEntry, ItemPath, Target};
