//! Sync runtime: watcher + change queue + timer-driven batch processor + uploader.

pub mod batch;
mod error;
pub mod state;
pub mod upload;
mod runtime;
mod watcher;

pub use batch::{BatchProcessor, BatchReport, TickOutcome};
pub use error::{SyncError, UploadError};
pub use runtime::{run, start_blocking};
pub use state::{InFlightGuard, SyncState};
pub use upload::{
    HttpTransport, Transport, UploadOutcome, UploadReport, Uploader, PACKAGE_NAME, SERVICE_PATH,
};
