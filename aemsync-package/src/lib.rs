//! # aemsync-package
//!
//! Builds installable FileVault content packages in memory.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use aemsync_core::types::FilterEntry;
//! use aemsync_package::PackageBuilder;
//!
//! fn build() -> Result<Vec<u8>, aemsync_package::PackageError> {
//!     let builder = PackageBuilder::new()?;
//!     let mut package = builder.create()?;
//!     package.add_file("jcr_root/apps/foo/bar.txt", b"hello")?;
//!     package.add_entry(FilterEntry::update("/apps/foo/bar.txt", "/apps/foo"));
//!     builder.finalize(package)
//! }
//! ```

pub mod error;
pub mod filter;
pub mod package;
pub mod templates;

pub use error::PackageError;
pub use filter::FilterManifest;
pub use package::{Package, PackageBuilder, FILTER_PATH};
pub use templates::{PackageMeta, VaultRenderer};
