//! In-memory package assembly.
//!
//! ## Lifecycle
//!
//! 1. [`PackageBuilder::create`] seeds a zip with the vault support files.
//! 2. [`Package::add_file`] / [`Package::add_entry`] record each change.
//! 3. [`PackageBuilder::finalize`] writes `filter.xml` and consumes the
//!    package, so a finalized package can never be reused.

use std::io::{Cursor, Write};

use chrono::Utc;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use aemsync_core::types::FilterEntry;

use crate::error::{io_err, PackageError};
use crate::filter::FilterManifest;
use crate::templates::{PackageMeta, VaultRenderer};

/// Archive location of the filter manifest.
pub const FILTER_PATH: &str = "META-INF/vault/filter.xml";

/// A package being assembled for one batch.
pub struct Package {
    writer: ZipWriter<Cursor<Vec<u8>>>,
    manifest: FilterManifest,
    files: usize,
}

impl Package {
    /// Record a filter entry. Returns `false` if the item was already selected.
    pub fn add_entry(&mut self, entry: FilterEntry) -> bool {
        self.manifest.push(entry)
    }

    /// Add file content at `archive_path` (e.g. `jcr_root/apps/foo/bar.txt`).
    pub fn add_file(&mut self, archive_path: &str, contents: &[u8]) -> Result<(), PackageError> {
        write_entry(&mut self.writer, archive_path, contents)?;
        self.files += 1;
        Ok(())
    }

    pub fn manifest(&self) -> &FilterManifest {
        &self.manifest
    }

    /// Number of content files added so far (support files excluded).
    pub fn file_count(&self) -> usize {
        self.files
    }

    /// `true` when no filter entry has been recorded.
    pub fn is_empty(&self) -> bool {
        self.manifest.is_empty()
    }
}

/// Creates and finalizes [`Package`]s.
pub struct PackageBuilder {
    renderer: VaultRenderer,
    meta: PackageMeta,
}

impl PackageBuilder {
    pub fn new() -> Result<Self, PackageError> {
        Ok(Self {
            renderer: VaultRenderer::new()?,
            meta: PackageMeta::default(),
        })
    }

    pub fn with_meta(mut self, meta: PackageMeta) -> Self {
        self.meta = meta;
        self
    }

    pub fn meta(&self) -> &PackageMeta {
        &self.meta
    }

    /// Start a fresh package containing only the support files.
    pub fn create(&self) -> Result<Package, PackageError> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (path, content) in self.renderer.render_support_files(&self.meta, Utc::now())? {
            write_entry(&mut writer, path, content.as_bytes())?;
        }
        Ok(Package {
            writer,
            manifest: FilterManifest::new(),
            files: 0,
        })
    }

    /// Inject the filter manifest and serialize the archive.
    pub fn finalize(&self, package: Package) -> Result<Vec<u8>, PackageError> {
        let Package {
            mut writer,
            manifest,
            files,
        } = package;

        let filter = self.renderer.render_filter(&manifest)?;
        write_entry(&mut writer, FILTER_PATH, filter.as_bytes())?;
        let bytes = writer.finish()?.into_inner();

        tracing::debug!(
            filters = manifest.len(),
            files,
            bytes = bytes.len(),
            "package finalized"
        );
        Ok(bytes)
    }
}

fn write_entry(
    writer: &mut ZipWriter<Cursor<Vec<u8>>>,
    path: &str,
    contents: &[u8],
) -> Result<(), PackageError> {
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
    writer.start_file(path, options)?;
    writer.write_all(contents).map_err(|e| io_err(path, e))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
