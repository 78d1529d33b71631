//! Shared table handle.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use blockcol_common::config::ReaderConfig;
use blockcol_common::error::{BlockError, BlockResult};
use blockcol_format::catalog::FileFooter;
use blockcol_format::layout::{load_footer, FooterLocation};
use blockcol_format::stream::BinaryStream;

use crate::cursor::ScanCursor;
use crate::estimate::estimate_matching_rows;
use crate::predicate::Predicate;

/// An opened file whose catalog is loaded once and shared by every cursor
/// created from it.
///
/// Each cursor opens its own stream handle, so cursors never interfere with
/// each other. The handle is `Send + Sync`; cursors can be created and run
/// on different threads.
#[derive(Debug, Clone)]
pub struct BlockFile {
    path: PathBuf,
    footer: Arc<FileFooter>,
    location: FooterLocation,
    config: Arc<ReaderConfig>,
}

impl BlockFile {
    /// Opens a file with the default configuration.
    ///
    /// # Errors
    ///
    /// See [`ScanCursor::open`].
    pub fn open(path: impl AsRef<Path>) -> BlockResult<Self> {
        Self::open_with_config(path, Arc::new(ReaderConfig::default()))
    }

    /// Opens a file with the given configuration.
    ///
    /// # Errors
    ///
    /// See [`ScanCursor::open_with_config`].
    pub fn open_with_config(path: impl AsRef<Path>, config: Arc<ReaderConfig>) -> BlockResult<Self> {
        config.validate().map_err(BlockError::invalid_argument)?;
        let path = path.as_ref().to_path_buf();
        let mut stream = BinaryStream::open(&path)?;
        let (location, footer) = load_footer(&mut stream, &config)?;
        debug!(path = %path.display(), columns = footer.column_count(), rows = footer.row_count(), "opened table");

        Ok(Self {
            path,
            footer: Arc::new(footer),
            location,
            config,
        })
    }

    /// Returns the file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the shared catalog.
    pub fn footer(&self) -> &Arc<FileFooter> {
        &self.footer
    }

    /// Returns where the footer was found.
    pub fn location(&self) -> FooterLocation {
        self.location
    }

    /// Returns the configuration shared with cursors.
    pub fn config(&self) -> &Arc<ReaderConfig> {
        &self.config
    }

    /// Returns the number of rows.
    pub fn row_count(&self) -> u64 {
        self.footer.row_count()
    }

    /// Opens a new independent cursor.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file can no longer be opened, or a
    /// format error if its length changed since the catalog was loaded.
    pub fn cursor(&self) -> BlockResult<ScanCursor<File>> {
        let stream = BinaryStream::open(&self.path)?;
        let expected = self.location.file_len();
        if stream.length() != expected {
            return Err(BlockError::format(format!(
                "file length changed from {expected} to {} since open",
                stream.length()
            )));
        }
        Ok(ScanCursor::with_footer(stream, Arc::clone(&self.footer), Arc::clone(&self.config)))
    }

    /// Returns an upper bound on the rows `predicate` can match.
    ///
    /// # Errors
    ///
    /// See [`Predicate::bind`].
    pub fn estimate_rows(&self, predicate: &Predicate) -> BlockResult<u64> {
        let bound = predicate.bind(&self.footer, self.config.case_insensitive_columns)?;
        Ok(estimate_matching_rows(&self.footer, &bound))
    }
}
