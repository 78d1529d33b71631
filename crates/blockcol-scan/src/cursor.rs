//! The row cursor.
//!
//! State machine:
//!
//! ```text
//!   open ──► Open ──next──► Scanning ──close──► Closed
//!             ▲                │
//!             └────rescan──────┘
//! ```
//!
//! Predicates and projections may only be set in `Open`, before the first
//! row is requested. `close` is accepted in every state.

use std::fmt;
use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, trace};

use blockcol_common::config::ReaderConfig;
use blockcol_common::error::{BlockError, BlockResult};
use blockcol_common::memory::ScanArena;
use blockcol_common::types::{Row, ScalarValue};
use blockcol_format::catalog::FileFooter;
use blockcol_format::layout::load_footer;
use blockcol_format::stream::BinaryStream;

use crate::decode::read_element;
use crate::predicate::{BoundPredicate, CmpOp, IntervalTruth, Predicate};
use crate::stats::ScanStats;

/// Lifecycle state of a cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorState {
    /// Catalog loaded; no row requested since open or the last rescan.
    Open,
    /// At least one row requested.
    Scanning,
    /// Stream released.
    Closed,
}

impl CursorState {
    /// Returns the state name.
    pub const fn as_str(self) -> &'static str {
        match self {
            CursorState::Open => "open",
            CursorState::Scanning => "scanning",
            CursorState::Closed => "closed",
        }
    }
}

impl fmt::Display for CursorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Row-at-a-time scan over one file, with optional single-column predicate
/// pushdown.
///
/// The catalog is shared and read-only; the stream, row position and arena
/// belong to this cursor alone.
pub struct ScanCursor<R = File> {
    footer: Arc<FileFooter>,
    config: Arc<ReaderConfig>,
    stream: Option<BinaryStream<R>>,
    state: CursorState,
    row_cursor: u64,
    predicate: Option<BoundPredicate>,
    /// Schema positions of the returned columns, in output order.
    projection: Vec<usize>,
    arena: ScanArena,
    stats: ScanStats,
    /// Set when the iterator yields an error; cleared by `rescan`.
    fused: bool,
}

impl ScanCursor<File> {
    /// Opens a file with the default configuration.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file is missing or shorter than its
    /// footer claims, a parse error for malformed footer text, or a format
    /// error if the catalog is invalid.
    pub fn open(path: impl AsRef<Path>) -> BlockResult<Self> {
        Self::open_with_config(path, Arc::new(ReaderConfig::default()))
    }

    /// Opens a file with the given configuration.
    ///
    /// # Errors
    ///
    /// See [`ScanCursor::open`]. Also fails with an invalid-argument error
    /// if the configuration does not validate.
    pub fn open_with_config(path: impl AsRef<Path>, config: Arc<ReaderConfig>) -> BlockResult<Self> {
        config.validate().map_err(BlockError::invalid_argument)?;
        let stream = BinaryStream::open(path)?;
        Self::from_stream(stream, config)
    }
}

impl<R: Read + Seek> ScanCursor<R> {
    /// Opens a cursor over any seekable byte source.
    ///
    /// # Errors
    ///
    /// See [`ScanCursor::open`].
    pub fn from_reader(reader: R, config: Arc<ReaderConfig>) -> BlockResult<Self> {
        config.validate().map_err(BlockError::invalid_argument)?;
        let stream = BinaryStream::from_reader(reader)?;
        Self::from_stream(stream, config)
    }

    fn from_stream(mut stream: BinaryStream<R>, config: Arc<ReaderConfig>) -> BlockResult<Self> {
        let (_, footer) = load_footer(&mut stream, &config)?;
        Ok(Self::with_footer(stream, Arc::new(footer), config))
    }

    /// Creates a cursor over an already-loaded catalog.
    ///
    /// `stream` must be positioned over the same file the catalog was read
    /// from.
    pub fn with_footer(stream: BinaryStream<R>, footer: Arc<FileFooter>, config: Arc<ReaderConfig>) -> Self {
        let projection = (0..footer.column_count()).collect();
        let arena = ScanArena::with_segment_size(config.arena_segment_size);
        Self {
            footer,
            config,
            stream: Some(stream),
            state: CursorState::Open,
            row_cursor: 0,
            predicate: None,
            projection,
            arena,
            stats: ScanStats::default(),
            fused: false,
        }
    }

    /// Returns the shared catalog.
    pub fn footer(&self) -> &Arc<FileFooter> {
        &self.footer
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    /// Returns the lifecycle state.
    pub fn state(&self) -> CursorState {
        self.state
    }

    /// Returns the index of the next row to be considered.
    pub fn position(&self) -> u64 {
        self.row_cursor
    }

    /// Returns the registered predicate, if any.
    pub fn predicate(&self) -> Option<&BoundPredicate> {
        self.predicate.as_ref()
    }

    /// Returns the schema positions of the returned columns.
    pub fn projection(&self) -> &[usize] {
        &self.projection
    }

    /// Returns the cursor counters.
    pub fn stats(&self) -> ScanStats {
        self.stats
    }

    /// Returns the cursor arena.
    pub fn arena(&self) -> &ScanArena {
        &self.arena
    }

    /// Pushes a predicate down to the scan, replacing any existing one.
    ///
    /// # Errors
    ///
    /// Returns a state error unless the cursor is open and no row has been
    /// requested yet, a column-not-found error for an unknown column, and a
    /// type error if the constant's type differs from the column's.
    pub fn register_predicate(&mut self, predicate: &Predicate) -> BlockResult<()> {
        self.expect_open("register_predicate")?;
        let bound = predicate.bind(&self.footer, self.config.case_insensitive_columns)?;
        debug!(predicate = %bound, "registered predicate");
        self.predicate = Some(bound);
        Ok(())
    }

    /// Shorthand for [`ScanCursor::register_predicate`].
    ///
    /// # Errors
    ///
    /// See [`ScanCursor::register_predicate`].
    pub fn register(&mut self, column: &str, op: CmpOp, constant: impl Into<ScalarValue>) -> BlockResult<()> {
        self.register_predicate(&Predicate::new(column, op, constant))
    }

    /// Removes the registered predicate.
    ///
    /// # Errors
    ///
    /// Returns a state error unless the cursor is open and unstarted.
    pub fn clear_predicate(&mut self) -> BlockResult<()> {
        self.expect_open("clear_predicate")?;
        self.predicate = None;
        Ok(())
    }

    /// Restricts the returned columns to `columns`, in that order.
    ///
    /// Unprojected columns are never read, except the predicate column
    /// when row filtering is enabled.
    ///
    /// # Errors
    ///
    /// Returns a state error unless the cursor is open and unstarted, an
    /// invalid-argument error for an empty list, and a column-not-found
    /// error for an unknown name.
    pub fn project<S: AsRef<str>>(&mut self, columns: &[S]) -> BlockResult<()> {
        self.expect_open("project")?;
        if columns.is_empty() {
            return Err(BlockError::invalid_argument("projection must name at least one column"));
        }

        let mut projection = Vec::with_capacity(columns.len());
        for name in columns {
            let name = name.as_ref();
            let index = self
                .footer
                .column_index(name, self.config.case_insensitive_columns)
                .ok_or_else(|| BlockError::column_not_found(name))?;
            projection.push(index);
        }
        self.projection = projection;
        Ok(())
    }

    /// Produces the next row into `out`, which is cleared first.
    ///
    /// Returns `Ok(false)` at end of data. Blocks the predicate cannot
    /// match are passed over without reading any of their bytes. On error
    /// the contents of `out` are unspecified and the failing row is not
    /// consumed.
    ///
    /// # Errors
    ///
    /// Returns a state error after `close`, or an I/O error if an element
    /// cannot be read.
    pub fn next_into(&mut self, out: &mut Row) -> BlockResult<bool> {
        out.clear();
        match self.state {
            CursorState::Closed => return Err(BlockError::invalid_state("next", self.state.as_str())),
            CursorState::Open => self.state = CursorState::Scanning,
            CursorState::Scanning => {}
        }
        let Some(stream) = self.stream.as_mut() else {
            return Err(BlockError::invalid_state("next", CursorState::Closed.as_str()));
        };

        let footer = &*self.footer;
        let total = footer.row_count();

        while self.row_cursor < total {
            let row = self.row_cursor;
            self.arena.reset();

            let mut predicate_value: Option<(usize, ScalarValue)> = None;
            if let Some(predicate) = &self.predicate {
                let column = &footer.columns()[predicate.column_index()];
                let mut all_match = false;

                if self.config.prune_blocks {
                    if let Some(block) = column.block_for_row(row) {
                        let truth = predicate.eval_block(&column.blocks()[block]);
                        if truth.can_skip() {
                            let end = column.block_row_range(block).map_or(row + 1, |range| range.end);
                            trace!(column = column.name(), block, start = row, end, "skipping block");
                            self.stats.blocks_skipped += 1;
                            self.stats.rows_skipped += end - row;
                            self.row_cursor = end;
                            continue;
                        }
                        all_match = truth == IntervalTruth::AlwaysTrue;
                    }
                }

                if self.config.filter_rows && !all_match {
                    let value = read_element(stream, column, row, &mut self.arena)?;
                    self.stats.elements_read += 1;
                    if !predicate.matches(&value) {
                        self.stats.rows_filtered += 1;
                        self.row_cursor += 1;
                        continue;
                    }
                    predicate_value = Some((predicate.column_index(), value));
                }
            }

            for &index in &self.projection {
                let value = match &predicate_value {
                    Some((column, value)) if *column == index => value.clone(),
                    _ => {
                        self.stats.elements_read += 1;
                        read_element(stream, &footer.columns()[index], row, &mut self.arena)?
                    }
                };
                out.push(value);
            }

            self.row_cursor += 1;
            self.stats.rows_returned += 1;
            return Ok(true);
        }

        Ok(false)
    }

    /// Returns the next row, or `None` at end of data.
    ///
    /// # Errors
    ///
    /// See [`ScanCursor::next_into`].
    pub fn next_row(&mut self) -> BlockResult<Option<Row>> {
        let mut row = Vec::with_capacity(self.projection.len());
        Ok(self.next_into(&mut row)?.then_some(row))
    }

    /// Rewinds to the first row, keeping the catalog, predicate, projection
    /// and stream.
    ///
    /// # Errors
    ///
    /// Returns a state error after `close`.
    pub fn rescan(&mut self) -> BlockResult<()> {
        if self.state == CursorState::Closed {
            return Err(BlockError::invalid_state("rescan", self.state.as_str()));
        }
        self.row_cursor = 0;
        self.arena.reset();
        self.state = CursorState::Open;
        self.fused = false;
        self.stats.rescans += 1;
        debug!(rescans = self.stats.rescans, "rescan");
        Ok(())
    }

    /// Releases the stream and the arena. Calling it again is a no-op.
    pub fn close(&mut self) {
        if self.state == CursorState::Closed {
            return;
        }
        self.stream = None;
        self.arena.release();
        self.state = CursorState::Closed;
        debug!(
            rows_returned = self.stats.rows_returned,
            blocks_skipped = self.stats.blocks_skipped,
            "closed cursor"
        );
    }

    fn expect_open(&self, operation: &'static str) -> BlockResult<()> {
        match self.state {
            CursorState::Open => Ok(()),
            state => Err(BlockError::invalid_state(operation, state.as_str())),
        }
    }
}

/// Yields rows until end of data or the first error. Once an error has been
/// yielded the iterator returns `None` until the next `rescan`.
impl<R: Read + Seek> Iterator for ScanCursor<R> {
    type Item = BlockResult<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.fused {
            return None;
        }
        let item = self.next_row().transpose();
        if matches!(item, Some(Err(_))) {
            self.fused = true;
        }
        item
    }
}

impl<R> fmt::Debug for ScanCursor<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScanCursor")
            .field("state", &self.state)
            .field("row_cursor", &self.row_cursor)
            .field("row_count", &self.footer.row_count())
            .field("predicate", &self.predicate)
            .field("projection", &self.projection)
            .field("stats", &self.stats)
            .field("fused", &self.fused)
            .finish_non_exhaustive()
    }
}
