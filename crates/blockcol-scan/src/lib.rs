//! # blockcol-scan
//!
//! Row-at-a-time scanning of block-columnar files.
//!
//! A `ScanCursor` opens a file, loads its footer catalog, and returns rows
//! in file order. At most one single-column comparison can be pushed down;
//! blocks whose `[min, max]` statistics prove that no row can match are
//! skipped without reading any of their bytes.
//!
//! ## Example
//!
//! ```rust,no_run
//! use blockcol_scan::{CmpOp, ScanCursor};
//!
//! fn example() -> blockcol_common::BlockResult<()> {
//!     let mut cursor = ScanCursor::open("farm.db721")?;
//!     cursor.register("weight", CmpOp::Lt, 30.0f32)?;
//!
//!     while let Some(row) = cursor.next_row()? {
//!         println!("{row:?}");
//!     }
//!     cursor.close();
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod cursor;
mod decode;
mod estimate;
mod stats;
mod table;

/// Predicates and block pruning
pub mod predicate;

pub use cursor::{CursorState, ScanCursor};
pub use decode::{decode_element, decode_fixed_text, read_element};
pub use estimate::{estimate_matching_rows, skippable_blocks};
pub use predicate::{BoundPredicate, CmpOp, IntervalTruth, Predicate};
pub use stats::ScanStats;
pub use table::BlockFile;
