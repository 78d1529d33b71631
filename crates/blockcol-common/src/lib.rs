//! # blockcol-common
//!
//! Common types, errors, and utilities for blockcol.
//!
//! This crate provides the foundational types used by every blockcol
//! component:
//!
//! - **Types**: column types (`LogicalType`) and decoded values (`ScalarValue`)
//! - **Errors**: the unified `BlockError` and its stable `ErrorCode`s
//! - **Config**: reader configuration (`ReaderConfig`)
//! - **Memory**: the per-cursor `ScanArena`
//! - **Constants**: file layout constants and limits
//!
//! ## Example
//!
//! ```rust
//! use blockcol_common::types::{LogicalType, ScalarValue};
//! use blockcol_common::error::BlockResult;
//!
//! fn example() -> BlockResult<()> {
//!     let value = ScalarValue::Int32(42);
//!     assert_eq!(value.logical_type(), LogicalType::Int32);
//!     assert_eq!(LogicalType::FixedText32.width(), 32);
//!     Ok(())
//! }
//! # example().unwrap();
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod constants;
pub mod error;
pub mod memory;
pub mod types;

// Re-export commonly used items at the crate root
pub use config::ReaderConfig;
pub use constants::*;
pub use error::{BlockError, BlockResult, ErrorCode, ErrorKind};
pub use memory::ScanArena;
pub use types::{LogicalType, Row, ScalarValue};
