//! # blockcol-format
//!
//! Reading side of the block-columnar file format.
//!
//! A file is a run of fixed-width column regions followed by a text footer
//! and a trailing little-endian `u32` holding the footer length:
//!
//! ```text
//! ┌──────────────┬──────────────┬─────┬─────────────────┬──────────┐
//! │ column 0     │ column 1     │ ... │ footer text (L) │ u32 L    │
//! └──────────────┴──────────────┴─────┴─────────────────┴──────────┘
//! ```
//!
//! This crate provides:
//!
//! - **Stream**: a seekable, position-addressable byte source (`BinaryStream`)
//! - **Meta**: the footer text parser producing a `Value` tree
//! - **Catalog**: the typed schema and block statistics (`FileFooter`)
//! - **Layout**: locating and loading the footer of a file

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Seekable byte sources
pub mod stream;

/// Footer text parser
pub mod meta;

/// Typed schema and block statistics
pub mod catalog;

/// Footer location and loading
pub mod layout;

pub use catalog::{BlockStat, ColumnMeta, FileFooter};
pub use layout::{load_footer, read_footer, FooterLocation};
pub use meta::{parse, parse_document, Dict, Value};
pub use stream::{BinaryStream, CountingReader, IoStats, Origin};
