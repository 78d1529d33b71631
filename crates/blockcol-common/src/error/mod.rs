//! Error handling for blockcol.
//!
//! This module provides the unified error type and result alias used
//! across all blockcol components.

mod block;

pub use block::{BlockError, ErrorCode, ErrorKind};

/// Result type alias for blockcol operations.
pub type BlockResult<T> = std::result::Result<T, BlockError>;
