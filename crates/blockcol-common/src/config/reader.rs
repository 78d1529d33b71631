//! Reader configuration.
//!
//! One `ReaderConfig` is shared (behind an `Arc`) by a table handle and all
//! cursors opened from it.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_ARENA_SEGMENT_SIZE, DEFAULT_MAX_FOOTER_LEN, MIN_ARENA_SEGMENT_SIZE};

/// Configuration for opening and scanning files.
///
/// # Example
///
/// ```rust
/// use blockcol_common::config::ReaderConfig;
///
/// let config = ReaderConfig::default();
/// assert!(config.prune_blocks);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    /// Largest footer length accepted, in bytes.
    /// Default: 67108864 (64 MB)
    pub max_footer_len: u32,

    /// Size of each cursor arena segment in bytes.
    /// Default: 1048576 (1 MB)
    pub arena_segment_size: usize,

    /// Skip blocks whose statistics rule out the registered predicate.
    /// Default: true
    pub prune_blocks: bool,

    /// Drop rows of kept blocks that fail the registered predicate.
    /// Default: false
    pub filter_rows: bool,

    /// Fall back to ASCII case-insensitive column lookup.
    /// Default: true
    pub case_insensitive_columns: bool,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            max_footer_len: DEFAULT_MAX_FOOTER_LEN,
            arena_segment_size: DEFAULT_ARENA_SEGMENT_SIZE,
            prune_blocks: true,
            filter_rows: false,
            case_insensitive_columns: true,
        }
    }
}

impl ReaderConfig {
    /// Creates a minimal configuration for testing.
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            arena_segment_size: MIN_ARENA_SEGMENT_SIZE,
            ..Default::default()
        }
    }

    /// Returns a copy with row-level filtering switched on or off.
    #[must_use]
    pub fn with_filter_rows(mut self, filter_rows: bool) -> Self {
        self.filter_rows = filter_rows;
        self
    }

    /// Returns a copy with block pruning switched on or off.
    #[must_use]
    pub fn with_prune_blocks(mut self, prune_blocks: bool) -> Self {
        self.prune_blocks = prune_blocks;
        self
    }

    /// Validates the configuration and returns an error if invalid.
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid setting.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_footer_len == 0 {
            return Err("max_footer_len must be greater than 0".to_string());
        }

        if self.arena_segment_size < MIN_ARENA_SEGMENT_SIZE {
            return Err(format!(
                "arena_segment_size must be at least {MIN_ARENA_SEGMENT_SIZE} bytes"
            ));
        }

        Ok(())
    }
}
