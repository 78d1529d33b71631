//! Cursor counters.

/// Counters accumulated by a cursor across all passes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    /// Rows returned to the caller.
    pub rows_returned: u64,
    /// Blocks skipped on their statistics.
    pub blocks_skipped: u64,
    /// Rows inside skipped blocks.
    pub rows_skipped: u64,
    /// Rows of kept blocks dropped by row-level filtering.
    pub rows_filtered: u64,
    /// Elements decoded from the file.
    pub elements_read: u64,
    /// Completed `rescan` calls.
    pub rescans: u64,
}

impl ScanStats {
    /// Returns the fraction of visited rows that were skipped by block
    /// statistics, in `[0, 1]`.
    pub fn skip_ratio(&self) -> f64 {
        let visited = self.rows_returned + self.rows_skipped + self.rows_filtered;
        if visited == 0 {
            0.0
        } else {
            self.rows_skipped as f64 / visited as f64
        }
    }
}
