//! Per-column metadata.

use std::ops::Range;

use blockcol_common::types::{LogicalType, ScalarValue};

/// Statistics for one block of rows in one column.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockStat {
    /// Rows in the block.
    pub row_count: u32,
    /// Smallest value in the block, of the column's type.
    pub min: ScalarValue,
    /// Largest value in the block, of the column's type.
    pub max: ScalarValue,
    /// Recorded `min_len` of a text block, 0 otherwise.
    ///
    /// Informational only: taken from the footer as written and never
    /// checked against `min` or used for skipping.
    pub min_len: u32,
    /// Recorded `max_len` of a text block, 0 otherwise. Informational only.
    pub max_len: u32,
}

impl BlockStat {
    /// Returns true if `min <= max` under the column's ordering.
    ///
    /// NaN bounds and inverted bounds are inconsistent.
    pub fn is_consistent(&self) -> bool {
        matches!(
            self.min.compare(&self.max),
            Some(std::cmp::Ordering::Less | std::cmp::Ordering::Equal)
        )
    }
}

/// Metadata for one column: type, byte layout and ordered block statistics.
///
/// Row `r` of the column lives at `file_offset + r * stride`. Blocks are a
/// statistics grouping only; block `i` covers the rows after all rows of
/// blocks `0..i`.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnMeta {
    name: String,
    logical_type: LogicalType,
    file_offset: u64,
    blocks: Vec<BlockStat>,
    /// First row of each block.
    block_starts: Vec<u64>,
    row_count: u64,
}

impl ColumnMeta {
    /// Creates column metadata from blocks in file order.
    pub fn new(
        name: impl Into<String>,
        logical_type: LogicalType,
        file_offset: u64,
        blocks: Vec<BlockStat>,
    ) -> Self {
        let mut block_starts = Vec::with_capacity(blocks.len());
        let mut row_count = 0u64;
        for block in &blocks {
            block_starts.push(row_count);
            row_count += u64::from(block.row_count);
        }

        Self {
            name: name.into(),
            logical_type,
            file_offset,
            blocks,
            block_starts,
            row_count,
        }
    }

    /// Returns the column name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the declared type.
    pub fn logical_type(&self) -> LogicalType {
        self.logical_type
    }

    /// Returns the absolute offset of the first element.
    pub fn file_offset(&self) -> u64 {
        self.file_offset
    }

    /// Returns the element width in bytes.
    pub fn stride(&self) -> u64 {
        self.logical_type.stride()
    }

    /// Returns the blocks in file order.
    pub fn blocks(&self) -> &[BlockStat] {
        &self.blocks
    }

    /// Returns the number of blocks.
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Returns the sum of all block row counts.
    pub fn row_count_total(&self) -> u64 {
        self.row_count
    }

    /// Returns the logical rows covered by block `index`.
    pub fn block_row_range(&self, index: usize) -> Option<Range<u64>> {
        let start = *self.block_starts.get(index)?;
        let count = u64::from(self.blocks[index].row_count);
        Some(start..start + count)
    }

    /// Returns the index of the block containing `row`.
    ///
    /// Empty blocks never contain a row.
    pub fn block_for_row(&self, row: u64) -> Option<usize> {
        if row >= self.row_count {
            return None;
        }
        // Last block starting at or before `row`; empty blocks share their
        // start with the next block and are passed over.
        let index = self.block_starts.partition_point(|&start| start <= row);
        Some(index - 1)
    }

    /// Returns the absolute byte offset of `row`.
    pub fn row_offset(&self, row: u64) -> u64 {
        self.file_offset + row * self.stride()
    }

    /// Returns the byte range holding all of this column's elements.
    ///
    /// Returns `None` if the range overflows `u64`.
    pub fn data_range(&self) -> Option<Range<u64>> {
        let len = self.row_count.checked_mul(self.stride())?;
        let end = self.file_offset.checked_add(len)?;
        Some(self.file_offset..end)
    }
}
