//! The file footer catalog.

use std::collections::HashMap;

use blockcol_common::error::{BlockError, BlockResult};
use tracing::debug;

use super::builder;
use super::column::ColumnMeta;
use crate::meta::{parse_document, Value};

/// Schema and statistics of one file.
///
/// Columns keep footer order, which is the schema column order. Every
/// column holds the same number of rows.
#[derive(Debug, Clone, PartialEq)]
pub struct FileFooter {
    max_values_per_block: u32,
    table_name: Option<String>,
    columns: Vec<ColumnMeta>,
    by_name: HashMap<String, usize>,
    row_count: u64,
}

impl FileFooter {
    /// Creates a footer from columns in schema order.
    ///
    /// # Errors
    ///
    /// Returns `BlockError::RowCountMismatch` if the columns disagree on
    /// their total row count, and `BlockError::Format` for duplicate names.
    pub fn new(
        max_values_per_block: u32,
        table_name: Option<String>,
        columns: Vec<ColumnMeta>,
    ) -> BlockResult<Self> {
        let row_count = columns.first().map_or(0, ColumnMeta::row_count_total);
        if let Some(first) = columns.first() {
            for column in &columns[1..] {
                if column.row_count_total() != row_count {
                    return Err(BlockError::RowCountMismatch {
                        column: column.name().to_string(),
                        expected: first.row_count_total(),
                        actual: column.row_count_total(),
                    });
                }
            }
        }

        let mut by_name = HashMap::with_capacity(columns.len());
        for (index, column) in columns.iter().enumerate() {
            if by_name.insert(column.name().to_string(), index).is_some() {
                return Err(BlockError::format(format!(
                    "duplicate column name '{}'",
                    column.name()
                )));
            }
        }

        Ok(Self {
            max_values_per_block,
            table_name,
            columns,
            by_name,
            row_count,
        })
    }

    /// Builds a footer from a parsed value tree.
    ///
    /// # Errors
    ///
    /// Returns `BlockError::Format` if the tree violates the footer schema.
    pub fn from_value(root: &Value) -> BlockResult<Self> {
        builder::build_footer(root)
    }

    /// Parses footer text and builds the catalog.
    ///
    /// # Errors
    ///
    /// Returns `BlockError::Parse` for malformed text and
    /// `BlockError::Format` for schema violations.
    pub fn from_bytes(text: &[u8]) -> BlockResult<Self> {
        let root = parse_document(text)?;
        let footer = Self::from_value(&root)?;
        debug!(
            columns = footer.column_count(),
            rows = footer.row_count(),
            max_values_per_block = footer.max_values_per_block(),
            "built footer catalog"
        );
        Ok(footer)
    }

    /// Returns the maximum number of rows per block.
    pub fn max_values_per_block(&self) -> u32 {
        self.max_values_per_block
    }

    /// Returns the table name recorded in the footer, if any.
    pub fn table_name(&self) -> Option<&str> {
        self.table_name.as_deref()
    }

    /// Returns the file's logical row count.
    pub fn row_count(&self) -> u64 {
        self.row_count
    }

    /// Returns columns in schema order.
    pub fn columns(&self) -> &[ColumnMeta] {
        &self.columns
    }

    /// Returns the number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Returns the column at schema position `index`.
    pub fn column_at(&self, index: usize) -> Option<&ColumnMeta> {
        self.columns.get(index)
    }

    /// Returns the schema position of the column named `name`.
    ///
    /// An exact match wins; with `case_insensitive` a unique ASCII
    /// case-insensitive match is accepted as a fallback.
    pub fn column_index(&self, name: &str, case_insensitive: bool) -> Option<usize> {
        if let Some(&index) = self.by_name.get(name) {
            return Some(index);
        }
        if !case_insensitive {
            return None;
        }

        let mut matches = self
            .columns
            .iter()
            .enumerate()
            .filter(|(_, c)| c.name().eq_ignore_ascii_case(name));
        match (matches.next(), matches.next()) {
            (Some((index, _)), None) => Some(index),
            _ => None,
        }
    }

    /// Returns the column named `name`.
    pub fn column(&self, name: &str, case_insensitive: bool) -> Option<&ColumnMeta> {
        self.column_index(name, case_insensitive)
            .map(|index| &self.columns[index])
    }

    /// Checks that every column's elements lie within the first
    /// `data_len` bytes of the file.
    ///
    /// # Errors
    ///
    /// Returns `BlockError::Format` naming the first column out of bounds.
    pub fn validate_layout(&self, data_len: u64) -> BlockResult<()> {
        for column in &self.columns {
            let range = column.data_range().ok_or_else(|| {
                BlockError::format(format!("column '{}' data range overflows", column.name()))
            })?;
            if range.end > data_len {
                return Err(BlockError::format(format!(
                    "column '{}' data [{}, {}) extends past data region of {} bytes",
                    column.name(),
                    range.start,
                    range.end,
                    data_len
                )));
            }
        }
        Ok(())
    }
}
