//! Subcommand implementations.

use std::fmt::Write as _;
use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use blockcol_common::config::ReaderConfig;
use blockcol_format::catalog::ColumnMeta;
use blockcol_scan::{skippable_blocks, BlockFile, ScanStats};
use comfy_table::Cell;
use tracing::info;

use crate::filter::parse_where;
use crate::formatter::{format_result, styled_table, OutputFormat, ResultSet};

/// Options for `scan`.
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    /// Columns to return; all when empty.
    pub columns: Vec<String>,
    /// Pushed-down predicate clause.
    pub clause: Option<String>,
    /// Maximum rows to print.
    pub limit: Option<usize>,
}

/// Describes a file's catalog.
pub fn inspect(path: &Path, config: ReaderConfig, show_blocks: bool) -> Result<String> {
    let table = BlockFile::open_with_config(path, Arc::new(config))?;
    let footer = table.footer();
    let location = table.location();

    let mut out = String::new();
    writeln!(out, "File:           {}", path.display())?;
    if let Some(name) = footer.table_name() {
        writeln!(out, "Table:          {name}")?;
    }
    writeln!(out, "Rows:           {}", footer.row_count())?;
    writeln!(out, "Max block size: {}", footer.max_values_per_block())?;
    writeln!(
        out,
        "Footer:         {} bytes at offset {}",
        location.footer_len, location.footer_offset
    )?;

    let mut columns = styled_table();
    columns.set_header(vec!["column", "type", "offset", "blocks", "rows"]);
    for column in footer.columns() {
        columns.add_row(vec![
            Cell::new(column.name()),
            Cell::new(column.logical_type()),
            Cell::new(column.file_offset()),
            Cell::new(column.block_count()),
            Cell::new(column.row_count_total()),
        ]);
    }
    writeln!(out, "{columns}")?;

    if show_blocks {
        for column in footer.columns() {
            writeln!(out, "\n{} ({})", column.name(), column.logical_type())?;
            writeln!(out, "{}", block_table(column))?;
        }
    }

    Ok(out)
}

fn block_table(column: &ColumnMeta) -> comfy_table::Table {
    let mut table = styled_table();
    let text = !column.logical_type().is_numeric();
    if text {
        table.set_header(vec!["block", "rows", "first row", "min", "max", "min_len", "max_len"]);
    } else {
        table.set_header(vec!["block", "rows", "first row", "min", "max"]);
    }

    for (index, block) in column.blocks().iter().enumerate() {
        let first = column.block_row_range(index).map_or(0, |range| range.start);
        let mut cells = vec![
            Cell::new(index),
            Cell::new(block.row_count),
            Cell::new(first),
            Cell::new(&block.min),
            Cell::new(&block.max),
        ];
        if text {
            cells.push(Cell::new(block.min_len));
            cells.push(Cell::new(block.max_len));
        }
        table.add_row(cells);
    }
    table
}

/// Scans a file and formats the rows.
///
/// Returns the formatted rows and the cursor counters.
pub fn scan(
    path: &Path,
    config: ReaderConfig,
    options: &ScanOptions,
    format: OutputFormat,
) -> Result<(String, ScanStats)> {
    let case_insensitive = config.case_insensitive_columns;
    let table = BlockFile::open_with_config(path, Arc::new(config.with_filter_rows(true)))?;
    let mut cursor = table.cursor()?;

    if !options.columns.is_empty() {
        cursor.project(options.columns.as_slice())?;
    }
    if let Some(clause) = &options.clause {
        let predicate = parse_where(clause, table.footer(), case_insensitive)?;
        info!("Pushing down predicate: {}", predicate);
        cursor.register_predicate(&predicate)?;
    }

    let columns = cursor
        .projection()
        .iter()
        .map(|&i| table.footer().columns()[i].name().to_string())
        .collect();

    let limit = options.limit.unwrap_or(usize::MAX);
    let mut rows = Vec::new();
    while rows.len() < limit {
        match cursor.next_row()? {
            Some(row) => rows.push(row),
            None => break,
        }
    }
    let stats = cursor.stats();
    cursor.close();

    Ok((format_result(&ResultSet { columns, rows }, format), stats))
}

/// Reports how many rows a predicate can match, from statistics alone.
pub fn estimate(path: &Path, config: ReaderConfig, clause: &str) -> Result<String> {
    let case_insensitive = config.case_insensitive_columns;
    let table = BlockFile::open_with_config(path, Arc::new(config))?;
    let predicate = parse_where(clause, table.footer(), case_insensitive)?;
    let bound = predicate.bind(table.footer(), case_insensitive)?;

    let rows = table.estimate_rows(&predicate)?;
    let skipped = skippable_blocks(table.footer(), &bound);
    let blocks = table.footer().columns()[bound.column_index()].block_count();

    Ok(format!(
        "{predicate}: at most {rows} of {} rows ({} of {blocks} blocks skipped)",
        table.row_count(),
        skipped.len()
    ))
}

/// Formats cursor counters for `--verbose` output.
pub fn describe_stats(stats: &ScanStats) -> String {
    format!(
        "{} rows returned, {} blocks ({} rows) skipped, {} rows filtered, {} elements read",
        stats.rows_returned, stats.blocks_skipped, stats.rows_skipped, stats.rows_filtered, stats.elements_read
    )
}
