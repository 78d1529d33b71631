//! # blockcol-test
//!
//! Test support for blockcol.
//!
//! `FixtureBuilder` writes well-formed files (and, with a little help,
//! malformed ones) so tests can exercise the reader end to end:
//!
//! ```rust
//! use blockcol_test::FixtureBuilder;
//!
//! let fixture = FixtureBuilder::new(2)
//!     .int_column("id", &[1, 2, 3, 4])
//!     .text_column("name", &["a", "b", "c", "d"])
//!     .write_temp()
//!     .unwrap();
//! assert!(fixture.path().exists());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use blockcol_common::constants::FIXED_TEXT_WIDTH;
use tempfile::TempDir;

/// Values of one fixture column.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    /// `int` column.
    Int(Vec<i32>),
    /// `float` column. Values must be finite.
    Float(Vec<f32>),
    /// `str` column, stored NUL-padded in 32 bytes.
    Text(Vec<String>),
}

impl ColumnData {
    fn len(&self) -> usize {
        match self {
            ColumnData::Int(v) => v.len(),
            ColumnData::Float(v) => v.len(),
            ColumnData::Text(v) => v.len(),
        }
    }

    fn type_name(&self) -> &'static str {
        match self {
            ColumnData::Int(_) => "int",
            ColumnData::Float(_) => "float",
            ColumnData::Text(_) => "str",
        }
    }

    fn encode(&self, out: &mut Vec<u8>) {
        match self {
            ColumnData::Int(values) => values.iter().for_each(|v| out.extend_from_slice(&v.to_le_bytes())),
            ColumnData::Float(values) => values.iter().for_each(|v| out.extend_from_slice(&v.to_le_bytes())),
            ColumnData::Text(values) => values.iter().for_each(|v| out.extend_from_slice(&encode_text32(v))),
        }
    }

    /// Writes `"min":..,"max":..` (and the lengths for text) for `rows`.
    fn write_stats(&self, rows: std::ops::Range<usize>, out: &mut String) {
        match self {
            ColumnData::Int(values) => {
                let block = &values[rows];
                let min = block.iter().copied().min().unwrap_or(0);
                let max = block.iter().copied().max().unwrap_or(0);
                let _ = write!(out, "\"min\":{min},\"max\":{max}");
            }
            ColumnData::Float(values) => {
                let block = &values[rows];
                let (min, max) = if block.is_empty() {
                    (0.0, 0.0)
                } else {
                    block
                        .iter()
                        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)))
                };
                let _ = write!(
                    out,
                    "\"min\":{:?},\"max\":{:?}",
                    f64::from(min),
                    f64::from(max)
                );
            }
            ColumnData::Text(values) => {
                let stored: Vec<String> = values[rows].iter().map(|v| stored_text(v)).collect();
                let min = stored.iter().min().cloned().unwrap_or_default();
                let max = stored.iter().max().cloned().unwrap_or_default();
                let _ = write!(
                    out,
                    "\"min\":{},\"max\":{},\"min_len\":{},\"max_len\":{}",
                    quote(&min),
                    quote(&max),
                    min.len(),
                    max.len()
                );
            }
        }
    }
}

#[derive(Debug, Clone)]
struct FixtureColumn {
    name: String,
    data: ColumnData,
    block_sizes: Option<Vec<usize>>,
}

impl FixtureColumn {
    fn blocks(&self, max_values_per_block: usize) -> Vec<std::ops::Range<usize>> {
        let sizes = self.block_sizes.clone().unwrap_or_else(|| {
            let len = self.data.len();
            let max = max_values_per_block.max(1);
            (0..len.div_ceil(max)).map(|i| max.min(len - i * max)).collect()
        });

        let mut start = 0;
        sizes
            .into_iter()
            .map(|size| {
                let range = start..start + size;
                start += size;
                range
            })
            .collect()
    }
}

/// Builds block-columnar files for tests.
///
/// Columns are laid out back to back in the order they are added, after an
/// optional run of padding bytes, followed by the footer and its length.
/// Statistics are computed from the stored values.
#[derive(Debug, Clone)]
pub struct FixtureBuilder {
    max_values_per_block: u32,
    table: Option<String>,
    columns: Vec<FixtureColumn>,
    padding: usize,
    reverse_block_keys: bool,
}

impl FixtureBuilder {
    /// Creates a builder splitting columns into blocks of at most
    /// `max_values_per_block` rows.
    pub fn new(max_values_per_block: u32) -> Self {
        Self {
            max_values_per_block,
            table: None,
            columns: Vec::new(),
            padding: 0,
            reverse_block_keys: false,
        }
    }

    /// Sets the optional table name.
    #[must_use]
    pub fn table(mut self, name: &str) -> Self {
        self.table = Some(name.to_string());
        self
    }

    /// Adds an `int` column.
    #[must_use]
    pub fn int_column(self, name: &str, values: &[i32]) -> Self {
        self.column(name, ColumnData::Int(values.to_vec()))
    }

    /// Adds a `float` column.
    #[must_use]
    pub fn float_column(self, name: &str, values: &[f32]) -> Self {
        self.column(name, ColumnData::Float(values.to_vec()))
    }

    /// Adds a `str` column. Values longer than 32 bytes are truncated.
    #[must_use]
    pub fn text_column(self, name: &str, values: &[&str]) -> Self {
        self.column(name, ColumnData::Text(values.iter().map(|s| (*s).to_string()).collect()))
    }

    /// Adds a column.
    #[must_use]
    pub fn column(mut self, name: &str, data: ColumnData) -> Self {
        self.columns.push(FixtureColumn {
            name: name.to_string(),
            data,
            block_sizes: None,
        });
        self
    }

    /// Splits the most recently added column into blocks of the given
    /// sizes instead of uniform blocks. Sizes may be zero or exceed the
    /// block limit, to produce malformed files.
    ///
    /// # Panics
    ///
    /// Panics if no column was added or the sizes do not sum to the
    /// column's length.
    #[must_use]
    pub fn block_sizes(mut self, sizes: &[usize]) -> Self {
        let column = self.columns.last_mut().expect("block_sizes needs a column");
        assert_eq!(
            sizes.iter().sum::<usize>(),
            column.data.len(),
            "block sizes must cover column '{}'",
            column.name
        );
        column.block_sizes = Some(sizes.to_vec());
        self
    }

    /// Writes `n` filler bytes before the first column.
    #[must_use]
    pub fn padding(mut self, n: usize) -> Self {
        self.padding = n;
        self
    }

    /// Emits block statistics in descending index order.
    #[must_use]
    pub fn reverse_block_keys(mut self, reverse: bool) -> Self {
        self.reverse_block_keys = reverse;
        self
    }

    /// Returns the length of the data region.
    pub fn data_len(&self) -> usize {
        self.padding + self.columns.iter().map(|c| c.data.len() * width(&c.data)).sum::<usize>()
    }

    /// Returns the footer text.
    pub fn footer_text(&self) -> String {
        let mut out = String::from("{");
        if let Some(table) = &self.table {
            let _ = write!(out, "\"Table\":{},", quote(table));
        }
        let _ = write!(out, "\"Max Values Per Block\":{},\"Columns\":{{", self.max_values_per_block);

        let mut offset = self.padding;
        for (i, column) in self.columns.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            let blocks = column.blocks(self.max_values_per_block as usize);
            let _ = write!(
                out,
                "{}:{{\"type\":\"{}\",\"start_offset\":{offset},\"num_blocks\":{},\"block_stats\":{{",
                quote(&column.name),
                column.data.type_name(),
                blocks.len()
            );

            let mut order: Vec<usize> = (0..blocks.len()).collect();
            if self.reverse_block_keys {
                order.reverse();
            }
            for (n, &index) in order.iter().enumerate() {
                if n > 0 {
                    out.push(',');
                }
                let rows = blocks[index].clone();
                let _ = write!(out, "\"{index}\":{{\"num\":{},", rows.len());
                column.data.write_stats(rows, &mut out);
                out.push('}');
            }
            out.push_str("}}");
            offset += column.data.len() * width(&column.data);
        }
        out.push_str("}}");
        out
    }

    /// Returns the complete file image.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut data = vec![0xAB; self.padding];
        for column in &self.columns {
            column.data.encode(&mut data);
        }
        assemble(&data, &self.footer_text())
    }

    /// Writes the file to `path`.
    ///
    /// # Errors
    ///
    /// Returns any I/O error from writing.
    pub fn write_to(&self, path: impl AsRef<Path>) -> io::Result<()> {
        fs::write(path, self.to_bytes())
    }

    /// Writes the file into a fresh temporary directory.
    ///
    /// # Errors
    ///
    /// Returns any I/O error from creating the directory or writing.
    pub fn write_temp(&self) -> io::Result<Fixture> {
        Fixture::with_bytes(&self.to_bytes())
    }
}

/// A file in a temporary directory, deleted on drop.
#[derive(Debug)]
pub struct Fixture {
    dir: TempDir,
    path: PathBuf,
}

impl Fixture {
    /// Writes raw bytes to a new temporary file.
    ///
    /// # Errors
    ///
    /// Returns any I/O error from creating the directory or writing.
    pub fn with_bytes(bytes: &[u8]) -> io::Result<Self> {
        let dir = TempDir::new()?;
        let path = dir.path().join("fixture.db721");
        fs::write(&path, bytes)?;
        Ok(Self { dir, path })
    }

    /// Returns the file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the temporary directory.
    pub fn dir(&self) -> &Path {
        self.dir.path()
    }
}

/// Joins a data region and footer text into a file image.
pub fn assemble(data: &[u8], footer: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len() + footer.len() + 4);
    out.extend_from_slice(data);
    out.extend_from_slice(footer.as_bytes());
    let len = u32::try_from(footer.len()).unwrap_or(u32::MAX);
    out.extend_from_slice(&len.to_le_bytes());
    out
}

/// Overwrites the trailing footer length of a file image.
///
/// # Panics
///
/// Panics if `bytes` is shorter than four bytes.
pub fn set_declared_footer_len(bytes: &mut [u8], len: u32) {
    let at = bytes.len() - 4;
    bytes[at..].copy_from_slice(&len.to_le_bytes());
}

/// Encodes text as a 32-byte NUL-padded field, truncating longer input.
pub fn encode_text32(text: &str) -> [u8; FIXED_TEXT_WIDTH] {
    let mut field = [0u8; FIXED_TEXT_WIDTH];
    let bytes = text.as_bytes();
    let n = bytes.len().min(FIXED_TEXT_WIDTH);
    field[..n].copy_from_slice(&bytes[..n]);
    field
}

/// Returns the value a reader decodes for `text` after encoding.
fn stored_text(text: &str) -> String {
    let field = encode_text32(text);
    let end = field.iter().position(|&b| b == 0).unwrap_or(FIXED_TEXT_WIDTH);
    String::from_utf8_lossy(&field[..end]).into_owned()
}

fn width(data: &ColumnData) -> usize {
    match data {
        ColumnData::Int(_) | ColumnData::Float(_) => 4,
        ColumnData::Text(_) => FIXED_TEXT_WIDTH,
    }
}

fn quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
