//! Builds the typed catalog from a parsed footer tree.
//!
//! Footer shape:
//!
//! ```text
//! {
//!   "Table": <str>,                       (optional)
//!   "Max Values Per Block": <int>,
//!   "Columns": {
//!     "<name>": {
//!       "type": "int" | "float" | "str",
//!       "start_offset": <int>,
//!       "num_blocks": <int>,
//!       "block_stats": {
//!         "<index>": { "num": <int>, "min": <num|str>, "max": <num|str>,
//!                      "min_len": <int>, "max_len": <int> }   (lens: str only)
//!       }
//!     }
//!   }
//! }
//! ```

use blockcol_common::error::{BlockError, BlockResult};
use blockcol_common::types::{LogicalType, ScalarValue};
use tracing::warn;

use super::column::{BlockStat, ColumnMeta};
use super::footer::FileFooter;
use crate::meta::{Dict, Value};

/// Footer key holding the block size limit.
pub const KEY_MAX_VALUES_PER_BLOCK: &str = "Max Values Per Block";
/// Footer key holding the column map.
pub const KEY_COLUMNS: &str = "Columns";
/// Footer key holding the optional table name.
pub const KEY_TABLE: &str = "Table";
/// Column key holding the type name.
pub const KEY_TYPE: &str = "type";
/// Column key holding the absolute offset of the first element.
pub const KEY_START_OFFSET: &str = "start_offset";
/// Column key holding the number of blocks.
pub const KEY_NUM_BLOCKS: &str = "num_blocks";
/// Column key holding the block statistics map.
pub const KEY_BLOCK_STATS: &str = "block_stats";
/// Block key holding the row count.
pub const KEY_NUM: &str = "num";
/// Block key holding the minimum value.
pub const KEY_MIN: &str = "min";
/// Block key holding the maximum value.
pub const KEY_MAX: &str = "max";
/// Block key holding the byte length of the minimum string.
pub const KEY_MIN_LEN: &str = "min_len";
/// Block key holding the byte length of the maximum string.
pub const KEY_MAX_LEN: &str = "max_len";

/// Which side of a range a coerced bound sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bound {
    Lower,
    Upper,
}

pub(crate) fn build_footer(root: &Value) -> BlockResult<FileFooter> {
    let Value::Dict(root) = root else {
        return Err(BlockError::format(format!(
            "footer must be an object, found {}",
            root.type_name()
        )));
    };

    let max_values_per_block = match root.get(KEY_MAX_VALUES_PER_BLOCK) {
        Some(value) => as_u32(value, KEY_MAX_VALUES_PER_BLOCK, "footer")?,
        None => return Err(BlockError::format("missing max block size")),
    };

    let table_name = match root.get(KEY_TABLE) {
        None => None,
        Some(Value::Text(name)) => Some(name.clone()),
        Some(_) => return Err(BlockError::wrong_value(KEY_TABLE, "footer", "a string")),
    };

    let columns = require_dict(root, KEY_COLUMNS, "footer")?
        .iter()
        .map(|(name, value)| build_column(name, value, max_values_per_block))
        .collect::<BlockResult<Vec<_>>>()?;

    FileFooter::new(max_values_per_block, table_name, columns)
}

fn build_column(name: &str, value: &Value, max_values_per_block: u32) -> BlockResult<ColumnMeta> {
    let context = format!("column '{name}'");
    let Value::Dict(dict) = value else {
        return Err(BlockError::format(format!("{context} must be an object")));
    };

    let type_name = require_text(dict, KEY_TYPE, &context)?;
    let logical_type = LogicalType::from_footer_name(type_name).ok_or_else(|| {
        BlockError::format(format!("{context} has unknown type '{type_name}'"))
    })?;
    let file_offset = as_u64(require(dict, KEY_START_OFFSET, &context)?, KEY_START_OFFSET, &context)?;
    let num_blocks = as_u32(require(dict, KEY_NUM_BLOCKS, &context)?, KEY_NUM_BLOCKS, &context)?;
    let stats = require_dict(dict, KEY_BLOCK_STATS, &context)?;

    // Map order is not block order: sort by numeric index.
    let mut indexed = stats
        .iter()
        .map(|(key, value)| {
            key.parse::<u32>().map(|index| (index, value)).map_err(|_| {
                BlockError::format(format!("{context} has non-numeric block index '{key}'"))
            })
        })
        .collect::<BlockResult<Vec<_>>>()?;
    indexed.sort_by_key(|&(index, _)| index);

    if indexed.len() != num_blocks as usize {
        return Err(BlockError::format(format!(
            "{context} declares {num_blocks} blocks but has {} block stats",
            indexed.len()
        )));
    }

    let mut blocks = Vec::with_capacity(indexed.len());
    for (position, (index, value)) in indexed.into_iter().enumerate() {
        if index as usize != position {
            return Err(BlockError::format(format!(
                "{context} block indices are not contiguous: expected {position}, found {index}"
            )));
        }
        blocks.push(build_block(name, index, value, logical_type, max_values_per_block)?);
    }

    Ok(ColumnMeta::new(name, logical_type, file_offset, blocks))
}

fn build_block(
    column: &str,
    index: u32,
    value: &Value,
    logical_type: LogicalType,
    max_values_per_block: u32,
) -> BlockResult<BlockStat> {
    let context = format!("block {index} of column '{column}'");
    let Value::Dict(dict) = value else {
        return Err(BlockError::format(format!("{context} must be an object")));
    };

    let row_count = as_u32(require(dict, KEY_NUM, &context)?, KEY_NUM, &context)?;
    if row_count > max_values_per_block {
        return Err(BlockError::format(format!(
            "{context} holds {row_count} rows, more than the {max_values_per_block} allowed per block"
        )));
    }

    let min_value = require(dict, KEY_MIN, &context)?;
    let max_value = require(dict, KEY_MAX, &context)?;

    let stat = match logical_type {
        LogicalType::Int32 => BlockStat {
            row_count,
            min: coerce_int(min_value, Bound::Lower, KEY_MIN, &context)?,
            max: coerce_int(max_value, Bound::Upper, KEY_MAX, &context)?,
            min_len: 0,
            max_len: 0,
        },
        LogicalType::Float32 => BlockStat {
            row_count,
            min: coerce_float(min_value, Bound::Lower, KEY_MIN, &context)?,
            max: coerce_float(max_value, Bound::Upper, KEY_MAX, &context)?,
            min_len: 0,
            max_len: 0,
        },
        LogicalType::FixedText32 => {
            let as_text = |value: &Value, key: &str| match value {
                Value::Text(s) => Ok(ScalarValue::Text(s.clone())),
                _ => Err(BlockError::wrong_value(key, &context, "a string")),
            };
            BlockStat {
                row_count,
                min: as_text(min_value, KEY_MIN)?,
                max: as_text(max_value, KEY_MAX)?,
                // Lengths are stored as written; pruning never reads them.
                min_len: as_u32(require(dict, KEY_MIN_LEN, &context)?, KEY_MIN_LEN, &context)?,
                max_len: as_u32(require(dict, KEY_MAX_LEN, &context)?, KEY_MAX_LEN, &context)?,
            }
        }
    };

    if row_count > 0 && !stat.is_consistent() {
        warn!(
            column,
            block = index,
            min = %stat.min,
            max = %stat.max,
            "block statistics are inconsistent; block will never be skipped"
        );
    }

    Ok(stat)
}

fn require<'a>(dict: &'a Dict, key: &str, context: &str) -> BlockResult<&'a Value> {
    dict.get(key)
        .ok_or_else(|| BlockError::missing_key(key, context))
}

fn require_dict<'a>(dict: &'a Dict, key: &str, context: &str) -> BlockResult<&'a Dict> {
    match require(dict, key, context)? {
        Value::Dict(inner) => Ok(inner),
        _ => Err(BlockError::wrong_value(key, context, "an object")),
    }
}

fn require_text<'a>(dict: &'a Dict, key: &str, context: &str) -> BlockResult<&'a str> {
    match require(dict, key, context)? {
        Value::Text(s) => Ok(s),
        _ => Err(BlockError::wrong_value(key, context, "a string")),
    }
}

fn as_u64(value: &Value, key: &str, context: &str) -> BlockResult<u64> {
    match value {
        Value::Integer(i) => {
            u64::try_from(*i).map_err(|_| BlockError::wrong_value(key, context, "a non-negative integer"))
        }
        _ => Err(BlockError::wrong_value(key, context, "a non-negative integer")),
    }
}

fn as_u32(value: &Value, key: &str, context: &str) -> BlockResult<u32> {
    let wide = as_u64(value, key, context)?;
    u32::try_from(wide).map_err(|_| BlockError::wrong_value(key, context, "at most 4294967295"))
}

/// Coerces an integer or float literal to an `Int32` bound.
///
/// Fractional lower bounds round down and upper bounds round up, so the
/// coerced range always contains the literal range.
fn coerce_int(value: &Value, bound: Bound, key: &str, context: &str) -> BlockResult<ScalarValue> {
    let out_of_range = || BlockError::wrong_value(key, context, "a 32-bit integer");
    match value {
        Value::Integer(i) => i32::try_from(*i)
            .map(ScalarValue::Int32)
            .map_err(|_| out_of_range()),
        Value::Float(f) if f.is_finite() => {
            let rounded = match bound {
                Bound::Lower => f.floor(),
                Bound::Upper => f.ceil(),
            };
            if rounded < f64::from(i32::MIN) || rounded > f64::from(i32::MAX) {
                return Err(out_of_range());
            }
            Ok(ScalarValue::Int32(rounded as i32))
        }
        _ => Err(BlockError::wrong_value(key, context, "a number")),
    }
}

/// Coerces an integer or float literal to a `Float32` bound.
///
/// Narrowing to `f32` rounds outward so the bound stays conservative.
fn coerce_float(value: &Value, bound: Bound, key: &str, context: &str) -> BlockResult<ScalarValue> {
    let wide = value
        .as_number()
        .ok_or_else(|| BlockError::wrong_value(key, context, "a number"))?;
    Ok(ScalarValue::Float32(narrow_f32(wide, bound)))
}

#[allow(clippy::cast_possible_truncation)]
fn narrow_f32(wide: f64, bound: Bound) -> f32 {
    let narrow = wide as f32;
    match bound {
        Bound::Lower if f64::from(narrow) > wide => step_down(narrow),
        Bound::Upper if f64::from(narrow) < wide => step_up(narrow),
        _ => narrow,
    }
}

fn step_down(v: f32) -> f32 {
    if v.is_nan() || v == f32::NEG_INFINITY {
        v
    } else if v == 0.0 {
        -f32::from_bits(1)
    } else if v > 0.0 {
        f32::from_bits(v.to_bits() - 1)
    } else {
        f32::from_bits(v.to_bits() + 1)
    }
}

fn step_up(v: f32) -> f32 {
    if v.is_nan() || v == f32::INFINITY {
        v
    } else if v == 0.0 {
        f32::from_bits(1)
    } else if v > 0.0 {
        f32::from_bits(v.to_bits() + 1)
    } else {
        f32::from_bits(v.to_bits() - 1)
    }
}
