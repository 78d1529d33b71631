//! `--where` clause parsing.
//!
//! A clause is `column op literal`, where `op` is one of
//! `=`, `==`, `<>`, `!=`, `<`, `<=`, `>`, `>=`. The literal is converted to
//! the column's declared type; text literals may be wrapped in single or
//! double quotes.

use anyhow::{anyhow, bail, Result};
use blockcol_common::error::BlockError;
use blockcol_common::types::{LogicalType, ScalarValue};
use blockcol_format::catalog::FileFooter;
use blockcol_scan::{CmpOp, Predicate};

/// Two-character operators first so `<=` is not read as `<`.
const OPERATORS: [&str; 8] = ["<=", ">=", "<>", "!=", "==", "=", "<", ">"];

/// Parses a clause against `footer`.
pub fn parse_where(clause: &str, footer: &FileFooter, case_insensitive: bool) -> Result<Predicate> {
    let (column, op, literal) = split_clause(clause)?;
    let meta = footer
        .column(column, case_insensitive)
        .ok_or_else(|| BlockError::column_not_found(column))?;
    let constant = parse_literal(literal, meta.logical_type())?;
    Ok(Predicate::new(meta.name(), op, constant))
}

fn split_clause(clause: &str) -> Result<(&str, CmpOp, &str)> {
    let (at, symbol) = clause
        .char_indices()
        .find_map(|(i, _)| {
            OPERATORS
                .iter()
                .find(|op| clause[i..].starts_with(**op))
                .map(|op| (i, *op))
        })
        .ok_or_else(|| anyhow!("no comparison operator in '{clause}'"))?;

    let column = clause[..at].trim();
    let literal = clause[at + symbol.len()..].trim();
    if column.is_empty() {
        bail!("missing column name in '{clause}'");
    }
    if literal.is_empty() {
        bail!("missing value in '{clause}'");
    }
    Ok((column, symbol.parse()?, literal))
}

fn parse_literal(literal: &str, ty: LogicalType) -> Result<ScalarValue> {
    match ty {
        LogicalType::Int32 => literal
            .parse::<i32>()
            .map(ScalarValue::Int32)
            .map_err(|_| anyhow!("'{literal}' is not a valid {ty} value")),
        LogicalType::Float32 => literal
            .parse::<f32>()
            .map(ScalarValue::Float32)
            .map_err(|_| anyhow!("'{literal}' is not a valid {ty} value")),
        LogicalType::FixedText32 => Ok(ScalarValue::Text(unquote(literal).to_string())),
    }
}

fn unquote(literal: &str) -> &str {
    for quote in ['\'', '"'] {
        if literal.len() >= 2 && literal.starts_with(quote) && literal.ends_with(quote) {
            return &literal[1..literal.len() - 1];
        }
    }
    literal
}
