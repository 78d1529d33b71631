//! Single-column comparison predicates.
//!
//! A `Predicate` names its column; binding it against a catalog checks
//! that the column exists and that the constant has the column's type,
//! producing a `BoundPredicate` the cursor evaluates.

mod prune;

pub use prune::{eval_cmp_on_block, IntervalTruth};

use std::fmt;
use std::str::FromStr;

use blockcol_common::error::{BlockError, BlockResult};
use blockcol_common::types::ScalarValue;
use blockcol_format::catalog::{BlockStat, FileFooter};

/// Comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CmpOp {
    /// `=`
    Eq,
    /// `<>` / `!=`
    NotEq,
    /// `<`
    Lt,
    /// `<=`
    LtEq,
    /// `>`
    Gt,
    /// `>=`
    GtEq,
}

impl CmpOp {
    /// Returns the operator symbol.
    pub const fn symbol(self) -> &'static str {
        match self {
            CmpOp::Eq => "=",
            CmpOp::NotEq => "<>",
            CmpOp::Lt => "<",
            CmpOp::LtEq => "<=",
            CmpOp::Gt => ">",
            CmpOp::GtEq => ">=",
        }
    }

    /// Returns the operator with its operands swapped (`c < x` is `x > c`).
    pub const fn flip(self) -> Self {
        match self {
            CmpOp::Eq => CmpOp::Eq,
            CmpOp::NotEq => CmpOp::NotEq,
            CmpOp::Lt => CmpOp::Gt,
            CmpOp::LtEq => CmpOp::GtEq,
            CmpOp::Gt => CmpOp::Lt,
            CmpOp::GtEq => CmpOp::LtEq,
        }
    }
}

impl fmt::Display for CmpOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for CmpOp {
    type Err = BlockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "=" | "==" => Ok(CmpOp::Eq),
            "<>" | "!=" => Ok(CmpOp::NotEq),
            "<" => Ok(CmpOp::Lt),
            "<=" => Ok(CmpOp::LtEq),
            ">" => Ok(CmpOp::Gt),
            ">=" => Ok(CmpOp::GtEq),
            other => Err(BlockError::invalid_argument(format!(
                "unknown comparison operator '{other}'"
            ))),
        }
    }
}

/// An unbound comparison `column op constant`.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    /// Column name.
    pub column: String,
    /// Operator.
    pub op: CmpOp,
    /// Constant operand.
    pub constant: ScalarValue,
}

impl Predicate {
    /// Creates a predicate.
    pub fn new(column: impl Into<String>, op: CmpOp, constant: impl Into<ScalarValue>) -> Self {
        Self {
            column: column.into(),
            op,
            constant: constant.into(),
        }
    }

    /// Resolves the column in `footer` and checks the constant's type.
    ///
    /// # Errors
    ///
    /// Returns `BlockError::ColumnNotFound` for an unknown column and
    /// `BlockError::TypeMismatch` if the constant's type differs from the
    /// column's declared type.
    pub fn bind(&self, footer: &FileFooter, case_insensitive: bool) -> BlockResult<BoundPredicate> {
        let column_index = footer
            .column_index(&self.column, case_insensitive)
            .ok_or_else(|| BlockError::column_not_found(&self.column))?;
        let column = &footer.columns()[column_index];

        if self.constant.logical_type() != column.logical_type() {
            return Err(BlockError::type_mismatch(
                column.name(),
                column.logical_type(),
                self.constant.type_name(),
            ));
        }

        Ok(BoundPredicate {
            column_index,
            column: column.name().to_string(),
            op: self.op,
            constant: self.constant.clone(),
        })
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.column, self.op, self.constant)
    }
}

/// A predicate resolved against a catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundPredicate {
    column_index: usize,
    column: String,
    op: CmpOp,
    constant: ScalarValue,
}

impl BoundPredicate {
    /// Returns the schema position of the predicate column.
    pub fn column_index(&self) -> usize {
        self.column_index
    }

    /// Returns the catalog name of the predicate column.
    pub fn column(&self) -> &str {
        &self.column
    }

    /// Returns the operator.
    pub fn op(&self) -> CmpOp {
        self.op
    }

    /// Returns the constant operand.
    pub fn constant(&self) -> &ScalarValue {
        &self.constant
    }

    /// Evaluates the predicate against one decoded value.
    ///
    /// Comparisons involving NaN are false, except `<>` which is true.
    pub fn matches(&self, value: &ScalarValue) -> bool {
        use std::cmp::Ordering::{Equal, Greater, Less};

        let ord = value.compare(&self.constant);
        match self.op {
            CmpOp::Eq => ord == Some(Equal),
            CmpOp::NotEq => ord != Some(Equal),
            CmpOp::Lt => ord == Some(Less),
            CmpOp::LtEq => matches!(ord, Some(Less | Equal)),
            CmpOp::Gt => ord == Some(Greater),
            CmpOp::GtEq => matches!(ord, Some(Greater | Equal)),
        }
    }

    /// Evaluates the predicate over every row a block could hold.
    pub fn eval_block(&self, block: &BlockStat) -> IntervalTruth {
        eval_cmp_on_block(self.op, &self.constant, block)
    }
}

impl fmt::Display for BoundPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.column, self.op, self.constant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockcol_format::catalog::ColumnMeta;
    use blockcol_common::types::LogicalType;

    fn footer() -> FileFooter {
        let block = BlockStat {
            row_count: 2,
            min: ScalarValue::Int32(1),
            max: ScalarValue::Int32(2),
            min_len: 0,
            max_len: 0,
        };
        let text = BlockStat {
            row_count: 2,
            min: ScalarValue::from("a"),
            max: ScalarValue::from("b"),
            min_len: 1,
            max_len: 1,
        };
        FileFooter::new(
            2,
            None,
            vec![
                ColumnMeta::new("id", LogicalType::Int32, 0, vec![block]),
                ColumnMeta::new("name", LogicalType::FixedText32, 8, vec![text]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_operator_parsing() {
        for op in [CmpOp::Eq, CmpOp::NotEq, CmpOp::Lt, CmpOp::LtEq, CmpOp::Gt, CmpOp::GtEq] {
            assert_eq!(op.symbol().parse::<CmpOp>().unwrap(), op);
        }
        assert_eq!("!=".parse::<CmpOp>().unwrap(), CmpOp::NotEq);
        assert!("~".parse::<CmpOp>().is_err());
        assert_eq!(CmpOp::Lt.flip(), CmpOp::Gt);
    }

    #[test]
    fn test_bind() {
        let footer = footer();
        let bound = Predicate::new("ID", CmpOp::Lt, 3).bind(&footer, true).unwrap();
        assert_eq!(bound.column_index(), 0);
        assert_eq!(bound.column(), "id");
        assert_eq!(bound.to_string(), "id < 3");
    }

    #[test]
    fn test_bind_type_mismatch() {
        let footer = footer();
        let err = Predicate::new("id", CmpOp::Eq, "3").bind(&footer, true).unwrap_err();
        assert!(err.is_type());
        let err = Predicate::new("name", CmpOp::Eq, 3).bind(&footer, true).unwrap_err();
        assert!(err.is_type());
        let err = Predicate::new("id", CmpOp::Eq, 3.0f32).bind(&footer, true).unwrap_err();
        assert!(err.is_type());
    }

    #[test]
    fn test_bind_unknown_column() {
        let err = Predicate::new("missing", CmpOp::Eq, 1)
            .bind(&footer(), true)
            .unwrap_err();
        assert!(matches!(err, BlockError::ColumnNotFound { .. }));
    }

    #[test]
    fn test_row_matches() {
        let footer = footer();
        let lt = Predicate::new("id", CmpOp::Lt, 3).bind(&footer, false).unwrap();
        assert!(lt.matches(&ScalarValue::Int32(2)));
        assert!(!lt.matches(&ScalarValue::Int32(3)));

        let ne = Predicate::new("id", CmpOp::NotEq, 3).bind(&footer, false).unwrap();
        assert!(ne.matches(&ScalarValue::Int32(2)));
        assert!(!ne.matches(&ScalarValue::Int32(3)));

        let ge = Predicate::new("name", CmpOp::GtEq, "b").bind(&footer, false).unwrap();
        assert!(ge.matches(&ScalarValue::from("ba")));
        assert!(!ge.matches(&ScalarValue::from("a")));
    }
}
