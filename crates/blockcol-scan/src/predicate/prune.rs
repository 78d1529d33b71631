//! Block pruning against `[min, max]` statistics.

use std::cmp::Ordering;

use blockcol_common::types::ScalarValue;
use blockcol_format::catalog::BlockStat;

use super::CmpOp;

/// Result of evaluating a predicate against a whole block interval
/// `[min, max]` (both inclusive).
///
/// This is universal over the interval, not "does the block match":
///
/// - `AlwaysFalse`: no value in the interval satisfies the predicate. The
///   block is safe to skip.
/// - `MaybeTrue`: some values may satisfy it. The block must be read.
/// - `AlwaysTrue`: every value satisfies it. The block is read and no row
///   of it needs to be rechecked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntervalTruth {
    /// Skip the block.
    AlwaysFalse,
    /// Keep the block.
    MaybeTrue,
    /// Keep the block; every row matches.
    AlwaysTrue,
}

impl IntervalTruth {
    /// Returns true if the block can be skipped.
    pub fn can_skip(self) -> bool {
        self == IntervalTruth::AlwaysFalse
    }
}

/// Evaluates `x op constant` for every `x` a block could hold.
///
/// Empty blocks hold no rows and are always skippable. Blocks whose
/// statistics cannot be ordered against the constant (mismatched types,
/// NaN bounds, `min > max`) are always kept.
pub fn eval_cmp_on_block(op: CmpOp, constant: &ScalarValue, block: &BlockStat) -> IntervalTruth {
    if block.row_count == 0 {
        return IntervalTruth::AlwaysFalse;
    }
    if !block.is_consistent() {
        return IntervalTruth::MaybeTrue;
    }
    match (block.min.compare(constant), block.max.compare(constant)) {
        (Some(min), Some(max)) => eval_cmp_on_interval(op, min, max),
        _ => IntervalTruth::MaybeTrue,
    }
}

/// Evaluates a comparison over an interval, given how its bounds order
/// against the constant (`min.cmp(c)` and `max.cmp(c)`).
pub(crate) fn eval_cmp_on_interval(op: CmpOp, min: Ordering, max: Ordering) -> IntervalTruth {
    use IntervalTruth::*;
    use Ordering::{Equal, Greater, Less};

    match op {
        CmpOp::Lt => {
            if max == Less {
                AlwaysTrue
            } else if min != Less {
                AlwaysFalse
            } else {
                MaybeTrue
            }
        }
        CmpOp::LtEq => {
            if max != Greater {
                AlwaysTrue
            } else if min == Greater {
                AlwaysFalse
            } else {
                MaybeTrue
            }
        }
        CmpOp::Gt => {
            if min == Greater {
                AlwaysTrue
            } else if max != Greater {
                AlwaysFalse
            } else {
                MaybeTrue
            }
        }
        CmpOp::GtEq => {
            if min != Less {
                AlwaysTrue
            } else if max == Less {
                AlwaysFalse
            } else {
                MaybeTrue
            }
        }
        CmpOp::Eq => {
            if min == Greater || max == Less {
                AlwaysFalse
            } else if min == Equal && max == Equal {
                AlwaysTrue
            } else {
                MaybeTrue
            }
        }
        CmpOp::NotEq => {
            // Only a block holding the constant alone can be ruled out.
            if min == Equal && max == Equal {
                AlwaysFalse
            } else if min == Greater || max == Less {
                AlwaysTrue
            } else {
                MaybeTrue
            }
        }
    }
}
