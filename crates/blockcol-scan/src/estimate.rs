//! Row-count estimation from block statistics.

use blockcol_format::catalog::FileFooter;

use crate::predicate::BoundPredicate;

/// Returns an upper bound on the rows `predicate` can match: the total row
/// count of the blocks its statistics cannot rule out.
pub fn estimate_matching_rows(footer: &FileFooter, predicate: &BoundPredicate) -> u64 {
    let Some(column) = footer.column_at(predicate.column_index()) else {
        return footer.row_count();
    };
    column
        .blocks()
        .iter()
        .filter(|block| !predicate.eval_block(block).can_skip())
        .map(|block| u64::from(block.row_count))
        .sum()
}

/// Returns the indices of the blocks a scan with `predicate` will skip.
pub fn skippable_blocks(footer: &FileFooter, predicate: &BoundPredicate) -> Vec<usize> {
    let Some(column) = footer.column_at(predicate.column_index()) else {
        return Vec::new();
    };
    column
        .blocks()
        .iter()
        .enumerate()
        .filter(|(_, block)| predicate.eval_block(block).can_skip())
        .map(|(index, _)| index)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockcol_test::FixtureBuilder;

    use crate::predicate::{CmpOp, Predicate};

    fn footer() -> FileFooter {
        let values: Vec<i32> = (0..100).collect();
        let text = FixtureBuilder::new(10).int_column("v", &values).footer_text();
        FileFooter::from_bytes(text.as_bytes()).unwrap()
    }

    #[test]
    fn test_estimate() {
        let footer = footer();
        let bind = |op, c: i32| Predicate::new("v", op, c).bind(&footer, false).unwrap();

        assert_eq!(estimate_matching_rows(&footer, &bind(CmpOp::Lt, 25)), 30);
        assert_eq!(estimate_matching_rows(&footer, &bind(CmpOp::Eq, 1000)), 0);
        assert_eq!(estimate_matching_rows(&footer, &bind(CmpOp::NotEq, 5)), 100);
        assert_eq!(estimate_matching_rows(&footer, &bind(CmpOp::GtEq, 90)), 10);
    }

    #[test]
    fn test_skippable_blocks() {
        let footer = footer();
        let predicate = Predicate::new("v", CmpOp::Gt, 69).bind(&footer, false).unwrap();
        assert_eq!(skippable_blocks(&footer, &predicate), vec![0, 1, 2, 3, 4, 5]);
    }
}
