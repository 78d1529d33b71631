//! Block skipping: no false skips, no reads of skipped rows.

use std::collections::BTreeSet;
use std::io::Cursor;
use std::sync::Arc;

use blockcol_common::config::ReaderConfig;
use blockcol_common::types::ScalarValue;
use blockcol_format::stream::CountingReader;
use blockcol_scan::{CmpOp, Predicate, ScanCursor};
use blockcol_test::FixtureBuilder;

const OPS: [CmpOp; 6] = [CmpOp::Eq, CmpOp::NotEq, CmpOp::Lt, CmpOp::LtEq, CmpOp::Gt, CmpOp::GtEq];

/// Deterministic pseudo-random values.
fn lcg(seed: u64, n: usize, modulus: i32) -> Vec<i32> {
    let mut state = seed;
    (0..n)
        .map(|_| {
            state = state.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1_442_695_040_888_963_407);
            ((state >> 33) % modulus as u64) as i32
        })
        .collect()
}

fn holds(op: CmpOp, value: &ScalarValue, constant: &ScalarValue) -> bool {
    use std::cmp::Ordering::*;
    let ord = value.compare(constant);
    match op {
        CmpOp::Eq => ord == Some(Equal),
        CmpOp::NotEq => ord != Some(Equal),
        CmpOp::Lt => ord == Some(Less),
        CmpOp::LtEq => matches!(ord, Some(Less | Equal)),
        CmpOp::Gt => ord == Some(Greater),
        CmpOp::GtEq => matches!(ord, Some(Greater | Equal)),
    }
}

/// Scans with `predicate` and returns the row ids (column 0) produced.
fn scanned_ids(bytes: &[u8], config: ReaderConfig, predicate: &Predicate) -> BTreeSet<i32> {
    let mut cursor = ScanCursor::from_reader(Cursor::new(bytes.to_vec()), Arc::new(config)).unwrap();
    cursor.register_predicate(predicate).unwrap();
    cursor
        .map(|row| row.unwrap()[0].as_i32().unwrap())
        .collect()
}

fn check_soundness(bytes: &[u8], values: &[ScalarValue], constants: &[ScalarValue], column: &str) {
    for op in OPS {
        for constant in constants {
            let predicate = Predicate::new(column, op, constant.clone());
            let expected: BTreeSet<i32> = values
                .iter()
                .enumerate()
                .filter(|(_, v)| holds(op, v, constant))
                .map(|(i, _)| i as i32)
                .collect();

            let kept = scanned_ids(bytes, ReaderConfig::for_testing(), &predicate);
            assert!(expected.is_subset(&kept), "false skip for {predicate}");

            let filtered = scanned_ids(bytes, ReaderConfig::for_testing().with_filter_rows(true), &predicate);
            assert_eq!(filtered, expected, "row filter for {predicate}");
        }
    }
}

#[test]
fn test_int_skip_soundness() {
    let values = lcg(7, 200, 1000);
    let ids: Vec<i32> = (0..200).collect();
    let bytes = FixtureBuilder::new(16)
        .int_column("row", &ids)
        .int_column("v", &values)
        .to_bytes();

    let values: Vec<ScalarValue> = values.into_iter().map(ScalarValue::Int32).collect();
    let constants: Vec<ScalarValue> = [-1, 0, 1, 250, 499, 500, 998, 999, 1000, i32::MIN, i32::MAX]
        .into_iter()
        .map(ScalarValue::Int32)
        .collect();
    check_soundness(&bytes, &values, &constants, "v");
}

#[test]
fn test_sorted_int_skips_most_blocks() {
    let ids: Vec<i32> = (0..1000).collect();
    let bytes = FixtureBuilder::new(100).int_column("row", &ids).to_bytes();
    let mut cursor = ScanCursor::from_reader(Cursor::new(bytes), Arc::new(ReaderConfig::default())).unwrap();
    cursor.register("row", CmpOp::Eq, 555).unwrap();

    let rows: Vec<_> = cursor.by_ref().collect::<Result<_, _>>().unwrap();
    assert_eq!(rows.len(), 100);
    assert_eq!(cursor.stats().blocks_skipped, 9);
    assert_eq!(cursor.stats().rows_skipped, 900);
}

#[test]
fn test_float_skip_soundness() {
    let ids: Vec<i32> = (0..120).collect();
    let values: Vec<f32> = lcg(11, 120, 2000).into_iter().map(|v| v as f32 / 8.0 - 100.0).collect();
    let bytes = FixtureBuilder::new(10)
        .int_column("row", &ids)
        .float_column("f", &values)
        .to_bytes();

    let constants: Vec<ScalarValue> = [-100.0f32, -0.5, 0.0, 0.1, 12.375, 149.875, 150.0, 1e9]
        .into_iter()
        .chain(values.iter().copied().take(5))
        .map(ScalarValue::Float32)
        .collect();
    let values: Vec<ScalarValue> = values.into_iter().map(ScalarValue::Float32).collect();
    check_soundness(&bytes, &values, &constants, "f");
}

#[test]
fn test_text_skip_soundness() {
    let words = [
        "apple", "banana", "cherry", "date", "elder", "fig", "grape", "honeydew", "kiwi", "lemon", "mango",
        "nectarine", "olive", "papaya", "quince", "raspberry", "", "Zebra", "zzz", "a",
    ];
    let ids: Vec<i32> = (0..words.len() as i32).collect();
    let bytes = FixtureBuilder::new(3)
        .int_column("row", &ids)
        .text_column("t", &words)
        .to_bytes();

    let values: Vec<ScalarValue> = words.iter().map(|w| ScalarValue::from(*w)).collect();
    let constants: Vec<ScalarValue> = ["", "a", "apple", "b", "fig", "m", "raspberry", "zz", "zzzz", "Z"]
        .into_iter()
        .map(ScalarValue::from)
        .collect();
    check_soundness(&bytes, &values, &constants, "t");
}

#[test]
fn test_skipped_rows_are_never_read() {
    let ids: Vec<i32> = (0..40).collect();
    let scores: Vec<f32> = ids.iter().map(|&i| i as f32).collect();
    let builder = FixtureBuilder::new(10).int_column("id", &ids).float_column("score", &scores);
    let bytes = builder.to_bytes();

    let reader = CountingReader::new(Cursor::new(bytes));
    let io = reader.stats();
    let mut cursor = ScanCursor::from_reader(reader, Arc::new(ReaderConfig::default())).unwrap();
    io.reset();

    cursor.register("id", CmpOp::GtEq, 30).unwrap();
    let rows: Vec<_> = cursor.by_ref().collect::<Result<_, _>>().unwrap();
    assert_eq!(rows.len(), 10);

    // id occupies [0, 160), score [160, 320).
    assert!(!io.touched(0..120), "skipped id rows were read");
    assert!(!io.touched(160..280), "skipped score rows were read");
    assert!(io.touched(120..160));
    assert!(io.touched(280..320));
    assert_eq!(io.bytes_read(), 80);
}

#[test]
fn test_projection_reads_only_projected_columns() {
    let ids: Vec<i32> = (0..20).collect();
    let bytes = FixtureBuilder::new(5)
        .int_column("id", &ids)
        .text_column("name", &["n"; 20])
        .to_bytes();

    let reader = CountingReader::new(Cursor::new(bytes));
    let io = reader.stats();
    let mut cursor = ScanCursor::from_reader(reader, Arc::new(ReaderConfig::default())).unwrap();
    io.reset();

    cursor.project(&["id"]).unwrap();
    let rows: Vec<_> = cursor.by_ref().collect::<Result<_, _>>().unwrap();
    assert_eq!(rows.len(), 20);
    assert!(!io.touched(80..80 + 20 * 32));
}

#[test]
fn test_empty_blocks_are_passed_over() {
    let bytes = FixtureBuilder::new(4)
        .int_column("id", &[1, 2, 3, 4, 5])
        .block_sizes(&[2, 0, 3, 0])
        .to_bytes();
    let mut cursor = ScanCursor::from_reader(Cursor::new(bytes), Arc::new(ReaderConfig::default())).unwrap();
    assert_eq!(cursor.footer().columns()[0].block_count(), 4);

    cursor.register("id", CmpOp::Gt, 2).unwrap();
    let rows: Vec<_> = cursor.by_ref().collect::<Result<Vec<_>, _>>().unwrap();
    assert_eq!(rows, vec![vec![3.into()], vec![4.into()], vec![5.into()]]);
    assert_eq!(cursor.stats().blocks_skipped, 1);
}
