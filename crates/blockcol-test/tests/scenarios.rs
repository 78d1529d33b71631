//! End-to-end scenarios over files written to disk.

use blockcol_common::error::BlockError;
use blockcol_common::types::{Row, ScalarValue};
use blockcol_scan::{BlockFile, CmpOp, ScanCursor};
use blockcol_test::{assemble, set_declared_footer_len, Fixture, FixtureBuilder};

const SCENARIO_FOOTER: &str = r#"{"Max Values Per Block":2,"Columns":{"id":{"type":"int","start_offset":0,"num_blocks":2,"block_stats":{"0":{"num":2,"min":1,"max":2},"1":{"num":2,"min":3,"max":4}}}}}"#;

fn scenario_file() -> Fixture {
    let mut data = Vec::new();
    for v in [1i32, 2, 3, 4] {
        data.extend_from_slice(&v.to_le_bytes());
    }
    Fixture::with_bytes(&assemble(&data, SCENARIO_FOOTER)).unwrap()
}

fn rows(cursor: &mut ScanCursor) -> Vec<Row> {
    cursor.by_ref().collect::<Result<Vec<_>, _>>().unwrap()
}

fn int_rows(values: &[i32]) -> Vec<Row> {
    values.iter().map(|&v| vec![ScalarValue::Int32(v)]).collect()
}

#[test]
fn test_open_and_full_scan() {
    let fixture = scenario_file();
    let mut cursor = ScanCursor::open(fixture.path()).unwrap();
    assert_eq!(cursor.footer().row_count(), 4);
    assert_eq!(cursor.footer().column_count(), 1);
    assert_eq!(rows(&mut cursor), int_rows(&[1, 2, 3, 4]));
    cursor.close();
}

#[test]
fn test_predicate_returns_first_block_only() {
    let fixture = scenario_file();
    let mut cursor = ScanCursor::open(fixture.path()).unwrap();
    cursor.register("id", CmpOp::Lt, 3).unwrap();
    assert_eq!(rows(&mut cursor), int_rows(&[1, 2]));
    assert_eq!(cursor.stats().blocks_skipped, 1);
    assert_eq!(cursor.stats().elements_read, 2);
}

#[test]
fn test_missing_columns_is_format_error() {
    let fixture = Fixture::with_bytes(&assemble(&[], r#"{"Max Values Per Block":2}"#)).unwrap();
    let err = ScanCursor::open(fixture.path()).unwrap_err();
    assert!(err.is_format(), "{err}");
}

#[test]
fn test_declared_footer_longer_than_file_is_io_error() {
    let mut bytes = vec![0u8; 50];
    set_declared_footer_len(&mut bytes, 1000);
    let fixture = Fixture::with_bytes(&bytes).unwrap();

    let err = ScanCursor::open(fixture.path()).unwrap_err();
    assert!(err.is_io(), "{err}");
    assert!(matches!(err, BlockError::ShortFile { required: 1004, actual: 50 }));
}

#[test]
fn test_row_count_mismatch_is_format_error() {
    let fixture = FixtureBuilder::new(4)
        .int_column("a", &[1, 2, 3])
        .int_column("b", &[1, 2, 3, 4])
        .write_temp()
        .unwrap();
    let err = ScanCursor::open(fixture.path()).unwrap_err();
    assert!(err.is_format());
    assert!(err.to_string().contains("row count mismatch across columns"));
}

#[test]
fn test_string_constant_on_int_column_is_type_error() {
    let fixture = scenario_file();
    let mut cursor = ScanCursor::open(fixture.path()).unwrap();
    let err = cursor.register("id", CmpOp::Eq, "3").unwrap_err();
    assert!(err.is_type());

    // Unaffected until corrected.
    cursor.register("id", CmpOp::Eq, 3).unwrap();
    assert_eq!(rows(&mut cursor), int_rows(&[3, 4]));
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = ScanCursor::open(dir.path().join("absent.db721")).unwrap_err();
    assert!(err.is_io());
    assert!(matches!(err, BlockError::NotFound { .. }));
}

#[test]
fn test_tiny_file_is_io_error() {
    let fixture = Fixture::with_bytes(&[1, 2]).unwrap();
    assert!(ScanCursor::open(fixture.path()).unwrap_err().is_io());
}

#[test]
fn test_malformed_footer_is_parse_error() {
    let fixture = Fixture::with_bytes(&assemble(&[], r#"{"Columns": {"#)).unwrap();
    let err = ScanCursor::open(fixture.path()).unwrap_err();
    assert!(err.is_parse(), "{err}");
}

#[test]
fn test_column_past_data_region_is_format_error() {
    // Offset 8 with four int rows needs 24 bytes of data; there are 16.
    let footer = SCENARIO_FOOTER.replace("\"start_offset\":0", "\"start_offset\":8");
    let mut data = Vec::new();
    for v in [1i32, 2, 3, 4] {
        data.extend_from_slice(&v.to_le_bytes());
    }
    let fixture = Fixture::with_bytes(&assemble(&data, &footer)).unwrap();
    assert!(ScanCursor::open(fixture.path()).unwrap_err().is_format());
}

#[test]
fn test_block_larger_than_limit_is_format_error() {
    let fixture = FixtureBuilder::new(2)
        .int_column("id", &[1, 2, 3, 4])
        .block_sizes(&[3, 1])
        .write_temp()
        .unwrap();
    assert!(BlockFile::open(fixture.path()).unwrap_err().is_format());
}

#[test]
fn test_mixed_columns_and_table_name() {
    let fixture = FixtureBuilder::new(3)
        .table("Farm")
        .text_column("farm_name", &["Alpha", "Bravo", "Charlie", "Delta", "Echo"])
        .int_column("min_age_weeks", &[1, 5, 9, 13, 17])
        .float_column("avg_weight", &[10.5, 20.25, 30.0, 40.75, 50.5])
        .write_temp()
        .unwrap();

    let table = BlockFile::open(fixture.path()).unwrap();
    assert_eq!(table.footer().table_name(), Some("Farm"));
    assert_eq!(table.row_count(), 5);

    let mut cursor = table.cursor().unwrap();
    cursor.register("avg_weight", CmpOp::Gt, 35.0f32).unwrap();
    let rows = rows(&mut cursor);
    assert_eq!(
        rows,
        vec![
            vec![ScalarValue::from("Delta"), ScalarValue::Int32(13), ScalarValue::Float32(40.75)],
            vec![ScalarValue::from("Echo"), ScalarValue::Int32(17), ScalarValue::Float32(50.5)],
        ]
    );
}
