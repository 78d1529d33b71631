//! Cursor lifecycle, rescan and concurrent cursors.

use std::sync::Arc;
use std::thread;

use blockcol_common::types::{Row, ScalarValue};
use blockcol_scan::{BlockFile, CmpOp, CursorState, ScanCursor};
use blockcol_test::FixtureBuilder;

fn collect(cursor: &mut ScanCursor) -> Vec<Row> {
    cursor.by_ref().collect::<Result<Vec<_>, _>>().unwrap()
}

#[test]
fn test_rescan_is_idempotent() {
    let values: Vec<i32> = (0..50).map(|i| (i * 37) % 50).collect();
    let fixture = FixtureBuilder::new(8).int_column("v", &values).write_temp().unwrap();
    let mut cursor = ScanCursor::open(fixture.path()).unwrap();
    cursor.register("v", CmpOp::LtEq, 10).unwrap();

    let first = collect(&mut cursor);
    for _ in 0..3 {
        cursor.rescan().unwrap();
        assert_eq!(collect(&mut cursor), first);
    }
    assert_eq!(cursor.stats().rescans, 3);
}

#[test]
fn test_rescan_mid_scan() {
    let fixture = FixtureBuilder::new(2).int_column("id", &[1, 2, 3, 4]).write_temp().unwrap();
    let mut cursor = ScanCursor::open(fixture.path()).unwrap();
    cursor.next_row().unwrap();
    cursor.next_row().unwrap();
    assert_eq!(cursor.position(), 2);

    cursor.rescan().unwrap();
    assert_eq!(cursor.position(), 0);
    assert_eq!(collect(&mut cursor).len(), 4);
}

#[test]
fn test_predicate_can_change_after_rescan() {
    let fixture = FixtureBuilder::new(2).int_column("id", &[1, 2, 3, 4]).write_temp().unwrap();
    let mut cursor = ScanCursor::open(fixture.path()).unwrap();
    cursor.register("id", CmpOp::Lt, 3).unwrap();
    assert_eq!(collect(&mut cursor).len(), 2);

    cursor.rescan().unwrap();
    cursor.clear_predicate().unwrap();
    assert_eq!(collect(&mut cursor).len(), 4);
}

#[test]
fn test_close_rejects_further_calls() {
    let fixture = FixtureBuilder::new(2).int_column("id", &[1, 2]).write_temp().unwrap();
    let mut cursor = ScanCursor::open(fixture.path()).unwrap();
    cursor.close();
    assert_eq!(cursor.state(), CursorState::Closed);

    let mut row = Vec::new();
    assert!(cursor.next_into(&mut row).unwrap_err().is_state());
    assert!(cursor.rescan().unwrap_err().is_state());
    assert!(cursor.project(&["id"]).unwrap_err().is_state());
    assert!(cursor.next().unwrap().unwrap_err().is_state());

    // Reopening the path is always allowed.
    let mut reopened = ScanCursor::open(fixture.path()).unwrap();
    assert_eq!(collect(&mut reopened).len(), 2);
}

#[test]
fn test_next_into_reuses_buffer() {
    let fixture = FixtureBuilder::new(2)
        .int_column("id", &[1, 2])
        .text_column("name", &["one", "two"])
        .write_temp()
        .unwrap();
    let mut cursor = ScanCursor::open(fixture.path()).unwrap();
    let mut row = vec![ScalarValue::Int32(99)];

    assert!(cursor.next_into(&mut row).unwrap());
    assert_eq!(row, vec![ScalarValue::Int32(1), ScalarValue::from("one")]);
    assert!(cursor.next_into(&mut row).unwrap());
    assert_eq!(row, vec![ScalarValue::Int32(2), ScalarValue::from("two")]);
    assert!(!cursor.next_into(&mut row).unwrap());
    assert!(row.is_empty());
}

#[test]
fn test_same_path_opened_twice() {
    let fixture = FixtureBuilder::new(2).int_column("id", &[1, 2, 3, 4]).write_temp().unwrap();
    let mut a = ScanCursor::open(fixture.path()).unwrap();
    let mut b = ScanCursor::open(fixture.path()).unwrap();

    assert_eq!(a.next_row().unwrap(), Some(vec![1.into()]));
    assert_eq!(a.next_row().unwrap(), Some(vec![2.into()]));
    a.close();
    assert_eq!(collect(&mut b).len(), 4);
}

#[test]
fn test_concurrent_cursors_share_catalog() {
    let ids: Vec<i32> = (0..500).collect();
    let fixture = FixtureBuilder::new(50).int_column("id", &ids).write_temp().unwrap();
    let table = Arc::new(BlockFile::open(fixture.path()).unwrap());

    let counts: Vec<usize> = thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let table = Arc::clone(&table);
                scope.spawn(move || {
                    let mut cursor = table.cursor().unwrap();
                    cursor.register("id", CmpOp::Lt, (t + 1) * 100).unwrap();
                    collect(&mut cursor).len()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(counts, vec![100, 200, 300, 400]);
}
