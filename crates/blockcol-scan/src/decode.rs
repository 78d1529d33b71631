//! Element decoding.

use std::io::{Read, Seek};

use blockcol_common::error::BlockResult;
use blockcol_common::memory::ScanArena;
use blockcol_common::types::{LogicalType, ScalarValue};
use blockcol_format::catalog::ColumnMeta;
use blockcol_format::stream::BinaryStream;

/// Decodes one fixed-width element.
///
/// `bytes` must hold at least `ty.width()` bytes; any excess is ignored.
pub fn decode_element(ty: LogicalType, bytes: &[u8]) -> ScalarValue {
    match ty {
        LogicalType::Int32 => ScalarValue::Int32(i32::from_le_bytes(word(bytes))),
        LogicalType::Float32 => ScalarValue::Float32(f32::from_le_bytes(word(bytes))),
        LogicalType::FixedText32 => ScalarValue::Text(decode_fixed_text(bytes)),
    }
}

/// Decodes NUL-padded text: everything up to the first NUL (or the whole
/// field if there is none). Invalid UTF-8 is replaced.
pub fn decode_fixed_text(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}

fn word(bytes: &[u8]) -> [u8; 4] {
    let mut out = [0u8; 4];
    out.copy_from_slice(&bytes[..4]);
    out
}

/// Reads and decodes row `row` of `column`.
///
/// The raw element is staged in `arena`; the returned value owns its data.
///
/// # Errors
///
/// Returns `BlockError::UnexpectedEof` if the element lies past the end of
/// the stream, or an I/O error.
pub fn read_element<R: Read + Seek>(
    stream: &mut BinaryStream<R>,
    column: &ColumnMeta,
    row: u64,
    arena: &mut ScanArena,
) -> BlockResult<ScalarValue> {
    let ty = column.logical_type();
    let buf = arena.alloc(ty.width());
    stream.seek_to(column.row_offset(row))?.read_into(buf)?;
    Ok(decode_element(ty, buf))
}
