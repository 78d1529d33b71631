//! Locating and loading the footer of a file.

use std::io::{Read, Seek};

use blockcol_common::config::ReaderConfig;
use blockcol_common::constants::FOOTER_LEN_SIZE;
use blockcol_common::error::{BlockError, BlockResult};
use bytes::Bytes;
use tracing::debug;

use crate::catalog::FileFooter;
use crate::stream::{BinaryStream, Origin};

/// Where the footer text sits in a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FooterLocation {
    /// Absolute offset of the first footer byte; also the data region length.
    pub footer_offset: u64,
    /// Footer length in bytes.
    pub footer_len: u32,
}

impl FooterLocation {
    /// Returns the length of the whole file.
    pub fn file_len(&self) -> u64 {
        self.footer_offset + u64::from(self.footer_len) + FOOTER_LEN_SIZE
    }
}

/// Reads the trailing length field and the footer bytes it describes.
///
/// # Errors
///
/// Returns `BlockError::ShortFile` if the file cannot hold the length field
/// or the declared footer, and `BlockError::Format` if the declared length
/// exceeds `max_footer_len`.
pub fn read_footer<R: Read + Seek>(
    stream: &mut BinaryStream<R>,
    max_footer_len: u32,
) -> BlockResult<(FooterLocation, Bytes)> {
    let length = stream.length();
    if length < FOOTER_LEN_SIZE {
        return Err(BlockError::ShortFile {
            required: FOOTER_LEN_SIZE,
            actual: length,
        });
    }

    let footer_len = stream.seek(-(FOOTER_LEN_SIZE as i64), Origin::End)?.read_u32()?;
    let required = FOOTER_LEN_SIZE + u64::from(footer_len);
    if required > length {
        return Err(BlockError::ShortFile {
            required,
            actual: length,
        });
    }
    if footer_len > max_footer_len {
        return Err(BlockError::format(format!(
            "footer length {footer_len} exceeds limit of {max_footer_len} bytes"
        )));
    }

    let footer_offset = length - required;
    let text = stream.seek_to(footer_offset)?.read_exact(footer_len as usize)?;

    Ok((
        FooterLocation {
            footer_offset,
            footer_len,
        },
        text,
    ))
}

/// Reads, parses and validates the footer of `stream`.
///
/// # Errors
///
/// Returns I/O errors from locating the footer, `BlockError::Parse` for
/// malformed footer text, and `BlockError::Format` for schema violations,
/// including columns whose data would overlap the footer.
pub fn load_footer<R: Read + Seek>(
    stream: &mut BinaryStream<R>,
    config: &ReaderConfig,
) -> BlockResult<(FooterLocation, FileFooter)> {
    let (location, text) = read_footer(stream, config.max_footer_len)?;
    let footer = FileFooter::from_bytes(&text)?;
    footer.validate_layout(location.footer_offset)?;

    debug!(
        path = ?stream.path(),
        file_len = stream.length(),
        footer_len = location.footer_len,
        columns = footer.column_count(),
        rows = footer.row_count(),
        "loaded footer"
    );
    Ok((location, footer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn file_with_footer(data: &[u8], footer: &str) -> BinaryStream<Cursor<Vec<u8>>> {
        let mut bytes = data.to_vec();
        bytes.extend_from_slice(footer.as_bytes());
        bytes.extend_from_slice(&(footer.len() as u32).to_le_bytes());
        BinaryStream::from_reader(Cursor::new(bytes)).unwrap()
    }

    #[test]
    fn test_read_footer() {
        let mut stream = file_with_footer(&[0u8; 8], "{}");
        let (location, text) = read_footer(&mut stream, 1024).unwrap();
        assert_eq!(location.footer_offset, 8);
        assert_eq!(location.footer_len, 2);
        assert_eq!(&text[..], b"{}");
    }

    #[test]
    fn test_file_too_short_for_length() {
        let mut stream = BinaryStream::from_reader(Cursor::new(vec![1u8, 2])).unwrap();
        let err = read_footer(&mut stream, 1024).unwrap_err();
        assert!(matches!(err, BlockError::ShortFile { required: 4, actual: 2 }));
    }

    #[test]
    fn test_declared_footer_too_long() {
        let mut bytes = vec![0u8; 46];
        bytes.extend_from_slice(&1000u32.to_le_bytes());
        let mut stream = BinaryStream::from_reader(Cursor::new(bytes)).unwrap();

        let err = read_footer(&mut stream, u32::MAX).unwrap_err();
        assert!(err.is_io());
        assert!(matches!(
            err,
            BlockError::ShortFile {
                required: 1004,
                actual: 50
            }
        ));
    }

    #[test]
    fn test_footer_limit() {
        let mut stream = file_with_footer(&[], "{}   ");
        let err = read_footer(&mut stream, 4).unwrap_err();
        assert!(err.is_format());
    }

    #[test]
    fn test_load_footer_validates_layout() {
        let footer = r#"{"Max Values Per Block":2,"Columns":{"id":{"type":"int","start_offset":0,"num_blocks":1,"block_stats":{"0":{"num":2,"min":1,"max":2}}}}}"#;

        let mut stream = file_with_footer(&[0u8; 8], footer);
        let (location, catalog) = load_footer(&mut stream, &ReaderConfig::default()).unwrap();
        assert_eq!(location.footer_offset, 8);
        assert_eq!(catalog.row_count(), 2);

        // Only 4 data bytes for 2 int rows: data would overlap the footer.
        let mut stream = file_with_footer(&[0u8; 4], footer);
        let err = load_footer(&mut stream, &ReaderConfig::default()).unwrap_err();
        assert!(err.is_format());
    }

    #[test]
    fn test_load_footer_parse_error() {
        let mut stream = file_with_footer(&[], r#"{"Max Values Per Block": "#);
        let err = load_footer(&mut stream, &ReaderConfig::default()).unwrap_err();
        assert!(err.is_parse());
    }
}
