//! Seekable binary streams.
//!
//! `BinaryStream` wraps any `Read + Seek` source (a `File` by default) and
//! tracks its own position and total length. All multi-byte reads are
//! little-endian unless the method name says otherwise. Reads never return
//! fewer bytes than requested: a read running past end of file fails with
//! `BlockError::UnexpectedEof`.

mod counting;

pub use counting::{CountingReader, IoStats};

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use blockcol_common::error::{BlockError, BlockResult};
use bytes::{Bytes, BytesMut};

/// Reference point for a relative seek.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Offset from the first byte.
    Start,
    /// Offset from one past the last byte.
    End,
    /// Offset from the current position.
    Current,
}

/// A seekable, position-addressable byte source.
///
/// # Example
///
/// ```rust
/// use std::io::Cursor;
/// use blockcol_format::stream::{BinaryStream, Origin};
///
/// let data = vec![1u8, 0, 0, 0, b'h', b'i'];
/// let mut stream = BinaryStream::from_reader(Cursor::new(data)).unwrap();
///
/// assert_eq!(stream.length(), 6);
/// assert_eq!(stream.read_u32().unwrap(), 1);
/// assert_eq!(stream.read_ascii(2).unwrap(), "hi");
///
/// stream.seek(-2, Origin::End).unwrap();
/// assert_eq!(stream.tell(), 4);
/// ```
pub struct BinaryStream<R = File> {
    /// The underlying source.
    inner: R,
    /// Logical read position.
    position: u64,
    /// Whether `inner`'s own position is known to equal `position`.
    synced: bool,
    /// Total byte length, measured once at open.
    length: u64,
    /// Path the stream was opened from, if any.
    path: Option<PathBuf>,
}

impl BinaryStream<File> {
    /// Opens the file at `path` for reading.
    ///
    /// # Errors
    ///
    /// Returns `BlockError::NotFound` if the file does not exist and
    /// `BlockError::Io` for any other open or seek failure.
    pub fn open(path: impl AsRef<Path>) -> BlockResult<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| BlockError::from_io_with_path(e, path))?;
        let mut stream = Self::from_reader(file)?;
        stream.path = Some(path.to_path_buf());
        Ok(stream)
    }
}

impl<R: Read + Seek> BinaryStream<R> {
    /// Wraps a reader, measuring its length and rewinding to byte 0.
    ///
    /// # Errors
    ///
    /// Returns `BlockError::Io` if the source cannot be seeked.
    pub fn from_reader(mut inner: R) -> BlockResult<Self> {
        let length = inner.seek(SeekFrom::End(0))?;
        inner.seek(SeekFrom::Start(0))?;
        Ok(Self {
            inner,
            position: 0,
            synced: true,
            length,
            path: None,
        })
    }

    /// Moves the read position by `offset` relative to `origin`.
    ///
    /// Positions past the end are allowed; reads from them fail.
    ///
    /// # Errors
    ///
    /// Returns `BlockError::InvalidSeek` if the target is before byte 0.
    pub fn seek(&mut self, offset: i64, origin: Origin) -> BlockResult<&mut Self> {
        let base = match origin {
            Origin::Start => 0,
            Origin::End => self.length,
            Origin::Current => self.position,
        };
        let target = i128::from(base) + i128::from(offset);
        let target = u64::try_from(target).map_err(|_| BlockError::InvalidSeek { target })?;
        self.seek_to(target)
    }

    /// Moves the read position to the absolute offset `position`.
    ///
    /// # Errors
    ///
    /// Returns `BlockError::Io` if the underlying seek fails.
    pub fn seek_to(&mut self, position: u64) -> BlockResult<&mut Self> {
        if !self.synced || position != self.position {
            self.inner.seek(SeekFrom::Start(position))?;
            self.position = position;
            self.synced = true;
        }
        Ok(self)
    }

    /// Returns the current read position.
    #[inline]
    pub fn tell(&self) -> u64 {
        self.position
    }

    /// Returns the total length of the source in bytes.
    #[inline]
    pub fn length(&self) -> u64 {
        self.length
    }

    /// Returns the bytes left between the position and end of file.
    #[inline]
    pub fn remaining(&self) -> u64 {
        self.length.saturating_sub(self.position)
    }

    /// Returns true if the position is at or past end of file.
    #[inline]
    pub fn is_eof(&self) -> bool {
        self.position >= self.length
    }

    /// Returns the path this stream was opened from.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Returns a reference to the underlying reader.
    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Consumes the stream, returning the underlying reader.
    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Reads exactly `buf.len()` bytes into `buf`.
    ///
    /// # Errors
    ///
    /// Returns `BlockError::UnexpectedEof` if fewer bytes remain.
    pub fn read_into(&mut self, buf: &mut [u8]) -> BlockResult<()> {
        let available = self.remaining();
        if buf.len() as u64 > available {
            return Err(BlockError::UnexpectedEof {
                offset: self.position,
                expected: buf.len(),
                available,
            });
        }
        if !self.synced {
            self.inner.seek(SeekFrom::Start(self.position))?;
            self.synced = true;
        }

        match self.inner.read_exact(buf) {
            Ok(()) => {
                self.position += buf.len() as u64;
                Ok(())
            }
            Err(e) => {
                self.synced = false;
                if e.kind() == io::ErrorKind::UnexpectedEof {
                    Err(BlockError::UnexpectedEof {
                        offset: self.position,
                        expected: buf.len(),
                        available,
                    })
                } else {
                    Err(e.into())
                }
            }
        }
    }

    /// Reads exactly `n` bytes.
    ///
    /// # Errors
    ///
    /// Returns `BlockError::UnexpectedEof` if fewer than `n` bytes remain.
    pub fn read_exact(&mut self, n: usize) -> BlockResult<Bytes> {
        let mut buf = BytesMut::zeroed(n);
        self.read_into(&mut buf)?;
        Ok(buf.freeze())
    }

    /// Reads one byte.
    ///
    /// # Errors
    ///
    /// Returns `BlockError::UnexpectedEof` at end of file.
    pub fn read_u8(&mut self) -> BlockResult<u8> {
        let mut buf = [0u8; 1];
        self.read_into(&mut buf)?;
        Ok(buf[0])
    }

    /// Reads a little-endian `u32`.
    ///
    /// # Errors
    ///
    /// Returns `BlockError::UnexpectedEof` if fewer than 4 bytes remain.
    pub fn read_u32(&mut self) -> BlockResult<u32> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    /// Reads a big-endian `u32`.
    ///
    /// # Errors
    ///
    /// Returns `BlockError::UnexpectedEof` if fewer than 4 bytes remain.
    pub fn read_u32_be(&mut self) -> BlockResult<u32> {
        Ok(u32::from_be_bytes(self.read_array()?))
    }

    /// Reads a little-endian `i32`.
    ///
    /// # Errors
    ///
    /// Returns `BlockError::UnexpectedEof` if fewer than 4 bytes remain.
    pub fn read_i32(&mut self) -> BlockResult<i32> {
        Ok(i32::from_le_bytes(self.read_array()?))
    }

    /// Reads a little-endian IEEE-754 `f32`.
    ///
    /// # Errors
    ///
    /// Returns `BlockError::UnexpectedEof` if fewer than 4 bytes remain.
    pub fn read_f32(&mut self) -> BlockResult<f32> {
        Ok(f32::from_le_bytes(self.read_array()?))
    }

    /// Reads `n` raw bytes as text.
    ///
    /// No truncation happens here: NUL bytes are kept. Invalid UTF-8 is
    /// replaced lossily.
    ///
    /// # Errors
    ///
    /// Returns `BlockError::UnexpectedEof` if fewer than `n` bytes remain.
    pub fn read_ascii(&mut self, n: usize) -> BlockResult<String> {
        let bytes = self.read_exact(n)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn read_array<const N: usize>(&mut self) -> BlockResult<[u8; N]> {
        let mut buf = [0u8; N];
        self.read_into(&mut buf)?;
        Ok(buf)
    }
}

impl<R> std::fmt::Debug for BinaryStream<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BinaryStream")
            .field("path", &self.path)
            .field("position", &self.position)
            .field("length", &self.length)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use tempfile::NamedTempFile;

    fn stream(data: &[u8]) -> BinaryStream<Cursor<Vec<u8>>> {
        BinaryStream::from_reader(Cursor::new(data.to_vec())).unwrap()
    }

    #[test]
    fn test_length_and_rewind() {
        let s = stream(&[0u8; 10]);
        assert_eq!(s.length(), 10);
        assert_eq!(s.tell(), 0);
        assert_eq!(s.remaining(), 10);
        assert!(!s.is_eof());
    }

    #[test]
    fn test_primitive_reads() {
        let mut data = Vec::new();
        data.extend_from_slice(&7u32.to_le_bytes());
        data.extend_from_slice(&(-3i32).to_le_bytes());
        data.extend_from_slice(&1.5f32.to_le_bytes());
        data.extend_from_slice(&0x0102_0304u32.to_be_bytes());
        data.push(0xAB);

        let mut s = stream(&data);
        assert_eq!(s.read_u32().unwrap(), 7);
        assert_eq!(s.read_i32().unwrap(), -3);
        assert_eq!(s.read_f32().unwrap(), 1.5);
        assert_eq!(s.read_u32_be().unwrap(), 0x0102_0304);
        assert_eq!(s.read_u8().unwrap(), 0xAB);
        assert!(s.is_eof());
    }

    #[test]
    fn test_seek_origins() {
        let mut s = stream(b"0123456789");
        s.seek(3, Origin::Start).unwrap();
        assert_eq!(s.tell(), 3);
        s.seek(2, Origin::Current).unwrap();
        assert_eq!(s.read_ascii(1).unwrap(), "5");
        s.seek(-4, Origin::End).unwrap();
        assert_eq!(s.read_ascii(4).unwrap(), "6789");
    }

    #[test]
    fn test_seek_before_start() {
        let mut s = stream(b"abc");
        let err = s.seek(-4, Origin::End).unwrap_err();
        assert!(matches!(err, BlockError::InvalidSeek { target: -1 }));
        assert_eq!(s.tell(), 0);
    }

    #[test]
    fn test_short_read() {
        let mut s = stream(b"abc");
        s.seek(1, Origin::Start).unwrap();
        let err = s.read_exact(5).unwrap_err();
        assert!(matches!(
            err,
            BlockError::UnexpectedEof {
                offset: 1,
                expected: 5,
                available: 2
            }
        ));
        assert!(err.is_io());
        // Position is unchanged by a rejected read.
        assert_eq!(s.read_ascii(2).unwrap(), "bc");
    }

    #[test]
    fn test_read_ascii_keeps_nul() {
        let mut s = stream(b"ab\0\0");
        assert_eq!(s.read_ascii(4).unwrap(), "ab\0\0");
    }

    #[test]
    fn test_open_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&42u32.to_le_bytes()).unwrap();
        file.flush().unwrap();

        let mut s = BinaryStream::open(file.path()).unwrap();
        assert_eq!(s.length(), 4);
        assert_eq!(s.path(), Some(file.path()));
        assert_eq!(s.read_u32().unwrap(), 42);
    }

    #[test]
    fn test_open_missing() {
        let err = BinaryStream::open("/definitely/not/here.db721").unwrap_err();
        assert!(matches!(err, BlockError::NotFound { .. }));
    }
}
