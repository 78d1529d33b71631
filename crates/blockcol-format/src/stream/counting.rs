//! I/O accounting for byte sources.
//!
//! `CountingReader` forwards to an inner reader and records every read
//! (offset and length) and every seek into a shared `IoStats`. Tests use it
//! to prove which byte ranges a scan touched.

use std::io::{self, Read, Seek, SeekFrom};
use std::ops::Range;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

/// Shared counters for a `CountingReader`.
#[derive(Debug, Default)]
pub struct IoStats {
    /// Number of read calls that returned data.
    reads: AtomicU64,
    /// Total bytes returned by reads.
    bytes_read: AtomicU64,
    /// Number of seek calls.
    seeks: AtomicU64,
    /// Byte ranges returned by reads, in call order.
    ranges: Mutex<Vec<Range<u64>>>,
}

impl IoStats {
    /// Creates new statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a read of `len` bytes starting at `offset`.
    pub fn record_read(&self, offset: u64, len: usize) {
        self.reads.fetch_add(1, Ordering::Relaxed);
        self.bytes_read.fetch_add(len as u64, Ordering::Relaxed);
        self.ranges.lock().push(offset..offset + len as u64);
    }

    /// Records a seek.
    #[inline]
    pub fn record_seek(&self) {
        self.seeks.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns the number of reads.
    pub fn reads(&self) -> u64 {
        self.reads.load(Ordering::Relaxed)
    }

    /// Returns the total bytes read.
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read.load(Ordering::Relaxed)
    }

    /// Returns the number of seeks.
    pub fn seeks(&self) -> u64 {
        self.seeks.load(Ordering::Relaxed)
    }

    /// Returns a copy of all recorded read ranges.
    pub fn read_ranges(&self) -> Vec<Range<u64>> {
        self.ranges.lock().clone()
    }

    /// Returns true if any recorded read overlaps `range`.
    pub fn touched(&self, range: Range<u64>) -> bool {
        self.ranges
            .lock()
            .iter()
            .any(|r| r.start < range.end && range.start < r.end)
    }

    /// Resets all counters.
    pub fn reset(&self) {
        self.reads.store(0, Ordering::Relaxed);
        self.bytes_read.store(0, Ordering::Relaxed);
        self.seeks.store(0, Ordering::Relaxed);
        self.ranges.lock().clear();
    }
}

/// A `Read + Seek` wrapper that records I/O into `IoStats`.
#[derive(Debug)]
pub struct CountingReader<R> {
    inner: R,
    position: u64,
    stats: Arc<IoStats>,
}

impl<R> CountingReader<R> {
    /// Wraps `inner` with fresh statistics.
    pub fn new(inner: R) -> Self {
        Self::with_stats(inner, Arc::new(IoStats::new()))
    }

    /// Wraps `inner`, recording into existing statistics.
    pub fn with_stats(inner: R, stats: Arc<IoStats>) -> Self {
        Self {
            inner,
            position: 0,
            stats,
        }
    }

    /// Returns a handle to the statistics.
    pub fn stats(&self) -> Arc<IoStats> {
        Arc::clone(&self.stats)
    }

    /// Consumes the wrapper, returning the inner reader.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> Read for CountingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        if n > 0 {
            self.stats.record_read(self.position, n);
            self.position += n as u64;
        }
        Ok(n)
    }
}

impl<R: Seek> Seek for CountingReader<R> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let position = self.inner.seek(pos)?;
        self.stats.record_seek();
        self.position = position;
        Ok(position)
    }
}
