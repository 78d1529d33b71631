//! Arena allocator for per-cursor decode buffers.
//!
//! The arena hands out byte buffers by bumping an offset inside large
//! segments. Requests larger than a segment get a dedicated buffer of their
//! own. Nothing is freed individually: `reset` makes every segment
//! reusable, `release` returns all memory.
//!
//! The arena is owned by exactly one cursor and passed by reference into
//! decode calls. There is no global or thread-local arena.
//!
//! # Performance
//!
//! - Allocation: O(1), just bump an offset
//! - Reset: O(1) for segments, O(n) for dedicated oversized buffers
//! - Segments are kept across resets, so a steady-state scan allocates nothing

use std::fmt;

use crate::constants::{ARENA_ALIGNMENT, DEFAULT_ARENA_SEGMENT_SIZE, MIN_ARENA_SEGMENT_SIZE};

#[inline]
const fn align_up(offset: usize) -> usize {
    (offset + ARENA_ALIGNMENT - 1) & !(ARENA_ALIGNMENT - 1)
}

/// A segmented bump allocator for scratch bytes.
///
/// # Example
///
/// ```rust
/// use blockcol_common::memory::ScanArena;
///
/// let mut arena = ScanArena::with_segment_size(4096);
///
/// let buf = arena.alloc(32);
/// assert_eq!(buf.len(), 32);
/// buf.copy_from_slice(&[7u8; 32]);
///
/// arena.reset();
/// assert_eq!(arena.bytes_used(), 0);
/// ```
pub struct ScanArena {
    /// Fixed-size segments, reused after reset.
    segments: Vec<Box<[u8]>>,
    /// Index of the segment currently bumped.
    current: usize,
    /// Next free offset within the current segment.
    offset: usize,
    /// Dedicated buffers for requests larger than a segment.
    oversized: Vec<Box<[u8]>>,
    /// Size of each segment.
    segment_size: usize,
    /// Bytes handed out since the last reset.
    used: usize,
    /// Number of resets performed.
    resets: u64,
}

impl ScanArena {
    /// Creates a new arena with the default segment size (1 MB).
    #[must_use]
    pub fn new() -> Self {
        Self::with_segment_size(DEFAULT_ARENA_SEGMENT_SIZE)
    }

    /// Creates a new arena with the specified segment size.
    ///
    /// The segment size will be clamped to at least `MIN_ARENA_SEGMENT_SIZE` (4 KB).
    /// No memory is allocated until the first request.
    #[must_use]
    pub fn with_segment_size(segment_size: usize) -> Self {
        Self {
            segments: Vec::new(),
            current: 0,
            offset: 0,
            oversized: Vec::new(),
            segment_size: segment_size.max(MIN_ARENA_SEGMENT_SIZE),
            used: 0,
            resets: 0,
        }
    }

    /// Allocates `len` bytes.
    ///
    /// The contents of the returned buffer are unspecified; callers
    /// overwrite it before reading.
    pub fn alloc(&mut self, len: usize) -> &mut [u8] {
        if len == 0 {
            return &mut [];
        }
        self.used += len;

        if len > self.segment_size {
            self.oversized.push(vec![0u8; len].into_boxed_slice());
            let last = self.oversized.len() - 1;
            return &mut self.oversized[last];
        }

        let mut start = align_up(self.offset);
        if self.segments.is_empty() || start + len > self.segment_size {
            self.advance_segment();
            start = 0;
        }
        self.offset = start + len;

        &mut self.segments[self.current][start..start + len]
    }

    /// Allocates a buffer holding a copy of `src`.
    pub fn alloc_copy(&mut self, src: &[u8]) -> &[u8] {
        let buf = self.alloc(src.len());
        buf.copy_from_slice(src);
        buf
    }

    /// Moves to the next segment, reusing one retained by a reset if possible.
    fn advance_segment(&mut self) {
        if self.segments.is_empty() {
            self.segments
                .push(vec![0u8; self.segment_size].into_boxed_slice());
            self.current = 0;
        } else if self.current + 1 < self.segments.len() {
            self.current += 1;
        } else {
            self.segments
                .push(vec![0u8; self.segment_size].into_boxed_slice());
            self.current = self.segments.len() - 1;
        }
        self.offset = 0;
    }

    /// Resets the arena, allowing all segment memory to be reused.
    ///
    /// Segments are retained; oversized buffers are freed.
    pub fn reset(&mut self) {
        self.current = 0;
        self.offset = 0;
        self.used = 0;
        self.oversized.clear();
        self.resets += 1;
    }

    /// Frees all memory held by the arena.
    pub fn release(&mut self) {
        self.reset();
        self.segments = Vec::new();
        self.oversized = Vec::new();
    }

    /// Returns the bytes handed out since the last reset.
    #[inline]
    #[must_use]
    pub fn bytes_used(&self) -> usize {
        self.used
    }

    /// Returns the total bytes currently held, including unused capacity.
    #[must_use]
    pub fn total_allocated(&self) -> usize {
        self.segments.len() * self.segment_size
            + self.oversized.iter().map(|b| b.len()).sum::<usize>()
    }

    /// Returns the number of segments held.
    #[inline]
    #[must_use]
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Returns the segment size.
    #[inline]
    #[must_use]
    pub fn segment_size(&self) -> usize {
        self.segment_size
    }

    /// Returns the number of resets performed.
    #[inline]
    #[must_use]
    pub fn reset_count(&self) -> u64 {
        self.resets
    }
}

impl Default for ScanArena {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ScanArena {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScanArena")
            .field("segment_size", &self.segment_size)
            .field("segment_count", &self.segments.len())
            .field("oversized", &self.oversized.len())
            .field("bytes_used", &self.used)
            .finish()
    }
}
