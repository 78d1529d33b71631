//! File layout constants and system-wide limits.

// =============================================================================
// File Layout
// =============================================================================

/// Size of the trailing footer length field in bytes.
///
/// The last four bytes of every file hold the footer length `L` as a
/// little-endian `u32`. The footer text itself occupies the `L` bytes
/// immediately before them.
pub const FOOTER_LEN_SIZE: u64 = 4;

/// Width of an `Int32` element in bytes.
pub const INT32_WIDTH: usize = 4;

/// Width of a `Float32` element in bytes.
pub const FLOAT32_WIDTH: usize = 4;

/// Width of a `FixedText32` element in bytes.
pub const FIXED_TEXT_WIDTH: usize = 32;

// =============================================================================
// Limits
// =============================================================================

/// Default upper bound on the footer length a reader will accept (64 MB).
pub const DEFAULT_MAX_FOOTER_LEN: u32 = 64 * 1024 * 1024;

/// Maximum nesting depth of objects in footer text.
pub const MAX_NESTING_DEPTH: usize = 64;

// =============================================================================
// Memory
// =============================================================================

/// Default arena segment size (1 MB).
pub const DEFAULT_ARENA_SEGMENT_SIZE: usize = 1024 * 1024;

/// Minimum arena segment size (4 KB).
pub const MIN_ARENA_SEGMENT_SIZE: usize = 4 * 1024;

/// Alignment of allocations carved out of an arena segment.
pub const ARENA_ALIGNMENT: usize = 8;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_widths() {
        assert_eq!(INT32_WIDTH, std::mem::size_of::<i32>());
        assert_eq!(FLOAT32_WIDTH, std::mem::size_of::<f32>());
        assert_eq!(FOOTER_LEN_SIZE as usize, std::mem::size_of::<u32>());
    }

    #[test]
    fn test_arena_limits() {
        assert!(ARENA_ALIGNMENT.is_power_of_two());
        assert!(MIN_ARENA_SEGMENT_SIZE <= DEFAULT_ARENA_SEGMENT_SIZE);
        assert_eq!(MIN_ARENA_SEGMENT_SIZE % ARENA_ALIGNMENT, 0);
    }
}
