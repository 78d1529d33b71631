//! Memory management utilities for blockcol.
//!
//! - **Scan arena**: segmented bump allocation for per-cursor decode buffers,
//!   owned by the cursor and reset on rescan/close.

mod arena;

pub use arena::ScanArena;
