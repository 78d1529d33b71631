//! Typed schema and block statistics.
//!
//! The catalog is built once from the parsed footer and is immutable
//! afterwards; cursors share it read-only through an `Arc<FileFooter>`.

mod builder;
mod column;
mod footer;

pub use builder::{
    KEY_BLOCK_STATS, KEY_COLUMNS, KEY_MAX_LEN, KEY_MAX_VALUES_PER_BLOCK, KEY_MAX, KEY_MIN, KEY_MIN_LEN,
    KEY_NUM, KEY_NUM_BLOCKS, KEY_START_OFFSET, KEY_TABLE, KEY_TYPE,
};
pub use column::{BlockStat, ColumnMeta};
pub use footer::FileFooter;
