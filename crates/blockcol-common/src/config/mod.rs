//! Configuration for blockcol readers.

mod reader;

pub use reader::ReaderConfig;
