//! Footer text parsing.
//!
//! The footer is a small JSON-like document: objects, strings with
//! backslash escapes, and numbers. Arrays, booleans and `null` literals are
//! not part of the grammar. The parser produces a `Value` tree which the
//! catalog builder consumes and then drops.

mod parser;
mod value;

pub use parser::{parse, parse_document};
pub use value::{Dict, Value};
