//! Core column types and decoded values.

mod logical;
mod scalar;

pub use logical::LogicalType;
pub use scalar::ScalarValue;

/// A decoded row: one value per returned column, in column order.
pub type Row = Vec<ScalarValue>;
