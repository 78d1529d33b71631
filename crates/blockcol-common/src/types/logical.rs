//! Logical column types.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{FIXED_TEXT_WIDTH, FLOAT32_WIDTH, INT32_WIDTH};

/// The declared type of a column.
///
/// Every type has a fixed element width, so the byte position of row `r`
/// in a column is `file_offset + r * width`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogicalType {
    /// 32-bit signed integer, little-endian.
    Int32,
    /// 32-bit IEEE-754 float, little-endian.
    Float32,
    /// 32 bytes of text, NUL-padded.
    FixedText32,
}

impl LogicalType {
    /// Returns the fixed element width in bytes.
    #[inline]
    #[must_use]
    pub const fn width(self) -> usize {
        match self {
            Self::Int32 => INT32_WIDTH,
            Self::Float32 => FLOAT32_WIDTH,
            Self::FixedText32 => FIXED_TEXT_WIDTH,
        }
    }

    /// Returns the element width as a `u64` stride.
    #[inline]
    #[must_use]
    pub const fn stride(self) -> u64 {
        self.width() as u64
    }

    /// Maps a footer type name (`"int"`, `"float"`, `"str"`) to a type.
    #[must_use]
    pub fn from_footer_name(name: &str) -> Option<Self> {
        match name {
            "int" => Some(Self::Int32),
            "float" => Some(Self::Float32),
            "str" => Some(Self::FixedText32),
            _ => None,
        }
    }

    /// Returns the name used for this type in footer text.
    #[must_use]
    pub const fn footer_name(self) -> &'static str {
        match self {
            Self::Int32 => "int",
            Self::Float32 => "float",
            Self::FixedText32 => "str",
        }
    }

    /// Returns true for the numeric types.
    #[inline]
    #[must_use]
    pub const fn is_numeric(self) -> bool {
        matches!(self, Self::Int32 | Self::Float32)
    }
}

impl fmt::Display for LogicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int32 => write!(f, "int32"),
            Self::Float32 => write!(f, "float32"),
            Self::FixedText32 => write!(f, "text(32)"),
        }
    }
}
