//! Decoded column values.
//!
//! A `ScalarValue` is what a scan produces for one column of one row, and
//! also what a predicate compares against. Values only compare with values
//! of the same logical type.

use std::cmp::Ordering;
use std::fmt;

use super::LogicalType;

/// A single value of one of the column types.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    /// 32-bit signed integer.
    Int32(i32),
    /// 32-bit float.
    Float32(f32),
    /// Text, already truncated at the first NUL.
    Text(String),
}

impl ScalarValue {
    /// Returns the logical type of this value.
    #[must_use]
    pub const fn logical_type(&self) -> LogicalType {
        match self {
            Self::Int32(_) => LogicalType::Int32,
            Self::Float32(_) => LogicalType::Float32,
            Self::Text(_) => LogicalType::FixedText32,
        }
    }

    /// Returns a short name of the value's type, for error messages.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Int32(_) => "int",
            Self::Float32(_) => "float",
            Self::Text(_) => "str",
        }
    }

    /// Returns the integer payload, if this is an `Int32`.
    #[must_use]
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Self::Int32(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the float payload, if this is a `Float32`.
    #[must_use]
    pub fn as_f32(&self) -> Option<f32> {
        match self {
            Self::Float32(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the text payload, if this is `Text`.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Compares two values of the same type.
    ///
    /// Returns `None` when the types differ or when either float is NaN.
    /// Text compares byte-wise.
    #[must_use]
    pub fn compare(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Int32(a), Self::Int32(b)) => Some(a.cmp(b)),
            (Self::Float32(a), Self::Float32(b)) => a.partial_cmp(b),
            (Self::Text(a), Self::Text(b)) => Some(a.as_bytes().cmp(b.as_bytes())),
            _ => None,
        }
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int32(v) => write!(f, "{v}"),
            Self::Float32(v) => write!(f, "{v}"),
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<i32> for ScalarValue {
    fn from(v: i32) -> Self {
        Self::Int32(v)
    }
}

impl From<f32> for ScalarValue {
    fn from(v: f32) -> Self {
        Self::Float32(v)
    }
}

impl From<&str> for ScalarValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for ScalarValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logical_type() {
        assert_eq!(ScalarValue::from(1).logical_type(), LogicalType::Int32);
        assert_eq!(ScalarValue::from(1.5f32).logical_type(), LogicalType::Float32);
        assert_eq!(ScalarValue::from("a").logical_type(), LogicalType::FixedText32);
    }

    #[test]
    fn test_compare_same_type() {
        assert_eq!(ScalarValue::Int32(1).compare(&ScalarValue::Int32(2)), Some(Ordering::Less));
        assert_eq!(
            ScalarValue::Float32(2.5).compare(&ScalarValue::Float32(2.5)),
            Some(Ordering::Equal)
        );
        assert_eq!(
            ScalarValue::from("b").compare(&ScalarValue::from("abc")),
            Some(Ordering::Greater)
        );
    }

    #[test]
    fn test_compare_mismatch_and_nan() {
        assert_eq!(ScalarValue::Int32(1).compare(&ScalarValue::Float32(1.0)), None);
        assert_eq!(
            ScalarValue::Float32(f32::NAN).compare(&ScalarValue::Float32(1.0)),
            None
        );
    }

    #[test]
    fn test_accessors() {
        assert_eq!(ScalarValue::Int32(7).as_i32(), Some(7));
        assert_eq!(ScalarValue::Int32(7).as_f32(), None);
        assert_eq!(ScalarValue::from("x").as_str(), Some("x"));
        assert_eq!(ScalarValue::from("x").to_string(), "x");
    }
}
