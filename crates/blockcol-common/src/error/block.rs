//! Reader error types.
//!
//! Every error belongs to exactly one `ErrorKind`. None of them are
//! retryable: a short or corrupt file does not get better on a second read.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::types::LogicalType;

/// Broad error classes surfaced to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// File missing, unreadable, or shorter than its layout requires.
    Io,
    /// Footer text is malformed.
    Parse,
    /// Footer text is well formed but violates the file schema.
    Format,
    /// A predicate constant does not match its column's type.
    Type,
    /// Operation invoked in the wrong cursor state.
    State,
    /// Caller supplied an unknown column or an otherwise unusable argument.
    InvalidArgument,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Io => "IOError",
            Self::Parse => "ParseError",
            Self::Format => "FormatError",
            Self::Type => "TypeError",
            Self::State => "StateError",
            Self::InvalidArgument => "InvalidArgument",
        };
        f.write_str(name)
    }
}

/// Error codes for categorizing errors.
///
/// These codes can be used for programmatic error handling and
/// are stable across versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ErrorCode {
    // I/O errors (0x0100 - 0x01FF)
    /// General I/O error.
    Io = 0x0100,
    /// File not found.
    FileNotFound = 0x0101,
    /// File shorter than its declared layout.
    ShortFile = 0x0102,
    /// Read ran past end of file.
    UnexpectedEof = 0x0103,
    /// Seek to a negative position.
    InvalidSeek = 0x0104,

    // Parse errors (0x0200 - 0x02FF)
    /// Footer syntax error.
    SyntaxError = 0x0200,

    // Format errors (0x0300 - 0x03FF)
    /// Footer violates the file schema.
    InvalidFooter = 0x0300,
    /// Columns disagree on the total row count.
    RowCountMismatch = 0x0301,

    // Type errors (0x0400 - 0x04FF)
    /// Value type does not match the column type.
    TypeMismatch = 0x0400,

    // State errors (0x0500 - 0x05FF)
    /// Operation not valid in the current cursor state.
    InvalidState = 0x0500,

    // Argument errors (0x0600 - 0x06FF)
    /// Column not found.
    ColumnNotFound = 0x0600,
    /// Invalid argument provided.
    InvalidArgument = 0x0601,
}

impl ErrorCode {
    /// Returns the numeric code.
    #[inline]
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }

    /// Returns the error category name.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match (*self as u16) >> 8 {
            0x01 => "I/O",
            0x02 => "Parse",
            0x03 => "Format",
            0x04 => "Type",
            0x05 => "State",
            0x06 => "Argument",
            _ => "Unknown",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// The main error type for blockcol.
#[derive(Debug, Error)]
pub enum BlockError {
    // ==========================================================================
    // I/O Errors
    // ==========================================================================
    /// I/O error from the underlying system.
    #[error("I/O error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: io::Error,
    },

    /// File not found.
    #[error("file not found: {}", .path.display())]
    NotFound {
        /// Path that was opened.
        path: PathBuf,
    },

    /// The file cannot hold the layout it declares.
    #[error("file too short: need {required} bytes, file has {actual}")]
    ShortFile {
        /// Bytes required by the declared layout.
        required: u64,
        /// Actual file length.
        actual: u64,
    },

    /// A read ran past the end of the file.
    #[error("unexpected end of file at offset {offset}: wanted {expected} bytes, {available} available")]
    UnexpectedEof {
        /// Offset the read started at.
        offset: u64,
        /// Bytes requested.
        expected: usize,
        /// Bytes available before end of file.
        available: u64,
    },

    /// Seek target would be before the start of the file.
    #[error("invalid seek to position {target}")]
    InvalidSeek {
        /// The resolved (negative) target position.
        target: i128,
    },

    // ==========================================================================
    // Parse Errors
    // ==========================================================================
    /// Footer text could not be tokenized or parsed.
    #[error("parse error at byte {offset}: {message}")]
    Parse {
        /// Byte offset into the footer text.
        offset: usize,
        /// What was expected or found.
        message: String,
    },

    // ==========================================================================
    // Format Errors
    // ==========================================================================
    /// Footer is well formed but structurally invalid.
    #[error("format error: {message}")]
    Format {
        /// Description of the violation.
        message: String,
    },

    /// Columns disagree on the file's row count.
    #[error(
        "format error: row count mismatch across columns: column '{column}' has {actual} rows, expected {expected}"
    )]
    RowCountMismatch {
        /// The first column whose total differs.
        column: String,
        /// Row count of the first column.
        expected: u64,
        /// Row count of this column.
        actual: u64,
    },

    // ==========================================================================
    // Type Errors
    // ==========================================================================
    /// A value's type does not match the column's declared type.
    #[error("type error: column '{column}' is {expected}, got {actual} value")]
    TypeMismatch {
        /// Column name.
        column: String,
        /// Declared column type.
        expected: LogicalType,
        /// Type name of the offending value.
        actual: &'static str,
    },

    // ==========================================================================
    // State Errors
    // ==========================================================================
    /// Operation invoked in the wrong lifecycle state.
    #[error("invalid state: cannot {operation} while cursor is {state}")]
    InvalidState {
        /// The attempted operation.
        operation: &'static str,
        /// The cursor's current state.
        state: &'static str,
    },

    // ==========================================================================
    // Argument Errors
    // ==========================================================================
    /// Column not found in the catalog.
    #[error("column not found: {name}")]
    ColumnNotFound {
        /// Requested column name.
        name: String,
    },

    /// Invalid argument provided.
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// Error message.
        message: String,
    },
}

impl BlockError {
    /// Creates a parse error at the given footer offset.
    pub fn parse(offset: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            offset,
            message: message.into(),
        }
    }

    /// Creates a format error.
    pub fn format(message: impl Into<String>) -> Self {
        Self::Format {
            message: message.into(),
        }
    }

    /// Creates a format error for a required key that is absent.
    pub fn missing_key(key: &str, context: &str) -> Self {
        Self::format(format!("missing required key \"{key}\" in {context}"))
    }

    /// Creates a format error for a key holding the wrong kind of value.
    pub fn wrong_value(key: &str, context: &str, expected: &str) -> Self {
        Self::format(format!("key \"{key}\" in {context} must be {expected}"))
    }

    /// Creates a type mismatch error.
    pub fn type_mismatch(column: impl Into<String>, expected: LogicalType, actual: &'static str) -> Self {
        Self::TypeMismatch {
            column: column.into(),
            expected,
            actual,
        }
    }

    /// Creates an invalid state error.
    #[must_use]
    pub fn invalid_state(operation: &'static str, state: &'static str) -> Self {
        Self::InvalidState { operation, state }
    }

    /// Creates a column not found error.
    pub fn column_not_found(name: impl Into<String>) -> Self {
        Self::ColumnNotFound { name: name.into() }
    }

    /// Creates an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Converts an I/O error opening `path`, keeping the path for "not found".
    pub fn from_io_with_path(err: io::Error, path: impl Into<PathBuf>) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => Self::NotFound { path: path.into() },
            _ => Self::Io { source: err },
        }
    }

    /// Returns the error kind.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Io { .. }
            | Self::NotFound { .. }
            | Self::ShortFile { .. }
            | Self::UnexpectedEof { .. }
            | Self::InvalidSeek { .. } => ErrorKind::Io,
            Self::Parse { .. } => ErrorKind::Parse,
            Self::Format { .. } | Self::RowCountMismatch { .. } => ErrorKind::Format,
            Self::TypeMismatch { .. } => ErrorKind::Type,
            Self::InvalidState { .. } => ErrorKind::State,
            Self::ColumnNotFound { .. } | Self::InvalidArgument { .. } => ErrorKind::InvalidArgument,
        }
    }

    /// Returns the error code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Io { .. } => ErrorCode::Io,
            Self::NotFound { .. } => ErrorCode::FileNotFound,
            Self::ShortFile { .. } => ErrorCode::ShortFile,
            Self::UnexpectedEof { .. } => ErrorCode::UnexpectedEof,
            Self::InvalidSeek { .. } => ErrorCode::InvalidSeek,
            Self::Parse { .. } => ErrorCode::SyntaxError,
            Self::Format { .. } => ErrorCode::InvalidFooter,
            Self::RowCountMismatch { .. } => ErrorCode::RowCountMismatch,
            Self::TypeMismatch { .. } => ErrorCode::TypeMismatch,
            Self::InvalidState { .. } => ErrorCode::InvalidState,
            Self::ColumnNotFound { .. } => ErrorCode::ColumnNotFound,
            Self::InvalidArgument { .. } => ErrorCode::InvalidArgument,
        }
    }

    /// Returns true for I/O errors.
    #[must_use]
    pub const fn is_io(&self) -> bool {
        matches!(self.kind(), ErrorKind::Io)
    }

    /// Returns true for parse errors.
    #[must_use]
    pub const fn is_parse(&self) -> bool {
        matches!(self.kind(), ErrorKind::Parse)
    }

    /// Returns true for format errors.
    #[must_use]
    pub const fn is_format(&self) -> bool {
        matches!(self.kind(), ErrorKind::Format)
    }

    /// Returns true for type errors.
    #[must_use]
    pub const fn is_type(&self) -> bool {
        matches!(self.kind(), ErrorKind::Type)
    }

    /// Returns true for state errors.
    #[must_use]
    pub const fn is_state(&self) -> bool {
        matches!(self.kind(), ErrorKind::State)
    }
}
