//! Recursive-descent parser for footer text.
//!
//! Grammar (whitespace between tokens is skipped):
//!
//! ```text
//! value  := string | number | object
//! object := '{' ( string ':' value ( ',' string ':' value )* )? '}'
//! string := '"' ( char | '\' char )* '"'
//! number := [+-]? digit+ ( '.' digit+ )? ( [eE] [+-]? digit+ )?
//! ```
//!
//! Escapes `\n \r \t \v \f \b \a \0` map to control characters; any other
//! escaped character stands for itself. A number is an `Integer` when the
//! whole token parses as `i64`, otherwise a `Float`.

use blockcol_common::constants::MAX_NESTING_DEPTH;
use blockcol_common::error::{BlockError, BlockResult};

use super::value::{Dict, Value};

/// Parses one value from the start of `input`.
///
/// Returns the value and the number of bytes consumed, including leading
/// whitespace. Trailing input is left untouched.
///
/// # Errors
///
/// Returns `BlockError::Parse` with the offending byte offset.
///
/// # Example
///
/// ```rust
/// use blockcol_format::meta::{parse, Value};
///
/// let (value, consumed) = parse(b" 42 rest").unwrap();
/// assert_eq!(value, Value::Integer(42));
/// assert_eq!(consumed, 3);
/// ```
pub fn parse(input: &[u8]) -> BlockResult<(Value, usize)> {
    let mut parser = Parser::new(input);
    let value = parser.parse_value()?;
    Ok((value, parser.pos))
}

/// Parses `input` as a complete document: one value and trailing whitespace.
///
/// # Errors
///
/// Returns `BlockError::Parse` if the value is malformed or followed by
/// anything other than whitespace.
pub fn parse_document(input: &[u8]) -> BlockResult<Value> {
    let mut parser = Parser::new(input);
    let value = parser.parse_value()?;
    parser.skip_whitespace();
    if parser.pos < input.len() {
        return Err(parser.error("unexpected trailing characters after value"));
    }
    Ok(value)
}

struct Parser<'a> {
    input: &'a [u8],
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a [u8]) -> Self {
        Self {
            input,
            pos: 0,
            depth: 0,
        }
    }

    fn error(&self, message: impl Into<String>) -> BlockError {
        BlockError::parse(self.pos, message)
    }

    #[inline]
    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    #[inline]
    fn bump(&mut self) -> Option<u8> {
        let byte = self.peek()?;
        self.pos += 1;
        Some(byte)
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\n' | b'\r' | 0x0B | 0x0C)) {
            self.pos += 1;
        }
    }

    fn expect(&mut self, byte: u8) -> BlockResult<()> {
        self.skip_whitespace();
        match self.peek() {
            Some(b) if b == byte => {
                self.pos += 1;
                Ok(())
            }
            Some(b) => Err(self.error(format!(
                "expected '{}', found '{}'",
                byte as char,
                b.escape_ascii()
            ))),
            None => Err(self.error(format!("expected '{}', found end of input", byte as char))),
        }
    }

    fn parse_value(&mut self) -> BlockResult<Value> {
        self.skip_whitespace();
        match self.peek() {
            None => Err(self.error("expected a value, found end of input")),
            Some(b'"') => self.parse_string().map(Value::Text),
            Some(b'{') => self.parse_object().map(Value::Dict),
            Some(b'+' | b'-' | b'0'..=b'9') => self.parse_number(),
            Some(b) => Err(self.error(format!("unexpected character '{}'", b.escape_ascii()))),
        }
    }

    fn parse_string(&mut self) -> BlockResult<String> {
        let start = self.pos;
        self.expect(b'"')?;

        let mut buf = Vec::new();
        loop {
            match self.bump() {
                None => return Err(BlockError::parse(start, "unterminated string")),
                Some(b'"') => break,
                Some(b'\\') => match self.bump() {
                    None => return Err(BlockError::parse(start, "unterminated string")),
                    Some(escaped) => buf.push(unescape(escaped)),
                },
                Some(b) => buf.push(b),
            }
        }

        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    fn parse_number(&mut self) -> BlockResult<Value> {
        let start = self.pos;
        if matches!(self.peek(), Some(b'+' | b'-')) {
            self.pos += 1;
        }
        self.digits("expected digit in number")?;

        if self.peek() == Some(b'.') {
            self.pos += 1;
            self.digits("expected digit after decimal point")?;
        }

        if matches!(self.peek(), Some(b'e' | b'E')) {
            self.pos += 1;
            if matches!(self.peek(), Some(b'+' | b'-')) {
                self.pos += 1;
            }
            self.digits("expected digit in exponent")?;
        }

        // The token is ASCII by construction.
        let token = std::str::from_utf8(&self.input[start..self.pos])
            .map_err(|_| BlockError::parse(start, "invalid number"))?;

        if let Ok(i) = token.parse::<i64>() {
            return Ok(Value::Integer(i));
        }
        token
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|_| BlockError::parse(start, format!("invalid number '{token}'")))
    }

    fn digits(&mut self, message: &str) -> BlockResult<()> {
        let start = self.pos;
        while matches!(self.peek(), Some(b'0'..=b'9')) {
            self.pos += 1;
        }
        if self.pos == start {
            return Err(self.error(message));
        }
        Ok(())
    }

    fn parse_object(&mut self) -> BlockResult<Dict> {
        let open = self.pos;
        self.expect(b'{')?;

        self.depth += 1;
        if self.depth > MAX_NESTING_DEPTH {
            return Err(BlockError::parse(
                open,
                format!("objects nested deeper than {MAX_NESTING_DEPTH} levels"),
            ));
        }

        let mut dict = Dict::new();
        self.skip_whitespace();
        if self.peek() == Some(b'}') {
            self.pos += 1;
            self.depth -= 1;
            return Ok(dict);
        }

        loop {
            self.skip_whitespace();
            match self.peek() {
                Some(b'"') => {}
                None => return Err(BlockError::parse(open, "unterminated object: no matching '}'")),
                Some(b) => {
                    return Err(self.error(format!(
                        "expected string key, found '{}'",
                        b.escape_ascii()
                    )))
                }
            }
            let key = self.parse_string()?;
            self.expect(b':')?;
            let value = self.parse_value()?;
            dict.insert(key, value);

            self.skip_whitespace();
            match self.bump() {
                Some(b',') => {}
                Some(b'}') => break,
                None => return Err(BlockError::parse(open, "unterminated object: no matching '}'")),
                Some(b) => {
                    self.pos -= 1;
                    return Err(self.error(format!(
                        "expected ',' or '}}', found '{}'",
                        b.escape_ascii()
                    )));
                }
            }
        }

        self.depth -= 1;
        Ok(dict)
    }
}

fn unescape(escaped: u8) -> u8 {
    match escaped {
        b'n' => b'\n',
        b'r' => b'\r',
        b't' => b'\t',
        b'v' => 0x0B,
        b'f' => 0x0C,
        b'b' => 0x08,
        b'a' => 0x07,
        b'0' => 0x00,
        other => other,
    }
}
