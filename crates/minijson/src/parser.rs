//! A recursive-descent parser for the JSON grammar (spec.md §4.4).
//!
//! `parse` drives a single top-level value out of a UTF-8 `&str`: skip
//! leading whitespace, parse one value, skip trailing whitespace, and require
//! the input to be fully consumed. Sub-parsers for strings, arrays, and
//! objects stage their intermediate results directly in typed Rust
//! containers (`Vec<Value>`, the object's member vector) rather than the
//! reference implementation's single shared byte stack; spec.md §9 calls
//! this split "an implementation choice that does not affect the external
//! contract," and it buys us automatic cleanup on error paths for free via
//! `Drop` instead of manual pop-and-release loops. The byte stack is kept for
//! what it is genuinely needed for: staging decoded string bytes during
//! escape processing.

use alloc::{string::String, vec::Vec};

use crate::{
    buffer::ByteStack,
    error::{ErrorKind, ParseError},
    object::Object,
    unicode_escape, utf8,
    value::Value,
};

struct Parser<'a> {
    input: &'a [u8],
    pos: usize,
    line: usize,
    column: usize,
}

impl<'a> Parser<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            input: text.as_bytes(),
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn is_eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn bump(&mut self) -> Option<u8> {
        let byte = self.peek()?;
        self.pos += 1;
        if byte == b'\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(byte)
    }

    fn error(&self, kind: ErrorKind) -> ParseError {
        ParseError::new(kind, self.line, self.column)
    }

    /// ws = *(%x20 / %x09 / %x0A / %x0D)
    ///
    /// Includes line feed, unlike the reference implementation — spec.md §9
    /// flags LF's omission there as almost certainly a bug and directs a
    /// conforming implementation to include it.
    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\r' | b'\n')) {
            self.bump();
        }
    }

    fn parse_literal(&mut self, literal: &str, value: Value) -> Result<Value, ParseError> {
        for expected in literal.bytes() {
            match self.peek() {
                Some(b) if b == expected => {
                    self.bump();
                }
                _ => return Err(self.error(ErrorKind::InvalidValue)),
            }
        }
        Ok(value)
    }

    /// Grammar-accept pass: validates the number lexeme character-by-character
    /// and returns the end offset of the match, WITHOUT consuming input or
    /// doing any numeric conversion. This is deliberately a separate pass from
    /// `parse_number`'s conversion step (spec.md §9's "number parse
    /// separation"): it rejects forms `str::parse::<f64>` would otherwise
    /// silently accept, such as a leading `+`, leading zeros on a multi-digit
    /// integer, or bare `inf`/`nan` spellings.
    fn validate_number_lexeme(&self) -> Result<usize, ParseError> {
        let bytes = self.input;
        let mut i = self.pos;

        if bytes.get(i) == Some(&b'-') {
            i += 1;
        }
        match bytes.get(i) {
            Some(b'0') => {
                i += 1;
                // A lone leading zero may not be followed directly by another
                // digit (`"01"` is not a valid JSON number); a `.` or `e`/`E`
                // continuation is handled by the sections below.
                if matches!(bytes.get(i), Some(b'0'..=b'9')) {
                    return Err(self.error(ErrorKind::InvalidValue));
                }
            }
            Some(b'1'..=b'9') => {
                i += 1;
                while matches!(bytes.get(i), Some(b'0'..=b'9')) {
                    i += 1;
                }
            }
            _ => return Err(self.error(ErrorKind::InvalidValue)),
        }

        if bytes.get(i) == Some(&b'.') {
            i += 1;
            if !matches!(bytes.get(i), Some(b'0'..=b'9')) {
                return Err(self.error(ErrorKind::InvalidValue));
            }
            while matches!(bytes.get(i), Some(b'0'..=b'9')) {
                i += 1;
            }
        }

        if matches!(bytes.get(i), Some(b'e' | b'E')) {
            i += 1;
            if matches!(bytes.get(i), Some(b'+' | b'-')) {
                i += 1;
            }
            if !matches!(bytes.get(i), Some(b'0'..=b'9')) {
                return Err(self.error(ErrorKind::InvalidValue));
            }
            while matches!(bytes.get(i), Some(b'0'..=b'9')) {
                i += 1;
            }
        }

        Ok(i)
    }

    fn parse_number(&mut self) -> Result<Value, ParseError> {
        let end = self.validate_number_lexeme()?;
        let lexeme = core::str::from_utf8(&self.input[self.pos..end])
            .expect("validated number lexeme is ASCII");
        let n: f64 = lexeme
            .parse()
            .expect("a grammar-validated lexeme always parses as f64");

        if n.is_infinite() {
            return Err(self.error(ErrorKind::NumberTooBig));
        }

        for _ in self.pos..end {
            self.bump();
        }
        Ok(Value::Number(n))
    }

    /// Reads a `\uXXXX` hex quad starting at the current position, consuming
    /// it on success. Rolls the byte stack back to `head` on failure.
    fn parse_hex_escape(&mut self, stack: &mut ByteStack, head: usize) -> Result<u16, ParseError> {
        match unicode_escape::parse_hex_quad(&self.input[self.pos..]) {
            Some(value) => {
                for _ in 0..4 {
                    self.bump();
                }
                Ok(value)
            }
            None => {
                stack.truncate(head);
                Err(self.error(ErrorKind::InvalidUnicodeHex))
            }
        }
    }

    /// Parses a quoted string, decoding escapes onto `stack`, and returns the
    /// owned decoded text. The opening quote must be the current character.
    fn parse_string_raw(&mut self, stack: &mut ByteStack) -> Result<String, ParseError> {
        debug_assert_eq!(self.peek(), Some(b'"'));
        self.bump();
        let head = stack.len();

        loop {
            match self.peek() {
                None => {
                    stack.truncate(head);
                    return Err(self.error(ErrorKind::MissQuotationMark));
                }
                Some(b'"') => {
                    self.bump();
                    let bytes = stack.pop(stack.len() - head);
                    return Ok(String::from_utf8(bytes)
                        .expect("decoded string content is always valid UTF-8"));
                }
                Some(b'\\') => {
                    self.bump();
                    self.parse_escape(stack, head)?;
                }
                Some(c) if c < 0x20 => {
                    stack.truncate(head);
                    return Err(self.error(ErrorKind::InvalidStringChar));
                }
                Some(c) => {
                    stack.push_bytes(&[c]);
                    self.bump();
                }
            }
        }
    }

    fn parse_escape(&mut self, stack: &mut ByteStack, head: usize) -> Result<(), ParseError> {
        match self.peek() {
            Some(b'"') => {
                stack.push_bytes(b"\"");
                self.bump();
            }
            Some(b'\\') => {
                stack.push_bytes(b"\\");
                self.bump();
            }
            Some(b'/') => {
                stack.push_bytes(b"/");
                self.bump();
            }
            Some(b'b') => {
                stack.push_bytes(b"\x08");
                self.bump();
            }
            Some(b'f') => {
                stack.push_bytes(b"\x0C");
                self.bump();
            }
            Some(b'n') => {
                stack.push_bytes(b"\n");
                self.bump();
            }
            Some(b'r') => {
                stack.push_bytes(b"\r");
                self.bump();
            }
            Some(b't') => {
                stack.push_bytes(b"\t");
                self.bump();
            }
            Some(b'u') => {
                self.bump();
                self.parse_unicode_escape(stack, head)?;
            }
            None => {
                stack.truncate(head);
                return Err(self.error(ErrorKind::MissQuotationMark));
            }
            Some(_) => {
                stack.truncate(head);
                return Err(self.error(ErrorKind::InvalidStringEscape));
            }
        }
        Ok(())
    }

    fn parse_unicode_escape(&mut self, stack: &mut ByteStack, head: usize) -> Result<(), ParseError> {
        let u = self.parse_hex_escape(stack, head)?;

        if unicode_escape::is_high_surrogate(u) {
            if self.peek() != Some(b'\\') {
                stack.truncate(head);
                return Err(self.error(ErrorKind::InvalidUnicodeSurrogate));
            }
            self.bump();
            if self.peek() != Some(b'u') {
                stack.truncate(head);
                return Err(self.error(ErrorKind::InvalidUnicodeSurrogate));
            }
            self.bump();
            let low = self.parse_hex_escape(stack, head)?;
            if !unicode_escape::is_low_surrogate(low) {
                stack.truncate(head);
                return Err(self.error(ErrorKind::InvalidUnicodeSurrogate));
            }
            let scalar = unicode_escape::combine_surrogate_pair(u, low);
            utf8::encode_utf8(stack, scalar);
        } else if unicode_escape::is_low_surrogate(u) {
            stack.truncate(head);
            return Err(self.error(ErrorKind::InvalidUnicodeSurrogate));
        } else {
            utf8::encode_utf8(stack, u32::from(u));
        }
        Ok(())
    }

    fn parse_array(&mut self, stack: &mut ByteStack) -> Result<Value, ParseError> {
        debug_assert_eq!(self.peek(), Some(b'['));
        self.bump();
        self.skip_whitespace();
        if self.peek() == Some(b']') {
            self.bump();
            return Ok(Value::Array(Vec::new()));
        }

        let mut elements = Vec::new();
        loop {
            elements.push(self.parse_value(stack)?);
            self.skip_whitespace();
            match self.peek() {
                Some(b',') => {
                    self.bump();
                    self.skip_whitespace();
                }
                Some(b']') => {
                    self.bump();
                    return Ok(Value::Array(elements));
                }
                _ => return Err(self.error(ErrorKind::MissCommaOrSquareBracket)),
            }
        }
    }

    fn parse_object(&mut self, stack: &mut ByteStack) -> Result<Value, ParseError> {
        debug_assert_eq!(self.peek(), Some(b'{'));
        self.bump();
        self.skip_whitespace();
        if self.peek() == Some(b'}') {
            self.bump();
            return Ok(Value::Object(Object::new()));
        }

        let mut object = Object::new();
        loop {
            if self.peek() != Some(b'"') {
                return Err(self.error(ErrorKind::MissKey));
            }
            let key = self.parse_string_raw(stack)?;

            self.skip_whitespace();
            if self.peek() != Some(b':') {
                return Err(self.error(ErrorKind::MissColon));
            }
            self.bump();
            self.skip_whitespace();

            let value = self.parse_value(stack)?;
            object.push_raw(key, value);

            self.skip_whitespace();
            match self.peek() {
                Some(b',') => {
                    self.bump();
                    self.skip_whitespace();
                }
                Some(b'}') => {
                    self.bump();
                    return Ok(Value::Object(object));
                }
                _ => return Err(self.error(ErrorKind::MissCommaOrCurlyBracket)),
            }
        }
    }

    fn parse_value(&mut self, stack: &mut ByteStack) -> Result<Value, ParseError> {
        match self.peek() {
            Some(b'n') => self.parse_literal("null", Value::Null),
            Some(b't') => self.parse_literal("true", Value::Boolean(true)),
            Some(b'f') => self.parse_literal("false", Value::Boolean(false)),
            Some(b'"') => Ok(Value::String(self.parse_string_raw(stack)?)),
            Some(b'[') => self.parse_array(stack),
            Some(b'{') => self.parse_object(stack),
            None => Err(self.error(ErrorKind::ExpectValue)),
            Some(_) => self.parse_number(),
        }
    }
}

/// Parses a complete JSON text into a [`Value`] tree.
///
/// Requires exactly one root value, optionally surrounded by whitespace; any
/// other non-whitespace content after the root value is
/// [`ErrorKind::RootNotSingular`]. See spec.md §6 for the full error table.
///
/// # Errors
///
/// Returns [`ParseError`] on any grammar violation, UTF-16 surrogate error,
/// or numeric overflow. No partial document is returned on failure.
pub fn parse(text: &str) -> Result<Value, ParseError> {
    let mut parser = Parser::new(text);
    let mut stack = ByteStack::new();

    parser.skip_whitespace();
    let value = parser.parse_value(&mut stack)?;
    parser.skip_whitespace();

    if !parser.is_eof() {
        return Err(parser.error(ErrorKind::RootNotSingular));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::ObjectOperation;

    #[test]
    fn parses_null_true_false() {
        assert_eq!(parse("null").unwrap(), Value::Null);
        assert_eq!(parse("true").unwrap(), Value::Boolean(true));
        assert_eq!(parse("false").unwrap(), Value::Boolean(false));
    }

    #[test]
    fn parses_array_of_numbers() {
        let v = parse("[1, 2, 3]").unwrap();
        assert_eq!(v.array_len(), 3);
        assert_eq!(v.as_array().unwrap()[0], Value::Number(1.0));
    }

    #[test]
    fn parses_object_with_mixed_values() {
        let v = parse(r#"{"n":null,"t":true,"s":"hi"}"#).unwrap();
        let obj = v.as_object().unwrap();
        assert_eq!(obj.len(), 3);
        assert_eq!(obj.find_index("s"), Some(2));
        assert_eq!(obj.get("s"), Some(&Value::String("hi".into())));
    }

    #[test]
    fn parses_all_basic_escapes() {
        let v = parse(r#""\"\\\b\f\n\r\t""#).unwrap();
        assert_eq!(v.get_string(), "\"\\\u{8}\u{c}\n\r\t");
    }

    #[test]
    fn root_not_singular_resets_to_error() {
        let err = parse("null x").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RootNotSingular);
    }

    #[test]
    fn empty_input_is_expect_value() {
        assert_eq!(parse("").unwrap_err().kind(), ErrorKind::ExpectValue);
        assert_eq!(parse("   ").unwrap_err().kind(), ErrorKind::ExpectValue);
    }

    #[test]
    fn empty_array_and_object_have_zero_capacity() {
        let arr = parse("[]").unwrap();
        assert_eq!(arr.array_len(), 0);
        assert_eq!(arr.array_capacity(), 0);

        let obj = parse("{}").unwrap();
        assert_eq!(obj.as_object().unwrap().len(), 0);
        assert_eq!(obj.as_object().unwrap().capacity(), 0);
    }

    #[test]
    fn negative_zero_round_trips_distinctly_signed() {
        let zero = parse("0").unwrap();
        let neg_zero = parse("-0").unwrap();
        assert_eq!(zero, Value::Number(0.0));
        assert_eq!(neg_zero, Value::Number(-0.0));
        assert!(neg_zero.get_number().is_sign_negative());
    }

    #[test]
    fn huge_exponent_is_number_too_big() {
        assert_eq!(parse("1e309").unwrap_err().kind(), ErrorKind::NumberTooBig);
    }

    #[rustfmt::skip]
    #[test]
    fn malformed_number_grammar_is_invalid_value() {
        for input in ["01", "+1", ".5", "1.", "1e", "1e+"] {
            assert_eq!(
                parse(input).unwrap_err().kind(),
                ErrorKind::InvalidValue,
                "input {input:?} should be INVALID_VALUE",
            );
        }
    }

    #[test]
    fn unterminated_string_is_miss_quotation_mark() {
        assert_eq!(
            parse(r#""abc"#).unwrap_err().kind(),
            ErrorKind::MissQuotationMark
        );
    }

    #[test]
    fn literal_control_byte_is_invalid_string_char() {
        let input = "\"\u{1}\"";
        assert_eq!(
            parse(input).unwrap_err().kind(),
            ErrorKind::InvalidStringChar
        );
    }

    #[test]
    fn lone_high_surrogate_is_invalid_surrogate() {
        assert_eq!(
            parse(r#""\uD800""#).unwrap_err().kind(),
            ErrorKind::InvalidUnicodeSurrogate
        );
    }

    #[test]
    fn literal_utf8_bytes_pass_through_unescaped() {
        let v = parse(r#""𝄞""#).unwrap();
        assert_eq!(v.get_string(), "\u{1D11E}");
    }

    #[test]
    fn escaped_surrogate_pair_decodes_supplementary_plane_character() {
        let escaped = concat!('"', "\\uD834\\uDD1E", '"');
        let v = parse(escaped).unwrap();
        assert_eq!(v.get_string(), "\u{1D11E}");
    }

    #[test]
    fn duplicate_keys_are_retained_and_find_returns_first() {
        let v = parse(r#"{"a":1,"a":2}"#).unwrap();
        let obj = v.as_object().unwrap();
        assert_eq!(obj.len(), 2);
        assert_eq!(obj.find_index("a"), Some(0));
    }

    #[test]
    fn array_sub_error_leaves_no_leak_sanitizer_relevant_state() {
        // Vec<Value>'s Drop recursively frees any values collected before a
        // later sibling in the array fails to parse.
        let err = parse("[1, 2, }").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidValue);
    }

    #[test]
    fn object_missing_colon_is_reported() {
        assert_eq!(
            parse(r#"{"a" 1}"#).unwrap_err().kind(),
            ErrorKind::MissColon
        );
    }

    #[test]
    fn object_missing_key_is_reported() {
        assert_eq!(parse(r#"{1:2}"#).unwrap_err().kind(), ErrorKind::MissKey);
    }

    #[test]
    fn object_set_by_key_modifies_only_first_duplicate() {
        let mut v = parse(r#"{"a":1,"a":2}"#).unwrap();
        let obj = v.as_object_mut().unwrap();
        assert_eq!(obj.set("a", Value::Number(9.0)), ObjectOperation::ModifyOk);
        assert_eq!(obj.len(), 2);
        assert_eq!(obj.get_index(0), Some(("a", &Value::Number(9.0))));
        assert_eq!(obj.get_index(1), Some(("a", &Value::Number(2.0))));
    }
}
