//! Renders a [`Value`] tree into compact JSON text.
//!
//! Numbers use Rust's built-in shortest-round-trip `f64` formatting rather
//! than the reference implementation's `%.17g`; spec.md §9 calls this out as
//! an acceptable, observably-different upgrade, and it is the same choice the
//! teacher crate's own `Display` impl for its value type makes.

use alloc::string::String;

use crate::{buffer::ByteStack, object::Object, value::Value};

/// A worst-case reservation of 6 bytes per input byte plus the two
/// surrounding quotes, matching `lept_stringify_string`'s bound (every byte
/// could become a `\u00XX` escape).
fn reserve_for_string(len: usize) -> usize {
    len * 6 + 2
}

fn write_escaped_string(stack: &mut ByteStack, s: &str) {
    stack.reserve_hint(reserve_for_string(s.len()));
    stack.push_bytes(b"\"");
    for &byte in s.as_bytes() {
        match byte {
            b'"' => stack.push_bytes(b"\\\""),
            b'\\' => stack.push_bytes(b"\\\\"),
            b'\x08' => stack.push_bytes(b"\\b"),
            b'\x0C' => stack.push_bytes(b"\\f"),
            b'\n' => stack.push_bytes(b"\\n"),
            b'\r' => stack.push_bytes(b"\\r"),
            b'\t' => stack.push_bytes(b"\\t"),
            c if c < 0x20 => {
                const HEX: &[u8; 16] = b"0123456789ABCDEF";
                stack.push_bytes(&[
                    b'\\',
                    b'u',
                    b'0',
                    b'0',
                    HEX[(c >> 4) as usize],
                    HEX[(c & 0x0F) as usize],
                ]);
            }
            c => stack.push_bytes(&[c]),
        }
    }
    stack.push_bytes(b"\"");
}

fn write_object(stack: &mut ByteStack, obj: &Object) {
    stack.push_bytes(b"{");
    for (i, (key, value)) in obj.iter().enumerate() {
        if i > 0 {
            stack.push_bytes(b",");
        }
        write_escaped_string(stack, key);
        stack.push_bytes(b":");
        write_value(stack, value);
    }
    stack.push_bytes(b"}");
}

fn write_value(stack: &mut ByteStack, value: &Value) {
    match value {
        Value::Null => stack.push_bytes(b"null"),
        Value::Boolean(true) => stack.push_bytes(b"true"),
        Value::Boolean(false) => stack.push_bytes(b"false"),
        Value::Number(n) => {
            debug_assert!(n.is_finite(), "stringify requires a finite number");
            let text = format_number(*n);
            stack.push_bytes(text.as_bytes());
        }
        Value::String(s) => write_escaped_string(stack, s),
        Value::Array(elems) => {
            stack.push_bytes(b"[");
            for (i, elem) in elems.iter().enumerate() {
                if i > 0 {
                    stack.push_bytes(b",");
                }
                write_value(stack, elem);
            }
            stack.push_bytes(b"]");
        }
        Value::Object(obj) => write_object(stack, obj),
    }
}

/// Formats a finite `f64` the way the document round-trips through
/// `stringify` and back: shortest decimal text that reparses to the same
/// bit pattern, including the sign of negative zero.
fn format_number(n: f64) -> String {
    if n == 0.0 && n.is_sign_negative() {
        return String::from("-0");
    }
    alloc::format!("{n}")
}

/// Renders `value` into compact JSON text with no inserted whitespace.
#[must_use]
pub fn stringify(value: &Value) -> String {
    let mut stack = ByteStack::new();
    write_value(&mut stack, value);
    // Bytes pushed above are exactly the UTF-8 encoding of the literals,
    // escaped string content, and `format!("{n}")` output above, all of
    // which are valid UTF-8 by construction.
    String::from_utf8(stack.into_vec()).expect("stringify only ever emits UTF-8 bytes")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    #[test]
    fn null_stringifies_to_literal() {
        assert_eq!(stringify(&Value::Null), "null");
    }

    #[test]
    fn array_has_no_inserted_whitespace() {
        let v = parse("[1, 2, 3]").unwrap();
        assert_eq!(stringify(&v), "[1,2,3]");
    }

    #[test]
    fn object_round_trips_member_order() {
        let v = parse(r#"{"n":null,"t":true,"s":"hi"}"#).unwrap();
        assert_eq!(stringify(&v), r#"{"n":null,"t":true,"s":"hi"}"#);
    }

    #[test]
    fn control_bytes_are_escaped_uppercase() {
        let v = Value::String(String::from("\x01"));
        assert_eq!(stringify(&v), "\"\\u0001\"");
    }

    #[test]
    fn forward_slash_is_not_escaped() {
        let v = Value::String(String::from("a/b"));
        assert_eq!(stringify(&v), "\"a/b\"");
    }

    #[test]
    fn negative_zero_round_trips() {
        let v = Value::Number(-0.0);
        let text = stringify(&v);
        let reparsed = parse(&text).unwrap();
        assert_eq!(reparsed, v);
        assert!(reparsed.get_number().is_sign_negative());
    }
}
