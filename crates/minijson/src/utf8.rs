//! Encodes a Unicode scalar value as UTF-8 bytes appended to a [`ByteStack`].
//!
//! The caller guarantees `u` is a valid scalar value (high and low surrogate
//! halves have already been combined by the string parser). The actual byte
//! encoding is delegated to `char::encode_utf8`, the same standard-library
//! call the teacher crate's own lexer reaches for when it has a combined
//! scalar value to emit.

use crate::buffer::ByteStack;

/// Appends the UTF-8 encoding of code point `u` to `stack`.
///
/// # Panics
///
/// Panics if `u` is not a valid Unicode scalar value (greater than
/// `0x10FFFF`, or a surrogate half). Callers must only pass already-validated
/// scalar values; this is an internal invariant, not a user-facing error
/// path.
pub(crate) fn encode_utf8(stack: &mut ByteStack, u: u32) {
    let ch =
        char::from_u32(u).unwrap_or_else(|| panic!("code point out of Unicode range: {u:#X}"));
    let mut buf = [0u8; 4];
    stack.push_bytes(ch.encode_utf8(&mut buf).as_bytes());
}
