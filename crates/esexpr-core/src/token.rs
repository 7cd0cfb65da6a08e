//! Byte-level wire tokens.
//!
//! Every token begins with one tag byte. The top three bits select the
//! token class; classes below `0xE0` carry a variable-length integer whose
//! least-significant four bits live in the tag byte itself, and the `0xE0`
//! block holds the fixed single-byte tokens. This module is pure framing:
//! it never touches the string pool, so pooled names appear here only as
//! indices.
//!
//! Varint layout: bit `0x10` of the tag byte flags a continuation; each
//! continuation byte contributes seven magnitude bits (least-significant
//! group first) with bit `0x80` flagging further bytes. Magnitudes are
//! unbounded — lengths and indices are range-checked only when narrowed to
//! `usize`.

use std::io::{Read, Write};

use num_bigint::{BigInt, BigUint, Sign};
use num_traits::{ToPrimitive, Zero};

use crate::error::SyntaxError;

/// Constructor name written with the fixed `0xE6` token, never pooled.
pub const STRING_TABLE_NAME: &str = "string-table";

/// Constructor name written with the fixed `0xE7` token, never pooled.
pub const LIST_NAME: &str = "list";

const CLASS_MASK: u8 = 0xE0;
const CLASS_CONSTRUCTOR: u8 = 0x00;
const CLASS_INT: u8 = 0x20;
const CLASS_NEG_INT: u8 = 0x40;
const CLASS_STRING: u8 = 0x60;
const CLASS_STRING_POOL: u8 = 0x80;
const CLASS_BINARY: u8 = 0xA0;
const CLASS_KEYWORD: u8 = 0xC0;

const FIXED_CONSTRUCTOR_END: u8 = 0xE0;
const FIXED_TRUE: u8 = 0xE1;
const FIXED_FALSE: u8 = 0xE2;
const FIXED_NULL0: u8 = 0xE3;
const FIXED_FLOAT32: u8 = 0xE4;
const FIXED_FLOAT64: u8 = 0xE5;
const FIXED_STRING_TABLE: u8 = 0xE6;
const FIXED_LIST: u8 = 0xE7;
const FIXED_NULL1: u8 = 0xE8;
const FIXED_NULL2: u8 = 0xE9;
const FIXED_NULL_N: u8 = 0xEA;

/// One decoded wire token.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Opens a constructor whose name is a pool index.
    ConstructorStart(usize),
    /// Opens a constructor with a fixed built-in name.
    ConstructorStartKnown(&'static str),
    /// Closes the innermost constructor frame.
    ConstructorEnd,
    /// A keyword name (pool index); the next expression is its value.
    Keyword(usize),
    /// An integer value, either sign.
    Int(BigInt),
    /// An inline string value.
    Str(String),
    /// A string value referenced from the pool.
    StrPool(usize),
    /// An inline byte-sequence value.
    Binary(Vec<u8>),
    /// A 32-bit float value.
    Float32(f32),
    /// A 64-bit float value.
    Float64(f64),
    /// A boolean value.
    Bool(bool),
    /// A null value with its nesting level.
    Null(u32),
}

/// Read one token, or `None` at a clean end of stream.
///
/// End of input is only legal before a tag byte; anywhere else it is
/// [`SyntaxError::UnexpectedEof`].
pub fn read_token<R: Read>(input: &mut R) -> Result<Option<Token>, SyntaxError> {
    let Some(b) = try_read_byte(input)? else {
        return Ok(None);
    };

    if b & CLASS_MASK == CLASS_MASK {
        return Ok(Some(match b {
            FIXED_CONSTRUCTOR_END => Token::ConstructorEnd,
            FIXED_TRUE => Token::Bool(true),
            FIXED_FALSE => Token::Bool(false),
            FIXED_NULL0 => Token::Null(0),
            FIXED_NULL1 => Token::Null(1),
            FIXED_NULL2 => Token::Null(2),
            FIXED_NULL_N => {
                let n = read_plain_varint(input)?;
                let level = n
                    .to_u32()
                    .and_then(|n| n.checked_add(3))
                    .ok_or(SyntaxError::InvalidLength)?;
                Token::Null(level)
            }
            FIXED_FLOAT32 => {
                let mut buf = [0u8; 4];
                input.read_exact(&mut buf).map_err(eof_as_syntax)?;
                Token::Float32(f32::from_le_bytes(buf))
            }
            FIXED_FLOAT64 => {
                let mut buf = [0u8; 8];
                input.read_exact(&mut buf).map_err(eof_as_syntax)?;
                Token::Float64(f64::from_le_bytes(buf))
            }
            FIXED_STRING_TABLE => Token::ConstructorStartKnown(STRING_TABLE_NAME),
            FIXED_LIST => Token::ConstructorStartKnown(LIST_NAME),
            _ => return Err(SyntaxError::InvalidTokenByte(b)),
        }));
    }

    let n = read_varint(input, b)?;

    Ok(Some(match b & CLASS_MASK {
        CLASS_CONSTRUCTOR => Token::ConstructorStart(index_of(&n)?),
        CLASS_INT => Token::Int(BigInt::from_biguint(Sign::Plus, n)),
        CLASS_NEG_INT => {
            // Negative transform: magnitude m encodes -(m + 1), so -1 has
            // magnitude zero.
            Token::Int(-(BigInt::from_biguint(Sign::Plus, n) + 1))
        }
        CLASS_STRING => {
            let buf = read_exact_vec(input, length_of(&n)?)?;
            Token::Str(std::str::from_utf8(&buf)?.to_owned())
        }
        CLASS_STRING_POOL => Token::StrPool(index_of(&n)?),
        CLASS_BINARY => Token::Binary(read_exact_vec(input, length_of(&n)?)?),
        CLASS_KEYWORD => Token::Keyword(index_of(&n)?),
        _ => unreachable!("masked to a varint class"),
    }))
}

/// Write one token.
pub fn write_token<W: Write>(out: &mut W, token: &Token) -> std::io::Result<()> {
    match token {
        Token::ConstructorStart(index) => {
            write_varint(out, CLASS_CONSTRUCTOR, &BigUint::from(*index))
        }
        Token::ConstructorStartKnown(name) => {
            let b = match *name {
                STRING_TABLE_NAME => FIXED_STRING_TABLE,
                LIST_NAME => FIXED_LIST,
                other => unreachable!("unknown built-in constructor {other}"),
            };
            out.write_all(&[b])
        }
        Token::ConstructorEnd => out.write_all(&[FIXED_CONSTRUCTOR_END]),
        Token::Keyword(index) => write_varint(out, CLASS_KEYWORD, &BigUint::from(*index)),
        Token::Int(value) => match value.sign() {
            Sign::NoSign | Sign::Plus => write_varint(out, CLASS_INT, value.magnitude()),
            Sign::Minus => write_varint(out, CLASS_NEG_INT, &(value.magnitude() - 1u32)),
        },
        Token::Str(s) => {
            write_varint(out, CLASS_STRING, &BigUint::from(s.len()))?;
            out.write_all(s.as_bytes())
        }
        Token::StrPool(index) => write_varint(out, CLASS_STRING_POOL, &BigUint::from(*index)),
        Token::Binary(bytes) => {
            write_varint(out, CLASS_BINARY, &BigUint::from(bytes.len()))?;
            out.write_all(bytes)
        }
        Token::Float32(f) => {
            out.write_all(&[FIXED_FLOAT32])?;
            out.write_all(&f.to_le_bytes())
        }
        Token::Float64(f) => {
            out.write_all(&[FIXED_FLOAT64])?;
            out.write_all(&f.to_le_bytes())
        }
        Token::Bool(true) => out.write_all(&[FIXED_TRUE]),
        Token::Bool(false) => out.write_all(&[FIXED_FALSE]),
        Token::Null(0) => out.write_all(&[FIXED_NULL0]),
        Token::Null(1) => out.write_all(&[FIXED_NULL1]),
        Token::Null(2) => out.write_all(&[FIXED_NULL2]),
        Token::Null(level) => {
            out.write_all(&[FIXED_NULL_N])?;
            write_plain_varint(out, &BigUint::from(level - 3))
        }
    }
}

/// Read the varint whose low four bits arrived in `first`.
fn read_varint<R: Read>(input: &mut R, first: u8) -> Result<BigUint, SyntaxError> {
    let mut n = BigUint::from(first & 0x0F);
    let mut shift = 4u64;
    let mut has_next = first & 0x10 != 0;

    while has_next {
        let b = read_byte(input)?;
        n |= BigUint::from(b & 0x7F) << shift;
        shift += 7;
        has_next = b & 0x80 != 0;
    }

    Ok(n)
}

/// Write `tag | low-4-bits` then the continuation bytes.
fn write_varint<W: Write>(out: &mut W, tag: u8, value: &BigUint) -> std::io::Result<()> {
    let mut rest = value >> 4u32;
    let low = (value & BigUint::from(0x0Fu8)).to_u8().expect("4-bit value");

    if rest.is_zero() {
        return out.write_all(&[tag | low]);
    }
    out.write_all(&[tag | 0x10 | low])?;

    loop {
        let bits = (&rest & BigUint::from(0x7Fu8)).to_u8().expect("7-bit value");
        rest >>= 7u32;
        if rest.is_zero() {
            return out.write_all(&[bits]);
        }
        out.write_all(&[bits | 0x80])?;
    }
}

/// Read a varint with no tag byte: seven magnitude bits per byte from the
/// start, `0x80` continuation (the NullN payload).
fn read_plain_varint<R: Read>(input: &mut R) -> Result<BigUint, SyntaxError> {
    let mut n = BigUint::zero();
    let mut shift = 0u64;
    loop {
        let b = read_byte(input)?;
        n |= BigUint::from(b & 0x7F) << shift;
        shift += 7;
        if b & 0x80 == 0 {
            return Ok(n);
        }
    }
}

/// Write a varint with no tag byte; always emits at least one byte.
fn write_plain_varint<W: Write>(out: &mut W, value: &BigUint) -> std::io::Result<()> {
    let mut rest = value.clone();
    loop {
        let bits = (&rest & BigUint::from(0x7Fu8)).to_u8().expect("7-bit value");
        rest >>= 7u32;
        if rest.is_zero() {
            return out.write_all(&[bits]);
        }
        out.write_all(&[bits | 0x80])?;
    }
}

fn try_read_byte<R: Read>(input: &mut R) -> Result<Option<u8>, SyntaxError> {
    let mut buf = [0u8; 1];
    loop {
        match input.read(&mut buf) {
            Ok(0) => return Ok(None),
            Ok(_) => return Ok(Some(buf[0])),
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(SyntaxError::Io(e)),
        }
    }
}

fn read_byte<R: Read>(input: &mut R) -> Result<u8, SyntaxError> {
    try_read_byte(input)?.ok_or(SyntaxError::UnexpectedEof)
}

fn read_exact_vec<R: Read>(input: &mut R, len: usize) -> Result<Vec<u8>, SyntaxError> {
    let mut buf = vec![0u8; len];
    input.read_exact(&mut buf).map_err(eof_as_syntax)?;
    Ok(buf)
}

fn eof_as_syntax(e: std::io::Error) -> SyntaxError {
    if e.kind() == std::io::ErrorKind::UnexpectedEof {
        SyntaxError::UnexpectedEof
    } else {
        SyntaxError::Io(e)
    }
}

fn index_of(n: &BigUint) -> Result<usize, SyntaxError> {
    n.to_usize().ok_or(SyntaxError::InvalidLength)
}

fn length_of(n: &BigUint) -> Result<usize, SyntaxError> {
    n.to_usize().ok_or(SyntaxError::InvalidLength)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn varint_bytes(tag: u8, value: u128) -> Vec<u8> {
        let mut out = Vec::new();
        write_varint(&mut out, tag, &BigUint::from(value)).unwrap();
        out
    }

    fn varint_read(bytes: &[u8]) -> BigUint {
        let mut input = bytes;
        let first = read_byte(&mut input).unwrap();
        read_varint(&mut input, first).unwrap()
    }

    #[test]
    fn varint_single_byte() {
        assert_eq!(varint_bytes(0x20, 0), vec![0x20]);
        assert_eq!(varint_bytes(0x20, 4), vec![0x24]);
        assert_eq!(varint_bytes(0x20, 15), vec![0x2F]);
    }

    #[test]
    fn varint_continuation_boundary() {
        // 16 is the first value that no longer fits the tag byte.
        assert_eq!(varint_bytes(0x20, 16), vec![0x30, 0x01]);
        // 4 + 7 bits: 2047 is the largest two-byte value.
        assert_eq!(varint_bytes(0x20, 2047), vec![0x3F, 0x7F]);
        assert_eq!(varint_bytes(0x20, 2048), vec![0x30, 0x80, 0x01]);
    }

    #[test]
    fn varint_known_vectors() {
        assert_eq!(
            varint_bytes(0x20, u64::MAX as u128),
            vec![0x3F, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x0F]
        );
        assert_eq!(
            varint_bytes(0x20, 12345678901234567890),
            vec![0x32, 0xAD, 0xE1, 0xC7, 0xF5, 0x8C, 0xD3, 0xD2, 0xDA, 0x0A]
        );
    }

    #[test]
    fn varint_roundtrip_wide_range() {
        for value in [0u128, 1, 15, 16, 127, 128, 2047, 2048, 1 << 40, u128::MAX] {
            let bytes = varint_bytes(0x00, value);
            assert_eq!(varint_read(&bytes), BigUint::from(value), "value {value}");
        }
    }

    #[test]
    fn varint_larger_than_u128() {
        let big = BigUint::from(u128::MAX) * 1000u32;
        let mut bytes = Vec::new();
        write_varint(&mut bytes, 0x00, &big).unwrap();
        assert_eq!(varint_read(&bytes), big);
    }

    #[test]
    fn truncated_varint_is_eof() {
        // Continuation flag set, then nothing.
        let mut input: &[u8] = &[0x30];
        let first = read_byte(&mut input).unwrap();
        assert!(matches!(
            read_varint(&mut input, first),
            Err(SyntaxError::UnexpectedEof)
        ));
    }

    #[test]
    fn negative_one_has_zero_magnitude() {
        let mut out = Vec::new();
        write_token(&mut out, &Token::Int(BigInt::from(-1))).unwrap();
        assert_eq!(out, vec![0x40]);
    }

    #[test]
    fn null_level_tokens() {
        for (level, bytes) in [
            (0u32, vec![0xE3]),
            (1, vec![0xE8]),
            (2, vec![0xE9]),
            (3, vec![0xEA, 0x00]),
            (20, vec![0xEA, 0x11]),
        ] {
            let mut out = Vec::new();
            write_token(&mut out, &Token::Null(level)).unwrap();
            assert_eq!(out, bytes, "level {level}");

            let mut input = bytes.as_slice();
            assert_eq!(read_token(&mut input).unwrap(), Some(Token::Null(level)));
        }
    }

    #[test]
    fn invalid_fixed_byte_rejected() {
        let mut input: &[u8] = &[0xEB];
        assert!(matches!(
            read_token(&mut input),
            Err(SyntaxError::InvalidTokenByte(0xEB))
        ));
    }

    #[test]
    fn clean_eof_is_none() {
        let mut input: &[u8] = &[];
        assert!(read_token(&mut input).unwrap().is_none());
    }
}
