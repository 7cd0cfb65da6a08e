//! Byte-level wire format vectors.
//!
//! These tests pin the exact byte sequences of the format: tag-byte layout
//! per token class, varint continuation boundaries, the negative-integer
//! transform, null levels, float endianness, and the embedded string-table
//! framing. Every expectation is asserted byte for byte.

use std::collections::HashMap;

use esexpr_core::{
    read_embedded, write_embedded, write_expr, Expr, ExprReader, StringPool, SyntaxError,
};
use num_bigint::BigInt;

fn encode_with_pool(expr: &Expr, pool: &StringPool) -> Vec<u8> {
    let mut out = Vec::new();
    write_expr(&mut out, pool, expr).expect("encode failed");
    out
}

fn decode_with_pool(bytes: &[u8], pool: &StringPool) -> Expr {
    let mut reader = ExprReader::new(bytes, pool.clone());
    let expr = reader.read().expect("decode failed").expect("no value");
    assert!(reader.read().expect("trailing read failed").is_none());
    expr
}

fn constructor(name: &str, args: Vec<Expr>) -> Expr {
    Expr::Constructor {
        name: name.into(),
        args,
        kwargs: HashMap::new(),
    }
}

#[test]
fn point_constructor_exact_bytes() {
    // (point 3 4) against a pool where "point" is entry 0:
    //   0x00 constructor-start index 0
    //   0x23 int 3, 0x24 int 4
    //   0xE0 constructor end
    let pool = StringPool::new(vec!["point".into()]);
    let expr = constructor(
        "point",
        vec![Expr::Int(BigInt::from(3)), Expr::Int(BigInt::from(4))],
    );

    let bytes = encode_with_pool(&expr, &pool);
    assert_eq!(bytes, vec![0x00, 0x23, 0x24, 0xE0]);
    assert_eq!(decode_with_pool(&bytes, &pool), expr);
}

#[test]
fn keyword_argument_bytes() {
    let pool = StringPool::new(vec!["config".into(), "verbose".into()]);
    let expr = Expr::Constructor {
        name: "config".into(),
        args: vec![],
        kwargs: HashMap::from([("verbose".to_owned(), Expr::Bool(true))]),
    };

    let bytes = encode_with_pool(&expr, &pool);
    // 0x00 start, 0xC1 keyword index 1, 0xE1 true, 0xE0 end
    assert_eq!(bytes, vec![0x00, 0xC1, 0xE1, 0xE0]);
    assert_eq!(decode_with_pool(&bytes, &pool), expr);
}

#[test]
fn builtin_list_constructor_is_single_byte() {
    let pool = StringPool::empty();
    let expr = constructor("list", vec![Expr::Int(BigInt::from(1))]);

    let bytes = encode_with_pool(&expr, &pool);
    assert_eq!(bytes, vec![0xE7, 0x21, 0xE0]);
    assert_eq!(decode_with_pool(&bytes, &pool), expr);
}

#[test]
fn scalar_token_bytes() {
    let pool = StringPool::empty();

    assert_eq!(encode_with_pool(&Expr::Bool(true), &pool), vec![0xE1]);
    assert_eq!(encode_with_pool(&Expr::Bool(false), &pool), vec![0xE2]);
    assert_eq!(encode_with_pool(&Expr::Null(0), &pool), vec![0xE3]);
    assert_eq!(encode_with_pool(&Expr::Null(1), &pool), vec![0xE8]);
    assert_eq!(encode_with_pool(&Expr::Null(2), &pool), vec![0xE9]);
    assert_eq!(encode_with_pool(&Expr::Null(3), &pool), vec![0xEA, 0x00]);
    assert_eq!(encode_with_pool(&Expr::Null(130), &pool), vec![0xEA, 0x7F]);
    assert_eq!(
        encode_with_pool(&Expr::Null(131), &pool),
        vec![0xEA, 0x80, 0x01]
    );
}

#[test]
fn inline_string_bytes() {
    let pool = StringPool::empty();
    let bytes = encode_with_pool(&Expr::Str("hi".into()), &pool);
    // 0x62: inline string, length 2, then UTF-8.
    assert_eq!(bytes, vec![0x62, b'h', b'i']);
    assert_eq!(decode_with_pool(&bytes, &pool), Expr::Str("hi".into()));
}

#[test]
fn inline_binary_bytes() {
    let pool = StringPool::empty();
    let bytes = encode_with_pool(&Expr::Binary(vec![0xDE, 0xAD]), &pool);
    assert_eq!(bytes, vec![0xA2, 0xDE, 0xAD]);
    assert_eq!(
        decode_with_pool(&bytes, &pool),
        Expr::Binary(vec![0xDE, 0xAD])
    );
}

#[test]
fn pooled_string_token_resolves_on_read() {
    // The writer always emits strings inline, but the reader must accept
    // the pooled form other producers emit.
    let pool = StringPool::new(vec!["hello".into()]);
    assert_eq!(
        decode_with_pool(&[0x80], &pool),
        Expr::Str("hello".into())
    );

    let empty = StringPool::empty();
    let mut reader = ExprReader::new([0x80u8].as_slice(), empty);
    assert!(matches!(
        reader.read(),
        Err(SyntaxError::InvalidStringIndex(0))
    ));
}

#[test]
fn float_little_endian_bytes() {
    let pool = StringPool::empty();

    let bytes = encode_with_pool(&Expr::Float32(1.0), &pool);
    assert_eq!(bytes, vec![0xE4, 0x00, 0x00, 0x80, 0x3F]);

    let bytes = encode_with_pool(&Expr::Float64(1.0), &pool);
    assert_eq!(
        bytes,
        vec![0xE5, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xF0, 0x3F]
    );
}

#[test]
fn integer_varint_boundaries() {
    let pool = StringPool::empty();

    // 4-bit magnitudes fit the tag byte.
    assert_eq!(encode_with_pool(&Expr::Int(BigInt::from(0)), &pool), vec![0x20]);
    assert_eq!(
        encode_with_pool(&Expr::Int(BigInt::from(15)), &pool),
        vec![0x2F]
    );
    // 16 needs one continuation byte.
    assert_eq!(
        encode_with_pool(&Expr::Int(BigInt::from(16)), &pool),
        vec![0x30, 0x01]
    );
    // 2048 needs two.
    assert_eq!(
        encode_with_pool(&Expr::Int(BigInt::from(2048)), &pool),
        vec![0x30, 0x80, 0x01]
    );

    for value in [0i128, 15, 16, 2047, 2048, i64::MAX as i128, i128::MAX] {
        let expr = Expr::Int(BigInt::from(value));
        let bytes = encode_with_pool(&expr, &pool);
        assert_eq!(decode_with_pool(&bytes, &pool), expr, "value {value}");
    }
}

#[test]
fn negative_integer_transform() {
    let pool = StringPool::empty();

    // -1 is the negative class with zero magnitude.
    assert_eq!(
        encode_with_pool(&Expr::Int(BigInt::from(-1)), &pool),
        vec![0x40]
    );
    assert_eq!(
        encode_with_pool(&Expr::Int(BigInt::from(-16)), &pool),
        vec![0x4F]
    );
    assert_eq!(
        encode_with_pool(&Expr::Int(BigInt::from(-17)), &pool),
        vec![0x50, 0x01]
    );

    for value in [-1i128, -2, -16, -17, -2048, i64::MIN as i128, i128::MIN] {
        let expr = Expr::Int(BigInt::from(value));
        let bytes = encode_with_pool(&expr, &pool);
        assert_eq!(decode_with_pool(&bytes, &pool), expr, "value {value}");
    }
}

#[test]
fn embedded_stream_layout() {
    let expr = constructor("point", vec![Expr::Int(BigInt::from(3))]);

    let mut bytes = Vec::new();
    write_embedded(&mut bytes, [&expr]).unwrap();

    // string-table frame: 0xE6, inline "point", 0xE0; payload follows.
    let expected = [
        vec![0xE6, 0x65],
        b"point".to_vec(),
        vec![0xE0, 0x00, 0x23, 0xE0],
    ]
    .concat();
    assert_eq!(bytes, expected);

    let decoded: Vec<_> = read_embedded(bytes.as_slice())
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(decoded, vec![expr]);
}

#[test]
fn invalid_token_byte_is_syntax_error() {
    let pool = StringPool::empty();
    let mut reader = ExprReader::new([0xEBu8].as_slice(), pool);
    assert!(matches!(
        reader.read(),
        Err(SyntaxError::InvalidTokenByte(0xEB))
    ));
}

#[test]
fn truncated_varint_is_syntax_error() {
    let pool = StringPool::empty();
    // Int with continuation flag set, then nothing.
    let mut reader = ExprReader::new([0x30u8].as_slice(), pool);
    assert!(matches!(reader.read(), Err(SyntaxError::UnexpectedEof)));
}

#[test]
fn unterminated_constructor_is_syntax_error() {
    let pool = StringPool::new(vec!["point".into()]);
    let mut reader = ExprReader::new([0x00u8, 0x23].as_slice(), pool);
    assert!(matches!(reader.read(), Err(SyntaxError::UnexpectedEof)));
}

#[test]
fn dangling_constructor_end_is_syntax_error() {
    let pool = StringPool::empty();
    let mut reader = ExprReader::new([0xE0u8].as_slice(), pool);
    assert!(matches!(
        reader.read(),
        Err(SyntaxError::UnexpectedConstructorEnd)
    ));
}

#[test]
fn keyword_outside_constructor_is_syntax_error() {
    let pool = StringPool::new(vec!["k".into()]);
    let mut reader = ExprReader::new([0xC0u8].as_slice(), pool);
    assert!(matches!(reader.read(), Err(SyntaxError::UnexpectedKeyword)));
}

#[test]
fn out_of_range_pool_index_is_syntax_error() {
    let pool = StringPool::empty();
    // Constructor start referencing pool entry 0 of an empty pool.
    let mut reader = ExprReader::new([0x00u8].as_slice(), pool);
    assert!(matches!(
        reader.read(),
        Err(SyntaxError::InvalidStringIndex(0))
    ));
}

#[test]
fn truncated_string_payload_is_syntax_error() {
    let pool = StringPool::empty();
    // Inline string declaring 5 bytes, supplying 2.
    let mut reader = ExprReader::new([0x65u8, b'h', b'i'].as_slice(), pool);
    assert!(matches!(reader.read(), Err(SyntaxError::UnexpectedEof)));
}

#[test]
fn truncated_float_is_syntax_error() {
    let pool = StringPool::empty();
    let mut reader = ExprReader::new([0xE4u8, 0x00, 0x00].as_slice(), pool);
    assert!(matches!(reader.read(), Err(SyntaxError::UnexpectedEof)));
}

#[test]
fn writing_unpooled_name_fails() {
    let pool = StringPool::empty();
    let expr = Expr::constructor("unpooled");
    let mut out = Vec::new();
    assert!(write_expr(&mut out, &pool, &expr).is_err());
}
