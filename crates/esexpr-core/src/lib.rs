//! # esexpr-core
//!
//! ESExpr is an S-expression-like value tree with a canonical binary wire
//! encoding and a composable codec protocol for mapping typed values to and
//! from the tree. Expressions are constructors (named nodes with positional
//! and keyword arguments), booleans, arbitrary-precision integers, strings,
//! binary blobs, floats, and leveled nulls.
//!
//! The wire format frames each value as tag-byte tokens with embedded
//! varints, pools constructor and keyword names into a string table, and
//! prefixes self-contained streams with that table so they carry everything
//! a reader needs.
//!
//! ## Quick start
//!
//! ```rust
//! use esexpr_core::{read_embedded, write_embedded, Expr};
//! use num_bigint::BigInt;
//!
//! let expr = Expr::Constructor {
//!     name: "point".into(),
//!     args: vec![Expr::Int(BigInt::from(3)), Expr::Int(BigInt::from(4))],
//!     kwargs: Default::default(),
//! };
//!
//! // Self-contained stream: string table first, then the payload.
//! let mut bytes = Vec::new();
//! write_embedded(&mut bytes, [&expr]).unwrap();
//!
//! let decoded: Vec<_> = read_embedded(bytes.as_slice())
//!     .unwrap()
//!     .collect::<Result<_, _>>()
//!     .unwrap();
//! assert_eq!(decoded, vec![expr]);
//! ```
//!
//! ## Modules
//!
//! - [`expr`] — the `Expr` value tree and its `Tag` projection
//! - [`token`] — tag-byte and varint framing
//! - [`reader`] / [`writer`] — token streams ⟷ expression trees
//! - [`pool`] — the string table and its builder
//! - [`codec`] — the `ESExprCodec` trait and primitive codecs
//! - [`fields`] — positional/keyword/vararg/dict field assignment
//! - [`schema`] — definition-time shape validation and union dispatch
//! - [`json`] — the JSON fixture form used by test vectors
//! - [`error`] — syntax, encode, decode, and schema error types

pub mod codec;
pub mod error;
pub mod expr;
pub mod fields;
pub mod json;
pub mod pool;
pub mod reader;
pub mod schema;
pub mod token;
pub mod writer;

pub use codec::{Binary, ESExprCodec};
pub use error::{DecodeError, DecodeErrorKind, DecodePath, EncodeError, SchemaError, SyntaxError};
pub use expr::{Expr, Tag};
pub use fields::{ConstructorArgs, ConstructorBuilder};
pub use pool::{PoolBuilder, StringPool};
pub use reader::ExprReader;
pub use schema::{CaseShape, FieldDecl, FieldKind, RecordShape, UnionShape};
pub use token::{LIST_NAME, STRING_TABLE_NAME};
pub use writer::{build_pool, write_embedded, write_expr};

/// Read a self-contained stream (leading string table, then payload
/// expressions). See [`ExprReader::read_embedded`].
pub fn read_embedded<R: std::io::Read>(input: R) -> Result<ExprReader<R>, SyntaxError> {
    ExprReader::read_embedded(input)
}
