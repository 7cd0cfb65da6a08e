//! The typed codec protocol: mapping application values to and from
//! [`Expr`] trees.
//!
//! A codec advertises the set of [`Tag`]s it can decode, which is what
//! union dispatch matches against (see [`crate::schema`]). Decoding a
//! mismatched tree yields a [`DecodeError`] whose path locates the failure;
//! nothing in this layer ever truncates silently — fixed-width integer
//! codecs range-check through `TryFrom<BigInt>`.

use std::collections::{HashMap, HashSet};

use num_bigint::{BigInt, BigUint};

use crate::error::{DecodeError, DecodeErrorKind, DecodePath};
use crate::expr::{Expr, Tag};
use crate::token::LIST_NAME;

/// A codec between a typed value and its expression form.
pub trait ESExprCodec: Sized {
    /// The tags this type can be decoded from.
    fn tags() -> HashSet<Tag>;

    /// Lower this value into an expression.
    fn encode_expr(self) -> Expr;

    /// Recover a value from an expression.
    fn decode_expr(expr: Expr) -> Result<Self, DecodeError>;
}

/// The standard "wrong tag" decode error for a codec.
pub fn unexpected_tag<T: ESExprCodec>(actual: Tag) -> DecodeError {
    DecodeError::new(DecodeErrorKind::UnexpectedTag {
        expected: T::tags(),
        actual,
    })
}

/// The identity codec: an `Expr` is its own encoding. Its tag set is empty,
/// which no union dispatch matches; use it for fields, not union cases.
impl ESExprCodec for Expr {
    fn tags() -> HashSet<Tag> {
        HashSet::new()
    }

    fn encode_expr(self) -> Expr {
        self
    }

    fn decode_expr(expr: Expr) -> Result<Self, DecodeError> {
        Ok(expr)
    }
}

impl ESExprCodec for bool {
    fn tags() -> HashSet<Tag> {
        [Tag::Bool].into()
    }

    fn encode_expr(self) -> Expr {
        Expr::Bool(self)
    }

    fn decode_expr(expr: Expr) -> Result<Self, DecodeError> {
        match expr {
            Expr::Bool(b) => Ok(b),
            other => Err(unexpected_tag::<Self>(other.tag())),
        }
    }
}

impl ESExprCodec for String {
    fn tags() -> HashSet<Tag> {
        [Tag::Str].into()
    }

    fn encode_expr(self) -> Expr {
        Expr::Str(self)
    }

    fn decode_expr(expr: Expr) -> Result<Self, DecodeError> {
        match expr {
            Expr::Str(s) => Ok(s),
            other => Err(unexpected_tag::<Self>(other.tag())),
        }
    }
}

impl ESExprCodec for f32 {
    fn tags() -> HashSet<Tag> {
        [Tag::Float32].into()
    }

    fn encode_expr(self) -> Expr {
        Expr::Float32(self)
    }

    fn decode_expr(expr: Expr) -> Result<Self, DecodeError> {
        match expr {
            Expr::Float32(f) => Ok(f),
            other => Err(unexpected_tag::<Self>(other.tag())),
        }
    }
}

impl ESExprCodec for f64 {
    fn tags() -> HashSet<Tag> {
        [Tag::Float64].into()
    }

    fn encode_expr(self) -> Expr {
        Expr::Float64(self)
    }

    fn decode_expr(expr: Expr) -> Result<Self, DecodeError> {
        match expr {
            Expr::Float64(f) => Ok(f),
            other => Err(unexpected_tag::<Self>(other.tag())),
        }
    }
}

impl ESExprCodec for BigInt {
    fn tags() -> HashSet<Tag> {
        [Tag::Int].into()
    }

    fn encode_expr(self) -> Expr {
        Expr::Int(self)
    }

    fn decode_expr(expr: Expr) -> Result<Self, DecodeError> {
        match expr {
            Expr::Int(i) => Ok(i),
            other => Err(unexpected_tag::<Self>(other.tag())),
        }
    }
}

/// Fixed-width and unsigned integer codecs narrow through
/// `TryFrom<BigInt>`; values outside the target range are decode errors.
macro_rules! int_codec {
    ($($t:ty),* $(,)?) => {$(
        impl ESExprCodec for $t {
            fn tags() -> HashSet<Tag> {
                [Tag::Int].into()
            }

            fn encode_expr(self) -> Expr {
                Expr::Int(BigInt::from(self))
            }

            fn decode_expr(expr: Expr) -> Result<Self, DecodeError> {
                match expr {
                    Expr::Int(i) => <$t>::try_from(i).map_err(|_| {
                        DecodeError::new(DecodeErrorKind::OutOfRange(format!(
                            "integer does not fit in {}",
                            stringify!($t)
                        )))
                    }),
                    other => Err(unexpected_tag::<Self>(other.tag())),
                }
            }
        }
    )*};
}

int_codec!(BigUint, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

/// A byte-sequence value. Distinct from `Vec<u8>` so that lists of small
/// integers and binary blobs stay different types with different tags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Binary(pub Vec<u8>);

impl ESExprCodec for Binary {
    fn tags() -> HashSet<Tag> {
        [Tag::Binary].into()
    }

    fn encode_expr(self) -> Expr {
        Expr::Binary(self.0)
    }

    fn decode_expr(expr: Expr) -> Result<Self, DecodeError> {
        match expr {
            Expr::Binary(b) => Ok(Binary(b)),
            other => Err(unexpected_tag::<Self>(other.tag())),
        }
    }
}

/// Sequences encode as the builtin `list` constructor with vararg
/// positional elements and no keywords.
impl<A: ESExprCodec> ESExprCodec for Vec<A> {
    fn tags() -> HashSet<Tag> {
        [Tag::Constructor(LIST_NAME.to_owned())].into()
    }

    fn encode_expr(self) -> Expr {
        Expr::Constructor {
            name: LIST_NAME.to_owned(),
            args: self.into_iter().map(A::encode_expr).collect(),
            kwargs: HashMap::new(),
        }
    }

    fn decode_expr(expr: Expr) -> Result<Self, DecodeError> {
        match expr {
            Expr::Constructor { name, args, kwargs } if name == LIST_NAME => {
                if !kwargs.is_empty() {
                    return Err(DecodeError {
                        kind: DecodeErrorKind::UnexpectedArguments {
                            positional: 0,
                            keywords: kwargs.into_keys().collect(),
                        },
                        path: DecodePath::Constructor(name),
                    });
                }

                args.into_iter()
                    .enumerate()
                    .map(|(i, arg)| {
                        A::decode_expr(arg).map_err(|e| e.in_positional(LIST_NAME, i))
                    })
                    .collect()
            }
            other => Err(unexpected_tag::<Self>(other.tag())),
        }
    }
}

/// Optional values use the nested-null rule: `None` is `Null(0)`, and a
/// `Some` whose inner encoding is itself a null gains one nesting level, so
/// option-of-option round-trips without collapsing distinct absences.
impl<A: ESExprCodec> ESExprCodec for Option<A> {
    fn tags() -> HashSet<Tag> {
        let mut tags = A::tags();
        tags.insert(Tag::Null);
        tags
    }

    fn encode_expr(self) -> Expr {
        match self {
            None => Expr::Null(0),
            Some(value) => match value.encode_expr() {
                Expr::Null(level) => Expr::Null(level + 1),
                other => other,
            },
        }
    }

    fn decode_expr(expr: Expr) -> Result<Self, DecodeError> {
        match expr {
            Expr::Null(0) => Ok(None),
            Expr::Null(level) => A::decode_expr(Expr::Null(level - 1)).map(Some),
            other => A::decode_expr(other).map(Some),
        }
    }
}

/// Encode a simple-enum case as its fixed string.
pub fn encode_simple_enum(value: &str) -> Expr {
    Expr::Str(value.to_owned())
}

/// Decode a simple enum from its fixed-string mapping, failing with
/// [`DecodeErrorKind::InvalidEnumValue`] on any string outside the set.
pub fn decode_simple_enum<T: Clone>(
    expr: Expr,
    enum_name: &str,
    values: &[(&str, T)],
) -> Result<T, DecodeError> {
    match expr {
        Expr::Str(s) => values
            .iter()
            .find(|(name, _)| *name == s)
            .map(|(_, value)| value.clone())
            .ok_or_else(|| {
                DecodeError::new(DecodeErrorKind::InvalidEnumValue {
                    enum_name: enum_name.to_owned(),
                    value: s,
                })
            }),
        other => Err(DecodeError::new(DecodeErrorKind::UnexpectedTag {
            expected: [Tag::Str].into(),
            actual: other.tag(),
        })),
    }
}
