//! The field codec protocol: assembling and disassembling constructor
//! arguments field by field.
//!
//! Decoding a structured value owns a [`ConstructorArgs`] state — a queue
//! of remaining positional arguments and a map of remaining keyword
//! arguments — which each field operation consumes from in order. The state
//! belongs to exactly one decode call; there is no shared or global cursor.
//! After the last field, [`ConstructorArgs::finish`] rejects anything left
//! over.
//!
//! Encoding mirrors this with [`ConstructorBuilder`], which applies the
//! omission rules for optional and default-valued fields.

use std::collections::{HashMap, VecDeque};

use crate::codec::ESExprCodec;
use crate::error::{DecodeError, DecodeErrorKind, DecodePath};
use crate::expr::{Expr, Tag};

/// Field-level protocol for optional fields: absence of the underlying
/// expression maps to an explicit "no value" instead of failing, and an
/// absent value is omitted from the output entirely (never emitted as a
/// null).
pub trait OptionalFieldCodec: Sized {
    /// Encode the field, or `None` when it should be omitted.
    fn encode_optional_field(self) -> Option<Expr>;

    /// Decode the field from a present or absent expression.
    fn decode_optional_field(value: Option<Expr>) -> Result<Self, DecodeError>;
}

impl<A: ESExprCodec> OptionalFieldCodec for Option<A> {
    fn encode_optional_field(self) -> Option<Expr> {
        self.map(A::encode_expr)
    }

    fn decode_optional_field(value: Option<Expr>) -> Result<Self, DecodeError> {
        value.map(A::decode_expr).transpose()
    }
}

/// Field-level protocol for the vararg field, which owns every remaining
/// positional argument.
pub trait VarargFieldCodec: Sized {
    /// Append each element to the positional argument list.
    fn encode_vararg_field(self, args: &mut Vec<Expr>);

    /// Decode from all remaining positional arguments. `start_index` is the
    /// position of the first element, for error paths.
    fn decode_vararg_field(
        args: &mut VecDeque<Expr>,
        constructor: &str,
        start_index: usize,
    ) -> Result<Self, DecodeError>;
}

impl<A: ESExprCodec> VarargFieldCodec for Vec<A> {
    fn encode_vararg_field(self, args: &mut Vec<Expr>) {
        args.extend(self.into_iter().map(A::encode_expr));
    }

    fn decode_vararg_field(
        args: &mut VecDeque<Expr>,
        constructor: &str,
        start_index: usize,
    ) -> Result<Self, DecodeError> {
        args.drain(..)
            .enumerate()
            .map(|(i, arg)| {
                A::decode_expr(arg).map_err(|e| e.in_positional(constructor, start_index + i))
            })
            .collect()
    }
}

/// Field-level protocol for the dict field, which owns every remaining
/// keyword argument.
pub trait DictFieldCodec: Sized {
    /// Merge each entry into the keyword argument map.
    fn encode_dict_field(self, kwargs: &mut HashMap<String, Expr>);

    /// Decode from all remaining keyword arguments.
    fn decode_dict_field(
        kwargs: &mut HashMap<String, Expr>,
        constructor: &str,
    ) -> Result<Self, DecodeError>;
}

impl<A: ESExprCodec> DictFieldCodec for HashMap<String, A> {
    fn encode_dict_field(self, kwargs: &mut HashMap<String, Expr>) {
        kwargs.extend(self.into_iter().map(|(k, v)| (k, v.encode_expr())));
    }

    fn decode_dict_field(
        kwargs: &mut HashMap<String, Expr>,
        constructor: &str,
    ) -> Result<Self, DecodeError> {
        kwargs
            .drain()
            .map(|(k, v)| {
                let value = A::decode_expr(v).map_err(|e| e.in_keyword(constructor, &k))?;
                Ok((k, value))
            })
            .collect()
    }
}

/// The decode state for one constructor: the remaining positional queue and
/// keyword map, consumed field by field.
#[derive(Debug)]
pub struct ConstructorArgs {
    name: String,
    args: VecDeque<Expr>,
    kwargs: HashMap<String, Expr>,
    next_positional: usize,
}

impl ConstructorArgs {
    /// Open a constructor expression with the expected name. Any other
    /// expression is an [`DecodeErrorKind::UnexpectedTag`] error.
    pub fn take(expr: Expr, expected_name: &str) -> Result<Self, DecodeError> {
        match expr {
            Expr::Constructor { name, args, kwargs } if name == expected_name => {
                Ok(ConstructorArgs {
                    name,
                    args: args.into(),
                    kwargs,
                    next_positional: 0,
                })
            }
            other => Err(DecodeError::new(DecodeErrorKind::UnexpectedTag {
                expected: [Tag::Constructor(expected_name.to_owned())].into(),
                actual: other.tag(),
            })),
        }
    }

    /// The constructor name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Consume one required positional argument.
    pub fn positional<T: ESExprCodec>(&mut self) -> Result<T, DecodeError> {
        let index = self.next_positional;
        match self.args.pop_front() {
            Some(arg) => {
                self.next_positional += 1;
                T::decode_expr(arg).map_err(|e| e.in_positional(&self.name, index))
            }
            None => Err(DecodeError {
                kind: DecodeErrorKind::MissingPositional,
                path: DecodePath::Constructor(self.name.clone()),
            }),
        }
    }

    /// Consume one positional argument if present; absence decodes through
    /// the optional-field protocol.
    pub fn optional_positional<T: OptionalFieldCodec>(&mut self) -> Result<T, DecodeError> {
        let index = self.next_positional;
        let value = self.args.pop_front();
        if value.is_some() {
            self.next_positional += 1;
        }
        T::decode_optional_field(value).map_err(|e| e.in_positional(&self.name, index))
    }

    /// Consume every remaining positional argument.
    pub fn vararg<T: VarargFieldCodec>(&mut self) -> Result<T, DecodeError> {
        let start = self.next_positional;
        self.next_positional += self.args.len();
        T::decode_vararg_field(&mut self.args, &self.name, start)
    }

    /// Consume one required keyword argument.
    pub fn keyword<T: ESExprCodec>(&mut self, name: &str) -> Result<T, DecodeError> {
        match self.kwargs.remove(name) {
            Some(value) => T::decode_expr(value).map_err(|e| e.in_keyword(&self.name, name)),
            None => Err(DecodeError {
                kind: DecodeErrorKind::MissingKeyword(name.to_owned()),
                path: DecodePath::Constructor(self.name.clone()),
            }),
        }
    }

    /// Consume a keyword argument if present; absence decodes through the
    /// optional-field protocol.
    pub fn optional_keyword<T: OptionalFieldCodec>(&mut self, name: &str) -> Result<T, DecodeError> {
        T::decode_optional_field(self.kwargs.remove(name))
            .map_err(|e| e.in_keyword(&self.name, name))
    }

    /// Consume a keyword argument if present; absence yields the supplied
    /// default.
    pub fn keyword_or<T: ESExprCodec>(&mut self, name: &str, default: T) -> Result<T, DecodeError> {
        match self.kwargs.remove(name) {
            Some(value) => T::decode_expr(value).map_err(|e| e.in_keyword(&self.name, name)),
            None => Ok(default),
        }
    }

    /// Consume every remaining keyword argument.
    pub fn dict<T: DictFieldCodec>(&mut self) -> Result<T, DecodeError> {
        T::decode_dict_field(&mut self.kwargs, &self.name)
    }

    /// Assert that every argument was consumed. Leftover positional or
    /// keyword entries are a decode error.
    pub fn finish(self) -> Result<(), DecodeError> {
        if self.args.is_empty() && self.kwargs.is_empty() {
            return Ok(());
        }

        let mut keywords: Vec<String> = self.kwargs.into_keys().collect();
        keywords.sort();
        Err(DecodeError {
            kind: DecodeErrorKind::UnexpectedArguments {
                positional: self.args.len(),
                keywords,
            },
            path: DecodePath::Constructor(self.name),
        })
    }
}

/// The encode-side mirror of [`ConstructorArgs`]: assembles a constructor
/// expression field by field, applying the omission rules.
#[derive(Debug)]
pub struct ConstructorBuilder {
    name: String,
    args: Vec<Expr>,
    kwargs: HashMap<String, Expr>,
}

impl ConstructorBuilder {
    /// Start a constructor with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        ConstructorBuilder {
            name: name.into(),
            args: Vec::new(),
            kwargs: HashMap::new(),
        }
    }

    /// Append one positional argument.
    pub fn positional<T: ESExprCodec>(mut self, value: T) -> Self {
        self.args.push(value.encode_expr());
        self
    }

    /// Append a positional argument, or nothing when the value is absent.
    pub fn optional_positional<T: OptionalFieldCodec>(mut self, value: T) -> Self {
        if let Some(expr) = value.encode_optional_field() {
            self.args.push(expr);
        }
        self
    }

    /// Append every element as a positional argument.
    pub fn vararg<T: VarargFieldCodec>(mut self, value: T) -> Self {
        value.encode_vararg_field(&mut self.args);
        self
    }

    /// Add one keyword argument.
    pub fn keyword<T: ESExprCodec>(mut self, name: &str, value: T) -> Self {
        self.kwargs.insert(name.to_owned(), value.encode_expr());
        self
    }

    /// Add a keyword argument, or nothing when the value is absent.
    pub fn optional_keyword<T: OptionalFieldCodec>(mut self, name: &str, value: T) -> Self {
        if let Some(expr) = value.encode_optional_field() {
            self.kwargs.insert(name.to_owned(), expr);
        }
        self
    }

    /// Add a keyword argument only when the value differs from its declared
    /// default, keeping default-valued fields off the wire.
    pub fn keyword_or<T: ESExprCodec + PartialEq>(mut self, name: &str, value: T, default: T) -> Self {
        if value != default {
            self.kwargs.insert(name.to_owned(), value.encode_expr());
        }
        self
    }

    /// Merge every entry as a keyword argument.
    pub fn dict<T: DictFieldCodec>(mut self, value: T) -> Self {
        value.encode_dict_field(&mut self.kwargs);
        self
    }

    /// Finish the constructor expression.
    pub fn build(self) -> Expr {
        Expr::Constructor {
            name: self.name,
            args: self.args,
            kwargs: self.kwargs,
        }
    }
}
