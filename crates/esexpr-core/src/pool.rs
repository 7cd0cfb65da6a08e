//! The string pool backing pooled constructor, keyword, and string tokens.
//!
//! A pool is request-scoped: the writer builds one per write operation and
//! the reader decodes one from the stream's leading `string-table`
//! expression, after which both sides resolve indices against it.

use std::collections::HashMap;

use crate::error::{DecodeError, DecodeErrorKind, EncodeError, SyntaxError};
use crate::expr::{Expr, Tag};
use crate::token::STRING_TABLE_NAME;

/// An ordered, immutable string table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StringPool {
    strings: Vec<String>,
}

impl StringPool {
    /// An empty pool. Used to read and write the embedded table itself,
    /// which cannot reference pool entries.
    pub fn empty() -> Self {
        StringPool::default()
    }

    /// A pool over the given strings, in order.
    pub fn new(strings: Vec<String>) -> Self {
        StringPool { strings }
    }

    /// Resolve an index read from the wire.
    pub fn get(&self, index: usize) -> Result<&str, SyntaxError> {
        self.strings
            .get(index)
            .map(String::as_str)
            .ok_or(SyntaxError::InvalidStringIndex(index))
    }

    /// Find the index of a string to be written.
    pub fn lookup(&self, s: &str) -> Result<usize, EncodeError> {
        self.strings
            .iter()
            .position(|entry| entry == s)
            .ok_or_else(|| EncodeError::StringNotInPool(s.to_owned()))
    }

    /// Number of pooled strings.
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    /// Whether the pool has no entries.
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    /// The pooled strings, in index order.
    pub fn strings(&self) -> &[String] {
        &self.strings
    }

    /// The `string-table` expression carrying this pool's entries as
    /// vararg positional values.
    pub fn to_expr(&self) -> Expr {
        Expr::Constructor {
            name: STRING_TABLE_NAME.to_owned(),
            args: self.strings.iter().cloned().map(Expr::Str).collect(),
            kwargs: HashMap::new(),
        }
    }

    /// Decode a pool from its `string-table` expression shape.
    pub fn from_expr(expr: Expr) -> Result<Self, DecodeError> {
        match expr {
            Expr::Constructor { name, args, kwargs } if name == STRING_TABLE_NAME => {
                if !kwargs.is_empty() {
                    return Err(DecodeError {
                        kind: DecodeErrorKind::UnexpectedArguments {
                            positional: 0,
                            keywords: kwargs.into_keys().collect(),
                        },
                        path: crate::error::DecodePath::Constructor(name),
                    });
                }

                let strings = args
                    .into_iter()
                    .enumerate()
                    .map(|(i, arg)| match arg {
                        Expr::Str(s) => Ok(s),
                        other => Err(DecodeError::new(DecodeErrorKind::UnexpectedTag {
                            expected: [Tag::Str].into(),
                            actual: other.tag(),
                        })
                        .in_positional(STRING_TABLE_NAME, i)),
                    })
                    .collect::<Result<_, _>>()?;

                Ok(StringPool { strings })
            }
            other => Err(DecodeError::new(DecodeErrorKind::UnexpectedTag {
                expected: [Tag::Constructor(STRING_TABLE_NAME.to_owned())].into(),
                actual: other.tag(),
            })),
        }
    }
}

/// Accumulates pool strings in first-encounter order.
///
/// First-encounter order during the writer's depth-first walk is the
/// canonical table ordering: it is deterministic across runs, so encoding
/// the same tree always yields the same bytes.
#[derive(Debug, Default)]
pub struct PoolBuilder {
    strings: Vec<String>,
    indices: HashMap<String, usize>,
}

impl PoolBuilder {
    /// A builder with no entries.
    pub fn new() -> Self {
        PoolBuilder::default()
    }

    /// Return the index of `s`, appending it on first encounter.
    pub fn intern(&mut self, s: &str) -> usize {
        if let Some(&index) = self.indices.get(s) {
            return index;
        }
        let index = self.strings.len();
        self.strings.push(s.to_owned());
        self.indices.insert(s.to_owned(), index);
        index
    }

    /// Freeze the accumulated strings into a pool.
    pub fn build(self) -> StringPool {
        StringPool {
            strings: self.strings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_and_lookup_agree() {
        let pool = StringPool::new(vec!["point".into(), "color".into()]);
        assert_eq!(pool.get(1).unwrap(), "color");
        assert_eq!(pool.lookup("point").unwrap(), 0);
        assert!(matches!(
            pool.get(2),
            Err(SyntaxError::InvalidStringIndex(2))
        ));
        assert!(matches!(
            pool.lookup("missing"),
            Err(EncodeError::StringNotInPool(_))
        ));
    }

    #[test]
    fn builder_keeps_first_encounter_order() {
        let mut builder = PoolBuilder::new();
        assert_eq!(builder.intern("b"), 0);
        assert_eq!(builder.intern("a"), 1);
        assert_eq!(builder.intern("b"), 0);
        assert_eq!(builder.build().strings(), &["b".to_owned(), "a".to_owned()]);
    }

    #[test]
    fn table_expr_roundtrip() {
        let pool = StringPool::new(vec!["x".into(), "y".into()]);
        let expr = pool.to_expr();
        assert!(expr.tag().is_constructor(STRING_TABLE_NAME));
        assert_eq!(StringPool::from_expr(expr).unwrap(), pool);
    }

    #[test]
    fn table_expr_rejects_non_strings() {
        let expr = Expr::Constructor {
            name: STRING_TABLE_NAME.to_owned(),
            args: vec![Expr::Bool(true)],
            kwargs: HashMap::new(),
        };
        assert!(StringPool::from_expr(expr).is_err());
    }
}
