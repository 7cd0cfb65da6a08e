//! Assembles wire tokens into [`Expr`] trees.
//!
//! The reader pulls one token at a time from the underlying stream. A
//! constructor-start token opens a frame that accumulates positional
//! arguments until a keyword token (which claims the next expression as its
//! value) or a constructor-end token. Clean end of input between
//! expressions is stream end, not an error; end of input anywhere else is.

use std::io::Read;

use crate::error::SyntaxError;
use crate::expr::Expr;
use crate::pool::StringPool;
use crate::token::{read_token, Token};

/// Reads a sequence of expressions from a byte stream against a pool.
///
/// Implements [`Iterator`] over `Result<Expr, SyntaxError>`; iteration ends
/// at clean end of input.
#[derive(Debug)]
pub struct ExprReader<R> {
    input: R,
    pool: StringPool,
}

impl<R: Read> ExprReader<R> {
    /// A reader resolving pooled names against `pool`.
    pub fn new(input: R, pool: StringPool) -> Self {
        ExprReader { input, pool }
    }

    /// A reader for a self-contained stream: decodes the leading
    /// `string-table` expression against an empty pool, then yields the
    /// payload expressions against the decoded pool.
    pub fn read_embedded(input: R) -> Result<Self, SyntaxError> {
        let mut reader = ExprReader::new(input, StringPool::empty());
        let table = reader.read()?.ok_or(SyntaxError::UnexpectedEof)?;
        reader.pool =
            StringPool::from_expr(table).map_err(|e| SyntaxError::InvalidStringTable(Box::new(e)))?;
        Ok(reader)
    }

    /// The pool in effect for payload expressions.
    pub fn pool(&self) -> &StringPool {
        &self.pool
    }

    /// Read the next expression, or `None` at clean end of input.
    pub fn read(&mut self) -> Result<Option<Expr>, SyntaxError> {
        match read_token(&mut self.input)? {
            None => Ok(None),
            Some(token) => self.read_with(token).map(Some),
        }
    }

    /// Read an expression that must be present (inside a keyword value).
    fn read_required(&mut self) -> Result<Expr, SyntaxError> {
        let token = read_token(&mut self.input)?.ok_or(SyntaxError::UnexpectedEof)?;
        self.read_with(token)
    }

    fn read_with(&mut self, token: Token) -> Result<Expr, SyntaxError> {
        match token {
            Token::ConstructorStart(index) => {
                let name = self.pool.get(index)?.to_owned();
                self.read_constructor(name)
            }
            Token::ConstructorStartKnown(name) => self.read_constructor(name.to_owned()),
            Token::ConstructorEnd => Err(SyntaxError::UnexpectedConstructorEnd),
            Token::Keyword(_) => Err(SyntaxError::UnexpectedKeyword),
            Token::Int(i) => Ok(Expr::Int(i)),
            Token::Str(s) => Ok(Expr::Str(s)),
            Token::StrPool(index) => Ok(Expr::Str(self.pool.get(index)?.to_owned())),
            Token::Binary(b) => Ok(Expr::Binary(b)),
            Token::Float32(f) => Ok(Expr::Float32(f)),
            Token::Float64(f) => Ok(Expr::Float64(f)),
            Token::Bool(b) => Ok(Expr::Bool(b)),
            Token::Null(level) => Ok(Expr::Null(level)),
        }
    }

    fn read_constructor(&mut self, name: String) -> Result<Expr, SyntaxError> {
        let mut args = Vec::new();
        let mut kwargs = std::collections::HashMap::new();

        loop {
            let token = read_token(&mut self.input)?.ok_or(SyntaxError::UnexpectedEof)?;
            match token {
                Token::ConstructorEnd => break,
                Token::Keyword(index) => {
                    let keyword = self.pool.get(index)?.to_owned();
                    let value = self.read_required()?;
                    kwargs.insert(keyword, value);
                }
                other => args.push(self.read_with(other)?),
            }
        }

        Ok(Expr::Constructor { name, args, kwargs })
    }
}

impl<R: Read> Iterator for ExprReader<R> {
    type Item = Result<Expr, SyntaxError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read().transpose()
    }
}
