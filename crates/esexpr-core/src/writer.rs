//! Serializes [`Expr`] trees into wire tokens.
//!
//! Writing is depth-first: constructor token, each positional argument,
//! each keyword token followed by its value, then the end token. The two
//! built-in constructor names always use their fixed single-byte tokens;
//! every other constructor or keyword name must already be in the active
//! pool or writing fails with [`EncodeError::StringNotInPool`].

use std::io::Write;

use crate::error::EncodeError;
use crate::expr::Expr;
use crate::pool::{PoolBuilder, StringPool};
use crate::token::{write_token, Token, LIST_NAME, STRING_TABLE_NAME};

/// Write one expression against an explicit pool.
pub fn write_expr<W: Write>(out: &mut W, pool: &StringPool, expr: &Expr) -> Result<(), EncodeError> {
    match expr {
        Expr::Constructor { name, args, kwargs } => {
            match name.as_str() {
                STRING_TABLE_NAME => write_token(out, &Token::ConstructorStartKnown(STRING_TABLE_NAME))?,
                LIST_NAME => write_token(out, &Token::ConstructorStartKnown(LIST_NAME))?,
                other => write_token(out, &Token::ConstructorStart(pool.lookup(other)?))?,
            }

            for arg in args {
                write_expr(out, pool, arg)?;
            }

            for (keyword, value) in kwargs {
                write_token(out, &Token::Keyword(pool.lookup(keyword)?))?;
                write_expr(out, pool, value)?;
            }

            write_token(out, &Token::ConstructorEnd)?;
        }
        Expr::Bool(b) => write_token(out, &Token::Bool(*b))?,
        Expr::Int(i) => write_token(out, &Token::Int(i.clone()))?,
        Expr::Str(s) => write_token(out, &Token::Str(s.clone()))?,
        Expr::Binary(b) => write_token(out, &Token::Binary(b.clone()))?,
        Expr::Float32(f) => write_token(out, &Token::Float32(*f))?,
        Expr::Float64(f) => write_token(out, &Token::Float64(*f))?,
        Expr::Null(level) => write_token(out, &Token::Null(*level))?,
    }

    Ok(())
}

/// Build the pool an expression set needs: every non-builtin constructor
/// name and every keyword name, in first-encounter order over a depth-first
/// walk (constructor name, then args, then each keyword name before its
/// value).
pub fn build_pool<'a>(exprs: impl IntoIterator<Item = &'a Expr>) -> StringPool {
    let mut builder = PoolBuilder::new();
    for expr in exprs {
        collect_symbols(expr, &mut builder);
    }
    builder.build()
}

fn collect_symbols(expr: &Expr, builder: &mut PoolBuilder) {
    if let Expr::Constructor { name, args, kwargs } = expr {
        if name != STRING_TABLE_NAME && name != LIST_NAME {
            builder.intern(name);
        }

        for arg in args {
            collect_symbols(arg, builder);
        }

        for (keyword, value) in kwargs {
            builder.intern(keyword);
            collect_symbols(value, builder);
        }
    }
}

/// Write a self-contained stream: the pool's `string-table` expression
/// encoded against an empty pool, then each payload expression encoded
/// against that pool.
pub fn write_embedded<'a, W: Write>(
    out: &mut W,
    exprs: impl IntoIterator<Item = &'a Expr> + Clone,
) -> Result<(), EncodeError> {
    let pool = build_pool(exprs.clone());
    write_expr(out, &StringPool::empty(), &pool.to_expr())?;
    for expr in exprs {
        write_expr(out, &pool, expr)?;
    }
    Ok(())
}
