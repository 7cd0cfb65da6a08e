//! JSON fixture form for test vectors.
//!
//! A human-readable rendering of [`Expr`] used to cross-check wire-format
//! vectors between implementations. It is informational only and not part
//! of the wire contract:
//!
//! - constructors: `{"constructor_name": "...", "args": [...], "kwargs": {...}}`
//!   (`args`/`kwargs` may be omitted on input)
//! - integers: `{"int": "<decimal digits>"}` (string, so precision is kept)
//! - floats: `{"float32": n}` / `{"float64": n}`
//! - binary: `{"base64": "..."}` (standard alphabet, padded)
//! - null: `{"null": level}`
//! - booleans and strings: bare JSON values

use std::collections::HashMap;

use base64::prelude::BASE64_STANDARD;
use base64::Engine;
use num_bigint::BigInt;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::expr::Expr;

/// A failure converting between the fixture form and an expression.
#[derive(Error, Debug)]
pub enum FixtureError {
    /// The input was not valid JSON, or matched no fixture shape.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// An `int` wrapper whose payload is not a decimal integer.
    #[error("invalid integer literal \"{0}\"")]
    InvalidInt(String),

    /// A `base64` wrapper whose payload does not decode.
    #[error("invalid base64 payload")]
    InvalidBase64(#[from] base64::DecodeError),
}

/// The serde face of the fixture form. Variant order matters: serde tries
/// untagged variants first to last, and the wrapper objects must win over
/// the bare-value variants.
#[derive(Serialize, Deserialize, Debug, PartialEq)]
#[serde(untagged)]
enum Fixture {
    Constructor {
        constructor_name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        args: Option<Vec<Fixture>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        kwargs: Option<HashMap<String, Fixture>>,
    },
    Int {
        int: String,
    },
    Float32 {
        float32: f32,
    },
    Float64 {
        float64: f64,
    },
    Binary {
        base64: String,
    },
    Null {
        null: u32,
    },
    Bool(bool),
    Str(String),
}

impl Fixture {
    fn from_expr(expr: &Expr) -> Fixture {
        match expr {
            Expr::Constructor { name, args, kwargs } => Fixture::Constructor {
                constructor_name: name.clone(),
                args: Some(args.iter().map(Fixture::from_expr).collect()),
                kwargs: Some(
                    kwargs
                        .iter()
                        .map(|(k, v)| (k.clone(), Fixture::from_expr(v)))
                        .collect(),
                ),
            },
            Expr::Bool(b) => Fixture::Bool(*b),
            Expr::Int(i) => Fixture::Int { int: i.to_string() },
            Expr::Str(s) => Fixture::Str(s.clone()),
            Expr::Binary(b) => Fixture::Binary {
                base64: BASE64_STANDARD.encode(b),
            },
            Expr::Float32(f) => Fixture::Float32 { float32: *f },
            Expr::Float64(f) => Fixture::Float64 { float64: *f },
            Expr::Null(level) => Fixture::Null { null: *level },
        }
    }

    fn into_expr(self) -> Result<Expr, FixtureError> {
        Ok(match self {
            Fixture::Constructor {
                constructor_name,
                args,
                kwargs,
            } => Expr::Constructor {
                name: constructor_name,
                args: args
                    .unwrap_or_default()
                    .into_iter()
                    .map(Fixture::into_expr)
                    .collect::<Result<_, _>>()?,
                kwargs: kwargs
                    .unwrap_or_default()
                    .into_iter()
                    .map(|(k, v)| Ok((k, v.into_expr()?)))
                    .collect::<Result<_, FixtureError>>()?,
            },
            Fixture::Int { int } => Expr::Int(
                int.parse::<BigInt>()
                    .map_err(|_| FixtureError::InvalidInt(int))?,
            ),
            Fixture::Float32 { float32 } => Expr::Float32(float32),
            Fixture::Float64 { float64 } => Expr::Float64(float64),
            Fixture::Binary { base64 } => Expr::Binary(BASE64_STANDARD.decode(base64)?),
            Fixture::Null { null } => Expr::Null(null),
            Fixture::Bool(b) => Expr::Bool(b),
            Fixture::Str(s) => Expr::Str(s),
        })
    }
}

/// Render an expression in the fixture form.
pub fn to_json(expr: &Expr) -> serde_json::Value {
    serde_json::to_value(Fixture::from_expr(expr)).expect("fixture form is always valid JSON")
}

/// Render an expression as a fixture JSON string.
pub fn to_json_string(expr: &Expr) -> String {
    to_json(expr).to_string()
}

/// Read an expression from its fixture form.
pub fn from_json(value: serde_json::Value) -> Result<Expr, FixtureError> {
    let fixture: Fixture = serde_json::from_value(value)?;
    fixture.into_expr()
}

/// Read an expression from a fixture JSON string.
pub fn from_json_str(s: &str) -> Result<Expr, FixtureError> {
    let fixture: Fixture = serde_json::from_str(s)?;
    fixture.into_expr()
}
