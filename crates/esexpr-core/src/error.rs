//! Error types for the wire layer, the codec layer, and schema definition.
//!
//! The three failure classes are deliberately separate types:
//!
//! - [`SyntaxError`] — the byte stream itself is malformed. Fatal to the
//!   stream; the reader cannot resynchronize.
//! - [`EncodeError`] — a tree could not be written (pool misses, I/O).
//! - [`DecodeError`] — a well-formed tree does not match the expected
//!   schema. Carries a [`DecodePath`] locating the failure for diagnostics.
//! - [`SchemaError`] — an invalid combination of field modifiers or union
//!   cases, rejected when a shape is defined, never during decode.

use std::collections::HashSet;

use thiserror::Error;

use crate::expr::Tag;

/// A malformed byte stream.
#[derive(Error, Debug)]
pub enum SyntaxError {
    /// A byte in the fixed-token block that names no token.
    #[error("invalid token byte 0x{0:02X}")]
    InvalidTokenByte(u8),

    /// The stream ended inside a token or constructor frame.
    #[error("unexpected end of stream")]
    UnexpectedEof,

    /// A string-pool index with no entry.
    #[error("string pool index {0} out of range")]
    InvalidStringIndex(usize),

    /// A length or level too large for this platform.
    #[error("length or level out of range")]
    InvalidLength,

    /// A keyword token outside a constructor frame.
    #[error("keyword token outside a constructor")]
    UnexpectedKeyword,

    /// A constructor-end token outside a constructor frame.
    #[error("constructor end without matching start")]
    UnexpectedConstructorEnd,

    /// Inline string bytes that are not valid UTF-8.
    #[error("invalid UTF-8 in string value")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    /// The embedded string table failed to decode.
    #[error("invalid embedded string table: {0}")]
    InvalidStringTable(#[source] Box<DecodeError>),

    /// An error in the underlying stream.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A failure while writing an expression.
#[derive(Error, Debug)]
pub enum EncodeError {
    /// A constructor or keyword name missing from the active pool.
    #[error("string \"{0}\" not present in string pool")]
    StringNotInPool(String),

    /// An error in the underlying stream.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A well-formed expression that does not match the expected schema.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{kind} (at {path})")]
pub struct DecodeError {
    /// What went wrong.
    pub kind: DecodeErrorKind,
    /// Where in the tree it went wrong.
    pub path: DecodePath,
}

impl DecodeError {
    /// A decode error at the current position, with no enclosing frame.
    pub fn new(kind: DecodeErrorKind) -> Self {
        DecodeError {
            kind,
            path: DecodePath::Current,
        }
    }

    /// Wrap this error's path in a positional-argument frame.
    pub fn in_positional(mut self, constructor: &str, index: usize) -> Self {
        self.path = DecodePath::Positional(constructor.to_owned(), index, Box::new(self.path));
        self
    }

    /// Wrap this error's path in a keyword-argument frame.
    pub fn in_keyword(mut self, constructor: &str, keyword: &str) -> Self {
        self.path = DecodePath::Keyword(
            constructor.to_owned(),
            keyword.to_owned(),
            Box::new(self.path),
        );
        self
    }
}

/// The kind of schema mismatch encountered while decoding.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecodeErrorKind {
    /// The expression's tag is not in the expected set.
    #[error("unexpected {actual}, expected one of: {}", format_tags(expected))]
    UnexpectedTag {
        /// The tags the codec accepts.
        expected: HashSet<Tag>,
        /// The tag actually seen.
        actual: Tag,
    },

    /// A value outside the representable range of the target type.
    #[error("value out of range: {0}")]
    OutOfRange(String),

    /// A required keyword argument was absent.
    #[error("missing keyword argument \"{0}\"")]
    MissingKeyword(String),

    /// A required positional argument was absent.
    #[error("not enough positional arguments")]
    MissingPositional,

    /// Arguments remained after every field was assigned.
    #[error("unexpected extra arguments: {positional} positional, keywords [{}]", keywords.join(", "))]
    UnexpectedArguments {
        /// Count of unconsumed positional arguments.
        positional: usize,
        /// Names of unconsumed keyword arguments.
        keywords: Vec<String>,
    },

    /// A string not in a simple enum's value set.
    #[error("invalid value for simple enum {enum_name}: \"{value}\"")]
    InvalidEnumValue {
        /// The enum being decoded.
        enum_name: String,
        /// The offending string.
        value: String,
    },
}

fn format_tags(tags: &HashSet<Tag>) -> String {
    if tags.is_empty() {
        return "(any)".to_owned();
    }
    let mut names: Vec<String> = tags.iter().map(Tag::to_string).collect();
    names.sort();
    names.join(", ")
}

/// The location of a decode failure, innermost frame last.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodePath {
    /// At the value currently being decoded.
    Current,
    /// Directly inside the named constructor.
    Constructor(String),
    /// Under positional argument `index` of the named constructor.
    Positional(String, usize, Box<DecodePath>),
    /// Under the named keyword argument of the named constructor.
    Keyword(String, String, Box<DecodePath>),
}

impl std::fmt::Display for DecodePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecodePath::Current => f.write_str("value"),
            DecodePath::Constructor(name) => write!(f, "constructor \"{}\"", name),
            DecodePath::Positional(name, index, inner) => {
                write!(f, "constructor \"{}\" argument {} > {}", name, index, inner)
            }
            DecodePath::Keyword(name, kw, inner) => {
                write!(f, "constructor \"{}\" keyword \"{}\" > {}", name, kw, inner)
            }
        }
    }
}

/// An invalid schema shape, reported when the shape is defined.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// A positional field declared after the vararg field.
    #[error("positional fields must precede the vararg field")]
    PositionalAfterVararg,

    /// More than one vararg field.
    #[error("at most one vararg field is allowed")]
    MultipleVararg,

    /// A required positional field after an optional or defaulted one.
    #[error("required positional fields cannot follow optional ones")]
    RequiredAfterOptionalPositional,

    /// More than one optional positional field.
    #[error("at most one optional positional field is allowed")]
    MultipleOptionalPositional,

    /// A vararg field after an optional positional field.
    #[error("the vararg field cannot follow an optional positional field")]
    VarargAfterOptionalPositional,

    /// A keyword field declared after the dict field.
    #[error("keyword fields must precede the dict field")]
    KeywordAfterDict,

    /// More than one dict field.
    #[error("at most one dict field is allowed")]
    MultipleDict,

    /// Two keyword fields sharing a name.
    #[error("duplicate keyword \"{0}\"")]
    DuplicateKeyword(String),

    /// Two union cases claiming the same tag.
    #[error("union case \"{case}\" overlaps an earlier case on tag {tag}")]
    OverlappingCaseTags {
        /// The later of the two conflicting cases.
        case: String,
        /// The tag claimed twice.
        tag: Tag,
    },

    /// A union with no cases.
    #[error("a union must declare at least one case")]
    EmptyUnion,
}
