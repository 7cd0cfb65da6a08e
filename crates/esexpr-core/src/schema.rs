//! Declarative shapes for records and unions, validated when defined.
//!
//! The combination rules for field modifiers and union cases are schema
//! properties, not runtime ones: a codec whose shape violates them is
//! rejected here, when the shape is constructed, and decode never re-checks
//! them. Codecs typically build their shape once (for example in a
//! `std::sync::LazyLock`) and fail fast if it is invalid.

use std::collections::HashMap;
use std::collections::HashSet;

use crate::error::SchemaError;
use crate::expr::Tag;

/// How a field participates in argument assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Consumes one value from the front of the positional queue.
    Positional,
    /// Consumes one positional value when present.
    OptionalPositional,
    /// Consumes all remaining positional values.
    Vararg,
    /// Consumes one named keyword argument.
    Keyword,
    /// Consumes one named keyword argument when present.
    OptionalKeyword,
    /// Consumes one named keyword argument, substituting a default when
    /// absent.
    DefaultKeyword,
    /// Consumes all remaining keyword arguments.
    Dict,
}

impl FieldKind {
    fn is_keyword(self) -> bool {
        matches!(
            self,
            FieldKind::Keyword | FieldKind::OptionalKeyword | FieldKind::DefaultKeyword
        )
    }
}

/// One field declaration. For keyword kinds, `name` is the wire keyword;
/// for positional kinds it is diagnostic only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDecl {
    /// Field name.
    pub name: &'static str,
    /// Assignment behavior.
    pub kind: FieldKind,
}

impl FieldDecl {
    /// A field declaration.
    pub fn new(name: &'static str, kind: FieldKind) -> Self {
        FieldDecl { name, kind }
    }
}

/// A validated record shape: a constructor name and its ordered fields.
#[derive(Debug, Clone)]
pub struct RecordShape {
    constructor: String,
    fields: Vec<FieldDecl>,
}

impl RecordShape {
    /// Validate and build a record shape, enforcing the field ordering
    /// rules: positionals precede the single vararg, required positionals
    /// precede optional ones, keywords precede the single dict, and keyword
    /// names are unique.
    pub fn new(
        constructor: impl Into<String>,
        fields: Vec<FieldDecl>,
    ) -> Result<Self, SchemaError> {
        let mut seen_vararg = false;
        let mut seen_dict = false;
        let mut seen_optional_positional = false;
        let mut keyword_names = HashSet::new();

        for field in &fields {
            match field.kind {
                FieldKind::Positional => {
                    if seen_vararg {
                        return Err(SchemaError::PositionalAfterVararg);
                    }
                    if seen_optional_positional {
                        return Err(SchemaError::RequiredAfterOptionalPositional);
                    }
                }
                FieldKind::OptionalPositional => {
                    if seen_vararg {
                        return Err(SchemaError::PositionalAfterVararg);
                    }
                    if seen_optional_positional {
                        return Err(SchemaError::MultipleOptionalPositional);
                    }
                    seen_optional_positional = true;
                }
                FieldKind::Vararg => {
                    if seen_vararg {
                        return Err(SchemaError::MultipleVararg);
                    }
                    if seen_optional_positional {
                        return Err(SchemaError::VarargAfterOptionalPositional);
                    }
                    seen_vararg = true;
                }
                FieldKind::Keyword | FieldKind::OptionalKeyword | FieldKind::DefaultKeyword => {
                    if seen_dict {
                        return Err(SchemaError::KeywordAfterDict);
                    }
                    if !keyword_names.insert(field.name) {
                        return Err(SchemaError::DuplicateKeyword(field.name.to_owned()));
                    }
                }
                FieldKind::Dict => {
                    if seen_dict {
                        return Err(SchemaError::MultipleDict);
                    }
                    seen_dict = true;
                }
            }
        }

        Ok(RecordShape {
            constructor: constructor.into(),
            fields,
        })
    }

    /// The constructor name.
    pub fn constructor(&self) -> &str {
        &self.constructor
    }

    /// The declared fields, in order.
    pub fn fields(&self) -> &[FieldDecl] {
        &self.fields
    }

    /// The keyword fields' wire names, in declaration order.
    pub fn keyword_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields
            .iter()
            .filter(|f| f.kind.is_keyword())
            .map(|f| f.name)
    }
}

/// One union case and the tags it claims.
///
/// A normal case claims exactly `Tag::Constructor(case-name)`; an
/// inline-value case claims whatever its single field's codec claims. In
/// this shape-based rendition an inline case is defined by exactly one
/// codec, so the one-field rule holds by construction.
#[derive(Debug, Clone)]
pub struct CaseShape {
    /// Case name, for diagnostics.
    pub name: String,
    /// The tag set this case decodes.
    pub tags: HashSet<Tag>,
}

impl CaseShape {
    /// A case claiming the given tags.
    pub fn new(name: impl Into<String>, tags: HashSet<Tag>) -> Self {
        CaseShape {
            name: name.into(),
            tags,
        }
    }

    /// A normal case claiming its own constructor tag.
    pub fn constructor(name: impl Into<String>) -> Self {
        let name = name.into();
        let tags = [Tag::Constructor(name.clone())].into();
        CaseShape { name, tags }
    }
}

/// A validated union: a closed case list with mutually exclusive tag sets
/// and a dispatch table built once at definition time.
#[derive(Debug, Clone)]
pub struct UnionShape {
    cases: Vec<CaseShape>,
    table: HashMap<Tag, usize>,
}

impl UnionShape {
    /// Validate and build a union shape. Overlapping case tag sets and
    /// empty unions are rejected.
    pub fn new(cases: Vec<CaseShape>) -> Result<Self, SchemaError> {
        if cases.is_empty() {
            return Err(SchemaError::EmptyUnion);
        }

        let mut table = HashMap::new();
        for (index, case) in cases.iter().enumerate() {
            for tag in &case.tags {
                if table.insert(tag.clone(), index).is_some() {
                    return Err(SchemaError::OverlappingCaseTags {
                        case: case.name.clone(),
                        tag: tag.clone(),
                    });
                }
            }
        }

        Ok(UnionShape { cases, table })
    }

    /// The index of the case claiming `tag`, if any. Disjointness makes
    /// this equivalent to a declaration-order scan.
    pub fn select(&self, tag: &Tag) -> Option<usize> {
        self.table.get(tag).copied()
    }

    /// The case at `index`.
    pub fn case(&self, index: usize) -> &CaseShape {
        &self.cases[index]
    }

    /// All tags claimed by any case — the union's own codec tag set.
    pub fn tags(&self) -> HashSet<Tag> {
        self.table.keys().cloned().collect()
    }
}
