//! Error types for schema definition and decoding.

use thiserror::Error;

/// Why a field declaration was rejected by [crate::schema::Schema::define].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefinitionReason {
    /// Field name is empty.
    EmptyName,
    /// Another field of the same schema already uses this name.
    DuplicateName,
    /// Array length is zero.
    InvalidArrayLength,
    /// Computed size is zero or does not fit in `usize`.
    InvalidFieldSize,
    /// Computed wire-format tag is empty.
    EmptyFormat,
    /// Field shape is not supported (e.g. an array of opaque byte runs, or no type at all).
    InvalidFieldKind,
    /// Field declares both a scalar kind and a nested structure.
    ConflictingInterpretation,
    /// Nested structure reference does not name a defined schema.
    UnknownStructure(String),
    /// Nested structure references form a cycle.
    CyclicStructure(String),
    /// A structure with this name is already defined.
    DuplicateStructure,
    /// Nested structures go deeper than [crate::schema::MAX_NESTING_DEPTH] levels.
    NestingTooDeep,
}

impl std::fmt::Display for DefinitionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DefinitionReason::EmptyName => f.write_str("fields must have names"),
            DefinitionReason::DuplicateName => f.write_str("field name is already used"),
            DefinitionReason::InvalidArrayLength => f.write_str("cannot have an array length of 0"),
            DefinitionReason::InvalidFieldSize => f.write_str("field size resolved to 0 or overflowed"),
            DefinitionReason::EmptyFormat => f.write_str("format resolved to empty string"),
            DefinitionReason::InvalidFieldKind => f.write_str("unsupported field kind"),
            DefinitionReason::ConflictingInterpretation => {
                f.write_str("conflicting scalar kind and structure")
            }
            DefinitionReason::UnknownStructure(name) => write!(f, "unknown structure `{name}`"),
            DefinitionReason::CyclicStructure(name) => {
                write!(f, "structure `{name}` contains itself")
            }
            DefinitionReason::DuplicateStructure => f.write_str("structure is already defined"),
            DefinitionReason::NestingTooDeep => write!(
                f,
                "nested structures exceed {} levels",
                crate::schema::MAX_NESTING_DEPTH
            ),
        }
    }
}

/// A field declaration that cannot be compiled. Raised once, when the structure type is defined.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("`{schema}.{field}` is not a valid structure field: {reason}")]
pub struct SchemaDefinitionError {
    /// Structure being defined.
    pub schema: String,
    /// Offending field (or structure, for registry-level errors).
    pub field: String,
    pub reason: DefinitionReason,
}

impl SchemaDefinitionError {
    pub fn new(schema: &str, field: &str, reason: DefinitionReason) -> Self {
        Self {
            schema: schema.to_string(),
            field: field.to_string(),
            reason,
        }
    }
}

/// Input buffer length does not match the schema size (see [crate::schema::Schema::decode]).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("structure `{schema}` requires exactly {expected} bytes, but {actual} were provided")]
pub struct LayoutError {
    pub schema: String,
    pub expected: usize,
    pub actual: usize,
}
