//! JSON-deserializable structure definitions.
//!
//! These types describe the *shape* of fixed-layout structures. They are
//! intended to be read from JSON (for example a schema file shipped with
//! your application) and then compiled by [crate::registry::Registry].

use serde::{Deserialize, Serialize};

use crate::kind::ScalarKind;

/// Top-level document: every structure the registry should define.
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct SchemaDefs {
    pub structures: Vec<StructureDef>,
}

/// One named structure type.
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct StructureDef {
    pub name: String,
    /// Fields in decode order.
    pub fields: Vec<FieldDef>,
}

/// Description of a single field.
///
/// Exactly one of `kind`, `structure` or `bytes` must be set. Unknown keys
/// (such as a misspelled `length`) are rejected.
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct FieldDef {
    pub name: String,
    /// Primitive scalar kind.
    #[serde(default)]
    pub kind: Option<ScalarKind>,
    /// Name of another structure in the same document.
    #[serde(default)]
    pub structure: Option<String>,
    /// Length of an opaque byte run.
    #[serde(default)]
    pub bytes: Option<usize>,
    /// Repeat the element this many times.
    #[serde(default)]
    pub length: Option<usize>,
}
