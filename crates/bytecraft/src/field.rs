//! Field declarations used to build a [crate::schema::Schema].

use std::sync::Arc;

use crate::{kind::ScalarKind, schema::Schema};

/// A single named field declaration. Order of declarations is decode order.
#[derive(Debug, Clone)]
pub struct Field {
    /// Name used in the decoded structure and in rendered output.
    pub name: String,
    /// Element type of the field.
    pub ty: FieldType,
    /// If set, the element is repeated this many times back to back.
    pub array_len: Option<usize>,
}

/// What a field (or each element of an array field) holds.
#[derive(Debug, Clone)]
pub enum FieldType {
    Scalar(ScalarKind),
    /// Another, already defined structure embedded in place.
    Struct(Arc<Schema>),
    /// Opaque run of this many bytes.
    Bytes(usize),
}

impl Field {
    pub fn scalar(name: &str, kind: ScalarKind) -> Self {
        Field {
            name: name.to_string(),
            ty: FieldType::Scalar(kind),
            array_len: None,
        }
    }

    pub fn structure(name: &str, schema: &Arc<Schema>) -> Self {
        Field {
            name: name.to_string(),
            ty: FieldType::Struct(Arc::clone(schema)),
            array_len: None,
        }
    }

    pub fn bytes(name: &str, len: usize) -> Self {
        Field {
            name: name.to_string(),
            ty: FieldType::Bytes(len),
            array_len: None,
        }
    }

    /// Turns the declaration into a fixed-length array of `len` elements.
    pub fn array(mut self, len: usize) -> Self {
        self.array_len = Some(len);
        self
    }
}
