use std::sync::Arc;

use crate::{
    bits::sign_extend,
    errors::{DefinitionReason, LayoutError},
    field::{Field, FieldType},
    kind::ScalarKind,
    schema::Schema,
    value::Value,
};

/// Layout of one field: where it lives in the structure and how to decode it.
#[derive(Debug, Clone)]
pub struct CompiledField {
    pub name: String,
    /// Byte offset from the start of the structure.
    pub offset: usize,
    /// Total size in bytes, including every array element.
    pub size: usize,
    /// Wire-format tag.
    pub format: String,
    pub shape: FieldShape,
}

/// The four field shapes a schema can hold.
#[derive(Debug, Clone)]
pub enum FieldShape {
    Scalar(ScalarKind),
    Struct(Arc<Schema>),
    Array(CompiledArray),
    Bytes(usize),
}

#[derive(Debug, Clone)]
pub struct CompiledArray {
    pub element: Element,
    pub len: usize,
}

/// Element type of an array field.
#[derive(Debug, Clone)]
pub enum Element {
    Scalar(ScalarKind),
    Struct(Arc<Schema>),
}

impl Element {
    pub fn size(&self) -> usize {
        match self {
            Element::Scalar(kind) => kind.size(),
            Element::Struct(schema) => schema.size(),
        }
    }

    fn decode(&self, data: &[u8]) -> Result<Value, LayoutError> {
        match self {
            Element::Scalar(kind) => Ok(read_scalar(*kind, data)),
            Element::Struct(schema) => Ok(Value::Struct(Schema::decode(schema, data)?)),
        }
    }
}

impl TryFrom<&Field> for CompiledField {
    type Error = DefinitionReason;

    fn try_from(value: &Field) -> Result<Self, Self::Error> {
        if value.name.is_empty() {
            return Err(DefinitionReason::EmptyName);
        }

        let (size, shape) = match (&value.ty, value.array_len) {
            (_, Some(0)) => return Err(DefinitionReason::InvalidArrayLength),
            (FieldType::Scalar(kind), None) => (Some(kind.size()), FieldShape::Scalar(*kind)),
            (FieldType::Struct(schema), None) => {
                (Some(schema.size()), FieldShape::Struct(Arc::clone(schema)))
            }
            (FieldType::Bytes(len), None) => (Some(*len), FieldShape::Bytes(*len)),
            (FieldType::Scalar(kind), Some(len)) => (
                kind.size().checked_mul(len),
                FieldShape::Array(CompiledArray {
                    element: Element::Scalar(*kind),
                    len,
                }),
            ),
            (FieldType::Struct(schema), Some(len)) => (
                schema.size().checked_mul(len),
                FieldShape::Array(CompiledArray {
                    element: Element::Struct(Arc::clone(schema)),
                    len,
                }),
            ),
            (FieldType::Bytes(_), Some(_)) => return Err(DefinitionReason::InvalidFieldKind),
        };

        let size = match size {
            Some(size) if size > 0 => size,
            _ => return Err(DefinitionReason::InvalidFieldSize),
        };

        let format = shape.format();
        if format.is_empty() {
            return Err(DefinitionReason::EmptyFormat);
        }

        Ok(CompiledField {
            name: value.name.clone(),
            offset: 0,
            size,
            format,
            shape,
        })
    }
}

impl FieldShape {
    /// Wire-format tag for this shape.
    pub fn format(&self) -> String {
        match self {
            FieldShape::Scalar(kind) => kind.format().to_string(),
            FieldShape::Struct(schema) => format!("{}s", schema.size()),
            FieldShape::Bytes(len) => format!("{len}s"),
            FieldShape::Array(array) => match &array.element {
                Element::Scalar(kind) => format!("{}{}", array.len, kind.format()),
                Element::Struct(schema) => format!("{}s", schema.size()).repeat(array.len),
            },
        }
    }
}

impl CompiledField {
    /// Decodes this field from `data`, which must be exactly `self.size` bytes.
    pub fn decode(&self, data: &[u8]) -> Result<Value, LayoutError> {
        if data.len() != self.size {
            return Err(LayoutError {
                schema: self.name.clone(),
                expected: self.size,
                actual: data.len(),
            });
        }

        match &self.shape {
            FieldShape::Scalar(kind) => Ok(read_scalar(*kind, data)),
            FieldShape::Struct(schema) => Ok(Value::Struct(Schema::decode(schema, data)?)),
            FieldShape::Bytes(_) => Ok(Value::Bytes(data.to_vec())),
            FieldShape::Array(array) => {
                let mut values = Vec::with_capacity(array.len);
                for chunk in data.chunks_exact(array.element.size()) {
                    values.push(array.element.decode(chunk)?);
                }

                Ok(Value::Array(values))
            }
        }
    }
}

/// Reads a little-endian scalar; `data` holds exactly `kind.size()` bytes.
fn read_scalar(kind: ScalarKind, data: &[u8]) -> Value {
    let raw = data
        .iter()
        .rev()
        .fold(0u64, |acc, byte| (acc << 8) | u64::from(*byte));

    if kind.is_signed() {
        Value::I64(sign_extend(raw, kind.size() * 8))
    } else {
        Value::U64(raw)
    }
}
