//! Schema: compiled, immutable layout of a structure type.

use std::{
    collections::HashSet,
    sync::{Arc, OnceLock},
};

use tracing::{debug, trace};

use crate::{
    compiled::{CompiledField, Element, FieldShape},
    errors::{DefinitionReason, LayoutError, SchemaDefinitionError},
    field::Field,
    value::{Structure, Value},
};

/// Deepest allowed chain of nested structures, counting the outermost one.
pub const MAX_NESTING_DEPTH: usize = 64;

/// A compiled structure layout: ordered [CompiledField]s, total size and wire format.
/// Use [Schema::define] to build from [Field]s, then [Schema::decode] to decode bytes.
#[derive(Debug)]
pub struct Schema {
    name: String,
    size: usize,
    format: String,
    /// Levels of structures, this one included.
    depth: usize,
    /// Compiled fields in declaration order.
    fields: Vec<CompiledField>,
}

impl Schema {
    /// Compiles `fields` into a schema named `name`. Fails on the first invalid field.
    pub fn define(name: &str, fields: &[Field]) -> Result<Self, SchemaDefinitionError> {
        let mut compiled_fields: Vec<CompiledField> = Vec::with_capacity(fields.len());
        let mut seen: HashSet<&str> = HashSet::with_capacity(fields.len());
        let mut size = 0usize;
        let mut format = String::new();
        let mut depth = 1usize;

        for field in fields {
            let mut compiled_field = CompiledField::try_from(field)
                .map_err(|reason| SchemaDefinitionError::new(name, &field.name, reason))?;

            if !seen.insert(field.name.as_str()) {
                return Err(SchemaDefinitionError::new(
                    name,
                    &field.name,
                    DefinitionReason::DuplicateName,
                ));
            }

            let nested_depth = match &compiled_field.shape {
                FieldShape::Struct(schema) => schema.depth,
                FieldShape::Array(array) => match &array.element {
                    Element::Struct(schema) => schema.depth,
                    Element::Scalar(_) => 0,
                },
                FieldShape::Scalar(_) | FieldShape::Bytes(_) => 0,
            };
            if nested_depth >= MAX_NESTING_DEPTH {
                return Err(SchemaDefinitionError::new(
                    name,
                    &field.name,
                    DefinitionReason::NestingTooDeep,
                ));
            }
            depth = depth.max(nested_depth + 1);

            compiled_field.offset = size;
            size = size.checked_add(compiled_field.size).ok_or_else(|| {
                SchemaDefinitionError::new(name, &field.name, DefinitionReason::InvalidFieldSize)
            })?;
            format.push_str(&compiled_field.format);

            compiled_fields.push(compiled_field);
        }

        debug!(schema = name, size, depth, format = %format, "defined structure");

        Ok(Self {
            name: name.to_string(),
            size,
            format,
            depth,
            fields: compiled_fields,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Exact number of bytes a buffer must have to decode.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Concatenated wire-format tags of all fields.
    pub fn format(&self) -> &str {
        &self.format
    }

    /// Nesting depth: 1 for a structure of plain fields, one more per level of nesting.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn fields(&self) -> &[CompiledField] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&CompiledField> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Position of the field called `name`, in declaration order.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|field| field.name == name)
    }

    /// Decodes `data` into a [Structure]. `data` must be exactly [Schema::size] bytes.
    ///
    /// Takes the schema by `Arc` so the decoded structure can keep a reference to it.
    pub fn decode(schema: &Arc<Schema>, data: &[u8]) -> Result<Structure, LayoutError> {
        if data.len() != schema.size {
            return Err(LayoutError {
                schema: schema.name.clone(),
                expected: schema.size,
                actual: data.len(),
            });
        }

        trace!(schema = %schema.name, len = data.len(), "decoding structure");

        let mut values: Vec<Value> = Vec::with_capacity(schema.fields.len());
        for field in &schema.fields {
            let span = data
                .get(field.offset..field.offset + field.size)
                .ok_or_else(|| LayoutError {
                    schema: schema.name.clone(),
                    expected: schema.size,
                    actual: data.len(),
                })?;
            values.push(field.decode(span)?);
        }

        Ok(Structure::new(Arc::clone(schema), values))
    }
}

type Definition = fn() -> Result<Schema, SchemaDefinitionError>;

/// Write-once cache for a structure type's schema.
///
/// The definition runs on the first [SchemaCell::get]; every later call sees the same
/// schema (or the same definition error).
///
/// ```
/// use bytecraft::{field::Field, kind::ScalarKind, schema::{Schema, SchemaCell}};
///
/// static POINT: SchemaCell = SchemaCell::new(|| {
///     Schema::define("POINT", &[
///         Field::scalar("x", ScalarKind::Word),
///         Field::scalar("y", ScalarKind::Word),
///     ])
/// });
///
/// assert_eq!(POINT.get().unwrap().size(), 4);
/// ```
pub struct SchemaCell {
    cell: OnceLock<Result<Arc<Schema>, SchemaDefinitionError>>,
    define: Definition,
}

impl SchemaCell {
    pub const fn new(define: Definition) -> Self {
        Self {
            cell: OnceLock::new(),
            define,
        }
    }

    pub fn get(&self) -> Result<Arc<Schema>, SchemaDefinitionError> {
        self.cell
            .get_or_init(|| (self.define)().map(Arc::new))
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use crate::{kind::ScalarKind, value::Value};

    use super::*;

    fn test_schema() -> Arc<Schema> {
        Arc::new(
            Schema::define(
                "Test",
                &[
                    Field::scalar("x", ScalarKind::Byte),
                    Field::scalar("y", ScalarKind::Char),
                    Field::scalar("z", ScalarKind::Dword),
                    Field::scalar("w", ScalarKind::Char).array(3),
                    Field::bytes("p", 11),
                ],
            )
            .unwrap(),
        )
    }

    #[test]
    fn test_define_empty() {
        let schema = Schema::define("Empty", &[]).unwrap();
        assert_eq!(schema.size(), 0);
        assert_eq!(schema.format(), "");
    }

    #[test]
    fn test_layout() {
        let schema = test_schema();
        assert_eq!(schema.size(), 20);
        assert_eq!(schema.format(), "BcL3c11s");

        let offsets: Vec<usize> = schema.fields().iter().map(|field| field.offset).collect();
        assert_eq!(offsets, vec![0, 1, 2, 6, 9]);
    }

    #[test]
    fn test_decode() {
        let schema = test_schema();
        let structure = Schema::decode(&schema, b"\xFFH\x05\x00\x00\x00ABCHELLO WORLD").unwrap();

        assert_eq!(structure.get("x"), Some(&Value::U64(255)));
        assert_eq!(structure.get("y"), Some(&Value::U64(u64::from(b'H'))));
        assert_eq!(structure.get("z"), Some(&Value::U64(5)));
        assert_eq!(
            structure.get("w"),
            Some(&Value::Array(vec![
                Value::U64(u64::from(b'A')),
                Value::U64(u64::from(b'B')),
                Value::U64(u64::from(b'C')),
            ]))
        );
        assert_eq!(structure.get("p"), Some(&Value::Bytes(b"HELLO WORLD".to_vec())));
    }

    #[test]
    fn test_decode_wrong_length() {
        let schema = test_schema();
        assert_eq!(
            Schema::decode(&schema, b"x").unwrap_err(),
            LayoutError {
                schema: "Test".to_string(),
                expected: 20,
                actual: 1,
            }
        );
    }

    #[test]
    fn test_decode_nested_array() {
        let point = Arc::new(
            Schema::define(
                "POINT",
                &[
                    Field::scalar("x", ScalarKind::Short),
                    Field::scalar("y", ScalarKind::Short),
                ],
            )
            .unwrap(),
        );
        let path = Arc::new(
            Schema::define(
                "PATH",
                &[
                    Field::scalar("count", ScalarKind::Byte),
                    Field::structure("points", &point).array(2),
                ],
            )
            .unwrap(),
        );
        assert_eq!(path.size(), 9);

        let structure =
            Schema::decode(&path, &[2, 1, 0, 0xFF, 0xFF, 3, 0, 4, 0]).unwrap();
        let points = structure.get("points").and_then(Value::as_array).unwrap();
        assert_eq!(points.len(), 2);

        let first = points[0].as_struct().unwrap();
        assert_eq!(first.get("x"), Some(&Value::I64(1)));
        assert_eq!(first.get("y"), Some(&Value::I64(-1)));

        let second = points[1].as_struct().unwrap();
        assert_eq!(second.get("x"), Some(&Value::I64(3)));
        assert_eq!(second.get("y"), Some(&Value::I64(4)));
    }

    #[test]
    fn test_rejects_duplicate_names() {
        let err = Schema::define(
            "Dup",
            &[
                Field::scalar("a", ScalarKind::Byte),
                Field::scalar("a", ScalarKind::Word),
            ],
        )
        .unwrap_err();

        assert_eq!(
            err,
            SchemaDefinitionError::new("Dup", "a", DefinitionReason::DuplicateName)
        );
    }

    #[test]
    fn test_rejects_empty_nested_structure() {
        let empty = Arc::new(Schema::define("Empty", &[]).unwrap());
        let err = Schema::define("Outer", &[Field::structure("inner", &empty)]).unwrap_err();
        assert_eq!(err.reason, DefinitionReason::InvalidFieldSize);
        assert_eq!(err.field, "inner");
    }

    #[test]
    fn test_nesting_depth_limit() {
        let mut schema = Arc::new(
            Schema::define("L1", &[Field::scalar("v", ScalarKind::Byte)]).unwrap(),
        );
        assert_eq!(schema.depth(), 1);

        for level in 2..=MAX_NESTING_DEPTH {
            let name = format!("L{level}");
            schema = Arc::new(
                Schema::define(&name, &[Field::structure("inner", &schema).array(1)]).unwrap(),
            );
        }
        assert_eq!(schema.depth(), MAX_NESTING_DEPTH);
        assert_eq!(schema.size(), 1);

        let err = Schema::define(
            "TooDeep",
            &[
                Field::scalar("tag", ScalarKind::Byte),
                Field::structure("inner", &schema),
            ],
        )
        .unwrap_err();
        assert_eq!(
            err,
            SchemaDefinitionError::new("TooDeep", "inner", DefinitionReason::NestingTooDeep)
        );
    }

    #[test]
    fn test_schema_cell_defines_once() {
        static CELL: SchemaCell =
            SchemaCell::new(|| Schema::define("Once", &[Field::scalar("a", ScalarKind::Word)]));

        let first = CELL.get().unwrap();
        let second = CELL.get().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_schema_cell_keeps_error() {
        static CELL: SchemaCell = SchemaCell::new(|| Schema::define("Bad", &[Field::bytes("", 1)]));

        assert_eq!(CELL.get().unwrap_err().reason, DefinitionReason::EmptyName);
        assert_eq!(CELL.get().unwrap_err().reason, DefinitionReason::EmptyName);
    }

    proptest! {
        #[test]
        fn decode_requires_exact_length(len in 0usize..64) {
            let schema = test_schema();
            let data = vec![0x41u8; len];
            let result = Schema::decode(&schema, &data);
            prop_assert_eq!(result.is_err(), len != schema.size());
        }

        #[test]
        fn decode_is_deterministic(data in proptest::collection::vec(any::<u8>(), 20)) {
            let schema = test_schema();
            let first = Schema::decode(&schema, &data).unwrap();
            let second = Schema::decode(&schema, &data).unwrap();
            prop_assert_eq!(first, second);
        }

        #[test]
        fn size_is_sum_of_fields(
            kinds in proptest::collection::vec(0usize..7, 1..12),
            lens in proptest::collection::vec(1usize..5, 12),
        ) {
            const KINDS: [ScalarKind; 7] = [
                ScalarKind::Byte,
                ScalarKind::SByte,
                ScalarKind::Char,
                ScalarKind::Word,
                ScalarKind::Short,
                ScalarKind::Dword,
                ScalarKind::Long,
            ];
            let fields: Vec<Field> = kinds
                .iter()
                .zip(&lens)
                .enumerate()
                .map(|(i, (&kind, &len))| Field::scalar(&format!("f{i}"), KINDS[kind]).array(len))
                .collect();

            let schema = Schema::define("Generated", &fields).unwrap();
            let expected: usize = schema.fields().iter().map(|field| field.size).sum();
            prop_assert_eq!(schema.size(), expected);
            prop_assert_eq!(
                schema.size(),
                kinds.iter().zip(&lens).map(|(&kind, &len)| KINDS[kind].size() * len).sum::<usize>()
            );
        }
    }
}
