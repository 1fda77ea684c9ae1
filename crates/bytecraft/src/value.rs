//! Decoded values.

use std::sync::Arc;

use crate::schema::Schema;

/// A value produced when decoding one field (or one array element).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    U64(u64),
    I64(i64),
    /// Opaque byte run, unmodified.
    Bytes(Vec<u8>),
    Struct(Structure),
    /// Array elements in input order.
    Array(Vec<Value>),
}

impl Value {
    /// Integer value, if this is a scalar that fits in `u64`.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::U64(value) => Some(*value),
            Value::I64(value) => u64::try_from(*value).ok(),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::I64(value) => Some(*value),
            Value::U64(value) => i64::try_from(*value).ok(),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&Structure> {
        match self {
            Value::Struct(structure) => Some(structure),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(values) => Some(values),
            _ => None,
        }
    }
}

/// A decoded structure: its schema plus one [Value] per field, in schema order.
#[derive(Debug, Clone)]
pub struct Structure {
    schema: Arc<Schema>,
    values: Vec<Value>,
}

impl Structure {
    pub(crate) fn new(schema: Arc<Schema>, values: Vec<Value>) -> Self {
        Self { schema, values }
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Value of the field called `name`.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.schema
            .index_of(name)
            .and_then(|index| self.values.get(index))
    }

    /// Field names paired with their values, in schema order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.schema
            .fields()
            .iter()
            .map(|field| field.name.as_str())
            .zip(&self.values)
    }

    /// Short one-line form naming the first three fields.
    pub fn summary(&self) -> String {
        let shown: Vec<String> = self
            .schema
            .fields()
            .iter()
            .zip(&self.values)
            .take(3)
            .map(|(field, value)| {
                format!("{}=`{}`", field.name, crate::render::render_inline(field, value))
            })
            .collect();
        let more = if self.values.len() > 3 { " ..." } else { "" };

        format!("<{} {}{}>", self.schema.name(), shown.join(", "), more)
    }
}

/// Equal when decoded through the same schema, or through separately defined
/// schemas with the same name, format and field names, and the values match.
impl PartialEq for Structure {
    fn eq(&self, other: &Self) -> bool {
        same_layout(&self.schema, &other.schema) && self.values == other.values
    }
}

fn same_layout(a: &Arc<Schema>, b: &Arc<Schema>) -> bool {
    Arc::ptr_eq(a, b)
        || (a.name() == b.name()
            && a.format() == b.format()
            && a.fields()
                .iter()
                .map(|field| &field.name)
                .eq(b.fields().iter().map(|field| &field.name)))
}

impl Eq for Structure {}
