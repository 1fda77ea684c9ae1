//! Human-readable, deterministic text form of decoded structures.
//!
//! Each field is one row: the name left-aligned to the widest name of its schema,
//! two spaces, then the value. Nested structures continue on the following rows
//! with a deeper indent.

use std::fmt;

use crate::{
    compiled::{CompiledField, Element, FieldShape},
    kind::ScalarKind,
    value::{Structure, Value},
};

/// Renders `structure` with every row prefixed by `indent`.
pub fn render(structure: &Structure, indent: &str) -> String {
    let schema = structure.schema();
    let width = schema
        .fields()
        .iter()
        .map(|field| field.name.chars().count())
        .max()
        .unwrap_or(0);

    let mut rows: Vec<String> = Vec::with_capacity(schema.fields().len());

    for (field, value) in schema.fields().iter().zip(structure.values()) {
        let name = &field.name;

        match (&field.shape, value) {
            (FieldShape::Struct(nested), Value::Struct(inner)) => {
                rows.push(format!("{indent}{name:<width$}  {}", nested.name()));
                let nested_indent = format!("{indent}{}", " ".repeat(width + 6));
                rows.push(render(inner, &nested_indent));
            }
            (FieldShape::Array(array), Value::Array(elements))
                if matches!(array.element, Element::Struct(_)) =>
            {
                let element_name = match &array.element {
                    Element::Struct(nested) => nested.name(),
                    Element::Scalar(_) => "",
                };
                rows.push(format!(
                    "{indent}{name:<width$}  {element_name}[{}]",
                    array.len
                ));

                let index_width = digits(array.len.saturating_sub(1));
                let element_indent = format!("{indent}{}", " ".repeat(width + index_width + 5));

                for (i, element) in elements.iter().enumerate() {
                    let body = match element {
                        Value::Struct(inner) => render(inner, &element_indent),
                        other => render_value(other),
                    };
                    rows.push(format!(
                        "{indent}{:width$}  {:<label_width$} {}",
                        "",
                        format!("[{i}]"),
                        body.trim_start(),
                        label_width = index_width + 2,
                    ));
                }
            }
            _ => rows.push(format!("{indent}{name:<width$}  {}", render_inline(field, value))),
        }
    }

    rows.join("\n")
}

/// Single-line form of one field's value.
pub(crate) fn render_inline(field: &CompiledField, value: &Value) -> String {
    match (&field.shape, value) {
        (FieldShape::Scalar(kind), _) => render_scalar(*kind, value),
        (FieldShape::Bytes(_), Value::Bytes(bytes)) => render_bytes(bytes),
        (FieldShape::Array(array), Value::Array(elements)) => {
            let items: Vec<String> = elements
                .iter()
                .map(|element| match &array.element {
                    Element::Scalar(kind) => render_scalar(*kind, element),
                    Element::Struct(_) => render_value(element),
                })
                .collect();
            format!("[{}]", items.join(", "))
        }
        _ => render_value(value),
    }
}

/// Renders a value without knowledge of its field kind.
fn render_value(value: &Value) -> String {
    match value {
        Value::U64(v) => v.to_string(),
        Value::I64(v) => v.to_string(),
        Value::Bytes(bytes) => render_bytes(bytes),
        Value::Struct(structure) => structure.summary(),
        Value::Array(values) => {
            let items: Vec<String> = values.iter().map(render_value).collect();
            format!("[{}]", items.join(", "))
        }
    }
}

/// `{hex}h ({decimal})`, hex zero-padded to the kind's width. Printable chars render quoted.
fn render_scalar(kind: ScalarKind, value: &Value) -> String {
    let (bits, decimal) = match value {
        Value::U64(v) => (*v, v.to_string()),
        Value::I64(v) => (*v as u64, v.to_string()),
        other => return render_value(other),
    };

    let width = kind.size() * 2;
    let bits = bits & (u64::MAX >> (64 - kind.size() * 8));

    if kind == ScalarKind::Char {
        if let Ok(byte) = u8::try_from(bits) {
            if byte == b' ' || byte.is_ascii_graphic() {
                return match byte {
                    b'\'' | b'\\' => format!("'\\{}'", byte as char),
                    _ => format!("'{}'", byte as char),
                };
            }
        }
    }

    let decimal = if kind.size() == 4 {
        group_thousands(&decimal)
    } else {
        decimal
    };

    format!("{bits:0width$x}h ({decimal})")
}

/// Decoded text when the NUL-trimmed bytes are printable, else a `b'..'` literal.
fn render_bytes(bytes: &[u8]) -> String {
    let end = bytes.iter().rposition(|b| *b != 0).map_or(0, |i| i + 1);

    match std::str::from_utf8(&bytes[..end]) {
        Ok(text) if !text.is_empty() && text.chars().all(is_printable) => {
            format!("'{text}'")
        }
        _ => {
            let mut out = String::from("b'");
            for &byte in bytes {
                match byte {
                    b'\t' => out.push_str("\\t"),
                    b'\n' => out.push_str("\\n"),
                    b'\r' => out.push_str("\\r"),
                    b'\\' => out.push_str("\\\\"),
                    b'\'' => out.push_str("\\'"),
                    0x20..=0x7E => out.push(byte as char),
                    _ => out.push_str(&format!("\\x{byte:02x}")),
                }
            }
            out.push('\'');
            out
        }
    }
}

/// Printable in the sense of Python's `str.isprintable`: no control, format,
/// separator (other than ASCII space) or private-use characters.
/// Unassigned code points are not detected.
fn is_printable(c: char) -> bool {
    if c == ' ' {
        return true;
    }
    if c.is_control() {
        return false;
    }

    !matches!(
        u32::from(c),
        // Zs
        0x00A0 | 0x1680 | 0x2000..=0x200A | 0x202F | 0x205F | 0x3000
        // Zl, Zp
        | 0x2028 | 0x2029
        // Cf
        | 0x00AD | 0x0600..=0x0605 | 0x061C | 0x06DD | 0x070F | 0x0890..=0x0891 | 0x08E2
        | 0x180E | 0x200B..=0x200F | 0x202A..=0x202E | 0x2060..=0x2064 | 0x2066..=0x206F
        | 0xFEFF | 0xFFF9..=0xFFFB | 0x110BD | 0x110CD | 0x13430..=0x1343F
        | 0x1BCA0..=0x1BCA3 | 0x1D173..=0x1D17A | 0xE0001 | 0xE0020..=0xE007F
        // Co
        | 0xE000..=0xF8FF | 0xF0000..=0xFFFFD | 0x100000..=0x10FFFD
    )
}

fn group_thousands(decimal: &str) -> String {
    let (sign, digits) = match decimal.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", decimal),
    };

    let mut out = String::with_capacity(decimal.len() + digits.len() / 3);
    out.push_str(sign);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }

    out
}

fn digits(mut n: usize) -> usize {
    let mut count = 1;
    while n >= 10 {
        n /= 10;
        count += 1;
    }

    count
}

impl fmt::Display for Structure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render(self, ""))
    }
}
