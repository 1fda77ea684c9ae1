//! # bytecraft
//!
//! A library for decoding fixed-layout binary structures from declarative schemas.
//!
//! Declare a structure as an ordered list of fields (scalars, nested structures,
//! fixed-length arrays, opaque byte runs), compile it once into a [schema::Schema],
//! then decode byte slices of exactly that size into [value::Structure] trees and
//! render them as aligned text.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use bytecraft::field::Field;
//! use bytecraft::kind::ScalarKind;
//! use bytecraft::schema::Schema;
//! use bytecraft::value::Value;
//!
//! let schema = Arc::new(
//!     Schema::define(
//!         "HEADER",
//!         &[
//!             Field::scalar("id", ScalarKind::Word),
//!             Field::scalar("reserved", ScalarKind::Byte).array(2),
//!         ],
//!     )
//!     .unwrap(),
//! );
//! assert_eq!(schema.size(), 4);
//!
//! let decoded = Schema::decode(&schema, &[0x42, 0x00, 0x01, 0x02]).unwrap();
//! assert_eq!(decoded.get("id"), Some(&Value::U64(0x42)));
//! assert_eq!(decoded.to_string(), "id        0042h (66)\nreserved  [01h (1), 02h (2)]");
//! ```

pub mod bits;
pub mod compiled;
pub mod errors;
pub mod field;
pub mod kind;
#[cfg(feature = "serde")]
pub mod registry;
pub mod render;
pub mod schema;
#[cfg(feature = "serde")]
pub mod serde;
pub mod value;
