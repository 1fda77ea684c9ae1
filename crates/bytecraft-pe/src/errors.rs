//! Errors produced while reading a PE image.

use std::{io, sync::Arc};

use bytecraft::errors::{LayoutError, SchemaDefinitionError};
use thiserror::Error;

use crate::machine::Machine;

pub type Result<T> = std::result::Result<T, PeError>;

#[derive(Debug, Clone, Error)]
pub enum PeError {
    /// The data is not a PE image (e.g. `e_magic` mismatch).
    #[error("the provided binary is not a portable executable: {0}")]
    Format(String),

    /// A valid PE image for an architecture the parser does not handle.
    #[error("only x86 executables are supported, found {0}")]
    UnsupportedMachine(Machine),

    /// A structure located by a header field does not fit in the image.
    #[error("{structure} at offset {offset} ({len} bytes) is outside the {available}-byte image")]
    Bounds {
        structure: String,
        offset: i64,
        len: usize,
        available: usize,
    },

    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error(transparent)]
    Schema(#[from] SchemaDefinitionError),

    /// Reading or writing the image failed. Wrapped in `Arc` to keep the error `Clone`.
    #[error("i/o error: {0}")]
    Io(Arc<io::Error>),
}

impl From<io::Error> for PeError {
    fn from(err: io::Error) -> Self {
        PeError::Io(Arc::new(err))
    }
}
