//! Catalog of primitive scalar kinds.

/// A fixed-width little-endian scalar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum ScalarKind {
    /// Unsigned 8-bit integer.
    Byte,
    /// Signed 8-bit integer.
    SByte,
    /// Single 8-bit character.
    Char,
    /// Unsigned 16-bit integer.
    Word,
    /// Signed 16-bit integer.
    Short,
    /// Unsigned 32-bit integer.
    Dword,
    /// Signed 32-bit integer.
    Long,
}

impl ScalarKind {
    /// Width in bytes.
    pub const fn size(self) -> usize {
        match self {
            ScalarKind::Byte | ScalarKind::SByte | ScalarKind::Char => 1,
            ScalarKind::Word | ScalarKind::Short => 2,
            ScalarKind::Dword | ScalarKind::Long => 4,
        }
    }

    /// Wire-format tag.
    pub const fn format(self) -> char {
        match self {
            ScalarKind::Byte => 'B',
            ScalarKind::SByte => 'b',
            ScalarKind::Char => 'c',
            ScalarKind::Word => 'H',
            ScalarKind::Short => 'h',
            ScalarKind::Dword => 'L',
            ScalarKind::Long => 'l',
        }
    }

    pub const fn is_signed(self) -> bool {
        matches!(self, ScalarKind::SByte | ScalarKind::Short | ScalarKind::Long)
    }
}
