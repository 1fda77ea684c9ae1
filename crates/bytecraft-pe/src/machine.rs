use std::fmt;

pub const IMAGE_FILE_MACHINE_I386: u16 = 0x014C;
pub const IMAGE_FILE_MACHINE_IA64: u16 = 0x0200;
pub const IMAGE_FILE_MACHINE_AMD64: u16 = 0x8664;

/// Target architecture from `IMAGE_FILE_HEADER.machine`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Machine {
    /// x86, the only architecture the parser accepts.
    I386,
    /// Intel Itanium.
    Ia64,
    Amd64,
    Unknown(u16),
}

impl Machine {
    pub fn code(self) -> u16 {
        match self {
            Machine::I386 => IMAGE_FILE_MACHINE_I386,
            Machine::Ia64 => IMAGE_FILE_MACHINE_IA64,
            Machine::Amd64 => IMAGE_FILE_MACHINE_AMD64,
            Machine::Unknown(code) => code,
        }
    }
}

impl From<u16> for Machine {
    fn from(value: u16) -> Self {
        match value {
            IMAGE_FILE_MACHINE_I386 => Machine::I386,
            IMAGE_FILE_MACHINE_IA64 => Machine::Ia64,
            IMAGE_FILE_MACHINE_AMD64 => Machine::Amd64,
            other => Machine::Unknown(other),
        }
    }
}

impl fmt::Display for Machine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Machine::I386 => f.write_str("x86"),
            Machine::Ia64 => f.write_str("IA64"),
            Machine::Amd64 => f.write_str("AMD64"),
            Machine::Unknown(code) => write!(f, "unknown machine {code:#06x}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_codes() {
        assert_eq!(Machine::from(0x014C), Machine::I386);
        assert_eq!(Machine::from(0x0200), Machine::Ia64);
        assert_eq!(Machine::from(0x8664), Machine::Amd64);
        assert_eq!(Machine::from(0x01C0), Machine::Unknown(0x01C0));
        assert_eq!(Machine::Amd64.code(), 0x8664);
    }

    #[test]
    fn test_display() {
        assert_eq!(Machine::I386.to_string(), "x86");
        assert_eq!(Machine::Unknown(0x1c0).to_string(), "unknown machine 0x01c0");
    }
}
