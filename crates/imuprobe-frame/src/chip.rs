use serde::Serialize;
use std::fmt;

/// WHO_AM_I register address, bank 0.
pub const WHO_AM_I: u8 = 0x75;

/// Sensors of the family this tool knows how to recognise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Chip {
    Iim42652,
    Icm42688P,
    Icm42605,
    Icm42670P,
}

impl Chip {
    pub const ALL: [Chip; 4] = [Chip::Iim42652, Chip::Icm42688P, Chip::Icm42605, Chip::Icm42670P];

    pub fn whoami(&self) -> u8 {
        match self {
            Chip::Iim42652 => 0x6F,
            Chip::Icm42688P => 0x47,
            Chip::Icm42605 => 0x42,
            Chip::Icm42670P => 0x67,
        }
    }

    pub fn from_whoami(value: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|chip| chip.whoami() == value)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Chip::Iim42652 => "IIM-42652",
            Chip::Icm42688P => "ICM-42688-P",
            Chip::Icm42605 => "ICM-42605",
            Chip::Icm42670P => "ICM-42670-P",
        }
    }
}

impl fmt::Display for Chip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
