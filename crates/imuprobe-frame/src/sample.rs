use serde::Serialize;

/// First register of the bank-0 data window (TEMP_DATA1).
pub const TEMP_DATA1: u8 = 0x1D;

/// Temperature, accel XYZ and gyro XYZ, 16 bits each.
pub const SAMPLE_LEN: usize = 14;

/// Value the data registers hold while the matching sensor is off.
const INVALID: i16 = i16::MIN;

/// One snapshot of the data registers, in raw counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RawSample {
    pub temperature: i16,
    pub accel: [i16; 3],
    pub gyro: [i16; 3],
}

impl RawSample {
    /// Parses a burst read of [`SAMPLE_LEN`] bytes starting at [`TEMP_DATA1`].
    /// Registers are big-endian.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < SAMPLE_LEN {
            return None;
        }
        let word = |i: usize| i16::from_be_bytes([bytes[2 * i], bytes[2 * i + 1]]);
        Some(Self {
            temperature: word(0),
            accel: [word(1), word(2), word(3)],
            gyro: [word(4), word(5), word(6)],
        })
    }

    pub fn temperature_c(&self) -> f32 {
        self.temperature as f32 / 132.48 + 25.0
    }

    pub fn temperature_valid(&self) -> bool {
        self.temperature != INVALID
    }

    pub fn accel_valid(&self) -> bool {
        self.accel.iter().any(|&v| v != INVALID)
    }

    pub fn gyro_valid(&self) -> bool {
        self.gyro.iter().any(|&v| v != INVALID)
    }
}
