//! Bank-0 power and output configuration.

/// Sensor power modes (bank 0).
pub const PWR_MGMT0: u8 = 0x4E;
pub const GYRO_CONFIG0: u8 = 0x4F;
pub const ACCEL_CONFIG0: u8 = 0x50;

/// Gyro and accel both in low-noise mode.
pub const LOW_NOISE: u8 = 0x0F;

/// Gyro start-up time after leaving sleep; no register writes in between.
pub const GYRO_STARTUP_US: u64 = 45_000;

/// ACCEL_CONFIG0 `ACCEL_FS_SEL`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccelRange {
    G16 = 0,
    G8 = 1,
    G4 = 2,
    G2 = 3,
}

/// GYRO_CONFIG0 `GYRO_FS_SEL`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GyroRange {
    Dps2000 = 0,
    Dps1000 = 1,
    Dps500 = 2,
    Dps250 = 3,
}

/// Shared `*_ODR` field encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputDataRate {
    Hz1000 = 0x06,
    Hz200 = 0x07,
    Hz100 = 0x08,
    Hz50 = 0x09,
    Hz25 = 0x0A,
}

/// Ranges and rate applied before sampling. Defaults to ±16 g, ±2000 dps
/// at 50 Hz.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorSetup {
    pub accel_range: AccelRange,
    pub gyro_range: GyroRange,
    pub odr: OutputDataRate,
}

impl Default for SensorSetup {
    fn default() -> Self {
        Self {
            accel_range: AccelRange::G16,
            gyro_range: GyroRange::Dps2000,
            odr: OutputDataRate::Hz50,
        }
    }
}

impl SensorSetup {
    /// Register writes in the order they must be issued. Power-up comes last
    /// so the sensors start with the requested configuration.
    pub fn writes(&self) -> [(u8, u8); 3] {
        let odr = self.odr as u8;
        [
            (GYRO_CONFIG0, ((self.gyro_range as u8) << 5) | odr),
            (ACCEL_CONFIG0, ((self.accel_range as u8) << 5) | odr),
            (PWR_MGMT0, LOW_NOISE),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_setup_writes() {
        assert_eq!(
            SensorSetup::default().writes(),
            [(0x4F, 0x09), (0x50, 0x09), (0x4E, 0x0F)]
        );
    }

    #[test]
    fn test_range_bits_land_in_fs_sel() {
        let setup = SensorSetup {
            accel_range: AccelRange::G2,
            gyro_range: GyroRange::Dps250,
            odr: OutputDataRate::Hz1000,
        };
        assert_eq!(setup.writes()[0], (GYRO_CONFIG0, 0x66));
        assert_eq!(setup.writes()[1], (ACCEL_CONFIG0, 0x66));
    }
}
