//! Register framing and sensor identification for IIM/ICM-42xxx IMUs on 4-wire SPI.
//!
//! Nothing in this crate touches a device; it only builds and interprets bytes.

pub mod chip;
pub mod frame;
pub mod sample;
pub mod setup;

pub use chip::{Chip, WHO_AM_I};
pub use frame::{Direction, RegisterFrame, READ_BIT};
pub use sample::{RawSample, SAMPLE_LEN, TEMP_DATA1};
pub use setup::SensorSetup;
