//! Shared pieces of the `spi-detect` and `imu-bringup` tools.

pub mod args;
pub mod bringup;
pub mod detect;
pub mod logging;
pub mod settings;
