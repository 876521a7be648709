use serde::{Deserialize, Serialize};

use crate::error::IoFailure;

pub const DEFAULT_DEVICE: &str = "/dev/spidev0.0";

/// Upper clock bound of the 42xxx family in 4-wire SPI mode.
pub const MAX_CLOCK_HZ: u32 = 24_000_000;

/// Default spidev `bufsiz`; a single ioctl cannot move more than this.
pub const MAX_TRANSFER_LEN: usize = 4096;

/// Clock phase and polarity. The sensors accept mode 0 and mode 3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpiMode {
    pub cpha: bool,
    pub cpol: bool,
}

impl SpiMode {
    pub const MODE_0: SpiMode = SpiMode { cpha: false, cpol: false };
    pub const MODE_3: SpiMode = SpiMode { cpha: true, cpol: true };

    pub fn number(&self) -> u8 {
        ((self.cpol as u8) << 1) | self.cpha as u8
    }
}

/// Bus settings for one SPI node. Built once at startup and handed to every
/// transport that talks to that node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    pub device_path: String,
    pub clock_speed_hz: u32,
    pub bits_per_word: u8,
    pub inter_byte_delay_us: u16,
    pub mode: SpiMode,
    pub cs_change: bool,
    pub max_read: usize,
    pub max_write: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            device_path: DEFAULT_DEVICE.to_string(),
            clock_speed_hz: 500_000,
            bits_per_word: 8,
            inter_byte_delay_us: 0,
            mode: SpiMode::MODE_3,
            cs_change: false,
            max_read: 256,
            max_write: 256,
        }
    }
}

impl TransportConfig {
    pub fn new(device_path: impl Into<String>) -> Self {
        Self {
            device_path: device_path.into(),
            ..Default::default()
        }
    }

    /// Basic range checks only; the kernel driver has the final word on
    /// what the controller accepts.
    pub fn validate(&self) -> Result<(), IoFailure> {
        if self.device_path.is_empty() {
            return Err(IoFailure::InvalidParameter("device path is empty"));
        }
        if self.clock_speed_hz == 0 || self.clock_speed_hz > MAX_CLOCK_HZ {
            return Err(IoFailure::InvalidParameter("clock speed out of range"));
        }
        if self.bits_per_word != 8 {
            return Err(IoFailure::InvalidParameter("bits per word must be 8"));
        }
        // Reads clock one extra byte for the address.
        if self.max_read == 0 || self.max_read >= MAX_TRANSFER_LEN {
            return Err(IoFailure::InvalidParameter("max_read out of range"));
        }
        if self.max_write == 0 || self.max_write >= MAX_TRANSFER_LEN {
            return Err(IoFailure::InvalidParameter("max_write out of range"));
        }
        Ok(())
    }

    pub fn transfer_params(&self) -> TransferParams {
        TransferParams {
            speed_hz: self.clock_speed_hz,
            bits_per_word: self.bits_per_word,
            delay_us: self.inter_byte_delay_us,
            cs_change: self.cs_change,
        }
    }
}

/// Per-transfer overrides carried in each `spi_ioc_transfer`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferParams {
    pub speed_hz: u32,
    pub bits_per_word: u8,
    pub delay_us: u16,
    pub cs_change: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_bench_setup() {
        let cfg = TransportConfig::default();
        assert_eq!(cfg.device_path, "/dev/spidev0.0");
        assert_eq!(cfg.clock_speed_hz, 500_000);
        assert_eq!(cfg.mode.number(), 3);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        let cases = [
            TransportConfig { clock_speed_hz: 0, ..Default::default() },
            TransportConfig { clock_speed_hz: 30_000_000, ..Default::default() },
            TransportConfig { bits_per_word: 16, ..Default::default() },
            TransportConfig { max_read: 0, ..Default::default() },
            TransportConfig { max_write: MAX_TRANSFER_LEN, ..Default::default() },
            TransportConfig::new(""),
        ];
        for cfg in cases {
            assert!(
                matches!(cfg.validate(), Err(IoFailure::InvalidParameter(_))),
                "{cfg:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let cfg: TransportConfig =
            serde_json::from_str(r#"{"device_path": "/dev/spidev1.0", "clock_speed_hz": 1000000}"#)
                .unwrap();
        assert_eq!(cfg.device_path, "/dev/spidev1.0");
        assert_eq!(cfg.clock_speed_hz, 1_000_000);
        assert_eq!(cfg.max_read, 256);
        assert_eq!(cfg.mode, SpiMode::MODE_3);
    }

    #[test]
    fn test_transfer_params_follow_config() {
        let cfg = TransportConfig {
            inter_byte_delay_us: 5,
            cs_change: true,
            ..Default::default()
        };
        let params = cfg.transfer_params();
        assert_eq!(params.speed_hz, 500_000);
        assert_eq!(params.bits_per_word, 8);
        assert_eq!(params.delay_us, 5);
        assert!(params.cs_change);
    }
}
