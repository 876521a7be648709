use anyhow::Result;
use imuprobe_core::{DeviceOpener, IoFailure, SpiTransport};
use imuprobe_frame::{Chip, READ_BIT, WHO_AM_I};
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Detection {
    /// Bytes shifted in by the unframed two-byte exchange.
    pub raw: [u8; 2],
    /// WHOAMI as returned by a framed register read.
    pub whoami: u8,
    pub chip: Option<Chip>,
}

/// Single `[WHO_AM_I | READ_BIT, 0x00]` exchange; the value arrives in the
/// second byte.
pub fn raw_whoami<O: DeviceOpener>(transport: &mut SpiTransport<O>) -> Result<[u8; 2], IoFailure> {
    let rx = transport.exchange(&[WHO_AM_I | READ_BIT, 0x00])?;
    Ok([rx[0], rx[1]])
}

/// Reads WHOAMI both unframed and through the register path and compares them.
pub fn probe<O: DeviceOpener>(transport: &mut SpiTransport<O>) -> Result<Detection, IoFailure> {
    let raw = raw_whoami(transport)?;
    let whoami = transport.read_register(WHO_AM_I, 1)?[0];
    if raw[1] != whoami {
        log::warn!(
            "raw exchange returned 0x{:02X} but framed read returned 0x{:02X}",
            raw[1],
            whoami
        );
    }
    Ok(Detection {
        raw,
        whoami,
        chip: Chip::from_whoami(whoami),
    })
}

/// The `spi-detect` flow. Returns whether `expected` answered.
pub fn run<O: DeviceOpener>(
    transport: &mut SpiTransport<O>,
    expected: Chip,
    out: &mut impl Write,
) -> Result<bool> {
    writeln!(out, "{expected} SPI Detection Tool")?;
    writeln!(out, "Probing {}", transport.config().device_path)?;

    let raw = raw_whoami(transport)?;
    let whoami = raw[1];
    writeln!(out, "WHOAMI register value: 0x{whoami:02X}")?;

    if whoami == expected.whoami() {
        writeln!(out, "SUCCESS: {expected} detected via SPI")?;
        return Ok(true);
    }

    match Chip::from_whoami(whoami) {
        Some(other) => writeln!(out, "ERROR: found {other} instead of {expected}")?,
        None => writeln!(
            out,
            "ERROR: Unexpected WHOAMI value! Expected: 0x{:02X}, Got: 0x{whoami:02X}",
            expected.whoami()
        )?,
    }
    Ok(false)
}
