//! Linux `spidev` backend.

use std::io;

use linux_embedded_hal::spidev::{SpiModeFlags, Spidev, SpidevOptions, SpidevTransfer};

use crate::config::{SpiMode, TransferParams, TransportConfig};
use crate::executor::SpiHandle;
use crate::session::DeviceOpener;

/// Opens `/dev/spidevB.C` read-write and applies mode, word size and clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpidevOpener;

impl DeviceOpener for SpidevOpener {
    type Handle = Spidev;

    fn open(&self, config: &TransportConfig) -> io::Result<Spidev> {
        let mut spi = Spidev::open(&config.device_path)?;
        spi.configure(
            &SpidevOptions::new()
                .bits_per_word(config.bits_per_word)
                .max_speed_hz(config.clock_speed_hz)
                .mode(mode_flags(config.mode))
                .build(),
        )?;
        Ok(spi)
    }
}

impl SpiHandle for Spidev {
    fn transfer(&mut self, tx: &[u8], rx: &mut [u8], params: &TransferParams) -> io::Result<()> {
        let mut transfer = SpidevTransfer::read_write(tx, rx);
        transfer.speed_hz = params.speed_hz;
        transfer.bits_per_word = params.bits_per_word;
        transfer.delay_usecs = params.delay_us;
        transfer.cs_change = params.cs_change as u8;
        Spidev::transfer(self, &mut transfer)
    }
}

fn mode_flags(mode: SpiMode) -> SpiModeFlags {
    let mut flags = SpiModeFlags::empty();
    if mode.cpha {
        flags |= SpiModeFlags::SPI_CPHA;
    }
    if mode.cpol {
        flags |= SpiModeFlags::SPI_CPOL;
    }
    flags
}
