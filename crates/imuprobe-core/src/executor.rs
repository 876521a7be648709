use std::io;

use crate::config::TransferParams;
use crate::error::IoFailure;

/// An open SPI node able to run one full-duplex exchange.
///
/// `tx` and `rx` always have the same length when called through [`execute`].
pub trait SpiHandle {
    fn transfer(&mut self, tx: &[u8], rx: &mut [u8], params: &TransferParams) -> io::Result<()>;
}

impl<H: SpiHandle + ?Sized> SpiHandle for Box<H> {
    fn transfer(&mut self, tx: &[u8], rx: &mut [u8], params: &TransferParams) -> io::Result<()> {
        (**self).transfer(tx, rx, params)
    }
}

/// Runs a single synchronous transaction and returns what was shifted in.
pub fn execute<H: SpiHandle + ?Sized>(
    handle: &mut H,
    tx: &[u8],
    rx_capacity: usize,
    params: &TransferParams,
) -> Result<Vec<u8>, IoFailure> {
    if tx.is_empty() || tx.len() != rx_capacity {
        return Err(IoFailure::TransferError(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("tx length {} does not match rx capacity {}", tx.len(), rx_capacity),
        )));
    }

    let mut rx = vec![0u8; rx_capacity];
    handle.transfer(tx, &mut rx, params).map_err(|e| {
        log::warn!("spi transfer of {} bytes failed: {e}", tx.len());
        IoFailure::TransferError(e)
    })?;
    Ok(rx)
}
