use std::io;
use std::path::PathBuf;

use crate::config::TransportConfig;
use crate::error::IoFailure;
use crate::executor::{self, SpiHandle};

/// Knows how to open a SPI node described by a [`TransportConfig`].
pub trait DeviceOpener {
    type Handle: SpiHandle;

    fn open(&self, config: &TransportConfig) -> io::Result<Self::Handle>;
}

impl<O: DeviceOpener + ?Sized> DeviceOpener for &O {
    type Handle = O::Handle;

    fn open(&self, config: &TransportConfig) -> io::Result<Self::Handle> {
        (**self).open(config)
    }
}

/// Exclusive ownership of one open device handle.
///
/// The handle is closed when the session is dropped, so every early return
/// and every `?` in the caller releases it.
pub struct DeviceSession<H: SpiHandle> {
    path: PathBuf,
    handle: H,
}

impl<H: SpiHandle> DeviceSession<H> {
    pub fn open<O>(opener: &O, config: &TransportConfig) -> Result<Self, IoFailure>
    where
        O: DeviceOpener<Handle = H> + ?Sized,
    {
        let path = PathBuf::from(&config.device_path);
        let handle = opener.open(config).map_err(|source| IoFailure::OpenError {
            path: path.clone(),
            source,
        })?;
        log::trace!("opened {}", path.display());
        Ok(Self { path, handle })
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    pub fn execute(
        &mut self,
        tx: &[u8],
        rx_capacity: usize,
        config: &TransportConfig,
    ) -> Result<Vec<u8>, IoFailure> {
        executor::execute(&mut self.handle, tx, rx_capacity, &config.transfer_params())
    }
}

impl<H: SpiHandle> Drop for DeviceSession<H> {
    fn drop(&mut self) {
        log::trace!("closing {}", self.path.display());
    }
}
