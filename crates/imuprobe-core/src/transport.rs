use parking_lot::Mutex;

use crate::config::TransportConfig;
use crate::error::IoFailure;
use crate::executor::SpiHandle;
use crate::register::{check_exchange, check_read, check_write, read_in_session, write_in_session};
use crate::session::{DeviceOpener, DeviceSession};
use crate::trace::BoxedObserver;

/// Physical interface advertised to the sensor driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SerifType {
    Spi4,
}

/// The read/write pair a sensor driver is parameterized over.
pub trait RegisterInterface {
    /// Fills `buf` from consecutive registers starting at `register`.
    fn read(&mut self, register: u8, buf: &mut [u8]) -> Result<(), IoFailure>;

    fn write(&mut self, register: u8, data: &[u8]) -> Result<(), IoFailure>;

    fn max_read(&self) -> usize;

    fn max_write(&self) -> usize;

    fn serif_type(&self) -> SerifType {
        SerifType::Spi4
    }

    fn read_vec(&mut self, register: u8, length: usize) -> Result<Vec<u8>, IoFailure> {
        let mut buf = vec![0u8; length];
        self.read(register, &mut buf)?;
        Ok(buf)
    }
}

impl<T: RegisterInterface + ?Sized> RegisterInterface for &mut T {
    fn read(&mut self, register: u8, buf: &mut [u8]) -> Result<(), IoFailure> {
        (**self).read(register, buf)
    }

    fn write(&mut self, register: u8, data: &[u8]) -> Result<(), IoFailure> {
        (**self).write(register, data)
    }

    fn max_read(&self) -> usize {
        (**self).max_read()
    }

    fn max_write(&self) -> usize {
        (**self).max_write()
    }

    fn serif_type(&self) -> SerifType {
        (**self).serif_type()
    }
}

/// Opens the device for every register access and closes it right after.
pub struct SpiTransport<O: DeviceOpener> {
    config: TransportConfig,
    opener: O,
    observer: Option<BoxedObserver>,
}

#[cfg(target_os = "linux")]
impl SpiTransport<crate::spidev::SpidevOpener> {
    pub fn new(config: TransportConfig) -> Result<Self, IoFailure> {
        Self::with_opener(config, crate::spidev::SpidevOpener)
    }
}

impl<O: DeviceOpener> SpiTransport<O> {
    pub fn with_opener(config: TransportConfig, opener: O) -> Result<Self, IoFailure> {
        config.validate()?;
        Ok(Self {
            config,
            opener,
            observer: None,
        })
    }

    pub fn set_observer(&mut self, observer: BoxedObserver) {
        self.observer = Some(observer);
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    pub fn read_register(&mut self, register: u8, length: usize) -> Result<Vec<u8>, IoFailure> {
        check_read(&self.config, length)?;
        let mut session = DeviceSession::open(&self.opener, &self.config)?;
        read_in_session(&mut session, &self.config, register, length, self.observer.as_mut())
    }

    pub fn write_register(&mut self, register: u8, payload: &[u8]) -> Result<(), IoFailure> {
        check_write(&self.config, payload.len())?;
        let mut session = DeviceSession::open(&self.opener, &self.config)?;
        write_in_session(&mut session, &self.config, register, payload, self.observer.as_mut())
    }

    /// Raw exchange with no register framing, as used by chip detection.
    pub fn exchange(&mut self, tx: &[u8]) -> Result<Vec<u8>, IoFailure> {
        check_exchange(&self.config, tx.len())?;
        let mut session = DeviceSession::open(&self.opener, &self.config)?;
        let rx = session.execute(tx, tx.len(), &self.config)?;
        if let Some(observer) = self.observer.as_mut() {
            observer.on_transfer(tx, &rx);
        }
        Ok(rx)
    }
}

impl<O: DeviceOpener> RegisterInterface for SpiTransport<O> {
    fn read(&mut self, register: u8, buf: &mut [u8]) -> Result<(), IoFailure> {
        let data = self.read_register(register, buf.len())?;
        buf.copy_from_slice(&data);
        Ok(())
    }

    fn write(&mut self, register: u8, data: &[u8]) -> Result<(), IoFailure> {
        self.write_register(register, data)
    }

    fn max_read(&self) -> usize {
        self.config.max_read
    }

    fn max_write(&self) -> usize {
        self.config.max_write
    }
}

struct Shared<H: SpiHandle> {
    session: DeviceSession<H>,
    observer: Option<BoxedObserver>,
}

/// Keeps one session open for its whole lifetime. Accesses from any number
/// of threads are serialized on an internal mutex; the device is closed when
/// the transport is dropped.
pub struct SharedSpiTransport<H: SpiHandle> {
    config: TransportConfig,
    inner: Mutex<Shared<H>>,
}

impl<H: SpiHandle> SharedSpiTransport<H> {
    pub fn open<O>(opener: &O, config: TransportConfig) -> Result<Self, IoFailure>
    where
        O: DeviceOpener<Handle = H> + ?Sized,
    {
        config.validate()?;
        let session = DeviceSession::open(opener, &config)?;
        log::debug!("holding {} open", session.path().display());
        Ok(Self {
            config,
            inner: Mutex::new(Shared {
                session,
                observer: None,
            }),
        })
    }

    pub fn set_observer(&self, observer: BoxedObserver) {
        self.inner.lock().observer = Some(observer);
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    pub fn read_register(&self, register: u8, length: usize) -> Result<Vec<u8>, IoFailure> {
        check_read(&self.config, length)?;
        let mut guard = self.inner.lock();
        let Shared { session, observer } = &mut *guard;
        read_in_session(session, &self.config, register, length, observer.as_mut())
    }

    pub fn write_register(&self, register: u8, payload: &[u8]) -> Result<(), IoFailure> {
        check_write(&self.config, payload.len())?;
        let mut guard = self.inner.lock();
        let Shared { session, observer } = &mut *guard;
        write_in_session(session, &self.config, register, payload, observer.as_mut())
    }
}

impl<H: SpiHandle> RegisterInterface for SharedSpiTransport<H> {
    fn read(&mut self, register: u8, buf: &mut [u8]) -> Result<(), IoFailure> {
        let data = self.read_register(register, buf.len())?;
        buf.copy_from_slice(&data);
        Ok(())
    }

    fn write(&mut self, register: u8, data: &[u8]) -> Result<(), IoFailure> {
        self.write_register(register, data)
    }

    fn max_read(&self) -> usize {
        self.config.max_read
    }

    fn max_write(&self) -> usize {
        self.config.max_write
    }
}
