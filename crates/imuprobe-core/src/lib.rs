//! SPI register transport for IIM/ICM-42xxx IMUs on Linux spidev.

pub mod config;
pub mod error;
pub mod executor;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod monitor;
pub mod platform;
pub mod register;
pub mod session;
#[cfg(target_os = "linux")]
pub mod spidev;
pub mod trace;
pub mod transport;

pub use config::{SpiMode, TransferParams, TransportConfig};
pub use error::IoFailure;
pub use executor::{execute, SpiHandle};
pub use monitor::{MonitorConfig, MonitorEvent, RegisterMonitor};
pub use platform::{Clock, SystemClock};
pub use register::{read_register, write_register};
pub use session::{DeviceOpener, DeviceSession};
#[cfg(target_os = "linux")]
pub use spidev::SpidevOpener;
pub use trace::{BoxedObserver, LogObserver, TraceDirection, TraceEntry, TransferObserver, TransferTrace};
pub use transport::{RegisterInterface, SerifType, SharedSpiTransport, SpiTransport};
