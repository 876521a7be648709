//! Framed register reads and writes over a single SPI exchange.

use imuprobe_frame::{Direction, RegisterFrame};

use crate::config::TransportConfig;
use crate::error::IoFailure;
use crate::executor::SpiHandle;
use crate::session::{DeviceOpener, DeviceSession};
use crate::trace::BoxedObserver;

/// Reads `length` bytes starting at `register`, opening and closing the
/// device around the transfer.
pub fn read_register<O: DeviceOpener + ?Sized>(
    opener: &O,
    config: &TransportConfig,
    register: u8,
    length: usize,
) -> Result<Vec<u8>, IoFailure> {
    check_read(config, length)?;
    let mut session = DeviceSession::open(opener, config)?;
    read_in_session(&mut session, config, register, length, None)
}

/// Writes `payload` starting at `register`, opening and closing the device
/// around the transfer.
pub fn write_register<O: DeviceOpener + ?Sized>(
    opener: &O,
    config: &TransportConfig,
    register: u8,
    payload: &[u8],
) -> Result<(), IoFailure> {
    check_write(config, payload.len())?;
    let mut session = DeviceSession::open(opener, config)?;
    write_in_session(&mut session, config, register, payload, None)
}

pub(crate) fn check_read(config: &TransportConfig, length: usize) -> Result<(), IoFailure> {
    if length == 0 {
        return Err(IoFailure::InvalidParameter("read length must be at least 1"));
    }
    if length > config.max_read {
        return Err(IoFailure::SizeError {
            requested: length,
            max: config.max_read,
        });
    }
    Ok(())
}

pub(crate) fn check_write(config: &TransportConfig, length: usize) -> Result<(), IoFailure> {
    if length == 0 {
        return Err(IoFailure::InvalidParameter("write payload is empty"));
    }
    if length > config.max_write {
        return Err(IoFailure::SizeError {
            requested: length,
            max: config.max_write,
        });
    }
    Ok(())
}

/// Limits for an unframed exchange; `length` counts the address byte.
pub(crate) fn check_exchange(config: &TransportConfig, length: usize) -> Result<(), IoFailure> {
    let max = config.max_read.max(config.max_write) + 1;
    if length == 0 {
        return Err(IoFailure::InvalidParameter("exchange is empty"));
    }
    if length > max {
        return Err(IoFailure::SizeError {
            requested: length,
            max,
        });
    }
    Ok(())
}

/// Runs an already validated read on an open session.
pub(crate) fn read_in_session<H: SpiHandle>(
    session: &mut DeviceSession<H>,
    config: &TransportConfig,
    register: u8,
    length: usize,
    observer: Option<&mut BoxedObserver>,
) -> Result<Vec<u8>, IoFailure> {
    let frame = RegisterFrame::read(register, length);
    let tx = frame.encode();
    log::debug!("read 0x{:02X} len {}", frame.address, length);

    let rx = session
        .execute(&tx, frame.wire_len(), config)
        .map_err(|e| e.for_register(frame.address, Direction::Read))?;
    if let Some(observer) = observer {
        observer.on_transfer(&tx, &rx);
    }

    match frame.response(&rx) {
        Some(payload) => Ok(payload.to_vec()),
        None => Err(IoFailure::InvalidParameter("short receive buffer")),
    }
}

/// Runs an already validated write on an open session.
pub(crate) fn write_in_session<H: SpiHandle>(
    session: &mut DeviceSession<H>,
    config: &TransportConfig,
    register: u8,
    payload: &[u8],
    observer: Option<&mut BoxedObserver>,
) -> Result<(), IoFailure> {
    let frame = RegisterFrame::write(register, payload);
    let tx = frame.encode();
    log::debug!("write 0x{:02X} len {}", frame.address, payload.len());

    let rx = session
        .execute(&tx, frame.wire_len(), config)
        .map_err(|e| e.for_register(frame.address, Direction::Write))?;
    if let Some(observer) = observer {
        observer.on_transfer(&tx, &rx);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockBus;
    use std::io;

    #[test]
    fn test_whoami_read_drops_echo_byte() {
        let bus = MockBus::new();
        bus.queue_reply(&[0xFF, 0x6F]);
        let config = TransportConfig::default();

        let data = read_register(&bus, &config, 0x75, 1).unwrap();
        assert_eq!(data, vec![0x6F]);
        assert_eq!(bus.transactions()[0].tx, vec![0xF5, 0x00]);
        assert_eq!(bus.closes(), 1);
    }

    #[test]
    fn test_read_clocks_length_plus_one() {
        let bus = MockBus::new();
        let config = TransportConfig::default();
        for length in [1usize, 2, 14, 256] {
            bus.clear_transactions();
            let data = read_register(&bus, &config, 0x1D, length).unwrap();
            assert_eq!(data.len(), length);
            let tx = &bus.transactions()[0].tx;
            assert_eq!(tx.len(), length + 1);
            assert_eq!(tx[0], 0x9D);
            assert!(tx[1..].iter().all(|&b| b == 0));
        }
    }

    #[test]
    fn test_write_frame() {
        let bus = MockBus::new();
        let config = TransportConfig::default();
        write_register(&bus, &config, 0x20, &[0x01, 0x02]).unwrap();
        assert_eq!(bus.transactions()[0].tx, vec![0x20, 0x01, 0x02]);
    }

    #[test]
    fn test_address_bit_for_every_register() {
        let bus = MockBus::new();
        let config = TransportConfig::default();
        for register in 0..=0x7Fu8 {
            read_register(&bus, &config, register, 1).unwrap();
            write_register(&bus, &config, register, &[0]).unwrap();
        }
        let txs = bus.transactions();
        for (register, pair) in (0..=0x7Fu8).zip(txs.chunks(2)) {
            assert_eq!(pair[0].tx[0], register | 0x80);
            assert_eq!(pair[1].tx[0], register & 0x7F);
        }
    }

    #[test]
    fn test_zero_length_rejected_without_io() {
        let bus = MockBus::new();
        let config = TransportConfig::default();
        assert!(matches!(
            read_register(&bus, &config, 0x75, 0),
            Err(IoFailure::InvalidParameter(_))
        ));
        assert!(matches!(
            write_register(&bus, &config, 0x20, &[]),
            Err(IoFailure::InvalidParameter(_))
        ));
        assert_eq!(bus.opens(), 0);
        assert!(bus.transactions().is_empty());
    }

    #[test]
    fn test_oversized_requests_never_open() {
        let bus = MockBus::new();
        let config = TransportConfig::default();
        assert!(matches!(
            read_register(&bus, &config, 0x30, 257),
            Err(IoFailure::SizeError { requested: 257, max: 256 })
        ));
        assert!(matches!(
            write_register(&bus, &config, 0x30, &[0u8; 300]),
            Err(IoFailure::SizeError { requested: 300, max: 256 })
        ));
        assert_eq!(bus.opens(), 0);
    }

    #[test]
    fn test_transfer_failure_is_io_error_and_closes() {
        let bus = MockBus::new();
        bus.fail_next_transfer(io::ErrorKind::ResourceBusy);
        let config = TransportConfig::default();

        let err = read_register(&bus, &config, 0x75, 1).unwrap_err();
        match err {
            IoFailure::IoError { register, direction, source } => {
                assert_eq!(register, 0x75);
                assert_eq!(direction, Direction::Read);
                assert_eq!(source.kind(), io::ErrorKind::ResourceBusy);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(bus.opens(), 1);
        assert_eq!(bus.closes(), 1);
    }

    #[test]
    fn test_missing_device_no_transfer() {
        let bus = MockBus::new();
        bus.fail_open(io::ErrorKind::NotFound);
        let config = TransportConfig::new("/dev/spidev7.7");
        assert!(matches!(
            read_register(&bus, &config, 0x75, 1),
            Err(IoFailure::OpenError { .. })
        ));
        assert!(bus.transactions().is_empty());
    }
}
