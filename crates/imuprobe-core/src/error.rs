use imuprobe_frame::Direction;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Everything that can go wrong between a register request and the bus.
#[derive(Debug, Error)]
pub enum IoFailure {
    #[error("invalid parameter: {0}")]
    InvalidParameter(&'static str),

    #[error("failed to open {}: {source}", .path.display())]
    OpenError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("transfer of {requested} bytes exceeds the {max} byte limit")]
    SizeError { requested: usize, max: usize },

    #[error("SPI transfer failed: {0}")]
    TransferError(#[source] io::Error),

    #[error("{direction} of register 0x{register:02X} failed: {source}")]
    IoError {
        register: u8,
        direction: Direction,
        #[source]
        source: io::Error,
    },
}

impl IoFailure {
    /// OS error code behind the failure, when there is one.
    pub fn errno(&self) -> Option<i32> {
        match self {
            IoFailure::OpenError { source, .. }
            | IoFailure::TransferError(source)
            | IoFailure::IoError { source, .. } => source.raw_os_error(),
            IoFailure::InvalidParameter(_) | IoFailure::SizeError { .. } => None,
        }
    }

    /// Tags an executor failure with the register access it belonged to.
    pub(crate) fn for_register(self, register: u8, direction: Direction) -> Self {
        match self {
            IoFailure::TransferError(source) => IoFailure::IoError {
                register,
                direction,
                source,
            },
            other => other,
        }
    }
}
