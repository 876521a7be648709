//! In-memory SPI bus for tests.
//!
//! Records every transfer and counts opens and closes so callers can verify
//! framing and handle lifetimes without hardware.

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::io;
use std::sync::Arc;

use crate::config::{TransferParams, TransportConfig};
use crate::executor::SpiHandle;
use crate::session::DeviceOpener;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub tx: Vec<u8>,
    pub params: TransferParams,
}

enum Reply {
    Data(Vec<u8>),
    Fail(io::ErrorKind),
}

#[derive(Default)]
struct State {
    opens: usize,
    closes: usize,
    open_failure: Option<io::ErrorKind>,
    replies: VecDeque<Reply>,
    transactions: Vec<Transaction>,
}

/// Cloneable handle on a shared fake bus. Every clone sees the same state.
#[derive(Clone, Default)]
pub struct MockBus {
    state: Arc<Mutex<State>>,
}

impl MockBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues bytes to shift back on the next transfer. Short replies are
    /// padded with zeros, long ones truncated.
    pub fn queue_reply(&self, rx: &[u8]) {
        self.state.lock().replies.push_back(Reply::Data(rx.to_vec()));
    }

    pub fn fail_next_transfer(&self, kind: io::ErrorKind) {
        self.state.lock().replies.push_back(Reply::Fail(kind));
    }

    /// Makes every following open fail until [`MockBus::allow_open`].
    pub fn fail_open(&self, kind: io::ErrorKind) {
        self.state.lock().open_failure = Some(kind);
    }

    pub fn allow_open(&self) {
        self.state.lock().open_failure = None;
    }

    pub fn opens(&self) -> usize {
        self.state.lock().opens
    }

    pub fn closes(&self) -> usize {
        self.state.lock().closes
    }

    pub fn transactions(&self) -> Vec<Transaction> {
        self.state.lock().transactions.clone()
    }

    pub fn clear_transactions(&self) {
        self.state.lock().transactions.clear();
    }
}

impl DeviceOpener for MockBus {
    type Handle = MockHandle;

    fn open(&self, _config: &TransportConfig) -> io::Result<MockHandle> {
        let mut state = self.state.lock();
        if let Some(kind) = state.open_failure {
            return Err(io::Error::from(kind));
        }
        state.opens += 1;
        Ok(MockHandle {
            state: Arc::clone(&self.state),
        })
    }
}

/// Handle returned by [`MockBus`]; counts as closed when dropped.
pub struct MockHandle {
    state: Arc<Mutex<State>>,
}

impl SpiHandle for MockHandle {
    fn transfer(&mut self, tx: &[u8], rx: &mut [u8], params: &TransferParams) -> io::Result<()> {
        let mut state = self.state.lock();
        state.transactions.push(Transaction {
            tx: tx.to_vec(),
            params: *params,
        });
        rx.fill(0);
        match state.replies.pop_front() {
            Some(Reply::Data(data)) => {
                let n = rx.len().min(data.len());
                rx[..n].copy_from_slice(&data[..n]);
                Ok(())
            }
            Some(Reply::Fail(kind)) => Err(io::Error::from(kind)),
            None => Ok(()),
        }
    }
}

impl Drop for MockHandle {
    fn drop(&mut self) {
        self.state.lock().closes += 1;
    }
}
