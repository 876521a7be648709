use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Hook invoked after every completed transfer with the bytes sent and
/// received. This is where diagnostics go; the transport itself never prints.
pub trait TransferObserver {
    fn on_transfer(&mut self, tx: &[u8], rx: &[u8]);
}

pub type BoxedObserver = Box<dyn TransferObserver + Send>;

impl<T: TransferObserver + ?Sized> TransferObserver for Arc<Mutex<T>> {
    fn on_transfer(&mut self, tx: &[u8], rx: &[u8]) {
        self.lock().on_transfer(tx, rx);
    }
}

/// Forwards every transfer to the `log` facade at trace level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl TransferObserver for LogObserver {
    fn on_transfer(&mut self, tx: &[u8], rx: &[u8]) {
        log::trace!("tx {:02X?} rx {:02X?}", tx, rx);
    }
}

#[derive(Debug, Clone)]
pub struct TraceEntry {
    pub timestamp: u64,
    pub direction: TraceDirection,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TraceDirection {
    Rx,
    Tx,
}

/// Bounded record of bus traffic, oldest entries dropped first.
pub struct TransferTrace {
    entries: VecDeque<TraceEntry>,
    max_entries: usize,
    filter_rx: bool,
    filter_tx: bool,
}

impl TransferTrace {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            max_entries,
            filter_rx: true,
            filter_tx: true,
        }
    }

    pub fn set_filter(&mut self, show_rx: bool, show_tx: bool) {
        self.filter_rx = show_rx;
        self.filter_tx = show_tx;
    }

    pub fn push(&mut self, direction: TraceDirection, data: Vec<u8>) {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);

        self.entries.push_back(TraceEntry {
            timestamp,
            direction,
            data,
        });

        while self.entries.len() > self.max_entries {
            self.entries.pop_front();
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = &TraceEntry> {
        self.entries.iter()
    }

    /// One line per entry: `[hh:mm:ss.mmm] TX: 9D 00 00`, times in UTC.
    pub fn to_text(&self, show_timestamp: bool) -> String {
        let mut result = String::new();
        for entry in &self.entries {
            if (entry.direction == TraceDirection::Rx && !self.filter_rx)
                || (entry.direction == TraceDirection::Tx && !self.filter_tx)
            {
                continue;
            }

            if show_timestamp {
                let millis = entry.timestamp % 1000;
                let secs = entry.timestamp / 1000;
                let hours = (secs / 3600) % 24;
                let minutes = (secs / 60) % 60;
                let seconds = secs % 60;
                result.push_str(&format!("[{hours:02}:{minutes:02}:{seconds:02}.{millis:03}] "));
            }
            result.push_str(match entry.direction {
                TraceDirection::Rx => "RX:",
                TraceDirection::Tx => "TX:",
            });
            for byte in &entry.data {
                result.push_str(&format!(" {byte:02X}"));
            }
            result.push('\n');
        }
        result
    }
}

impl TransferObserver for TransferTrace {
    fn on_transfer(&mut self, tx: &[u8], rx: &[u8]) {
        self.push(TraceDirection::Tx, tx.to_vec());
        self.push(TraceDirection::Rx, rx.to_vec());
    }
}
