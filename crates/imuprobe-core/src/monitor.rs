use crossbeam_channel::{unbounded, Receiver, Sender};
use std::thread::JoinHandle;
use std::time::Duration;

use crate::platform::Clock;
use crate::transport::RegisterInterface;

#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub register: u8,
    pub length: usize,
    pub interval: Duration,
    /// Stop after this many polls; `None` runs until [`RegisterMonitor::stop`].
    pub count: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MonitorEvent {
    Sample { timestamp_us: u64, data: Vec<u8> },
    Error(String),
    Stopped,
}

enum Command {
    Stop,
}

/// Polls a register window from a worker thread that owns the transport.
pub struct RegisterMonitor {
    tx_cmd: Sender<Command>,
    rx_evt: Receiver<MonitorEvent>,
    worker: Option<JoinHandle<()>>,
}

impl RegisterMonitor {
    pub fn spawn<T, C>(mut transport: T, clock: C, cfg: MonitorConfig) -> Self
    where
        T: RegisterInterface + Send + 'static,
        C: Clock + Send + 'static,
    {
        let (tx_cmd, rx_cmd) = unbounded::<Command>();
        let (tx_evt, rx_evt) = unbounded::<MonitorEvent>();

        let worker = std::thread::spawn(move || {
            let interval_us = cfg.interval.as_micros() as u64;
            let mut polls = 0usize;
            loop {
                if let Ok(Command::Stop) = rx_cmd.try_recv() {
                    break;
                }
                if cfg.count.is_some_and(|count| polls >= count) {
                    break;
                }

                let event = match transport.read_vec(cfg.register, cfg.length) {
                    Ok(data) => MonitorEvent::Sample {
                        timestamp_us: clock.now_us(),
                        data,
                    },
                    Err(e) => MonitorEvent::Error(e.to_string()),
                };
                polls += 1;
                if tx_evt.send(event).is_err() {
                    return;
                }

                if cfg.count != Some(polls) && interval_us > 0 {
                    clock.sleep_us(interval_us);
                }
            }
            log::debug!("monitor on 0x{:02X} stopped after {polls} polls", cfg.register);
            let _ = tx_evt.send(MonitorEvent::Stopped);
        });

        Self {
            tx_cmd,
            rx_evt,
            worker: Some(worker),
        }
    }

    pub fn events(&self) -> &Receiver<MonitorEvent> {
        &self.rx_evt
    }

    pub fn stop(&self) {
        let _ = self.tx_cmd.send(Command::Stop);
    }

    /// Waits for the worker to finish. Call [`stop`](Self::stop) first for an
    /// unbounded monitor. A panic on the worker is logged and handed back.
    pub fn join(mut self) -> std::thread::Result<()> {
        match self.worker.take() {
            Some(worker) => worker.join().inspect_err(|_| {
                log::error!("register monitor worker panicked");
            }),
            None => Ok(()),
        }
    }
}

impl Drop for RegisterMonitor {
    fn drop(&mut self) {
        self.stop();
    }
}
