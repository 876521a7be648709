//! The bring-up sequence: identify the sensor, power it up, apply register
//! pokes, then poll the data registers.

use anyhow::{anyhow, Context, Result};
use imuprobe_core::{
    Clock, DeviceOpener, MonitorConfig, MonitorEvent, RegisterMonitor, SpiTransport, SystemClock,
};
use imuprobe_frame::setup::{GYRO_STARTUP_US, PWR_MGMT0};
use imuprobe_frame::{RawSample, SensorSetup, SAMPLE_LEN, TEMP_DATA1};
use serde::Serialize;
use std::io::Write;
use std::time::Duration;

use crate::args::{ReadRequest, WriteRequest};
use crate::detect;

#[derive(Debug, Clone)]
pub struct Plan {
    /// Ranges and rates written before anything else; `None` leaves the
    /// sensor as found.
    pub setup: Option<SensorSetup>,
    pub writes: Vec<WriteRequest>,
    pub reads: Vec<ReadRequest>,
    pub samples: usize,
    pub interval: Duration,
    pub json: bool,
}

/// Axes whose sensor is off are `null`.
#[derive(Serialize)]
struct SampleLine {
    timestamp_us: u64,
    temperature_c: Option<f32>,
    accel: Option<[i16; 3]>,
    gyro: Option<[i16; 3]>,
}

pub fn run<O>(mut transport: SpiTransport<O>, plan: &Plan, out: &mut impl Write) -> Result<()>
where
    O: DeviceOpener + Send + 'static,
{
    let detection = detect::probe(&mut transport).context("checking imu type")?;
    writeln!(
        out,
        "raw exchange: {:02X} {:02X}",
        detection.raw[0], detection.raw[1]
    )?;
    writeln!(out, "WHOAMI register value: 0x{:02X}", detection.whoami)?;
    let chip = detection
        .chip
        .ok_or_else(|| anyhow!("unrecognised WHOAMI 0x{:02X}", detection.whoami))?;
    writeln!(out, "Detected {chip}")?;

    let clock = SystemClock::new();
    if let Some(setup) = &plan.setup {
        for (register, value) in setup.writes() {
            transport
                .write_register(register, &[value])
                .with_context(|| format!("configuring register 0x{register:02X}"))?;
            if register == PWR_MGMT0 {
                clock.sleep_us(GYRO_STARTUP_US);
            }
        }
        writeln!(
            out,
            "Configured {:?}, {:?} at {:?}, low-noise mode",
            setup.accel_range, setup.gyro_range, setup.odr
        )?;
    }

    for write in &plan.writes {
        transport
            .write_register(write.register, &write.data)
            .with_context(|| format!("writing register 0x{:02X}", write.register))?;
        writeln!(out, "wrote 0x{:02X}: {}", write.register, hex::encode_upper(&write.data))?;
    }

    for read in &plan.reads {
        let data = transport
            .read_register(read.register, read.length)
            .with_context(|| format!("reading register 0x{:02X}", read.register))?;
        writeln!(out, "0x{:02X}: {}", read.register, hex::encode_upper(&data))?;
    }

    if plan.samples == 0 {
        return Ok(());
    }

    let monitor = RegisterMonitor::spawn(
        transport,
        clock,
        MonitorConfig {
            register: TEMP_DATA1,
            length: SAMPLE_LEN,
            interval: plan.interval,
            count: Some(plan.samples),
        },
    );

    for event in monitor.events().iter() {
        match event {
            MonitorEvent::Sample { timestamp_us, data } => match RawSample::from_bytes(&data) {
                Some(sample) => write_sample(out, timestamp_us, &sample, plan.json)?,
                None => log::warn!("short sample: {}", hex::encode_upper(&data)),
            },
            MonitorEvent::Error(e) => log::warn!("poll failed: {e}"),
            MonitorEvent::Stopped => break,
        }
    }
    monitor
        .join()
        .map_err(|_| anyhow!("sample polling thread panicked"))
}

fn write_sample(out: &mut impl Write, timestamp_us: u64, sample: &RawSample, json: bool) -> Result<()> {
    let temperature = sample.temperature_valid().then(|| sample.temperature_c());
    let accel = sample.accel_valid().then_some(sample.accel);
    let gyro = sample.gyro_valid().then_some(sample.gyro);

    if json {
        let line = SampleLine {
            timestamp_us,
            temperature_c: temperature,
            accel,
            gyro,
        };
        serde_json::to_writer(&mut *out, &line)?;
        writeln!(out)?;
        return Ok(());
    }

    let axes = |values: Option<[i16; 3]>| match values {
        Some([x, y, z]) => format!("{x}, {y}, {z}"),
        None => "sensor off".to_string(),
    };
    let temperature = match temperature {
        Some(t) => format!("{t:.2} C"),
        None => "sensor off".to_string(),
    };
    writeln!(
        out,
        "Accel[X,Y,Z]: {} | Gyro[X,Y,Z]: {} | Temp: {temperature}",
        axes(accel),
        axes(gyro)
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use imuprobe_core::mock::MockBus;
    use imuprobe_core::TransportConfig;

    fn plan(samples: usize) -> Plan {
        Plan {
            setup: None,
            writes: vec![],
            reads: vec![],
            samples,
            interval: Duration::ZERO,
            json: false,
        }
    }

    fn transport(bus: &MockBus) -> SpiTransport<MockBus> {
        SpiTransport::with_opener(TransportConfig::default(), bus.clone()).unwrap()
    }

    #[test]
    fn test_unknown_chip_aborts() {
        let bus = MockBus::new();
        bus.queue_reply(&[0x00, 0x12]);
        bus.queue_reply(&[0x00, 0x12]);
        let mut out = Vec::new();
        let err = run(transport(&bus), &plan(0), &mut out).unwrap_err();
        assert!(err.to_string().contains("0x12"));
    }

    #[test]
    fn test_pokes_then_samples() {
        let bus = MockBus::new();
        bus.queue_reply(&[0x00, 0x6F]);
        bus.queue_reply(&[0x00, 0x6F]);
        bus.queue_reply(&[0x00, 0x00]); // write echo
        bus.queue_reply(&[0x00, 0x0F]);
        let mut sample = vec![0x00; SAMPLE_LEN + 1];
        sample[3..5].copy_from_slice(&[0x08, 0x00]);
        bus.queue_reply(&sample);

        let plan = Plan {
            writes: vec!["0x4E=0F".parse().unwrap()],
            reads: vec!["0x4E".parse().unwrap()],
            ..plan(1)
        };
        let mut out = Vec::new();
        run(transport(&bus), &plan, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("Detected IIM-42652"));
        assert!(text.contains("wrote 0x4E: 0F"));
        assert!(text.contains("0x4E: 0F\n"));
        assert!(text.contains("Accel[X,Y,Z]: 2048, 0, 0"));

        let txs = bus.transactions();
        assert_eq!(txs[2].tx, vec![0x4E, 0x0F]);
        assert_eq!(txs[3].tx, vec![0xCE, 0x00]);
        assert_eq!(txs[4].tx[0], 0x9D);
        assert_eq!(txs[4].tx.len(), SAMPLE_LEN + 1);
    }

    #[test]
    fn test_json_samples() {
        let bus = MockBus::new();
        bus.queue_reply(&[0x00, 0x47]);
        bus.queue_reply(&[0x00, 0x47]);
        let mut out = Vec::new();
        run(transport(&bus), &Plan { json: true, ..plan(2) }, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().filter(|l| l.starts_with('{')).collect();
        assert_eq!(lines.len(), 2);
        let value: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(value["accel"], serde_json::json!([0, 0, 0]));
        assert_eq!(value["temperature_c"], serde_json::json!(25.0));
    }

    #[test]
    fn test_setup_powers_sensor_before_sampling() {
        let bus = MockBus::new();
        bus.queue_reply(&[0x00, 0x6F]);
        bus.queue_reply(&[0x00, 0x6F]);
        let mut out = Vec::new();
        let plan = Plan {
            setup: Some(SensorSetup::default()),
            ..plan(1)
        };
        run(transport(&bus), &plan, &mut out).unwrap();

        let txs: Vec<_> = bus.transactions().into_iter().map(|t| t.tx).collect();
        assert_eq!(txs[2], vec![0x4F, 0x09]);
        assert_eq!(txs[3], vec![0x50, 0x09]);
        assert_eq!(txs[4], vec![0x4E, 0x0F]);
        assert_eq!(txs[5][0], 0x9D);
        assert!(String::from_utf8(out).unwrap().contains("low-noise"));
    }

    #[test]
    fn test_sleeping_sensor_is_not_reported_as_data() {
        let bus = MockBus::new();
        bus.queue_reply(&[0x00, 0x6F]);
        bus.queue_reply(&[0x00, 0x6F]);
        let mut window = vec![0x00];
        for _ in 0..7 {
            window.extend_from_slice(&[0x80, 0x00]);
        }
        bus.queue_reply(&window);

        let mut out = Vec::new();
        run(transport(&bus), &plan(1), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Accel[X,Y,Z]: sensor off | Gyro[X,Y,Z]: sensor off | Temp: sensor off"));
        assert!(!text.contains("-32768"));
    }

    #[test]
    fn test_sleeping_sensor_json_is_null() {
        let bus = MockBus::new();
        bus.queue_reply(&[0x00, 0x6F]);
        bus.queue_reply(&[0x00, 0x6F]);
        let mut window = vec![0x00, 0x00, 0x00];
        for _ in 0..3 {
            window.extend_from_slice(&[0x80, 0x00]);
        }
        window.extend_from_slice(&[0x00, 0x01, 0x00, 0x02, 0x00, 0x03]);
        bus.queue_reply(&window);

        let mut out = Vec::new();
        run(transport(&bus), &Plan { json: true, ..plan(1) }, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let line = text.lines().find(|l| l.starts_with('{')).unwrap();
        let value: serde_json::Value = serde_json::from_str(line).unwrap();
        assert_eq!(value["accel"], serde_json::Value::Null);
        assert_eq!(value["gyro"], serde_json::json!([1, 2, 3]));
    }
}
