use anyhow::Result;
use clap::Parser;
use imuprobe_app::args::{ReadRequest, WriteRequest};
use imuprobe_app::bringup::Plan;
use imuprobe_app::logging;
use imuprobe_app::settings::{self, Overrides};
use imuprobe_core::TransportConfig;
use imuprobe_frame::SensorSetup;
use std::path::PathBuf;
use std::time::Duration;

/// Bring-up harness for IIM/ICM-42xxx sensors on a Linux spidev node.
#[derive(Parser, Debug)]
#[command(name = "imu-bringup", version)]
struct Args {
    /// SPI device node, e.g. /dev/spidev0.0
    #[arg(short = 'd', long = "device")]
    device: Option<String>,

    /// JSON transport config; defaults to the user config directory
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Clock speed in Hz
    #[arg(short = 's', long = "speed")]
    speed_hz: Option<u32>,

    /// Register write applied after configuration, e.g. 0x4E=0F
    #[arg(long = "write", value_name = "REG=HEX")]
    writes: Vec<WriteRequest>,

    /// Register read after the writes, e.g. 0x1D:14
    #[arg(long = "read", value_name = "REG[:LEN]")]
    reads: Vec<ReadRequest>,

    /// Number of data-register polls
    #[arg(short = 'n', long, default_value_t = 10)]
    samples: usize,

    #[arg(long, default_value_t = 1000)]
    interval_ms: u64,

    /// Print samples as JSON lines
    #[arg(long)]
    json: bool,

    /// Leave ranges, rates and power mode as found
    #[arg(long)]
    no_configure: bool,

    /// Dump every bus transfer when done
    #[arg(long)]
    trace: bool,

    /// More log output; repeat for trace level
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(args.verbose);

    let mut config = settings::load(args.config.as_deref())?;
    Overrides {
        device: args.device.clone(),
        speed_hz: args.speed_hz,
    }
    .apply(&mut config);
    config.validate()?;

    let plan = Plan {
        setup: (!args.no_configure).then(SensorSetup::default),
        writes: args.writes.clone(),
        reads: args.reads.clone(),
        samples: args.samples,
        interval: Duration::from_millis(args.interval_ms),
        json: args.json,
    };
    run_on_host(config, &plan, args.trace)
}

#[cfg(target_os = "linux")]
fn run_on_host(config: TransportConfig, plan: &Plan, trace: bool) -> Result<()> {
    use imuprobe_core::{LogObserver, SpiTransport, TransferTrace};
    use parking_lot::Mutex;
    use std::sync::Arc;

    log::info!(
        "opening {} at {} Hz, mode {}",
        config.device_path,
        config.clock_speed_hz,
        config.mode.number()
    );
    let mut transport = SpiTransport::new(config)?;
    let recorder = Arc::new(Mutex::new(TransferTrace::new(1024)));
    if trace {
        transport.set_observer(Box::new(Arc::clone(&recorder)));
    } else {
        transport.set_observer(Box::new(LogObserver));
    }

    let mut out = std::io::stdout().lock();
    let result = imuprobe_app::bringup::run(transport, plan, &mut out);
    drop(out);
    if trace {
        print!("{}", recorder.lock().to_text(true));
    }
    result
}

#[cfg(not(target_os = "linux"))]
fn run_on_host(config: TransportConfig, _plan: &Plan, _trace: bool) -> Result<()> {
    anyhow::bail!("{}: spidev access is only available on Linux", config.device_path)
}
