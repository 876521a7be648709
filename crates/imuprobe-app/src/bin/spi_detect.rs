use clap::Parser;
use imuprobe_core::config::DEFAULT_DEVICE;
use imuprobe_core::TransportConfig;
use imuprobe_frame::Chip;
use std::process::ExitCode;

/// Checks for an IIM-42652 on a spidev node by reading WHOAMI.
#[derive(Parser, Debug)]
#[command(name = "spi-detect", version)]
struct Args {
    /// SPI device node
    #[arg(short = 'd', long = "device", default_value = DEFAULT_DEVICE)]
    device: String,

    /// Clock speed in Hz
    #[arg(short = 's', long = "speed", default_value_t = 1_000_000)]
    speed_hz: u32,

    /// More log output; repeat for trace level
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let args = Args::parse();
    imuprobe_app::logging::init(args.verbose);

    let config = TransportConfig {
        clock_speed_hz: args.speed_hz,
        ..TransportConfig::new(args.device)
    };

    match detect(config) {
        Ok(true) => {
            println!("\nDetection completed: SUCCESS");
            ExitCode::SUCCESS
        }
        Ok(false) => {
            println!("\nDetection completed: FAILED");
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("Error: {e:#}");
            println!("\nDetection completed: FAILED");
            ExitCode::FAILURE
        }
    }
}

#[cfg(target_os = "linux")]
fn detect(config: TransportConfig) -> anyhow::Result<bool> {
    let mut transport = imuprobe_core::SpiTransport::new(config)?;
    let mut out = std::io::stdout().lock();
    imuprobe_app::detect::run(&mut transport, Chip::Iim42652, &mut out)
}

#[cfg(not(target_os = "linux"))]
fn detect(config: TransportConfig) -> anyhow::Result<bool> {
    anyhow::bail!(
        "{}: spidev access is only available on Linux (expected WHOAMI 0x{:02X})",
        config.device_path,
        Chip::Iim42652.whoami()
    )
}
