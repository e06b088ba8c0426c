//! MPU6000 capture - live preview and logging for one or two sensors
//!
//! Usage:
//!   mpu6000-capture --accel-range 4g --lpf 3 --devices 2 capture.txt
//!   mpu6000-capture --replay capture.txt --devices 2

use clap::Parser;
use mpu6000_capture::{
    AccelRange, CaptureEngine, CaptureLog, CaptureSettings, LogHeader, Mpu6000Error,
    PreviewMode, ReplayDevice, SensorSource,
};
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

type Devices = Vec<Box<dyn SensorSource>>;

#[derive(Parser, Debug)]
#[command(name = "mpu6000-capture")]
#[command(about = "Capture data from MPU6000 accelerometers via I2C", long_about = None)]
struct Args {
    /// Log file to write (the preview is off by default when set)
    destination: Option<PathBuf>,

    /// Accelerometer range to configure
    #[arg(long, value_enum, default_value = "2g")]
    accel_range: AccelRange,

    /// Low-pass filter config (0 = no filtering)
    #[arg(long, default_value = "0", value_parser = clap::value_parser!(u8).range(0..=6))]
    lpf: u8,

    /// Force the live preview on
    #[arg(long)]
    preview: bool,

    /// Force the live preview off
    #[arg(long)]
    no_preview: bool,

    /// Characters per axis in the preview graph
    #[arg(long, default_value = "30")]
    preview_width: usize,

    /// Samples averaged per axis in the preview
    #[arg(long, default_value = "10", value_parser = clap::value_parser!(u32).range(1..))]
    preview_window: u32,

    /// Minimum seconds between preview lines
    #[arg(long, default_value = "0.1")]
    preview_period: f64,

    /// Number of devices to capture from (second one at the alternate address)
    #[arg(long, default_value = "1", value_parser = clap::value_parser!(u8).range(1..=2))]
    devices: u8,

    /// Free-text note stored in the log header
    #[arg(long)]
    note: Option<String>,

    /// I2C bus device node
    #[arg(long, default_value = "/dev/i2c-1")]
    bus: PathBuf,

    /// Also read temperature and gyro (14-byte block instead of 6)
    #[arg(long)]
    with_gyro: bool,

    /// Replay a recorded log instead of reading the bus
    #[arg(long)]
    replay: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let num_devices = args.devices as usize;

    let has_destination = args.destination.is_some();
    let preview = PreviewMode::resolve(args.preview, args.no_preview, has_destination);
    log::info!(
        "Devices: {} | Range: {} | LPF: {} | Preview: {:?}",
        num_devices,
        args.accel_range.label(),
        args.lpf,
        preview
    );

    let devices = match open_devices(&args, num_devices) {
        Ok(devices) => devices,
        Err(Mpu6000Error::NotResponding(address)) => {
            eprintln!("Error: no MPU6000 responding at 0x{:02X}.", address);
            eprintln!("Please check:");
            eprintln!("  1. The sensor is powered and wired to {}", args.bus.display());
            eprintln!("  2. AD0 selects the expected address (0x68 low, 0x69 high)");
            eprintln!("  3. The i2c-dev kernel module is loaded");
            return Err(Box::new(Mpu6000Error::NotResponding(address)));
        }
        Err(e) => {
            eprintln!("Error initializing devices: {}", e);
            return Err(Box::new(e));
        }
    };

    let settings = CaptureSettings {
        preview: preview.enabled(),
        preview_width: args.preview_width,
        preview_window: args.preview_window as usize,
        preview_period: args.preview_period,
        ..CaptureSettings::default()
    };
    let mut engine = CaptureEngine::new(devices, settings)?;

    if let Some(dest) = &args.destination {
        let mut header = LogHeader::new(engine.num_devices());
        header.note = args.note.clone();
        if args.replay.is_none() {
            header.lpf = Some(args.lpf);
            header.accel_range = Some(args.accel_range);
        }
        log::info!("Logging to {}", dest.display());
        engine = engine.with_log(CaptureLog::create(dest, &header)?);
    } else if preview.echoes_raw(has_destination) {
        log::info!("Preview off and no log file; writing raw samples to stdout");
        engine = engine.with_log(CaptureLog::raw(Box::new(io::stdout())));
    }

    // Setup Ctrl+C handler
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })?;

    let summary = engine.run(&running)?;
    log::info!(
        "Capture complete: {} samples over {:.2}s ({} out of range)",
        summary.ticks,
        summary.elapsed,
        summary.out_of_range
    );

    Ok(())
}

fn open_devices(args: &Args, num_devices: usize) -> mpu6000_capture::Result<Devices> {
    match &args.replay {
        Some(path) => {
            log::info!("Replaying {}", path.display());
            let mut devices: Devices = Vec::with_capacity(num_devices);
            for index in 0..num_devices {
                devices.push(Box::new(ReplayDevice::open(path, index)?));
            }
            Ok(devices)
        }
        None => open_live(args, num_devices),
    }
}

#[cfg(target_os = "linux")]
fn open_live(args: &Args, num_devices: usize) -> mpu6000_capture::Result<Devices> {
    use mpu6000_capture::{
        DeviceConfig, LinuxI2cBus, Mpu6000, TimeKeeper, ALTERNATE_ADDRESS, DEFAULT_ADDRESS,
    };
    use std::cell::RefCell;
    use std::rc::Rc;

    let bus = Rc::new(RefCell::new(LinuxI2cBus::new(&args.bus)));
    log::info!("Opening I2C bus {}", bus.borrow().path().display());
    let clock = TimeKeeper::new();
    let config = DeviceConfig {
        accel_range: Some(args.accel_range),
        low_pass_filter: Some(args.lpf),
    };

    let mut devices: Devices = Vec::with_capacity(num_devices);
    for &address in [DEFAULT_ADDRESS, ALTERNATE_ADDRESS].iter().take(num_devices) {
        let mut device = Mpu6000::with_clock(Rc::clone(&bus), address, !args.with_gyro, clock);
        if !device.check_alive() {
            return Err(Mpu6000Error::NotResponding(address));
        }
        device.apply(&config)?;
        let block = match device.is_accel_only() {
            true => "accel only",
            false => "accel, temp, gyro",
        };
        log::info!("{} configured ({})", device.name(), block);
        devices.push(Box::new(device));
    }
    Ok(devices)
}

#[cfg(not(target_os = "linux"))]
fn open_live(_args: &Args, _num_devices: usize) -> mpu6000_capture::Result<Devices> {
    Err(Mpu6000Error::InvalidConfig(
        "live capture needs Linux i2c-dev; use --replay on this platform".to_string(),
    ))
}
