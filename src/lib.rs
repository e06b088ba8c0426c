//! MPU6000 capture library
//!
//! Drives one or two MPU6000 accelerometer/gyroscope sensors over a
//! register-addressed bus, decodes their output registers and runs a capture
//! loop with a smoothed live preview and a flat text log. Recorded logs can be
//! replayed through the same loop.
//!
//! # Quick Start
//!
//! ## Reading a Sensor
//! ```no_run
//! # #[cfg(target_os = "linux")]
//! # fn main() -> mpu6000_capture::Result<()> {
//! use mpu6000_capture::{LinuxI2cBus, Mpu6000, DEFAULT_ADDRESS};
//!
//! let bus = LinuxI2cBus::new("/dev/i2c-1");
//! let mut sensor = Mpu6000::new(bus, DEFAULT_ADDRESS, false);
//! sensor.configure(Some(1), Some(3))?; // +/-4g, DLPF 3
//!
//! let reading = sensor.read()?;
//! println!("accel {:?} temp {:.1}C", reading.accel, reading.temp);
//! # Ok(())
//! # }
//! # #[cfg(not(target_os = "linux"))]
//! # fn main() {}
//! ```
//!
//! ## Replaying a Recording
//! ```no_run
//! use mpu6000_capture::{CaptureEngine, CaptureSettings, ReplayDevice, SensorSource};
//! use std::sync::atomic::AtomicBool;
//!
//! let device: Box<dyn SensorSource> = Box::new(ReplayDevice::open("capture.txt", 0)?);
//! let mut engine = CaptureEngine::new(vec![device], CaptureSettings::default())?;
//!
//! let summary = engine.run(&AtomicBool::new(true))?;
//! println!("replayed {} samples", summary.ticks);
//! # Ok::<(), mpu6000_capture::Mpu6000Error>(())
//! ```

pub mod capture;
pub mod codec;
pub mod common;
pub mod device;
pub mod error;
#[cfg(target_os = "linux")]
pub mod linux_bus;
pub mod replay;
pub mod transport;
pub mod window;

// Re-export public API
pub use capture::{
    CaptureEngine, CaptureLog, CaptureSettings, CaptureSummary, LogHeader, PreviewMode,
    StreamControl, MAX_DEVICES,
};
pub use codec::{celsius_from_raw, decode_signed16, decode_vector, is_saturated, Vector};
pub use common::{format_bar, TimeKeeper};
pub use device::{
    AccelRange, DeviceConfig, Mpu6000, SensorReading, SensorSource, ALTERNATE_ADDRESS,
    DEFAULT_ADDRESS,
};
pub use error::{Mpu6000Error, Result};
#[cfg(target_os = "linux")]
pub use linux_bus::LinuxI2cBus;
pub use replay::ReplayDevice;
pub use transport::BusTransport;
pub use window::{SlidingWindow, VectorSlidingWindow};
