//! MPU6000 sensor driver over a register-addressed bus

use crate::codec::{celsius_from_raw, decode_signed16, decode_vector, Vector};
use crate::common::TimeKeeper;
use crate::error::{Mpu6000Error, Result};
use crate::transport::BusTransport;

/// Bus address with AD0 pulled low
pub const DEFAULT_ADDRESS: u8 = 0x68;
/// Bus address with AD0 pulled high
pub const ALTERNATE_ADDRESS: u8 = 0x69;

// MPU6000 register addresses
const REG_CONFIG: u8 = 0x1A; // DLPF configuration
const REG_ACCEL_CONFIG: u8 = 0x1C;
const REG_ACCEL_XOUT_H: u8 = 0x3B; // Start of accel, temp, gyro block
const REG_PWR_MGMT_1: u8 = 0x6B;
const REG_PROBE: u8 = 0x00;

// ACCEL_CONFIG holds the range selector in bits 4:3
const ACCEL_RANGE_SHIFT: u8 = 3;
const MAX_LPF: u8 = 6;

const ACCEL_BLOCK_LEN: usize = 6;
const FULL_BLOCK_LEN: usize = 14; // accel (6) + temp (2) + gyro (6)

/// Accelerometer full-scale range
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum AccelRange {
    #[value(name = "2g")]
    G2,
    #[value(name = "4g")]
    G4,
    #[value(name = "8g")]
    G8,
    #[value(name = "16g")]
    G16,
}

impl AccelRange {
    /// Register selector written into ACCEL_CONFIG
    pub fn selector(self) -> u8 {
        match self {
            AccelRange::G2 => 0,
            AccelRange::G4 => 1,
            AccelRange::G8 => 2,
            AccelRange::G16 => 3,
        }
    }

    pub fn from_selector(selector: u8) -> Result<Self> {
        match selector {
            0 => Ok(AccelRange::G2),
            1 => Ok(AccelRange::G4),
            2 => Ok(AccelRange::G8),
            3 => Ok(AccelRange::G16),
            other => Err(Mpu6000Error::InvalidConfig(format!(
                "accel range selector must be 0-3, got {}",
                other
            ))),
        }
    }

    /// Label used on the command line and in log headers
    pub fn label(self) -> &'static str {
        match self {
            AccelRange::G2 => "2g",
            AccelRange::G4 => "4g",
            AccelRange::G8 => "8g",
            AccelRange::G16 => "16g",
        }
    }

    /// Sensitivity in LSB per g
    pub fn lsb_per_g(self) -> f32 {
        match self {
            AccelRange::G2 => 16384.0,
            AccelRange::G4 => 8192.0,
            AccelRange::G8 => 4096.0,
            AccelRange::G16 => 2048.0,
        }
    }
}

/// Fields to write on configuration; `None` leaves the register untouched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeviceConfig {
    pub accel_range: Option<AccelRange>,
    /// Digital low-pass filter index, 0 = disabled
    pub low_pass_filter: Option<u8>,
}

/// One timestamped sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorReading {
    /// Seconds on the source's clock
    pub timestamp: f64,
    pub accel: Vector,
    /// Degrees Celsius; meaningless for accel-only reads
    pub temp: f32,
    /// Raw gyro; zero for accel-only reads
    pub gyro: Vector,
}

impl SensorReading {
    /// Reading carrying only accelerometer data, with placeholder temp/gyro
    pub fn accel_only(timestamp: f64, accel: Vector) -> Self {
        Self {
            timestamp,
            accel,
            temp: celsius_from_raw(0),
            gyro: Vector::ZERO,
        }
    }

    /// True if any accel axis reports a saturation marker
    pub fn is_out_of_range(&self) -> bool {
        self.accel.is_saturated()
    }

    /// Convert raw accelerometer values to g for the given range
    pub fn accel_to_g(&self, range: AccelRange) -> (f32, f32, f32) {
        let scale = range.lsb_per_g();
        (
            self.accel.x as f32 / scale,
            self.accel.y as f32 / scale,
            self.accel.z as f32 / scale,
        )
    }
}

/// Capability shared by live and replayed sensors
pub trait SensorSource {
    /// Liveness probe; never fails
    fn check_alive(&mut self) -> bool;

    /// Bring the sensor out of sleep. No-op when already awake unless `force`.
    fn wake_up(&mut self, force: bool) -> Result<()>;

    /// Next reading, or `None` when the source has no more data
    fn read_sensor(&mut self) -> Result<Option<SensorReading>>;

    /// Current time on the clock readings are stamped with
    fn clock_secs(&self) -> f64;

    /// Short human-readable identity for logs
    fn name(&self) -> String;
}

/// MPU6000 sensor on a bus
pub struct Mpu6000<B: BusTransport> {
    bus: B,
    address: u8,
    accel_only: bool,
    woken: bool,
    clock: TimeKeeper,
}

impl<B: BusTransport> Mpu6000<B> {
    /// Create a driver for the device at `address`. No bus traffic is issued.
    pub fn new(bus: B, address: u8, accel_only: bool) -> Self {
        Self::with_clock(bus, address, accel_only, TimeKeeper::new())
    }

    /// Create a driver stamping readings against an existing clock origin
    pub fn with_clock(bus: B, address: u8, accel_only: bool, clock: TimeKeeper) -> Self {
        Self {
            bus,
            address,
            accel_only,
            woken: false,
            clock,
        }
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    pub fn is_woken(&self) -> bool {
        self.woken
    }

    pub fn is_accel_only(&self) -> bool {
        self.accel_only
    }

    /// Write range and/or low-pass filter settings
    ///
    /// Arguments are validated before anything touches the bus. The device is
    /// woken first so it accepts the writes.
    ///
    /// # Arguments
    /// * `accel_range` - Range selector 0-3 (2g, 4g, 8g, 16g)
    /// * `lpf` - Low-pass filter index 0-6
    pub fn configure(&mut self, accel_range: Option<u8>, lpf: Option<u8>) -> Result<()> {
        if let Some(selector) = accel_range {
            AccelRange::from_selector(selector)?;
        }
        if let Some(lpf) = lpf {
            if lpf > MAX_LPF {
                return Err(Mpu6000Error::InvalidConfig(format!(
                    "low-pass filter must be 0-{}, got {}",
                    MAX_LPF, lpf
                )));
            }
        }

        self.wake_up(false)?;

        if let Some(selector) = accel_range {
            self.write_register(REG_ACCEL_CONFIG, selector << ACCEL_RANGE_SHIFT)?;
        }
        if let Some(lpf) = lpf {
            self.write_register(REG_CONFIG, lpf)?;
        }

        Ok(())
    }

    /// Apply a typed configuration
    pub fn apply(&mut self, config: &DeviceConfig) -> Result<()> {
        self.configure(
            config.accel_range.map(AccelRange::selector),
            config.low_pass_filter,
        )
    }

    /// Read one sample with a single block read
    pub fn read(&mut self) -> Result<SensorReading> {
        let len = if self.accel_only {
            ACCEL_BLOCK_LEN
        } else {
            FULL_BLOCK_LEN
        };

        let address = self.address;
        let data = self
            .bus
            .read_block(address, REG_ACCEL_XOUT_H, len)
            .map_err(|source| Mpu6000Error::Bus { address, source })?;
        let timestamp = self.clock.elapsed_secs();

        if data.len() != len {
            return Err(Mpu6000Error::Decode {
                expected: len,
                actual: data.len(),
            });
        }

        let accel = decode_vector(&data[0..6])?;
        if self.accel_only {
            return Ok(SensorReading::accel_only(timestamp, accel));
        }

        Ok(SensorReading {
            timestamp,
            accel,
            temp: celsius_from_raw(decode_signed16(&data[6..8])?),
            gyro: decode_vector(&data[8..14])?,
        })
    }

    fn write_register(&mut self, reg: u8, value: u8) -> Result<()> {
        log::debug!(
            "0x{:02X}: write reg 0x{:02X} = 0x{:02X}",
            self.address,
            reg,
            value
        );
        let address = self.address;
        self.bus
            .write_byte(address, reg, value)
            .map_err(|source| Mpu6000Error::Bus { address, source })
    }
}

impl<B: BusTransport> SensorSource for Mpu6000<B> {
    fn check_alive(&mut self) -> bool {
        match self.bus.read_byte(self.address, REG_PROBE) {
            Ok(_) => true,
            Err(e) => {
                log::debug!("0x{:02X}: liveness probe failed: {}", self.address, e);
                false
            }
        }
    }

    fn wake_up(&mut self, force: bool) -> Result<()> {
        if self.woken && !force {
            return Ok(());
        }
        // Clearing PWR_MGMT_1 clears the sleep bit
        self.write_register(REG_PWR_MGMT_1, 0x00)?;
        self.woken = true;
        Ok(())
    }

    fn read_sensor(&mut self) -> Result<Option<SensorReading>> {
        self.read().map(Some)
    }

    fn clock_secs(&self) -> f64 {
        self.clock.elapsed_secs()
    }

    fn name(&self) -> String {
        format!("MPU6000@0x{:02X}", self.address)
    }
}
