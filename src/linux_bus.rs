//! Linux i2c-dev transport
//!
//! Opens `/dev/i2c-N` once per slave address on first use.

use crate::transport::BusTransport;
use i2cdev::core::I2CDevice;
use i2cdev::linux::{LinuxI2CDevice, LinuxI2CError};
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

// SMBus block reads are limited to 32 bytes
const MAX_BLOCK_LEN: usize = 32;

/// I2C bus exposed by the kernel's i2c-dev driver
pub struct LinuxI2cBus {
    path: PathBuf,
    devices: HashMap<u8, LinuxI2CDevice>,
}

impl LinuxI2cBus {
    /// Bind to a bus node such as `/dev/i2c-1`; nothing is opened yet
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            devices: HashMap::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn device(&mut self, address: u8) -> io::Result<&mut LinuxI2CDevice> {
        if !self.devices.contains_key(&address) {
            let dev = LinuxI2CDevice::new(&self.path, address as u16).map_err(to_io)?;
            log::debug!("Opened {} for address 0x{:02X}", self.path.display(), address);
            self.devices.insert(address, dev);
        }
        self.devices
            .get_mut(&address)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "i2c handle missing"))
    }
}

impl BusTransport for LinuxI2cBus {
    fn read_block(&mut self, address: u8, register: u8, length: usize) -> io::Result<Vec<u8>> {
        if length > MAX_BLOCK_LEN {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("block read of {} bytes exceeds {}", length, MAX_BLOCK_LEN),
            ));
        }
        self.device(address)?
            .smbus_read_i2c_block_data(register, length as u8)
            .map_err(to_io)
    }

    fn read_byte(&mut self, address: u8, register: u8) -> io::Result<u8> {
        self.device(address)?
            .smbus_read_byte_data(register)
            .map_err(to_io)
    }

    fn write_byte(&mut self, address: u8, register: u8, value: u8) -> io::Result<()> {
        self.device(address)?
            .smbus_write_byte_data(register, value)
            .map_err(to_io)
    }
}

fn to_io(err: LinuxI2CError) -> io::Error {
    io::Error::new(io::ErrorKind::Other, err.to_string())
}
