//! Error types for MPU6000 capture

use std::io;
use thiserror::Error;

/// Error type for MPU6000 operations
#[derive(Error, Debug)]
pub enum Mpu6000Error {
    /// Register block had the wrong length for the requested decode
    #[error("Decode error: expected {expected} bytes, got {actual}")]
    Decode { expected: usize, actual: usize },

    /// Configuration argument out of range (rejected before any bus write)
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Transport failure while talking to a device
    #[error("Bus error at address 0x{address:02X}: {source}")]
    Bus {
        address: u8,
        #[source]
        source: io::Error,
    },

    /// Replay line could not be parsed
    #[error("Malformed recording line: {line:?}")]
    MalformedRecording { line: String },

    /// Average requested from a window with no samples
    #[error("Sliding window is empty")]
    EmptyWindow,

    /// Liveness probe failed at startup
    #[error("Device at address 0x{0:02X} is not responding")]
    NotResponding(u8),

    /// Log file or replay source I/O
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Result type for MPU6000 operations
pub type Result<T> = std::result::Result<T, Mpu6000Error>;
