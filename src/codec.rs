//! Raw register decoding for the MPU6000 output block
//!
//! Every axis is a big-endian signed 16-bit value; a vector is three of them
//! back to back in x, y, z order.

use crate::error::{Mpu6000Error, Result};

/// Largest raw axis value, also reported when the axis saturates high
pub const MAX_VALUE: i16 = i16::MAX;
/// Smallest raw axis value, also reported when the axis saturates low
pub const MIN_VALUE: i16 = i16::MIN;

const AXIS_BYTES: usize = 2;
const VECTOR_BYTES: usize = 3 * AXIS_BYTES;

/// Three raw axis components
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Vector {
    pub x: i16,
    pub y: i16,
    pub z: i16,
}

impl Vector {
    pub const ZERO: Vector = Vector { x: 0, y: 0, z: 0 };

    pub const fn new(x: i16, y: i16, z: i16) -> Self {
        Self { x, y, z }
    }

    /// Components in axis order
    pub fn components(&self) -> [i16; 3] {
        [self.x, self.y, self.z]
    }

    /// True if any component sits on a saturation marker
    pub fn is_saturated(&self) -> bool {
        self.components().iter().any(|&c| is_saturated(c))
    }
}

/// Decode exactly two bytes as a big-endian `i16`
pub fn decode_signed16(bytes: &[u8]) -> Result<i16> {
    match bytes {
        [high, low] => Ok(i16::from_be_bytes([*high, *low])),
        _ => Err(Mpu6000Error::Decode {
            expected: AXIS_BYTES,
            actual: bytes.len(),
        }),
    }
}

/// Decode exactly six bytes as an x, y, z vector
pub fn decode_vector(bytes: &[u8]) -> Result<Vector> {
    if bytes.len() != VECTOR_BYTES {
        return Err(Mpu6000Error::Decode {
            expected: VECTOR_BYTES,
            actual: bytes.len(),
        });
    }

    Ok(Vector {
        x: decode_signed16(&bytes[0..2])?,
        y: decode_signed16(&bytes[2..4])?,
        z: decode_signed16(&bytes[4..6])?,
    })
}

/// Convert a raw temperature code to degrees Celsius (datasheet transform)
pub fn celsius_from_raw(raw_temp: i16) -> f32 {
    raw_temp as f32 / 340.0 + 36.53
}

/// The sensor reports the extreme codes when the true value exceeds full scale
pub fn is_saturated(component: i16) -> bool {
    component == MIN_VALUE || component == MAX_VALUE
}
