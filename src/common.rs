//! Common utilities shared across the capture pipeline

use crate::codec::{MAX_VALUE, MIN_VALUE};
use std::time::Instant;

/// Tracks elapsed time since creation
///
/// Copies share the same origin, so two devices built from one keeper stamp
/// readings on the same timeline.
#[derive(Debug, Clone, Copy)]
pub struct TimeKeeper {
    start: Instant,
}

impl TimeKeeper {
    /// Create a new TimeKeeper starting now
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Get elapsed time in seconds
    pub fn elapsed_secs(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}

impl Default for TimeKeeper {
    fn default() -> Self {
        Self::new()
    }
}

/// Render a signed value as a fixed-width bar
///
/// The bar is drawn with `R` when the value sits on a saturation marker,
/// `+` when non-negative and `-` otherwise. Its length is
/// `|scale * value / full_scale|` of `chars`, limited to the full width. An
/// empty bar is drawn as `0` so the axis stays visible at rest.
///
/// # Example
/// ```
/// use mpu6000_capture::format_bar;
///
/// assert_eq!(format_bar(8192.0, 8, 32767.0, 1.0), "++      ");
/// assert_eq!(format_bar(0.0, 4, 32767.0, 1.0), "0   ");
/// ```
pub fn format_bar(value: f64, chars: usize, full_scale: f64, scale: f64) -> String {
    let ch = if value <= MIN_VALUE as f64 || value >= MAX_VALUE as f64 {
        'R'
    } else if value >= 0.0 {
        '+'
    } else {
        '-'
    };

    let magnitude = (scale * value / full_scale).clamp(-1.0, 1.0);
    let len = ((magnitude.abs() * chars as f64).round() as usize).min(chars);

    let mut bar = if len == 0 {
        String::from("0")
    } else {
        ch.to_string().repeat(len)
    };
    let pad = chars.saturating_sub(bar.len());
    bar.push_str(&" ".repeat(pad));
    bar
}
