//! Replay of recorded capture logs
//!
//! A recording is the text log written by the capture engine: `#` comment
//! lines, blank lines and data lines of the form
//! `<tm> <x1> <y1> <z1> [<x2> <y2> <z2> ...]`. A `ReplayDevice` extracts one
//! device's column group and paces itself to the recorded timestamps.

use crate::codec::Vector;
use crate::device::{SensorReading, SensorSource};
use crate::error::{Mpu6000Error, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::{Duration, Instant};

/// Sensor source backed by a recorded log
pub struct ReplayDevice<R: BufRead> {
    reader: R,
    index: usize,
    start: Option<Instant>,
    line: String,
    label: String,
}

impl ReplayDevice<BufReader<File>> {
    /// Open a recording file and replay column group `index` (0-based)
    pub fn open<P: AsRef<Path>>(path: P, index: usize) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let mut dev = Self::from_reader(BufReader::new(file), index);
        dev.label = format!("replay:{}[{}]", path.display(), index);
        Ok(dev)
    }
}

impl<R: BufRead> ReplayDevice<R> {
    pub fn from_reader(reader: R, index: usize) -> Self {
        Self {
            reader,
            index,
            start: None,
            line: String::new(),
            label: format!("replay[{}]", index),
        }
    }

    /// Advance to the next data line. Returns false at end of source.
    fn next_data_line(&mut self) -> Result<bool> {
        loop {
            self.line.clear();
            if self.reader.read_line(&mut self.line)? == 0 {
                return Ok(false);
            }
            let trimmed = self.line.trim();
            if !trimmed.is_empty() && !trimmed.starts_with('#') {
                return Ok(true);
            }
        }
    }

    fn parse_line(&self) -> Result<(f64, Vector)> {
        let line = self.line.trim();
        let malformed = || Mpu6000Error::MalformedRecording {
            line: line.to_string(),
        };

        let fields: Vec<&str> = line.split_whitespace().collect();
        let first = 1 + self.index * 3;
        let columns = fields.get(first..first + 3).ok_or_else(malformed)?;

        let tm: f64 = fields[0].parse().map_err(|_| malformed())?;
        if !tm.is_finite() {
            return Err(malformed());
        }
        let axis = |s: &str| s.parse::<i16>().map_err(|_| malformed());

        Ok((
            tm,
            Vector::new(axis(columns[0])?, axis(columns[1])?, axis(columns[2])?),
        ))
    }
}

impl<R: BufRead> SensorSource for ReplayDevice<R> {
    fn check_alive(&mut self) -> bool {
        true
    }

    fn wake_up(&mut self, _force: bool) -> Result<()> {
        Ok(())
    }

    fn read_sensor(&mut self) -> Result<Option<SensorReading>> {
        let start = *self.start.get_or_insert_with(Instant::now);

        if !self.next_data_line()? {
            return Ok(None);
        }
        let (tm, accel) = self.parse_line()?;

        let delay = tm - start.elapsed().as_secs_f64();
        if delay > 0.0 {
            // Timestamps too large for a Duration are not a real cadence
            let pause = Duration::try_from_secs_f64(delay).map_err(|_| {
                Mpu6000Error::MalformedRecording {
                    line: self.line.trim().to_string(),
                }
            })?;
            log::trace!("{}: pacing {:.3}s", self.label, delay);
            std::thread::sleep(pause);
        }

        Ok(Some(SensorReading::accel_only(tm, accel)))
    }

    fn clock_secs(&self) -> f64 {
        self.start
            .map(|s| s.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }

    fn name(&self) -> String {
        self.label.clone()
    }
}
