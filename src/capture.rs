//! Capture loop: lockstep polling, live preview and text logging

use crate::codec::MAX_VALUE;
use crate::common::format_bar;
use crate::device::{AccelRange, SensorReading, SensorSource};
use crate::error::{Mpu6000Error, Result};
use crate::window::VectorSlidingWindow;
use std::fs::File;
use std::io::{self, LineWriter, Write};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

/// Most devices the engine polls in one tick
pub const MAX_DEVICES: usize = 2;

/// Control flow for the capture loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamControl {
    /// Continue capturing
    Continue,
    /// Stop capturing
    Break,
}

/// Whether the live preview runs, from the command-line flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewMode {
    On,
    Off,
}

impl PreviewMode {
    /// Resolve the preview flags against the presence of a log destination
    ///
    /// An explicit `--no-preview` always wins. With neither flag the preview
    /// runs only when nothing is being logged.
    pub fn resolve(preview: bool, no_preview: bool, has_destination: bool) -> Self {
        match (preview, no_preview, has_destination) {
            (_, true, _) => PreviewMode::Off,
            (true, false, _) => PreviewMode::On,
            (false, false, false) => PreviewMode::On,
            (false, false, true) => PreviewMode::Off,
        }
    }

    pub fn enabled(self) -> bool {
        self == PreviewMode::On
    }

    /// Whether raw data lines go to stdout
    ///
    /// With the preview off and no log file nothing else would show the
    /// samples, so the raw `tm x y z` lines are echoed instead.
    pub fn echoes_raw(self, has_destination: bool) -> bool {
        self == PreviewMode::Off && !has_destination
    }
}

/// Tunables for the capture loop
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureSettings {
    /// Render the bar-graph preview
    pub preview: bool,
    /// Characters per axis bar
    pub preview_width: usize,
    /// Samples averaged per axis for the preview
    pub preview_window: usize,
    /// Minimum seconds between preview lines
    pub preview_period: f64,
    /// Raw value drawn as a full bar
    pub full_scale: f64,
    /// Multiplier applied before scaling to the bar width
    pub scale: f64,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            preview: true,
            preview_width: 30,
            preview_window: 10,
            preview_period: 0.1,
            full_scale: MAX_VALUE as f64,
            scale: 1.0,
        }
    }
}

impl CaptureSettings {
    fn validate(&self) -> Result<()> {
        if self.preview_window == 0 {
            return Err(Mpu6000Error::InvalidConfig(
                "preview window must hold at least one sample".to_string(),
            ));
        }
        if !self.preview_period.is_finite() || self.preview_period < 0.0 {
            return Err(Mpu6000Error::InvalidConfig(format!(
                "preview period must be a non-negative number of seconds, got {}",
                self.preview_period
            )));
        }
        if !(self.full_scale.is_finite() && self.full_scale > 0.0) {
            return Err(Mpu6000Error::InvalidConfig(format!(
                "full scale must be positive, got {}",
                self.full_scale
            )));
        }
        Ok(())
    }
}

/// Comment lines written at the top of a log file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogHeader {
    pub note: Option<String>,
    pub lpf: Option<u8>,
    pub accel_range: Option<AccelRange>,
    pub num_devices: usize,
    /// RFC 3339 local time the capture started
    pub start: Option<String>,
}

impl LogHeader {
    /// Header stamped with the current local time
    pub fn new(num_devices: usize) -> Self {
        Self {
            num_devices,
            start: Some(chrono::Local::now().to_rfc3339()),
            ..Default::default()
        }
    }

    pub fn write_to<W: Write + ?Sized>(&self, out: &mut W) -> io::Result<()> {
        if let Some(note) = &self.note {
            // A note must stay on one comment line
            writeln!(out, "# NOTE = {}", note.replace(['\r', '\n'], " "))?;
        }
        if let Some(lpf) = self.lpf {
            writeln!(out, "# LPF = {}", lpf)?;
        }
        if let Some(range) = self.accel_range {
            writeln!(out, "# ACCEL_RANGE = {}", range.label())?;
        }
        writeln!(out, "# NUM_DEVICES = {}", self.num_devices)?;
        if let Some(start) = &self.start {
            writeln!(out, "# START = {}", start)?;
        }
        writeln!(out)
    }
}

/// Flat text log: header, then one `tm x y z [x y z]` line per tick
pub struct CaptureLog {
    out: Box<dyn Write>,
    lines: u64,
}

impl CaptureLog {
    /// Create (truncate) a log file and write its header
    pub fn create<P: AsRef<Path>>(path: P, header: &LogHeader) -> Result<Self> {
        let file = File::create(path)?;
        Self::from_writer(Box::new(LineWriter::new(file)), header)
    }

    /// Log to any writer; the header is written immediately
    pub fn from_writer(mut out: Box<dyn Write>, header: &LogHeader) -> Result<Self> {
        header.write_to(&mut out)?;
        out.flush()?;
        Ok(Self { out, lines: 0 })
    }

    /// Data lines only, without a header
    pub fn raw(out: Box<dyn Write>) -> Self {
        Self { out, lines: 0 }
    }

    /// Append one data line with the raw accel of every device, then flush
    pub fn write_line(&mut self, tm: f64, readings: &[SensorReading]) -> Result<()> {
        let mut line = format!("{:.6}", tm);
        for r in readings {
            line.push_str(&format!(" {} {} {}", r.accel.x, r.accel.y, r.accel.z));
        }
        writeln!(self.out, "{}", line)?;
        self.out.flush()?;
        self.lines += 1;
        Ok(())
    }

    pub fn lines_written(&self) -> u64 {
        self.lines
    }
}

/// Totals reported when the loop stops
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CaptureSummary {
    pub ticks: u64,
    /// `tm` of the last tick
    pub elapsed: f64,
    pub previews: u64,
    /// Readings with a saturated accel axis, across all devices
    pub out_of_range: u64,
}

/// Polls one or two sensors in lockstep
pub struct CaptureEngine {
    devices: Vec<Box<dyn SensorSource>>,
    windows: Vec<VectorSlidingWindow>,
    warned: Vec<bool>,
    settings: CaptureSettings,
    log: Option<CaptureLog>,
    preview_out: Box<dyn Write>,
    start: Option<f64>,
    last_preview: Option<f64>,
    readings: Vec<SensorReading>,
    summary: CaptureSummary,
}

impl CaptureEngine {
    /// Build an engine over `devices`, polled in the given order
    pub fn new(devices: Vec<Box<dyn SensorSource>>, settings: CaptureSettings) -> Result<Self> {
        if devices.is_empty() || devices.len() > MAX_DEVICES {
            return Err(Mpu6000Error::InvalidConfig(format!(
                "capture needs 1 or {} devices, got {}",
                MAX_DEVICES,
                devices.len()
            )));
        }
        settings.validate()?;

        let n = devices.len();
        Ok(Self {
            windows: (0..n)
                .map(|_| VectorSlidingWindow::new(settings.preview_window))
                .collect(),
            warned: vec![false; n],
            readings: Vec::with_capacity(n),
            devices,
            settings,
            log: None,
            preview_out: Box::new(io::stdout()),
            start: None,
            last_preview: None,
            summary: CaptureSummary::default(),
        })
    }

    /// Persist every tick to `log`
    pub fn with_log(mut self, log: CaptureLog) -> Self {
        self.log = Some(log);
        self
    }

    /// Send preview lines somewhere other than stdout
    pub fn with_preview_output(mut self, out: Box<dyn Write>) -> Self {
        self.preview_out = out;
        self
    }

    pub fn num_devices(&self) -> usize {
        self.devices.len()
    }

    pub fn summary(&self) -> CaptureSummary {
        self.summary
    }

    pub fn log(&self) -> Option<&CaptureLog> {
        self.log.as_ref()
    }

    /// Smoothing window of device `index`
    pub fn window(&self, index: usize) -> Option<&VectorSlidingWindow> {
        self.windows.get(index)
    }

    /// Run until a source runs out of data or `running` is cleared
    pub fn run(&mut self, running: &AtomicBool) -> Result<CaptureSummary> {
        self.latch_start();
        while running.load(Ordering::SeqCst) {
            if self.tick()? == StreamControl::Break {
                break;
            }
        }
        Ok(self.summary)
    }

    /// Poll every device once, update the preview and append to the log
    pub fn tick(&mut self) -> Result<StreamControl> {
        let start = self.latch_start();

        self.readings.clear();
        for (i, device) in self.devices.iter_mut().enumerate() {
            let Some(reading) = device.read_sensor()? else {
                log::info!("{}: end of data", device.name());
                return Ok(StreamControl::Break);
            };
            if reading.is_out_of_range() {
                self.summary.out_of_range += 1;
                if !self.warned[i] {
                    log::warn!(
                        "{}: accel out of range ({}, {}, {}); consider a wider range",
                        device.name(),
                        reading.accel.x,
                        reading.accel.y,
                        reading.accel.z
                    );
                    self.warned[i] = true;
                }
            }
            self.readings.push(reading);
        }

        let tm = self.readings[0].timestamp - start;

        if self.settings.preview && self.preview_due(tm) {
            for (window, reading) in self.windows.iter_mut().zip(&self.readings) {
                window.add(&reading.accel);
            }
            let line = self.render_preview()?;
            writeln!(self.preview_out, "{}", line)?;
            self.preview_out.flush()?;
            self.last_preview = Some(tm);
            self.summary.previews += 1;
        }

        if let Some(log) = self.log.as_mut() {
            log.write_line(tm, &self.readings)?;
        }

        self.summary.ticks += 1;
        self.summary.elapsed = tm;
        Ok(StreamControl::Continue)
    }

    /// Bars for the smoothed accel of every device on one line
    pub fn render_preview(&self) -> Result<String> {
        let s = &self.settings;
        let bar = |v: f64| format_bar(v, s.preview_width, s.full_scale, s.scale);

        let mut parts = Vec::with_capacity(self.windows.len());
        for window in &self.windows {
            let (x, y, z) = window.average()?;
            parts.push(format!("X:{} Y:{} Z:{}", bar(x), bar(y), bar(z)));
        }
        Ok(parts.join(" "))
    }

    fn preview_due(&self, tm: f64) -> bool {
        match self.last_preview {
            None => true,
            Some(last) => tm - last >= self.settings.preview_period,
        }
    }

    fn latch_start(&mut self) -> f64 {
        match self.start {
            Some(start) => start,
            None => {
                let start = self.devices[0].clock_secs();
                self.start = Some(start);
                start
            }
        }
    }
}
