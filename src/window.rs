//! Moving-average buffers used to smooth the live preview

use crate::codec::Vector;
use crate::error::{Mpu6000Error, Result};
use std::collections::VecDeque;

/// Fixed-capacity window of the most recent samples
#[derive(Debug, Clone)]
pub struct SlidingWindow {
    capacity: usize,
    values: VecDeque<f64>,
}

impl SlidingWindow {
    /// Create a window holding at most `capacity` samples (at least one)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            values: VecDeque::with_capacity(capacity),
        }
    }

    /// Append a sample, evicting the oldest beyond capacity
    pub fn add(&mut self, value: f64) {
        self.values.push_back(value);
        while self.values.len() > self.capacity {
            self.values.pop_front();
        }
    }

    /// Mean of the samples currently held
    pub fn average(&self) -> Result<f64> {
        if self.values.is_empty() {
            return Err(Mpu6000Error::EmptyWindow);
        }
        Ok(self.values.iter().sum::<f64>() / self.values.len() as f64)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// One window per accelerometer axis
#[derive(Debug, Clone)]
pub struct VectorSlidingWindow {
    pub x: SlidingWindow,
    pub y: SlidingWindow,
    pub z: SlidingWindow,
}

impl VectorSlidingWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            x: SlidingWindow::new(capacity),
            y: SlidingWindow::new(capacity),
            z: SlidingWindow::new(capacity),
        }
    }

    pub fn add(&mut self, v: &Vector) {
        self.x.add(v.x as f64);
        self.y.add(v.y as f64);
        self.z.add(v.z as f64);
    }

    /// Per-axis averages as (x, y, z)
    pub fn average(&self) -> Result<(f64, f64, f64)> {
        Ok((self.x.average()?, self.y.average()?, self.z.average()?))
    }
}
