// src/test_utils.rs

//! This module contains utilities for testing.

use core::cell::Cell;

use embedded_hal::delay::DelayNs;

use crate::error::SensorError;
use crate::hal::{ActuatorSink, Clock, SensorSource};
use crate::types::{ImuSample, MotorCommand};

/// A constant defining the tolerance within which floating-point values
/// are considered close enough to be equal.
pub const TEST_TOLERANCE: f32 = 1e-5;

/// Standard gravity in m/s².
pub const GRAVITY: f32 = 9.81;

/// Checks if two floating point numbers are close enough to be considered
/// equal.
pub fn value_close(target: f32, value: f32) -> bool {
    (target - value).abs() < TEST_TOLERANCE
}

/// Checks if two floating point numbers are not close enough to be
/// considered equal.
pub fn value_not_close(target: f32, value: f32) -> bool {
    TEST_TOLERANCE <= (target - value).abs()
}

/// Checks if each of the components in a vector is close enough to
/// be considered equal.
pub fn vector_close(target: (f32, f32, f32), value: (f32, f32, f32)) -> bool {
    value_close(target.0, value.0)
        && value_close(target.1, value.1)
        && value_close(target.2, value.2)
}

/// Checks if each of the components in a vector is not close enough
/// to be considered equal.
pub fn vector_not_close(target: (f32, f32, f32), value: (f32, f32, f32)) -> bool {
    value_not_close(target.0, value.0)
        && value_not_close(target.1, value.1)
        && value_not_close(target.2, value.2)
}

/// A level, motionless IMU sample.
pub fn level_sample() -> ImuSample {
    ImuSample {
        gyro: (0.0, 0.0, 0.0),
        accel: (0.0, 0.0, GRAVITY),
    }
}

/// Sensor returning a configurable sample.
pub struct MockSensor {
    pub sample: ImuSample,
    pub fail_init: bool,
    pub fail_reads: bool,
    pub reads: u32,
}

impl MockSensor {
    pub fn new(sample: ImuSample) -> Self {
        Self {
            sample,
            fail_init: false,
            fail_reads: false,
            reads: 0,
        }
    }
}

impl SensorSource for MockSensor {
    fn init(&mut self) -> Result<(), SensorError> {
        if self.fail_init {
            return Err(SensorError::Unreachable);
        }
        Ok(())
    }

    fn read(&mut self) -> Result<ImuSample, SensorError> {
        if self.fail_reads {
            return Err(SensorError::Unreachable);
        }
        self.reads += 1;
        Ok(self.sample)
    }
}

/// Actuator remembering the last pulse of every channel.
#[derive(Default)]
pub struct RecordingActuator {
    pub pulses: [u16; 4],
    pub writes: u32,
    pub indicator: bool,
}

impl RecordingActuator {
    pub fn command(&self) -> MotorCommand {
        MotorCommand {
            pulses: self.pulses,
        }
    }
}

impl ActuatorSink for RecordingActuator {
    fn write_pulse(&mut self, channel: u8, micros: u16) {
        self.pulses[usize::from(channel - 1)] = micros;
        self.writes += 1;
    }

    fn set_armed_indicator(&mut self, armed: bool) {
        self.indicator = armed;
    }
}

/// Delay that returns immediately and adds up the requested time.
#[derive(Default)]
pub struct NoopDelay {
    pub total_ns: u64,
}

impl DelayNs for NoopDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns += u64::from(ns);
    }
}

/// Clock advanced by hand, optionally moving forward on every read.
#[derive(Default)]
pub struct ManualClock {
    now: Cell<u64>,
    step_per_read: Cell<u64>,
}

impl ManualClock {
    pub fn new(now: u64) -> Self {
        Self {
            now: Cell::new(now),
            step_per_read: Cell::new(0),
        }
    }

    pub fn set(&self, now: u64) {
        self.now.set(now);
    }

    pub fn advance(&self, micros: u64) {
        self.now.set(self.now.get() + micros);
    }

    /// Makes every read advance the clock, simulating work between reads.
    pub fn set_step_per_read(&self, micros: u64) {
        self.step_per_read.set(micros);
    }
}

impl Clock for ManualClock {
    fn now_micros(&self) -> u64 {
        let now = self.now.get();
        self.now.set(now + self.step_per_read.get());
        now
    }
}
