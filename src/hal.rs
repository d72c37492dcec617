// src/hal.rs

//! # Hardware Interfaces
//!
//! Capabilities the stabilization core consumes. Drivers implement these
//! traits and are handed to the [`FlightController`](crate::controller::FlightController)
//! and [`LoopScheduler`](crate::scheduler::LoopScheduler) at construction,
//! so the core runs unchanged against real hardware or synthetic inputs.
//! Blocking waits use [`embedded_hal::delay::DelayNs`].

use crate::error::SensorError;
use crate::types::ImuSample;

/// Source of raw inertial readings.
pub trait SensorSource {
    /// Brings the device up. Called once before anything else.
    fn init(&mut self) -> Result<(), SensorError>;

    /// Reads one bias-uncorrected sample, gyro in rad/s and accel in m/s².
    fn read(&mut self) -> Result<ImuSample, SensorError>;
}

/// Sink for ESC pulse widths.
pub trait ActuatorSink {
    /// Drives motor `channel` (1 to 4) with a pulse of `micros` microseconds.
    fn write_pulse(&mut self, channel: u8, micros: u16);

    /// Reflects the armed state on a status indicator.
    fn set_armed_indicator(&mut self, _armed: bool) {}
}

/// Monotonic microsecond time source.
pub trait Clock {
    /// Microseconds elapsed since an arbitrary fixed origin.
    fn now_micros(&self) -> u64;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_micros(&self) -> u64 {
        (**self).now_micros()
    }
}
