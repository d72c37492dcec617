// src/error.rs

//! # Error Types
//!
//! Every fallible operation of the crate reports its outcome through one of
//! these enums. None of them is fatal once initialization has succeeded.

use core::fmt::{self, Display, Formatter};

/// Failures reported by a [`SensorSource`](crate::hal::SensorSource).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// The device did not answer on its bus.
    Unreachable,
    /// The device answered with data that could not be decoded.
    InvalidData,
}

impl Display for SensorError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Self::Unreachable => write!(f, "sensor unreachable"),
            Self::InvalidData => write!(f, "sensor returned invalid data"),
        }
    }
}

/// Failures of the one-time startup sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitError {
    /// The sensor could not be initialized.
    Sensor(SensorError),
    /// A sample taken during gyro calibration could not be read.
    Calibration(SensorError),
}

impl Display for InitError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Self::Sensor(e) => write!(f, "sensor initialization failed: {}", e),
            Self::Calibration(e) => write!(f, "gyro calibration failed: {}", e),
        }
    }
}

/// Reasons an arm request is refused.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ArmError {
    /// Throttle was above the arming threshold.
    ThrottleTooHigh {
        /// Throttle at the time of the request, in percent.
        throttle: f32,
        /// Highest throttle that allows arming, in percent.
        threshold: f32,
    },
    /// The controller is already armed.
    AlreadyArmed,
}

impl Display for ArmError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Self::ThrottleTooHigh {
                throttle,
                threshold,
            } => write!(
                f,
                "throttle too high to arm ({:.1}% > {:.1}%)",
                throttle, threshold
            ),
            Self::AlreadyArmed => write!(f, "already armed"),
        }
    }
}

/// Reasons a control tick did not run to completion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickError {
    /// `init` has not completed successfully.
    NotInitialized,
    /// The time step was zero, negative or not finite.
    InvalidTimeStep(f32),
    /// The sensor could not be read this tick.
    Sensor(SensorError),
}

impl Display for TickError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Self::NotInitialized => write!(f, "flight controller not initialized"),
            Self::InvalidTimeStep(dt) => write!(f, "invalid time step {}s", dt),
            Self::Sensor(e) => write!(f, "sensor read failed: {}", e),
        }
    }
}

impl From<SensorError> for TickError {
    fn from(e: SensorError) -> Self {
        TickError::Sensor(e)
    }
}

/// Failures of [`SensorFusion::update`](crate::fusion::SensorFusion::update).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FusionError {
    /// The time step was zero, negative or not finite.
    InvalidTimeStep(f32),
}

impl Display for FusionError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Self::InvalidTimeStep(dt) => write!(f, "invalid time step {}s", dt),
        }
    }
}

impl From<FusionError> for TickError {
    fn from(e: FusionError) -> Self {
        match e {
            FusionError::InvalidTimeStep(dt) => TickError::InvalidTimeStep(dt),
        }
    }
}
