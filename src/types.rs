// src/types.rs

//! # Flight Data Types
//!
//! Values exchanged between the stabilization core and its collaborators.
//! Three-axis quantities are `(x, y, z)` or `(roll, pitch, yaw)` tuples.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Current attitude estimate of the craft.
///
/// Owned by the [`FlightController`](crate::controller::FlightController)
/// and refreshed once per tick. Copies handed out for telemetry are
/// read-only snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FlightState {
    /// Roll angle in degrees.
    pub roll: f32,
    /// Pitch angle in degrees.
    pub pitch: f32,
    /// Heading in degrees, always within `[0, 360)`.
    pub yaw: f32,
    /// Roll rate in degrees per second.
    pub roll_rate: f32,
    /// Pitch rate in degrees per second.
    pub pitch_rate: f32,
    /// Yaw rate in degrees per second.
    pub yaw_rate: f32,
    /// Last raw acceleration `(x, y, z)` in m/s².
    pub accel: (f32, f32, f32),
    /// Whether the motors are armed.
    pub armed: bool,
}

impl FlightState {
    /// Attitude as a `(roll, pitch, yaw)` tuple in degrees.
    pub fn attitude(&self) -> (f32, f32, f32) {
        (self.roll, self.pitch, self.yaw)
    }

    /// Body rates as a `(roll, pitch, yaw)` tuple in degrees per second.
    pub fn rates(&self) -> (f32, f32, f32) {
        (self.roll_rate, self.pitch_rate, self.yaw_rate)
    }
}

/// One-shot arming commands carried by [`ControlInputs`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ArmingCommand {
    /// Arm the motors, accepted only at low throttle.
    Arm,
    /// Disarm the motors.
    Disarm,
    /// Disarm and idle every motor immediately.
    EmergencyStop,
}

/// Operator intent handed to the core between ticks.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ControlInputs {
    /// Throttle in percent, `[0, 100]`.
    pub throttle: f32,
    /// Roll stick in percent, `[-100, 100]`.
    pub roll_cmd: f32,
    /// Pitch stick in percent, `[-100, 100]`.
    pub pitch_cmd: f32,
    /// Yaw stick in percent, `[-100, 100]`.
    pub yaw_cmd: f32,
    /// Pending one-shot arming command.
    pub command: Option<ArmingCommand>,
}

impl ControlInputs {
    /// Removes and returns the pending arming command.
    ///
    /// A command is acted upon by exactly one tick; later ticks observe
    /// `None` until a new command is submitted.
    pub fn take_command(&mut self) -> Option<ArmingCommand> {
        self.command.take()
    }

    /// Copy of the inputs with throttle and sticks clamped to their ranges.
    pub fn clamped(&self) -> Self {
        Self {
            throttle: self.throttle.clamp(0.0, 100.0),
            roll_cmd: self.roll_cmd.clamp(-100.0, 100.0),
            pitch_cmd: self.pitch_cmd.clamp(-100.0, 100.0),
            yaw_cmd: self.yaw_cmd.clamp(-100.0, 100.0),
            command: self.command,
        }
    }
}

/// ESC pulse widths for the four motors, in microseconds.
///
/// Motor order follows the X frame: 1 front right, 2 rear right,
/// 3 rear left, 4 front left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MotorCommand {
    /// Pulse widths indexed by motor number minus one.
    pub pulses: [u16; 4],
}

impl MotorCommand {
    /// All four motors at the same pulse width.
    pub const fn uniform(pulse: u16) -> Self {
        Self { pulses: [pulse; 4] }
    }

    /// Iterates over `(channel, pulse)` pairs, channels numbered 1 to 4.
    pub fn channels(&self) -> impl Iterator<Item = (u8, u16)> + '_ {
        self.pulses
            .iter()
            .enumerate()
            .map(|(index, &pulse)| (index as u8 + 1, pulse))
    }
}

/// Gyro bias measured while the craft is at rest, in rad/s.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CalibrationOffsets {
    /// Bias of the x (roll) gyro axis.
    pub gyro_x: f32,
    /// Bias of the y (pitch) gyro axis.
    pub gyro_y: f32,
    /// Bias of the z (yaw) gyro axis.
    pub gyro_z: f32,
}

/// Raw IMU reading.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ImuSample {
    /// Angular rate `(x, y, z)` in rad/s.
    pub gyro: (f32, f32, f32),
    /// Acceleration `(x, y, z)` in m/s².
    pub accel: (f32, f32, f32),
}
