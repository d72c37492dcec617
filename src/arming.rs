// src/arming.rs

//! # Arming State Machine
//!
//! Gates whether control and mixing run. Arming is only accepted at low
//! throttle and always starts from freshly reset axis controllers, so
//! nothing accumulated during a previous flight carries over.

use core::fmt::{self, Display, Formatter};

use crate::error::ArmError;
use crate::pid::Number;
use crate::stabilizer::FlightStabilizer;
use crate::types::ArmingCommand;

/// Arming state of the craft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArmingState {
    /// Motors idle, no control output applied.
    #[default]
    Disarmed,
    /// Control and mixing active.
    Armed,
}

/// Why the craft was disarmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisarmReason {
    /// Explicit operator disarm request.
    Command,
    /// Operator emergency stop.
    EmergencyStop,
    /// The command channel went silent.
    Watchdog,
    /// The sensor stopped answering while armed.
    SensorFailure,
}

impl Display for DisarmReason {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Self::Command => write!(f, "disarm command"),
            Self::EmergencyStop => write!(f, "emergency stop"),
            Self::Watchdog => write!(f, "command timeout"),
            Self::SensorFailure => write!(f, "sensor failure"),
        }
    }
}

/// State change produced by the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Disarmed to armed.
    Armed,
    /// Armed to disarmed.
    Disarmed(DisarmReason),
}

/// Result of handling an [`ArmingCommand`]: the transition it caused, if
/// any, or why an arm request was refused.
pub type ArmingOutcome = Result<Option<Transition>, ArmError>;

/// Disarmed/armed state machine enforcing the low-throttle arming rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArmingStateMachine {
    state: ArmingState,
    throttle_threshold: f32,
}

impl ArmingStateMachine {
    /// Creates a disarmed state machine accepting arm requests at or
    /// below `throttle_threshold` percent.
    pub fn new(throttle_threshold: f32) -> Self {
        Self {
            state: ArmingState::Disarmed,
            throttle_threshold,
        }
    }

    /// Current state.
    pub fn state(&self) -> ArmingState {
        self.state
    }

    /// Whether the motors are armed.
    pub fn is_armed(&self) -> bool {
        self.state == ArmingState::Armed
    }

    /// Applies a one-shot command at the given throttle.
    ///
    /// Returns the resulting transition, `None` when the command did not
    /// change the state.
    pub fn handle<T, S>(
        &mut self,
        command: ArmingCommand,
        throttle: f32,
        stabilizer: &mut S,
    ) -> ArmingOutcome
    where
        T: Number,
        S: FlightStabilizer<T> + ?Sized,
    {
        match command {
            ArmingCommand::Arm => self.request_arm(throttle, stabilizer).map(Some),
            ArmingCommand::Disarm => Ok(self.disarm(DisarmReason::Command)),
            ArmingCommand::EmergencyStop => Ok(self.disarm(DisarmReason::EmergencyStop)),
        }
    }

    /// Arms if the throttle is low enough, resetting every axis controller.
    pub fn request_arm<T, S>(
        &mut self,
        throttle: f32,
        stabilizer: &mut S,
    ) -> Result<Transition, ArmError>
    where
        T: Number,
        S: FlightStabilizer<T> + ?Sized,
    {
        if self.is_armed() {
            return Err(ArmError::AlreadyArmed);
        }
        if !(throttle <= self.throttle_threshold) {
            log::warn!(
                "Arm rejected, throttle {:.1}% above {:.1}%",
                throttle,
                self.throttle_threshold
            );
            return Err(ArmError::ThrottleTooHigh {
                throttle,
                threshold: self.throttle_threshold,
            });
        }

        stabilizer.reset();
        self.state = ArmingState::Armed;
        log::info!("Motors armed at throttle {:.1}%", throttle);
        Ok(Transition::Armed)
    }

    /// Disarms, returning the transition if the craft was armed.
    pub fn disarm(&mut self, reason: DisarmReason) -> Option<Transition> {
        if !self.is_armed() {
            return None;
        }
        self.state = ArmingState::Disarmed;
        log::info!("Motors disarmed: {}", reason);
        Some(Transition::Disarmed(reason))
    }
}
