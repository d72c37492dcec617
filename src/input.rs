// src/input.rs

//! # Keyboard Command Mapping
//!
//! Operator console that turns single key presses into [`ControlInputs`].
//! Sticks and throttle move in fixed steps and stay within their ranges.
//!
//! | Key   | Action                          |
//! |-------|---------------------------------|
//! | I / K | throttle +5 / -5 %              |
//! | A / D | roll -10 / +10 %                |
//! | W / S | pitch +10 / -10 %               |
//! | Q / E | yaw -10 / +10 %                 |
//! | R / T | arm / disarm                    |
//! | C     | center the sticks               |
//! | X     | emergency stop                  |
//! | H / Z | help / status, inputs untouched |
//!
//! Letters are case-insensitive.

use crate::types::{ArmingCommand, ControlInputs};

/// Throttle change per key press, in percent.
pub const THROTTLE_STEP: f32 = 5.0;
/// Stick change per key press, in percent.
pub const STICK_STEP: f32 = 10.0;

/// Action bound to a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// More throttle.
    ThrottleUp,
    /// Less throttle.
    ThrottleDown,
    /// Roll stick left.
    RollLeft,
    /// Roll stick right.
    RollRight,
    /// Pitch stick forward.
    PitchUp,
    /// Pitch stick back.
    PitchDown,
    /// Yaw stick left.
    YawLeft,
    /// Yaw stick right.
    YawRight,
    /// Request arming.
    Arm,
    /// Request disarming.
    Disarm,
    /// Return the three sticks to neutral.
    Center,
    /// Zero everything and stop the motors.
    EmergencyStop,
    /// Show the key bindings.
    Help,
    /// Show the current inputs.
    Status,
}

impl KeyAction {
    /// Looks up the action bound to `key`.
    pub fn from_key(key: char) -> Option<Self> {
        let action = match key.to_ascii_lowercase() {
            'i' => Self::ThrottleUp,
            'k' => Self::ThrottleDown,
            'a' => Self::RollLeft,
            'd' => Self::RollRight,
            'w' => Self::PitchUp,
            's' => Self::PitchDown,
            'q' => Self::YawLeft,
            'e' => Self::YawRight,
            'r' => Self::Arm,
            't' => Self::Disarm,
            'c' => Self::Center,
            'x' => Self::EmergencyStop,
            'h' => Self::Help,
            'z' => Self::Status,
            _ => return None,
        };
        Some(action)
    }
}

/// Keeps the operator inputs built up from key presses.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct KeyboardMapper {
    inputs: ControlInputs,
}

impl KeyboardMapper {
    /// Starts with zero throttle, centered sticks and no pending command.
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies a key press. Returns whether the inputs changed and should
    /// be forwarded to the controller.
    pub fn process_key(&mut self, key: char) -> bool {
        match KeyAction::from_key(key) {
            Some(action) => self.apply(action),
            None => false,
        }
    }

    /// Applies an action. Returns whether the inputs changed.
    pub fn apply(&mut self, action: KeyAction) -> bool {
        let inputs = &mut self.inputs;
        match action {
            KeyAction::ThrottleUp => inputs.throttle = throttle(inputs.throttle + THROTTLE_STEP),
            KeyAction::ThrottleDown => inputs.throttle = throttle(inputs.throttle - THROTTLE_STEP),
            KeyAction::RollLeft => inputs.roll_cmd = stick(inputs.roll_cmd - STICK_STEP),
            KeyAction::RollRight => inputs.roll_cmd = stick(inputs.roll_cmd + STICK_STEP),
            KeyAction::PitchUp => inputs.pitch_cmd = stick(inputs.pitch_cmd + STICK_STEP),
            KeyAction::PitchDown => inputs.pitch_cmd = stick(inputs.pitch_cmd - STICK_STEP),
            KeyAction::YawLeft => inputs.yaw_cmd = stick(inputs.yaw_cmd - STICK_STEP),
            KeyAction::YawRight => inputs.yaw_cmd = stick(inputs.yaw_cmd + STICK_STEP),
            KeyAction::Arm => inputs.command = Some(ArmingCommand::Arm),
            KeyAction::Disarm => inputs.command = Some(ArmingCommand::Disarm),
            KeyAction::Center => {
                inputs.roll_cmd = 0.0;
                inputs.pitch_cmd = 0.0;
                inputs.yaw_cmd = 0.0;
            }
            KeyAction::EmergencyStop => {
                *inputs = ControlInputs {
                    command: Some(ArmingCommand::EmergencyStop),
                    ..Default::default()
                };
                log::warn!("Emergency stop requested");
            }
            KeyAction::Help | KeyAction::Status => return false,
        }
        log::debug!(
            "Inputs T {:.0} R {:.0} P {:.0} Y {:.0} cmd {:?}",
            inputs.throttle,
            inputs.roll_cmd,
            inputs.pitch_cmd,
            inputs.yaw_cmd,
            inputs.command
        );
        true
    }

    /// Current inputs, pending command included.
    pub fn inputs(&self) -> &ControlInputs {
        &self.inputs
    }

    /// Current inputs for forwarding. The pending command is handed over
    /// once and cleared here.
    pub fn take_inputs(&mut self) -> ControlInputs {
        let inputs = self.inputs;
        self.inputs.command = None;
        inputs
    }
}

fn throttle(value: f32) -> f32 {
    value.clamp(0.0, 100.0)
}

fn stick(value: f32) -> f32 {
    value.clamp(-100.0, 100.0)
}
