// src/mixer.rs

//! # Motion Mixer
//!
//! Quad-X mixing of a throttle pulse and three axis outputs into four ESC
//! pulses. Motor layout, seen from above with the nose up:
//!
//! ```text
//!   4   1
//!    \ /
//!    / \
//!   3   2
//! ```
//!
//! | Motor | Position    | Roll | Pitch | Yaw |
//! |-------|-------------|------|-------|-----|
//! | 1     | front right | +    | -     | -   |
//! | 2     | rear right  | +    | +     | +   |
//! | 3     | rear left   | -    | +     | -   |
//! | 4     | front left  | -    | -     | +   |

use libm::roundf;

use crate::config::FlightConfig;
use crate::types::MotorCommand;

/// Quad-X mixer clamping every motor independently to the pulse range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotionMixer {
    min_pulse: u16,
    max_pulse: u16,
}

impl MotionMixer {
    /// Creates a mixer for the `[min_pulse, max_pulse]` microsecond range.
    pub fn new(min_pulse: u16, max_pulse: u16) -> Self {
        Self {
            min_pulse: min_pulse.min(max_pulse),
            max_pulse: max_pulse.max(min_pulse),
        }
    }

    /// Creates a mixer using the pulse range of `config`.
    pub fn with_config(config: &FlightConfig) -> Self {
        Self::new(config.min_pulse_us, config.max_pulse_us)
    }

    /// Maps a throttle percentage onto the pulse range, rounded to the
    /// nearest microsecond.
    pub fn throttle_pulse(&self, throttle: f32) -> u16 {
        let span = f32::from(self.max_pulse - self.min_pulse);
        let throttle = if throttle.is_nan() { 0.0 } else { throttle };
        self.clamp(f32::from(self.min_pulse) + throttle / 100.0 * span)
    }

    /// Mixes the throttle pulse with the roll, pitch and yaw outputs.
    pub fn mix(&self, throttle_pulse: u16, roll: f32, pitch: f32, yaw: f32) -> MotorCommand {
        let throttle = f32::from(throttle_pulse);
        MotorCommand {
            pulses: [
                self.clamp(throttle + roll - pitch - yaw),
                self.clamp(throttle + roll + pitch + yaw),
                self.clamp(throttle - roll + pitch - yaw),
                self.clamp(throttle - roll - pitch + yaw),
            ],
        }
    }

    /// All motors at the minimum pulse.
    pub fn idle(&self) -> MotorCommand {
        MotorCommand::uniform(self.min_pulse)
    }

    /// Mixes when armed, idles otherwise whatever the axis outputs are.
    pub fn output(
        &self,
        armed: bool,
        throttle_pulse: u16,
        outputs: (f32, f32, f32),
    ) -> MotorCommand {
        if !armed {
            return self.idle();
        }
        let (roll, pitch, yaw) = outputs;
        self.mix(throttle_pulse, roll, pitch, yaw)
    }

    fn clamp(&self, pulse: f32) -> u16 {
        if pulse.is_nan() {
            return self.min_pulse;
        }
        let pulse = roundf(pulse).clamp(f32::from(self.min_pulse), f32::from(self.max_pulse));
        pulse as u16
    }
}

impl Default for MotionMixer {
    fn default() -> Self {
        Self::with_config(&FlightConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mixer_zero_outputs_pass_throttle_through() {
        let mixer = MotionMixer::default();
        assert_eq!(MotorCommand::uniform(1500), mixer.mix(1500, 0.0, 0.0, 0.0));
        assert_eq!(MotorCommand::uniform(1000), mixer.mix(1000, 0.0, 0.0, 0.0));
    }

    #[test]
    fn test_mixer_matrix_signs() {
        let mixer = MotionMixer::default();
        assert_eq!([1510, 1510, 1490, 1490], mixer.mix(1500, 10.0, 0.0, 0.0).pulses);
        assert_eq!([1490, 1510, 1510, 1490], mixer.mix(1500, 0.0, 10.0, 0.0).pulses);
        assert_eq!([1490, 1510, 1490, 1510], mixer.mix(1500, 0.0, 0.0, 10.0).pulses);
    }

    #[test]
    fn test_mixer_clamps_each_motor_independently() {
        let mixer = MotionMixer::default();
        let command = mixer.mix(1900, 400.0, 0.0, 0.0);
        assert_eq!([2000, 2000, 1500, 1500], command.pulses);

        let command = mixer.mix(1100, 0.0, 400.0, 0.0);
        assert_eq!([1000, 1500, 1500, 1000], command.pulses);
    }

    #[test]
    fn test_mixer_output_range_for_arbitrary_inputs() {
        let mixer = MotionMixer::default();
        let values = [-1.0e9, -400.0, -37.5, 0.0, 12.25, 400.0, 1.0e9, f32::NAN];
        for &throttle in &[1000u16, 1250, 1500, 2000] {
            for &roll in &values {
                for &pitch in &values {
                    for &yaw in &values {
                        for pulse in mixer.mix(throttle, roll, pitch, yaw).pulses {
                            assert!((1000..=2000).contains(&pulse), "Pulse out of range: {}", pulse);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_mixer_disarmed_bypass() {
        let mixer = MotionMixer::default();
        let command = mixer.output(false, 1800, (400.0, -400.0, 400.0));
        assert_eq!(MotorCommand::uniform(1000), command);

        let command = mixer.output(true, 1500, (0.0, 0.0, 0.0));
        assert_eq!(MotorCommand::uniform(1500), command);
    }

    #[test]
    fn test_mixer_throttle_pulse() {
        let mixer = MotionMixer::default();
        assert_eq!(1000, mixer.throttle_pulse(0.0));
        assert_eq!(1050, mixer.throttle_pulse(5.0));
        assert_eq!(1500, mixer.throttle_pulse(50.0));
        assert_eq!(2000, mixer.throttle_pulse(100.0));
        assert_eq!(2000, mixer.throttle_pulse(150.0));
        assert_eq!(1000, mixer.throttle_pulse(-10.0));
        assert_eq!(1123, mixer.throttle_pulse(12.34));
        assert_eq!(1124, mixer.throttle_pulse(12.36));
    }
}
