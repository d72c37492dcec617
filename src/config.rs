// src/config.rs

//! # Flight Configuration
//!
//! Tunable parameters for the stabilization pipeline and the loop
//! scheduler. The defaults reproduce the reference airframe: a 250 Hz loop,
//! angle-mode roll/pitch limited to 30 degrees, rate-mode yaw limited to
//! 180 degrees per second and standard 1000-2000 µs ESC pulses.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default loop frequency in Hz.
pub const LOOP_FREQUENCY_HZ: u32 = 250;
/// Minimum ESC pulse in microseconds (motors idle).
pub const MIN_PULSE_US: u16 = 1000;
/// Maximum ESC pulse in microseconds (full power).
pub const MAX_PULSE_US: u16 = 2000;
/// Pulse written to every ESC while it arms during initialization.
pub const ESC_ARM_PULSE_US: u16 = 1000;
/// Time the ESCs are given to arm during initialization.
pub const ESC_ARM_DELAY_MS: u32 = 2000;
/// Highest throttle percentage at which an arm request is accepted.
pub const ARM_THROTTLE_THRESHOLD: f32 = 5.0;
/// Gyro weight of the complementary filter.
pub const COMPLEMENTARY_ALPHA: f32 = 0.98;
/// Number of gyro samples averaged by the startup calibration.
pub const CALIBRATION_SAMPLES: u32 = 1000;
/// Pause between two calibration samples in microseconds.
pub const CALIBRATION_DELAY_US: u32 = 2000;
/// Consecutive sensor read failures tolerated while armed before the
/// motors are stopped.
pub const SENSOR_FAILURE_LIMIT: u32 = 5;
/// Interval between two watchdog checks in microseconds.
pub const WATCHDOG_INTERVAL_US: u64 = 1_000_000;
/// Command silence after which an armed craft is forced to stop.
pub const COMMAND_TIMEOUT_US: u64 = 10_000_000;

/// Gains and output bound of a single PID axis.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PidGains<T> {
    /// Proportional gain.
    pub kp: T,
    /// Integral gain.
    pub ki: T,
    /// Derivative gain.
    pub kd: T,
    /// Symmetric output limit, the output stays within `[-max_output, max_output]`.
    pub max_output: T,
}

impl<T> PidGains<T> {
    /// Creates a gain set.
    pub const fn new(kp: T, ki: T, kd: T, max_output: T) -> Self {
        Self {
            kp,
            ki,
            kd,
            max_output,
        }
    }
}

/// Configuration of the attitude estimation, control and mixing pipeline.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FlightConfig {
    /// Roll axis gains (angle mode).
    pub roll: PidGains<f32>,
    /// Pitch axis gains (angle mode).
    pub pitch: PidGains<f32>,
    /// Yaw axis gains (rate mode).
    pub yaw: PidGains<f32>,
    /// Roll angle reached at full stick deflection, in degrees.
    pub max_angle_roll: f32,
    /// Pitch angle reached at full stick deflection, in degrees.
    pub max_angle_pitch: f32,
    /// Yaw rate reached at full stick deflection, in degrees per second.
    pub max_rate_yaw: f32,
    /// Lowest pulse sent to the ESCs, in microseconds.
    pub min_pulse_us: u16,
    /// Highest pulse sent to the ESCs, in microseconds.
    pub max_pulse_us: u16,
    /// Pulse used to arm the ESCs during initialization.
    pub esc_arm_pulse_us: u16,
    /// Wait after the ESC arming pulse, in milliseconds.
    pub esc_arm_delay_ms: u32,
    /// Highest throttle percentage that allows arming.
    pub arm_throttle_threshold: f32,
    /// Gyro weight of the complementary filter, in `[0, 1]`.
    pub complementary_alpha: f32,
    /// Number of samples averaged by the gyro calibration.
    pub calibration_samples: u32,
    /// Pause between calibration samples, in microseconds.
    pub calibration_delay_us: u32,
    /// Consecutive failed sensor reads after which an armed craft is
    /// stopped. The last output is held until then.
    pub sensor_failure_limit: u32,
}

impl FlightConfig {
    /// Creates the reference configuration.
    pub const fn new() -> Self {
        let angle_gains = PidGains::new(1.0, 0.01, 10.0, 400.0);
        Self {
            roll: angle_gains,
            pitch: angle_gains,
            yaw: PidGains::new(2.0, 0.05, 0.0, 400.0),
            max_angle_roll: 30.0,
            max_angle_pitch: 30.0,
            max_rate_yaw: 180.0,
            min_pulse_us: MIN_PULSE_US,
            max_pulse_us: MAX_PULSE_US,
            esc_arm_pulse_us: ESC_ARM_PULSE_US,
            esc_arm_delay_ms: ESC_ARM_DELAY_MS,
            arm_throttle_threshold: ARM_THROTTLE_THRESHOLD,
            complementary_alpha: COMPLEMENTARY_ALPHA,
            calibration_samples: CALIBRATION_SAMPLES,
            calibration_delay_us: CALIBRATION_DELAY_US,
            sensor_failure_limit: SENSOR_FAILURE_LIMIT,
        }
    }
}

impl Default for FlightConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Configuration of the fixed-rate loop and the safety watchdog.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SchedulerConfig {
    /// Target tick frequency in Hz.
    pub loop_frequency_hz: u32,
    /// A tick longer than `period * overrun_ratio` is reported as an overrun.
    pub overrun_ratio: f32,
    /// Interval between two watchdog checks, in microseconds.
    pub watchdog_interval_us: u64,
    /// Command silence tolerated while armed, in microseconds.
    pub command_timeout_us: u64,
    /// Seconds of ticks between two statistics reports.
    pub stats_interval_s: u32,
}

impl SchedulerConfig {
    /// Creates the reference configuration.
    pub const fn new() -> Self {
        Self {
            loop_frequency_hz: LOOP_FREQUENCY_HZ,
            overrun_ratio: 1.2,
            watchdog_interval_us: WATCHDOG_INTERVAL_US,
            command_timeout_us: COMMAND_TIMEOUT_US,
            stats_interval_s: 10,
        }
    }

    /// Target tick period in microseconds.
    pub fn period_us(&self) -> u64 {
        1_000_000 / u64::from(self.loop_frequency_hz.max(1))
    }

    /// Tick duration above which an overrun is reported, in microseconds.
    pub fn overrun_threshold_us(&self) -> u64 {
        (self.period_us() as f32 * self.overrun_ratio) as u64
    }

    /// Number of ticks between two statistics reports.
    pub fn stats_interval_ticks(&self) -> u64 {
        u64::from(self.loop_frequency_hz) * u64::from(self.stats_interval_s)
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scheduler_config_defaults() {
        let config = SchedulerConfig::default();
        assert_eq!(4000, config.period_us());
        assert_eq!(4800, config.overrun_threshold_us());
        assert_eq!(2500, config.stats_interval_ticks());
    }

    #[test]
    fn test_flight_config_defaults() {
        let config = FlightConfig::default();
        assert_eq!(config.roll, config.pitch);
        assert_eq!(0.0, config.yaw.kd);
        assert_eq!(MIN_PULSE_US, config.min_pulse_us);
        assert_eq!(MAX_PULSE_US, config.max_pulse_us);
    }
}
