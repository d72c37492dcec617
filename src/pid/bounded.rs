// src/pid/bounded.rs

//! # Bounded PID Control Module
//!
//! A single-axis PID whose output is clamped to a symmetric limit. While the
//! output is saturated the integral contribution of the current step is
//! backed out again, so a sustained large error cannot wind the integrator
//! up and cause an overshoot once the error returns to a normal range.

use crate::config::PidGains;
use crate::pid::Number;
use piddiy::PidController;

/// Control data for the bounded PID compute callback.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoundedControlData<T> {
    /// The measured value tracked against the set point.
    pub measurement: T,
    /// The time delta since the last computation.
    pub dt: T,
}

/// Bounded PID compute callback.
///
/// A time delta that is not strictly positive leaves the integral untouched
/// and yields a zero derivative, so only the proportional term acts.
pub fn compute_bounded<T: Number>(
    pid: &mut PidController<T, BoundedControlData<T>>,
    data: BoundedControlData<T>,
) -> (T, T, T) {
    let error = pid.set_point - data.measurement;
    if !(T::zero() < data.dt) {
        return (error, pid.integral, T::zero());
    }
    let integral = pid.integral + error * data.dt;
    let derivative = (error - pid.error) / data.dt;

    (error, integral, derivative)
}

/// Single-axis PID with output clamping and anti-windup.
pub struct BoundedPid<T: Number> {
    pid: PidController<T, BoundedControlData<T>>,
    max_output: T,
}

impl<T: Number> BoundedPid<T> {
    /// Creates a controller from a gain set.
    pub fn with_gains(gains: PidGains<T>) -> Self {
        let mut pid = PidController::new();
        pid.compute_fn(compute_bounded)
            .set_point(T::zero())
            .kp(gains.kp)
            .ki(gains.ki)
            .kd(gains.kd);

        BoundedPid {
            pid,
            max_output: gains.max_output.abs(),
        }
    }

    /// Computes the output driving `measurement` towards `setpoint`.
    ///
    /// The result is always within `[-max_output, max_output]`.
    pub fn compute(&mut self, setpoint: T, measurement: T, dt: T) -> T {
        self.pid.set_point(setpoint);
        let output = self.pid.compute(BoundedControlData { measurement, dt });

        let limit = self.max_output;
        if output < limit && -limit < output {
            return output;
        }

        // Saturated, undo this step's integration.
        if T::zero() < dt {
            self.pid.integral = self.pid.integral - self.pid.error * dt;
        }
        Number::clamp(output, -limit, limit)
    }

    /// Clears the integral and the remembered error.
    pub fn reset(&mut self) {
        self.pid.integral = T::zero();
        self.pid.error = T::zero();
    }

    /// Replaces the gains, keeping the accumulated state.
    pub fn set_tunings(&mut self, kp: T, ki: T, kd: T) {
        self.pid.kp(kp).ki(ki).kd(kd);
    }

    /// Replaces the output limit, keeping the accumulated state. The sign
    /// of `max_output` is ignored.
    pub fn set_output_limits(&mut self, max_output: T) {
        self.max_output = max_output.abs();
    }

    /// Current gain set.
    pub fn gains(&self) -> PidGains<T> {
        PidGains::new(self.pid.kp, self.pid.ki, self.pid.kd, self.max_output)
    }

    /// Accumulated integral of the error.
    pub fn integral(&self) -> T {
        self.pid.integral
    }

    /// Error seen by the previous computation.
    pub fn last_error(&self) -> T {
        self.pid.error
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;
    use fixed::types::I16F16;

    fn pid(kp: f32, ki: f32, kd: f32, max_output: f32) -> BoundedPid<f32> {
        BoundedPid::with_gains(PidGains::new(kp, ki, kd, max_output))
    }

    /// Test PID response with non-zero set point and zero measurement.
    #[test]
    fn test_pid_bounded_response() {
        let mut pid = pid(1.0, 1.0, 1.0, 100.0);

        let output = pid.compute(10.0, 0.0, 1.0);
        assert!(value_close(10.0, pid.integral()), "Integral should start to accumulate.");
        assert!(value_close(30.0, output), "Output should be the sum of terms.");

        let output = pid.compute(10.0, 0.0, 1.0);
        assert!(value_close(20.0, pid.integral()), "Integral should accumulate to 20.");
        assert!(
            value_close(30.0, output),
            "Derivative should vanish and integral should grow."
        );
    }

    /// Test that a constant large error never drives the output past the limit.
    #[test]
    fn test_pid_bounded_anti_windup() {
        let mut pid = pid(1.0, 1.0, 0.0, 50.0);
        let dt = 0.004;

        for _ in 0..10_000 {
            let output = pid.compute(1000.0, 0.0, dt);
            assert!(output <= 50.0, "Output exceeded limit: {}", output);
            assert!(-50.0 <= output, "Output exceeded limit: {}", output);
        }
        assert!(
            pid.integral().abs() <= 1000.0 * dt,
            "Integral should not wind up: {}",
            pid.integral()
        );
    }

    /// Test the saturated step backs out exactly its own contribution.
    #[test]
    fn test_pid_bounded_anti_windup_keeps_prior_integral() {
        let mut pid = pid(1.0, 1.0, 0.0, 20.0);

        let _ = pid.compute(5.0, 0.0, 1.0);
        assert!(value_close(5.0, pid.integral()));

        let output = pid.compute(-100.0, 0.0, 1.0);
        assert!(value_close(-20.0, output), "Output should clamp at -20.");
        assert!(
            value_close(5.0, pid.integral()),
            "Integral should be restored to its pre-saturation value."
        );
    }

    /// Test that the first computation after reset sees a zero previous error.
    #[test]
    fn test_pid_bounded_reset_clears_previous_error() {
        let mut pid = pid(0.0, 0.0, 1.0, 1000.0);

        let _ = pid.compute(10.0, 0.0, 1.0);
        let _ = pid.compute(30.0, 0.0, 1.0);
        assert!(value_close(30.0, pid.last_error()));

        pid.reset();
        assert!(value_close(0.0, pid.integral()));
        assert!(value_close(0.0, pid.last_error()));

        let output = pid.compute(4.0, 0.0, 2.0);
        assert!(
            value_close(2.0, output),
            "Derivative should be (4 - 0) / 2 after reset."
        );
    }

    /// Test that a non-positive time step leaves only the proportional term.
    #[test]
    fn test_pid_bounded_non_positive_dt() {
        let mut pid = pid(2.0, 1.0, 1.0, 1000.0);

        let _ = pid.compute(1.0, 0.0, 1.0);
        let integral = pid.integral();

        let output = pid.compute(3.0, 0.0, 0.0);
        assert!(value_close(7.0, output), "Only P plus the held I term should act.");
        assert!(value_close(integral, pid.integral()));

        let output = pid.compute(3.0, 0.0, -1.0);
        assert!(value_close(7.0, output));
        assert!(!pid.compute(3.0, 0.0, f32::NAN).is_nan());
    }

    /// Test that tunings and limits change without touching accumulated state.
    #[test]
    fn test_pid_bounded_set_tunings_and_limits() {
        let mut pid = pid(1.0, 1.0, 0.0, 100.0);
        let _ = pid.compute(10.0, 0.0, 1.0);

        pid.set_tunings(2.0, 0.5, 0.1);
        pid.set_output_limits(5.0);
        assert!(value_close(10.0, pid.integral()));
        assert!(value_close(10.0, pid.last_error()));
        assert_eq!(PidGains::new(2.0, 0.5, 0.1, 5.0), pid.gains());

        let output = pid.compute(10.0, 0.0, 1.0);
        assert!(value_close(5.0, output), "New limit should apply.");
    }

    /// Test that a negative limit is used as a magnitude.
    #[test]
    fn test_pid_bounded_negative_limit() {
        let mut pid = pid(1.0, 0.0, 0.0, -20.0);
        assert!(value_close(20.0, pid.gains().max_output));
        assert!(value_close(20.0, pid.compute(100.0, 0.0, 1.0)));
        assert!(value_close(-20.0, pid.compute(-100.0, 0.0, 1.0)));
        assert!(value_close(5.0, pid.compute(5.0, 0.0, 1.0)));

        pid.set_output_limits(-3.0);
        assert!(value_close(3.0, pid.compute(5.0, 0.0, 1.0)));
    }

    /// Test the controller with a fixed-point number type.
    #[test]
    fn test_pid_bounded_fixed_point() {
        let gains = PidGains::new(
            I16F16::from_num(1),
            I16F16::from_num(0),
            I16F16::from_num(0),
            I16F16::from_num(8),
        );
        let mut pid = BoundedPid::with_gains(gains);

        let output = pid.compute(I16F16::from_num(3), I16F16::from_num(0), I16F16::from_num(1));
        assert_eq!(I16F16::from_num(3), output);

        let output = pid.compute(I16F16::from_num(20), I16F16::from_num(0), I16F16::from_num(1));
        assert_eq!(I16F16::from_num(8), output);
    }
}
