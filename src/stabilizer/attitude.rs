// src/stabilizer/attitude.rs

//! # Attitude Flight Stabilization Controller
//!
//! Roll and pitch are stabilized on absolute angle, yaw on angular rate
//! because there is no absolute heading reference. Each axis runs its own
//! [`BoundedPid`], so every output respects the axis limit and none of the
//! integrators can wind up while saturated.

use crate::config::PidGains;
use crate::pid::{BoundedPid, Number};
use crate::FlightStabilizer;

/// Struct representing the Attitude PID Flight Stabilization Controller.
pub struct AttitudeStabilizer<T: Number> {
    roll_pid: BoundedPid<T>,
    pitch_pid: BoundedPid<T>,
    yaw_pid: BoundedPid<T>,
}

impl<T: Number> AttitudeStabilizer<T> {
    /// Creates a new controller using the provided gains
    pub fn with_gains(roll: PidGains<T>, pitch: PidGains<T>, yaw: PidGains<T>) -> Self {
        AttitudeStabilizer {
            roll_pid: BoundedPid::with_gains(roll),
            pitch_pid: BoundedPid::with_gains(pitch),
            yaw_pid: BoundedPid::with_gains(yaw),
        }
    }

    /// Integrals of the roll, pitch and yaw controllers.
    pub fn integrals(&self) -> (T, T, T) {
        (
            self.roll_pid.integral(),
            self.pitch_pid.integral(),
            self.yaw_pid.integral(),
        )
    }

    /// Roll axis controller.
    pub fn roll_mut(&mut self) -> &mut BoundedPid<T> {
        &mut self.roll_pid
    }

    /// Pitch axis controller.
    pub fn pitch_mut(&mut self) -> &mut BoundedPid<T> {
        &mut self.pitch_pid
    }

    /// Yaw axis controller.
    pub fn yaw_mut(&mut self) -> &mut BoundedPid<T> {
        &mut self.yaw_pid
    }
}

impl<T: Number> FlightStabilizer<T> for AttitudeStabilizer<T> {
    fn control(
        &mut self,
        set_point: (T, T, T),
        imu_attitude: (T, T, T),
        gyro_rate: (T, T, T),
        dt: T,
    ) -> (T, T, T) {
        let (set_point_roll, set_point_pitch, set_point_yaw) = set_point;
        let (imu_roll, imu_pitch, _) = imu_attitude;
        let (_, _, gyro_yaw) = gyro_rate;

        let roll_output = self.roll_pid.compute(set_point_roll, imu_roll, dt);
        let pitch_output = self.pitch_pid.compute(set_point_pitch, imu_pitch, dt);
        // Yaw, stabilize on rate
        let yaw_output = self.yaw_pid.compute(set_point_yaw, gyro_yaw, dt);

        (roll_output, pitch_output, yaw_output)
    }

    fn reset(&mut self) {
        self.roll_pid.reset();
        self.pitch_pid.reset();
        self.yaw_pid.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    fn default_stabilizer() -> AttitudeStabilizer<f32> {
        let angle = PidGains::new(1.0, 0.01, 10.0, 400.0);
        AttitudeStabilizer::with_gains(angle, angle, PidGains::new(2.0, 0.05, 0.0, 400.0))
    }

    /// Test the no error condition.
    #[test]
    fn test_stabilizer_attitude_no_error() {
        let mut stabilizer = default_stabilizer();

        let output = stabilizer.control((5.0, -5.0, 20.0), (5.0, -5.0, 123.0), (0.0, 0.0, 20.0), 0.004);
        assert!(
            vector_close((0.0, 0.0, 0.0), output),
            "Outputs should be zero as there is no error."
        );
    }

    /// Test that yaw tracks rate while roll and pitch track angle.
    #[test]
    fn test_stabilizer_attitude_yaw_tracks_rate() {
        let mut stabilizer = default_stabilizer();

        // Heading is irrelevant to the yaw axis, only the yaw rate is.
        let (_, _, yaw) = stabilizer.control((0.0, 0.0, 10.0), (0.0, 0.0, 270.0), (0.0, 0.0, 0.0), 1.0);
        assert!(value_close(2.0 * 10.0 + 0.05 * 10.0, yaw));

        // Roll rate is irrelevant to the roll axis, only the roll angle is.
        let mut stabilizer = default_stabilizer();
        let (roll, _, _) = stabilizer.control((0.0, 0.0, 0.0), (0.0, 0.0, 0.0), (50.0, 0.0, 0.0), 1.0);
        assert!(value_close(0.0, roll));
    }

    /// Test that outputs stay within the axis limits.
    #[test]
    fn test_stabilizer_attitude_output_saturation() {
        let mut stabilizer = default_stabilizer();

        for _ in 0..1000 {
            let (roll, pitch, yaw) =
                stabilizer.control((30.0, -30.0, 180.0), (-90.0, 90.0, 0.0), (0.0, 0.0, -500.0), 0.004);
            assert!(roll.abs() <= 400.0);
            assert!(pitch.abs() <= 400.0);
            assert!(yaw.abs() <= 400.0);
        }
    }

    /// Test that reset clears every integrator.
    #[test]
    fn test_stabilizer_attitude_reset() {
        let mut stabilizer = default_stabilizer();
        for _ in 0..10 {
            let _ = stabilizer.control((1.0, 1.0, 1.0), (0.0, 0.0, 0.0), (0.0, 0.0, 0.0), 0.004);
        }
        assert!(vector_not_close((0.0, 0.0, 0.0), stabilizer.integrals()));

        stabilizer.reset();
        assert!(vector_close((0.0, 0.0, 0.0), stabilizer.integrals()));
    }
}
