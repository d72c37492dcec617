// src/stabilizer/flight_stabilizer.rs

//! A module specifying the shared interface for PID-based flight stabilizers.
//! Implementations own one controller per axis and turn setpoints plus the
//! current attitude estimate into three bounded control outputs.

use crate::pid::Number;

/// A trait for PID-based flight stabilizers that handle roll, pitch,
/// and yaw control based on attitude and gyro data and dt.
pub trait FlightStabilizer<T: Number> {
    /// Takes desired setpoints, current IMU attitude, and gyro rates, then computes the control outputs.
    ///
    /// - `set_point`: A tuple of (roll, pitch, yaw) desired setpoints.
    /// - `imu_attitude`: A tuple of (roll, pitch, yaw) current IMU measurements.
    /// - `gyro_rate`: A tuple of (roll rate, pitch rate, yaw rate) from the gyroscope.
    /// - `dt`: Time delta since the last update.
    ///
    /// Returns a tuple of (roll control, pitch control, yaw control) outputs.
    fn control(
        &mut self,
        set_point: (T, T, T),
        imu_attitude: (T, T, T),
        gyro_rate: (T, T, T),
        dt: T,
    ) -> (T, T, T);

    /// Clears the accumulated state of every axis controller.
    fn reset(&mut self);
}
