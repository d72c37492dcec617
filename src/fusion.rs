// src/fusion.rs

//! # Sensor Fusion Module
//!
//! Attitude estimation with a complementary filter. The gyro rate is
//! integrated for short-term accuracy and blended with the absolute tilt
//! derived from the gravity vector, which removes gyro drift without
//! passing through the accelerometer noise. Yaw has no absolute reference
//! and is integrated from the gyro alone.

use core::f32::consts::PI;

use embedded_hal::delay::DelayNs;
use libm::{atan2f, sqrtf};

use crate::error::{FusionError, SensorError};
use crate::hal::SensorSource;
use crate::types::CalibrationOffsets;

const RAD_TO_DEG: f32 = 180.0 / PI;

/// Roll and pitch in degrees derived from an acceleration vector.
pub fn accel_angles(accel: (f32, f32, f32)) -> (f32, f32) {
    let (x, y, z) = accel;
    let roll = atan2f(y, z) * RAD_TO_DEG;
    let pitch = atan2f(-x, sqrtf(y * y + z * z)) * RAD_TO_DEG;
    (roll, pitch)
}

/// Wraps a heading in degrees into `[0, 360)`.
pub fn wrap_heading(yaw: f32) -> f32 {
    let wrapped = yaw % 360.0;
    let wrapped = if wrapped < 0.0 { wrapped + 360.0 } else { wrapped };
    // -tiny + 360 rounds up to 360
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Complementary filter attitude estimator with gyro bias calibration.
#[derive(Debug, Clone)]
pub struct SensorFusion {
    alpha: f32,
    offsets: CalibrationOffsets,
    calibrated: bool,
    attitude: (f32, f32, f32),
}

impl SensorFusion {
    /// Creates an estimator weighting the gyro path with `alpha`.
    pub fn new(alpha: f32) -> Self {
        Self {
            alpha,
            offsets: CalibrationOffsets::default(),
            calibrated: false,
            attitude: (0.0, 0.0, 0.0),
        }
    }

    /// Measures the gyro bias by averaging `samples` readings taken
    /// `delay_us` apart. Blocks for the whole duration; the craft must be
    /// at rest.
    pub fn calibrate<S, D>(
        &mut self,
        sensor: &mut S,
        delay: &mut D,
        samples: u32,
        delay_us: u32,
    ) -> Result<CalibrationOffsets, SensorError>
    where
        S: SensorSource + ?Sized,
        D: DelayNs + ?Sized,
    {
        let samples = samples.max(1);
        log::info!("Calibrating gyro over {} samples, keep the craft still", samples);

        // f32 accumulation drifts over a thousand samples
        let mut sum = (0.0f64, 0.0f64, 0.0f64);
        for i in 0..samples {
            let (x, y, z) = sensor.read()?.gyro;
            sum.0 += f64::from(x);
            sum.1 += f64::from(y);
            sum.2 += f64::from(z);
            if i % 100 == 0 {
                log::debug!("Calibration sample {}/{}", i, samples);
            }
            delay.delay_us(delay_us);
        }

        let n = f64::from(samples);
        self.offsets = CalibrationOffsets {
            gyro_x: (sum.0 / n) as f32,
            gyro_y: (sum.1 / n) as f32,
            gyro_z: (sum.2 / n) as f32,
        };
        self.calibrated = true;
        log::info!(
            "Calibration done, offsets x: {:.4} y: {:.4} z: {:.4}",
            self.offsets.gyro_x,
            self.offsets.gyro_y,
            self.offsets.gyro_z
        );
        Ok(self.offsets)
    }

    /// Fuses one raw sample into the attitude estimate.
    ///
    /// `raw_gyro` is in rad/s, `raw_accel` in m/s² and `dt` in seconds.
    /// Returns the `(roll, pitch, yaw)` angles in degrees and the
    /// bias-corrected rates in degrees per second.
    pub fn update(
        &mut self,
        raw_gyro: (f32, f32, f32),
        raw_accel: (f32, f32, f32),
        dt: f32,
    ) -> Result<((f32, f32, f32), (f32, f32, f32)), FusionError> {
        if !(dt > 0.0 && dt.is_finite()) {
            return Err(FusionError::InvalidTimeStep(dt));
        }

        let rates = (
            (raw_gyro.0 - self.offsets.gyro_x) * RAD_TO_DEG,
            (raw_gyro.1 - self.offsets.gyro_y) * RAD_TO_DEG,
            (raw_gyro.2 - self.offsets.gyro_z) * RAD_TO_DEG,
        );
        let (accel_roll, accel_pitch) = accel_angles(raw_accel);

        let (roll, pitch, yaw) = self.attitude;
        let alpha = self.alpha;
        self.attitude = (
            alpha * (roll + rates.0 * dt) + (1.0 - alpha) * accel_roll,
            alpha * (pitch + rates.1 * dt) + (1.0 - alpha) * accel_pitch,
            wrap_heading(yaw + rates.2 * dt),
        );

        Ok((self.attitude, rates))
    }

    /// Gyro bias in use.
    pub fn offsets(&self) -> CalibrationOffsets {
        self.offsets
    }

    /// Whether [`calibrate`](Self::calibrate) has completed.
    pub fn is_calibrated(&self) -> bool {
        self.calibrated
    }

    /// Current `(roll, pitch, yaw)` estimate in degrees.
    pub fn attitude(&self) -> (f32, f32, f32) {
        self.attitude
    }
}
