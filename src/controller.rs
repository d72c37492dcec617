// src/controller.rs

//! # Flight Controller
//!
//! Owns every stage of the stabilization pipeline and runs it once per
//! call to [`FlightController::update`]:
//!
//! ```text
//! sensor read -> fusion -> arming command -> (armed) PID x3 -> mixer -> actuators
//!                                         -> (disarmed) idle -------^
//! ```
//!
//! Fusion runs whether armed or not so arming decisions are always based on
//! a live attitude estimate. The sensor and the actuators are injected at
//! construction, which lets the whole pipeline run against synthetic data.

use embedded_hal::delay::DelayNs;

use crate::arming::{ArmingOutcome, ArmingStateMachine, DisarmReason, Transition};
use crate::config::FlightConfig;
use crate::error::{ArmError, InitError, TickError};
use crate::fusion::SensorFusion;
use crate::hal::{ActuatorSink, SensorSource};
use crate::mixer::MotionMixer;
use crate::stabilizer::{AttitudeStabilizer, FlightStabilizer};
use crate::types::{ArmingCommand, CalibrationOffsets, ControlInputs, FlightState, MotorCommand};

/// Attitude stabilization pipeline for an X-frame quadcopter.
pub struct FlightController<S, A> {
    sensor: S,
    actuator: A,
    config: FlightConfig,
    fusion: SensorFusion,
    stabilizer: AttitudeStabilizer<f32>,
    mixer: MotionMixer,
    arming: ArmingStateMachine,
    state: FlightState,
    inputs: ControlInputs,
    output: MotorCommand,
    arming_outcome: Option<ArmingOutcome>,
    sensor_failures: u32,
    initialized: bool,
}

impl<S: SensorSource, A: ActuatorSink> FlightController<S, A> {
    /// Creates a disarmed, uninitialized controller.
    pub fn new(sensor: S, actuator: A, config: FlightConfig) -> Self {
        let mixer = MotionMixer::with_config(&config);
        Self {
            sensor,
            actuator,
            fusion: SensorFusion::new(config.complementary_alpha),
            stabilizer: AttitudeStabilizer::with_gains(config.roll, config.pitch, config.yaw),
            mixer,
            arming: ArmingStateMachine::new(config.arm_throttle_threshold),
            state: FlightState::default(),
            inputs: ControlInputs::default(),
            output: mixer.idle(),
            arming_outcome: None,
            sensor_failures: 0,
            initialized: false,
            config,
        }
    }

    /// Brings the sensor up, arms the ESCs and calibrates the gyro.
    ///
    /// Blocks for the ESC arming delay plus the calibration. The control
    /// loop refuses to run until this has succeeded.
    pub fn init<D: DelayNs + ?Sized>(
        &mut self,
        delay: &mut D,
    ) -> Result<CalibrationOffsets, InitError> {
        log::info!("Initializing flight controller");
        self.sensor.init().map_err(|e| {
            log::error!("Sensor initialization failed: {}", e);
            InitError::Sensor(e)
        })?;

        log::info!("Arming ESCs");
        self.write(MotorCommand::uniform(self.config.esc_arm_pulse_us));
        delay.delay_ms(self.config.esc_arm_delay_ms);

        let offsets = self
            .fusion
            .calibrate(
                &mut self.sensor,
                delay,
                self.config.calibration_samples,
                self.config.calibration_delay_us,
            )
            .map_err(|e| {
                log::error!("Gyro calibration failed: {}", e);
                InitError::Calibration(e)
            })?;

        self.initialized = true;
        log::info!("Flight controller ready");
        Ok(offsets)
    }

    /// Hands over the latest operator inputs.
    ///
    /// A pending arming command is acted upon by the next tick only.
    pub fn set_inputs(&mut self, inputs: ControlInputs) {
        self.inputs = inputs.clamped();
    }

    /// Runs one tick of the pipeline with time step `dt` in seconds and
    /// returns the pulses written to the motors.
    ///
    /// Nothing is written when `dt` is invalid. When the sensor cannot be
    /// read the estimate is left untouched and, while disarmed, the motors
    /// are still driven to idle. While armed the last output is held until
    /// `sensor_failure_limit` reads in a row have failed, then the craft is
    /// stopped.
    pub fn update(&mut self, dt: f32) -> Result<MotorCommand, TickError> {
        if !self.initialized {
            return Err(TickError::NotInitialized);
        }
        self.arming_outcome = None;
        if !(dt > 0.0 && dt.is_finite()) {
            return Err(TickError::InvalidTimeStep(dt));
        }

        let sample = match self.sensor.read() {
            Ok(sample) => sample,
            Err(e) => {
                self.sensor_failures = self.sensor_failures.saturating_add(1);
                if !self.arming.is_armed() {
                    let idle = self.mixer.idle();
                    self.write(idle);
                } else if self.sensor_failures >= self.config.sensor_failure_limit {
                    log::error!("{} sensor reads failed in a row", self.sensor_failures);
                    self.emergency_stop(DisarmReason::SensorFailure);
                }
                return Err(e.into());
            }
        };
        self.sensor_failures = 0;

        let ((roll, pitch, yaw), (roll_rate, pitch_rate, yaw_rate)) =
            self.fusion.update(sample.gyro, sample.accel, dt)?;
        self.state.roll = roll;
        self.state.pitch = pitch;
        self.state.yaw = yaw;
        self.state.roll_rate = roll_rate;
        self.state.pitch_rate = pitch_rate;
        self.state.yaw_rate = yaw_rate;
        self.state.accel = sample.accel;

        if let Some(command) = self.inputs.take_command() {
            self.apply_command(command);
        }
        self.state.armed = self.arming.is_armed();

        let command = if self.state.armed {
            let set_points = self.set_points();
            let outputs = self.stabilizer.control(
                set_points,
                self.state.attitude(),
                self.state.rates(),
                dt,
            );
            let throttle_pulse = self.mixer.throttle_pulse(self.inputs.throttle);
            self.mixer.output(true, throttle_pulse, outputs)
        } else {
            self.mixer.idle()
        };
        log::trace!("Tick dt {:.4}s, motors {:?}", dt, command.pulses);

        self.write(command);
        Ok(command)
    }

    /// Disarms and drives every motor to idle immediately, discarding any
    /// output computed earlier in the tick.
    pub fn emergency_stop(&mut self, reason: DisarmReason) {
        log::warn!("Emergency stop: {}", reason);
        self.arming.disarm(reason);
        self.state.armed = false;
        let idle = self.mixer.idle();
        self.write(idle);
    }

    /// Snapshot of the attitude estimate and armed flag.
    pub fn flight_state(&self) -> FlightState {
        self.state
    }

    /// Whether the motors are armed.
    pub fn is_armed(&self) -> bool {
        self.arming.is_armed()
    }

    /// Outcome of the arming command handled by the last tick, `None` when
    /// that tick carried no command.
    pub fn arming_outcome(&self) -> Option<ArmingOutcome> {
        self.arming_outcome
    }

    /// Whether [`init`](Self::init) has completed.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Pulses last written to the motors.
    pub fn motor_command(&self) -> MotorCommand {
        self.output
    }

    /// Inputs currently in effect.
    pub fn inputs(&self) -> &ControlInputs {
        &self.inputs
    }

    /// Gyro bias in use.
    pub fn calibration(&self) -> CalibrationOffsets {
        self.fusion.offsets()
    }

    /// Axis controllers, for retuning at runtime.
    pub fn stabilizer_mut(&mut self) -> &mut AttitudeStabilizer<f32> {
        &mut self.stabilizer
    }

    /// Axis controllers.
    pub fn stabilizer(&self) -> &AttitudeStabilizer<f32> {
        &self.stabilizer
    }

    /// The injected sensor.
    pub fn sensor(&self) -> &S {
        &self.sensor
    }

    /// The injected sensor, mutably.
    pub fn sensor_mut(&mut self) -> &mut S {
        &mut self.sensor
    }

    /// The injected actuator sink.
    pub fn actuator(&self) -> &A {
        &self.actuator
    }

    /// The injected actuator sink, mutably.
    pub fn actuator_mut(&mut self) -> &mut A {
        &mut self.actuator
    }

    fn apply_command(&mut self, command: ArmingCommand) {
        let throttle = self.inputs.throttle;
        let outcome = self.arming.handle(command, throttle, &mut self.stabilizer);
        match outcome {
            Ok(Some(Transition::Disarmed(DisarmReason::EmergencyStop))) => {
                log::warn!("Emergency stop: {}", DisarmReason::EmergencyStop)
            }
            Ok(_) => {}
            Err(ArmError::AlreadyArmed) => log::debug!("Arm request ignored, already armed"),
            Err(e) => log::warn!("Arm request refused: {}", e),
        }
        self.arming_outcome = Some(outcome);
    }

    fn set_points(&self) -> (f32, f32, f32) {
        (
            self.inputs.roll_cmd / 100.0 * self.config.max_angle_roll,
            self.inputs.pitch_cmd / 100.0 * self.config.max_angle_pitch,
            self.inputs.yaw_cmd / 100.0 * self.config.max_rate_yaw,
        )
    }

    fn write(&mut self, command: MotorCommand) {
        for (channel, pulse) in command.channels() {
            self.actuator.write_pulse(channel, pulse);
        }
        self.actuator.set_armed_indicator(self.arming.is_armed());
        self.output = command;
    }
}
