// src/scheduler.rs

//! # Loop Scheduler
//!
//! Drives the [`FlightController`] at a fixed rate from an injected
//! [`Clock`] and runs the [`SafetyWatchdog`] between ticks. The scheduler
//! never sleeps: callers spin on [`LoopScheduler::poll`], which runs a tick
//! once a full period has elapsed since the previous one.
//!
//! A tick that runs late is reported as an overrun and the next tick starts
//! immediately, there is no catch-up. The watchdog is only evaluated after
//! a tick has finished writing, so a forced stop always wins over the
//! output computed by that tick.

use crate::arming::{ArmingOutcome, DisarmReason};
use crate::config::SchedulerConfig;
use crate::controller::FlightController;
use crate::error::TickError;
use crate::hal::{ActuatorSink, Clock, SensorSource};
use crate::types::{ControlInputs, MotorCommand};
use crate::watchdog::{SafetyWatchdog, WatchdogVerdict};

/// Outcome of a single tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReport {
    /// Pulses written, or why the tick was skipped.
    pub result: Result<MotorCommand, TickError>,
    /// Outcome of the arming command the tick handled, if it carried one.
    pub arming: Option<ArmingOutcome>,
    /// Time step handed to the controller, in seconds.
    pub dt: f32,
    /// Time spent in the tick, in microseconds.
    pub duration_us: u64,
    /// Whether the tick exceeded the overrun threshold.
    pub overrun: bool,
}

/// Outcome of a call to [`LoopScheduler::poll`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PollReport {
    /// The tick that ran, if one was due.
    pub tick: Option<TickReport>,
    /// What the watchdog decided.
    pub watchdog: WatchdogVerdict,
}

/// Counters accumulated over the life of the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoopStats {
    /// Ticks attempted.
    pub ticks: u64,
    /// Ticks that did not complete.
    pub skipped: u64,
    /// Ticks that exceeded the overrun threshold.
    pub overruns: u64,
    /// Emergency stops forced by the watchdog.
    pub watchdog_trips: u64,
    /// Duration of the last tick, in microseconds.
    pub last_duration_us: u64,
    /// Longest tick so far, in microseconds.
    pub max_duration_us: u64,
}

/// Fixed-rate driver of a [`FlightController`] guarded by a watchdog.
pub struct LoopScheduler<S, A, C> {
    controller: FlightController<S, A>,
    clock: C,
    config: SchedulerConfig,
    watchdog: SafetyWatchdog,
    last_tick_us: Option<u64>,
    stats: LoopStats,
}

impl<S, A, C> LoopScheduler<S, A, C>
where
    S: SensorSource,
    A: ActuatorSink,
    C: Clock,
{
    /// Wraps `controller`. The command timeout starts counting now.
    pub fn new(controller: FlightController<S, A>, clock: C, config: SchedulerConfig) -> Self {
        let watchdog = SafetyWatchdog::with_config(&config, clock.now_micros());
        log::info!(
            "Control loop at {} Hz, period {} us",
            config.loop_frequency_hz,
            config.period_us()
        );
        Self {
            controller,
            clock,
            config,
            watchdog,
            last_tick_us: None,
            stats: LoopStats::default(),
        }
    }

    /// Hands fresh operator inputs to the controller and feeds the watchdog.
    pub fn submit(&mut self, inputs: ControlInputs) {
        self.watchdog.record_command(self.clock.now_micros());
        self.controller.set_inputs(inputs);
    }

    /// Whether a full period has elapsed since the last tick.
    pub fn is_tick_due(&self, now_us: u64) -> bool {
        match self.last_tick_us {
            None => true,
            Some(last) => now_us.saturating_sub(last) >= self.config.period_us(),
        }
    }

    /// Runs a tick if one is due, then the watchdog.
    pub fn poll(&mut self) -> PollReport {
        let tick = if self.is_tick_due(self.clock.now_micros()) {
            Some(self.tick())
        } else {
            None
        };
        let watchdog = self.check_watchdog();
        PollReport { tick, watchdog }
    }

    /// Runs one tick right away.
    ///
    /// The time step is the time since the previous tick, or the nominal
    /// period for the very first one.
    pub fn tick(&mut self) -> TickReport {
        let start = self.clock.now_micros();
        let dt = match self.last_tick_us {
            None => self.config.period_us() as f32 / 1_000_000.0,
            // A clock running backwards yields a negative step.
            Some(last) => start.wrapping_sub(last) as i64 as f32 / 1_000_000.0,
        };
        self.last_tick_us = Some(start);

        let result = self.controller.update(dt);
        if let Err(e) = result {
            self.stats.skipped += 1;
            log::warn!("Tick skipped: {}", e);
        }

        let duration_us = self.clock.now_micros().saturating_sub(start);
        let overrun = duration_us > self.config.overrun_threshold_us();
        self.stats.ticks += 1;
        self.stats.last_duration_us = duration_us;
        self.stats.max_duration_us = self.stats.max_duration_us.max(duration_us);
        if overrun {
            self.stats.overruns += 1;
            log::warn!(
                "Loop overrun: {} us (expected {} us)",
                duration_us,
                self.config.period_us()
            );
        }

        let interval = self.config.stats_interval_ticks();
        if interval > 0 && self.stats.ticks % interval == 0 {
            self.log_stats();
        }

        TickReport {
            result,
            arming: self.controller.arming_outcome(),
            dt,
            duration_us,
            overrun,
        }
    }

    /// Runs the watchdog check if one is due, stopping the craft if the
    /// command channel has gone silent while armed.
    pub fn check_watchdog(&mut self) -> WatchdogVerdict {
        let now = self.clock.now_micros();
        let verdict = self.watchdog.check(now, self.controller.is_armed());
        if let WatchdogVerdict::Tripped { .. } = verdict {
            self.stats.watchdog_trips += 1;
            self.controller.emergency_stop(DisarmReason::Watchdog);
        }
        verdict
    }

    /// Counters so far.
    pub fn stats(&self) -> LoopStats {
        self.stats
    }

    /// Scheduler configuration.
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// The watchdog state.
    pub fn watchdog(&self) -> &SafetyWatchdog {
        &self.watchdog
    }

    /// The injected clock.
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// The driven controller.
    pub fn controller(&self) -> &FlightController<S, A> {
        &self.controller
    }

    /// The driven controller, mutably.
    pub fn controller_mut(&mut self) -> &mut FlightController<S, A> {
        &mut self.controller
    }

    /// Gives the controller back.
    pub fn into_controller(self) -> FlightController<S, A> {
        self.controller
    }

    fn log_stats(&self) {
        let state = self.controller.flight_state();
        log::info!(
            "Loop stats: {} ticks, {} skipped, {} overruns, max {} us",
            self.stats.ticks,
            self.stats.skipped,
            self.stats.overruns,
            self.stats.max_duration_us
        );
        log::info!(
            "Attitude roll {:.1} pitch {:.1} yaw {:.1}, armed {}",
            state.roll,
            state.pitch,
            state.yaw,
            state.armed
        );
    }
}
