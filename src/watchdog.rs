// src/watchdog.rs

//! # Safety Watchdog
//!
//! Tracks when the last operator command arrived. At every check boundary
//! an armed craft that has not heard from the operator for the command
//! timeout is reported as tripped, and the caller must force an emergency
//! stop. Losing the command channel degrades to motors off, never to
//! holding the last command.

use crate::config::SchedulerConfig;

/// Result of a watchdog poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchdogVerdict {
    /// The check interval has not elapsed yet.
    NotDue,
    /// Checked, nothing to do.
    Healthy,
    /// Armed with a stale command channel, the craft must stop.
    Tripped {
        /// Time since the last command, in microseconds.
        silence_us: u64,
    },
}

/// Command freshness monitor polled from the control loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SafetyWatchdog {
    interval_us: u64,
    timeout_us: u64,
    last_check_us: u64,
    last_command_us: u64,
}

impl SafetyWatchdog {
    /// Creates a watchdog checking every `interval_us` and tripping after
    /// `timeout_us` of silence. Both clocks start at `now_us`.
    pub fn new(interval_us: u64, timeout_us: u64, now_us: u64) -> Self {
        Self {
            interval_us,
            timeout_us,
            last_check_us: now_us,
            last_command_us: now_us,
        }
    }

    /// Creates a watchdog with the cadence and timeout of `config`.
    pub fn with_config(config: &SchedulerConfig, now_us: u64) -> Self {
        Self::new(config.watchdog_interval_us, config.command_timeout_us, now_us)
    }

    /// Notes that a command arrived at `now_us`.
    pub fn record_command(&mut self, now_us: u64) {
        self.last_command_us = now_us;
    }

    /// Time since the last command, in microseconds.
    pub fn command_age(&self, now_us: u64) -> u64 {
        now_us.saturating_sub(self.last_command_us)
    }

    /// Whether the next check is due at `now_us`.
    pub fn is_due(&self, now_us: u64) -> bool {
        now_us.saturating_sub(self.last_check_us) >= self.interval_us
    }

    /// Runs a check if one is due.
    pub fn check(&mut self, now_us: u64, armed: bool) -> WatchdogVerdict {
        if !self.is_due(now_us) {
            return WatchdogVerdict::NotDue;
        }
        self.last_check_us = now_us;

        let silence_us = self.command_age(now_us);
        if armed && silence_us >= self.timeout_us {
            log::warn!(
                "No command for {} ms while armed, forcing stop",
                silence_us / 1000
            );
            return WatchdogVerdict::Tripped { silence_us };
        }
        WatchdogVerdict::Healthy
    }
}
