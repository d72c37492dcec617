// src/lib.rs

//! # Quadcopter Attitude Stabilization
//!
//! This crate provides a `no_std`, no-alloc attitude stabilization core for
//! an X-frame quadcopter. Raw gyro and accelerometer samples are fused into
//! an attitude estimate with a complementary filter, three bounded PID
//! controllers track the operator's setpoints, and a quad-X mixer turns
//! their outputs into four ESC pulse widths.
//!
//! The [`FlightController`](controller::FlightController) runs one tick of
//! that pipeline at a time and gates it behind an arming state machine. The
//! [`LoopScheduler`](scheduler::LoopScheduler) drives it at a fixed rate
//! and stops the motors when the operator's command channel goes silent.
//! Hardware access is limited to the traits in [`hal`].

#![no_std]
#![deny(missing_docs)]

pub mod arming;
pub mod config;
pub mod controller;
pub mod error;
pub mod fusion;
pub mod hal;
pub mod input;
pub mod mixer;
pub mod pid;
pub mod scheduler;
pub mod stabilizer;
pub mod types;
pub mod watchdog;

#[doc(inline)]
pub use stabilizer::*;

#[cfg(test)]
mod test_utils;
