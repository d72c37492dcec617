// src/stabilizer.rs

//! # Flight Stabilizer Module
//!
//! Three-axis stabilizers built from the single-axis controllers in
//! [`crate::pid`].

pub mod attitude;
pub use attitude::*;
pub mod flight_stabilizer;
pub use flight_stabilizer::*;
