// src/pid.rs

//! # PID Control Module
//!
//! This module provides the numeric bound shared by the controllers and a
//! bounded, anti-windup PID built on top of `piddiy`.

use num_traits::Signed;
use piddiy::Number as PiddiyNumber;

pub mod bounded;
pub use bounded::*;

/// Custom trait to encapsulate base number requirements.
///
/// Signed, so symmetric limits can be taken as magnitudes.
pub trait Number: PiddiyNumber + Signed {
    /// Clamps generic PartialOrd values within a given range.
    fn clamp(self, min: Self, max: Self) -> Self {
        if self < min {
            min
        } else if max < self {
            max
        } else {
            self
        }
    }
}

impl<T: PiddiyNumber + Signed> Number for T {}
