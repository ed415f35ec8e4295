//! Bonding-curve pricing for the Volt state machine
//!
//! This crate is consensus-critical and deliberately tiny: four pure pricing
//! functions and the exact integer-power primitive underneath them. It holds
//! no state, performs no I/O, and never touches floating point.
//!
//! The rounding mode is part of the protocol: every division floors, and
//! fractional exponents are evaluated as exact integer roots at a fixed
//! 10^18 scale (see [`math::pow_ratio`]). The golden vectors pin the results.

pub mod curve;
pub mod math;

mod golden_vectors;

pub use curve::{purchase_amount, purchase_return, sale_amount, sale_return, MAX_CRR, MIN_CRR};
