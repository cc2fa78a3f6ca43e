//! Standard-curve fitting.
//!
//! Responsibilities:
//!
//! - validate an edited dataset as a whole
//! - fit Cq against log10(SQ) and derive efficiency
//! - flag warning-level quality issues

pub mod fitter;

pub use fitter::*;
