//! Standard-curve line model.
//!
//! Implemented as small, pure functions so that fitting, prediction and
//! reporting code can share them.

pub mod model;

pub use model::*;
