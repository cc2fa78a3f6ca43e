//! Domain types used throughout the engine.
//!
//! This module defines:
//!
//! - the editable standard-curve table (`StandardCurveDataset`, `Column`)
//! - scalar titer inputs (`TiterInputs`) and seed defaults
//! - fit and titer outputs (`FittedCurve`, `FitWarning`, `TiterResult`)

pub mod types;

pub use types::*;
