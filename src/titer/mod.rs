//! Unknown-sample quantification: SQ prediction and titer conversion.

pub mod predictor;

pub use predictor::*;
