//! `qpcr-titer` library crate.
//!
//! The binary (`qpcr`) is a thin wrapper around this library so that:
//!
//! - the analysis engine is testable without spawning processes
//! - other hosts (GUI, notebooks) can drive the same `Session`
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod models;
pub mod plot;
pub mod report;
pub mod titer;
