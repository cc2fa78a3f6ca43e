//! Input/output helpers.
//!
//! - CSV ingest of the standards table (`ingest`)
//! - per-standard result export (`export`)
//! - curve JSON read/write (`curve`)

pub mod curve;
pub mod export;
pub mod ingest;

pub use curve::*;
pub use export::*;
pub use ingest::*;
