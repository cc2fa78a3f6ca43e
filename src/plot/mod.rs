//! Terminal plots of standard curves.

pub mod ascii;

pub use ascii::*;
