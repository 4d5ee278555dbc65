//! Core traits, constraints, and unit types for the LIBRA toolbox.

mod component;

pub mod constraint;
pub mod format;
pub mod solve;
pub mod units;

pub use component::Component;
