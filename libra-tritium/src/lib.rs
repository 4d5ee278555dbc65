//! Tritium transport modeling and measurement analysis for the LIBRA experiment.
//!
//! - [`model`]: release of bred tritium from a molten-salt volume, integrated
//!   piecewise over an irradiation schedule.
//! - [`lsc`]: reader for liquid scintillation counter exports.
//! - [`measurement`]: background subtraction and cumulative activity.
//! - [`activity`]: conversions between tritium inventory and activity.
//! - [`integrate`]: cumulative trapezoid integration.

pub mod activity;
pub mod integrate;
pub mod lsc;
pub mod measurement;
pub mod model;

pub use model::{Model, ModelConfig, TransportError};
