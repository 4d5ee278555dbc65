//! Neutron-side tools for the LIBRA experiment.
//!
//! - [`detection`]: count rates from diamond-detector event logs.
//! - [`materials`]: material definitions for neutron transport codes.
//! - [`source`]: the neutron generator as a set of point sources.

pub mod detection;
pub mod materials;
pub mod source;

pub use detection::{DataProcessor, DetectionError};
pub use materials::Material;
pub use source::{SourceError, SpectrumTable, mvng_source_diamond};
