//! Numerical solvers for the LIBRA toolbox.
//!
//! The integration schemes themselves come from [`ode_solvers`]; this crate
//! adapts any [`Integratable`](libra_core::solve::ode::Integratable)
//! component to them and reports failures as typed errors.

pub mod ode;
