use std::{cell::RefCell, rc::Rc};

use libra_core::{
    Component,
    solve::ode::{Integratable, State},
};
use ode_solvers::{SVector, System, dop_shared::IntegrationError};
use thiserror::Error;

/// Integrates an [`Integratable`] component with a method from `ode_solvers`.
#[derive(Debug)]
pub struct Solver<C: Integratable<N>, const N: usize> {
    component: C,
}

/// Input for [`Solver::call`].
#[derive(Debug)]
pub struct SolverInput<C: Integratable<N>, const N: usize> {
    /// Component input at the start of integration.
    ///
    /// The starting [`State`] comes from [`Integratable::extract_state`], and
    /// every intermediate input is rebuilt from it with
    /// [`Integratable::apply_state`].
    pub initial_conditions: C::Input,

    /// The endpoint of the integration interval.
    pub x_end: f64,

    /// Output spacing for the adaptive methods, fixed step size for `Rk4`.
    ///
    /// Adaptive methods report dense output at `x_start + k * x_step`.
    /// Must be strictly positive.
    pub x_step: f64,

    /// The numerical integration method to use.
    pub method: Method,
}

/// Output for [`Solver::call`].
#[derive(Debug)]
pub struct SolverOutput<C: Integratable<N>, const N: usize> {
    /// Number of right-hand-side evaluations reported by the integrator.
    pub component_calls: u32,

    /// The original input, used to rebuild component inputs from states.
    pub initial_conditions: C::Input,

    /// The states reported by the integrator, in increasing `x`.
    pub steps: Vec<State<N>>,
}

/// Error returned by [`Solver::call`].
#[derive(Debug, Error)]
pub enum SolverError {
    #[error(transparent)]
    Integration(#[from] IntegrationError),

    #[error("component call failed at x = {x}")]
    Component {
        x: f64,
        #[source]
        error: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    #[error("invalid solver input: {reason}")]
    InvalidInput { reason: &'static str },
}

/// Numerical integration methods supported by the solver.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum Method {
    /// Classic fixed-step 4th-order Runge–Kutta.
    ///
    /// Takes steps of exactly `x_step` and reports every one of them.
    Rk4,

    /// Adaptive Dormand–Prince 5(4) with local error control.
    Dopri5 { abs_tol: f64, rel_tol: f64 },

    /// Adaptive Dormand–Prince 8(5,3), for tight tolerances over long spans.
    Dop853 { abs_tol: f64, rel_tol: f64 },
}

impl Default for Method {
    fn default() -> Self {
        Self::Dopri5 {
            abs_tol: 1e-6,
            rel_tol: 1e-10,
        }
    }
}

impl<C: Integratable<N>, const N: usize> Solver<C, N> {
    /// Creates a new ODE solver for the given component.
    pub fn new(component: C) -> Self {
        Self { component }
    }

    /// Returns the wrapped component.
    pub fn component(&self) -> &C {
        &self.component
    }

    /// Returns the last state of a solver run, if it produced any.
    #[must_use]
    pub fn final_state(output: &SolverOutput<C, N>) -> Option<State<N>> {
        output.steps.last().copied()
    }
}

impl<C: Integratable<N>, const N: usize> Component for Solver<C, N> {
    type Input = SolverInput<C, N>;
    type Output = SolverOutput<C, N>;
    type Error = SolverError;

    /// Integrates the component from its initial state to `x_end`.
    ///
    /// # Errors
    ///
    /// Returns [`SolverError::InvalidInput`] for a non-positive or non-finite
    /// step, [`SolverError::Integration`] if the integrator fails, and
    /// [`SolverError::Component`] if any component call fails.
    fn call(&self, input: Self::Input) -> Result<Self::Output, Self::Error> {
        let SolverInput {
            initial_conditions,
            x_end,
            x_step,
            method,
        } = input;

        if !x_step.is_finite() || x_step <= 0.0 {
            return Err(SolverError::InvalidInput {
                reason: "x_step must be finite and strictly positive",
            });
        }

        let call_error = Rc::new(RefCell::new(None));
        let system = OdeSystem {
            component: &self.component,
            initial_conditions: &initial_conditions,
            call_error: Rc::clone(&call_error),
        };

        let State { x: x_start, y } = C::extract_state(&initial_conditions);
        if !x_end.is_finite() || x_end <= x_start {
            return Err(SolverError::InvalidInput {
                reason: "x_end must be finite and greater than the initial x",
            });
        }
        let y_start = y.into();

        let integrated = match method {
            Method::Rk4 => {
                let mut stepper = ode_solvers::Rk4::new(system, x_start, y_start, x_end, x_step);
                stepper.integrate().map(|stats| {
                    let x_out = stepper.x_out().clone();
                    let y_out = stepper.y_out().clone();
                    (stats, x_out, y_out)
                })
            }
            Method::Dopri5 { abs_tol, rel_tol } => {
                let mut stepper = ode_solvers::Dopri5::new(
                    system, x_start, x_end, x_step, y_start, rel_tol, abs_tol,
                );
                stepper.integrate().map(|stats| {
                    let x_out = stepper.x_out().clone();
                    let y_out = stepper.y_out().clone();
                    (stats, x_out, y_out)
                })
            }
            Method::Dop853 { abs_tol, rel_tol } => {
                let mut stepper = ode_solvers::Dop853::new(
                    system, x_start, x_end, x_step, y_start, rel_tol, abs_tol,
                );
                stepper.integrate().map(|stats| {
                    let x_out = stepper.x_out().clone();
                    let y_out = stepper.y_out().clone();
                    (stats, x_out, y_out)
                })
            }
        };

        // A failed component call usually surfaces as an integrator error too,
        // so it takes precedence.
        if let Some((x, error)) = call_error.borrow_mut().take() {
            return Err(SolverError::Component {
                x,
                error: Box::new(error),
            });
        }
        let (stats, x_out, y_out) = integrated?;

        let steps = x_out
            .into_iter()
            .zip(y_out)
            .map(|(x, y)| State { x, y: y.into() })
            .collect();

        Ok(SolverOutput {
            component_calls: stats.num_eval,
            initial_conditions,
            steps,
        })
    }
}

/// Adapts a component to the `ode_solvers` system interface.
///
/// The first failed component call is recorded with its `x` and stops the
/// integration at the next accepted step.
struct OdeSystem<'a, C: Integratable<N>, const N: usize> {
    component: &'a C,
    initial_conditions: &'a C::Input,
    call_error: Rc<RefCell<Option<(f64, C::Error)>>>,
}

impl<C: Integratable<N>, const N: usize> System<f64, SVector<f64, N>> for OdeSystem<'_, C, N> {
    fn system(&self, x: f64, y: &SVector<f64, N>, dy: &mut SVector<f64, N>) {
        let state = State { x, y: (*y).into() };
        let input = C::apply_state(self.initial_conditions, state);

        match self.component.call(input) {
            Ok(output) => {
                let derivative = C::extract_derivative(&output);
                *dy = SVector::from_row_slice(&derivative);
            }
            Err(e) => {
                let mut slot = self.call_error.borrow_mut();
                if slot.is_none() {
                    *slot = Some((x, e));
                }
                *dy = SVector::from_element(f64::NAN);
            }
        }
    }

    fn solout(&mut self, _x: f64, _y: &SVector<f64, N>, _dy: &SVector<f64, N>) -> bool {
        self.call_error.borrow().is_some()
    }
}
