use crate::Component;

/// A [`Component`] that describes a system of `N` first-order ODEs.
///
/// The solver works on raw `f64` magnitudes, so an implementation maps
/// between the solver's [`State<N>`] and the component's (usually
/// unit-carrying) input and output types. Quantities should be converted to a
/// single consistent unit system (SI) in both directions.
pub trait Integratable<const N: usize>: Component {
    /// Builds a component input from the initial conditions and a solver state.
    ///
    /// Called on every right-hand-side evaluation, so everything the state does
    /// not carry (parameters, boundary conditions) must come from
    /// `initial_conditions`.
    fn apply_state(initial_conditions: &Self::Input, state: State<N>) -> Self::Input;

    /// Extracts the solver state from a component input.
    ///
    /// Called once at the start of integration.
    fn extract_state(input: &Self::Input) -> State<N>;

    /// Extracts the state derivatives from a component output.
    ///
    /// The order must match `y` in [`State`].
    fn extract_derivative(output: &Self::Output) -> [f64; N];
}

/// A point on an ODE trajectory.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct State<const N: usize> {
    /// The independent variable, time in seconds for every model in this workspace.
    pub x: f64,

    /// The dependent variables at `x`.
    pub y: [f64; N],
}

impl<const N: usize> State<N> {
    /// Creates a state at `x` with values `y`.
    #[must_use]
    pub fn new(x: f64, y: [f64; N]) -> Self {
        Self { x, y }
    }

    /// Returns `true` if `x` and every value in `y` are finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.iter().all(|v| v.is_finite())
    }
}
