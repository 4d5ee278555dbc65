/// The core trait for the computational building blocks of the toolbox.
///
/// A `Component` takes an input and produces an output, or fails with its own
/// error type. Components should be deterministic, always producing the same
/// result for a given input, which is what allows a numerical solver to call
/// them repeatedly while integrating.
///
/// # Example
///
/// ```
/// use std::convert::Infallible;
/// use libra_core::Component;
///
/// struct Decay {
///     rate: f64,
/// }
///
/// impl Component for Decay {
///     type Input = f64;
///     type Output = f64;
///     type Error = Infallible;
///
///     fn call(&self, amount: f64) -> Result<f64, Self::Error> {
///         Ok(-self.rate * amount)
///     }
/// }
///
/// assert_eq!(Decay { rate: 0.5 }.call(4.0).unwrap(), -2.0);
/// ```
pub trait Component {
    type Input;
    type Output;
    type Error: std::error::Error + Send + Sync + 'static;

    /// Calls the component with the given input and returns a result.
    ///
    /// # Errors
    ///
    /// Each component defines its own `Error` type, allowing it to determine
    /// what constitutes a failure within its domain.
    fn call(&self, input: Self::Input) -> Result<Self::Output, Self::Error>;
}
