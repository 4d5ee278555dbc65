//! Numerical integration of sampled curves.

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum IntegrateError {
    #[error("sample lengths differ: {y_len} values but {x_len} abscissae")]
    LengthMismatch { y_len: usize, x_len: usize },
}

/// Running trapezoidal integral of `y` over `x`, starting at zero.
///
/// The result has the same length as the inputs: element `i` is the integral
/// from `x[0]` to `x[i]`. Empty input gives an empty result.
///
/// # Errors
///
/// Returns [`IntegrateError::LengthMismatch`] if `y` and `x` differ in length.
///
/// # Example
///
/// ```
/// use libra_tritium::integrate::cumulative_trapezoid;
///
/// let area = cumulative_trapezoid(&[0.0, 2.0, 2.0], &[0.0, 1.0, 3.0]).unwrap();
/// assert_eq!(area, vec![0.0, 1.0, 5.0]);
/// ```
pub fn cumulative_trapezoid(y: &[f64], x: &[f64]) -> Result<Vec<f64>, IntegrateError> {
    if y.len() != x.len() {
        return Err(IntegrateError::LengthMismatch {
            y_len: y.len(),
            x_len: x.len(),
        });
    }
    Ok(running_trapezoid(y.iter().copied().zip(x.iter().copied())))
}

/// Running trapezoid over `(y, x)` pairs.
pub(crate) fn running_trapezoid(points: impl IntoIterator<Item = (f64, f64)>) -> Vec<f64> {
    let mut points = points.into_iter();
    let Some(mut previous) = points.next() else {
        return Vec::new();
    };

    let mut total = 0.0;
    let mut integral = Vec::with_capacity(points.size_hint().0 + 1);
    integral.push(total);

    for (y, x) in points {
        let (y_prev, x_prev) = previous;
        total += 0.5 * (y + y_prev) * (x - x_prev);
        integral.push(total);
        previous = (y, x);
    }

    integral
}
