use super::DetectionError;

/// An open energy interval `(min, max)` selecting one peak of the spectrum.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnergyWindow {
    min: f64,
    max: f64,
}

impl EnergyWindow {
    /// Creates a window between `min` and `max`.
    ///
    /// # Errors
    ///
    /// Returns [`DetectionError::InvalidEnergyWindow`] unless `min < max`.
    pub fn new(min: f64, max: f64) -> Result<Self, DetectionError> {
        if min < max {
            Ok(Self { min, max })
        } else {
            Err(DetectionError::InvalidEnergyWindow { min, max })
        }
    }

    #[must_use]
    pub fn min(&self) -> f64 {
        self.min
    }

    #[must_use]
    pub fn max(&self) -> f64 {
        self.max
    }

    /// Returns `true` if `energy` lies strictly inside the window.
    #[must_use]
    pub fn contains(&self, energy: f64) -> bool {
        self.min < energy && energy < self.max
    }
}

/// Mean count rate over a time window with its Poisson uncertainty.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AverageRate {
    pub counts: usize,

    /// `sqrt(counts)`.
    pub error: f64,

    /// Counts per second.
    pub count_rate: f64,
    pub count_rate_error: f64,
}

/// Averages the rate of events with `t_min <= t < t_max`.
///
/// # Errors
///
/// Returns [`DetectionError::InvalidTimeWindow`] unless `t_min < t_max`.
///
/// # Example
///
/// ```
/// use libra_neutron::detection::average_rate;
///
/// let times: Vec<f64> = (1..=9).map(f64::from).collect();
/// let rate = average_rate(&times, 2.5, 9.0).unwrap();
///
/// assert_eq!(rate.counts, 6);
/// assert_eq!(rate.count_rate, 6.0 / 6.5);
/// ```
pub fn average_rate(times: &[f64], t_min: f64, t_max: f64) -> Result<AverageRate, DetectionError> {
    if !t_min.is_finite() || !t_max.is_finite() || t_min >= t_max {
        return Err(DetectionError::InvalidTimeWindow { t_min, t_max });
    }

    let counts = times.iter().filter(|&&t| t_min <= t && t < t_max).count();

    #[allow(clippy::cast_precision_loss)]
    let total = counts as f64;
    let error = total.sqrt();
    let duration = t_max - t_min;

    Ok(AverageRate {
        counts,
        error,
        count_rate: total / duration,
        count_rate_error: error / duration,
    })
}

/// Counts `times` into the bins defined by `edges`.
///
/// Bins are half-open `[edges[i], edges[i + 1])` except the last, which also
/// includes its right edge. Times outside the edges are ignored.
pub(crate) fn histogram(times: &[f64], edges: &[f64]) -> Vec<usize> {
    let bins = edges.len().saturating_sub(1);
    let mut counts = vec![0; bins];
    let (Some(&first), Some(&last)) = (edges.first(), edges.last()) else {
        return counts;
    };
    if bins == 0 {
        return counts;
    }

    for &t in times {
        if t < first || t > last {
            continue;
        }
        let bin = (edges.partition_point(|&edge| edge <= t) - 1).min(bins - 1);
        counts[bin] += 1;
    }

    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    #[test]
    fn average_rate_counts_a_half_open_window() {
        let times: Vec<f64> = (1..=9).map(f64::from).collect();

        let rate = average_rate(&times, 2.5, 9.0).unwrap();

        assert_eq!(rate.counts, 6);
        assert_relative_eq!(rate.error, 6f64.sqrt());
        assert_relative_eq!(rate.count_rate, 6.0 / 6.5);
        assert_relative_eq!(rate.count_rate_error, 6f64.sqrt() / 6.5);

        assert_eq!(average_rate(&times, 3.0, 4.0).unwrap().counts, 1);
    }

    #[test]
    fn empty_or_reversed_windows_are_rejected() {
        assert!(average_rate(&[1.0], 2.0, 2.0).is_err());
        assert!(average_rate(&[1.0], 3.0, 2.0).is_err());
        assert!(average_rate(&[1.0], f64::NAN, 2.0).is_err());
    }

    #[test]
    fn histogram_closes_only_the_last_bin() {
        let edges = [0.0, 1.0, 2.0, 3.0];
        let times = [-0.5, 0.0, 0.5, 1.0, 2.999, 3.0, 3.5];

        assert_eq!(histogram(&times, &edges), vec![2, 1, 2]);
        assert!(histogram(&times, &[0.0]).is_empty());
    }

    #[test]
    fn energy_window_is_open() {
        let window = EnergyWindow::new(1.0, 2.0).unwrap();

        assert!(!window.contains(1.0));
        assert!(window.contains(1.5));
        assert!(!window.contains(2.0));
        assert!(EnergyWindow::new(2.0, 1.0).is_err());
    }
}
