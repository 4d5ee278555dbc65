//! Background subtraction and cumulative activity of LSC measurements.

use libra_core::units::Activity;
use thiserror::Error;
use uom::ConstZero;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MeasurementError {
    #[error("background has already been subtracted from this measurement")]
    BackgroundAlreadySubtracted,

    #[error("background has already been subtracted from measurement {index}")]
    AlreadySubtractedAt { index: usize },

    #[error("background must be subtracted from measurement {index} first")]
    BackgroundNotSubtracted { index: usize },
}

/// Subtracts a background activity, flooring the result at zero.
#[must_use]
pub fn background_sub(measured: Activity, background: Activity) -> Activity {
    if measured > background {
        measured - background
    } else {
        Activity::ZERO
    }
}

/// A labelled sample vial.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vial {
    pub label: String,
    pub activity: Activity,
}

/// One sampling round: a set of vials counted against a common background.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Measurement {
    background: Activity,
    vials: Vec<Vial>,
    background_subtracted: bool,
}

impl Measurement {
    #[must_use]
    pub fn new(background: Activity) -> Self {
        Self {
            background,
            vials: Vec::new(),
            background_subtracted: false,
        }
    }

    #[must_use]
    pub fn with_vial(mut self, label: impl Into<String>, activity: Activity) -> Self {
        self.vials.push(Vial {
            label: label.into(),
            activity,
        });
        self
    }

    /// Adds vials from `(label, activity)` pairs, such as the output of
    /// [`LscFile::bq1_values_with_labels`](crate::lsc::LscFile::bq1_values_with_labels).
    #[must_use]
    pub fn with_vials(mut self, vials: impl IntoIterator<Item = (String, Activity)>) -> Self {
        self.vials.extend(
            vials
                .into_iter()
                .map(|(label, activity)| Vial { label, activity }),
        );
        self
    }

    #[must_use]
    pub fn background(&self) -> Activity {
        self.background
    }

    #[must_use]
    pub fn vials(&self) -> &[Vial] {
        &self.vials
    }

    #[must_use]
    pub fn is_background_subtracted(&self) -> bool {
        self.background_subtracted
    }

    /// Subtracts the background from every vial.
    ///
    /// # Errors
    ///
    /// Returns [`MeasurementError::BackgroundAlreadySubtracted`] on a second
    /// call, leaving the vials unchanged.
    pub fn subtract_background(&mut self) -> Result<(), MeasurementError> {
        if self.background_subtracted {
            return Err(MeasurementError::BackgroundAlreadySubtracted);
        }
        for vial in &mut self.vials {
            vial.activity = background_sub(vial.activity, self.background);
        }
        self.background_subtracted = true;
        Ok(())
    }

    /// Sum of the vial activities.
    #[must_use]
    pub fn total(&self) -> Activity {
        self.vials
            .iter()
            .fold(Activity::ZERO, |total, vial| total + vial.activity)
    }
}

/// Subtracts the background from every measurement.
///
/// # Errors
///
/// Returns [`MeasurementError::AlreadySubtractedAt`] if any measurement was
/// already corrected, in which case none are modified.
pub fn subtract_background_from_measurements(
    measurements: &mut [Measurement],
) -> Result<(), MeasurementError> {
    if let Some(index) = measurements
        .iter()
        .position(Measurement::is_background_subtracted)
    {
        return Err(MeasurementError::AlreadySubtractedAt { index });
    }
    for measurement in measurements {
        measurement.subtract_background()?;
    }
    Ok(())
}

/// Running sum of the measurement totals.
///
/// # Errors
///
/// Returns [`MeasurementError::BackgroundNotSubtracted`] if any measurement
/// still includes its background.
pub fn cumulative_activity(measurements: &[Measurement]) -> Result<Vec<Activity>, MeasurementError> {
    if let Some(index) = measurements
        .iter()
        .position(|measurement| !measurement.is_background_subtracted())
    {
        return Err(MeasurementError::BackgroundNotSubtracted { index });
    }

    Ok(measurements
        .iter()
        .scan(Activity::ZERO, |total, measurement| {
            *total += measurement.total();
            Some(*total)
        })
        .collect())
}
