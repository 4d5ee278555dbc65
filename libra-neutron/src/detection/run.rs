use std::path::Path;

use log::info;

use super::{CountRates, DataProcessor, DetectionError, EnergyWindow, ReadOptions};

/// Settings for processing a directory of event logs.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunConfig {
    /// Width of the count-rate bins, in seconds.
    pub bin_time: f64,

    /// Energy window of the peak of interest.
    pub energy_window: EnergyWindow,
    pub read: ReadOptions,
}

impl RunConfig {
    #[must_use]
    pub fn new(bin_time: f64, energy_window: EnergyWindow) -> Self {
        Self {
            bin_time,
            energy_window,
            read: ReadOptions::default(),
        }
    }

    #[must_use]
    pub fn with_read_options(self, read: ReadOptions) -> Self {
        Self { read, ..self }
    }
}

/// Count rates and events of one detector run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DetectorRun {
    pub all_count_rates: CountRates,
    pub peak_count_rates: CountRates,

    /// Arrival times of every event, in seconds, sorted.
    pub time_values: Vec<f64>,
    pub energy_values: Vec<f64>,

    /// Arrival times of the events inside the energy window.
    pub peak_time_values: Vec<f64>,
}

/// Loads every event log in `dir` and extracts total and peak count rates.
///
/// # Errors
///
/// Returns a [`DetectionError`] if a log cannot be loaded, if the directory
/// holds no events, or if the bin time is invalid.
pub fn process_directory(
    dir: impl AsRef<Path>,
    config: &RunConfig,
) -> Result<DetectorRun, DetectionError> {
    let dir = dir.as_ref();
    let mut processor = DataProcessor::new();
    let files = processor.add_directory(dir, &config.read)?;

    let all_count_rates = processor.count_rate(config.bin_time, None)?;
    let peak_count_rates = processor.count_rate(config.bin_time, Some(&config.energy_window))?;
    let peak_time_values = processor.times_in(Some(&config.energy_window));

    info!(
        "processed {files} files from {}: {} events, {} in the peak window",
        dir.display(),
        processor.times().len(),
        peak_time_values.len(),
    );

    Ok(DetectorRun {
        all_count_rates,
        peak_count_rates,
        time_values: processor.times().to_vec(),
        energy_values: processor.energies().to_vec(),
        peak_time_values,
    })
}
