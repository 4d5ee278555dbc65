use std::{
    fs,
    path::{Path, PathBuf},
};

use log::{info, warn};

use super::{
    AverageRate, DetectionError, EnergyWindow, Events, ReadOptions, average_rate,
    rate::histogram, read_time_energy,
};

/// Count rates per fixed-width time bin.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CountRates {
    /// Counts per second in each bin.
    pub rates: Vec<f64>,

    /// Bin edges in seconds, one more than `rates` when non-empty.
    pub bin_edges: Vec<f64>,
}

/// Accumulates detector events from one or more event logs.
///
/// Events are kept sorted by arrival time across every added file.
#[derive(Debug, Clone, Default)]
pub struct DataProcessor {
    files: Vec<PathBuf>,
    times: Vec<f64>,
    energies: Vec<f64>,
}

impl DataProcessor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the events of one log and returns how many were read.
    ///
    /// # Errors
    ///
    /// Returns a [`DetectionError`] if the file cannot be read or parsed, in
    /// which case no events are added.
    pub fn add_file(
        &mut self,
        path: impl AsRef<Path>,
        options: &ReadOptions,
    ) -> Result<usize, DetectionError> {
        let path = path.as_ref();
        let events = read_time_energy(path, options)?;
        let count = events.len();

        if count == 0 {
            warn!("no events in {}", path.display());
        } else {
            info!("added {} containing {count} events", path.display());
        }

        self.files.push(path.to_path_buf());
        self.merge(events);
        Ok(count)
    }

    /// Adds every `*.csv` and `*.CSV` file in `dir`, in file-name order.
    ///
    /// Returns the number of files added.
    ///
    /// # Errors
    ///
    /// Returns a [`DetectionError`] if the directory cannot be listed or any
    /// file fails to load. Files loaded before the failure are kept.
    pub fn add_directory(
        &mut self,
        dir: impl AsRef<Path>,
        options: &ReadOptions,
    ) -> Result<usize, DetectionError> {
        let dir = dir.as_ref();
        let io_error = |source| DetectionError::Io {
            path: dir.to_path_buf(),
            source,
        };

        let mut paths = Vec::new();
        for entry in fs::read_dir(dir).map_err(io_error)? {
            let path = entry.map_err(io_error)?.path();
            let is_csv = path
                .extension()
                .is_some_and(|ext| ext == "csv" || ext == "CSV");
            if is_csv && path.is_file() {
                paths.push(path);
            }
        }
        paths.sort();

        if paths.is_empty() {
            warn!("no event logs found in {}", dir.display());
        }
        for path in &paths {
            self.add_file(path, options)?;
        }
        Ok(paths.len())
    }

    /// Files added so far, in load order.
    #[must_use]
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Arrival times of every event, sorted.
    #[must_use]
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    /// Energies of every event, in the order of [`DataProcessor::times`].
    #[must_use]
    pub fn energies(&self) -> &[f64] {
        &self.energies
    }

    /// Arrival times of events inside `window`, or of every event if `None`.
    #[must_use]
    pub fn times_in(&self, window: Option<&EnergyWindow>) -> Vec<f64> {
        match window {
            None => self.times.clone(),
            Some(window) => self
                .times
                .iter()
                .zip(&self.energies)
                .filter(|&(_, &energy)| window.contains(energy))
                .map(|(&time, _)| time)
                .collect(),
        }
    }

    /// Histograms event times into bins of `bin_time` seconds.
    ///
    /// Edges run from zero in steps of `bin_time`, stopping below the
    /// second-to-last event time. With an energy window only the events
    /// inside it count.
    ///
    /// # Errors
    ///
    /// Returns [`DetectionError::InvalidBinTime`] for a non-positive bin
    /// width and [`DetectionError::TooFewEvents`] with fewer than two events
    /// loaded.
    pub fn count_rate(
        &self,
        bin_time: f64,
        energy_window: Option<&EnergyWindow>,
    ) -> Result<CountRates, DetectionError> {
        if !bin_time.is_finite() || bin_time <= 0.0 {
            return Err(DetectionError::InvalidBinTime(bin_time));
        }
        let stop = self
            .times
            .len()
            .checked_sub(2)
            .map(|index| self.times[index])
            .ok_or(DetectionError::TooFewEvents {
                found: self.times.len(),
            })?;

        let bin_edges = bin_edges(stop, bin_time);
        let counts = histogram(&self.times_in(energy_window), &bin_edges);

        #[allow(clippy::cast_precision_loss)]
        let rates = counts
            .into_iter()
            .map(|count| count as f64 / bin_time)
            .collect();

        Ok(CountRates { rates, bin_edges })
    }

    /// Averages the rate of events with `t_min <= t < t_max`, optionally
    /// restricted to an energy window.
    ///
    /// # Errors
    ///
    /// Returns [`DetectionError::InvalidTimeWindow`] unless `t_min < t_max`.
    pub fn average_rate(
        &self,
        t_min: f64,
        t_max: f64,
        energy_window: Option<&EnergyWindow>,
    ) -> Result<AverageRate, DetectionError> {
        average_rate(&self.times_in(energy_window), t_min, t_max)
    }

    fn merge(&mut self, events: Events) {
        let mut merged: Vec<(f64, f64)> = self
            .times
            .drain(..)
            .zip(self.energies.drain(..))
            .chain(events.times.into_iter().zip(events.energies))
            .collect();
        merged.sort_by(|a, b| a.0.total_cmp(&b.0));

        (self.times, self.energies) = merged.into_iter().unzip();
    }
}

/// Edges `0, w, 2w, ...` strictly below `stop`.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]
fn bin_edges(stop: f64, bin_time: f64) -> Vec<f64> {
    if stop.is_nan() || stop <= 0.0 {
        return Vec::new();
    }
    let count = (stop / bin_time).ceil() as usize;
    (0..count)
        .map(|k| k as f64 * bin_time)
        .filter(|&edge| edge < stop)
        .collect()
}
