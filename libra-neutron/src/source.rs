//! Neutron generator source built from diamond-detector characterisation.
//!
//! The generator's emission is tabulated as an energy spectrum per polar angle,
//! measured from the deuteron beam axis. Each angular bin becomes one point
//! source with isotropic azimuth, a uniform polar cosine within the bin, the
//! bin's tabulated spectrum, and a strength proportional to its share of the
//! total yield.

use std::{
    f64::consts::PI,
    fs, io,
    path::{Path, PathBuf},
};

use log::info;
use thiserror::Error;

/// Polar angles of the tabulated spectra, in degrees.
pub const ANGLES_DEG: [f64; 11] = [
    0.0, 15.0, 30.0, 45.0, 60.0, 75.0, 90.0, 105.0, 120.0, 135.0, 150.0,
];

const ENERGY_COLUMN: &str = "Energy (MeV)";
const EV_PER_MEV: f64 = 1e6;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed spectrum table")]
    Csv(#[from] csv::Error),

    #[error("spectrum table has no {name:?} column")]
    MissingColumn { name: String },

    #[error("line {line}: invalid number {value:?}")]
    InvalidNumber { line: usize, value: String },

    #[error("line {line}: expected {expected} cells, found {found}")]
    RaggedRow {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("expected {expected} spectra, one per angle, found {found}")]
    AngleCount { expected: usize, found: usize },

    #[error("spectrum {angle} has {found} values for {expected} energies")]
    SpectrumLength {
        angle: usize,
        expected: usize,
        found: usize,
    },

    #[error("total yield must be finite and positive, got {0}")]
    InvalidYield(f64),

    #[error("reference direction must be a finite non-zero vector, got {0:?}")]
    InvalidDirection([f64; 3]),
}

/// Energy spectra of the generator, one per entry of [`ANGLES_DEG`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpectrumTable {
    energies_mev: Vec<f64>,
    spectra: Vec<Vec<f64>>,
}

impl SpectrumTable {
    /// Creates a table from energies in MeV and one spectrum per angle.
    ///
    /// # Errors
    ///
    /// Returns a [`SourceError`] unless there is exactly one spectrum per
    /// angle and every spectrum has one value per energy.
    pub fn new(energies_mev: Vec<f64>, spectra: Vec<Vec<f64>>) -> Result<Self, SourceError> {
        if spectra.len() != ANGLES_DEG.len() {
            return Err(SourceError::AngleCount {
                expected: ANGLES_DEG.len(),
                found: spectra.len(),
            });
        }
        if let Some((angle, spectrum)) = spectra
            .iter()
            .enumerate()
            .find(|(_, spectrum)| spectrum.len() != energies_mev.len())
        {
            return Err(SourceError::SpectrumLength {
                angle,
                expected: energies_mev.len(),
                found: spectrum.len(),
            });
        }

        Ok(Self {
            energies_mev,
            spectra,
        })
    }

    /// Reads a comma-separated table with an `Energy (MeV)` column and one
    /// column per angle, named by its value in degrees (`0`, `15`, ...).
    ///
    /// # Errors
    ///
    /// Returns a [`SourceError`] if the file cannot be read, a column is
    /// missing, or a cell is not a number.
    pub fn read_csv(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| SourceError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let table = Self::parse_csv(&contents)?;
        info!(
            "read {} energies for {} angles from {}",
            table.energies_mev.len(),
            ANGLES_DEG.len(),
            path.display()
        );
        Ok(table)
    }

    fn parse_csv(contents: &str) -> Result<Self, SourceError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(contents.as_bytes());

        let header = reader.headers()?.clone();
        let column = |name: &str| {
            header
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| SourceError::MissingColumn {
                    name: name.to_string(),
                })
        };

        let energy_index = column(ENERGY_COLUMN)?;
        let angle_indices = ANGLES_DEG
            .iter()
            .map(|angle| column(&format!("{angle}")))
            .collect::<Result<Vec<_>, _>>()?;

        let mut energies_mev = Vec::new();
        let mut spectra = vec![Vec::new(); ANGLES_DEG.len()];

        for record in reader.records() {
            let record = record?;
            if record.iter().all(str::is_empty) {
                continue;
            }

            #[allow(clippy::cast_possible_truncation)]
            let line_number = record
                .position()
                .map_or(0, |position| position.line() as usize);
            if record.len() != header.len() {
                return Err(SourceError::RaggedRow {
                    line: line_number,
                    expected: header.len(),
                    found: record.len(),
                });
            }

            let parse = |cell: &str| {
                cell.parse::<f64>()
                    .map_err(|_| SourceError::InvalidNumber {
                        line: line_number,
                        value: cell.to_string(),
                    })
            };

            energies_mev.push(parse(&record[energy_index])?);
            for (spectrum, &column) in spectra.iter_mut().zip(&angle_indices) {
                spectrum.push(parse(&record[column])?);
            }
        }

        Self::new(energies_mev, spectra)
    }

    #[must_use]
    pub fn energies_mev(&self) -> &[f64] {
        &self.energies_mev
    }

    /// Spectrum at `ANGLES_DEG[angle]`.
    #[must_use]
    pub fn spectrum(&self, angle: usize) -> Option<&[f64]> {
        self.spectra.get(angle).map(Vec::as_slice)
    }
}

/// A point in space, in centimeters.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub xyz: [f64; 3],
}

/// A uniform distribution on `[a, b]`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Uniform {
    pub a: f64,
    pub b: f64,
}

/// Direction distribution in polar cosine and azimuth about `reference_uvw`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PolarAzimuthal {
    pub mu: Uniform,
    pub phi: Uniform,
    pub reference_uvw: [f64; 3],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum Interpolation {
    LinearLinear,
}

/// A tabulated distribution, energies in eV.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tabular {
    pub x: Vec<f64>,
    pub p: Vec<f64>,
    pub interpolation: Interpolation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Particle {
    Neutron,
}

/// One independent source of a Monte Carlo source definition.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IndependentSource {
    pub space: Point,
    pub angle: PolarAzimuthal,
    pub energy: Tabular,
    pub strength: f64,
    pub particle: Particle,
}

/// Builds the generator as one point source per angular bin.
///
/// Bin `i` spans polar cosines `[cos θ(i+1), cos θ(i)]`, where the last bin
/// closes at `cos π`. Strengths are the bins' spectrum sums weighted by their
/// cosine width, normalised to one.
///
/// # Errors
///
/// Returns [`SourceError::InvalidDirection`] for a zero or non-finite
/// reference direction and [`SourceError::InvalidYield`] if the table holds
/// no emission.
pub fn mvng_source_diamond(
    table: &SpectrumTable,
    center: [f64; 3],
    reference_uvw: [f64; 3],
) -> Result<Vec<IndependentSource>, SourceError> {
    let norm = reference_uvw.iter().map(|c| c * c).sum::<f64>().sqrt();
    if !norm.is_finite() || norm == 0.0 {
        return Err(SourceError::InvalidDirection(reference_uvw));
    }

    let bins: Vec<f64> = ANGLES_DEG
        .iter()
        .map(|deg| deg.to_radians().cos())
        .chain([PI.cos()])
        .collect();

    let yields: Vec<f64> = table
        .spectra
        .iter()
        .zip(bins.windows(2))
        .map(|(spectrum, edges)| spectrum.iter().sum::<f64>() * (edges[0] - edges[1]))
        .collect();
    let total: f64 = yields.iter().sum();
    if !total.is_finite() || total <= 0.0 {
        return Err(SourceError::InvalidYield(total));
    }

    let energies_ev: Vec<f64> = table.energies_mev.iter().map(|e| e * EV_PER_MEV).collect();
    let phi = Uniform { a: 0.0, b: 2.0 * PI };

    Ok(table
        .spectra
        .iter()
        .zip(bins.windows(2))
        .zip(yields)
        .map(|((spectrum, edges), bin_yield)| IndependentSource {
            space: Point { xyz: center },
            angle: PolarAzimuthal {
                mu: Uniform {
                    a: edges[1],
                    b: edges[0],
                },
                phi,
                reference_uvw,
            },
            energy: Tabular {
                x: energies_ev.clone(),
                p: spectrum.clone(),
                interpolation: Interpolation::LinearLinear,
            },
            strength: bin_yield / total,
            particle: Particle::Neutron,
        })
        .collect())
}
