//! Tritium transport in a molten-salt volume.
//!
//! Tritium is bred in the salt while the neutron generator is on and released
//! through the crucible walls and the free surface at rates proportional to
//! its concentration. Because the source switches on and off, the run is split
//! into intervals with a constant source and each is integrated separately.

mod balance;
mod geometry;
mod schedule;

use libra_core::{
    Component,
    constraint::{ConstraintError, NonNegative, StrictlyPositive},
    units::{Concentration, ConcentrationRate, particles_per_cubic_meter, per_hour},
};
use libra_solve::ode::{Method, Solver, SolverError, SolverInput};
use log::{debug, info};
use thiserror::Error;
use uom::{
    ConstZero,
    si::{
        f64::{Area, Frequency, Length, Ratio, Time, Velocity, Volume},
        frequency::hertz,
        time::{hour, second},
        velocity::meter_per_second,
    },
};

use crate::integrate::running_trapezoid;

pub use balance::{BalanceError, BalanceInput, BalanceOutput, SaltBalance};
pub use geometry::{Geometry, wall_thickness};
pub use schedule::{Interval, Irradiation, IrradiationSchedule, ScheduleError};

/// Parameters of a transport [`Model`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModelConfig {
    pub radius: Length,
    pub height: Length,

    /// Tritium breeding ratio, tritons produced per source neutron.
    pub tbr: Ratio,
    pub neutron_rate: Frequency,

    /// Mass-transfer coefficient at the crucible wall.
    pub k_wall: Velocity,

    /// Mass-transfer coefficient at the free surface.
    pub k_top: Velocity,

    /// Irradiations in chronological order.
    pub irradiations: Vec<Irradiation>,

    /// Evenly spaced samples per interval, both ends included.
    pub samples_per_interval: usize,
    pub method: Method,
}

impl ModelConfig {
    /// Creates a configuration with the experiment's default rates.
    ///
    /// Defaults are a `3e8 n/s` generator, `k_wall = 1.9e-8 m/s` and
    /// `k_top = 4.9e-7 m/s`, no irradiations, and 1000 samples per interval.
    #[must_use]
    pub fn new(radius: Length, height: Length, tbr: Ratio) -> Self {
        Self {
            radius,
            height,
            tbr,
            neutron_rate: Frequency::new::<hertz>(3e8),
            k_wall: Velocity::new::<meter_per_second>(1.9e-8),
            k_top: Velocity::new::<meter_per_second>(4.9e-7),
            irradiations: Vec::new(),
            samples_per_interval: 1000,
            method: Method::default(),
        }
    }

    #[must_use]
    pub fn with_neutron_rate(self, neutron_rate: Frequency) -> Self {
        Self {
            neutron_rate,
            ..self
        }
    }

    #[must_use]
    pub fn with_k_wall(self, k_wall: Velocity) -> Self {
        Self { k_wall, ..self }
    }

    #[must_use]
    pub fn with_k_top(self, k_top: Velocity) -> Self {
        Self { k_top, ..self }
    }

    #[must_use]
    pub fn with_irradiation(mut self, irradiation: Irradiation) -> Self {
        self.irradiations.push(irradiation);
        self
    }

    #[must_use]
    pub fn with_irradiations(self, irradiations: Vec<Irradiation>) -> Self {
        Self {
            irradiations,
            ..self
        }
    }

    #[must_use]
    pub fn with_samples_per_interval(self, samples_per_interval: usize) -> Self {
        Self {
            samples_per_interval,
            ..self
        }
    }

    #[must_use]
    pub fn with_method(self, method: Method) -> Self {
        Self { method, ..self }
    }
}

/// Error returned when building or running a [`Model`].
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("invalid {name}: {source}")]
    InvalidParameter {
        name: &'static str,
        #[source]
        source: ConstraintError,
    },

    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    #[error("final time must be finite and positive, got {seconds} s")]
    InvalidFinalTime { seconds: f64 },

    #[error("at least 2 samples per interval are required, got {samples}")]
    TooFewSamples { samples: usize },

    #[error("integration failed")]
    Solver(#[from] SolverError),

    #[error(
        "integrator produced {produced} of {expected} samples over [{start_s}, {stop_s}] s"
    )]
    IncompleteOutput {
        expected: usize,
        produced: usize,
        start_s: f64,
        stop_s: f64,
    },
}

/// Tritium inventory of a salt volume under a scheduled neutron source.
///
/// A model is validated once at construction. [`Model::run`] computes and
/// stores the concentration trajectory, replacing any previous one.
///
/// # Example
///
/// ```
/// use libra_tritium::{Model, ModelConfig, model::Irradiation};
/// use uom::si::{
///     f64::{Length, Ratio, Time},
///     length::centimeter,
///     ratio::ratio,
///     time::hour,
/// };
///
/// let config = ModelConfig::new(
///     Length::new::<centimeter>(5.0),
///     Length::new::<centimeter>(10.0),
///     Ratio::new::<ratio>(0.1),
/// )
/// .with_irradiation(Irradiation::new(Time::new::<hour>(0.0), Time::new::<hour>(12.0)).unwrap())
/// .with_samples_per_interval(50);
///
/// let mut model = Model::new(config).unwrap();
/// model.run(Time::new::<hour>(24.0)).unwrap();
///
/// assert_eq!(model.times().len(), 99);
/// assert!(model.integrated_release_top().last().unwrap() > &0.0);
/// ```
#[derive(Debug)]
pub struct Model {
    solver: Solver<SaltBalance, 1>,
    tbr: Ratio,
    neutron_rate: Frequency,
    schedule: IrradiationSchedule,
    samples_per_interval: usize,
    method: Method,
    times: Vec<Time>,
    concentrations: Vec<Concentration>,
}

impl Model {
    /// Builds a model from a configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] if the radius or height is not strictly
    /// positive, if a rate is negative, if the schedule is invalid, or if
    /// fewer than two samples per interval are requested.
    pub fn new(config: ModelConfig) -> Result<Self, TransportError> {
        let ModelConfig {
            radius,
            height,
            tbr,
            neutron_rate,
            k_wall,
            k_top,
            irradiations,
            samples_per_interval,
            method,
        } = config;

        let geometry = Geometry::from_constrained(
            StrictlyPositive::new(radius).map_err(invalid("radius"))?,
            StrictlyPositive::new(height).map_err(invalid("height"))?,
        );
        let tbr = NonNegative::new(tbr).map_err(invalid("tbr"))?;
        let neutron_rate = NonNegative::new(neutron_rate).map_err(invalid("neutron rate"))?;
        let k_wall = NonNegative::new(k_wall).map_err(invalid("k_wall"))?;
        let k_top = NonNegative::new(k_top).map_err(invalid("k_top"))?;

        if samples_per_interval < 2 {
            return Err(TransportError::TooFewSamples {
                samples: samples_per_interval,
            });
        }

        let balance = SaltBalance::new(geometry, k_wall.into_inner(), k_top.into_inner());

        Ok(Self {
            solver: Solver::new(balance),
            tbr: tbr.into_inner(),
            neutron_rate: neutron_rate.into_inner(),
            schedule: IrradiationSchedule::new(irradiations)?,
            samples_per_interval,
            method,
            times: Vec::new(),
            concentrations: Vec::new(),
        })
    }

    #[must_use]
    pub fn balance(&self) -> &SaltBalance {
        self.solver.component()
    }

    #[must_use]
    pub fn geometry(&self) -> &Geometry {
        self.balance().geometry()
    }

    #[must_use]
    pub fn volume(&self) -> Volume {
        self.geometry().volume()
    }

    #[must_use]
    pub fn top_area(&self) -> Area {
        self.geometry().top_area()
    }

    #[must_use]
    pub fn wall_area(&self) -> Area {
        self.geometry().wall_area()
    }

    #[must_use]
    pub fn tbr(&self) -> Ratio {
        self.tbr
    }

    #[must_use]
    pub fn neutron_rate(&self) -> Frequency {
        self.neutron_rate
    }

    #[must_use]
    pub fn schedule(&self) -> &IrradiationSchedule {
        &self.schedule
    }

    #[must_use]
    pub fn samples_per_interval(&self) -> usize {
        self.samples_per_interval
    }

    /// Tritium production rate while the generator is on.
    #[must_use]
    pub fn production_rate(&self) -> Frequency {
        self.tbr * self.neutron_rate
    }

    /// Tritium production rate at `time`.
    ///
    /// Zero unless `time` lies strictly inside an irradiation.
    #[must_use]
    pub fn source(&self, time: Time) -> Frequency {
        if self.schedule.is_active(time) {
            self.production_rate()
        } else {
            Frequency::ZERO
        }
    }

    #[must_use]
    pub fn loss_wall(&self, concentration: Concentration) -> Frequency {
        self.balance().loss_wall(concentration)
    }

    #[must_use]
    pub fn loss_top(&self, concentration: Concentration) -> Frequency {
        self.balance().loss_top(concentration)
    }

    /// Rate of change of the concentration at `time`.
    #[must_use]
    pub fn rhs(&self, time: Time, concentration: Concentration) -> ConcentrationRate {
        self.balance().rate(self.source(time), concentration)
    }

    /// Splits `[0, t_final]` into intervals with a constant source.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::InvalidFinalTime`] unless `t_final` is finite
    /// and positive.
    pub fn intervals(&self, t_final: Time) -> Result<Vec<Interval>, TransportError> {
        let seconds = t_final.get::<second>();
        if !seconds.is_finite() || seconds <= 0.0 {
            return Err(TransportError::InvalidFinalTime { seconds });
        }
        Ok(self.schedule.intervals(t_final))
    }

    /// Integrates the concentration from zero over `[0, t_final]`.
    ///
    /// The previous trajectory is discarded first, so a failed run leaves the
    /// model empty.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] if `t_final` is invalid or integration of
    /// any interval fails.
    pub fn run(&mut self, t_final: Time) -> Result<(), TransportError> {
        self.reset();

        let (times, concentrations) = self.simulate(t_final)?;

        info!(
            "transport run complete: {} samples over {:.3} h, final concentration {:.6e} m^-3",
            times.len(),
            times.last().map_or(0.0, |t| t.get::<hour>()),
            concentrations.last().map_or(0.0, |c| c.value),
        );

        self.times = times;
        self.concentrations = concentrations;
        Ok(())
    }

    /// Sample times of the last run.
    #[must_use]
    pub fn times(&self) -> &[Time] {
        &self.times
    }

    /// Salt concentrations of the last run, one per sample time.
    #[must_use]
    pub fn concentrations(&self) -> &[Concentration] {
        &self.concentrations
    }

    /// Clears the stored trajectory.
    pub fn reset(&mut self) {
        self.times.clear();
        self.concentrations.clear();
    }

    /// Cumulative particles released through the free surface.
    #[must_use]
    pub fn integrated_release_top(&self) -> Vec<f64> {
        self.integrated_release(SaltBalance::loss_top)
    }

    /// Cumulative particles released through the crucible walls.
    #[must_use]
    pub fn integrated_release_wall(&self) -> Vec<f64> {
        self.integrated_release(SaltBalance::loss_wall)
    }

    fn integrated_release<F>(&self, loss: F) -> Vec<f64>
    where
        F: Fn(&SaltBalance, Concentration) -> Frequency,
    {
        let balance = self.balance();
        running_trapezoid(
            self.times
                .iter()
                .zip(&self.concentrations)
                .map(|(time, c)| (per_hour(loss(balance, *c)), time.get::<hour>())),
        )
    }

    fn simulate(&self, t_final: Time) -> Result<(Vec<Time>, Vec<Concentration>), TransportError> {
        let intervals = self.intervals(t_final)?;
        let n = self.samples_per_interval;

        let mut times = Vec::with_capacity(intervals.len() * (n - 1) + 1);
        let mut concentrations = Vec::with_capacity(times.capacity());
        let mut concentration = particles_per_cubic_meter(0.0);

        for (index, interval) in intervals.iter().enumerate() {
            let source = if interval.irradiating {
                self.production_rate()
            } else {
                Frequency::ZERO
            };

            let samples = self.integrate_interval(interval, concentration, source)?;

            debug!(
                "interval {index}: [{:.3}, {:.3}] h, source {:.3e} s^-1, concentration {:.6e} -> {:.6e} m^-3",
                interval.start.get::<hour>(),
                interval.stop.get::<hour>(),
                source.get::<hertz>(),
                concentration.value,
                samples[n - 1].1,
            );

            // The first sample repeats the last one of the previous interval.
            let skip = usize::from(index > 0);
            for &(t, c) in &samples[skip..] {
                times.push(Time::new::<second>(t));
                concentrations.push(particles_per_cubic_meter(c));
            }
            concentration = particles_per_cubic_meter(samples[n - 1].1);
        }

        Ok((times, concentrations))
    }

    /// Returns `samples_per_interval` `(seconds, concentration)` pairs on an
    /// even grid over the interval, both ends included.
    fn integrate_interval(
        &self,
        interval: &Interval,
        initial: Concentration,
        source: Frequency,
    ) -> Result<Vec<(f64, f64)>, TransportError> {
        let n = self.samples_per_interval;
        let start_s = interval.start.get::<second>();
        let stop_s = interval.stop.get::<second>();

        #[allow(clippy::cast_precision_loss)]
        let x_step = (stop_s - start_s) / (n - 1) as f64;

        // Overshoot by half a step so the dense output always reaches `stop`.
        let output = self.solver.call(SolverInput {
            initial_conditions: BalanceInput {
                time: interval.start,
                concentration: initial,
                source,
            },
            x_end: stop_s + 0.5 * x_step,
            x_step,
            method: self.method,
        })?;

        let mut samples = Vec::with_capacity(n);
        samples.push((start_s, initial.value));
        samples.extend(
            output
                .steps
                .iter()
                .filter(|state| state.x > start_s + 0.5 * x_step)
                .take(n - 1)
                .enumerate()
                .map(|(k, state)| {
                    #[allow(clippy::cast_precision_loss)]
                    let t = if k + 2 == n {
                        stop_s
                    } else {
                        start_s + (k + 1) as f64 * x_step
                    };
                    (t, state.y[0])
                }),
        );

        if samples.len() < n {
            return Err(TransportError::IncompleteOutput {
                expected: n,
                produced: samples.len(),
                start_s,
                stop_s,
            });
        }

        Ok(samples)
    }
}

fn invalid(name: &'static str) -> impl FnOnce(ConstraintError) -> TransportError {
    move |source| TransportError::InvalidParameter { name, source }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use uom::si::{length::centimeter, ratio::ratio};

    fn hours(value: f64) -> Time {
        Time::new::<hour>(value)
    }

    fn config() -> ModelConfig {
        ModelConfig::new(
            Length::new::<centimeter>(5.0),
            Length::new::<centimeter>(10.0),
            Ratio::new::<ratio>(0.1),
        )
        .with_samples_per_interval(20)
    }

    #[test]
    fn source_is_off_at_irradiation_boundaries() {
        let model = Model::new(
            config().with_irradiation(Irradiation::new(hours(1.0), hours(3.0)).unwrap()),
        )
        .unwrap();

        assert_eq!(model.source(hours(1.0)), Frequency::ZERO);
        assert_eq!(model.source(hours(3.0)), Frequency::ZERO);
        assert_relative_eq!(model.source(hours(2.0)).get::<hertz>(), 3e7);
    }

    #[test]
    fn rhs_balances_source_and_losses() {
        let model = Model::new(
            config().with_irradiation(Irradiation::new(hours(0.0), hours(3.0)).unwrap()),
        )
        .unwrap();
        let c = particles_per_cubic_meter(1e12);

        let expected =
            (3e7 - model.loss_wall(c).get::<hertz>() - model.loss_top(c).get::<hertz>())
                / model.volume().value;
        assert_relative_eq!(model.rhs(hours(1.0), c).value, expected, max_relative = 1e-12);

        let idle = -(model.loss_wall(c) + model.loss_top(c)).get::<hertz>() / model.volume().value;
        assert_relative_eq!(model.rhs(hours(5.0), c).value, idle, max_relative = 1e-12);
    }

    #[test]
    fn rejects_invalid_configuration() {
        let zero_radius = config();
        let zero_radius = ModelConfig {
            radius: Length::new::<centimeter>(0.0),
            ..zero_radius
        };
        assert!(matches!(
            Model::new(zero_radius),
            Err(TransportError::InvalidParameter { name: "radius", .. })
        ));

        let negative_k = config().with_k_top(Velocity::new::<meter_per_second>(-1.0));
        assert!(matches!(
            Model::new(negative_k),
            Err(TransportError::InvalidParameter { name: "k_top", .. })
        ));

        assert!(matches!(
            Model::new(config().with_samples_per_interval(1)),
            Err(TransportError::TooFewSamples { samples: 1 })
        ));

        let out_of_order = config().with_irradiations(vec![
            Irradiation::new(hours(5.0), hours(6.0)).unwrap(),
            Irradiation::new(hours(1.0), hours(2.0)).unwrap(),
        ]);
        assert!(matches!(
            Model::new(out_of_order),
            Err(TransportError::Schedule(ScheduleError::OutOfOrder { .. }))
        ));
    }

    #[test]
    fn rejects_non_positive_final_time() {
        let mut model = Model::new(config()).unwrap();

        assert!(matches!(
            model.run(hours(0.0)),
            Err(TransportError::InvalidFinalTime { .. })
        ));
        assert!(model.times().is_empty());
    }

    #[test]
    fn samples_each_interval_on_an_even_grid() {
        let mut model = Model::new(
            config().with_irradiation(Irradiation::new(hours(2.0), hours(4.0)).unwrap()),
        )
        .unwrap();
        model.run(hours(10.0)).unwrap();

        // Three intervals of 20 samples, sharing two boundary samples.
        assert_eq!(model.times().len(), 58);
        assert_eq!(model.concentrations().len(), 58);
        assert_eq!(model.times()[0], Time::ZERO);
        assert_relative_eq!(model.times()[19].get::<hour>(), 2.0, max_relative = 1e-12);
        assert_relative_eq!(model.times()[38].get::<hour>(), 4.0, max_relative = 1e-12);
        assert_relative_eq!(model.times()[57].get::<hour>(), 10.0, max_relative = 1e-12);

        for pair in model.times().windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn no_irradiation_keeps_the_salt_clean() {
        let mut model = Model::new(config()).unwrap();
        model.run(hours(5.0)).unwrap();

        assert_eq!(model.times().len(), 20);
        assert!(model.concentrations().iter().all(|c| c.value == 0.0));
        assert!(model.integrated_release_wall().iter().all(|r| *r == 0.0));
    }
}
