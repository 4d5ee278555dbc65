use libra_core::{
    Component,
    solve::ode::{Integratable, State},
    units::{Concentration, ConcentrationRate, particles_per_cubic_meter},
};
use thiserror::Error;
use uom::si::{
    f64::{Frequency, Time, Velocity},
    frequency::hertz,
    time::second,
};

use super::Geometry;

/// Tritium mass balance in the salt.
///
/// `dc/dt = (S − A_wall·k_wall·c − A_top·k_top·c) / V`
///
/// The source rate `S` is part of the input so that a solver can hold it
/// constant over an interval where the generator state does not change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SaltBalance {
    geometry: Geometry,
    k_wall: Velocity,
    k_top: Velocity,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BalanceInput {
    pub time: Time,
    pub concentration: Concentration,
    pub source: Frequency,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BalanceOutput {
    pub loss_wall: Frequency,
    pub loss_top: Frequency,
    pub concentration_rate: ConcentrationRate,
}

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum BalanceError {
    #[error(
        "non-finite concentration rate at t = {time_s} s (concentration = {concentration} m^-3, source = {source_hz} s^-1)"
    )]
    NonFinite {
        time_s: f64,
        concentration: f64,
        source_hz: f64,
    },
}

impl SaltBalance {
    #[must_use]
    pub fn new(geometry: Geometry, k_wall: Velocity, k_top: Velocity) -> Self {
        Self {
            geometry,
            k_wall,
            k_top,
        }
    }

    #[must_use]
    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    #[must_use]
    pub fn k_wall(&self) -> Velocity {
        self.k_wall
    }

    #[must_use]
    pub fn k_top(&self) -> Velocity {
        self.k_top
    }

    /// Release rate through the crucible walls.
    #[must_use]
    pub fn loss_wall(&self, concentration: Concentration) -> Frequency {
        self.geometry.wall_area() * self.k_wall * concentration
    }

    /// Release rate through the free surface.
    #[must_use]
    pub fn loss_top(&self, concentration: Concentration) -> Frequency {
        self.geometry.top_area() * self.k_top * concentration
    }

    /// Rate of change of the concentration for a given source rate.
    #[must_use]
    pub fn rate(&self, source: Frequency, concentration: Concentration) -> ConcentrationRate {
        (source - self.loss_wall(concentration) - self.loss_top(concentration))
            / self.geometry.volume()
    }
}

impl Component for SaltBalance {
    type Input = BalanceInput;
    type Output = BalanceOutput;
    type Error = BalanceError;

    fn call(&self, input: Self::Input) -> Result<Self::Output, Self::Error> {
        let BalanceInput {
            time,
            concentration,
            source,
        } = input;

        let loss_wall = self.loss_wall(concentration);
        let loss_top = self.loss_top(concentration);
        let concentration_rate = (source - loss_wall - loss_top) / self.geometry.volume();

        if !concentration_rate.value.is_finite() {
            return Err(BalanceError::NonFinite {
                time_s: time.get::<second>(),
                concentration: concentration.value,
                source_hz: source.get::<hertz>(),
            });
        }

        Ok(BalanceOutput {
            loss_wall,
            loss_top,
            concentration_rate,
        })
    }
}

/// Time in seconds, concentration in particles per cubic meter.
impl Integratable<1> for SaltBalance {
    fn apply_state(initial_conditions: &Self::Input, state: State<1>) -> Self::Input {
        let State { x, y: [c] } = state;
        BalanceInput {
            time: Time::new::<second>(x),
            concentration: particles_per_cubic_meter(c),
            source: initial_conditions.source,
        }
    }

    fn extract_state(input: &Self::Input) -> State<1> {
        State::new(input.time.get::<second>(), [input.concentration.value])
    }

    fn extract_derivative(output: &Self::Output) -> [f64; 1] {
        [output.concentration_rate.value]
    }
}
