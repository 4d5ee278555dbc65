//! Quantities the toolbox needs that `uom` does not name.
//!
//! Particle counts are dimensionless, so a particle concentration is simply an
//! inverse volume and a particle rate is a [`Frequency`]. Values built here are
//! stored in SI base units like every other `uom` quantity.

use std::marker::PhantomData;

use uom::{
    si::{
        ISQ, Quantity, SI,
        f64::{Frequency, Time},
        frequency::hertz,
        ratio::ratio,
        time::hour,
    },
    typenum::{N1, N2, N3, P1, P2, Z0},
};

/// Avogadro constant, particles per mole.
pub const AVOGADRO: f64 = 6.022_140_76e23;

/// Number of particles per unit volume, 1/m³ in SI.
pub type Concentration = Quantity<ISQ<N3, Z0, Z0, Z0, Z0, Z0, Z0>, SI<f64>, f64>;

/// Rate of change of a particle concentration, 1/(m³·s) in SI.
pub type ConcentrationRate = Quantity<ISQ<N3, Z0, N1, Z0, Z0, Z0, Z0>, SI<f64>, f64>;

/// Radioactivity, Bq in SI (one decay per second).
pub type Activity = Frequency;

/// Activity per unit mass, Bq/kg in SI.
pub type SpecificActivity = Quantity<ISQ<Z0, N1, N1, Z0, Z0, Z0, Z0>, SI<f64>, f64>;

/// Mass per amount of substance, kg/mol in SI.
pub type MolarMass = Quantity<ISQ<Z0, P1, Z0, Z0, Z0, N1, Z0>, SI<f64>, f64>;

/// Specific gas constant, J/kg·K in SI.
pub type SpecificGasConstant = Quantity<ISQ<P2, Z0, N2, Z0, N1, Z0, Z0>, SI<f64>, f64>;

/// Creates a concentration from a value in particles per cubic meter.
#[must_use]
pub fn particles_per_cubic_meter(value: f64) -> Concentration {
    Concentration {
        dimension: PhantomData,
        units: PhantomData,
        value,
    }
}

/// Creates a concentration rate from a value in particles per cubic meter per second.
#[must_use]
pub fn particles_per_cubic_meter_second(value: f64) -> ConcentrationRate {
    ConcentrationRate {
        dimension: PhantomData,
        units: PhantomData,
        value,
    }
}

/// Creates a specific gas constant from a value in J/(kg·K).
#[must_use]
pub fn joules_per_kilogram_kelvin(value: f64) -> SpecificGasConstant {
    SpecificGasConstant {
        dimension: PhantomData,
        units: PhantomData,
        value,
    }
}

/// Creates a particle rate from a value in particles per second.
#[must_use]
pub fn particles_per_second(value: f64) -> Frequency {
    Frequency::new::<hertz>(value)
}

/// Creates an activity from a value in becquerels.
#[must_use]
pub fn becquerels(value: f64) -> Activity {
    Activity::new::<hertz>(value)
}

/// Returns the number of events a rate produces in one hour.
#[must_use]
pub fn per_hour(rate: Frequency) -> f64 {
    (rate * Time::new::<hour>(1.0)).get::<ratio>()
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use uom::si::{
        f64::{AmountOfSubstance, Length, Mass, Volume},
        amount_of_substance::mole,
        length::centimeter,
        mass::gram,
        volume::cubic_meter,
    };

    #[test]
    fn concentration_is_an_inverse_volume() {
        let c = particles_per_cubic_meter(2.0e12);
        let particles = (c * Volume::new::<cubic_meter>(0.5)).get::<ratio>();
        assert_relative_eq!(particles, 1.0e12);
    }

    #[test]
    fn concentration_times_velocity_times_area_is_a_rate() {
        let side = Length::new::<centimeter>(10.0);
        let k = Length::new::<centimeter>(1.0) / Time::new::<hour>(1.0);
        let flux: Frequency = side * side * k * particles_per_cubic_meter(3.6e9);
        assert_relative_eq!(flux.get::<hertz>(), 100.0, max_relative = 1e-12);
        assert_relative_eq!(per_hour(flux), 3.6e5, max_relative = 1e-12);
    }

    #[test]
    fn derived_tritium_constants() {
        let molar_mass: MolarMass = Mass::new::<gram>(3.016) / AmountOfSubstance::new::<mole>(1.0);
        let specific: SpecificActivity = becquerels(3.57e14) / Mass::new::<gram>(1.0);
        let per_mole = (specific * molar_mass * AmountOfSubstance::new::<mole>(1.0)).get::<hertz>();
        assert_relative_eq!(per_mole, 3.57e14 * 3.016, max_relative = 1e-12);
        assert_relative_eq!(particles_per_cubic_meter_second(4.0).value, 4.0);
    }

    #[test]
    fn ideal_gas_density_from_gas_constant() {
        use uom::si::{
            f64::{MassDensity, Pressure, ThermodynamicTemperature},
            mass_density::kilogram_per_cubic_meter,
            pressure::pascal,
            thermodynamic_temperature::kelvin,
        };

        let density: MassDensity = Pressure::new::<pascal>(2077.0 * 300.0)
            / (joules_per_kilogram_kelvin(2077.0) * ThermodynamicTemperature::new::<kelvin>(300.0));
        assert_relative_eq!(density.get::<kilogram_per_cubic_meter>(), 1.0, max_relative = 1e-12);
    }
}
