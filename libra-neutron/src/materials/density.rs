use uom::si::{
    f64::{MassDensity, ThermodynamicTemperature},
    mass_density::gram_per_cubic_centimeter,
    thermodynamic_temperature::kelvin,
};

/// Density of molten LiCl–LiF from the Janz (1979) correlation.
///
/// `licl_fraction` is the LiCl mole fraction. The correlation is fitted
/// between 660 °C and 1000 °C.
///
/// G. J. Janz, R. P. T. Tomkins, C. B. Allen, "Molten Salts: Volume 4, Part 4",
/// J. Phys. Chem. Ref. Data 8 (1979) 125–302.
#[must_use]
pub fn cllif_density(temperature: ThermodynamicTemperature, licl_fraction: f64) -> MassDensity {
    const A: f64 = 2.256_21;
    const B: f64 = -8.204_75e-3;
    const C: f64 = -4.092_35e-4;
    const D: f64 = 6.372_50e-5;
    const E: f64 = -2.528_46e-7;
    const F: f64 = 8.735_70e-9;
    const G: f64 = -5.111_84e-10;

    let t = temperature.get::<kelvin>();
    let x = licl_fraction * 100.0;

    let rho = A + B * x + C * t + D * x.powi(2) + E * x.powi(3) + F * t * x.powi(2) + G * x * t.powi(2);
    MassDensity::new::<gram_per_cubic_centimeter>(rho)
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use uom::si::thermodynamic_temperature::degree_celsius;

    #[test]
    fn matches_reference_values() {
        let at_650 = cllif_density(ThermodynamicTemperature::new::<degree_celsius>(650.0), 0.695);
        assert_relative_eq!(
            at_650.get::<gram_per_cubic_centimeter>(),
            1.539_797_58,
            max_relative = 1e-8
        );

        let at_800 = cllif_density(ThermodynamicTemperature::new::<degree_celsius>(800.0), 0.5);
        assert_relative_eq!(
            at_800.get::<gram_per_cubic_centimeter>(),
            1.528_510_22,
            max_relative = 1e-8
        );
    }

    #[test]
    fn density_falls_with_temperature() {
        let cold = cllif_density(ThermodynamicTemperature::new::<degree_celsius>(700.0), 0.695);
        let hot = cllif_density(ThermodynamicTemperature::new::<degree_celsius>(900.0), 0.695);
        assert!(hot < cold);
    }
}
