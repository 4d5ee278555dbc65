//! Material definitions for neutron transport calculations.
//!
//! Every material is built on demand by a factory function; there is no
//! shared registry. Compositions follow the PNNL Materials Compendium
//! (PNNL-15870 Rev. 2) unless noted otherwise.

mod density;

use uom::si::{
    f64::{MassDensity, Pressure, ThermodynamicTemperature},
    mass_density::gram_per_cubic_centimeter,
    pressure::pascal,
    thermodynamic_temperature::{degree_celsius, kelvin},
};

use libra_core::units::joules_per_kilogram_kelvin;

pub use density::cllif_density;

/// LiCl mole fraction of the natural ClLiF salt.
pub const CLLIF_LICL_FRACTION: f64 = 0.695;

/// How a constituent's fraction is expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PercentType {
    #[cfg_attr(feature = "serde", serde(rename = "ao"))]
    Atom,
    #[cfg_attr(feature = "serde", serde(rename = "wo"))]
    Weight,
}

/// A natural element or a single nuclide.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Species {
    Element(String),
    Nuclide(String),
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Constituent {
    pub species: Species,
    pub fraction: f64,
    pub percent_type: PercentType,
}

/// A named material with an optional density and its constituents.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Material {
    pub name: String,
    pub density: Option<MassDensity>,
    pub constituents: Vec<Constituent>,
}

impl Material {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            density: None,
            constituents: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_density(self, density: MassDensity) -> Self {
        Self {
            density: Some(density),
            ..self
        }
    }

    #[must_use]
    pub fn with_element(self, symbol: &str, fraction: f64, percent_type: PercentType) -> Self {
        self.with(Species::Element(symbol.to_string()), fraction, percent_type)
    }

    #[must_use]
    pub fn with_nuclide(self, name: &str, fraction: f64, percent_type: PercentType) -> Self {
        self.with(Species::Nuclide(name.to_string()), fraction, percent_type)
    }

    /// Sum of the constituent fractions.
    #[must_use]
    pub fn total_fraction(&self) -> f64 {
        self.constituents.iter().map(|c| c.fraction).sum()
    }

    fn with(mut self, species: Species, fraction: f64, percent_type: PercentType) -> Self {
        self.constituents.push(Constituent {
            species,
            fraction,
            percent_type,
        });
        self
    }

    fn with_elements(self, elements: &[(&str, f64)], percent_type: PercentType) -> Self {
        elements.iter().fold(self, |material, &(symbol, fraction)| {
            material.with_element(symbol, fraction, percent_type)
        })
    }
}

fn g_per_cc(value: f64) -> MassDensity {
    MassDensity::new::<gram_per_cubic_centimeter>(value)
}

#[must_use]
pub fn inconel625() -> Material {
    Material::new("Inconel 625")
        .with_density(g_per_cc(8.44))
        .with_elements(
            &[
                ("C", 0.000_990),
                ("Al", 0.003_960),
                ("Si", 0.004_950),
                ("P", 0.000_148),
                ("S", 0.000_148),
                ("Ti", 0.003_960),
                ("Cr", 0.215_000),
                ("Mn", 0.004_950),
                ("Fe", 0.049_495),
                ("Co", 0.009_899),
                ("Ni", 0.580_000),
                ("Nb", 0.036_500),
                ("Mo", 0.090_000),
            ],
            PercentType::Weight,
        )
}

#[must_use]
pub fn ss304() -> Material {
    Material::new("Stainless Steel 304")
        .with_density(g_per_cc(8.00))
        .with_elements(
            &[
                ("C", 0.000_800),
                ("Mn", 0.020_000),
                ("P", 0.000_450),
                ("S", 0.000_300),
                ("Si", 0.010_000),
                ("Cr", 0.190_000),
                ("Ni", 0.095_000),
                ("Fe", 0.683_450),
            ],
            PercentType::Weight,
        )
}

/// Microporous silica board: 1 % Al2O3, 27 % ZrO2 and 72 % SiO2 by atom.
#[must_use]
pub fn firebrick() -> Material {
    Material::new("Firebrick")
        .with_density(g_per_cc(0.30))
        .with_elements(
            &[("Al", 0.004), ("O", 0.666), ("Si", 0.240), ("Zr", 0.090)],
            PercentType::Atom,
        )
}

#[must_use]
pub fn alumina() -> Material {
    Material::new("Alumina insulation")
        .with_density(g_per_cc(3.98))
        .with_elements(&[("O", 0.6), ("Al", 0.4)], PercentType::Atom)
}

#[must_use]
pub fn air() -> Material {
    Material::new("Air")
        .with_density(g_per_cc(0.0012))
        .with_elements(
            &[
                ("C", 0.000_123_99),
                ("N", 0.755_27),
                ("O", 0.231_78),
                ("Ar", 0.012_827),
            ],
            PercentType::Weight,
        )
}

#[must_use]
pub fn epoxy() -> Material {
    Material::new("Epoxy")
        .with_density(g_per_cc(1.2))
        .with_elements(
            &[("C", 0.70), ("H", 0.08), ("O", 0.15), ("N", 0.07)],
            PercentType::Weight,
        )
}

/// Helium at 5 psig and 300 K, as an ideal gas.
#[must_use]
pub fn helium() -> Material {
    let pressure = Pressure::new::<pascal>(34_473.8);
    let temperature = ThermodynamicTemperature::new::<kelvin>(300.0);
    let density: MassDensity = pressure / (joules_per_kilogram_kelvin(2077.0) * temperature);

    Material::new("Helium")
        .with_density(density)
        .with_element("He", 1.0, PercentType::Atom)
}

#[must_use]
pub fn pbli() -> Material {
    Material::new("pbli")
        .with_density(g_per_cc(11.0))
        .with_elements(&[("Pb", 84.2), ("Li", 15.2)], PercentType::Atom)
}

#[must_use]
pub fn flibe() -> Material {
    Material::new("flibe")
        .with_density(g_per_cc(1.94))
        .with_elements(&[("Li", 2.0), ("Be", 1.0), ("F", 4.0)], PercentType::Atom)
}

/// Natural LiCl–LiF at the default LiCl fraction, with its density at 650 °C.
#[must_use]
pub fn cllif_natural() -> Material {
    let x = CLLIF_LICL_FRACTION;
    Material::new("ClLiF natural")
        .with_density(cllif_density(
            ThermodynamicTemperature::new::<degree_celsius>(650.0),
            x,
        ))
        .with_elements(
            &[("F", 0.5 * (1.0 - x)), ("Li", 1.0), ("Cl", 0.5 * x)],
            PercentType::Atom,
        )
}

/// ClLiF spiked with EuF3. No density is tabulated.
#[must_use]
pub fn spicy_clif() -> Material {
    Material::new("spicyclif").with_elements(
        &[
            ("F", 0.159_35),
            ("Li", 0.178_57),
            ("Cl", 0.634_0),
            ("Eu", 0.027_9),
        ],
        PercentType::Weight,
    )
}

#[must_use]
pub fn flinak() -> Material {
    Material::new("flinak")
        .with_density(g_per_cc(2.020))
        .with_elements(
            &[("F", 50.0), ("Li", 23.25), ("Na", 5.75), ("K", 21.0)],
            PercentType::Atom,
        )
}

/// Common silica brick.
#[must_use]
pub fn brick() -> Material {
    Material::new("Brick")
        .with_density(g_per_cc(1.8))
        .with_elements(
            &[
                ("O", 0.663_427),
                ("Al", 0.003_747),
                ("Si", 0.323_229),
                ("Ca", 0.007_063),
                ("Fe", 0.002_534),
            ],
            PercentType::Atom,
        )
}

/// Earth, U.S. average.
#[must_use]
pub fn soil() -> Material {
    Material::new("Soil")
        .with_density(g_per_cc(1.52))
        .with_elements(
            &[
                ("O", 0.670_604),
                ("Na", 0.005_578),
                ("Mg", 0.011_432),
                ("Al", 0.053_073),
                ("Si", 0.201_665),
                ("K", 0.007_653),
                ("Ca", 0.026_664),
                ("Ti", 0.002_009),
                ("Mn", 0.000_272),
                ("Fe", 0.021_050),
            ],
            PercentType::Atom,
        )
}

/// Regular concrete for facility walls, foundation and floors, by nuclide.
#[must_use]
pub fn concrete() -> Material {
    const NUCLIDES: [(&str, f64); 27] = [
        ("Fe54", 2.0138e-05),
        ("Fe56", 0.000_318_74),
        ("Fe57", 7.2915e-06),
        ("Fe58", 1.0416e-06),
        ("H1", 0.013_74),
        ("H2", 2.0613e-06),
        ("O16", 0.045_685),
        ("O17", 1.8318e-05),
        ("Mg24", 9.0027e-05),
        ("Mg25", 1.1397e-05),
        ("Mg26", 1.2548e-05),
        ("Ca40", 0.001_474),
        ("Ca42", 9.8378e-06),
        ("Ca43", 2.0527e-06),
        ("Ca44", 3.1718e-05),
        ("Ca46", 6.0821e-08),
        ("Ca48", 2.8434e-06),
        ("Si28", 0.015_328),
        ("Si29", 0.000_776_13),
        ("Si30", 0.000_515_2),
        ("Na23", 0.000_963_95),
        ("K39", 0.000_429_49),
        ("K40", 4.6053e-08),
        ("K41", 3.0993e-05),
        ("Al27", 0.001_745_3),
        ("C12", 0.000_114_04),
        ("C13", 1.28e-06),
    ];

    NUCLIDES.iter().fold(
        Material::new("Concrete (Regular)").with_density(g_per_cc(2.3)),
        |material, &(name, fraction)| material.with_nuclide(name, fraction, PercentType::Atom),
    )
}

/// Every predefined material.
#[must_use]
pub fn all() -> Vec<Material> {
    vec![
        inconel625(),
        ss304(),
        firebrick(),
        alumina(),
        air(),
        epoxy(),
        helium(),
        pbli(),
        flibe(),
        cllif_natural(),
        spicy_clif(),
        flinak(),
        brick(),
        soil(),
        concrete(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    #[test]
    fn helium_follows_the_ideal_gas_law() {
        let density = helium().density.unwrap();
        assert_relative_eq!(
            density.get::<gram_per_cubic_centimeter>(),
            34_473.8 / (2077.0 * 300.0) / 1000.0,
            max_relative = 1e-12
        );
    }

    #[test]
    fn cllif_uses_the_correlation_at_650_celsius() {
        let material = cllif_natural();

        assert_relative_eq!(
            material.density.unwrap().get::<gram_per_cubic_centimeter>(),
            1.539_797_58,
            max_relative = 1e-8
        );
        assert_relative_eq!(material.total_fraction(), 1.5, max_relative = 1e-12);
    }

    #[test]
    fn weight_fractions_of_alloys_sum_to_one() {
        for material in [inconel625(), ss304(), air(), epoxy()] {
            assert_relative_eq!(material.total_fraction(), 1.0, max_relative = 1e-3);
            assert!(
                material
                    .constituents
                    .iter()
                    .all(|c| c.percent_type == PercentType::Weight)
            );
        }
    }

    #[test]
    fn concrete_is_defined_by_nuclide() {
        let concrete = concrete();

        assert_eq!(concrete.constituents.len(), 27);
        assert!(
            concrete
                .constituents
                .iter()
                .all(|c| matches!(c.species, Species::Nuclide(_)))
        );
    }

    #[test]
    fn every_material_has_a_unique_name() {
        let materials = all();
        let mut names: Vec<&str> = materials.iter().map(|m| m.name.as_str()).collect();
        names.sort_unstable();
        names.dedup();

        assert_eq!(names.len(), 15);
        assert!(spicy_clif().density.is_none());
    }
}
