//! Conversions between a tritium inventory and its activity.

use libra_core::units::{AVOGADRO, Activity, MolarMass, SpecificActivity, becquerels};
use uom::si::{
    amount_of_substance::mole,
    f64::{AmountOfSubstance, Mass},
    frequency::hertz,
    mass::gram,
};

/// Specific activity of tritium, 3.57e14 Bq/g.
#[must_use]
pub fn specific_activity() -> SpecificActivity {
    becquerels(3.57e14) / Mass::new::<gram>(1.0)
}

/// Molar mass of tritium, 3.016 g/mol.
#[must_use]
pub fn molar_mass() -> MolarMass {
    Mass::new::<gram>(3.016) / AmountOfSubstance::new::<mole>(1.0)
}

/// Activity of `particles` tritium atoms.
#[must_use]
pub fn quantity_to_activity(particles: f64) -> Activity {
    AmountOfSubstance::new::<mole>(particles / AVOGADRO) * molar_mass() * specific_activity()
}

/// Number of tritium atoms with the given activity.
#[must_use]
pub fn activity_to_quantity(activity: Activity) -> f64 {
    let amount: AmountOfSubstance = activity / specific_activity() / molar_mass();
    amount.get::<mole>() * AVOGADRO
}

/// Activity of `particles` tritium atoms, in becquerels.
#[must_use]
pub fn quantity_to_becquerels(particles: f64) -> f64 {
    quantity_to_activity(particles).get::<hertz>()
}
