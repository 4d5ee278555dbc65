use std::f64::consts::PI;

use libra_core::constraint::{Constrained, ConstraintError, StrictlyPositive};
use uom::si::{
    f64::{Area, Length, Volume},
    length::inch,
};

/// Thickness of the crucible wall, added to the radius for the wall area.
#[must_use]
pub fn wall_thickness() -> Length {
    Length::new::<inch>(0.06)
}

/// A vertical cylinder of salt.
///
/// Areas and volume are derived from `radius` and `height` on every call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geometry {
    radius: Constrained<Length, StrictlyPositive>,
    height: Constrained<Length, StrictlyPositive>,
}

impl Geometry {
    /// Creates a cylinder from its radius and height.
    ///
    /// # Errors
    ///
    /// Returns a [`ConstraintError`] if either length is not strictly positive.
    pub fn new(radius: Length, height: Length) -> Result<Self, ConstraintError> {
        Ok(Self::from_constrained(
            Constrained::new(radius)?,
            Constrained::new(height)?,
        ))
    }

    /// Creates a cylinder from already validated lengths.
    #[must_use]
    pub fn from_constrained(
        radius: Constrained<Length, StrictlyPositive>,
        height: Constrained<Length, StrictlyPositive>,
    ) -> Self {
        Self { radius, height }
    }

    #[must_use]
    pub fn radius(&self) -> Length {
        self.radius.into_inner()
    }

    #[must_use]
    pub fn height(&self) -> Length {
        self.height.into_inner()
    }

    /// Free surface area of the salt, `π·r²`.
    #[must_use]
    pub fn top_area(&self) -> Area {
        let radius = self.radius();
        PI * radius * radius
    }

    /// Salt volume, `top_area·h`.
    #[must_use]
    pub fn volume(&self) -> Volume {
        self.top_area() * self.height()
    }

    /// Wetted wall area: the outer lateral surface plus the bottom.
    #[must_use]
    pub fn wall_area(&self) -> Area {
        let perimeter = 2.0 * PI * (self.radius() + wall_thickness());
        perimeter * self.height() + self.top_area()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use uom::si::{area::square_meter, length::meter, volume::cubic_meter};

    #[test]
    fn derived_quantities_of_a_unit_cylinder() {
        let geometry = Geometry::new(Length::new::<meter>(1.0), Length::new::<meter>(2.0)).unwrap();

        assert_relative_eq!(geometry.top_area().get::<square_meter>(), PI);
        assert_relative_eq!(geometry.volume().get::<cubic_meter>(), 2.0 * PI);

        let thickness = wall_thickness().get::<meter>();
        assert_relative_eq!(thickness, 0.001_524, max_relative = 1e-12);
        assert_relative_eq!(
            geometry.wall_area().get::<square_meter>(),
            2.0 * PI * (1.0 + thickness) * 2.0 + PI,
            max_relative = 1e-12
        );
    }

    #[test]
    fn rejects_degenerate_cylinders() {
        let one = Length::new::<meter>(1.0);
        let zero = Length::new::<meter>(0.0);

        assert_eq!(Geometry::new(zero, one), Err(ConstraintError::Zero));
        assert_eq!(Geometry::new(one, -one), Err(ConstraintError::Negative));
    }
}
