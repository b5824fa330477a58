//! Equivalent-unit formatting
//!
//! Picks the alternate unit representations of a result that are worth
//! showing, and renders values at a chosen precision.

use super::units::{Quantity, Unit, VolumeUnit};

/// Default number of decimal places for displayed values
pub const DEFAULT_PRECISION: usize = 2;
/// Largest precision a caller can request
pub const MAX_PRECISION: usize = 6;

/// Collects alternate representations of a primary result.
///
/// Candidates are kept in insertion order. Hidden candidates and any
/// candidate in the primary unit are dropped.
#[derive(Debug)]
pub struct Equivalents<U> {
    primary: U,
    items: Vec<Quantity<U>>,
}

impl<U: Unit> Equivalents<U> {
    pub fn new(primary: U) -> Self {
        Self {
            primary,
            items: Vec::new(),
        }
    }

    /// Add `quantity` when it clears its display threshold
    pub fn push_if(mut self, quantity: Quantity<U>, visible: bool) -> Self {
        if visible && quantity.unit != self.primary {
            self.items.push(quantity);
        }
        self
    }

    pub fn finish(self) -> Vec<Quantity<U>> {
        self.items
    }
}

/// Largest volume unit that keeps the value readable: L from 1 mL up,
/// mL from 0.1 mL up, µL below that.
pub fn best_volume_unit(liters: f64) -> VolumeUnit {
    if liters >= 0.001 {
        VolumeUnit::Liter
    } else if liters * 1000.0 >= 0.1 {
        VolumeUnit::Milliliter
    } else {
        VolumeUnit::Microliter
    }
}

/// Render a value with a fixed number of decimals (clamped to 0..=6)
pub fn format_value(value: f64, precision: usize) -> String {
    format!("{:.*}", precision.min(MAX_PRECISION), value)
}

/// Render a quantity as "<value> <symbol>"
pub fn format_quantity<U: Unit>(quantity: &Quantity<U>, precision: usize) -> String {
    format!(
        "{} {}",
        format_value(quantity.value, precision),
        quantity.unit.symbol()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chemistry::units::MassUnit;

    #[test]
    fn test_primary_unit_is_dropped() {
        let eq = Equivalents::new(MassUnit::Gram)
            .push_if(Quantity::new(2.0, MassUnit::Gram), true)
            .push_if(Quantity::new(2000.0, MassUnit::Milligram), true)
            .finish();
        assert_eq!(eq, vec![Quantity::new(2000.0, MassUnit::Milligram)]);
    }

    #[test]
    fn test_hidden_candidates_are_dropped() {
        let eq = Equivalents::new(MassUnit::Milligram)
            .push_if(Quantity::new(0.0001, MassUnit::Gram), false)
            .push_if(Quantity::new(100.0, MassUnit::Microgram), true)
            .finish();
        assert_eq!(eq.len(), 1);
        assert_eq!(eq[0].unit, MassUnit::Microgram);
    }

    #[test]
    fn test_best_volume_unit() {
        assert_eq!(best_volume_unit(0.25), VolumeUnit::Liter);
        assert_eq!(best_volume_unit(0.001), VolumeUnit::Liter);
        assert_eq!(best_volume_unit(0.0005), VolumeUnit::Milliliter);
        assert_eq!(best_volume_unit(0.00005), VolumeUnit::Microliter);
    }

    #[test]
    fn test_format_value_clamps_precision() {
        assert_eq!(format_value(0.123456789, 2), "0.12");
        assert_eq!(format_value(0.123456789, 0), "0");
        assert_eq!(format_value(0.123456789, 12), "0.123457");
    }

    #[test]
    fn test_format_quantity() {
        let q = Quantity::new(500.0, VolumeUnit::Microliter);
        assert_eq!(format_quantity(&q, 1), "500.0 µL");
    }
}
