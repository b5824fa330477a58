//! Molarity calculator
//!
//! Mass of solute needed to make a solution of a given molarity and volume.

use serde::Serialize;

use super::equivalents::Equivalents;
use super::units::{MassUnit, MolarUnit, Quantity, VolumeUnit};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MolarityResult {
    /// Headline mass, in g when at least 1 g, otherwise mg
    pub mass: Quantity<MassUnit>,
    pub mass_grams: f64,
    pub equivalents: Vec<Quantity<MassUnit>>,
}

/// mass (g) = concentration (M) x volume (L) x molecular weight (g/mol)
pub fn calculate_molarity(
    molecular_weight: f64,
    concentration: Quantity<MolarUnit>,
    volume: Quantity<VolumeUnit>,
) -> MolarityResult {
    let mass_grams = concentration.to_base() * volume.to_base() * molecular_weight;

    let mass = if mass_grams >= 1.0 {
        Quantity::new(mass_grams, MassUnit::Gram)
    } else {
        Quantity::new(mass_grams * 1000.0, MassUnit::Milligram)
    };

    let mg = mass_grams * 1000.0;
    let ug = mass_grams * 1e6;
    let equivalents = Equivalents::new(mass.unit)
        .push_if(Quantity::new(mass_grams, MassUnit::Gram), mass_grams >= 1.0)
        .push_if(Quantity::new(mg, MassUnit::Milligram), mg >= 0.1)
        .push_if(Quantity::new(ug, MassUnit::Microgram), ug >= 0.1)
        .finish();

    MolarityResult {
        mass,
        mass_grams,
        equivalents,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_glucose_50mm_100ml() {
        let r = calculate_molarity(
            180.16,
            Quantity::new(50.0, MolarUnit::Millimolar),
            Quantity::new(100.0, VolumeUnit::Milliliter),
        );
        assert!((r.mass_grams - 0.9008).abs() < 1e-9);
        assert_eq!(r.mass.unit, MassUnit::Milligram);
        assert!((r.mass.value - 900.8).abs() < 1e-6);

        // mg is the headline, so only µg remains
        assert_eq!(r.equivalents.len(), 1);
        assert_eq!(r.equivalents[0].unit, MassUnit::Microgram);
        assert!((r.equivalents[0].value - 900_800.0).abs() < 1e-3);
    }

    #[test]
    fn test_gram_headline() {
        // 1 M NaCl, 1 L
        let r = calculate_molarity(
            58.44,
            Quantity::new(1.0, MolarUnit::Molar),
            Quantity::new(1.0, VolumeUnit::Liter),
        );
        assert_eq!(r.mass.unit, MassUnit::Gram);
        assert!((r.mass.value - 58.44).abs() < 1e-9);
        let units: Vec<_> = r.equivalents.iter().map(|q| q.unit).collect();
        assert_eq!(units, vec![MassUnit::Milligram, MassUnit::Microgram]);
    }

    #[test]
    fn test_tiny_mass_has_no_milligram_equivalent() {
        // 1 nM x 1 µL x 100 g/mol = 1e-13 g
        let r = calculate_molarity(
            100.0,
            Quantity::new(1.0, MolarUnit::Nanomolar),
            Quantity::new(1.0, VolumeUnit::Microliter),
        );
        assert_eq!(r.mass.unit, MassUnit::Milligram);
        assert!(r.equivalents.is_empty());
    }

    #[test]
    fn test_idempotent() {
        let run = || {
            calculate_molarity(
                342.3,
                Quantity::new(250.0, MolarUnit::Micromolar),
                Quantity::new(500.0, VolumeUnit::Milliliter),
            )
        };
        let a = run();
        let b = run();
        assert_eq!(a.mass_grams.to_bits(), b.mass_grams.to_bits());
        assert_eq!(a, b);
    }

    proptest! {
        #[test]
        fn mass_matches_c_v_mw(
            mw in 1.0f64..2000.0,
            conc in 1e-3f64..1e3,
            vol in 1e-3f64..1e3,
        ) {
            let r = calculate_molarity(
                mw,
                Quantity::new(conc, MolarUnit::Millimolar),
                Quantity::new(vol, VolumeUnit::Milliliter),
            );
            let expected = (conc * 1e-3) * (vol * 1e-3) * mw;
            prop_assert!(((r.mass_grams - expected) / expected).abs() < 1e-9);

            let headline_grams = r.mass.value * if r.mass.unit == MassUnit::Gram { 1.0 } else { 1e-3 };
            prop_assert!(((headline_grams - expected) / expected).abs() < 1e-9);
        }
    }
}
