//! Concentration calculator
//!
//! Concentration of a known mass dissolved in a known volume.

use serde::Serialize;

use super::equivalents::Equivalents;
use super::units::{MassUnit, MolarUnit, Quantity, VolumeUnit};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConcentrationResult {
    pub mg_per_ml: f64,
    pub ug_per_ml: f64,
    pub percent_wv: f64,
    /// mol/L, only when a molecular weight was given
    pub molarity: Option<f64>,
    /// Molarity in other units (empty without a molecular weight)
    pub equivalents: Vec<Quantity<MolarUnit>>,
}

pub fn calculate_concentration(
    mass: Quantity<MassUnit>,
    volume: Quantity<VolumeUnit>,
    molecular_weight: Option<f64>,
) -> ConcentrationResult {
    let mass_g = mass.to_base();
    let mass_mg = mass_g * 1000.0;
    let volume_l = volume.to_base();
    let volume_ml = volume_l * 1000.0;

    let mg_per_ml = mass_mg / volume_ml;
    let ug_per_ml = mg_per_ml * 1000.0;
    let percent_wv = (mass_g / volume_ml) * 100.0;

    let molarity = molecular_weight.map(|mw| (mass_g / mw) / volume_l);

    let equivalents = match molarity {
        Some(m) => {
            let (mm, um, nm) = (m * 1000.0, m * 1e6, m * 1e9);
            Equivalents::new(MolarUnit::Molar)
                .push_if(Quantity::new(m, MolarUnit::Molar), m >= 0.001)
                .push_if(Quantity::new(mm, MolarUnit::Millimolar), mm >= 0.1)
                .push_if(Quantity::new(um, MolarUnit::Micromolar), um >= 1.0)
                .push_if(Quantity::new(nm, MolarUnit::Nanomolar), nm >= 1.0)
                .finish()
        }
        None => Vec::new(),
    };

    ConcentrationResult {
        mg_per_ml,
        ug_per_ml,
        percent_wv,
        molarity,
        equivalents,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_25mg_in_10ml() {
        let r = calculate_concentration(
            Quantity::new(25.0, MassUnit::Milligram),
            Quantity::new(10.0, VolumeUnit::Milliliter),
            None,
        );
        assert!((r.mg_per_ml - 2.5).abs() < 1e-9);
        assert!((r.ug_per_ml - 2500.0).abs() < 1e-6);
        assert!((r.percent_wv - 0.25).abs() < 1e-9);
        assert_eq!(r.molarity, None);
        assert!(r.equivalents.is_empty());
    }

    #[test]
    fn test_molarity_with_molecular_weight() {
        // 25 mg at 500 g/mol in 10 mL = 5 mM
        let r = calculate_concentration(
            Quantity::new(25.0, MassUnit::Milligram),
            Quantity::new(10.0, VolumeUnit::Milliliter),
            Some(500.0),
        );
        let m = r.molarity.unwrap();
        assert!((m - 0.005).abs() < 1e-12);

        let units: Vec<_> = r.equivalents.iter().map(|q| q.unit).collect();
        assert_eq!(
            units,
            vec![MolarUnit::Millimolar, MolarUnit::Micromolar, MolarUnit::Nanomolar]
        );
        assert!((r.equivalents[0].value - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_dilute_molarity_skips_small_units() {
        // 1 ng at 1000 g/mol in 1 L is 1 pM, below every threshold
        let r = calculate_concentration(
            Quantity::new(1.0, MassUnit::Nanogram),
            Quantity::new(1.0, VolumeUnit::Liter),
            Some(1000.0),
        );
        assert!(r.equivalents.is_empty());
    }
}
