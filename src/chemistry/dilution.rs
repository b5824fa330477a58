//! Dilution calculator (C1V1 = C2V2)
//!
//! Stock and diluent volumes needed to reach a final concentration.

use serde::Serialize;

use super::error::CalcResult;
use super::normalize::{normalize_concentrations, ConcentrationBasis};
use super::units::{ConcentrationUnit, Quantity, VolumeUnit};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DilutionResult {
    pub stock_volume: Quantity<VolumeUnit>,
    pub diluent_volume: Quantity<VolumeUnit>,
    pub volume_unit: VolumeUnit,
    /// False when the final concentration is not below the stock
    pub is_valid: bool,
    pub basis: ConcentrationBasis,
}

/// Solve C1V1 = C2V2 for V1, returning volumes in the final volume's unit.
///
/// Both volumes are clamped at zero. A final concentration at or above the
/// stock still produces numbers, but with `is_valid` unset.
pub fn calculate_dilution(
    stock: Quantity<ConcentrationUnit>,
    final_conc: Quantity<ConcentrationUnit>,
    final_volume: Quantity<VolumeUnit>,
    molecular_weight: Option<f64>,
) -> CalcResult<DilutionResult> {
    let normalized = normalize_concentrations(stock, final_conc, molecular_weight)?;

    let final_volume_l = final_volume.to_base();
    let stock_volume_l = (normalized.final_converted * final_volume_l) / normalized.stock_converted;
    let diluent_volume_l = final_volume_l - stock_volume_l;

    let unit = final_volume.unit;
    let stock_volume = Quantity::from_base(stock_volume_l, unit);
    let diluent_volume = Quantity::from_base(diluent_volume_l, unit);

    let is_valid = normalized.final_converted < normalized.stock_converted;
    if !is_valid {
        tracing::warn!(
            "Final concentration {} {} is not below stock {} {}",
            final_conc.value,
            final_conc.unit,
            stock.value,
            stock.unit
        );
    }

    Ok(DilutionResult {
        stock_volume: Quantity::new(stock_volume.value.max(0.0), unit),
        diluent_volume: Quantity::new(diluent_volume.value.max(0.0), unit),
        volume_unit: unit,
        is_valid,
        basis: normalized.basis,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chemistry::error::CalcError;
    use crate::chemistry::units::{MassConcentrationUnit, MolarUnit};
    use proptest::prelude::*;

    fn conc(value: f64, unit: impl Into<ConcentrationUnit>) -> Quantity<ConcentrationUnit> {
        Quantity::new(value, unit.into())
    }

    #[test]
    fn test_mg_ml_to_ug_ml() {
        let r = calculate_dilution(
            conc(10.0, MassConcentrationUnit::MgPerMl),
            conc(100.0, MassConcentrationUnit::UgPerMl),
            Quantity::new(50.0, VolumeUnit::Milliliter),
            None,
        )
        .unwrap();
        assert!(r.is_valid);
        assert_eq!(r.volume_unit, VolumeUnit::Milliliter);
        assert!((r.stock_volume.value - 0.5).abs() < 1e-9);
        assert!((r.diluent_volume.value - 49.5).abs() < 1e-9);
    }

    #[test]
    fn test_molar_round_trip() {
        let (c1, c2, v2) = (5.0, 0.2, 2.0);
        let r = calculate_dilution(
            conc(c1, MolarUnit::Molar),
            conc(c2, MolarUnit::Molar),
            Quantity::new(v2, VolumeUnit::Liter),
            None,
        )
        .unwrap();
        assert!(r.is_valid);
        assert!((r.stock_volume.value * c1 - v2 * c2).abs() < 1e-12);
        assert!((r.stock_volume.value + r.diluent_volume.value - v2).abs() < 1e-12);
    }

    #[test]
    fn test_concentrating_is_flagged_and_clamped() {
        let r = calculate_dilution(
            conc(1.0, MolarUnit::Millimolar),
            conc(10.0, MolarUnit::Millimolar),
            Quantity::new(100.0, VolumeUnit::Microliter),
            None,
        )
        .unwrap();
        assert!(!r.is_valid);
        assert!((r.stock_volume.value - 1000.0).abs() < 1e-6);
        assert_eq!(r.diluent_volume.value, 0.0);
    }

    #[test]
    fn test_equal_concentrations_are_not_a_dilution() {
        let r = calculate_dilution(
            conc(2.0, ConcentrationUnit::PercentWv),
            conc(2.0, ConcentrationUnit::PercentWv),
            Quantity::new(10.0, VolumeUnit::Milliliter),
            None,
        )
        .unwrap();
        assert!(!r.is_valid);
        assert_eq!(r.diluent_volume.value, 0.0);
    }

    #[test]
    fn test_mixed_families_without_molecular_weight() {
        let err = calculate_dilution(
            conc(1.0, MolarUnit::Molar),
            conc(1.0, MassConcentrationUnit::MgPerMl),
            Quantity::new(10.0, VolumeUnit::Milliliter),
            None,
        )
        .unwrap_err();
        assert_eq!(
            err,
            CalcError::IncompatibleConcentrationUnits {
                stock: ConcentrationUnit::Molar(MolarUnit::Molar),
                target: ConcentrationUnit::MassPerVolume(MassConcentrationUnit::MgPerMl),
            }
        );
    }

    proptest! {
        #[test]
        fn volumes_never_negative(
            c1 in 1e-6f64..1e6,
            c2 in 1e-6f64..1e6,
            v2 in 1e-6f64..1e3,
        ) {
            let r = calculate_dilution(
                conc(c1, MolarUnit::Molar),
                conc(c2, MolarUnit::Molar),
                Quantity::new(v2, VolumeUnit::Milliliter),
                None,
            ).unwrap();
            prop_assert!(r.stock_volume.value >= 0.0);
            prop_assert!(r.diluent_volume.value >= 0.0);
            prop_assert_eq!(r.is_valid, c2 < c1);
        }
    }
}
