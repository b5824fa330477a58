//! Antibiotic stock preparation
//!
//! Dilution of a concentrated antibiotic stock into culture medium, with
//! common working concentrations built in.

use serde::Serialize;

use super::dilution::{calculate_dilution, DilutionResult};
use super::error::CalcResult;
use super::units::{MassConcentrationUnit, Quantity, Unit, VolumeUnit};

/// A commonly used antibiotic with its usual stock and working concentrations
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AntibioticPreset {
    pub name: &'static str,
    /// Stock concentration in mg/mL
    pub stock_mg_per_ml: f64,
    /// Working concentration in µg/mL
    pub working_ug_per_ml: f64,
}

impl AntibioticPreset {
    pub fn stock(&self) -> Quantity<MassConcentrationUnit> {
        Quantity::new(self.stock_mg_per_ml, MassConcentrationUnit::MgPerMl)
    }

    pub fn working(&self) -> Quantity<MassConcentrationUnit> {
        Quantity::new(self.working_ug_per_ml, MassConcentrationUnit::UgPerMl)
    }
}

pub const ANTIBIOTIC_PRESETS: [AntibioticPreset; 5] = [
    AntibioticPreset {
        name: "Ampicillin",
        stock_mg_per_ml: 100.0,
        working_ug_per_ml: 100.0,
    },
    AntibioticPreset {
        name: "Kanamycin",
        stock_mg_per_ml: 50.0,
        working_ug_per_ml: 50.0,
    },
    AntibioticPreset {
        name: "Chloramphenicol",
        stock_mg_per_ml: 34.0,
        working_ug_per_ml: 25.0,
    },
    AntibioticPreset {
        name: "Carbenicillin",
        stock_mg_per_ml: 100.0,
        working_ug_per_ml: 100.0,
    },
    AntibioticPreset {
        name: "Tetracycline",
        stock_mg_per_ml: 10.0,
        working_ug_per_ml: 10.0,
    },
];

/// Look up a built-in antibiotic by name (case-insensitive)
pub fn find_antibiotic(name: &str) -> Option<&'static AntibioticPreset> {
    let name = name.trim();
    ANTIBIOTIC_PRESETS
        .iter()
        .find(|p| p.name.eq_ignore_ascii_case(name))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AntibioticPrepResult {
    #[serde(flatten)]
    pub dilution: DilutionResult,
    /// Stock needed for a single plate, when a plate volume was given
    pub stock_per_plate: Option<Quantity<VolumeUnit>>,
}

/// Stock volume to add to `final_volume` of medium, plus the per-plate share
/// when `plate_volume` is given.
pub fn calculate_antibiotic_prep(
    stock: Quantity<MassConcentrationUnit>,
    working: Quantity<MassConcentrationUnit>,
    final_volume: Quantity<VolumeUnit>,
    plate_volume: Option<Quantity<VolumeUnit>>,
) -> CalcResult<AntibioticPrepResult> {
    let dilution = calculate_dilution(
        Quantity::new(stock.value, stock.unit.into()),
        Quantity::new(working.value, working.unit.into()),
        final_volume,
        None,
    )?;

    let stock_per_plate = plate_volume.map(|plate| {
        let ratio = working.to_base() / stock.to_base();
        Quantity::new((plate.value * ratio).max(0.0), plate.unit)
    });

    Ok(AntibioticPrepResult {
        dilution,
        stock_per_plate,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_antibiotic() {
        assert_eq!(find_antibiotic("kanamycin").map(|p| p.stock_mg_per_ml), Some(50.0));
        assert_eq!(find_antibiotic(" Ampicillin ").map(|p| p.working_ug_per_ml), Some(100.0));
        assert!(find_antibiotic("Custom").is_none());
    }

    #[test]
    fn test_ampicillin_one_liter() {
        // 100 mg/mL stock to 100 µg/mL in 1 L -> 1 mL stock
        let amp = find_antibiotic("Ampicillin").unwrap();
        let r = calculate_antibiotic_prep(
            amp.stock(),
            amp.working(),
            Quantity::new(1.0, VolumeUnit::Liter),
            None,
        )
        .unwrap();
        assert!(r.dilution.is_valid);
        assert_eq!(r.dilution.volume_unit, VolumeUnit::Liter);
        assert!((r.dilution.stock_volume.value - 0.001).abs() < 1e-12);
        assert!((r.dilution.diluent_volume.value - 0.999).abs() < 1e-12);
        assert!(r.stock_per_plate.is_none());
    }

    #[test]
    fn test_stock_per_plate() {
        // Chloramphenicol 34 mg/mL -> 25 µg/mL, 20 mL plates
        let cam = find_antibiotic("Chloramphenicol").unwrap();
        let r = calculate_antibiotic_prep(
            cam.stock(),
            cam.working(),
            Quantity::new(500.0, VolumeUnit::Milliliter),
            Some(Quantity::new(20.0, VolumeUnit::Milliliter)),
        )
        .unwrap();
        let per_plate = r.stock_per_plate.unwrap();
        assert_eq!(per_plate.unit, VolumeUnit::Milliliter);
        assert!((per_plate.value - 20.0 * 0.025 / 34.0).abs() < 1e-12);
    }
}
