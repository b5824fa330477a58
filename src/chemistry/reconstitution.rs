//! Reconstitution calculator
//!
//! Solvent volume needed to dissolve a powder to a target concentration.

use serde::Serialize;

use super::equivalents::{best_volume_unit, Equivalents};
use super::error::{CalcError, CalcResult};
use super::units::{
    ConcentrationUnit, MassUnit, Quantity, Unit, VolumeUnit, MG_ML_PER_PERCENT_WV,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconstitutionResult {
    /// Solvent volume in the largest readable unit
    pub solvent_volume: Quantity<VolumeUnit>,
    pub solvent_volume_liters: f64,
    pub equivalents: Vec<Quantity<VolumeUnit>>,
    pub is_molar: bool,
}

/// Solvent volume for `powder_mass` at `target` concentration.
///
/// A molar target needs the molecular weight; it is never defaulted.
pub fn calculate_reconstitution(
    powder_mass: Quantity<MassUnit>,
    target: Quantity<ConcentrationUnit>,
    molecular_weight: Option<f64>,
) -> CalcResult<ReconstitutionResult> {
    let mass_g = powder_mass.to_base();
    let is_molar = target.unit.is_molar();

    let solvent_volume_l = match target.unit {
        ConcentrationUnit::Molar(unit) => {
            let mw = molecular_weight.ok_or(CalcError::MissingField("molecular_weight"))?;
            let moles = mass_g / mw;
            moles / (target.value * unit.factor())
        }
        ConcentrationUnit::MassPerVolume(unit) => {
            solvent_liters_for(mass_g, target.value * unit.factor())
        }
        ConcentrationUnit::PercentWv => {
            solvent_liters_for(mass_g, target.value * MG_ML_PER_PERCENT_WV)
        }
    };

    let volume_ml = solvent_volume_l * 1000.0;
    let volume_ul = solvent_volume_l * 1e6;

    let primary = best_volume_unit(solvent_volume_l);
    let solvent_volume = match primary {
        VolumeUnit::Liter => Quantity::new(solvent_volume_l, primary),
        VolumeUnit::Milliliter => Quantity::new(volume_ml, primary),
        _ => Quantity::new(volume_ul, VolumeUnit::Microliter),
    };

    let equivalents = Equivalents::new(solvent_volume.unit)
        .push_if(
            Quantity::new(solvent_volume_l, VolumeUnit::Liter),
            solvent_volume_l >= 0.001,
        )
        .push_if(
            Quantity::new(volume_ml, VolumeUnit::Milliliter),
            volume_ml >= 0.1 && volume_ml != solvent_volume_l,
        )
        .push_if(
            Quantity::new(volume_ul, VolumeUnit::Microliter),
            volume_ul >= 1.0 && volume_ul != volume_ml,
        )
        .finish();

    Ok(ReconstitutionResult {
        solvent_volume,
        solvent_volume_liters: solvent_volume_l,
        equivalents,
        is_molar,
    })
}

/// mL = mg / (mg/mL), returned in liters
fn solvent_liters_for(mass_g: f64, conc_mg_per_ml: f64) -> f64 {
    let mass_mg = mass_g * 1000.0;
    (mass_mg / conc_mg_per_ml) / 1000.0
}
