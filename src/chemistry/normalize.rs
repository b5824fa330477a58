//! Concentration normalization
//!
//! Brings two concentrations onto a single comparable basis before they are
//! divided or compared.

use serde::Serialize;

use super::error::{CalcError, CalcResult};
use super::units::{ConcentrationUnit, Quantity, Unit, MG_ML_PER_PERCENT_WV};

/// Common unit two normalized concentrations are expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConcentrationBasis {
    /// mol/L
    Molar,
    /// mg/mL
    MgPerMl,
    /// % w/v, untouched
    PercentWv,
}

impl ConcentrationBasis {
    pub fn symbol(&self) -> &'static str {
        match self {
            ConcentrationBasis::Molar => "M",
            ConcentrationBasis::MgPerMl => "mg/mL",
            ConcentrationBasis::PercentWv => "% w/v",
        }
    }
}

/// Two concentrations expressed in the same unit
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NormalizedConcentrations {
    pub stock_converted: f64,
    pub final_converted: f64,
    pub basis: ConcentrationBasis,
}

/// Normalize a stock and final concentration onto one basis.
///
/// Same-family pairs stay in their family (molar, mg/mL, % w/v). Mixed pairs
/// are compared in mg/mL; a molar side can only join that comparison through
/// a molecular weight, since M x g/mol = g/L = mg/mL.
pub fn normalize_concentrations(
    stock: Quantity<ConcentrationUnit>,
    final_conc: Quantity<ConcentrationUnit>,
    molecular_weight: Option<f64>,
) -> CalcResult<NormalizedConcentrations> {
    use ConcentrationUnit::*;

    let (stock_converted, final_converted, basis) = match (stock.unit, final_conc.unit) {
        (Molar(s), Molar(f)) => (
            stock.value * s.factor(),
            final_conc.value * f.factor(),
            ConcentrationBasis::Molar,
        ),
        (MassPerVolume(s), MassPerVolume(f)) => (
            stock.value * s.factor(),
            final_conc.value * f.factor(),
            ConcentrationBasis::MgPerMl,
        ),
        (PercentWv, PercentWv) => (stock.value, final_conc.value, ConcentrationBasis::PercentWv),
        _ => {
            let incompatible = || CalcError::IncompatibleConcentrationUnits {
                stock: stock.unit,
                target: final_conc.unit,
            };
            let s = to_mg_per_ml(stock, molecular_weight).ok_or_else(incompatible)?;
            let f = to_mg_per_ml(final_conc, molecular_weight).ok_or_else(incompatible)?;
            (s, f, ConcentrationBasis::MgPerMl)
        }
    };

    Ok(NormalizedConcentrations {
        stock_converted,
        final_converted,
        basis,
    })
}

/// Express any concentration in mg/mL.
///
/// Returns None for a molar concentration when no molecular weight is known.
pub fn to_mg_per_ml(
    concentration: Quantity<ConcentrationUnit>,
    molecular_weight: Option<f64>,
) -> Option<f64> {
    match concentration.unit {
        ConcentrationUnit::MassPerVolume(u) => Some(concentration.value * u.factor()),
        ConcentrationUnit::PercentWv => Some(concentration.value * MG_ML_PER_PERCENT_WV),
        ConcentrationUnit::Molar(u) => {
            molecular_weight.map(|mw| concentration.value * u.factor() * mw)
        }
    }
}
