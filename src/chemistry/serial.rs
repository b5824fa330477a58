//! Serial dilution series
//!
//! Fixed-volume serial dilutions: every tube is pre-filled with diluent and
//! receives a transfer from the tube before it, so each tube ends up holding
//! the same total volume.

use serde::Serialize;

use super::error::{CalcError, CalcResult, MAX_SERIAL_STEPS};
use super::units::{ConcentrationUnit, Quantity, VolumeUnit};

/// One tube in a serial dilution
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SerialDilutionStep {
    /// 1-based position in the series
    pub step_index: u32,
    pub concentration: Quantity<ConcentrationUnit>,
    pub transfer_volume: Quantity<VolumeUnit>,
    pub diluent_volume: Quantity<VolumeUnit>,
    pub total_volume: Quantity<VolumeUnit>,
}

/// Overview of a computed series
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesSummary {
    pub steps: usize,
    pub highest_concentration: Quantity<ConcentrationUnit>,
    pub lowest_concentration: Quantity<ConcentrationUnit>,
    /// Volume across all tubes
    pub total_volume: Quantity<VolumeUnit>,
}

/// Compute `steps` tubes starting at `start`, each diluted by `dilution_factor`.
///
/// The concentration keeps the start unit; it is never converted.
pub fn calculate_serial_dilution_series(
    start: Quantity<ConcentrationUnit>,
    dilution_factor: f64,
    steps: u32,
    volume_per_step: Quantity<VolumeUnit>,
) -> CalcResult<Vec<SerialDilutionStep>> {
    if !dilution_factor.is_finite() || dilution_factor <= 1.0 {
        return Err(CalcError::DilutionFactorTooSmall(dilution_factor));
    }
    if steps == 0 || steps > MAX_SERIAL_STEPS {
        return Err(CalcError::InvalidStepCount(steps as i64));
    }

    let volume = volume_per_step.value;
    let unit = volume_per_step.unit;
    let transfer = volume / dilution_factor;
    let diluent = volume - transfer;

    let series = (1..=steps)
        .map(|step_index| SerialDilutionStep {
            step_index,
            concentration: Quantity::new(
                start.value / dilution_factor.powi(step_index as i32 - 1),
                start.unit,
            ),
            transfer_volume: Quantity::new(transfer, unit),
            diluent_volume: Quantity::new(diluent, unit),
            total_volume: Quantity::new(volume, unit),
        })
        .collect();

    Ok(series)
}

impl SeriesSummary {
    /// Summarize a series; None when it is empty
    pub fn from_steps(steps: &[SerialDilutionStep]) -> Option<Self> {
        let first = steps.first()?;
        let last = steps.last()?;
        let per_tube = first.total_volume;

        Some(Self {
            steps: steps.len(),
            highest_concentration: first.concentration,
            lowest_concentration: last.concentration,
            total_volume: Quantity::new(per_tube.value * steps.len() as f64, per_tube.unit),
        })
    }
}
