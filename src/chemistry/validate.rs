//! Input validation
//!
//! Turns raw numbers and unit strings into values the calculators accept.
//! Every check here runs before a calculator is invoked.

use super::error::{CalcError, CalcResult, MAX_SERIAL_STEPS};
use super::units::{ConcentrationUnit, MassConcentrationUnit, MassUnit, MolarUnit, VolumeUnit};

/// Reject non-finite, zero and negative values
pub fn require_positive(field: &'static str, value: f64) -> CalcResult<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(CalcError::InvalidNumber { field, value })
    }
}

/// Like `require_positive`, but an absent value is fine
pub fn optional_positive(field: &'static str, value: Option<f64>) -> CalcResult<Option<f64>> {
    value.map(|v| require_positive(field, v)).transpose()
}

pub fn require_dilution_factor(factor: f64) -> CalcResult<f64> {
    let factor = require_positive("dilution_factor", factor)?;
    if factor <= 1.0 {
        return Err(CalcError::DilutionFactorTooSmall(factor));
    }
    Ok(factor)
}

pub fn require_step_count(steps: i64) -> CalcResult<u32> {
    if steps < 1 || steps > MAX_SERIAL_STEPS as i64 {
        return Err(CalcError::InvalidStepCount(steps));
    }
    Ok(steps as u32)
}

pub fn parse_mass_unit(field: &'static str, unit: &str) -> CalcResult<MassUnit> {
    MassUnit::from_str(unit).ok_or_else(|| unknown(field, unit))
}

pub fn parse_volume_unit(field: &'static str, unit: &str) -> CalcResult<VolumeUnit> {
    VolumeUnit::from_str(unit).ok_or_else(|| unknown(field, unit))
}

pub fn parse_molar_unit(field: &'static str, unit: &str) -> CalcResult<MolarUnit> {
    MolarUnit::from_str(unit).ok_or_else(|| unknown(field, unit))
}

pub fn parse_mass_concentration_unit(
    field: &'static str,
    unit: &str,
) -> CalcResult<MassConcentrationUnit> {
    MassConcentrationUnit::from_str(unit).ok_or_else(|| unknown(field, unit))
}

pub fn parse_concentration_unit(field: &'static str, unit: &str) -> CalcResult<ConcentrationUnit> {
    ConcentrationUnit::from_str(unit).ok_or_else(|| unknown(field, unit))
}

fn unknown(field: &'static str, unit: &str) -> CalcError {
    CalcError::UnknownUnit {
        field,
        unit: unit.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_positive() {
        assert_eq!(require_positive("mass", 2.5), Ok(2.5));
        assert!(matches!(
            require_positive("mass", 0.0),
            Err(CalcError::InvalidNumber { field: "mass", .. })
        ));
        assert!(require_positive("mass", -1.0).is_err());
        assert!(require_positive("mass", f64::NAN).is_err());
        assert!(require_positive("mass", f64::INFINITY).is_err());
    }

    #[test]
    fn test_optional_positive() {
        assert_eq!(optional_positive("molecular_weight", None), Ok(None));
        assert_eq!(optional_positive("molecular_weight", Some(58.44)), Ok(Some(58.44)));
        assert!(optional_positive("molecular_weight", Some(0.0)).is_err());
    }

    #[test]
    fn test_dilution_factor_must_exceed_one() {
        assert_eq!(require_dilution_factor(2.0), Ok(2.0));
        assert_eq!(
            require_dilution_factor(1.0),
            Err(CalcError::DilutionFactorTooSmall(1.0))
        );
        assert!(matches!(
            require_dilution_factor(0.0),
            Err(CalcError::InvalidNumber { .. })
        ));
    }

    #[test]
    fn test_step_count_bounds() {
        assert_eq!(require_step_count(6), Ok(6));
        assert_eq!(require_step_count(0), Err(CalcError::InvalidStepCount(0)));
        assert_eq!(require_step_count(101), Err(CalcError::InvalidStepCount(101)));
    }

    #[test]
    fn test_unknown_unit_message() {
        let err = parse_volume_unit("volume_unit", "gallon").unwrap_err();
        assert_eq!(err.to_string(), "Unknown unit for volume_unit: 'gallon'");
    }
}
