//! Calculation error types
//!
//! Errors raised at the boundary between parsed user input and the
//! calculation functions.

use thiserror::Error;

use super::units::ConcentrationUnit;

/// Largest serial dilution accepted in one request
pub const MAX_SERIAL_STEPS: u32 = 100;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalcError {
    #[error("{field} must be a positive number (got {value})")]
    InvalidNumber { field: &'static str, value: f64 },

    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("Unknown unit for {field}: '{unit}'")]
    UnknownUnit { field: &'static str, unit: String },

    #[error("Dilution factor must be > 1 (got {0})")]
    DilutionFactorTooSmall(f64),

    #[error("Step count must be between 1 and {max} (got {0})", max = MAX_SERIAL_STEPS)]
    InvalidStepCount(i64),

    #[error(
        "Cannot compare {stock} with {target} without a molecular weight"
    )]
    IncompatibleConcentrationUnits {
        stock: ConcentrationUnit,
        target: ConcentrationUnit,
    },
}

/// Result type for calculations
pub type CalcResult<T> = Result<T, CalcError>;
