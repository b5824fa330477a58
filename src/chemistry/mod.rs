//! Dilution math module
//!
//! Unit conversion tables and the pure calculation functions built on them.

pub mod antibiotics;
pub mod concentration;
pub mod dilution;
pub mod equivalents;
pub mod error;
pub mod molarity;
pub mod normalize;
pub mod reconstitution;
pub mod serial;
pub mod units;
pub mod validate;

pub use antibiotics::{
    calculate_antibiotic_prep, find_antibiotic, AntibioticPrepResult, AntibioticPreset,
    ANTIBIOTIC_PRESETS,
};
pub use concentration::{calculate_concentration, ConcentrationResult};
pub use dilution::{calculate_dilution, DilutionResult};
pub use equivalents::{format_quantity, format_value, DEFAULT_PRECISION, MAX_PRECISION};
pub use error::{CalcError, CalcResult, MAX_SERIAL_STEPS};
pub use molarity::{calculate_molarity, MolarityResult};
pub use normalize::{normalize_concentrations, ConcentrationBasis, NormalizedConcentrations};
pub use reconstitution::{calculate_reconstitution, ReconstitutionResult};
pub use serial::{calculate_serial_dilution_series, SerialDilutionStep, SeriesSummary};
pub use units::{
    ConcentrationFamily, ConcentrationUnit, MassConcentrationUnit, MassUnit, MolarUnit,
    Quantity, Unit, VolumeUnit,
};
