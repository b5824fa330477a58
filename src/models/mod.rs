//! Data models
//!
//! Rust structs representing database entities.

mod preset;

pub use preset::{
    AntibioticsFields, BatchFields, CalculatorKind, ConcentrationFields, DilutionFields,
    MolarityFields, Preset, PresetFields, PresetMetadata, ReconstitutionFields,
};
