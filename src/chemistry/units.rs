//! Unit types and conversion constants
//!
//! Closed unit enumerations for mass, volume, molar concentration and
//! mass concentration, each with a scale factor to its family's base unit.

use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// Mass Conversion Constants (to grams)
// ============================================================================

/// Grams per milligram
pub const G_PER_MG: f64 = 1e-3;
/// Grams per microgram
pub const G_PER_UG: f64 = 1e-6;
/// Grams per nanogram
pub const G_PER_NG: f64 = 1e-9;

// ============================================================================
// Volume Conversion Constants (to liters)
// ============================================================================

/// Liters per milliliter
pub const L_PER_ML: f64 = 1e-3;
/// Liters per microliter
pub const L_PER_UL: f64 = 1e-6;
/// Liters per nanoliter
pub const L_PER_NL: f64 = 1e-9;

// ============================================================================
// Molar Concentration Constants (to molar)
// ============================================================================

/// Molar per millimolar
pub const M_PER_MM: f64 = 1e-3;
/// Molar per micromolar
pub const M_PER_UM: f64 = 1e-6;
/// Molar per nanomolar
pub const M_PER_NM: f64 = 1e-9;

// ============================================================================
// Mass Concentration Constants (to mg/mL)
// ============================================================================

/// mg/mL per µg/mL
pub const MG_ML_PER_UG_ML: f64 = 1e-3;
/// mg/mL per ng/mL
pub const MG_ML_PER_NG_ML: f64 = 1e-6;
/// mg/mL per 1% w/v (1 g per 100 mL)
pub const MG_ML_PER_PERCENT_WV: f64 = 10.0;

/// A unit with a fixed scale factor to its family's base unit.
pub trait Unit: Copy + PartialEq + fmt::Debug {
    /// How many base units one of this unit is worth
    fn factor(self) -> f64;

    /// Display symbol (e.g. "µL")
    fn symbol(self) -> &'static str;
}

/// Mass units, base = gram
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MassUnit {
    #[serde(rename = "g")]
    Gram,
    #[serde(rename = "mg")]
    Milligram,
    #[serde(rename = "µg", alias = "ug", alias = "μg", alias = "mcg")]
    Microgram,
    #[serde(rename = "ng")]
    Nanogram,
}

impl MassUnit {
    pub const ALL: [MassUnit; 4] = [
        MassUnit::Gram,
        MassUnit::Milligram,
        MassUnit::Microgram,
        MassUnit::Nanogram,
    ];

    /// Parse from a unit symbol or name
    pub fn from_str(s: &str) -> Option<Self> {
        match normalize_symbol(s).as_str() {
            "g" | "gram" | "grams" => Some(MassUnit::Gram),
            "mg" | "milligram" | "milligrams" => Some(MassUnit::Milligram),
            "µg" | "ug" | "mcg" | "microgram" | "micrograms" => Some(MassUnit::Microgram),
            "ng" | "nanogram" | "nanograms" => Some(MassUnit::Nanogram),
            _ => None,
        }
    }
}

impl Unit for MassUnit {
    fn factor(self) -> f64 {
        match self {
            MassUnit::Gram => 1.0,
            MassUnit::Milligram => G_PER_MG,
            MassUnit::Microgram => G_PER_UG,
            MassUnit::Nanogram => G_PER_NG,
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            MassUnit::Gram => "g",
            MassUnit::Milligram => "mg",
            MassUnit::Microgram => "µg",
            MassUnit::Nanogram => "ng",
        }
    }
}

/// Volume units, base = liter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VolumeUnit {
    #[serde(rename = "L", alias = "l")]
    Liter,
    #[serde(rename = "mL", alias = "ml")]
    Milliliter,
    #[serde(rename = "µL", alias = "uL", alias = "μL", alias = "ul")]
    Microliter,
    #[serde(rename = "nL", alias = "nl")]
    Nanoliter,
}

impl VolumeUnit {
    pub const ALL: [VolumeUnit; 4] = [
        VolumeUnit::Liter,
        VolumeUnit::Milliliter,
        VolumeUnit::Microliter,
        VolumeUnit::Nanoliter,
    ];

    /// Parse from a unit symbol or name (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match normalize_symbol(s).to_lowercase().as_str() {
            "l" | "liter" | "liters" | "litre" | "litres" => Some(VolumeUnit::Liter),
            "ml" | "milliliter" | "milliliters" | "millilitre" | "millilitres" => {
                Some(VolumeUnit::Milliliter)
            }
            "µl" | "ul" | "microliter" | "microliters" | "microlitre" | "microlitres" => {
                Some(VolumeUnit::Microliter)
            }
            "nl" | "nanoliter" | "nanoliters" | "nanolitre" | "nanolitres" => {
                Some(VolumeUnit::Nanoliter)
            }
            _ => None,
        }
    }
}

impl Unit for VolumeUnit {
    fn factor(self) -> f64 {
        match self {
            VolumeUnit::Liter => 1.0,
            VolumeUnit::Milliliter => L_PER_ML,
            VolumeUnit::Microliter => L_PER_UL,
            VolumeUnit::Nanoliter => L_PER_NL,
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            VolumeUnit::Liter => "L",
            VolumeUnit::Milliliter => "mL",
            VolumeUnit::Microliter => "µL",
            VolumeUnit::Nanoliter => "nL",
        }
    }
}

/// Molar concentration units, base = molar (mol/L)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MolarUnit {
    #[serde(rename = "M")]
    Molar,
    #[serde(rename = "mM")]
    Millimolar,
    #[serde(rename = "µM", alias = "uM", alias = "μM")]
    Micromolar,
    #[serde(rename = "nM")]
    Nanomolar,
}

impl MolarUnit {
    pub const ALL: [MolarUnit; 4] = [
        MolarUnit::Molar,
        MolarUnit::Millimolar,
        MolarUnit::Micromolar,
        MolarUnit::Nanomolar,
    ];

    /// Parse from a unit symbol or name.
    ///
    /// Symbols are case-sensitive ("mM" is not "MM"); spelled-out names are not.
    pub fn from_str(s: &str) -> Option<Self> {
        match normalize_symbol(s).as_str() {
            "M" => return Some(MolarUnit::Molar),
            "mM" => return Some(MolarUnit::Millimolar),
            "µM" | "uM" => return Some(MolarUnit::Micromolar),
            "nM" => return Some(MolarUnit::Nanomolar),
            _ => {}
        }

        match s.trim().to_lowercase().as_str() {
            "molar" | "mol/l" => Some(MolarUnit::Molar),
            "millimolar" | "mmol/l" => Some(MolarUnit::Millimolar),
            "micromolar" | "umol/l" | "µmol/l" => Some(MolarUnit::Micromolar),
            "nanomolar" | "nmol/l" => Some(MolarUnit::Nanomolar),
            _ => None,
        }
    }
}

impl Unit for MolarUnit {
    fn factor(self) -> f64 {
        match self {
            MolarUnit::Molar => 1.0,
            MolarUnit::Millimolar => M_PER_MM,
            MolarUnit::Micromolar => M_PER_UM,
            MolarUnit::Nanomolar => M_PER_NM,
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            MolarUnit::Molar => "M",
            MolarUnit::Millimolar => "mM",
            MolarUnit::Micromolar => "µM",
            MolarUnit::Nanomolar => "nM",
        }
    }
}

/// Mass-per-volume concentration units, base = mg/mL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MassConcentrationUnit {
    #[serde(rename = "mg/mL", alias = "mg/ml")]
    MgPerMl,
    #[serde(rename = "µg/mL", alias = "ug/mL", alias = "μg/mL", alias = "ug/ml")]
    UgPerMl,
    #[serde(rename = "ng/mL", alias = "ng/ml")]
    NgPerMl,
}

impl MassConcentrationUnit {
    pub const ALL: [MassConcentrationUnit; 3] = [
        MassConcentrationUnit::MgPerMl,
        MassConcentrationUnit::UgPerMl,
        MassConcentrationUnit::NgPerMl,
    ];

    /// Parse from a unit symbol (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match normalize_symbol(s).to_lowercase().replace(' ', "").as_str() {
            "mg/ml" | "g/l" => Some(MassConcentrationUnit::MgPerMl),
            "µg/ml" | "ug/ml" | "mcg/ml" | "mg/l" => Some(MassConcentrationUnit::UgPerMl),
            "ng/ml" | "µg/l" | "ug/l" => Some(MassConcentrationUnit::NgPerMl),
            _ => None,
        }
    }
}

impl Unit for MassConcentrationUnit {
    fn factor(self) -> f64 {
        match self {
            MassConcentrationUnit::MgPerMl => 1.0,
            MassConcentrationUnit::UgPerMl => MG_ML_PER_UG_ML,
            MassConcentrationUnit::NgPerMl => MG_ML_PER_NG_ML,
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            MassConcentrationUnit::MgPerMl => "mg/mL",
            MassConcentrationUnit::UgPerMl => "µg/mL",
            MassConcentrationUnit::NgPerMl => "ng/mL",
        }
    }
}

/// Family a concentration unit belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConcentrationFamily {
    Molar,
    MassPerVolume,
    PercentWv,
}

/// Any concentration unit accepted by the calculators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum ConcentrationUnit {
    Molar(MolarUnit),
    MassPerVolume(MassConcentrationUnit),
    /// Percent weight per volume (g per 100 mL)
    PercentWv,
}

impl ConcentrationUnit {
    pub fn family(self) -> ConcentrationFamily {
        match self {
            ConcentrationUnit::Molar(_) => ConcentrationFamily::Molar,
            ConcentrationUnit::MassPerVolume(_) => ConcentrationFamily::MassPerVolume,
            ConcentrationUnit::PercentWv => ConcentrationFamily::PercentWv,
        }
    }

    pub fn is_molar(self) -> bool {
        matches!(self, ConcentrationUnit::Molar(_))
    }

    pub fn symbol(self) -> &'static str {
        match self {
            ConcentrationUnit::Molar(u) => u.symbol(),
            ConcentrationUnit::MassPerVolume(u) => u.symbol(),
            ConcentrationUnit::PercentWv => "% w/v",
        }
    }

    /// Parse from any molar, mass/volume or percent symbol
    pub fn from_str(s: &str) -> Option<Self> {
        if let Some(u) = MolarUnit::from_str(s) {
            return Some(ConcentrationUnit::Molar(u));
        }
        if let Some(u) = MassConcentrationUnit::from_str(s) {
            return Some(ConcentrationUnit::MassPerVolume(u));
        }
        match s.trim().to_lowercase().replace(' ', "").as_str() {
            "%" | "%w/v" | "%wv" | "percent" | "w/v" => Some(ConcentrationUnit::PercentWv),
            _ => None,
        }
    }
}

impl From<MolarUnit> for ConcentrationUnit {
    fn from(u: MolarUnit) -> Self {
        ConcentrationUnit::Molar(u)
    }
}

impl From<MassConcentrationUnit> for ConcentrationUnit {
    fn from(u: MassConcentrationUnit) -> Self {
        ConcentrationUnit::MassPerVolume(u)
    }
}

impl From<ConcentrationUnit> for String {
    fn from(u: ConcentrationUnit) -> Self {
        u.symbol().to_string()
    }
}

impl TryFrom<String> for ConcentrationUnit {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        ConcentrationUnit::from_str(&s).ok_or_else(|| format!("unknown concentration unit: {}", s))
    }
}

impl fmt::Display for ConcentrationUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A numeric value tagged with its unit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quantity<U> {
    pub value: f64,
    pub unit: U,
}

impl<U> Quantity<U> {
    pub fn new(value: f64, unit: U) -> Self {
        Self { value, unit }
    }
}

impl<U: Unit> Quantity<U> {
    /// Value expressed in the family's base unit
    pub fn to_base(&self) -> f64 {
        self.value * self.unit.factor()
    }

    /// Build a quantity in `unit` from a value in the family's base unit
    pub fn from_base(base: f64, unit: U) -> Self {
        Self {
            value: base / unit.factor(),
            unit,
        }
    }

    pub fn convert_to(&self, unit: U) -> Self {
        Self::from_base(self.to_base(), unit)
    }
}

/// Fold the Greek mu and the micro sign onto one code point
fn normalize_symbol(s: &str) -> String {
    s.trim().replace('μ', "µ")
}
