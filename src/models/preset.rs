//! Preset model
//!
//! Named, saved sets of calculator inputs. Each calculator has its own typed
//! field record; the record is stored as JSON next to its calculator scope.

use rmcp::schemars;
use rusqlite::types::Type;
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::chemistry::validate::{
    optional_positive, parse_concentration_unit, parse_mass_concentration_unit, parse_mass_unit,
    parse_molar_unit, parse_volume_unit, require_dilution_factor, require_positive,
    require_step_count,
};
use crate::chemistry::{
    find_antibiotic, CalcError, CalcResult, MassConcentrationUnit, Quantity,
};
use crate::db::{DbError, DbResult};

/// Which calculator a preset belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalculatorKind {
    Molarity,
    Dilution,
    Reconstitution,
    Concentration,
    Antibiotics,
    Batch,
}

impl CalculatorKind {
    pub const ALL: [CalculatorKind; 6] = [
        CalculatorKind::Molarity,
        CalculatorKind::Dilution,
        CalculatorKind::Reconstitution,
        CalculatorKind::Concentration,
        CalculatorKind::Antibiotics,
        CalculatorKind::Batch,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CalculatorKind::Molarity => "molarity",
            CalculatorKind::Dilution => "dilution",
            CalculatorKind::Reconstitution => "reconstitution",
            CalculatorKind::Concentration => "concentration",
            CalculatorKind::Antibiotics => "antibiotics",
            CalculatorKind::Batch => "batch",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "molarity" => Some(CalculatorKind::Molarity),
            "dilution" => Some(CalculatorKind::Dilution),
            "reconstitution" => Some(CalculatorKind::Reconstitution),
            "concentration" => Some(CalculatorKind::Concentration),
            "antibiotics" | "antibiotic" => Some(CalculatorKind::Antibiotics),
            "batch" | "serial" | "serial_dilution" => Some(CalculatorKind::Batch),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct MolarityFields {
    pub molecular_weight: f64,
    pub concentration: f64,
    pub concentration_unit: String,
    pub volume: f64,
    pub volume_unit: String,
    #[serde(default)]
    pub precision: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct DilutionFields {
    pub stock_concentration: f64,
    pub stock_unit: String,
    pub final_concentration: f64,
    pub final_unit: String,
    pub final_volume: f64,
    pub volume_unit: String,
    #[serde(default)]
    pub molecular_weight: Option<f64>,
    #[serde(default)]
    pub precision: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct ReconstitutionFields {
    pub powder_mass: f64,
    pub mass_unit: String,
    pub target_concentration: f64,
    pub concentration_unit: String,
    #[serde(default)]
    pub molecular_weight: Option<f64>,
    #[serde(default)]
    pub precision: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct ConcentrationFields {
    pub mass: f64,
    pub mass_unit: String,
    pub volume: f64,
    pub volume_unit: String,
    #[serde(default)]
    pub molecular_weight: Option<f64>,
    #[serde(default)]
    pub precision: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct AntibioticsFields {
    /// Built-in antibiotic name, or "Custom"
    pub antibiotic: String,
    /// Defaults to the built-in stock (mg/mL) for a known antibiotic
    #[serde(default)]
    pub stock_concentration: Option<f64>,
    #[serde(default)]
    pub stock_unit: Option<String>,
    /// Defaults to the built-in working concentration (µg/mL)
    #[serde(default)]
    pub working_concentration: Option<f64>,
    #[serde(default)]
    pub working_unit: Option<String>,
    pub final_volume: f64,
    pub volume_unit: String,
    #[serde(default)]
    pub plate_volume: Option<f64>,
    #[serde(default)]
    pub plate_unit: Option<String>,
    #[serde(default)]
    pub precision: Option<usize>,
}

impl AntibioticsFields {
    /// Stock and working concentrations, falling back to the built-in
    /// values when the antibiotic is known.
    pub fn resolve_concentrations(
        &self,
    ) -> CalcResult<(Quantity<MassConcentrationUnit>, Quantity<MassConcentrationUnit>)> {
        let builtin = find_antibiotic(&self.antibiotic);

        let stock = match (self.stock_concentration, builtin) {
            (Some(value), _) => {
                let unit = match self.stock_unit {
                    Some(ref unit) => parse_mass_concentration_unit("stock_unit", unit)?,
                    None => MassConcentrationUnit::MgPerMl,
                };
                Quantity::new(require_positive("stock_concentration", value)?, unit)
            }
            (None, Some(preset)) => preset.stock(),
            (None, None) => return Err(CalcError::MissingField("stock_concentration")),
        };

        let working = match (self.working_concentration, builtin) {
            (Some(value), _) => {
                let unit = match self.working_unit {
                    Some(ref unit) => parse_mass_concentration_unit("working_unit", unit)?,
                    None => MassConcentrationUnit::UgPerMl,
                };
                Quantity::new(require_positive("working_concentration", value)?, unit)
            }
            (None, Some(preset)) => preset.working(),
            (None, None) => return Err(CalcError::MissingField("working_concentration")),
        };

        Ok((stock, working))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct BatchFields {
    pub start_concentration: f64,
    pub start_unit: String,
    pub dilution_factor: f64,
    pub steps: i64,
    pub volume_per_step: f64,
    pub volume_unit: String,
    #[serde(default)]
    pub precision: Option<usize>,
}

/// Saved inputs for one calculator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "calculator", rename_all = "lowercase")]
pub enum PresetFields {
    Molarity(MolarityFields),
    Dilution(DilutionFields),
    Reconstitution(ReconstitutionFields),
    Concentration(ConcentrationFields),
    Antibiotics(AntibioticsFields),
    Batch(BatchFields),
}

impl PresetFields {
    pub fn kind(&self) -> CalculatorKind {
        match self {
            PresetFields::Molarity(_) => CalculatorKind::Molarity,
            PresetFields::Dilution(_) => CalculatorKind::Dilution,
            PresetFields::Reconstitution(_) => CalculatorKind::Reconstitution,
            PresetFields::Concentration(_) => CalculatorKind::Concentration,
            PresetFields::Antibiotics(_) => CalculatorKind::Antibiotics,
            PresetFields::Batch(_) => CalculatorKind::Batch,
        }
    }

    /// Check numbers and units with the same rules the calculators use
    pub fn validate(&self) -> CalcResult<()> {
        match self {
            PresetFields::Molarity(f) => {
                require_positive("molecular_weight", f.molecular_weight)?;
                require_positive("concentration", f.concentration)?;
                parse_molar_unit("concentration_unit", &f.concentration_unit)?;
                require_positive("volume", f.volume)?;
                parse_volume_unit("volume_unit", &f.volume_unit)?;
            }
            PresetFields::Dilution(f) => {
                require_positive("stock_concentration", f.stock_concentration)?;
                parse_concentration_unit("stock_unit", &f.stock_unit)?;
                require_positive("final_concentration", f.final_concentration)?;
                parse_concentration_unit("final_unit", &f.final_unit)?;
                require_positive("final_volume", f.final_volume)?;
                parse_volume_unit("volume_unit", &f.volume_unit)?;
                optional_positive("molecular_weight", f.molecular_weight)?;
            }
            PresetFields::Reconstitution(f) => {
                require_positive("powder_mass", f.powder_mass)?;
                parse_mass_unit("mass_unit", &f.mass_unit)?;
                require_positive("target_concentration", f.target_concentration)?;
                parse_concentration_unit("concentration_unit", &f.concentration_unit)?;
                optional_positive("molecular_weight", f.molecular_weight)?;
            }
            PresetFields::Concentration(f) => {
                require_positive("mass", f.mass)?;
                parse_mass_unit("mass_unit", &f.mass_unit)?;
                require_positive("volume", f.volume)?;
                parse_volume_unit("volume_unit", &f.volume_unit)?;
                optional_positive("molecular_weight", f.molecular_weight)?;
            }
            PresetFields::Antibiotics(f) => {
                f.resolve_concentrations()?;
                require_positive("final_volume", f.final_volume)?;
                parse_volume_unit("volume_unit", &f.volume_unit)?;
                optional_positive("plate_volume", f.plate_volume)?;
                if let Some(ref unit) = f.plate_unit {
                    parse_volume_unit("plate_unit", unit)?;
                }
            }
            PresetFields::Batch(f) => {
                require_positive("start_concentration", f.start_concentration)?;
                parse_concentration_unit("start_unit", &f.start_unit)?;
                require_dilution_factor(f.dilution_factor)?;
                require_step_count(f.steps)?;
                require_positive("volume_per_step", f.volume_per_step)?;
                parse_volume_unit("volume_unit", &f.volume_unit)?;
            }
        }
        Ok(())
    }
}

/// A saved preset
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Preset {
    pub id: i64,
    pub name: String,
    pub calculator: CalculatorKind,
    pub fields: PresetFields,
    pub created_at: String,
}

/// Preset listing entry (no field payload)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PresetMetadata {
    pub id: i64,
    pub name: String,
    pub calculator: CalculatorKind,
    pub created_at: String,
}

fn calculator_from_row(row: &Row, idx: &str) -> rusqlite::Result<CalculatorKind> {
    let raw: String = row.get(idx)?;
    CalculatorKind::from_str(&raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            Type::Text,
            format!("unknown calculator: {}", raw).into(),
        )
    })
}

impl Preset {
    /// Create from a database row
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let raw_fields: String = row.get("fields")?;
        let fields = serde_json::from_str(&raw_fields)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e)))?;

        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            calculator: calculator_from_row(row, "calculator")?,
            fields,
            created_at: row.get("created_at")?,
        })
    }

    /// Insert a new preset; the scope is taken from the field record
    pub fn create(conn: &Connection, name: &str, fields: &PresetFields) -> DbResult<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DbError::InvalidPreset("Preset name cannot be empty".to_string()));
        }

        let json = serde_json::to_string(fields)?;
        let created_at = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S%.3f").to_string();
        conn.execute(
            "INSERT INTO presets (calculator, name, fields, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![fields.kind().as_str(), name, json, created_at],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, fields.kind(), id)?
            .ok_or(DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
    }

    /// Get a preset by ID within a calculator scope
    pub fn get_by_id(conn: &Connection, calculator: CalculatorKind, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM presets WHERE id = ?1 AND calculator = ?2")?;

        let result = stmt.query_row(params![id, calculator.as_str()], Self::from_row);
        match result {
            Ok(preset) => Ok(Some(preset)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// List presets for a calculator, newest first
    pub fn list(conn: &Connection, calculator: CalculatorKind) -> DbResult<Vec<PresetMetadata>> {
        let mut stmt = conn.prepare(
            "SELECT id, name, calculator, created_at FROM presets
             WHERE calculator = ?1 ORDER BY created_at DESC, id DESC",
        )?;

        let presets = stmt
            .query_map([calculator.as_str()], |row| {
                Ok(PresetMetadata {
                    id: row.get("id")?,
                    name: row.get("name")?,
                    calculator: calculator_from_row(row, "calculator")?,
                    created_at: row.get("created_at")?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(presets)
    }

    /// Delete a preset within a calculator scope
    pub fn delete(conn: &Connection, calculator: CalculatorKind, id: i64) -> DbResult<bool> {
        let rows = conn.execute(
            "DELETE FROM presets WHERE id = ?1 AND calculator = ?2",
            params![id, calculator.as_str()],
        )?;
        Ok(rows > 0)
    }

    /// Count all presets
    pub fn count(conn: &Connection) -> DbResult<i64> {
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM presets", [], |row| row.get(0))?;
        Ok(count)
    }
}
