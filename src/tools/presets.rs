//! Preset MCP Tools
//!
//! Save, list, load and delete named calculator inputs.

use serde::Serialize;

use crate::db::PresetRepository;
use crate::models::{CalculatorKind, Preset, PresetFields, PresetMetadata};

fn parse_scope(calculator: &str) -> Result<CalculatorKind, String> {
    CalculatorKind::from_str(calculator).ok_or_else(|| {
        format!(
            "Unknown calculator: '{}'. Valid values: molarity, dilution, reconstitution, concentration, antibiotics, batch",
            calculator
        )
    })
}

/// Response for save_preset
#[derive(Debug, Serialize)]
pub struct SavePresetResponse {
    pub id: i64,
    pub name: String,
    pub calculator: CalculatorKind,
}

/// Response for list_presets
#[derive(Debug, Serialize)]
pub struct ListPresetsResponse {
    pub calculator: CalculatorKind,
    pub presets: Vec<PresetMetadata>,
    pub total: usize,
}

/// Response for delete_preset
#[derive(Debug, Serialize)]
pub struct DeletePresetResponse {
    pub success: bool,
    pub id: i64,
    pub message: String,
}

/// Save a named set of calculator inputs.
///
/// `fields` is the input record for `calculator`; its `calculator` tag may
/// be omitted, in which case the scope fills it in.
pub fn save_preset<R: PresetRepository>(
    repo: &R,
    calculator: &str,
    name: &str,
    fields: serde_json::Value,
) -> Result<SavePresetResponse, String> {
    let scope = parse_scope(calculator)?;

    let mut fields = fields;
    match fields.as_object_mut() {
        Some(obj) => {
            obj.entry("calculator")
                .or_insert_with(|| serde_json::Value::String(scope.as_str().to_string()));
        }
        None => return Err("Preset fields must be a JSON object".to_string()),
    }

    let fields: PresetFields = serde_json::from_value(fields)
        .map_err(|e| format!("Invalid preset fields: {}", e))?;
    fields
        .validate()
        .map_err(|e| format!("Invalid preset fields: {}", e))?;

    let id = repo
        .save(scope, name, &fields)
        .map_err(|e| format!("Failed to save preset: {}", e))?;

    Ok(SavePresetResponse {
        id,
        name: name.trim().to_string(),
        calculator: scope,
    })
}

/// List presets saved for a calculator, newest first
pub fn list_presets<R: PresetRepository>(
    repo: &R,
    calculator: &str,
) -> Result<ListPresetsResponse, String> {
    let scope = parse_scope(calculator)?;
    let presets = repo
        .list(scope)
        .map_err(|e| format!("Failed to list presets: {}", e))?;

    Ok(ListPresetsResponse {
        calculator: scope,
        total: presets.len(),
        presets,
    })
}

/// Load a preset by ID
pub fn load_preset<R: PresetRepository>(
    repo: &R,
    calculator: &str,
    id: i64,
) -> Result<Option<Preset>, String> {
    let scope = parse_scope(calculator)?;
    repo.load(scope, id)
        .map_err(|e| format!("Failed to load preset: {}", e))
}

/// Delete a preset by ID
pub fn delete_preset<R: PresetRepository>(
    repo: &R,
    calculator: &str,
    id: i64,
) -> Result<DeletePresetResponse, String> {
    let scope = parse_scope(calculator)?;
    let success = repo
        .delete(scope, id)
        .map_err(|e| format!("Failed to delete preset: {}", e))?;

    let message = if success {
        format!("Preset {} deleted", id)
    } else {
        format!("No {} preset with id {}", scope.as_str(), id)
    };

    Ok(DeletePresetResponse {
        success,
        id,
        message,
    })
}
