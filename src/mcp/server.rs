//! Lab Calculator MCP Server Implementation
//!
//! Implements the MCP server with all calculator and preset tools.

use std::path::PathBuf;
use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::db::{Database, SqlitePresetStore};
use crate::models::{
    AntibioticsFields, BatchFields, ConcentrationFields, DilutionFields, MolarityFields,
    ReconstitutionFields,
};
use crate::tools::calculators;
use crate::tools::presets;
use crate::tools::status::StatusTracker;

/// Lab Calculator MCP Service
#[derive(Clone)]
pub struct LabCalcService {
    status_tracker: Arc<Mutex<StatusTracker>>,
    presets: SqlitePresetStore,
    tool_router: ToolRouter<LabCalcService>,
}

impl LabCalcService {
    pub fn new(database_path: PathBuf, database: Database) -> Self {
        Self {
            status_tracker: Arc::new(Mutex::new(StatusTracker::new(database_path))),
            presets: SqlitePresetStore::new(database),
            tool_router: Self::tool_router(),
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(e.to_string(), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

// ============================================================================
// Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SerialDilutionParams {
    #[serde(flatten)]
    pub fields: BatchFields,
    /// "csv" or "tsv" to include a table export
    #[serde(default)]
    pub export: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SavePresetParams {
    /// molarity, dilution, reconstitution, concentration, antibiotics or batch
    pub calculator: String,
    pub name: String,
    /// Calculator inputs, named like the calculator's parameters
    pub fields: serde_json::Value,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListPresetsParams {
    pub calculator: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PresetIdParams {
    pub calculator: String,
    pub id: i64,
}

// ============================================================================
// Tools
// ============================================================================

#[tool_router]
impl LabCalcService {
    // --- Status ---

    #[tool(description = "Get the current status of the lab calculator service including build info, database status, and process information")]
    async fn lab_status(&self) -> Result<CallToolResult, McpError> {
        let preset_count = match self.presets.count() {
            Ok(count) => Some(count),
            Err(e) => {
                tracing::warn!("Could not count presets: {}", e);
                None
            }
        };
        let tracker = self.status_tracker.lock().await;
        let status = tracker.get_status(preset_count);
        let json = serde_json::to_string_pretty(&status)
            .map_err(|e| McpError::internal_error(format!("Serialization error: {}", e), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Get instructions for the calculators: formulas, accepted unit symbols, and how presets work. Call this when unsure which calculator or units to use.")]
    fn calculator_instructions(&self) -> Result<CallToolResult, McpError> {
        use crate::tools::status::CALCULATOR_INSTRUCTIONS;
        Ok(CallToolResult::success(vec![Content::text(CALCULATOR_INSTRUCTIONS)]))
    }

    // --- Calculators ---

    #[tool(description = "Mass of solute needed for a solution: mass = molarity x volume x molecular weight. Units: M/mM/µM/nM and L/mL/µL/nL.")]
    fn calculate_molarity(&self, Parameters(p): Parameters<MolarityFields>) -> Result<CallToolResult, McpError> {
        let result = calculators::calculate_molarity(&p).map_err(|e| McpError::invalid_params(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Stock and diluent volumes for a dilution (C1V1 = C2V2). Molar and mass/volume units can be mixed when molecular_weight is given.")]
    fn calculate_dilution(&self, Parameters(p): Parameters<DilutionFields>) -> Result<CallToolResult, McpError> {
        let result = calculators::calculate_dilution(&p).map_err(|e| McpError::invalid_params(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Solvent volume needed to dissolve a powder to a target concentration. Molar targets require molecular_weight.")]
    fn calculate_reconstitution(&self, Parameters(p): Parameters<ReconstitutionFields>) -> Result<CallToolResult, McpError> {
        let result = calculators::calculate_reconstitution(&p).map_err(|e| McpError::invalid_params(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Concentration of a known mass in a known volume, in mg/mL, µg/mL and % w/v, plus molarity when molecular_weight is given")]
    fn calculate_concentration(&self, Parameters(p): Parameters<ConcentrationFields>) -> Result<CallToolResult, McpError> {
        let result = calculators::calculate_concentration(&p).map_err(|e| McpError::invalid_params(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Fixed-volume serial dilution series (1 to 100 steps, dilution_factor > 1). Set export to csv or tsv to get a table.")]
    fn calculate_serial_dilution(&self, Parameters(p): Parameters<SerialDilutionParams>) -> Result<CallToolResult, McpError> {
        let result = calculators::calculate_serial_dilution(&p.fields, p.export.as_deref())
            .map_err(|e| McpError::invalid_params(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Antibiotic stock volume to add to medium. Known antibiotics fill in default concentrations; use \"Custom\" with explicit concentrations otherwise. Optional plate_volume gives stock per plate.")]
    fn calculate_antibiotic_prep(&self, Parameters(p): Parameters<AntibioticsFields>) -> Result<CallToolResult, McpError> {
        let result = calculators::calculate_antibiotic_prep(&p).map_err(|e| McpError::invalid_params(e, None))?;
        to_json(&result)
    }

    #[tool(description = "List built-in antibiotics with their usual stock (mg/mL) and working (µg/mL) concentrations")]
    fn list_antibiotic_presets(&self) -> Result<CallToolResult, McpError> {
        to_json(&calculators::list_antibiotic_presets())
    }

    // --- Presets ---

    #[tool(description = "Save a named set of calculator inputs. fields uses the same names as the calculator's parameters and is validated before saving.")]
    fn save_preset(&self, Parameters(p): Parameters<SavePresetParams>) -> Result<CallToolResult, McpError> {
        let result = presets::save_preset(&self.presets, &p.calculator, &p.name, p.fields)
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "List saved presets for a calculator, newest first")]
    fn list_presets(&self, Parameters(p): Parameters<ListPresetsParams>) -> Result<CallToolResult, McpError> {
        let result = presets::list_presets(&self.presets, &p.calculator)
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Load a saved preset's inputs by ID")]
    fn load_preset(&self, Parameters(p): Parameters<PresetIdParams>) -> Result<CallToolResult, McpError> {
        let result = presets::load_preset(&self.presets, &p.calculator, p.id)
            .map_err(|e| McpError::internal_error(e, None))?;
        let json = match result {
            Some(preset) => serde_json::to_string_pretty(&preset),
            None => serde_json::to_string_pretty(&serde_json::json!({
                "error": "Preset not found",
                "calculator": p.calculator,
                "id": p.id,
            })),
        }
        .map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Delete a saved preset by ID")]
    fn delete_preset(&self, Parameters(p): Parameters<PresetIdParams>) -> Result<CallToolResult, McpError> {
        let result = presets::delete_preset(&self.presets, &p.calculator, p.id)
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }
}

// ============================================================================
// Server Handler
// ============================================================================

#[tool_handler]
impl ServerHandler for LabCalcService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "labcalc".into(),
                version: crate::build_info::VERSION.into(),
                title: Some("Lab Calculator".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Lab Calculator - Solution preparation math for the bench. \
                 IMPORTANT: Call calculator_instructions for formulas and accepted unit symbols. \
                 Calculators: calculate_molarity, calculate_dilution, calculate_reconstitution, \
                 calculate_concentration, calculate_serial_dilution (csv/tsv export), \
                 calculate_antibiotic_prep, list_antibiotic_presets. \
                 All calculators accept an optional precision (0-6 decimals) for display strings. \
                 Presets: save/list/load/delete_preset, scoped by calculator. \
                 Status: lab_status."
                    .into(),
            ),
        }
    }
}
