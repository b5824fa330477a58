//! Calculator MCP Tools
//!
//! Parse raw tool inputs, run the calculators and attach display strings.

use serde::Serialize;

use crate::chemistry::validate::{
    optional_positive, parse_concentration_unit, parse_mass_unit, parse_molar_unit,
    parse_volume_unit, require_dilution_factor, require_positive, require_step_count,
};
use crate::chemistry::{
    self, format_quantity, format_value, AntibioticPrepResult, AntibioticPreset, CalcError,
    ConcentrationResult, DilutionResult, MassConcentrationUnit, MolarUnit,
    MolarityResult, Quantity, ReconstitutionResult, SerialDilutionStep, SeriesSummary, Unit,
    VolumeUnit, ANTIBIOTIC_PRESETS, DEFAULT_PRECISION, MAX_PRECISION,
};
use crate::models::{
    AntibioticsFields, BatchFields, ConcentrationFields, DilutionFields, MolarityFields,
    ReconstitutionFields,
};

const INVALID_DILUTION_WARNING: &str =
    "Final concentration must be lower than stock concentration";

fn invalid(e: CalcError) -> String {
    format!("Invalid input: {}", e)
}

fn precision_or_default(precision: Option<usize>) -> usize {
    precision.unwrap_or(DEFAULT_PRECISION).min(MAX_PRECISION)
}

/// Exponent form with three fractional digits, e.g. "5.000e-1"
fn format_scientific(value: f64) -> String {
    format!("{:.3e}", value)
}

// ============================================================================
// Response Structs
// ============================================================================

/// Response for calculate_molarity
#[derive(Debug, Serialize)]
pub struct MolarityResponse {
    #[serde(flatten)]
    pub result: MolarityResult,
    pub display: String,
    pub equivalents_display: Vec<String>,
}

/// Response for calculate_dilution
#[derive(Debug, Serialize)]
pub struct DilutionResponse {
    #[serde(flatten)]
    pub result: DilutionResult,
    pub stock_display: String,
    pub diluent_display: String,
    pub warning: Option<String>,
}

/// Response for calculate_reconstitution
#[derive(Debug, Serialize)]
pub struct ReconstitutionResponse {
    #[serde(flatten)]
    pub result: ReconstitutionResult,
    pub display: String,
    pub equivalents_display: Vec<String>,
}

/// Response for calculate_concentration
#[derive(Debug, Serialize)]
pub struct ConcentrationResponse {
    #[serde(flatten)]
    pub result: ConcentrationResult,
    pub mg_per_ml_display: String,
    pub ug_per_ml_display: String,
    pub percent_wv_display: String,
    pub molarity_display: Option<String>,
    pub equivalents_display: Vec<String>,
}

/// Response for calculate_serial_dilution
#[derive(Debug, Serialize)]
pub struct SerialDilutionResponse {
    pub steps: Vec<SerialDilutionStep>,
    pub summary: Option<SeriesSummary>,
    pub concentration_range: Option<String>,
    pub total_volume_display: Option<String>,
    pub transfer_display: String,
    pub diluent_display: String,
    /// CSV or TSV table when an export format was requested
    pub export: Option<String>,
}

/// Response for calculate_antibiotic_prep
#[derive(Debug, Serialize)]
pub struct AntibioticPrepResponse {
    pub antibiotic: String,
    pub stock_concentration: Quantity<MassConcentrationUnit>,
    pub working_concentration: Quantity<MassConcentrationUnit>,
    #[serde(flatten)]
    pub result: AntibioticPrepResult,
    pub stock_display: String,
    pub medium_display: String,
    pub per_plate_display: Option<String>,
    pub warning: Option<String>,
}

/// Response for list_antibiotic_presets
#[derive(Debug, Serialize)]
pub struct ListAntibioticPresetsResponse {
    pub presets: Vec<AntibioticPreset>,
    pub note: &'static str,
}

// ============================================================================
// Calculator Tools
// ============================================================================

/// Mass of solute for a molarity and volume
pub fn calculate_molarity(p: &MolarityFields) -> Result<MolarityResponse, String> {
    let molecular_weight = require_positive("molecular_weight", p.molecular_weight).map_err(invalid)?;
    let concentration = Quantity::new(
        require_positive("concentration", p.concentration).map_err(invalid)?,
        parse_molar_unit("concentration_unit", &p.concentration_unit).map_err(invalid)?,
    );
    let volume = Quantity::new(
        require_positive("volume", p.volume).map_err(invalid)?,
        parse_volume_unit("volume_unit", &p.volume_unit).map_err(invalid)?,
    );
    let precision = precision_or_default(p.precision);

    let result = chemistry::calculate_molarity(molecular_weight, concentration, volume);

    Ok(MolarityResponse {
        display: format_quantity(&result.mass, precision),
        equivalents_display: result
            .equivalents
            .iter()
            .map(|q| format_quantity(q, precision))
            .collect(),
        result,
    })
}

/// Stock and diluent volumes for a C1V1 = C2V2 dilution
pub fn calculate_dilution(p: &DilutionFields) -> Result<DilutionResponse, String> {
    let stock = Quantity::new(
        require_positive("stock_concentration", p.stock_concentration).map_err(invalid)?,
        parse_concentration_unit("stock_unit", &p.stock_unit).map_err(invalid)?,
    );
    let final_conc = Quantity::new(
        require_positive("final_concentration", p.final_concentration).map_err(invalid)?,
        parse_concentration_unit("final_unit", &p.final_unit).map_err(invalid)?,
    );
    let final_volume = Quantity::new(
        require_positive("final_volume", p.final_volume).map_err(invalid)?,
        parse_volume_unit("volume_unit", &p.volume_unit).map_err(invalid)?,
    );
    let molecular_weight = optional_positive("molecular_weight", p.molecular_weight).map_err(invalid)?;
    let precision = precision_or_default(p.precision);

    let result = chemistry::calculate_dilution(stock, final_conc, final_volume, molecular_weight)
        .map_err(invalid)?;

    Ok(DilutionResponse {
        stock_display: format_quantity(&result.stock_volume, precision),
        diluent_display: format_quantity(&result.diluent_volume, precision),
        warning: (!result.is_valid).then(|| INVALID_DILUTION_WARNING.to_string()),
        result,
    })
}

/// Solvent volume to dissolve a powder to a target concentration
pub fn calculate_reconstitution(
    p: &ReconstitutionFields,
) -> Result<ReconstitutionResponse, String> {
    let mass = Quantity::new(
        require_positive("powder_mass", p.powder_mass).map_err(invalid)?,
        parse_mass_unit("mass_unit", &p.mass_unit).map_err(invalid)?,
    );
    let target = Quantity::new(
        require_positive("target_concentration", p.target_concentration).map_err(invalid)?,
        parse_concentration_unit("concentration_unit", &p.concentration_unit).map_err(invalid)?,
    );
    let molecular_weight = optional_positive("molecular_weight", p.molecular_weight).map_err(invalid)?;
    if target.unit.is_molar() && molecular_weight.is_none() {
        return Err(invalid(CalcError::MissingField("molecular_weight")));
    }
    let precision = precision_or_default(p.precision);

    let result =
        chemistry::calculate_reconstitution(mass, target, molecular_weight).map_err(invalid)?;

    Ok(ReconstitutionResponse {
        display: format_quantity(&result.solvent_volume, precision),
        equivalents_display: result
            .equivalents
            .iter()
            .map(|q| format_quantity(q, precision))
            .collect(),
        result,
    })
}

/// Concentration of a known mass in a known volume
pub fn calculate_concentration(p: &ConcentrationFields) -> Result<ConcentrationResponse, String> {
    let mass = Quantity::new(
        require_positive("mass", p.mass).map_err(invalid)?,
        parse_mass_unit("mass_unit", &p.mass_unit).map_err(invalid)?,
    );
    let volume = Quantity::new(
        require_positive("volume", p.volume).map_err(invalid)?,
        parse_volume_unit("volume_unit", &p.volume_unit).map_err(invalid)?,
    );
    let molecular_weight = optional_positive("molecular_weight", p.molecular_weight).map_err(invalid)?;
    let precision = precision_or_default(p.precision);

    let result = chemistry::calculate_concentration(mass, volume, molecular_weight);

    Ok(ConcentrationResponse {
        mg_per_ml_display: format!("{} mg/mL", format_value(result.mg_per_ml, precision)),
        ug_per_ml_display: format!("{} µg/mL", format_value(result.ug_per_ml, precision)),
        percent_wv_display: format!("{} % w/v", format_value(result.percent_wv, precision)),
        molarity_display: result
            .molarity
            .map(|m| format_quantity(&Quantity::new(m, MolarUnit::Molar), precision)),
        equivalents_display: result
            .equivalents
            .iter()
            .map(|q| format_quantity(q, precision))
            .collect(),
        result,
    })
}

/// Table format for serial dilution exports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Tsv,
}

impl ExportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Some(ExportFormat::Csv),
            "tsv" | "tab" => Some(ExportFormat::Tsv),
            _ => None,
        }
    }

    fn delimiter(&self) -> &'static str {
        match self {
            ExportFormat::Csv => ",",
            ExportFormat::Tsv => "\t",
        }
    }
}

/// Render a series as a delimited table, one row per tube
pub fn export_serial_dilution(
    steps: &[SerialDilutionStep],
    volume_unit: VolumeUnit,
    format: ExportFormat,
) -> String {
    let delimiter = format.delimiter();
    let header = [
        "Step",
        "Concentration",
        "Unit",
        "Transfer Volume",
        "Diluent Volume",
        "Total Volume",
        "Volume Unit",
    ];

    let mut table = header.join(delimiter);
    table.push('\n');

    for step in steps {
        let row = [
            step.step_index.to_string(),
            format_scientific(step.concentration.value),
            step.concentration.unit.symbol().to_string(),
            format_value(step.transfer_volume.convert_to(volume_unit).value, 2),
            format_value(step.diluent_volume.convert_to(volume_unit).value, 2),
            format_value(step.total_volume.convert_to(volume_unit).value, 2),
            volume_unit.symbol().to_string(),
        ];
        table.push_str(&row.join(delimiter));
        table.push('\n');
    }

    table
}

/// Fixed-volume serial dilution series, optionally exported as a table
pub fn calculate_serial_dilution(
    p: &BatchFields,
    export: Option<&str>,
) -> Result<SerialDilutionResponse, String> {
    let start = Quantity::new(
        require_positive("start_concentration", p.start_concentration).map_err(invalid)?,
        parse_concentration_unit("start_unit", &p.start_unit).map_err(invalid)?,
    );
    let dilution_factor = require_dilution_factor(p.dilution_factor).map_err(invalid)?;
    let steps = require_step_count(p.steps).map_err(invalid)?;
    let volume_per_step = Quantity::new(
        require_positive("volume_per_step", p.volume_per_step).map_err(invalid)?,
        parse_volume_unit("volume_unit", &p.volume_unit).map_err(invalid)?,
    );
    let export_format = match export {
        Some(s) => Some(
            ExportFormat::from_str(s)
                .ok_or_else(|| format!("Unknown export format: '{}' (use csv or tsv)", s))?,
        ),
        None => None,
    };
    let precision = precision_or_default(p.precision);

    let series =
        chemistry::calculate_serial_dilution_series(start, dilution_factor, steps, volume_per_step)
            .map_err(invalid)?;
    let summary = SeriesSummary::from_steps(&series);

    let transfer = Quantity::new(volume_per_step.value / dilution_factor, volume_per_step.unit);
    let diluent = Quantity::new(volume_per_step.value - transfer.value, volume_per_step.unit);

    Ok(SerialDilutionResponse {
        concentration_range: summary.as_ref().map(|s| {
            format!(
                "{} {} to {} {}",
                format_scientific(s.highest_concentration.value),
                s.highest_concentration.unit,
                format_scientific(s.lowest_concentration.value),
                s.lowest_concentration.unit
            )
        }),
        total_volume_display: summary
            .as_ref()
            .map(|s| format_quantity(&s.total_volume, precision)),
        transfer_display: format_quantity(&transfer, precision),
        diluent_display: format_quantity(&diluent, precision),
        export: export_format
            .map(|format| export_serial_dilution(&series, volume_per_step.unit, format)),
        summary,
        steps: series,
    })
}

/// Antibiotic stock volume for a batch of medium
pub fn calculate_antibiotic_prep(p: &AntibioticsFields) -> Result<AntibioticPrepResponse, String> {
    let (stock, working) = p.resolve_concentrations().map_err(invalid)?;
    let final_volume = Quantity::new(
        require_positive("final_volume", p.final_volume).map_err(invalid)?,
        parse_volume_unit("volume_unit", &p.volume_unit).map_err(invalid)?,
    );
    let plate_volume = match optional_positive("plate_volume", p.plate_volume).map_err(invalid)? {
        Some(value) => {
            let unit = match p.plate_unit {
                Some(ref unit) => parse_volume_unit("plate_unit", unit).map_err(invalid)?,
                None => VolumeUnit::Milliliter,
            };
            Some(Quantity::new(value, unit))
        }
        None => None,
    };
    let precision = precision_or_default(p.precision);

    let result = chemistry::calculate_antibiotic_prep(stock, working, final_volume, plate_volume)
        .map_err(invalid)?;

    Ok(AntibioticPrepResponse {
        antibiotic: p.antibiotic.trim().to_string(),
        stock_concentration: stock,
        working_concentration: working,
        stock_display: format_quantity(&result.dilution.stock_volume, precision),
        medium_display: format_quantity(&result.dilution.diluent_volume, precision),
        per_plate_display: result
            .stock_per_plate
            .as_ref()
            .map(|q| format_quantity(q, precision)),
        warning: (!result.dilution.is_valid).then(|| INVALID_DILUTION_WARNING.to_string()),
        result,
    })
}

/// Built-in antibiotics and their usual concentrations
pub fn list_antibiotic_presets() -> ListAntibioticPresetsResponse {
    ListAntibioticPresetsResponse {
        presets: ANTIBIOTIC_PRESETS.to_vec(),
        note: "Stock in mg/mL, working in µg/mL. Use \"Custom\" and pass both concentrations for anything else.",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chemistry::ConcentrationUnit;

    fn batch(steps: i64) -> BatchFields {
        BatchFields {
            start_concentration: 1.0,
            start_unit: "M".to_string(),
            dilution_factor: 2.0,
            steps,
            volume_per_step: 1000.0,
            volume_unit: "µL".to_string(),
            precision: None,
        }
    }

    #[test]
    fn test_molarity_display() {
        let r = calculate_molarity(&MolarityFields {
            molecular_weight: 180.16,
            concentration: 50.0,
            concentration_unit: "mM".to_string(),
            volume: 100.0,
            volume_unit: "mL".to_string(),
            precision: Some(1),
        })
        .unwrap();
        assert_eq!(r.display, "900.8 mg");
        assert_eq!(r.equivalents_display, vec!["900800.0 µg".to_string()]);
    }

    #[test]
    fn test_unknown_unit_is_reported() {
        let err = calculate_molarity(&MolarityFields {
            molecular_weight: 58.44,
            concentration: 1.0,
            concentration_unit: "mol".to_string(),
            volume: 1.0,
            volume_unit: "L".to_string(),
            precision: None,
        })
        .unwrap_err();
        assert!(err.contains("concentration_unit"));
        assert!(err.contains("'mol'"));
    }

    #[test]
    fn test_dilution_warning() {
        let mut fields = DilutionFields {
            stock_concentration: 10.0,
            stock_unit: "mg/mL".to_string(),
            final_concentration: 100.0,
            final_unit: "µg/mL".to_string(),
            final_volume: 50.0,
            volume_unit: "mL".to_string(),
            molecular_weight: None,
            precision: None,
        };
        let r = calculate_dilution(&fields).unwrap();
        assert_eq!(r.stock_display, "0.50 mL");
        assert_eq!(r.diluent_display, "49.50 mL");
        assert!(r.warning.is_none());

        fields.final_concentration = 20.0;
        fields.final_unit = "mg/mL".to_string();
        let r = calculate_dilution(&fields).unwrap();
        assert_eq!(r.warning.as_deref(), Some(INVALID_DILUTION_WARNING));
    }

    #[test]
    fn test_negative_volume_is_rejected() {
        let err = calculate_dilution(&DilutionFields {
            stock_concentration: 10.0,
            stock_unit: "mM".to_string(),
            final_concentration: 1.0,
            final_unit: "mM".to_string(),
            final_volume: -5.0,
            volume_unit: "mL".to_string(),
            molecular_weight: None,
            precision: None,
        })
        .unwrap_err();
        assert!(err.contains("final_volume"));
    }

    #[test]
    fn test_molar_reconstitution_needs_molecular_weight() {
        let err = calculate_reconstitution(&ReconstitutionFields {
            powder_mass: 10.0,
            mass_unit: "mg".to_string(),
            target_concentration: 10.0,
            concentration_unit: "mM".to_string(),
            molecular_weight: None,
            precision: None,
        })
        .unwrap_err();
        assert!(err.contains("molecular_weight is required"));
    }

    #[test]
    fn test_concentration_display() {
        let r = calculate_concentration(&ConcentrationFields {
            mass: 25.0,
            mass_unit: "mg".to_string(),
            volume: 10.0,
            volume_unit: "mL".to_string(),
            molecular_weight: None,
            precision: None,
        })
        .unwrap();
        assert_eq!(r.mg_per_ml_display, "2.50 mg/mL");
        assert_eq!(r.ug_per_ml_display, "2500.00 µg/mL");
        assert_eq!(r.percent_wv_display, "0.25 % w/v");
        assert!(r.molarity_display.is_none());
    }

    #[test]
    fn test_serial_export_csv() {
        let r = calculate_serial_dilution(&batch(3), Some("csv")).unwrap();
        let table = r.export.unwrap();
        let lines: Vec<_> = table.lines().collect();
        assert_eq!(
            lines[0],
            "Step,Concentration,Unit,Transfer Volume,Diluent Volume,Total Volume,Volume Unit"
        );
        assert_eq!(lines[1], "1,1.000e0,M,500.00,500.00,1000.00,µL");
        assert_eq!(lines[2], "2,5.000e-1,M,500.00,500.00,1000.00,µL");
        assert_eq!(lines[3], "3,2.500e-1,M,500.00,500.00,1000.00,µL");
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn test_serial_export_tsv_in_milliliters() {
        let series = chemistry::calculate_serial_dilution_series(
            Quantity::new(10.0, ConcentrationUnit::PercentWv),
            10.0,
            2,
            Quantity::new(1000.0, VolumeUnit::Microliter),
        )
        .unwrap();
        let table = export_serial_dilution(&series, VolumeUnit::Milliliter, ExportFormat::Tsv);
        let lines: Vec<_> = table.lines().collect();
        assert!(lines[0].starts_with("Step\tConcentration\tUnit"));
        assert_eq!(lines[2], "2\t1.000e0\t% w/v\t0.10\t0.90\t1.00\tmL");
    }

    #[test]
    fn test_serial_summary_and_bad_export() {
        let r = calculate_serial_dilution(&batch(6), None).unwrap();
        assert_eq!(r.steps.len(), 6);
        assert!(r.export.is_none());
        assert_eq!(r.concentration_range.as_deref(), Some("1.000e0 M to 3.125e-2 M"));
        assert_eq!(r.total_volume_display.as_deref(), Some("6000.00 µL"));
        assert_eq!(r.transfer_display, "500.00 µL");

        assert!(calculate_serial_dilution(&batch(6), Some("xlsx")).is_err());
        assert!(calculate_serial_dilution(&batch(0), None).is_err());
        assert!(calculate_serial_dilution(&batch(101), None).is_err());
    }

    #[test]
    fn test_antibiotic_prep_from_builtin() {
        let r = calculate_antibiotic_prep(&AntibioticsFields {
            antibiotic: "Ampicillin".to_string(),
            stock_concentration: None,
            stock_unit: None,
            working_concentration: None,
            working_unit: None,
            final_volume: 500.0,
            volume_unit: "mL".to_string(),
            plate_volume: Some(25.0),
            plate_unit: None,
            precision: Some(3),
        })
        .unwrap();
        assert_eq!(r.stock_display, "0.500 mL");
        assert_eq!(r.medium_display, "499.500 mL");
        assert_eq!(r.per_plate_display.as_deref(), Some("0.025 mL"));
        assert!(r.warning.is_none());
    }

    #[test]
    fn test_list_antibiotic_presets() {
        let r = list_antibiotic_presets();
        assert_eq!(r.presets.len(), 5);
        assert_eq!(r.presets[2].name, "Chloramphenicol");
    }

    #[test]
    fn test_precision_is_clamped() {
        assert_eq!(precision_or_default(None), DEFAULT_PRECISION);
        assert_eq!(precision_or_default(Some(12)), MAX_PRECISION);
        assert_eq!(precision_or_default(Some(0)), 0);
    }
}
