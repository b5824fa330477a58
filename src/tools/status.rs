//! Lab Calculator Status Tool
//!
//! Provides runtime status information and the usage guide.

use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use sysinfo::{Pid, ProcessesToUpdate, System};

use crate::build_info::BuildInfo;

/// Calculator usage guide for AI assistants
pub const CALCULATOR_INSTRUCTIONS: &str = r#"
# Lab Calculator Instructions

Tools for preparing solutions at the bench. Every calculator takes plain
numbers plus unit symbols, validates them, and returns raw values alongside
`display` strings rounded to `precision` decimals (0 to 6, default 2).

---

## Accepted Units

| Kind | Symbols |
|------|---------|
| Mass | g, mg, µg, ng |
| Volume | L, mL, µL, nL |
| Molarity | M, mM, µM, nM |
| Mass/volume | mg/mL, µg/mL, ng/mL |
| Percent | % w/v |

`u` and the Greek `μ` are accepted for micro (`uL`, `μM`). Molar symbols are
case-sensitive: `mM` is millimolar, `M` is molar.

Any number that is zero, negative or not finite is rejected, and an unknown
unit is reported by field name. Nothing is silently defaulted.

---

## Calculators

### calculate_molarity
Mass to weigh out: **mass (g) = M × L × MW**

```
calculate_molarity(molecular_weight: 180.16, concentration: 50,
                   concentration_unit: "mM", volume: 100, volume_unit: "mL")
→ 900.80 mg
```

### calculate_dilution
C₁V₁ = C₂V₂. Returns stock and diluent volumes in the final volume's unit.

- Both concentrations in the same family work directly.
- Mass/volume and % w/v mix freely (1 % w/v = 10 mg/mL).
- Molar against mass/volume needs `molecular_weight` (M × MW = mg/mL).
- If the final concentration is not below the stock, the result carries
  `is_valid: false` and a `warning`. Volumes never go negative.

### calculate_reconstitution
Solvent to add to a powder to reach a target concentration. A molar target
requires `molecular_weight`. The headline volume is shown in L, mL or µL,
whichever reads best.

### calculate_concentration
Concentration of a mass dissolved in a volume: mg/mL, µg/mL and % w/v,
plus molarity when `molecular_weight` is given.

### calculate_serial_dilution
Fixed-volume series: every tube holds `volume_per_step`, receiving
`volume_per_step / dilution_factor` from the tube before it.

- `dilution_factor` must be greater than 1
- `steps` must be between 1 and 100
- Pass `export: "csv"` or `export: "tsv"` for a table you can paste into a
  spreadsheet

### calculate_antibiotic_prep
Antibiotic stock to add to medium. Built-in antibiotics fill in their usual
stock and working concentrations; call `list_antibiotic_presets` to see them.
Use `antibiotic: "Custom"` and pass both concentrations for anything else.
Add `plate_volume` to get the stock needed per plate.

---

## Presets

Save inputs you use often, scoped per calculator
(`molarity`, `dilution`, `reconstitution`, `concentration`, `antibiotics`,
`batch`):

```
save_preset(calculator: "dilution", name: "Working stock",
            fields: { stock_concentration: 10, stock_unit: "mg/mL", ... })
list_presets(calculator: "dilution")
load_preset(calculator: "dilution", id: 3)
delete_preset(calculator: "dilution", id: 3)
```

`fields` uses the same names as the calculator's parameters. Presets are
validated before they are stored.
"#;

/// Runtime status of the lab calculator service
#[derive(Debug, Clone, Serialize)]
pub struct LabStatus {
    /// Build information
    pub build_number: u64,
    pub build_timestamp: &'static str,
    pub version: &'static str,

    /// Database information
    pub database_path: String,
    pub database_size_bytes: Option<u64>,
    pub preset_count: Option<i64>,

    /// Process information
    pub uptime_seconds: u64,
    pub process_id: u32,
    pub memory_usage_bytes: u64,
}

/// Status tracker for collecting runtime information
pub struct StatusTracker {
    start_time: Instant,
    database_path: PathBuf,
}

impl StatusTracker {
    /// Create a new status tracker
    pub fn new(database_path: PathBuf) -> Self {
        Self {
            start_time: Instant::now(),
            database_path,
        }
    }

    /// Get the current status
    pub fn get_status(&self, preset_count: Option<i64>) -> LabStatus {
        let build_info = BuildInfo::current();

        let database_size_bytes = std::fs::metadata(&self.database_path)
            .ok()
            .map(|m| m.len());

        let pid = std::process::id();
        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::Some(&[Pid::from_u32(pid)]));

        let memory_usage_bytes = sys
            .process(Pid::from_u32(pid))
            .map(|p| p.memory())
            .unwrap_or(0);

        LabStatus {
            build_number: build_info.build_number,
            build_timestamp: build_info.build_timestamp,
            version: build_info.version,
            database_path: self.database_path.display().to_string(),
            database_size_bytes,
            preset_count,
            uptime_seconds: self.start_time.elapsed().as_secs(),
            process_id: pid,
            memory_usage_bytes,
        }
    }
}
