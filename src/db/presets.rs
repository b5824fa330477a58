//! Preset storage
//!
//! Named calculator inputs, scoped by calculator kind.

use crate::models::{CalculatorKind, Preset, PresetFields, PresetMetadata};

use super::connection::{Database, DbError, DbResult};

/// Storage for saved calculator presets
pub trait PresetRepository {
    /// Save a preset and return its ID
    fn save(&self, scope: CalculatorKind, name: &str, fields: &PresetFields) -> DbResult<i64>;

    /// List presets for a calculator, newest first
    fn list(&self, scope: CalculatorKind) -> DbResult<Vec<PresetMetadata>>;

    /// Load a preset; None when it does not exist in this scope
    fn load(&self, scope: CalculatorKind, id: i64) -> DbResult<Option<Preset>>;

    /// Delete a preset; false when nothing was removed
    fn delete(&self, scope: CalculatorKind, id: i64) -> DbResult<bool>;
}

/// SQLite-backed preset repository
#[derive(Clone)]
pub struct SqlitePresetStore {
    database: Database,
}

impl SqlitePresetStore {
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    /// Number of presets across all calculators
    pub fn count(&self) -> DbResult<i64> {
        self.database.with_conn(Preset::count)
    }
}

impl PresetRepository for SqlitePresetStore {
    fn save(&self, scope: CalculatorKind, name: &str, fields: &PresetFields) -> DbResult<i64> {
        if fields.kind() != scope {
            return Err(DbError::InvalidPreset(format!(
                "Fields are for the {} calculator, not {}",
                fields.kind().as_str(),
                scope.as_str()
            )));
        }

        let preset = self
            .database
            .with_conn(|conn| Preset::create(conn, name, fields))?;

        tracing::info!(
            "Saved preset '{}' for {} (id {})",
            preset.name,
            scope.as_str(),
            preset.id
        );
        Ok(preset.id)
    }

    fn list(&self, scope: CalculatorKind) -> DbResult<Vec<PresetMetadata>> {
        self.database.with_conn(|conn| Preset::list(conn, scope))
    }

    fn load(&self, scope: CalculatorKind, id: i64) -> DbResult<Option<Preset>> {
        self.database
            .with_conn(|conn| Preset::get_by_id(conn, scope, id))
    }

    fn delete(&self, scope: CalculatorKind, id: i64) -> DbResult<bool> {
        let deleted = self
            .database
            .with_conn(|conn| Preset::delete(conn, scope, id))?;
        if deleted {
            tracing::info!("Deleted preset {} from {}", id, scope.as_str());
        }
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BatchFields, ConcentrationFields, DilutionFields};
    use tempfile::TempDir;

    fn store() -> (TempDir, SqlitePresetStore) {
        let dir = tempfile::tempdir().unwrap();
        let database = Database::open_migrated(dir.path().join("labcalc.db")).unwrap();
        (dir, SqlitePresetStore::new(database))
    }

    fn dilution(final_volume: f64) -> PresetFields {
        PresetFields::Dilution(DilutionFields {
            stock_concentration: 10.0,
            stock_unit: "mg/mL".to_string(),
            final_concentration: 100.0,
            final_unit: "µg/mL".to_string(),
            final_volume,
            volume_unit: "mL".to_string(),
            molecular_weight: None,
            precision: None,
        })
    }

    #[test]
    fn test_save_list_load_delete() {
        let (_dir, store) = store();

        let first = store
            .save(CalculatorKind::Dilution, "Working stock", &dilution(50.0))
            .unwrap();
        let second = store
            .save(CalculatorKind::Dilution, "Large batch", &dilution(500.0))
            .unwrap();

        let listed = store.list(CalculatorKind::Dilution).unwrap();
        let ids: Vec<_> = listed.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![second, first]);
        assert_eq!(listed[1].name, "Working stock");
        assert_eq!(listed[0].calculator, CalculatorKind::Dilution);

        let loaded = store.load(CalculatorKind::Dilution, first).unwrap().unwrap();
        assert_eq!(loaded.fields, dilution(50.0));

        assert!(store.delete(CalculatorKind::Dilution, first).unwrap());
        assert!(!store.delete(CalculatorKind::Dilution, first).unwrap());
        assert!(store.load(CalculatorKind::Dilution, first).unwrap().is_none());
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_scope_isolation() {
        let (_dir, store) = store();
        let id = store
            .save(CalculatorKind::Dilution, "Working stock", &dilution(50.0))
            .unwrap();

        assert!(store.load(CalculatorKind::Molarity, id).unwrap().is_none());
        assert!(store.list(CalculatorKind::Molarity).unwrap().is_empty());
        assert!(!store.delete(CalculatorKind::Molarity, id).unwrap());
        assert!(store.load(CalculatorKind::Dilution, id).unwrap().is_some());
    }

    #[test]
    fn test_scope_mismatch_is_rejected() {
        let (_dir, store) = store();
        let fields = PresetFields::Concentration(ConcentrationFields {
            mass: 25.0,
            mass_unit: "mg".to_string(),
            volume: 10.0,
            volume_unit: "mL".to_string(),
            molecular_weight: None,
            precision: None,
        });
        let err = store
            .save(CalculatorKind::Batch, "Wrong scope", &fields)
            .unwrap_err();
        assert!(matches!(err, DbError::InvalidPreset(_)));
    }

    #[test]
    fn test_blank_name_is_rejected() {
        let (_dir, store) = store();
        let fields = PresetFields::Batch(BatchFields {
            start_concentration: 1.0,
            start_unit: "M".to_string(),
            dilution_factor: 2.0,
            steps: 6,
            volume_per_step: 1000.0,
            volume_unit: "µL".to_string(),
            precision: None,
        });
        let err = store.save(CalculatorKind::Batch, "   ", &fields).unwrap_err();
        assert!(matches!(err, DbError::InvalidPreset(_)));
        assert_eq!(store.count().unwrap(), 0);
    }
}
