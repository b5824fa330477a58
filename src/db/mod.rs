//! Database module
//!
//! Handles SQLite connection, migrations and preset storage.

pub mod connection;
pub mod migrations;
pub mod presets;

pub use connection::{Database, DbError, DbResult};
pub use presets::{PresetRepository, SqlitePresetStore};
