//! Lab Calculator Tools module
//!
//! MCP tool implementations for the lab calculator.

pub mod calculators;
pub mod presets;
pub mod status;
