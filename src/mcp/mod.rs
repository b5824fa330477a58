//! MCP server module

pub mod server;

pub use server::LabCalcService;
