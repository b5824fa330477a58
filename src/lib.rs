//! Lab Calculator Library
//!
//! Dilution math for the lab bench, with preset storage and an MCP server.

pub mod build_info;
pub mod chemistry;
pub mod db;
pub mod mcp;
pub mod models;
pub mod tools;
