//! Error types for Firelift.
//!
//! This module defines the crate-level error type used by the blueprint
//! layer and the CLI. Module and orchestrator errors carry their own types
//! ([`crate::modules::ModuleError`], [`crate::orchestrator::OrchestratorError`])
//! and are wrapped with context when they cross into this one.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Firelift operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for Firelift.
#[derive(Error, Debug)]
pub enum Error {
    /// Error parsing a blueprint file.
    #[error("Failed to parse blueprint '{path}': {message}")]
    BlueprintParse {
        /// Path to the blueprint file
        path: PathBuf,
        /// Error message
        message: String,
        /// Source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Error validating blueprint structure.
    #[error("Blueprint validation failed: {0}")]
    BlueprintValidation(String),

    /// Module execution failed.
    #[error("Module '{module}' execution failed: {message}")]
    ModuleExecution {
        /// Module name
        module: String,
        /// Error message
        message: String,
    },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
