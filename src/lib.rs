//! # Firelift - Firebase Project Provisioning for Google Cloud
//!
//! Firelift is an async-first toolkit for standing up Google Cloud projects
//! with Firebase enabled: project bootstrap (API enablement, labels, IAM),
//! web app registration, hosting sites, and custom domains.
//!
//! ## Core Concepts
//!
//! - **Blueprints**: YAML-defined lists of projects to provision
//! - **Modules**: Units of work that provision a project or its web apps
//! - **Composition**: Pure transforms that resolve the enabled-API set and
//!   label map before anything reaches the resource layer
//! - **Orchestrator**: The boundary trait behind which all provider calls live
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                      CLI Interface                       │
//! │                (clap-based command parsing)              │
//! └─────────────────────────────────────────────────────────┘
//!                             │
//!                             ▼
//! ┌─────────────────────────────────────────────────────────┐
//! │            Blueprint → Module Registry dispatch          │
//! └─────────────────────────────────────────────────────────┘
//!                             │
//!               ┌─────────────┴─────────────┐
//!               ▼                           ▼
//! ┌───────────────────────────┐ ┌───────────────────────────┐
//! │      compose (pure)       │ │   modules (async work)    │
//! │  API set + label map      │ │  project, web apps        │
//! └───────────────────────────┘ └───────────────────────────┘
//!                                           │
//!                                           ▼
//! ┌─────────────────────────────────────────────────────────┐
//! │              Orchestrator (resource layer)               │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Example
//!
//! ```rust,ignore
//! use firelift::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let blueprint = Blueprint::from_file("blueprint.yml")?;
//!     let registry = ModuleRegistry::with_builtins();
//!     let context = ModuleContext::new()
//!         .with_orchestrator(std::sync::Arc::new(GcpOrchestrator::new()));
//!
//!     for project in &blueprint.projects {
//!         let output = registry.execute("firebase_project", &project.to_params(), &context)?;
//!         println!("{}: {}", output.status, output.msg);
//!     }
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Re-export commonly used items in prelude
pub mod prelude {
    //! Convenient re-exports of commonly used types and traits.

    // Composition
    pub use crate::compose::{
        compose_apis, compose_labels, FIREBASE_BASELINE_SERVICES, FIREBASE_LABEL_KEY,
        FIREBASE_LABEL_VALUE,
    };

    // Blueprints
    pub use crate::blueprint::{Blueprint, ProjectEntry};

    // Configuration
    pub use crate::config::Config;

    // Error handling
    pub use crate::error::{Error, Result};

    // Module system
    pub use crate::modules::{
        Module, ModuleContext, ModuleOutput, ModuleRegistry, ModuleResult, ModuleStatus,
    };

    // Orchestrator boundary
    pub use crate::orchestrator::{
        GcpOrchestrator, Orchestrator, OrchestratorError, OrchestratorResult, ProjectConfig,
        ProjectInfo, ResourceHandle,
    };
}

/// Error types and result aliases for Firelift operations.
pub mod error;

/// Pure composition of the enabled-API set and label map.
///
/// These transforms run before every provisioning call: the requested
/// service list is merged with the Firebase baseline, and the label map is
/// stamped with the `firebase: enabled` marker.
pub mod compose;

/// Blueprint parsing and representation.
///
/// Blueprints are YAML files listing the projects to provision, each entry
/// mapping onto one `firebase_project` module invocation.
pub mod blueprint;

/// Configuration management for Firelift behavior.
///
/// Handles loading and merging configuration from a TOML file and
/// environment variables.
pub mod config;

/// Built-in module implementations for provisioning work.
///
/// Modules are the workhorses of Firelift:
///
/// - `firebase_project`: provision a GCP project with Firebase enabled
/// - `firebase_web_apps`: register web apps, hosting sites, and domains
///
/// Custom modules can be added by implementing the
/// [`Module`](modules::Module) trait.
pub mod modules;

/// The resource-orchestration boundary.
///
/// All provider interaction happens behind the
/// [`Orchestrator`](orchestrator::Orchestrator) trait; the in-tree
/// implementation simulates GCP so blueprints can be exercised without
/// credentials.
pub mod orchestrator;

/// Returns the current version of Firelift.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
