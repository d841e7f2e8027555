//! Module system for Firelift
//!
//! This module provides the core traits, types, and registry for the
//! Firelift module system. Modules are the building blocks that provision
//! cloud resources through the orchestrator boundary.

pub mod project;
pub mod webapps;

use crate::orchestrator::{Orchestrator, OrchestratorError};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur during module execution
#[derive(Error, Debug)]
pub enum ModuleError {
    #[error("Module not found: {0}")]
    NotFound(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    #[error("Execution failed: {0}")]
    ExecutionFailed(String),

    #[error(transparent)]
    Orchestrator(#[from] OrchestratorError),
}

/// Result type for module operations
pub type ModuleResult<T> = Result<T, ModuleError>;

/// Status of a module execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleStatus {
    /// Module executed successfully and made changes
    Changed,
    /// Module executed successfully but no changes were needed
    Ok,
    /// Module execution failed
    Failed,
    /// Module was skipped
    Skipped,
}

impl fmt::Display for ModuleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModuleStatus::Changed => write!(f, "changed"),
            ModuleStatus::Ok => write!(f, "ok"),
            ModuleStatus::Failed => write!(f, "failed"),
            ModuleStatus::Skipped => write!(f, "skipped"),
        }
    }
}

/// Hints for how a module can be parallelized across projects.
///
/// A runner uses these hints to determine safe concurrency levels when a
/// blueprint provisions many projects at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ParallelizationHint {
    /// Safe to run simultaneously across all projects.
    #[default]
    FullyParallel,

    /// Network rate-limited operations.
    /// Cloud provider APIs enforce per-caller quotas.
    RateLimited {
        /// Maximum requests per second across the whole run
        requests_per_second: u32,
    },

    /// Requires exclusive access across the entire run.
    /// Example: organization-level policy changes.
    GlobalExclusive,
}

/// Result of a module execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleOutput {
    /// Whether the module changed anything
    pub changed: bool,
    /// Human-readable message about what happened
    pub msg: String,
    /// Status of the execution
    pub status: ModuleStatus,
    /// Additional data returned by the module
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub data: HashMap<String, serde_json::Value>,
}

impl ModuleOutput {
    /// Create a new successful output with no changes
    pub fn ok(msg: impl Into<String>) -> Self {
        Self {
            changed: false,
            msg: msg.into(),
            status: ModuleStatus::Ok,
            data: HashMap::new(),
        }
    }

    /// Create a new successful output with changes
    pub fn changed(msg: impl Into<String>) -> Self {
        Self {
            changed: true,
            msg: msg.into(),
            status: ModuleStatus::Changed,
            data: HashMap::new(),
        }
    }

    /// Create a failed output
    pub fn failed(msg: impl Into<String>) -> Self {
        Self {
            changed: false,
            msg: msg.into(),
            status: ModuleStatus::Failed,
            data: HashMap::new(),
        }
    }

    /// Create a skipped output
    pub fn skipped(msg: impl Into<String>) -> Self {
        Self {
            changed: false,
            msg: msg.into(),
            status: ModuleStatus::Skipped,
            data: HashMap::new(),
        }
    }

    /// Add data to the output
    pub fn with_data(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.data.insert(key.into(), value);
        self
    }
}

/// Parameters passed to a module
pub type ModuleParams = HashMap<String, serde_json::Value>;

/// Context for module execution
#[derive(Clone, Default)]
pub struct ModuleContext {
    /// Whether to run in check mode (dry run)
    pub check_mode: bool,
    /// Variables available to the module
    pub vars: HashMap<String, serde_json::Value>,
    /// Resource layer to provision through; a simulated GCP layer is used
    /// when none is set
    pub orchestrator: Option<Arc<dyn Orchestrator + Send + Sync>>,
}

impl std::fmt::Debug for ModuleContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleContext")
            .field("check_mode", &self.check_mode)
            .field("vars", &self.vars)
            .field(
                "orchestrator",
                &self.orchestrator.as_ref().map(|o| o.identifier().to_string()),
            )
            .finish()
    }
}

impl ModuleContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_check_mode(mut self, check_mode: bool) -> Self {
        self.check_mode = check_mode;
        self
    }

    pub fn with_vars(mut self, vars: HashMap<String, serde_json::Value>) -> Self {
        self.vars = vars;
        self
    }

    pub fn with_orchestrator(
        mut self,
        orchestrator: Arc<dyn Orchestrator + Send + Sync>,
    ) -> Self {
        self.orchestrator = Some(orchestrator);
        self
    }

    /// The orchestrator to provision through, falling back to the simulated
    /// GCP layer.
    pub fn orchestrator(&self) -> Arc<dyn Orchestrator + Send + Sync> {
        self.orchestrator
            .clone()
            .unwrap_or_else(|| Arc::new(crate::orchestrator::GcpOrchestrator::new()))
    }
}

/// Trait that all modules must implement
pub trait Module: Send + Sync {
    /// Returns the name of the module
    fn name(&self) -> &'static str;

    /// Returns a description of what the module does
    fn description(&self) -> &'static str;

    /// Returns parallelization hints for a runner.
    ///
    /// Provisioning modules default to rate-limited execution since cloud
    /// provider APIs enforce quotas per caller.
    fn parallelization_hint(&self) -> ParallelizationHint {
        ParallelizationHint::RateLimited {
            requests_per_second: 10,
        }
    }

    /// Execute the module with the given parameters
    fn execute(&self, params: &ModuleParams, context: &ModuleContext)
        -> ModuleResult<ModuleOutput>;

    /// Check what would change without making changes (for check mode)
    fn check(&self, params: &ModuleParams, context: &ModuleContext) -> ModuleResult<ModuleOutput> {
        let check_context = ModuleContext {
            check_mode: true,
            ..context.clone()
        };
        self.execute(params, &check_context)
    }

    /// Validate the parameters before execution
    fn validate_params(&self, params: &ModuleParams) -> ModuleResult<()> {
        let _ = params;
        Ok(())
    }

    /// Returns the list of required parameters
    fn required_params(&self) -> &[&'static str] {
        &[]
    }
}

/// Helper trait for extracting parameters
pub trait ParamExt {
    fn get_string(&self, key: &str) -> ModuleResult<Option<String>>;
    fn get_string_required(&self, key: &str) -> ModuleResult<String>;
    fn get_vec_string(&self, key: &str) -> ModuleResult<Option<Vec<String>>>;
    fn get_string_map(&self, key: &str) -> ModuleResult<Option<IndexMap<String, String>>>;
    fn get_string_list_map(&self, key: &str)
        -> ModuleResult<Option<IndexMap<String, Vec<String>>>>;
}

impl ParamExt for ModuleParams {
    fn get_string(&self, key: &str) -> ModuleResult<Option<String>> {
        match self.get(key) {
            Some(serde_json::Value::String(s)) => Ok(Some(s.clone())),
            Some(serde_json::Value::Null) | None => Ok(None),
            Some(v) => Ok(Some(v.to_string().trim_matches('"').to_string())),
        }
    }

    fn get_string_required(&self, key: &str) -> ModuleResult<String> {
        self.get_string(key)?
            .ok_or_else(|| ModuleError::MissingParameter(key.to_string()))
    }

    fn get_vec_string(&self, key: &str) -> ModuleResult<Option<Vec<String>>> {
        match self.get(key) {
            Some(serde_json::Value::Array(arr)) => {
                let mut result = Vec::new();
                for item in arr {
                    match item {
                        serde_json::Value::String(s) => result.push(s.clone()),
                        v => result.push(v.to_string().trim_matches('"').to_string()),
                    }
                }
                Ok(Some(result))
            }
            Some(serde_json::Value::String(s)) => {
                // Handle comma-separated string
                Ok(Some(s.split(',').map(|s| s.trim().to_string()).collect()))
            }
            Some(serde_json::Value::Null) | None => Ok(None),
            Some(_) => Err(ModuleError::InvalidParameter(format!(
                "{} must be an array",
                key
            ))),
        }
    }

    fn get_string_map(&self, key: &str) -> ModuleResult<Option<IndexMap<String, String>>> {
        match self.get(key) {
            Some(serde_json::Value::Object(obj)) => {
                let mut result = IndexMap::with_capacity(obj.len());
                for (k, v) in obj {
                    match v {
                        serde_json::Value::String(s) => {
                            result.insert(k.clone(), s.clone());
                        }
                        v => {
                            result.insert(k.clone(), v.to_string().trim_matches('"').to_string());
                        }
                    }
                }
                Ok(Some(result))
            }
            Some(serde_json::Value::Null) | None => Ok(None),
            Some(_) => Err(ModuleError::InvalidParameter(format!(
                "{} must be a mapping of strings",
                key
            ))),
        }
    }

    fn get_string_list_map(
        &self,
        key: &str,
    ) -> ModuleResult<Option<IndexMap<String, Vec<String>>>> {
        match self.get(key) {
            Some(serde_json::Value::Object(obj)) => {
                let mut result = IndexMap::with_capacity(obj.len());
                for (k, v) in obj {
                    match v {
                        serde_json::Value::Array(arr) => {
                            let mut items = Vec::with_capacity(arr.len());
                            for item in arr {
                                match item {
                                    serde_json::Value::String(s) => items.push(s.clone()),
                                    v => items.push(v.to_string().trim_matches('"').to_string()),
                                }
                            }
                            result.insert(k.clone(), items);
                        }
                        serde_json::Value::String(s) => {
                            result.insert(k.clone(), vec![s.clone()]);
                        }
                        _ => {
                            return Err(ModuleError::InvalidParameter(format!(
                                "{} entries must be lists of strings",
                                key
                            )))
                        }
                    }
                }
                Ok(Some(result))
            }
            Some(serde_json::Value::Null) | None => Ok(None),
            Some(_) => Err(ModuleError::InvalidParameter(format!(
                "{} must be a mapping of lists",
                key
            ))),
        }
    }
}

/// Registry for looking up modules by name
pub struct ModuleRegistry {
    modules: HashMap<String, Arc<dyn Module>>,
}

impl ModuleRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            modules: HashMap::new(),
        }
    }

    /// Create a registry with all built-in modules
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(project::FirebaseProjectModule));
        registry.register(Arc::new(webapps::FirebaseWebAppsModule));
        registry
    }

    /// Register a module
    pub fn register(&mut self, module: Arc<dyn Module>) {
        self.modules.insert(module.name().to_string(), module);
    }

    /// Get a module by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Module>> {
        self.modules.get(name).cloned()
    }

    /// Check if a module exists
    pub fn contains(&self, name: &str) -> bool {
        self.modules.contains_key(name)
    }

    /// Get all module names
    pub fn names(&self) -> Vec<&str> {
        self.modules.keys().map(|s| s.as_str()).collect()
    }

    /// Execute a module by name
    pub fn execute(
        &self,
        name: &str,
        params: &ModuleParams,
        context: &ModuleContext,
    ) -> ModuleResult<ModuleOutput> {
        let module = self
            .get(name)
            .ok_or_else(|| ModuleError::NotFound(name.to_string()))?;

        // Validate parameters first
        module.validate_params(params)?;

        // Check required parameters
        for param in module.required_params() {
            if !params.contains_key(*param) {
                return Err(ModuleError::MissingParameter((*param).to_string()));
            }
        }

        // Execute based on mode
        if context.check_mode {
            module.check(params, context)
        } else {
            module.execute(params, context)
        }
    }
}

impl Default for ModuleRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestModule;

    impl Module for TestModule {
        fn name(&self) -> &'static str {
            "test"
        }

        fn description(&self) -> &'static str {
            "A test module"
        }

        fn execute(
            &self,
            params: &ModuleParams,
            context: &ModuleContext,
        ) -> ModuleResult<ModuleOutput> {
            if context.check_mode {
                return Ok(ModuleOutput::ok("Would do something"));
            }

            let msg = params
                .get_string("msg")?
                .unwrap_or_else(|| "Hello".to_string());
            Ok(ModuleOutput::changed(msg))
        }
    }

    #[test]
    fn test_module_registry() {
        let mut registry = ModuleRegistry::new();
        registry.register(Arc::new(TestModule));

        assert!(registry.contains("test"));
        assert!(!registry.contains("nonexistent"));

        let module = registry.get("test").unwrap();
        assert_eq!(module.name(), "test");
    }

    #[test]
    fn test_builtin_registry() {
        let registry = ModuleRegistry::with_builtins();
        assert!(registry.contains("firebase_project"));
        assert!(registry.contains("firebase_web_apps"));
    }

    #[test]
    fn test_module_output() {
        let output =
            ModuleOutput::changed("Something changed").with_data("key", serde_json::json!("value"));

        assert!(output.changed);
        assert_eq!(output.status, ModuleStatus::Changed);
        assert!(output.data.contains_key("key"));
    }

    #[test]
    fn test_param_ext() {
        let mut params: ModuleParams = HashMap::new();
        params.insert("string".to_string(), serde_json::json!("hello"));
        params.insert(
            "array".to_string(),
            serde_json::json!(["one", "two", "three"]),
        );
        params.insert(
            "map".to_string(),
            serde_json::json!({"team": "infra", "env": "prod"}),
        );
        params.insert(
            "list_map".to_string(),
            serde_json::json!({"frontend": ["example.com", "www.example.com"]}),
        );

        assert_eq!(
            params.get_string("string").unwrap(),
            Some("hello".to_string())
        );
        assert_eq!(
            params.get_vec_string("array").unwrap(),
            Some(vec![
                "one".to_string(),
                "two".to_string(),
                "three".to_string()
            ])
        );

        let map = params.get_string_map("map").unwrap().unwrap();
        assert_eq!(map.get("team"), Some(&"infra".to_string()));

        let list_map = params.get_string_list_map("list_map").unwrap().unwrap();
        assert_eq!(list_map.get("frontend").unwrap().len(), 2);
    }

    #[test]
    fn test_param_ext_missing_required() {
        let params: ModuleParams = HashMap::new();
        assert!(matches!(
            params.get_string_required("project_id"),
            Err(ModuleError::MissingParameter(_))
        ));
    }
}
