//! Firebase project provisioning.
//!
//! ## FirebaseProjectModule
//!
//! Stands up a Google Cloud project with Firebase support end to end:
//! project creation, API enablement, IAM grants, Firebase registration,
//! and web app setup. The enabled-API set and label map are composed with
//! [`crate::compose`] before anything reaches the resource layer, so every
//! provisioned project carries the Firebase baseline services and the
//! `firebase: enabled` marker label.
//!
//! ### Parameters
//!
//! | Parameter | Required | Description |
//! |-----------|----------|-------------|
//! | `project_id` | Yes | Project id (unique, immutable) |
//! | `name` | No | Display name (default: project id) |
//! | `state` | No | Desired state: present, absent (default: present) |
//! | `billing_account` | No | Billing account to attach |
//! | `org_id` | No | Parent organization id |
//! | `folder_id` | No | Parent folder id |
//! | `labels` | No | Labels as key-value pairs |
//! | `activate_apis` | No | Additional services to enable |
//! | `iam` | No | Mapping of role to member list |
//! | `web_apps` | No | Web apps to register |
//! | `custom_domains` | No | Mapping of app name to custom domains |
//!
//! ### Example
//!
//! ```yaml
//! - firebase_project:
//!     project_id: acme-prod
//!     name: Acme Production
//!     billing_account: 01AB23-CD45EF-67GH89
//!     org_id: "123456789"
//!     labels:
//!       team: infra
//!     activate_apis:
//!       - compute.googleapis.com
//!     iam:
//!       roles/viewer:
//!         - group:devs@acme.example
//!     web_apps:
//!       - frontend
//!     custom_domains:
//!       frontend:
//!         - acme.example
//! ```

use super::webapps::{configure_web_apps, WebAppsRequest};
use super::{
    Module, ModuleContext, ModuleError, ModuleOutput, ModuleParams, ModuleResult, ParamExt,
};
use crate::compose::{compose_apis, compose_labels};
use crate::orchestrator::{Orchestrator, ProjectConfig};
use indexmap::IndexMap;
use std::sync::Arc;

/// Desired state of the project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProjectState {
    /// Project should exist with Firebase enabled
    #[default]
    Present,
    /// Project should not exist
    Absent,
}

impl ProjectState {
    fn from_str(s: &str) -> ModuleResult<Self> {
        match s.to_lowercase().as_str() {
            "present" | "created" => Ok(ProjectState::Present),
            "absent" | "deleted" => Ok(ProjectState::Absent),
            _ => Err(ModuleError::InvalidParameter(format!(
                "Invalid state '{}'. Valid states: present, absent",
                s
            ))),
        }
    }
}

/// Firebase project configuration
#[derive(Debug, Clone)]
struct FirebaseProjectParams {
    project_id: String,
    display_name: String,
    state: ProjectState,
    billing_account: Option<String>,
    org_id: Option<String>,
    folder_id: Option<String>,
    labels: IndexMap<String, String>,
    activate_apis: Vec<String>,
    iam: IndexMap<String, Vec<String>>,
    web_apps: Vec<String>,
    custom_domains: IndexMap<String, Vec<String>>,
}

impl FirebaseProjectParams {
    fn from_params(params: &ModuleParams) -> ModuleResult<Self> {
        let project_id = params.get_string_required("project_id")?;

        let state = if let Some(s) = params.get_string("state")? {
            ProjectState::from_str(&s)?
        } else {
            ProjectState::default()
        };

        Ok(Self {
            display_name: params
                .get_string("name")?
                .unwrap_or_else(|| project_id.clone()),
            project_id,
            state,
            billing_account: params.get_string("billing_account")?,
            org_id: params.get_string("org_id")?,
            folder_id: params.get_string("folder_id")?,
            labels: params.get_string_map("labels")?.unwrap_or_default(),
            activate_apis: params.get_vec_string("activate_apis")?.unwrap_or_default(),
            iam: params.get_string_list_map("iam")?.unwrap_or_default(),
            web_apps: params.get_vec_string("web_apps")?.unwrap_or_default(),
            custom_domains: params
                .get_string_list_map("custom_domains")?
                .unwrap_or_default(),
        })
    }

    fn project_config(&self) -> ProjectConfig {
        ProjectConfig {
            display_name: Some(self.display_name.clone()),
            billing_account: self.billing_account.clone(),
            org_id: self.org_id.clone(),
            folder_id: self.folder_id.clone(),
            // Firebase registration and anything after it is billed to the
            // project itself, not the caller.
            user_project_override: true,
        }
    }
}

/// Firebase project module
pub struct FirebaseProjectModule;

impl FirebaseProjectModule {
    async fn execute_async(
        &self,
        params: &ModuleParams,
        context: &ModuleContext,
    ) -> ModuleResult<ModuleOutput> {
        let config = FirebaseProjectParams::from_params(params)?;
        let orchestrator = context.orchestrator();

        let existing = orchestrator.find_project(&config.project_id).await?;

        match config.state {
            ProjectState::Present => {
                self.ensure_present(&config, orchestrator, existing.is_some(), context)
                    .await
            }
            ProjectState::Absent => {
                self.ensure_absent(&config, orchestrator, existing.is_some(), context)
                    .await
            }
        }
    }

    async fn ensure_present(
        &self,
        config: &FirebaseProjectParams,
        orchestrator: Arc<dyn Orchestrator + Send + Sync>,
        exists: bool,
        context: &ModuleContext,
    ) -> ModuleResult<ModuleOutput> {
        if exists {
            return Ok(ModuleOutput::ok(format!(
                "Project '{}' already exists",
                config.project_id
            )));
        }

        if context.check_mode {
            return Ok(ModuleOutput::changed(format!(
                "Would provision Firebase project '{}'",
                config.project_id
            )));
        }

        let labels = compose_labels(config.labels.clone());
        let apis = compose_apis(&config.activate_apis);

        let project = orchestrator
            .create_project(&config.project_id, &apis, &labels, &config.project_config())
            .await?;

        let services = orchestrator
            .enable_services(&config.project_id, &apis)
            .await?;

        // IAM grants and Firebase registration both need the services
        // enabled first.
        let mut iam_handles = Vec::new();
        for (role, members) in &config.iam {
            for member in members {
                iam_handles.push(
                    orchestrator
                        .add_iam_member(&config.project_id, role, member)
                        .await?,
                );
            }
        }

        let firebase = orchestrator
            .create_firebase_project(&config.project_id)
            .await?;

        let web_apps = configure_web_apps(
            orchestrator.as_ref(),
            &WebAppsRequest {
                project_id: config.project_id.clone(),
                web_apps: config.web_apps.clone(),
                custom_domains: config.custom_domains.clone(),
            },
        )
        .await?;

        Ok(ModuleOutput::changed(format!(
            "Provisioned Firebase project '{}'",
            config.project_id
        ))
        .with_data("project", serde_json::to_value(&project).unwrap_or_default())
        .with_data(
            "services",
            serde_json::to_value(&services).unwrap_or_default(),
        )
        .with_data("iam", serde_json::to_value(&iam_handles).unwrap_or_default())
        .with_data(
            "firebase",
            serde_json::to_value(&firebase).unwrap_or_default(),
        )
        .with_data(
            "web_apps",
            serde_json::to_value(&web_apps).unwrap_or_default(),
        ))
    }

    async fn ensure_absent(
        &self,
        config: &FirebaseProjectParams,
        orchestrator: Arc<dyn Orchestrator + Send + Sync>,
        exists: bool,
        context: &ModuleContext,
    ) -> ModuleResult<ModuleOutput> {
        if !exists {
            return Ok(ModuleOutput::ok(format!(
                "Project '{}' does not exist",
                config.project_id
            )));
        }

        if context.check_mode {
            return Ok(ModuleOutput::changed(format!(
                "Would delete project '{}'",
                config.project_id
            )));
        }

        orchestrator.delete_project(&config.project_id).await?;

        Ok(ModuleOutput::changed(format!(
            "Deleted project '{}'",
            config.project_id
        )))
    }
}

impl Module for FirebaseProjectModule {
    fn name(&self) -> &'static str {
        "firebase_project"
    }

    fn description(&self) -> &'static str {
        "Provision a Google Cloud project with Firebase enabled"
    }

    fn required_params(&self) -> &[&'static str] {
        &["project_id"]
    }

    fn validate_params(&self, params: &ModuleParams) -> ModuleResult<()> {
        let project_id = params.get_string_required("project_id")?;
        if project_id.is_empty() {
            return Err(ModuleError::InvalidParameter(
                "project_id must not be empty".to_string(),
            ));
        }

        if let Some(state) = params.get_string("state")? {
            ProjectState::from_str(&state)?;
        }

        Ok(())
    }

    fn execute(
        &self,
        params: &ModuleParams,
        context: &ModuleContext,
    ) -> ModuleResult<ModuleOutput> {
        let handle = tokio::runtime::Handle::try_current()
            .map_err(|_| ModuleError::ExecutionFailed("No tokio runtime available".to_string()))?;

        let params = params.clone();
        let context = context.clone();
        let module = self;

        std::thread::scope(|s| {
            s.spawn(|| handle.block_on(module.execute_async(&params, &context)))
                .join()
                .unwrap()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::{MockOrchestrator, ProjectInfo, ResourceHandle};
    use chrono::Utc;
    use mockall::Sequence;

    fn handle(resource_type: &str, name: &str) -> ResourceHandle {
        ResourceHandle {
            id: "1".to_string(),
            name: name.to_string(),
            resource_type: resource_type.to_string(),
            self_link: String::new(),
            created_at: Utc::now(),
        }
    }

    fn project_info(project_id: &str, labels: IndexMap<String, String>) -> ProjectInfo {
        ProjectInfo {
            project_id: project_id.to_string(),
            number: "000000000000".to_string(),
            display_name: project_id.to_string(),
            labels,
            enabled_services: Vec::new(),
            handle: handle("project", project_id),
        }
    }

    fn base_params(project_id: &str) -> ModuleParams {
        let mut params = ModuleParams::new();
        params.insert("project_id".to_string(), serde_json::json!(project_id));
        params
    }

    #[tokio::test]
    async fn test_ensure_present_sequences_provider_calls() {
        let mut seq = Sequence::new();
        let mut orch = MockOrchestrator::new();

        orch.expect_find_project()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(None));
        orch.expect_create_project()
            .times(1)
            .in_sequence(&mut seq)
            .withf(|project_id, apis, labels, config| {
                project_id == "acme"
                    // composed: requested first, baseline appended, deduplicated
                    && apis.first().map(String::as_str) == Some("custom.api.example.com")
                    && apis.iter().filter(|a| *a == "run.googleapis.com").count() == 1
                    && labels.get("firebase").map(String::as_str) == Some("enabled")
                    && labels.get("team").map(String::as_str) == Some("infra")
                    && config.user_project_override
            })
            .returning(|project_id, _, labels, _| Ok(project_info(project_id, labels.clone())));
        orch.expect_enable_services()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|project_id, _| Ok(handle("project-services", project_id)));
        orch.expect_add_iam_member()
            .times(1)
            .in_sequence(&mut seq)
            .withf(|_, role, member| role == "roles/viewer" && member == "group:devs@acme.example")
            .returning(|_, _, member| Ok(handle("iam-member", member)));
        orch.expect_create_firebase_project()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|project_id| Ok(handle("firebase-project", project_id)));

        let mut params = base_params("acme");
        params.insert(
            "labels".to_string(),
            serde_json::json!({"team": "infra", "firebase": "disabled"}),
        );
        params.insert(
            "activate_apis".to_string(),
            serde_json::json!(["custom.api.example.com", "run.googleapis.com"]),
        );
        params.insert(
            "iam".to_string(),
            serde_json::json!({"roles/viewer": ["group:devs@acme.example"]}),
        );

        let context = ModuleContext::new().with_orchestrator(Arc::new(orch));
        let output = FirebaseProjectModule
            .execute_async(&params, &context)
            .await
            .unwrap();

        assert!(output.changed);
        assert!(output.data.contains_key("project"));
        assert!(output.data.contains_key("firebase"));
    }

    #[tokio::test]
    async fn test_ensure_present_existing_project_is_unchanged() {
        let mut orch = MockOrchestrator::new();
        orch.expect_find_project()
            .returning(|project_id| Ok(Some(project_info(project_id, IndexMap::new()))));
        orch.expect_create_project().never();

        let context = ModuleContext::new().with_orchestrator(Arc::new(orch));
        let output = FirebaseProjectModule
            .execute_async(&base_params("acme"), &context)
            .await
            .unwrap();

        assert!(!output.changed);
    }

    #[tokio::test]
    async fn test_check_mode_makes_no_provider_mutations() {
        let mut orch = MockOrchestrator::new();
        orch.expect_find_project().returning(|_| Ok(None));
        orch.expect_create_project().never();
        orch.expect_enable_services().never();

        let context = ModuleContext::new()
            .with_check_mode(true)
            .with_orchestrator(Arc::new(orch));
        let output = FirebaseProjectModule
            .execute_async(&base_params("acme"), &context)
            .await
            .unwrap();

        assert!(output.changed);
        assert!(output.msg.contains("Would provision"));
    }

    #[tokio::test]
    async fn test_ensure_absent_deletes_existing_project() {
        let mut seq = Sequence::new();
        let mut orch = MockOrchestrator::new();
        orch.expect_find_project()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|project_id| Ok(Some(project_info(project_id, IndexMap::new()))));
        orch.expect_delete_project()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));

        let mut params = base_params("acme");
        params.insert("state".to_string(), serde_json::json!("absent"));

        let context = ModuleContext::new().with_orchestrator(Arc::new(orch));
        let output = FirebaseProjectModule
            .execute_async(&params, &context)
            .await
            .unwrap();

        assert!(output.changed);
    }

    #[test]
    fn test_project_state_from_str() {
        assert_eq!(
            ProjectState::from_str("present").unwrap(),
            ProjectState::Present
        );
        assert_eq!(
            ProjectState::from_str("absent").unwrap(),
            ProjectState::Absent
        );
        assert_eq!(
            ProjectState::from_str("deleted").unwrap(),
            ProjectState::Absent
        );
        assert!(ProjectState::from_str("invalid").is_err());
    }

    #[test]
    fn test_module_metadata() {
        let module = FirebaseProjectModule;
        assert_eq!(module.name(), "firebase_project");
        assert_eq!(module.required_params(), &["project_id"]);
    }

    #[test]
    fn test_params_parsing() {
        let mut params = ModuleParams::new();
        params.insert("project_id".to_string(), serde_json::json!("acme-prod"));
        params.insert(
            "billing_account".to_string(),
            serde_json::json!("01AB23-CD45EF-67GH89"),
        );
        params.insert(
            "labels".to_string(),
            serde_json::json!({"team": "infra", "env": "prod"}),
        );
        params.insert(
            "activate_apis".to_string(),
            serde_json::json!(["compute.googleapis.com"]),
        );

        let config = FirebaseProjectParams::from_params(&params).unwrap();
        assert_eq!(config.project_id, "acme-prod");
        assert_eq!(config.display_name, "acme-prod");
        assert_eq!(config.state, ProjectState::Present);
        assert_eq!(config.labels.get("team"), Some(&"infra".to_string()));
        assert_eq!(config.activate_apis, vec!["compute.googleapis.com"]);
    }

    #[test]
    fn test_params_parsing_iam() {
        let mut params = ModuleParams::new();
        params.insert("project_id".to_string(), serde_json::json!("acme-prod"));
        params.insert(
            "iam".to_string(),
            serde_json::json!({
                "roles/viewer": ["group:devs@acme.example"],
                "roles/editor": ["user:rel@acme.example"]
            }),
        );

        let config = FirebaseProjectParams::from_params(&params).unwrap();
        assert_eq!(config.iam.len(), 2);
        assert_eq!(
            config.iam.get("roles/viewer").unwrap(),
            &vec!["group:devs@acme.example".to_string()]
        );
    }

    #[test]
    fn test_project_config_forces_user_project_override() {
        let mut params = ModuleParams::new();
        params.insert("project_id".to_string(), serde_json::json!("acme-prod"));

        let config = FirebaseProjectParams::from_params(&params).unwrap();
        assert!(config.project_config().user_project_override);
    }

    #[test]
    fn test_validate_params_missing_project_id() {
        let module = FirebaseProjectModule;
        let params = ModuleParams::new();
        assert!(module.validate_params(&params).is_err());
    }

    #[test]
    fn test_validate_params_invalid_state() {
        let module = FirebaseProjectModule;
        let mut params = ModuleParams::new();
        params.insert("project_id".to_string(), serde_json::json!("acme-prod"));
        params.insert("state".to_string(), serde_json::json!("paused"));
        assert!(module.validate_params(&params).is_err());
    }
}
