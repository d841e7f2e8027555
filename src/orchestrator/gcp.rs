//! Simulated GCP/Firebase resource layer.
//!
//! Stands in for the real provider during development and tests: every
//! operation logs what it would do, sleeps an optional configured latency,
//! and returns fabricated resource metadata. Projects created through this
//! orchestrator are recorded in memory so `find_project` observes them for
//! the lifetime of the process.

use super::{
    HostingSiteInfo, Orchestrator, OrchestratorError, OrchestratorResult, ProjectConfig,
    ProjectInfo, ResourceHandle, WebAppConfig, WebAppInfo,
};
use async_trait::async_trait;
use chrono::Utc;
use indexmap::IndexMap;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::Duration;
use uuid::Uuid;

/// In-memory stand-in for the Google Cloud resource layer.
pub struct GcpOrchestrator {
    /// Projects created during this process, keyed by project id.
    projects: Mutex<HashMap<String, ProjectInfo>>,
    /// Artificial per-call latency.
    latency: Duration,
}

impl GcpOrchestrator {
    pub fn new() -> Self {
        Self {
            projects: Mutex::new(HashMap::new()),
            latency: Duration::ZERO,
        }
    }

    /// Add an artificial delay to every call, approximating provider
    /// round trips.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    async fn simulate_call(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }

    fn resource_id() -> String {
        format!("{:019}", rand::random::<u64>())
    }

    fn project_number() -> String {
        format!("{:012}", rand::random::<u64>() % 1_000_000_000_000)
    }

    fn handle(resource_type: &str, name: &str, self_link: String) -> ResourceHandle {
        ResourceHandle {
            id: Self::resource_id(),
            name: name.to_string(),
            resource_type: resource_type.to_string(),
            self_link,
            created_at: Utc::now(),
        }
    }
}

impl Default for GcpOrchestrator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Orchestrator for GcpOrchestrator {
    fn identifier(&self) -> &str {
        "gcp"
    }

    async fn create_project(
        &self,
        name: &str,
        apis: &[String],
        labels: &IndexMap<String, String>,
        config: &ProjectConfig,
    ) -> OrchestratorResult<ProjectInfo> {
        self.simulate_call().await;

        // A real implementation would call the Resource Manager API here
        // and poll the returned long-running operation until done.
        if self.projects.lock().contains_key(name) {
            return Err(OrchestratorError::CreateFailed {
                resource_type: "project".to_string(),
                name: name.to_string(),
                message: "project id already exists".to_string(),
            });
        }

        tracing::info!(
            "Would create project '{}' with {} services, {} labels, billing account {:?}",
            name,
            apis.len(),
            labels.len(),
            config.billing_account,
        );

        let info = ProjectInfo {
            project_id: name.to_string(),
            number: Self::project_number(),
            display_name: config
                .display_name
                .clone()
                .unwrap_or_else(|| name.to_string()),
            labels: labels.clone(),
            enabled_services: Vec::new(),
            handle: Self::handle(
                "project",
                name,
                format!("https://cloudresourcemanager.googleapis.com/v3/projects/{name}"),
            ),
        };

        self.projects
            .lock()
            .insert(name.to_string(), info.clone());

        Ok(info)
    }

    async fn find_project(&self, project_id: &str) -> OrchestratorResult<Option<ProjectInfo>> {
        self.simulate_call().await;
        Ok(self.projects.lock().get(project_id).cloned())
    }

    async fn enable_services(
        &self,
        project_id: &str,
        services: &[String],
    ) -> OrchestratorResult<ResourceHandle> {
        self.simulate_call().await;

        tracing::info!(
            "Would enable {} services on project '{}'",
            services.len(),
            project_id
        );

        if let Some(project) = self.projects.lock().get_mut(project_id) {
            for service in services {
                if !project.enabled_services.contains(service) {
                    project.enabled_services.push(service.clone());
                }
            }
        }

        Ok(Self::handle(
            "project-services",
            project_id,
            format!("https://serviceusage.googleapis.com/v1/projects/{project_id}/services"),
        ))
    }

    async fn add_iam_member(
        &self,
        project_id: &str,
        role: &str,
        member: &str,
    ) -> OrchestratorResult<ResourceHandle> {
        self.simulate_call().await;

        tracing::info!(
            "Would grant '{}' to '{}' on project '{}'",
            role,
            member,
            project_id
        );

        Ok(Self::handle(
            "iam-member",
            member,
            format!(
                "https://cloudresourcemanager.googleapis.com/v1/projects/{project_id}:iam/{role}"
            ),
        ))
    }

    async fn create_firebase_project(
        &self,
        project_id: &str,
    ) -> OrchestratorResult<ResourceHandle> {
        self.simulate_call().await;

        tracing::info!("Would enable Firebase on project '{}'", project_id);

        Ok(Self::handle(
            "firebase-project",
            project_id,
            format!("https://firebase.googleapis.com/v1beta1/projects/{project_id}"),
        ))
    }

    async fn create_web_app(
        &self,
        project_id: &str,
        display_name: &str,
    ) -> OrchestratorResult<WebAppInfo> {
        self.simulate_call().await;

        let number = self
            .projects
            .lock()
            .get(project_id)
            .map(|p| p.number.clone())
            .unwrap_or_else(Self::project_number);
        let app_id = format!("1:{}:web:{:016x}", number, rand::random::<u64>());

        tracing::info!(
            "Would register web app '{}' ({}) in project '{}'",
            display_name,
            app_id,
            project_id
        );

        Ok(WebAppInfo {
            app_id: app_id.clone(),
            display_name: display_name.to_string(),
            project_id: project_id.to_string(),
            handle: Self::handle(
                "web-app",
                display_name,
                format!(
                    "https://firebase.googleapis.com/v1beta1/projects/{project_id}/webApps/{app_id}"
                ),
            ),
        })
    }

    async fn get_web_app_config(
        &self,
        project_id: &str,
        app_id: &str,
    ) -> OrchestratorResult<WebAppConfig> {
        self.simulate_call().await;

        let sender_id = app_id
            .split(':')
            .nth(1)
            .unwrap_or_default()
            .to_string();

        Ok(WebAppConfig {
            app_id: app_id.to_string(),
            api_key: format!("AIza{}", Uuid::new_v4().simple()),
            auth_domain: format!("{project_id}.firebaseapp.com"),
            storage_bucket: format!("{project_id}.appspot.com"),
            messaging_sender_id: sender_id,
            project_id: project_id.to_string(),
        })
    }

    async fn create_hosting_site(
        &self,
        project_id: &str,
        app_id: &str,
        site_id: &str,
    ) -> OrchestratorResult<HostingSiteInfo> {
        self.simulate_call().await;

        tracing::info!(
            "Would create hosting site '{}' for app '{}' in project '{}'",
            site_id,
            app_id,
            project_id
        );

        Ok(HostingSiteInfo {
            site_id: site_id.to_string(),
            app_id: app_id.to_string(),
            default_url: format!("https://{site_id}.web.app"),
            handle: Self::handle(
                "hosting-site",
                site_id,
                format!(
                    "https://firebasehosting.googleapis.com/v1beta1/projects/{project_id}/sites/{site_id}"
                ),
            ),
        })
    }

    async fn create_custom_domain(
        &self,
        name: &str,
        project_id: &str,
        site_id: &str,
        domain: &str,
        cert_preference: &str,
    ) -> OrchestratorResult<ResourceHandle> {
        self.simulate_call().await;

        tracing::info!(
            "Would map custom domain '{}' onto site '{}' ({} certificate)",
            domain,
            site_id,
            cert_preference
        );

        Ok(Self::handle(
            "hosting-custom-domain",
            name,
            format!(
                "https://firebasehosting.googleapis.com/v1beta1/projects/{project_id}/sites/{site_id}/customDomains/{domain}"
            ),
        ))
    }

    async fn delete_project(&self, project_id: &str) -> OrchestratorResult<()> {
        self.simulate_call().await;

        tracing::info!("Would delete project '{}'", project_id);

        self.projects
            .lock()
            .remove(project_id)
            .map(|_| ())
            .ok_or_else(|| OrchestratorError::NotFound(project_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ProjectConfig {
        ProjectConfig {
            display_name: Some("Test".to_string()),
            billing_account: Some("01AB-CDEF-2345".to_string()),
            user_project_override: true,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_then_find_project() {
        let orch = GcpOrchestrator::new();
        let labels = IndexMap::new();

        let created = orch
            .create_project("demo-prod", &[], &labels, &config())
            .await
            .unwrap();
        assert_eq!(created.project_id, "demo-prod");
        assert_eq!(created.display_name, "Test");
        assert_eq!(created.number.len(), 12);

        let found = orch.find_project("demo-prod").await.unwrap();
        assert!(found.is_some());
        assert!(orch.find_project("other").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_project_id_rejected() {
        let orch = GcpOrchestrator::new();
        let labels = IndexMap::new();

        orch.create_project("demo", &[], &labels, &config())
            .await
            .unwrap();
        let err = orch
            .create_project("demo", &[], &labels, &config())
            .await
            .unwrap_err();
        assert!(matches!(err, OrchestratorError::CreateFailed { .. }));
    }

    #[tokio::test]
    async fn test_enable_services_merges_into_record() {
        let orch = GcpOrchestrator::new();
        orch.create_project("demo", &[], &IndexMap::new(), &config())
            .await
            .unwrap();

        let services = vec![
            "firebase.googleapis.com".to_string(),
            "run.googleapis.com".to_string(),
        ];
        orch.enable_services("demo", &services).await.unwrap();
        orch.enable_services("demo", &services).await.unwrap();

        let project = orch.find_project("demo").await.unwrap().unwrap();
        assert_eq!(project.enabled_services, services);
    }

    #[tokio::test]
    async fn test_delete_project() {
        let orch = GcpOrchestrator::new();
        orch.create_project("demo", &[], &IndexMap::new(), &config())
            .await
            .unwrap();

        orch.delete_project("demo").await.unwrap();
        assert!(orch.find_project("demo").await.unwrap().is_none());
        assert!(matches!(
            orch.delete_project("demo").await.unwrap_err(),
            OrchestratorError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_web_app_shapes() {
        let orch = GcpOrchestrator::new();
        let project = orch
            .create_project("demo", &[], &IndexMap::new(), &config())
            .await
            .unwrap();

        let app = orch.create_web_app("demo", "frontend").await.unwrap();
        assert!(app.app_id.starts_with(&format!("1:{}:web:", project.number)));

        let app_config = orch.get_web_app_config("demo", &app.app_id).await.unwrap();
        assert_eq!(app_config.auth_domain, "demo.firebaseapp.com");
        assert_eq!(app_config.storage_bucket, "demo.appspot.com");
        assert_eq!(app_config.messaging_sender_id, project.number);
        assert!(app_config.api_key.starts_with("AIza"));

        let site = orch
            .create_hosting_site("demo", &app.app_id, "frontend-demo")
            .await
            .unwrap();
        assert_eq!(site.default_url, "https://frontend-demo.web.app");
    }
}
