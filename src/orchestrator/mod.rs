//! The resource-orchestration boundary.
//!
//! Everything that would actually touch Google Cloud sits behind the
//! [`Orchestrator`] trait. Modules hand it fully-resolved inputs (a
//! deduplicated service list, a composed label map, opaque project
//! settings) and compose its futures with plain `.await`s; provider errors
//! come back unmodified through [`OrchestratorError`]. The composition
//! logic that produces those inputs lives in [`crate::compose`] and stays
//! synchronous.
//!
//! [`GcpOrchestrator`](gcp::GcpOrchestrator) is the in-tree implementation.
//! It simulates the provider: every call emits a structured log line and
//! returns fabricated resource metadata, so blueprints can be exercised end
//! to end without credentials.

pub mod gcp;

pub use gcp::GcpOrchestrator;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors reported by the resource layer.
///
/// These are propagated upward unmodified; no retry, recovery, or
/// reinterpretation happens on this side of the boundary.
#[derive(Error, Debug)]
pub enum OrchestratorError {
    #[error("Failed to create {resource_type} '{name}': {message}")]
    CreateFailed {
        resource_type: String,
        name: String,
        message: String,
    },

    #[error("Resource '{0}' not found")]
    NotFound(String),

    #[error("Provider rejected request: {0}")]
    Rejected(String),

    #[error("Provider unavailable: {0}")]
    Unavailable(String),
}

/// Result type for orchestrator operations.
pub type OrchestratorResult<T> = Result<T, OrchestratorError>;

/// Handle to a provisioned resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceHandle {
    /// Provider-assigned numeric or opaque identifier
    pub id: String,
    /// Resource name as passed at creation time
    pub name: String,
    /// Kind of resource (project, project-services, iam-member, ...)
    pub resource_type: String,
    /// Canonical URL of the resource
    pub self_link: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// Project-level settings passed through to the provider untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Human-readable display name
    pub display_name: Option<String>,
    /// Billing account to attach
    pub billing_account: Option<String>,
    /// Parent organization id
    pub org_id: Option<String>,
    /// Parent folder id (mutually exclusive with `org_id` on the provider side)
    pub folder_id: Option<String>,
    /// Bill provider API calls to the project itself instead of the caller.
    /// Requires the Service Usage API on the project.
    pub user_project_override: bool,
}

/// Project facts as reported by the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectInfo {
    /// Project id (unique, immutable)
    pub project_id: String,
    /// Provider-assigned project number
    pub number: String,
    /// Display name
    pub display_name: String,
    /// Labels on the project
    pub labels: IndexMap<String, String>,
    /// Services enabled on the project
    pub enabled_services: Vec<String>,
    /// Handle to the project resource
    pub handle: ResourceHandle,
}

/// A registered web app.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebAppInfo {
    /// Globally unique app id (e.g. `1:123456789012:web:a1b2c3`)
    pub app_id: String,
    /// Display name
    pub display_name: String,
    /// Owning project id
    pub project_id: String,
    /// Handle to the web app resource
    pub handle: ResourceHandle,
}

/// Client configuration for a registered web app, as served to browsers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebAppConfig {
    /// App this config belongs to
    pub app_id: String,
    /// Browser API key
    pub api_key: String,
    /// Auth domain (`<project>.firebaseapp.com`)
    pub auth_domain: String,
    /// Default storage bucket
    pub storage_bucket: String,
    /// Cloud messaging sender id
    pub messaging_sender_id: String,
    /// Owning project id
    pub project_id: String,
}

/// A hosting site bound to a web app.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostingSiteInfo {
    /// Site id, unique across all of Firebase Hosting
    pub site_id: String,
    /// Web app the site serves
    pub app_id: String,
    /// Default `web.app` URL
    pub default_url: String,
    /// Handle to the hosting site resource
    pub handle: ResourceHandle,
}

/// Interface to the external resource-orchestration layer.
///
/// Implementations own all lifecycle concerns: API calls, polling,
/// dependency scheduling, rate limits. Callers sequence operations by
/// awaiting them in order; an operation that depends on another is simply
/// awaited after it.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Orchestrator: Send + Sync {
    /// Short identifier for logs and debug output.
    fn identifier(&self) -> &str;

    /// Create a cloud project with its fully-resolved service list and
    /// label map. `apis` and `labels` are expected to be composed already;
    /// the provider applies them verbatim.
    async fn create_project(
        &self,
        name: &str,
        apis: &[String],
        labels: &IndexMap<String, String>,
        config: &ProjectConfig,
    ) -> OrchestratorResult<ProjectInfo>;

    /// Look up a project by id. `Ok(None)` means the project does not exist.
    async fn find_project(&self, project_id: &str) -> OrchestratorResult<Option<ProjectInfo>>;

    /// Enable a list of services on an existing project.
    async fn enable_services(
        &self,
        project_id: &str,
        services: &[String],
    ) -> OrchestratorResult<ResourceHandle>;

    /// Grant `role` to `member` on the project.
    async fn add_iam_member(
        &self,
        project_id: &str,
        role: &str,
        member: &str,
    ) -> OrchestratorResult<ResourceHandle>;

    /// Register the project with Firebase. The project must already have
    /// the Firebase services enabled.
    async fn create_firebase_project(&self, project_id: &str)
        -> OrchestratorResult<ResourceHandle>;

    /// Register a web app in the project.
    async fn create_web_app(
        &self,
        project_id: &str,
        display_name: &str,
    ) -> OrchestratorResult<WebAppInfo>;

    /// Fetch the client configuration of a registered web app.
    async fn get_web_app_config(
        &self,
        project_id: &str,
        app_id: &str,
    ) -> OrchestratorResult<WebAppConfig>;

    /// Create a hosting site bound to a web app.
    async fn create_hosting_site(
        &self,
        project_id: &str,
        app_id: &str,
        site_id: &str,
    ) -> OrchestratorResult<HostingSiteInfo>;

    /// Map a custom domain onto a hosting site. `name` is the resource
    /// name; `cert_preference` selects the TLS certificate mode.
    async fn create_custom_domain(
        &self,
        name: &str,
        project_id: &str,
        site_id: &str,
        domain: &str,
        cert_preference: &str,
    ) -> OrchestratorResult<ResourceHandle>;

    /// Delete a project. Deleting a project that does not exist is an error.
    async fn delete_project(&self, project_id: &str) -> OrchestratorResult<()>;
}
