//! Firebase web app registration.
//!
//! ## FirebaseWebAppsModule
//!
//! Registers web apps in an existing Firebase-enabled project, together
//! with one hosting site per app and any custom domains mapped onto those
//! sites. Also invoked by the `firebase_project` module as the last
//! provisioning step.
//!
//! ### Parameters
//!
//! | Parameter | Required | Description |
//! |-----------|----------|-------------|
//! | `project_id` | Yes | Project to register the apps in |
//! | `web_apps` | No | Web app display names to register |
//! | `custom_domains` | No | Mapping of app name to custom domains for its hosting site |
//!
//! ### Example
//!
//! ```yaml
//! - firebase_web_apps:
//!     project_id: acme-prod
//!     web_apps:
//!       - frontend
//!       - admin
//!     custom_domains:
//!       frontend:
//!         - example.com
//!         - www.example.com
//! ```
//!
//! Hosting site ids are `{app}-{project_id}`, which keeps them unique
//! across projects that register an app under the same name. Domains mapped
//! to an app name that is not being registered are ignored.

use super::{Module, ModuleContext, ModuleError, ModuleOutput, ModuleParams, ModuleResult, ParamExt};
use crate::orchestrator::{HostingSiteInfo, Orchestrator, ResourceHandle, WebAppConfig, WebAppInfo};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Certificate mode requested for every custom domain.
pub const CERT_PREFERENCE_DEDICATED: &str = "DEDICATED";

/// Web app registration request for a single project.
#[derive(Debug, Clone, Default)]
pub struct WebAppsRequest {
    /// Project to register the apps in
    pub project_id: String,
    /// Display names of the apps to register
    pub web_apps: Vec<String>,
    /// Custom domains per app name
    pub custom_domains: IndexMap<String, Vec<String>>,
}

/// Everything registered by a web apps run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WebAppsOutcome {
    /// Registered apps, in request order
    pub apps: Vec<WebAppInfo>,
    /// Client configuration per registered app
    pub configs: Vec<WebAppConfig>,
    /// Hosting sites, one per app
    pub sites: Vec<HostingSiteInfo>,
    /// Custom domain resources
    pub domains: Vec<ResourceHandle>,
}

/// Register every requested web app with its hosting site and domains.
///
/// Apps are independent of each other and registered concurrently. Within
/// an app the orchestrator calls are sequenced app -> client config ->
/// hosting site -> domains, since each depends on identifiers returned by
/// the previous step. The outcome lists resources in request order.
pub async fn configure_web_apps(
    orchestrator: &dyn Orchestrator,
    request: &WebAppsRequest,
) -> ModuleResult<WebAppsOutcome> {
    let jobs = request.web_apps.iter().map(|app| {
        let project_id = &request.project_id;
        let custom_domains = &request.custom_domains;
        async move {
            let web_app = orchestrator.create_web_app(project_id, app).await?;

            let config = orchestrator
                .get_web_app_config(project_id, &web_app.app_id)
                .await?;

            let site_id = format!("{app}-{project_id}");
            let site = orchestrator
                .create_hosting_site(project_id, &web_app.app_id, &site_id)
                .await?;

            let mut domains = Vec::new();
            if let Some(list) = custom_domains.get(app) {
                for domain in list {
                    let name = format!("{app}${domain}");
                    domains.push(
                        orchestrator
                            .create_custom_domain(
                                &name,
                                project_id,
                                &site.site_id,
                                domain,
                                CERT_PREFERENCE_DEDICATED,
                            )
                            .await?,
                    );
                }
            }

            Ok::<_, ModuleError>((web_app, config, site, domains))
        }
    });

    let mut outcome = WebAppsOutcome::default();
    for (web_app, config, site, domains) in futures::future::try_join_all(jobs).await? {
        outcome.apps.push(web_app);
        outcome.configs.push(config);
        outcome.sites.push(site);
        outcome.domains.extend(domains);
    }

    Ok(outcome)
}

/// Firebase web apps module
pub struct FirebaseWebAppsModule;

impl FirebaseWebAppsModule {
    fn request_from_params(params: &ModuleParams) -> ModuleResult<WebAppsRequest> {
        Ok(WebAppsRequest {
            project_id: params.get_string_required("project_id")?,
            web_apps: params.get_vec_string("web_apps")?.unwrap_or_default(),
            custom_domains: params
                .get_string_list_map("custom_domains")?
                .unwrap_or_default(),
        })
    }

    async fn execute_async(
        &self,
        params: &ModuleParams,
        context: &ModuleContext,
    ) -> ModuleResult<ModuleOutput> {
        let request = Self::request_from_params(params)?;

        if request.web_apps.is_empty() {
            return Ok(ModuleOutput::ok(format!(
                "No web apps requested for project '{}'",
                request.project_id
            )));
        }

        if context.check_mode {
            return Ok(ModuleOutput::changed(format!(
                "Would register {} web app(s) in project '{}'",
                request.web_apps.len(),
                request.project_id
            )));
        }

        let orchestrator = context.orchestrator();
        let outcome = configure_web_apps(orchestrator.as_ref(), &request).await?;

        Ok(ModuleOutput::changed(format!(
            "Registered {} web app(s) in project '{}'",
            outcome.apps.len(),
            request.project_id
        ))
        .with_data("web_apps", serde_json::to_value(&outcome).unwrap_or_default()))
    }
}

impl Module for FirebaseWebAppsModule {
    fn name(&self) -> &'static str {
        "firebase_web_apps"
    }

    fn description(&self) -> &'static str {
        "Register Firebase web apps, hosting sites, and custom domains in a GCP project"
    }

    fn required_params(&self) -> &[&'static str] {
        &["project_id"]
    }

    fn validate_params(&self, params: &ModuleParams) -> ModuleResult<()> {
        // project_id is mandatory
        params.get_string_required("project_id")?;
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
