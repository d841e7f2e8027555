//! Integration tests for blueprint loading and dispatch.

use firelift::blueprint::Blueprint;
use firelift::config::Config;
use firelift::error::Error;
use firelift::modules::{ModuleContext, ModuleRegistry};
use firelift::orchestrator::{GcpOrchestrator, Orchestrator};
use std::io::Write;
use std::sync::Arc;
use tempfile::NamedTempFile;

const SAMPLE: &str = r#"
version: "1"
projects:
  - project_id: acme-prod
    name: Acme Production
    labels:
      team: infra
    web_apps:
      - frontend
  - project_id: acme-staging
"#;

fn write_blueprint(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_load_blueprint_from_file() {
    let file = write_blueprint(SAMPLE);
    let blueprint = Blueprint::from_file(file.path()).unwrap();
    assert_eq!(blueprint.projects.len(), 2);
    assert_eq!(blueprint.projects[0].project_id, "acme-prod");
}

#[test]
fn test_missing_blueprint_file() {
    let err = Blueprint::from_file("does/not/exist.yml").unwrap_err();
    assert!(matches!(err, Error::BlueprintParse { .. }));
}

#[test]
fn test_invalid_yaml_reports_path() {
    let file = write_blueprint("projects: [not, a, project, list]");
    let err = Blueprint::from_file(file.path()).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("Failed to parse blueprint"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_blueprint_entries_drive_the_project_module() {
    let file = write_blueprint(SAMPLE);
    let blueprint = Blueprint::from_file(file.path()).unwrap();

    let config: Config = Config::default();
    let orchestrator = Arc::new(GcpOrchestrator::new());
    let registry = ModuleRegistry::with_builtins();
    let context = ModuleContext::new().with_orchestrator(orchestrator.clone());

    for entry in &blueprint.projects {
        let mut entry = entry.clone();
        config.apply_defaults(&mut entry);
        let output = registry
            .execute("firebase_project", &entry.to_params(), &context)
            .unwrap();
        assert!(output.changed);
    }

    assert!(orchestrator.find_project("acme-prod").await.unwrap().is_some());
    assert!(orchestrator
        .find_project("acme-staging")
        .await
        .unwrap()
        .is_some());
}
