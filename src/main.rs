//! Firelift - Firebase project provisioning for Google Cloud
//!
//! This is the main entry point for the Firelift CLI.

mod cli;

use anyhow::Result;
use cli::{BlueprintArgs, Cli, Commands};
use colored::Colorize;
use firelift::blueprint::Blueprint;
use firelift::compose::FIREBASE_BASELINE_SERVICES;
use firelift::config::Config;
use firelift::error::Error;
use firelift::modules::{ModuleContext, ModuleRegistry};
use firelift::orchestrator::GcpOrchestrator;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    if cli.verbosity() >= 2 {
        eprintln!("Firelift v{}", firelift::version());
    }

    // Load configuration
    let config = Config::load(cli.config.as_ref()).unwrap_or_else(|e| {
        if cli.verbosity() >= 1 {
            eprintln!("Warning: Failed to load config: {}", e);
        }
        Config::default()
    });

    // Execute the appropriate command
    let exit_code = match &cli.command {
        Commands::Run(args) => run_blueprint(args, &config, false)?,
        Commands::Check(args) => run_blueprint(args, &config, true)?,
        Commands::ListServices => list_services(),
    };

    std::process::exit(exit_code);
}

/// Initialize logging based on verbosity level
fn init_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(verbosity >= 3))
        .with(env_filter)
        .init();
}

/// Provision (or check) every project in a blueprint
fn run_blueprint(args: &BlueprintArgs, config: &Config, check_mode: bool) -> Result<i32> {
    let blueprint = Blueprint::from_file(&args.blueprint)?;

    let registry = ModuleRegistry::with_builtins();
    let orchestrator = Arc::new(
        GcpOrchestrator::new()
            .with_latency(Duration::from_millis(config.simulation.latency_ms)),
    );
    let context = ModuleContext::new()
        .with_check_mode(check_mode)
        .with_orchestrator(orchestrator);

    let mut ok = 0usize;
    let mut changed = 0usize;
    let mut failed = 0usize;

    for entry in &blueprint.projects {
        let mut entry = entry.clone();
        config.apply_defaults(&mut entry);
        let params = entry.to_params();

        match registry.execute("firebase_project", &params, &context) {
            Ok(output) => {
                if output.changed {
                    changed += 1;
                    println!("{}: {}", "changed".yellow(), output.msg);
                } else {
                    ok += 1;
                    println!("{}: {}", "ok".green(), output.msg);
                }
            }
            Err(e) => {
                failed += 1;
                let e = Error::ModuleExecution {
                    module: "firebase_project".to_string(),
                    message: e.to_string(),
                };
                println!("{}: [{}] {}", "failed".red(), entry.project_id, e);
            }
        }
    }

    let recap = if check_mode { "check recap:" } else { "run recap:" };
    println!(
        "\n{} ok={} changed={} failed={}",
        recap.bold(),
        ok,
        changed,
        failed
    );

    Ok(if failed > 0 { 1 } else { 0 })
}

/// Print the baseline services enabled on every composed project
fn list_services() -> i32 {
    for service in FIREBASE_BASELINE_SERVICES {
        println!("{service}");
    }
    0
}
