//! Command-line interface definition for the Firelift binary.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Firelift - provision Google Cloud projects with Firebase enabled
#[derive(Debug, Parser)]
#[command(name = "firelift", version, about, long_about = None)]
pub struct Cli {
    /// Increase output verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to a configuration file (default: ./firelift.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Provision every project in a blueprint
    Run(BlueprintArgs),

    /// Report what a blueprint would change without provisioning anything
    Check(BlueprintArgs),

    /// Print the baseline services enabled on every composed project
    ListServices,
}

#[derive(Debug, Args)]
pub struct BlueprintArgs {
    /// Path to the blueprint YAML file
    pub blueprint: PathBuf,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn verbosity(&self) -> u8 {
        self.verbose
    }
}
