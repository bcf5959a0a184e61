//! CLI argument parsing
//!
//! Defines command-line interface using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::config::HarnessConfig;

/// FanPulse gateway functional and load test harness
#[derive(Parser, Debug)]
#[command(name = "fanpulse-harness")]
#[command(author = "hephaex@gmail.com")]
#[command(version = "0.1.0")]
#[command(about = "Functional and load testing for the FanPulse event gateway")]
#[command(long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file (YAML or JSON)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the functional suite and/or the load test
    Run(RunArgs),

    /// Smoke test: health, one event, status
    Quick(QuickArgs),

    /// Run the load test against performance targets
    Load(LoadArgs),

    /// Print sample event payloads
    Generate(GenerateArgs),

    /// Inspect or create configuration
    Config(ConfigArgs),
}

/// Gateway connection overrides shared by the test commands
#[derive(Parser, Debug, Default)]
pub struct TargetArgs {
    /// Gateway HTTP base URL
    #[arg(short, long)]
    pub gateway_url: Option<String>,

    /// Gateway streaming endpoint
    #[arg(short, long)]
    pub websocket_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Device identity for generated events
    #[arg(long)]
    pub device_id: Option<String>,
}

impl TargetArgs {
    /// Overlay flags onto the resolved configuration
    pub fn apply(&self, config: &mut HarnessConfig) {
        if let Some(url) = &self.gateway_url {
            config.gateway_url = url.clone();
        }
        if let Some(url) = &self.websocket_url {
            config.websocket_url = url.clone();
        }
        if let Some(timeout) = self.timeout {
            config.timeout_secs = timeout;
        }
        if let Some(device_id) = &self.device_id {
            config.device_id = device_id.clone();
        }
    }
}

/// Load test sizing overrides
#[derive(Parser, Debug, Default)]
pub struct LoadShapeArgs {
    /// Concurrent simulated users
    #[arg(short, long)]
    pub users: Option<usize>,

    /// Load test duration in seconds
    #[arg(short, long)]
    pub duration: Option<u64>,
}

impl LoadShapeArgs {
    pub fn apply(&self, config: &mut HarnessConfig) {
        if let Some(users) = self.users {
            config.concurrent_users = users;
        }
        if let Some(duration) = self.duration {
            config.test_duration_secs = duration;
        }
    }
}

/// Which phases `run` executes
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum SuiteSelection {
    #[default]
    All,
    Functional,
    Load,
}

impl SuiteSelection {
    pub fn runs_functional(&self) -> bool {
        matches!(self, SuiteSelection::All | SuiteSelection::Functional)
    }

    pub fn runs_load(&self) -> bool {
        matches!(self, SuiteSelection::All | SuiteSelection::Load)
    }
}

/// Arguments for run command
#[derive(Parser, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    #[command(flatten)]
    pub shape: LoadShapeArgs,

    /// Phases to run
    #[arg(short, long, value_enum, default_value = "all")]
    pub suite: SuiteSelection,

    /// Run the load test regardless of the selected suite
    #[arg(long)]
    pub load_test: bool,

    /// Report file
    #[arg(short, long, default_value = "test_report.txt")]
    pub output: PathBuf,

    /// Report format (text, json, csv); inferred from the output extension when omitted
    #[arg(short, long)]
    pub format: Option<String>,
}

impl RunArgs {
    pub fn runs_load(&self) -> bool {
        self.load_test || self.suite.runs_load()
    }
}

/// Arguments for quick command
#[derive(Parser, Debug)]
pub struct QuickArgs {
    #[command(flatten)]
    pub target: TargetArgs,
}

/// Arguments for load command
#[derive(Parser, Debug)]
pub struct LoadArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    #[command(flatten)]
    pub shape: LoadShapeArgs,

    /// Also save a report to this file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Report format (text, json, csv)
    #[arg(short, long)]
    pub format: Option<String>,
}

/// Sample payload kinds
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum SampleKind {
    Valid,
    Invalid,
    Spam,
}

/// Arguments for generate command
#[derive(Parser, Debug)]
pub struct GenerateArgs {
    /// Kind of payload to print
    #[arg(value_enum, default_value = "valid")]
    pub kind: SampleKind,

    /// Number of valid events
    #[arg(short = 'n', long, default_value = "1")]
    pub count: usize,

    /// Device identity for generated events
    #[arg(long)]
    pub device_id: Option<String>,
}

/// Arguments for config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show the effective configuration
    Show,

    /// Write an example configuration file
    Init {
        /// Destination file
        #[arg(default_value = "fanpulse-harness.yaml")]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// List supported environment variables
    Env,
}
