//! FanPulse Harness - functional and load testing for the FanPulse event gateway
//!
//! Exercises the gateway's ingestion contract with synthetic chant events:
//! health, schema validation, anti-spam, batching, streaming, metrics and
//! status checks, plus a concurrent load test with latency percentiles.
//!
//! ## Usage
//!
//! ```bash
//! # Functional suite and load test, report written to test_report.txt
//! fanpulse-harness run --gateway-url http://localhost:4000
//!
//! # Functional checks only, JSON report
//! fanpulse-harness run --suite functional --output report.json
//!
//! # Smoke test
//! fanpulse-harness quick
//!
//! # Load test with 20 users for 30 seconds
//! fanpulse-harness load --users 20 --duration 30
//!
//! # Sample payloads
//! fanpulse-harness generate invalid
//! ```

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::Parser;
use std::path::Path;
use std::process::ExitCode;
use tracing::{info, warn};

mod cli;
mod config;
mod generator;
mod http;
mod load;
#[cfg(test)]
mod mock_gateway;
mod models;
mod report;
mod stream;
mod suite;
mod utils;

use cli::{Args, Command, SampleKind};
use config::{EnvConfig, HarnessConfig};
use http::HttpClient;
use load::{LoadDriver, LoadMetrics};
use models::ResultLog;
use report::{ReportFormat, Reporter};
use suite::GatewayTestSuite;
use utils::{init_logger, LogLevel};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    let env = EnvConfig::load();
    let mut config = HarnessConfig::resolve(args.config.as_deref(), &env)?;
    if args.verbose {
        config.verbose = true;
    }
    init_logger(LogLevel::from_verbose(config.verbose));

    match args.command {
        Command::Run(run_args) => run_suites(config, run_args).await,
        Command::Quick(quick_args) => run_quick(config, quick_args).await,
        Command::Load(load_args) => run_load(config, load_args).await,
        Command::Generate(generate_args) => {
            generate_samples(&config, generate_args)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Config(config_args) => {
            manage_config(&config, &env, config_args)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn run_suites(mut config: HarnessConfig, args: cli::RunArgs) -> Result<ExitCode> {
    args.target.apply(&mut config);
    args.shape.apply(&mut config);
    config.validate().context("Invalid configuration")?;
    let format = report_format(args.format.as_deref(), &args.output)?;

    let suite = GatewayTestSuite::new(&config)?;
    suite.preflight().await?;

    let results = if args.suite.runs_functional() {
        println!("Running functional test suite...");
        suite.run_all().await
    } else {
        ResultLog::new()
    };

    let load_metrics = if args.runs_load() {
        println!("Running load test...");
        Some(LoadDriver::new(&config)?.run().await)
    } else {
        None
    };

    let report = Reporter::generate(results.results(), load_metrics.as_ref(), Utc::now());
    println!("{}", report.text);
    report.save_report(&args.output, format)?;
    println!("Report saved to {}", args.output.display());

    if let Some(metrics) = &load_metrics {
        for violation in config.targets.evaluate(metrics) {
            warn!("Load target missed: {}", violation);
        }
    }

    if report.all_passed() {
        println!("\n✓ All tests passed!");
        Ok(ExitCode::SUCCESS)
    } else {
        println!("\n✗ {} tests failed", report.failed);
        Ok(ExitCode::FAILURE)
    }
}

async fn run_quick(mut config: HarnessConfig, args: cli::QuickArgs) -> Result<ExitCode> {
    args.target.apply(&mut config);
    config.validate().context("Invalid configuration")?;

    let suite = GatewayTestSuite::new(&config)?;
    suite.preflight().await?;
    let log = suite.run_quick().await;

    println!("\nQuick smoke test against {}", config.gateway_url);
    for result in log.results() {
        println!("  {result}");
    }

    if log.all_passed() {
        println!("\n✓ Smoke test passed ({}/{})", log.passed(), log.len());
        Ok(ExitCode::SUCCESS)
    } else {
        println!(
            "\n✗ Smoke test failed ({} of {} checks failed)",
            log.failed(),
            log.len()
        );
        Ok(ExitCode::FAILURE)
    }
}

async fn run_load(mut config: HarnessConfig, args: cli::LoadArgs) -> Result<ExitCode> {
    args.target.apply(&mut config);
    args.shape.apply(&mut config);
    config.validate().context("Invalid configuration")?;

    let client =
        HttpClient::with_timeout(config.timeout_secs)?.base_url(config.gateway_url.clone());
    suite::check_reachable(&client).await?;

    let metrics = LoadDriver::new(&config)?.run().await;
    print_load_summary(&metrics);

    if let Some(output) = &args.output {
        let format = report_format(args.format.as_deref(), output)?;
        Reporter::generate(&[], Some(&metrics), Utc::now()).save_report(output, format)?;
        println!("Report saved to {}", output.display());
    }

    let violations = config.targets.evaluate(&metrics);
    if violations.is_empty() {
        println!("\n✓ All performance targets met");
        Ok(ExitCode::SUCCESS)
    } else {
        println!("\n✗ Performance targets missed:");
        for violation in &violations {
            println!("  - {violation}");
        }
        Ok(ExitCode::FAILURE)
    }
}

fn print_load_summary(metrics: &LoadMetrics) {
    println!("\nLoad Test Results");
    println!("{:-<50}", "");
    println!("Total Requests:        {}", metrics.total_requests);
    println!("Successful:            {}", metrics.successful_requests);
    println!("Failed:                {}", metrics.failed_requests);
    println!("Throughput:            {:.2} RPS", metrics.throughput_rps);
    println!("Error Rate:            {:.2}%", metrics.error_rate * 100.0);
    println!("Average Response Time: {:.2}ms", metrics.avg_latency_ms);
    println!("95th Percentile:       {:.2}ms", metrics.p95_latency_ms);
}

/// Explicit format wins; otherwise infer from the file extension
fn report_format(explicit: Option<&str>, output: &Path) -> Result<ReportFormat> {
    match explicit {
        Some(name) => match ReportFormat::from_str(name) {
            Some(format) => Ok(format),
            None => bail!("Unknown report format: {name} (expected text, json or csv)"),
        },
        None => Ok(ReportFormat::from_extension(output).unwrap_or_default()),
    }
}

fn generate_samples(config: &HarnessConfig, args: cli::GenerateArgs) -> Result<()> {
    let device_id = args.device_id.as_deref().unwrap_or(&config.device_id);

    match args.kind {
        SampleKind::Valid => {
            for _ in 0..args.count {
                let payload = generator::generate_valid_event(device_id).to_payload()?;
                println!("{}", serde_json::to_string_pretty(&payload)?);
            }
        }
        SampleKind::Invalid => {
            for (index, case) in generator::generate_invalid_events(device_id)?
                .iter()
                .enumerate()
            {
                println!("# {} ({})", case.test_name(index), case.reason.label());
                println!("{}", serde_json::to_string_pretty(&case.payload)?);
            }
        }
        SampleKind::Spam => {
            for event in generator::generate_spam_events(device_id) {
                println!("{}", serde_json::to_string_pretty(&event.to_payload()?)?);
            }
        }
    }

    Ok(())
}

fn manage_config(config: &HarnessConfig, env: &EnvConfig, args: cli::ConfigArgs) -> Result<()> {
    match args.command {
        cli::ConfigCommand::Show => {
            match config::find_config_file() {
                Some(path) => info!("Discovered config file: {}", path.display()),
                None => info!("No config file found, using defaults"),
            }
            println!("{}", serde_yaml::to_string(config)?);
        }

        cli::ConfigCommand::Init { path, force } => {
            if path.exists() && !force {
                bail!(
                    "Configuration file already exists: {}. Use --force to overwrite.",
                    path.display()
                );
            }
            HarnessConfig::default().save(&path)?;
            println!("✓ Configuration file created: {}", path.display());
            println!("\nEdit the file to customize your settings.");
        }

        cli::ConfigCommand::Env => {
            config::env::print_env_help();
            println!();
            env.print_summary();
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_format_selection() {
        assert_eq!(
            report_format(None, Path::new("report.json")).unwrap(),
            ReportFormat::Json
        );
        assert_eq!(
            report_format(None, Path::new("test_report")).unwrap(),
            ReportFormat::Text
        );
        assert_eq!(
            report_format(Some("csv"), Path::new("report.json")).unwrap(),
            ReportFormat::Csv
        );
        assert!(report_format(Some("xml"), Path::new("r.txt")).is_err());
    }
}
