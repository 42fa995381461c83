//! geodiag - spatial data diagnosis from the command line
//!
//! ## Commands
//!
//! - `diagnose`: diagnose one or more geometry snapshots (JSON)
//! - `profiles`: print the active use-case profiles
//! - `features`: print the feature map of a snapshot

mod telemetry;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use geodiag_core::GeometryCollection;
use geodiag_pipeline::{extract_features, DiagnosticConfig, DiagnosticRecord, DiagnosticRunner};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{info, Level};

#[derive(Parser)]
#[command(name = "geodiag")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Infer CRS, scale and accuracy of spatial datasets and rate their fitness for use", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    /// YAML file overriding knobs, region table or profiles
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Diagnose geometry snapshots, one JSON record per file
    Diagnose {
        /// Snapshot files (serialized GeometryCollection)
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Pretty-print the records
        #[arg(long)]
        pretty: bool,
    },

    /// Print the active use-case profiles as YAML
    Profiles,

    /// Print the feature map of a snapshot and its diagnosis
    Features {
        file: PathBuf,

        /// Pretty-print the map
        #[arg(long)]
        pretty: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    telemetry::init_tracing(cli.json, level);

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Diagnose { files, pretty } => cmd_diagnose(config, files, pretty).await,
        Commands::Profiles => cmd_profiles(&config),
        Commands::Features { file, pretty } => cmd_features(config, &file, pretty),
    }
}

fn load_config(path: Option<&Path>) -> Result<DiagnosticConfig> {
    let Some(path) = path else {
        return Ok(DiagnosticConfig::default());
    };
    let yaml = std::fs::read_to_string(path).with_context(|| format!("Failed to read config {:?}", path))?;
    let config = DiagnosticConfig::from_yaml(&yaml).with_context(|| format!("Invalid config {:?}", path))?;
    info!(path = %path.display(), profiles = config.profiles.len(), "config loaded");
    Ok(config)
}

fn load_snapshot(path: &Path) -> Result<GeometryCollection> {
    let text = std::fs::read_to_string(path).with_context(|| format!("Failed to read snapshot {:?}", path))?;
    serde_json::from_str(&text).with_context(|| format!("Failed to parse snapshot {:?}", path))
}

fn print_json(value: &Value, pretty: bool) -> Result<()> {
    let text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", text);
    Ok(())
}

/// Diagnose every file on the blocking pool, print in argument order.
async fn cmd_diagnose(config: DiagnosticConfig, files: Vec<PathBuf>, pretty: bool) -> Result<()> {
    let runner = Arc::new(DiagnosticRunner::new(config));
    info!(files = files.len(), "diagnosing");

    let mut join_set = JoinSet::new();
    for (idx, path) in files.iter().cloned().enumerate() {
        let runner = Arc::clone(&runner);
        join_set.spawn_blocking(move || -> Result<(usize, DiagnosticRecord)> {
            let collection = load_snapshot(&path)?;
            Ok((idx, runner.diagnose(&collection)))
        });
    }

    let mut records: Vec<Option<DiagnosticRecord>> = files.iter().map(|_| None).collect();
    while let Some(joined) = join_set.join_next().await {
        let (idx, record) = joined.context("diagnosis task failed")??;
        records[idx] = Some(record);
    }

    for (path, record) in files.iter().zip(records) {
        let record = record.with_context(|| format!("missing diagnosis for {:?}", path))?;
        print_json(&serde_json::to_value(&record)?, pretty)?;
    }
    Ok(())
}

fn cmd_profiles(config: &DiagnosticConfig) -> Result<()> {
    let yaml = serde_yaml::to_string(&config.profiles).context("Failed to serialize profiles")?;
    print!("{}", yaml);
    Ok(())
}

fn cmd_features(config: DiagnosticConfig, file: &Path, pretty: bool) -> Result<()> {
    let collection = load_snapshot(file)?;
    let runner = DiagnosticRunner::new(config);
    let record = runner.diagnose(&collection);
    let features = extract_features(&collection, Some(&record), &geodiag_core::TransverseMercatorReprojector);
    print_json(&serde_json::to_value(&features)?, pretty)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_diagnose() {
        let cli = Cli::try_parse_from(["geodiag", "diagnose", "a.json", "b.json", "--pretty"]).unwrap();
        match cli.command {
            Commands::Diagnose { files, pretty } => {
                assert_eq!(files.len(), 2);
                assert!(pretty);
            }
            _ => panic!("expected diagnose"),
        }
        assert!(Cli::try_parse_from(["geodiag", "diagnose"]).is_err());
    }

    #[test]
    fn test_missing_config_is_default() {
        assert_eq!(load_config(None).unwrap(), DiagnosticConfig::default());
    }
}
