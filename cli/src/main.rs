//! fundsplit: run splitter scenarios and inspect configuration.

mod scenario;

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;

use fundsplit_splitter::SplitterConfig;
use fundsplit_utils::LogFormat;

use crate::scenario::Scenario;

#[derive(Parser)]
#[command(name = "fundsplit", about = "Fund splitter accounts paid out through claim tickets")]
struct Cli {
    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long, env = "FUNDSPLIT_CONFIG")]
    config: Option<PathBuf>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "FUNDSPLIT_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "FUNDSPLIT_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    /// Subcommand.
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Run a scenario against an in-memory bank and ticket issuer.
    Simulate {
        /// Scenario file (TOML).
        scenario: PathBuf,

        /// Print the report as JSON instead of text.
        #[arg(long)]
        json: bool,
    },
    /// Print the effective configuration as TOML.
    Config,
}

/// Layer CLI flags over the file configuration (or the defaults).
fn effective_config(file: Option<SplitterConfig>, log_level: Option<String>, log_format: Option<LogFormat>) -> SplitterConfig {
    let base = file.unwrap_or_default();
    SplitterConfig {
        log_level: log_level.unwrap_or(base.log_level),
        log_format: log_format.unwrap_or(base.log_format),
        ..base
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let file_config = match &cli.config {
        Some(path) => {
            let path = path.to_string_lossy();
            Some(SplitterConfig::from_toml_file(&path).with_context(|| format!("loading config {path}"))?)
        }
        None => None,
    };
    let config = effective_config(file_config, cli.log_level, cli.log_format);
    fundsplit_utils::init_logging(config.log_format, &config.log_level);
    if let Some(path) = &cli.config {
        tracing::info!("Loaded config from {}", path.display());
    }

    match cli.command {
        Command::Simulate { scenario: path, json } => {
            let loaded = Scenario::from_toml_file(&path)?;
            tracing::info!(
                scenario = %path.display(),
                steps = loaded.steps.len(),
                "running scenario"
            );
            let report = scenario::run(&loaded, config)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", report.render_text());
            }
        }
        Command::Config => {
            print!("{}", config.to_toml_string());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use fundsplit_splitter::InitialFunding;
    use std::io::Write;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn flags_override_the_file() {
        let file = SplitterConfig {
            log_level: "warn".to_string(),
            initial_funding: InitialFunding::Distribute,
            ..SplitterConfig::default()
        };
        let config = effective_config(Some(file), Some("debug".to_string()), None);
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.log_format, LogFormat::Human);
        assert_eq!(config.initial_funding, InitialFunding::Distribute);
    }

    #[test]
    fn no_file_means_defaults() {
        let config = effective_config(None, None, Some(LogFormat::Json));
        assert_eq!(config.log_level, "info");
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn parses_simulate_arguments() {
        let cli = Cli::try_parse_from(["fundsplit", "--log-format", "json", "simulate", "s.toml", "--json"]).unwrap();
        assert_eq!(cli.log_format, Some(LogFormat::Json));
        assert!(matches!(cli.command, Command::Simulate { json: true, .. }));
    }

    #[test]
    fn demo_scenario_runs() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../demos/team_payout.toml");
        let scenario = Scenario::from_toml_file(std::path::Path::new(path)).unwrap();
        let report = scenario::run(&scenario, SplitterConfig::default()).unwrap();
        assert!(!report.splitters.is_empty());
    }

    #[test]
    fn scenario_file_round_trip_through_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            [[assets]]
            contract_address = "0x1"
            contract_name = "FlowToken"
            receiver_path = "flowTokenReceiver"
            "#
        )
        .unwrap();
        let scenario = Scenario::from_toml_file(file.path()).unwrap();
        assert_eq!(scenario.assets.len(), 1);
        assert!(scenario.steps.is_empty());
    }
}
