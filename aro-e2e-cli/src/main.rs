//! ARO e2e CLI
//!
//! Runs the cluster end-to-end scenarios against a live cluster

mod commands;
mod output;

use anyhow::{Context, Result};
use aro_e2e::logging::LoggingConfig;
use aro_e2e::SuiteConfig;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Configuration file (defaults to ARO_E2E_CONFIG, ./aro-e2e.toml, /etc/aro-e2e/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output format (table, json, yaml)
    #[arg(short, long, default_value = "table", global = true)]
    output: String,

    /// Log level or filter directive, overriding the configuration
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the scenarios against the configured cluster
    Run {
        /// Only run scenarios whose name matches this regex
        #[arg(long)]
        focus: Option<String>,
        /// Skip scenarios whose name matches this regex
        #[arg(long)]
        skip: Option<String>,
        /// Stop after the first failing scenario
        #[arg(long)]
        fail_fast: bool,
    },
    /// List the available scenarios
    List,
    /// Inspect configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Generate shell completions
    Completions {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print a sample configuration file
    Sample,
    /// Show the effective configuration with secrets masked
    Show,
    /// Check that the effective configuration is usable
    Validate,
}

fn load_config(path: Option<&PathBuf>) -> Result<SuiteConfig> {
    match path {
        Some(path) => {
            let mut config = SuiteConfig::load_from_file(path)
                .with_context(|| format!("loading {}", path.display()))?;
            config.apply_env_overrides(|key| std::env::var(key).ok());
            Ok(config)
        }
        None => Ok(SuiteConfig::load()?),
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let format = output::OutputFormat::from_str(&cli.output);

    let mut config = load_config(cli.config.as_ref())?;
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }

    let _guard = LoggingConfig::from(&config.logging)
        .init()
        .map_err(|e| anyhow::anyhow!("failed to initialize logging: {}", e))?;

    let success = match cli.command {
        Commands::Run {
            focus,
            skip,
            fail_fast,
        } => {
            let args = commands::run::RunArgs {
                focus,
                skip,
                fail_fast,
            };
            commands::run::handle_run_command(config, args, format).await?
        }
        Commands::List => {
            commands::list::handle_list_command(format)?;
            true
        }
        Commands::Config { command } => {
            commands::config::handle_config_command(command, &config, format)?
        }
        Commands::Completions { shell } => {
            generate_completions(shell);
            true
        }
    };

    Ok(if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Generate shell completions
fn generate_completions(shell: clap_complete::Shell) {
    use clap::CommandFactory;
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();

    generate(shell, &mut cmd, name, &mut io::stdout());
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
    fn test_parse_run() {
        let cli = Cli::try_parse_from([
            "aro-e2e",
            "run",
            "--focus",
            "statefulset",
            "--fail-fast",
            "-o",
            "json",
        ])
        .unwrap();

        assert_eq!(cli.output, "json");
        match cli.command {
            Commands::Run {
                focus,
                skip,
                fail_fast,
            } => {
                assert_eq!(focus.as_deref(), Some("statefulset"));
                assert!(skip.is_none());
                assert!(fail_fast);
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn test_parse_config_show() {
        let cli = Cli::try_parse_from(["aro-e2e", "config", "show"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Config {
                command: ConfigCommands::Show
            }
        ));
    }
}
