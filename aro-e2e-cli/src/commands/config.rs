use crate::output::{self, OutputFormat};
use crate::ConfigCommands;
use anyhow::Result;
use aro_e2e::SuiteConfig;

/// Returns false when validation fails
pub fn handle_config_command(
    command: ConfigCommands,
    config: &SuiteConfig,
    format: OutputFormat,
) -> Result<bool> {
    match command {
        ConfigCommands::Sample => {
            print!("{}", SuiteConfig::generate_sample());
        }
        ConfigCommands::Show => {
            let redacted = config.redacted();
            match format {
                OutputFormat::Json => output::print_json(&redacted)?,
                OutputFormat::Yaml => output::print_yaml(&redacted)?,
                OutputFormat::Table => print!("{}", toml::to_string_pretty(&redacted)?),
            }
        }
        ConfigCommands::Validate => match config.validate() {
            Ok(()) => {
                output::print_success("Configuration is valid");
                output::print_info(&format!("Cluster: {}", config.cluster_resource_id()));
            }
            Err(e) => {
                output::print_error(&e.to_string());
                return Ok(false);
            }
        },
    }

    Ok(true)
}
