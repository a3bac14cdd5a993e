use crate::output::{self, OutputFormat};
use anyhow::Result;
use aro_e2e::all_scenarios;
use serde::Serialize;
use tabled::Tabled;

#[derive(Debug, Serialize, Tabled)]
struct ScenarioRow {
    name: String,
    description: String,
}

fn rows() -> Vec<ScenarioRow> {
    all_scenarios()
        .iter()
        .map(|s| ScenarioRow {
            name: s.name().to_string(),
            description: s.description().to_string(),
        })
        .collect()
}

pub fn handle_list_command(format: OutputFormat) -> Result<()> {
    output::print_output(rows(), format)
}
