use crate::output::{self, OutputFormat};
use anyhow::Result;
use aro_e2e::suite::{ScenarioOutcome, ScenarioStatus};
use aro_e2e::{all_scenarios, Runner, SuiteConfig, SuiteContext, SuiteReport};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tabled::Tabled;

pub struct RunArgs {
    pub focus: Option<String>,
    pub skip: Option<String>,
    pub fail_fast: bool,
}

#[derive(Debug, Serialize, Tabled)]
struct OutcomeRow {
    scenario: String,
    status: String,
    duration: String,
    error: String,
}

impl From<&ScenarioOutcome> for OutcomeRow {
    fn from(outcome: &ScenarioOutcome) -> Self {
        Self {
            scenario: outcome.name.clone(),
            status: outcome.status.to_string(),
            duration: output::format_duration(outcome.duration.as_secs()),
            error: outcome
                .error
                .as_deref()
                .map(|e| output::truncate(e, 80))
                .unwrap_or_default(),
        }
    }
}

fn build_runner(args: &RunArgs) -> Result<Runner> {
    let mut runner = Runner::new().fail_fast(args.fail_fast);
    if let Some(focus) = &args.focus {
        runner = runner.focus(focus)?;
    }
    if let Some(skip) = &args.skip {
        runner = runner.skip(skip)?;
    }
    Ok(runner)
}

/// Run the suite and print the report; returns whether every scenario passed
pub async fn handle_run_command(
    config: SuiteConfig,
    args: RunArgs,
    format: OutputFormat,
) -> Result<bool> {
    let runner = build_runner(&args)?;
    let scenarios = all_scenarios();

    if !scenarios.iter().any(|s| runner.selects(s.name())) {
        output::print_warning("No scenarios match the given filters");
        return Ok(true);
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")?,
    );
    spinner.set_message(format!("Connecting to cluster {}...", config.cluster.name));
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));

    let ctx = SuiteContext::connect(config).await;
    spinner.finish_and_clear();
    let ctx = ctx?;

    let report = runner.run(&ctx, &scenarios).await;
    print_report(&report, format)?;

    Ok(report.success())
}

fn print_report(report: &SuiteReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => output::print_json(report)?,
        OutputFormat::Yaml => output::print_yaml(report)?,
        OutputFormat::Table => {
            let rows: Vec<OutcomeRow> = report.outcomes.iter().map(OutcomeRow::from).collect();
            output::print_table(rows);

            let summary = format!(
                "{} passed, {} failed, {} skipped in {} (run {})",
                report.passed(),
                report.failed(),
                report.skipped(),
                output::format_duration(report.total_duration().as_secs()),
                report.run_id
            );
            if report.success() {
                output::print_success(&summary);
            } else {
                output::print_error(&summary);
                for outcome in report
                    .outcomes
                    .iter()
                    .filter(|o| o.status == ScenarioStatus::Failed)
                {
                    output::print_info(&format!(
                        "{}: {}",
                        outcome.name,
                        outcome.error.as_deref().unwrap_or_default()
                    ));
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_outcome_row() {
        let outcome = ScenarioOutcome::failed(
            "azure-file-statefulset",
            Duration::from_secs(754),
            "Assertion failed: lastAdminUpdateError is not empty",
        );
        let row = OutcomeRow::from(&outcome);
        assert_eq!(row.status, "failed");
        assert_eq!(row.duration, "12m 34s");
        assert!(row.error.contains("lastAdminUpdateError"));

        let skipped = OutcomeRow::from(&ScenarioOutcome::skipped("internal-registry"));
        assert_eq!(skipped.error, "");
    }

    #[test]
    fn test_build_runner_rejects_bad_regex() {
        let args = RunArgs {
            focus: Some("[".into()),
            skip: None,
            fail_fast: false,
        };
        assert!(build_runner(&args).is_err());

        let args = RunArgs {
            focus: None,
            skip: Some("registry".into()),
            fail_fast: true,
        };
        let runner = build_runner(&args).unwrap();
        assert!(!runner.selects("internal-registry"));
        assert!(runner.selects("load-balancer-services"));
    }
}
