//! Sequential scenario runner with focus/skip filtering

use regex::Regex;
use std::future::Future;
use tokio::time::Instant;
use tracing::Instrument;

use super::report::{ScenarioOutcome, SuiteReport};
use super::{Scenario, SuiteContext};
use crate::error::{E2eError, E2eResult};

#[derive(Debug, Clone, Default)]
pub struct Runner {
    focus: Option<Regex>,
    skip: Option<Regex>,
    fail_fast: bool,
}

impl Runner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only run scenarios whose name matches `pattern`
    pub fn focus(mut self, pattern: &str) -> E2eResult<Self> {
        self.focus = Some(compile(pattern)?);
        Ok(self)
    }

    /// Skip scenarios whose name matches `pattern`
    pub fn skip(mut self, pattern: &str) -> E2eResult<Self> {
        self.skip = Some(compile(pattern)?);
        Ok(self)
    }

    /// Stop after the first failure; later scenarios are reported as skipped
    pub fn fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    pub fn selects(&self, name: &str) -> bool {
        let focused = self.focus.as_ref().map_or(true, |re| re.is_match(name));
        let skipped = self.skip.as_ref().is_some_and(|re| re.is_match(name));
        focused && !skipped
    }

    /// Run the scenarios against a live cluster
    pub async fn run(&self, ctx: &SuiteContext, scenarios: &[Box<dyn Scenario>]) -> SuiteReport {
        let names: Vec<&str> = scenarios.iter().map(|s| s.name()).collect();
        self.run_each(&names, |i| ctx.run_isolated(scenarios[i].as_ref()))
            .await
    }

    /// Drive `exec` for every selected scenario index, in order
    pub async fn run_each<F, Fut>(&self, names: &[&str], mut exec: F) -> SuiteReport
    where
        F: FnMut(usize) -> Fut,
        Fut: Future<Output = E2eResult<()>>,
    {
        let mut report = SuiteReport::new();
        let mut halted = false;

        tracing::info!(run_id = %report.run_id, scenarios = names.len(), "Starting suite");

        for (i, name) in names.iter().enumerate() {
            if halted || !self.selects(name) {
                tracing::debug!(scenario = name, "Skipping");
                report.push(ScenarioOutcome::skipped(*name));
                continue;
            }

            let span = tracing::info_span!("scenario", name = %name);
            let start = Instant::now();
            let result = exec(i).instrument(span).await;
            let duration = start.elapsed();

            match result {
                Ok(()) => {
                    tracing::info!(scenario = name, ?duration, "Scenario passed");
                    report.push(ScenarioOutcome::passed(*name, duration));
                }
                Err(e) => {
                    tracing::error!(scenario = name, ?duration, error = %e, "Scenario failed");
                    report.push(ScenarioOutcome::failed(*name, duration, &e));
                    halted = self.fail_fast;
                }
            }
        }

        report.finish();
        tracing::info!(
            passed = report.passed(),
            failed = report.failed(),
            skipped = report.skipped(),
            "Suite finished"
        );
        report
    }
}

fn compile(pattern: &str) -> E2eResult<Regex> {
    Regex::new(pattern)
        .map_err(|e| E2eError::Assertion(format!("invalid scenario filter '{}': {}", pattern, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::suite::ScenarioStatus;
    use std::cell::RefCell;

    const NAMES: [&str; 4] = [
        "azure-disk-statefulset",
        "azure-file-statefulset",
        "load-balancer-services",
        "internal-registry",
    ];

    fn statuses(report: &SuiteReport) -> Vec<ScenarioStatus> {
        report.outcomes.iter().map(|o| o.status).collect()
    }

    #[test]
    fn test_focus_and_skip() {
        let runner = Runner::new().focus("statefulset").unwrap();
        assert!(runner.selects("azure-disk-statefulset"));
        assert!(!runner.selects("internal-registry"));

        let runner = runner.skip("file").unwrap();
        assert!(runner.selects("azure-disk-statefulset"));
        assert!(!runner.selects("azure-file-statefulset"));

        assert!(Runner::new().selects("anything"));
    }

    #[test]
    fn test_invalid_filter() {
        assert!(matches!(
            Runner::new().focus("(unclosed"),
            Err(E2eError::Assertion(_))
        ));
    }

    #[tokio::test]
    async fn test_runs_all_in_order() {
        let ran = RefCell::new(Vec::new());
        let report = Runner::new()
            .run_each(&NAMES, |i| {
                ran.borrow_mut().push(i);
                async { Ok(()) }
            })
            .await;

        assert_eq!(*ran.borrow(), vec![0, 1, 2, 3]);
        assert!(report.success());
        assert_eq!(report.passed(), 4);
    }

    #[tokio::test]
    async fn test_failure_continues_without_fail_fast() {
        let report = Runner::new()
            .run_each(&NAMES, |i| async move {
                if i == 1 {
                    Err(E2eError::Assertion("rules missing".into()))
                } else {
                    Ok(())
                }
            })
            .await;

        assert_eq!(
            statuses(&report),
            vec![
                ScenarioStatus::Passed,
                ScenarioStatus::Failed,
                ScenarioStatus::Passed,
                ScenarioStatus::Passed
            ]
        );
        assert_eq!(
            report.outcomes[1].error.as_deref(),
            Some("Assertion failed: rules missing")
        );
    }

    #[tokio::test]
    async fn test_fail_fast_skips_the_rest() {
        let report = Runner::new()
            .fail_fast(true)
            .run_each(&NAMES, |i| async move {
                if i == 0 {
                    Err(E2eError::Assertion("not ready".into()))
                } else {
                    Ok(())
                }
            })
            .await;

        assert_eq!(
            statuses(&report),
            vec![
                ScenarioStatus::Failed,
                ScenarioStatus::Skipped,
                ScenarioStatus::Skipped,
                ScenarioStatus::Skipped
            ]
        );
        assert!(!report.success());
    }

    #[tokio::test]
    async fn test_unselected_are_skipped() {
        let report = Runner::new()
            .skip("^internal-registry$")
            .unwrap()
            .run_each(&NAMES, |_| async { Ok(()) })
            .await;

        assert_eq!(report.skipped(), 1);
        assert_eq!(report.outcomes[3].status, ScenarioStatus::Skipped);
    }
}
