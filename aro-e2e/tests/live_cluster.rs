//! Scenarios against a real ARO cluster
//!
//! These tests need a running cluster, ARM credentials and access to the RP
//! admin API. They are ignored by default and can be run with:
//!
//! ```bash
//! CLUSTER=my-cluster RESOURCEGROUP=my-rg AZURE_SUBSCRIPTION_ID=... \
//!     cargo test --test live_cluster -- --ignored --test-threads=1
//! ```

use aro_e2e::suite::report::ScenarioStatus;
use aro_e2e::{all_scenarios, Runner, SuiteConfig, SuiteContext};

async fn context() -> SuiteContext {
    let config = SuiteConfig::load().expect("Failed to load suite configuration");
    SuiteContext::connect(config)
        .await
        .expect("Failed to connect to the cluster")
}

async fn run_one(name: &str) {
    let ctx = context().await;
    let report = Runner::new()
        .focus(&format!("^{}$", name))
        .unwrap()
        .run(&ctx, &all_scenarios())
        .await;

    let outcome = report
        .outcomes
        .iter()
        .find(|o| o.name == name)
        .expect("scenario missing from report");
    assert_eq!(
        outcome.status,
        ScenarioStatus::Passed,
        "{} failed: {:?}",
        name,
        outcome.error
    );
}

#[tokio::test]
#[ignore]
async fn test_azure_disk_statefulset() {
    run_one("azure-disk-statefulset").await;
}

#[tokio::test]
#[ignore]
async fn test_azure_file_statefulset() {
    run_one("azure-file-statefulset").await;
}

#[tokio::test]
#[ignore]
async fn test_load_balancer_services() {
    run_one("load-balancer-services").await;
}

#[tokio::test]
#[ignore]
async fn test_internal_registry() {
    run_one("internal-registry").await;
}

#[tokio::test]
#[ignore]
async fn test_api_server_reachable() {
    let ctx = context().await;
    let version = ctx.kube.server_version().await.unwrap();
    assert!(!version.is_empty());
}
