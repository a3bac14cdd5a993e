//! Scenario framework
//!
//! A [`SuiteContext`] holds every client a scenario needs. Each scenario runs
//! inside a fresh `test-e2e` project that is created before and removed after
//! it, whatever the outcome.

pub mod cluster;
pub mod report;
pub mod runner;

use async_trait::async_trait;

use crate::admin::AdminClient;
use crate::azure::AzureClients;
use crate::config::SuiteConfig;
use crate::error::{E2eError, E2eResult};
use crate::kubernetes::{K8sClient, Project, TEST_NAMESPACE};
use crate::poll::{eventually, PollConfig};

pub use report::{ScenarioOutcome, ScenarioStatus, SuiteReport};
pub use runner::Runner;

/// Shared clients and settings for a suite run
#[derive(Debug, Clone)]
pub struct SuiteContext {
    pub config: SuiteConfig,
    pub kube: K8sClient,
    pub azure: AzureClients,
    pub admin: AdminClient,
    /// ARM resource ID of the cluster under test
    pub cluster_id: String,
    pub poll: PollConfig,
}

impl SuiteContext {
    /// Build every client from configuration
    pub async fn connect(config: SuiteConfig) -> E2eResult<Self> {
        config.validate()?;

        let kube = K8sClient::connect(&config.kubernetes).await?;
        let azure = AzureClients::new(&config)?;
        let admin = AdminClient::new(&config.admin)?;

        tracing::info!(
            api_server = %kube.api_server(),
            cluster = %config.cluster.name,
            resource_group = %config.cluster.resource_group,
            "Suite context ready"
        );

        Ok(Self {
            cluster_id: config.cluster_resource_id(),
            poll: PollConfig::from(&config.poll),
            config,
            kube,
            azure,
            admin,
        })
    }

    /// Namespace scenarios create their objects in
    pub fn namespace(&self) -> &str {
        TEST_NAMESPACE
    }

    /// Resource group holding the cluster resource (and usually its VNet)
    pub fn resource_group(&self) -> &str {
        &self.config.cluster.resource_group
    }

    pub fn cluster_name(&self) -> &str {
        &self.config.cluster.name
    }

    /// Run `scenario` between project setup and teardown
    pub async fn run_isolated(&self, scenario: &dyn Scenario) -> E2eResult<()> {
        let project = Project::new(self.kube.clone(), TEST_NAMESPACE);

        let result = async {
            by("creating the test project");
            project.create().await?;
            eventually(self.poll, "test project to be ready", || project.verify()).await?;
            scenario.run(self).await
        }
        .await;

        let cleanup = async {
            by("deleting the test project");
            project.delete().await?;
            eventually(self.poll, "test project to be deleted", || {
                project.verify_deleted()
            })
            .await?;
            Ok::<(), E2eError>(())
        }
        .await;

        E2eError::combine(result, cleanup)
    }
}

/// One end-to-end check against a live cluster
#[async_trait]
pub trait Scenario: Send + Sync {
    /// Stable identifier used for focus/skip matching
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    async fn run(&self, ctx: &SuiteContext) -> E2eResult<()>;
}

/// Log a scenario step
pub fn by(step: &str) {
    tracing::info!(step, "STEP");
}

/// Every scenario, in execution order
pub fn all_scenarios() -> Vec<Box<dyn Scenario>> {
    vec![
        Box::new(cluster::AzureDiskStatefulSet),
        Box::new(cluster::AzureFileStatefulSet),
        Box::new(cluster::LoadBalancerServices),
        Box::new(cluster::InternalRegistry),
    ]
}
