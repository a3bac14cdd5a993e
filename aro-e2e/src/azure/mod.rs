//! Azure Resource Manager access
//!
//! A thin REST client plus typed wrappers for the three resource types the
//! suite reads or modifies: subnets, storage accounts and OpenShift clusters.

pub mod arm;
pub mod credential;
pub mod error;
pub mod network;
pub mod openshift;
pub mod storage;

pub use arm::{ArmClient, LroPolicy};
pub use credential::Credential;
pub use error::{ArmError, ArmResult};

use crate::config::SuiteConfig;

/// All ARM clients the suite uses, sharing one HTTP client and token cache
#[derive(Debug, Clone)]
pub struct AzureClients {
    pub subnets: network::SubnetsClient,
    pub storage_accounts: storage::StorageAccountsClient,
    pub openshift_clusters: openshift::OpenShiftClustersClient,
}

impl AzureClients {
    pub fn new(config: &SuiteConfig) -> ArmResult<Self> {
        let arm = ArmClient::new(&config.azure, &config.cluster.subscription_id)?;
        Ok(Self::from_arm(arm, &config.azure.openshift_api_version))
    }

    pub fn from_arm(arm: ArmClient, openshift_api_version: &str) -> Self {
        Self {
            subnets: network::SubnetsClient::new(arm.clone()),
            storage_accounts: storage::StorageAccountsClient::new(arm.clone()),
            openshift_clusters: openshift::OpenShiftClustersClient::new(arm, openshift_api_version),
        }
    }
}
