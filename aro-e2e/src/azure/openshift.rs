//! Microsoft.RedHatOpenShift clusters (public API)

use aro_e2e_common::resource_id::{OPENSHIFT_CLUSTER_TYPE, OPENSHIFT_PROVIDER};
use aro_e2e_common::OpenShiftCluster;

use super::arm::ArmClient;
use super::error::ArmResult;

#[derive(Debug, Clone)]
pub struct OpenShiftClustersClient {
    arm: ArmClient,
    api_version: String,
}

impl OpenShiftClustersClient {
    pub fn new(arm: ArmClient, api_version: impl Into<String>) -> Self {
        Self {
            arm,
            api_version: api_version.into(),
        }
    }

    pub async fn get(&self, resource_group: &str, name: &str) -> ArmResult<OpenShiftCluster> {
        let path = self.arm.resource_path(
            resource_group,
            &format!(
                "{}/{}/{}",
                OPENSHIFT_PROVIDER,
                OPENSHIFT_CLUSTER_TYPE,
                urlencoding::encode(name)
            ),
        );
        self.arm.get(&path, &self.api_version).await
    }
}
