//! OpenShift cluster as returned by the public Microsoft.RedHatOpenShift API

use crate::version::Version;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenShiftCluster {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<OpenShiftClusterProperties>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenShiftClusterProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provisioning_state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_profile: Option<ClusterProfile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub master_profile: Option<MasterProfile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worker_profiles: Option<Vec<WorkerProfile>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_group_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MasterProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vm_size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subnet_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vm_size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subnet_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<i32>,
}

impl OpenShiftCluster {
    fn properties(&self) -> Result<&OpenShiftClusterProperties> {
        self.properties
            .as_ref()
            .ok_or_else(|| Error::MissingField("properties".into()))
    }

    /// Installed OpenShift version from `clusterProfile.version`
    pub fn install_version(&self) -> Result<Version> {
        let version = self
            .properties()?
            .cluster_profile
            .as_ref()
            .and_then(|p| p.version.as_deref())
            .ok_or_else(|| Error::MissingField("properties.clusterProfile.version".into()))?;
        Version::parse(version)
    }

    /// Master and worker subnet IDs, deduplicated and sorted
    pub fn subnet_ids(&self) -> Result<Vec<String>> {
        let properties = self.properties()?;

        let master = properties
            .master_profile
            .as_ref()
            .and_then(|p| p.subnet_id.clone())
            .ok_or_else(|| Error::MissingField("properties.masterProfile.subnetId".into()))?;

        let mut subnets = BTreeSet::new();
        subnets.insert(master);

        for profile in properties.worker_profiles.iter().flatten() {
            let subnet = profile
                .subnet_id
                .clone()
                .ok_or_else(|| Error::MissingField("properties.workerProfiles[].subnetId".into()))?;
            subnets.insert(subnet);
        }

        Ok(subnets.into_iter().collect())
    }
}
