//! Admin API view of an OpenShift cluster

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Provisioning state reported by the RP
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ProvisioningState {
    Creating,
    Updating,
    AdminUpdating,
    Deleting,
    Succeeded,
    Failed,
    Canceled,
    #[default]
    Unknown,
    Other(String),
}

impl ProvisioningState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Canceled)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Creating => "Creating",
            Self::Updating => "Updating",
            Self::AdminUpdating => "AdminUpdating",
            Self::Deleting => "Deleting",
            Self::Succeeded => "Succeeded",
            Self::Failed => "Failed",
            Self::Canceled => "Canceled",
            Self::Unknown => "",
            Self::Other(s) => s,
        }
    }
}

impl From<String> for ProvisioningState {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Creating" => Self::Creating,
            "Updating" => Self::Updating,
            "AdminUpdating" => Self::AdminUpdating,
            "Deleting" => Self::Deleting,
            "Succeeded" => Self::Succeeded,
            "Failed" => Self::Failed,
            "Canceled" | "Cancelled" => Self::Canceled,
            "" => Self::Unknown,
            _ => Self::Other(s),
        }
    }
}

impl From<ProvisioningState> for String {
    fn from(state: ProvisioningState) -> Self {
        state.as_str().to_string()
    }
}

impl fmt::Display for ProvisioningState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Admin view of a cluster
///
/// Every field the admin API returns is modelled here, so a strict decode
/// can tell when the RP starts exposing something new.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminOpenShiftCluster {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r#type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_data: Option<SystemData>,
    #[serde(default)]
    pub properties: AdminClusterProperties,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified_by_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified_at: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminClusterProperties {
    #[serde(default)]
    pub provisioning_state: ProvisioningState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_provisioning_state: Option<ProvisioningState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed_provisioning_state: Option<ProvisioningState>,
    #[serde(default)]
    pub last_admin_update_error: String,
    #[serde(default)]
    pub maintenance_task: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maintenance_state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator_flags: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provisioned_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_profile: Option<AdminClusterProfile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_profile: Option<FeatureProfile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub console_profile: Option<ConsoleProfile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_principal_profile: Option<ServicePrincipalProfile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_profile: Option<NetworkProfile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub master_profile: Option<MasterProfile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worker_profiles: Option<Vec<WorkerProfile>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worker_profiles_status: Option<Vec<WorkerProfile>>,
    #[serde(
        default,
        rename = "apiserverProfile",
        skip_serializing_if = "Option::is_none"
    )]
    pub api_server_profile: Option<ApiServerProfile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingress_profiles: Option<Vec<IngressProfile>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub install: Option<Install>,
    #[serde(default)]
    pub storage_suffix: String,
    #[serde(default)]
    pub image_registry_storage_account_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub infra_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hive_profile: Option<HiveProfile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registry_profiles: Option<Vec<RegistryProfile>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminClusterProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_group_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fips_validated_modules: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway_enabled: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConsoleProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServicePrincipalProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sp_object_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub software_defined_network: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pod_cidr: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_cidr: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mtu_size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outbound_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_server_private_endpoint_ip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway_private_endpoint_ip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway_private_link_id: Option<String>,
    #[serde(
        default,
        rename = "preconfiguredNSG",
        skip_serializing_if = "Option::is_none"
    )]
    pub preconfigured_nsg: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MasterProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vm_size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subnet_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encryption_at_host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disk_encryption_set_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vm_size: Option<String>,
    #[serde(default, rename = "diskSizeGB", skip_serializing_if = "Option::is_none")]
    pub disk_size_gb: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subnet_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encryption_at_host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disk_encryption_set_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiServerProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    #[serde(default, rename = "intIP", skip_serializing_if = "Option::is_none")]
    pub int_ip: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngressProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
}

/// Install progress while the cluster is being created
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Install {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub now: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HiveProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by_hive: Option<bool>,
}

/// Registry credentials as the admin API exposes them (never the password)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_date: Option<String>,
}

impl AdminOpenShiftCluster {
    /// Names of the cluster storage account and the image registry storage account
    pub fn storage_account_names(&self) -> Vec<String> {
        vec![
            format!("cluster{}", self.properties.storage_suffix),
            self.properties.image_registry_storage_account_name.clone(),
        ]
    }

    /// Name of the managed resource group, taken from `clusterProfile.resourceGroupId`
    pub fn cluster_resource_group(&self) -> Option<&str> {
        self.properties
            .cluster_profile
            .as_ref()
            .and_then(|p| p.resource_group_id.as_deref())
            .map(|id| crate::resource_id::last_segment(id, '/'))
            .filter(|rg| !rg.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provisioning_state_strings() {
        let state: ProvisioningState = serde_json::from_str("\"AdminUpdating\"").unwrap();
        assert_eq!(state, ProvisioningState::AdminUpdating);
        assert!(!state.is_terminal());

        let state: ProvisioningState = serde_json::from_str("\"Something\"").unwrap();
        assert_eq!(state, ProvisioningState::Other("Something".into()));
        assert_eq!(serde_json::to_string(&state).unwrap(), "\"Something\"");

        assert!(ProvisioningState::Succeeded.is_terminal());
        assert!(ProvisioningState::Failed.is_terminal());
    }

    #[test]
    fn test_storage_accounts_and_resource_group() {
        let oc: AdminOpenShiftCluster = serde_json::from_value(serde_json::json!({
            "id": "/subscriptions/s/resourceGroups/rg/providers/Microsoft.RedHatOpenShift/openShiftClusters/c",
            "properties": {
                "provisioningState": "Succeeded",
                "storageSuffix": "x1y2z",
                "imageRegistryStorageAccountName": "imageregistryabc",
                "clusterProfile": {"resourceGroupId": "/subscriptions/s/resourceGroups/aro-x1y2z"}
            }
        }))
        .unwrap();

        assert_eq!(oc.storage_account_names(), vec!["clusterx1y2z", "imageregistryabc"]);
        assert_eq!(oc.cluster_resource_group(), Some("aro-x1y2z"));
        assert!(oc.properties.last_admin_update_error.is_empty());
    }

    #[test]
    fn test_admin_fields_round_trip() {
        let raw = serde_json::json!({
            "name": "c",
            "systemData": {"createdByType": "User"},
            "properties": {
                "provisioningState": "Succeeded",
                "lastAdminUpdateError": "",
                "networkProfile": {"podCidr": "10.128.0.0/14", "preconfiguredNSG": "Disabled"},
                "apiserverProfile": {"visibility": "Public", "intIP": "10.0.0.4"},
                "workerProfiles": [{"name": "worker", "diskSizeGB": 128, "count": 3}],
                "registryProfiles": [{"name": "arosvc.azurecr.io", "username": "u"}]
            }
        });
        let oc: AdminOpenShiftCluster = serde_json::from_value(raw.clone()).unwrap();
        let back = serde_json::to_value(&oc).unwrap();

        assert_eq!(back["systemData"], raw["systemData"]);
        assert_eq!(back["properties"]["networkProfile"], raw["properties"]["networkProfile"]);
        assert_eq!(back["properties"]["apiserverProfile"], raw["properties"]["apiserverProfile"]);
        assert_eq!(back["properties"]["workerProfiles"], raw["properties"]["workerProfiles"]);
        assert_eq!(back["properties"]["lastAdminUpdateError"], "");
    }

    #[test]
    fn test_unmodelled_fields_are_dropped() {
        let oc: AdminOpenShiftCluster = serde_json::from_value(serde_json::json!({
            "leakedInternalField": "secret",
            "properties": {"registryProfiles": [{"username": "u", "password": "p"}]}
        }))
        .unwrap();
        let back = serde_json::to_value(&oc).unwrap();

        assert!(back.get("leakedInternalField").is_none());
        assert!(back["properties"]["registryProfiles"][0].get("password").is_none());
    }

    #[test]
    fn test_missing_resource_group() {
        assert_eq!(AdminOpenShiftCluster::default().cluster_resource_group(), None);
    }
}
