//! Cluster scenarios: storage, load balancers and the internal registry

use async_trait::async_trait;
use aro_e2e_common::network::ServiceEndpoint;
use aro_e2e_common::resource_id::split_subnet_id;
use aro_e2e_common::{OpenShiftCluster, ProvisioningState, ResourceId, Version};

use super::{by, Scenario, SuiteContext};
use crate::error::{ensure, E2eError, E2eResult};
use crate::kubernetes::networking::services::{
    check_service_ready, create_load_balancer_service, internal_load_balancer_annotations,
};
use crate::kubernetes::workloads::deployments::{
    check_deployment_ready, create_internal_registry_deployment,
};
use crate::kubernetes::workloads::statefulsets::{
    check_statefulset_ready, create_statefulset, statefulset_name,
};
use crate::poll::eventually;

pub const AZURE_FILE_STORAGE_CLASS: &str = "azurefile-csi";
pub const INTERNAL_REGISTRY_DEPLOYMENT: &str = "internal-registry-deploy";

/// Default Azure Disk storage class for a given install version
///
/// Clusters installed before 4.11 only ship the in-tree class.
pub fn disk_storage_class(install_version: &Version) -> &'static str {
    if *install_version < Version::new(4, 11) {
        "managed-premium"
    } else {
        "managed-csi"
    }
}

/// A cluster subnet broken into the parts the subnets API wants
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubnetRef {
    pub id: String,
    pub resource_group: String,
    pub vnet: String,
    pub name: String,
}

impl SubnetRef {
    pub fn parse(subnet_id: &str) -> E2eResult<Self> {
        let (vnet_id, name) = split_subnet_id(subnet_id)?;
        let vnet = ResourceId::parse(&vnet_id)?;
        Ok(Self {
            id: subnet_id.to_string(),
            resource_group: vnet.resource_group,
            vnet: vnet.name,
            name,
        })
    }
}

/// Master and worker subnets of the cluster, without duplicates
pub fn cluster_subnets(oc: &OpenShiftCluster) -> E2eResult<Vec<SubnetRef>> {
    oc.subnet_ids()?
        .iter()
        .map(|id| SubnetRef::parse(id))
        .collect()
}

async fn get_cluster(ctx: &SuiteContext) -> E2eResult<OpenShiftCluster> {
    Ok(ctx
        .azure
        .openshift_clusters
        .get(ctx.resource_group(), ctx.cluster_name())
        .await?)
}

async fn wait_for_statefulset(ctx: &SuiteContext, storage_class: &str) -> E2eResult<()> {
    let name = statefulset_name(storage_class);
    let namespace = ctx.namespace();

    by("verifying the stateful set is ready");
    eventually(ctx.poll, format!("stateful set {} to be ready", name), || {
        check_statefulset_ready(&ctx.kube, namespace, &name)
    })
    .await?;
    Ok(())
}

pub struct AzureDiskStatefulSet;

#[async_trait]
impl Scenario for AzureDiskStatefulSet {
    fn name(&self) -> &'static str {
        "azure-disk-statefulset"
    }

    fn description(&self) -> &'static str {
        "can run a stateful set which is using Azure Disk storage"
    }

    async fn run(&self, ctx: &SuiteContext) -> E2eResult<()> {
        by("creating stateful set");
        let oc = get_cluster(ctx).await?;
        let storage_class = disk_storage_class(&oc.install_version()?);

        create_statefulset(&ctx.kube, ctx.namespace(), storage_class).await?;
        wait_for_statefulset(ctx, storage_class).await
    }
}

pub struct AzureFileStatefulSet;

impl AzureFileStatefulSet {
    async fn add_storage_endpoints(ctx: &SuiteContext, subnets: &[SubnetRef]) -> E2eResult<()> {
        for s in subnets {
            let mut subnet = ctx
                .azure
                .subnets
                .get(&s.resource_group, &s.vnet, &s.name)
                .await?;
            subnet.add_service_endpoint(ServiceEndpoint::storage());
            ctx.azure
                .subnets
                .create_or_update_and_wait(&s.resource_group, &s.vnet, &s.name, &subnet)
                .await?;
        }
        Ok(())
    }

    async fn clear_endpoint(ctx: &SuiteContext, s: &SubnetRef) -> E2eResult<()> {
        let mut subnet = ctx
            .azure
            .subnets
            .get(&s.resource_group, &s.vnet, &s.name)
            .await?;
        subnet.clear_service_endpoints();
        ctx.azure
            .subnets
            .create_or_update_and_wait(&s.resource_group, &s.vnet, &s.name, &subnet)
            .await?;
        Ok(())
    }

    /// Every subnet is attempted; failures are chained in subnet order
    async fn clear_endpoints(ctx: &SuiteContext, subnets: &[SubnetRef]) -> E2eResult<()> {
        by("cleaning up the cluster subnets (removing service endpoints)");
        let mut result = Ok(());
        for s in subnets {
            if let Err(e) = Self::clear_endpoint(ctx, s).await {
                tracing::warn!(subnet = %s.id, error = %e, "Failed to remove service endpoints");
                result = E2eError::combine(result, Err(e));
            }
        }
        result
    }

    async fn pucm(ctx: &SuiteContext) -> E2eResult<aro_e2e_common::AdminOpenShiftCluster> {
        by("PUCM-ing the cluster");
        let response = ctx.admin.pucm(&ctx.cluster_id).await?;
        ensure(
            response.is_ok(),
            format!(
                "PUCM returned status {}: {}",
                response.status,
                response.error.as_deref().unwrap_or_default()
            ),
        )?;

        let oc = eventually(ctx.poll, "PUCM to finish", move || async move {
            let oc = ctx.admin.get_cluster(&ctx.cluster_id).await?;
            if oc.properties.provisioning_state == ProvisioningState::Succeeded {
                Ok(oc)
            } else {
                Err(E2eError::Assertion(format!(
                    "provisioningState is {}",
                    oc.properties.provisioning_state
                )))
            }
        })
        .await?;

        ensure(
            oc.properties.last_admin_update_error.is_empty(),
            format!(
                "lastAdminUpdateError is not empty: {}",
                oc.properties.last_admin_update_error
            ),
        )?;
        Ok(oc)
    }

    async fn check_network_rules(
        ctx: &SuiteContext,
        oc: &aro_e2e_common::AdminOpenShiftCluster,
        subnets: &[SubnetRef],
    ) -> E2eResult<()> {
        by("checking the storage account vnet rules to verify that they include the cluster subnets");
        let resource_group = oc.cluster_resource_group().ok_or_else(|| {
            aro_e2e_common::Error::MissingField("properties.clusterProfile.resourceGroupId".into())
        })?;

        for name in oc.storage_account_names() {
            let account = ctx
                .azure
                .storage_accounts
                .get_properties(resource_group, &name)
                .await?;

            let missing: Vec<&str> = subnets
                .iter()
                .filter(|s| !account.allows_subnet(&s.id))
                .map(|s| s.id.as_str())
                .collect();

            ensure(
                missing.is_empty(),
                format!(
                    "storage account {} has no virtual network rule for {}",
                    name,
                    missing.join(", ")
                ),
            )?;
        }
        Ok(())
    }
}

#[async_trait]
impl Scenario for AzureFileStatefulSet {
    fn name(&self) -> &'static str {
        "azure-file-statefulset"
    }

    fn description(&self) -> &'static str {
        "can run a stateful set which is using the default Azure File storage class backed by the cluster storage account"
    }

    async fn run(&self, ctx: &SuiteContext) -> E2eResult<()> {
        by("adding the Microsoft.Storage service endpoint to each cluster subnet");
        let subnets = cluster_subnets(&get_cluster(ctx).await?)?;

        let result = async {
            Self::add_storage_endpoints(ctx, &subnets).await?;
            let oc = Self::pucm(ctx).await?;

            by("creating stateful set");
            create_statefulset(&ctx.kube, ctx.namespace(), AZURE_FILE_STORAGE_CLASS).await?;
            wait_for_statefulset(ctx, AZURE_FILE_STORAGE_CLASS).await?;

            Self::check_network_rules(ctx, &oc, &subnets).await
        }
        .await;

        let cleanup = Self::clear_endpoints(ctx, &subnets).await;
        E2eError::combine(result, cleanup)
    }
}

pub struct LoadBalancerServices;

#[async_trait]
impl Scenario for LoadBalancerServices {
    fn name(&self) -> &'static str {
        "load-balancer-services"
    }

    fn description(&self) -> &'static str {
        "can create load balancer services"
    }

    async fn run(&self, ctx: &SuiteContext) -> E2eResult<()> {
        let namespace = ctx.namespace();

        by("creating an external load balancer service");
        create_load_balancer_service(&ctx.kube, namespace, "elb", Default::default()).await?;

        by("creating an internal load balancer service");
        create_load_balancer_service(
            &ctx.kube,
            namespace,
            "ilb",
            internal_load_balancer_annotations(),
        )
        .await?;

        for name in ["elb", "ilb"] {
            by(&format!("verifying the {} service is ready", name));
            eventually(ctx.poll, format!("service {} to be ready", name), || {
                check_service_ready(&ctx.kube, namespace, name)
            })
            .await?;
        }
        Ok(())
    }
}

/// Pulls from the in-cluster registry, which travels node > gateway > registry storage account
pub struct InternalRegistry;

#[async_trait]
impl Scenario for InternalRegistry {
    fn name(&self) -> &'static str {
        "internal-registry"
    }

    fn description(&self) -> &'static str {
        "can access and use the internal container registry"
    }

    async fn run(&self, ctx: &SuiteContext) -> E2eResult<()> {
        let namespace = ctx.namespace();

        by("creating a test deployment from an internal container registry");
        create_internal_registry_deployment(&ctx.kube, namespace, INTERNAL_REGISTRY_DEPLOYMENT)
            .await?;

        by("verifying the deployment is ready");
        eventually(ctx.poll, "internal registry deployment to be ready", || {
            check_deployment_ready(&ctx.kube, namespace, INTERNAL_REGISTRY_DEPLOYMENT)
        })
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MASTER: &str = "/subscriptions/0000/resourceGroups/vnet-rg/providers/Microsoft.Network/virtualNetworks/dev-vnet/subnets/master";
    const WORKER: &str = "/subscriptions/0000/resourceGroups/vnet-rg/providers/Microsoft.Network/virtualNetworks/dev-vnet/subnets/worker";

    #[test]
    fn test_disk_storage_class_cutover() {
        assert_eq!(
            disk_storage_class(&Version::parse("4.10.40").unwrap()),
            "managed-premium"
        );
        assert_eq!(
            disk_storage_class(&Version::parse("4.11.0").unwrap()),
            "managed-csi"
        );
        assert_eq!(
            disk_storage_class(&Version::parse("4.14.16").unwrap()),
            "managed-csi"
        );
    }

    #[test]
    fn test_subnet_ref_parse() {
        let subnet = SubnetRef::parse(MASTER).unwrap();
        assert_eq!(subnet.resource_group, "vnet-rg");
        assert_eq!(subnet.vnet, "dev-vnet");
        assert_eq!(subnet.name, "master");
        assert_eq!(subnet.id, MASTER);

        assert!(SubnetRef::parse("/subscriptions/0000/resourceGroups/rg").is_err());
    }

    #[test]
    fn test_cluster_subnets_deduplicates() {
        let oc: OpenShiftCluster = serde_json::from_value(serde_json::json!({
            "properties": {
                "masterProfile": {"subnetId": MASTER},
                "workerProfiles": [
                    {"name": "worker", "subnetId": WORKER},
                    {"name": "worker2", "subnetId": WORKER}
                ]
            }
        }))
        .unwrap();

        let subnets = cluster_subnets(&oc).unwrap();
        assert_eq!(subnets.len(), 2);
        assert_eq!(subnets[0].name, "master");
        assert_eq!(subnets[1].name, "worker");
    }
}
