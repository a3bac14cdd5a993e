//! Microsoft.Network subnets

use aro_e2e_common::network::Subnet;

use super::arm::ArmClient;
use super::error::ArmResult;

pub const NETWORK_API_VERSION: &str = "2020-08-01";

/// Subnet operations within the client's subscription
#[derive(Debug, Clone)]
pub struct SubnetsClient {
    arm: ArmClient,
}

impl SubnetsClient {
    pub fn new(arm: ArmClient) -> Self {
        Self { arm }
    }

    fn path(&self, resource_group: &str, vnet: &str, subnet: &str) -> String {
        self.arm.resource_path(
            resource_group,
            &format!(
                "Microsoft.Network/virtualNetworks/{}/subnets/{}",
                urlencoding::encode(vnet),
                urlencoding::encode(subnet)
            ),
        )
    }

    pub async fn get(&self, resource_group: &str, vnet: &str, subnet: &str) -> ArmResult<Subnet> {
        self.arm
            .get(&self.path(resource_group, vnet, subnet), NETWORK_API_VERSION)
            .await
    }

    /// PUT the subnet and wait until ARM reports the update finished
    pub async fn create_or_update_and_wait(
        &self,
        resource_group: &str,
        vnet: &str,
        subnet_name: &str,
        subnet: &Subnet,
    ) -> ArmResult<Subnet> {
        tracing::info!(
            resource_group,
            vnet,
            subnet = subnet_name,
            endpoints = subnet.service_endpoints().len(),
            "Updating subnet"
        );

        self.arm
            .put_and_wait(
                &self.path(resource_group, vnet, subnet_name),
                NETWORK_API_VERSION,
                subnet,
            )
            .await
    }
}
