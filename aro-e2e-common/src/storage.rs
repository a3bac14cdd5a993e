//! Microsoft.Storage account resource (only the network rule set)

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageAccount {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<StorageAccountProperties>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageAccountProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provisioning_state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_acls: Option<NetworkRuleSet>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkRuleSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub virtual_network_rules: Option<Vec<VirtualNetworkRule>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualNetworkRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

impl StorageAccount {
    pub fn network_rule_set(&self) -> Option<&NetworkRuleSet> {
        self.properties.as_ref().and_then(|p| p.network_acls.as_ref())
    }

    /// Whether a virtual network rule exists for `subnet_id`
    ///
    /// ARM does not preserve the casing of resource IDs, so the comparison
    /// ignores case.
    pub fn allows_subnet(&self, subnet_id: &str) -> bool {
        self.network_rule_set()
            .and_then(|acls| acls.virtual_network_rules.as_ref())
            .map(|rules| {
                rules
                    .iter()
                    .filter_map(|rule| rule.id.as_deref())
                    .any(|id| id.eq_ignore_ascii_case(subnet_id))
            })
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allows_subnet_ignores_case() {
        let account: StorageAccount = serde_json::from_value(serde_json::json!({
            "name": "clusterabc",
            "properties": {
                "networkAcls": {
                    "defaultAction": "Deny",
                    "virtualNetworkRules": [
                        {"id": "/subscriptions/S/resourceGroups/VNET-RG/providers/Microsoft.Network/virtualNetworks/dev-vnet/subnets/master", "action": "Allow"}
                    ]
                }
            }
        }))
        .unwrap();

        assert!(account.allows_subnet(
            "/subscriptions/s/resourceGroups/vnet-rg/providers/Microsoft.Network/virtualNetworks/dev-vnet/subnets/master"
        ));
        assert!(!account.allows_subnet(
            "/subscriptions/s/resourceGroups/vnet-rg/providers/Microsoft.Network/virtualNetworks/dev-vnet/subnets/worker"
        ));
    }

    #[test]
    fn test_no_network_acls() {
        assert!(!StorageAccount::default().allows_subnet("/subscriptions/s"));
    }
}
