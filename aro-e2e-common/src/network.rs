//! Microsoft.Network subnet resource
//!
//! Fields the suite does not touch are carried through `extra` so that a
//! GET-modify-PUT cycle leaves the rest of the subnet as it was.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const STORAGE_SERVICE: &str = "Microsoft.Storage";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subnet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<SubnetProperties>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubnetProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_endpoints: Option<Vec<ServiceEndpoint>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provisioning_state: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceEndpoint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locations: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provisioning_state: Option<String>,
}

impl ServiceEndpoint {
    /// `Microsoft.Storage` in every location
    pub fn storage() -> Self {
        Self {
            service: Some(STORAGE_SERVICE.to_string()),
            locations: Some(vec!["*".to_string()]),
            provisioning_state: None,
        }
    }
}

impl Subnet {
    /// Append a service endpoint, creating the properties block if absent
    pub fn add_service_endpoint(&mut self, endpoint: ServiceEndpoint) {
        self.properties
            .get_or_insert_with(SubnetProperties::default)
            .service_endpoints
            .get_or_insert_with(Vec::new)
            .push(endpoint);
    }

    /// Replace the service endpoints with an empty list
    pub fn clear_service_endpoints(&mut self) {
        self.properties
            .get_or_insert_with(SubnetProperties::default)
            .service_endpoints = Some(Vec::new());
    }

    pub fn service_endpoints(&self) -> &[ServiceEndpoint] {
        self.properties
            .as_ref()
            .and_then(|p| p.service_endpoints.as_deref())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_endpoint_to_bare_subnet() {
        let mut subnet = Subnet::default();
        subnet.add_service_endpoint(ServiceEndpoint::storage());

        assert_eq!(subnet.service_endpoints(), &[ServiceEndpoint::storage()]);

        let json = serde_json::to_value(&subnet).unwrap();
        assert_eq!(
            json["properties"]["serviceEndpoints"][0]["service"],
            "Microsoft.Storage"
        );
        assert_eq!(json["properties"]["serviceEndpoints"][0]["locations"][0], "*");
    }

    #[test]
    fn test_round_trip_keeps_unknown_properties() {
        let mut subnet: Subnet = serde_json::from_value(serde_json::json!({
            "id": "/sub/master",
            "name": "master",
            "etag": "W/\"1\"",
            "properties": {
                "addressPrefix": "10.0.0.0/23",
                "privateLinkServiceNetworkPolicies": "Disabled",
                "networkSecurityGroup": {"id": "/nsg"},
                "serviceEndpoints": [{"service": "Microsoft.ContainerRegistry", "locations": ["*"]}]
            }
        }))
        .unwrap();

        subnet.add_service_endpoint(ServiceEndpoint::storage());
        let json = serde_json::to_value(&subnet).unwrap();

        assert_eq!(json["etag"], "W/\"1\"");
        assert_eq!(json["properties"]["privateLinkServiceNetworkPolicies"], "Disabled");
        assert_eq!(json["properties"]["networkSecurityGroup"]["id"], "/nsg");
        assert_eq!(json["properties"]["serviceEndpoints"].as_array().unwrap().len(), 2);

        subnet.clear_service_endpoints();
        assert!(subnet.service_endpoints().is_empty());
        let json = serde_json::to_value(&subnet).unwrap();
        assert_eq!(json["properties"]["serviceEndpoints"], serde_json::json!([]));
    }
}
