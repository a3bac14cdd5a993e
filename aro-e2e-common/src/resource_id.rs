//! Azure Resource Manager resource IDs

use crate::{Error, Result};
use std::fmt;

pub const OPENSHIFT_PROVIDER: &str = "Microsoft.RedHatOpenShift";
pub const OPENSHIFT_CLUSTER_TYPE: &str = "openShiftClusters";

/// A parsed ARM resource ID
///
/// `/subscriptions/{sub}/resourceGroups/{rg}/providers/{ns}/{type}/{name}`
/// optionally followed by `/{childType}/{childName}` pairs. The last pair
/// determines `resource_type` and `name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceId {
    pub subscription_id: String,
    pub resource_group: String,
    pub provider: String,
    pub resource_type: String,
    pub name: String,
    raw: String,
}

impl ResourceId {
    /// Parse an ARM resource ID
    pub fn parse(id: &str) -> Result<Self> {
        let invalid = |reason: &str| Error::InvalidResourceId {
            id: id.to_string(),
            reason: reason.to_string(),
        };

        let parts: Vec<&str> = id.trim_matches('/').split('/').collect();
        if parts.len() < 8 || parts.len() % 2 != 0 {
            return Err(invalid("unexpected number of segments"));
        }

        if !parts[0].eq_ignore_ascii_case("subscriptions") {
            return Err(invalid("missing subscriptions segment"));
        }
        if !parts[2].eq_ignore_ascii_case("resourceGroups") {
            return Err(invalid("missing resourceGroups segment"));
        }
        if !parts[4].eq_ignore_ascii_case("providers") {
            return Err(invalid("missing providers segment"));
        }
        if parts.iter().any(|p| p.is_empty()) {
            return Err(invalid("empty segment"));
        }

        let n = parts.len();
        Ok(Self {
            subscription_id: parts[1].to_string(),
            resource_group: parts[3].to_string(),
            provider: parts[5].to_string(),
            resource_type: parts[n - 2].to_string(),
            name: parts[n - 1].to_string(),
            raw: id.to_string(),
        })
    }

    /// The ID exactly as it was parsed
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl std::str::FromStr for ResourceId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Split a subnet ID into its virtual network ID and subnet name
pub fn split_subnet_id(subnet_id: &str) -> Result<(String, String)> {
    let trimmed = subnet_id.trim_end_matches('/');
    let (head, name) = trimmed
        .rsplit_once('/')
        .ok_or_else(|| Error::InvalidSubnetId(subnet_id.to_string()))?;
    let (vnet_id, marker) = head
        .rsplit_once('/')
        .ok_or_else(|| Error::InvalidSubnetId(subnet_id.to_string()))?;

    if !marker.eq_ignore_ascii_case("subnets") || name.is_empty() || vnet_id.is_empty() {
        return Err(Error::InvalidSubnetId(subnet_id.to_string()));
    }

    Ok((vnet_id.to_string(), name.to_string()))
}

/// Token following the last `sep` in `s`, or all of `s` if there is none
pub fn last_segment(s: &str, sep: char) -> &str {
    match s.rfind(sep) {
        Some(i) => &s[i + sep.len_utf8()..],
        None => s,
    }
}

/// Resource ID of an OpenShift cluster
pub fn cluster_resource_id(subscription_id: &str, resource_group: &str, name: &str) -> String {
    format!(
        "/subscriptions/{}/resourceGroups/{}/providers/{}/{}/{}",
        subscription_id, resource_group, OPENSHIFT_PROVIDER, OPENSHIFT_CLUSTER_TYPE, name
    )
}
