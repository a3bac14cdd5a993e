//! Common types and utilities shared between aro-e2e and aro-e2e-cli
//!
//! Everything in here is plain data: parsed ARM resource IDs, OpenShift
//! versions and the JSON shapes returned by the RP, admin, network and
//! storage APIs. No I/O happens in this crate.

pub mod admin;
pub mod cluster;
pub mod network;
pub mod resource_id;
pub mod storage;
pub mod version;

pub use admin::{AdminOpenShiftCluster, ProvisioningState};
pub use cluster::OpenShiftCluster;
pub use resource_id::ResourceId;
pub use version::Version;

/// Errors raised while parsing identifiers and versions
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("Invalid resource ID '{id}': {reason}")]
    InvalidResourceId { id: String, reason: String },

    #[error("Invalid subnet ID '{0}'")]
    InvalidSubnetId(String),

    #[error("Invalid version '{0}'")]
    InvalidVersion(String),

    #[error("Missing field: {0}")]
    MissingField(String),
}

pub type Result<T> = std::result::Result<T, Error>;
