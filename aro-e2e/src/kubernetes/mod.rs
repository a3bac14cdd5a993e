//! Kubernetes side of the suite
//!
//! Provides:
//! - Client construction from kubeconfig or in-cluster config
//! - OpenShift project lifecycle for per-scenario isolation
//! - Workload and service manifests the scenarios submit
//! - Readiness rules used by the polling assertions

pub mod client;
pub mod error;
pub mod networking;
pub mod project;
pub mod ready;
pub mod workloads;

pub use client::K8sClient;
pub use error::{K8sError, K8sResult};
pub use project::Project;

/// Project every scenario runs in
pub const TEST_NAMESPACE: &str = "test-e2e";
