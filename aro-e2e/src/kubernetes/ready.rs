//! Readiness rules for the workloads the suite creates
//!
//! A workload counts as ready once the controller has observed the current
//! generation and every desired replica is both updated and serving.

use k8s_openapi::api::apps::v1::{Deployment, StatefulSet};
use k8s_openapi::api::core::v1::Service;

/// Replica counts with absent fields defaulted the way the API server does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplicaStatus {
    pub desired: i32,
    pub ready: i32,
    pub updated: i32,
    pub generation: i64,
    pub observed_generation: i64,
}

impl ReplicaStatus {
    pub fn is_ready(&self) -> bool {
        self.desired == self.ready
            && self.desired == self.updated
            && self.generation == self.observed_generation
    }
}

impl std::fmt::Display for ReplicaStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ready {}/{}, updated {}/{}, generation {} observed {}",
            self.ready,
            self.desired,
            self.updated,
            self.desired,
            self.generation,
            self.observed_generation
        )
    }
}

pub fn statefulset_status(sts: &StatefulSet) -> ReplicaStatus {
    let status = sts.status.as_ref();
    ReplicaStatus {
        desired: sts.spec.as_ref().and_then(|s| s.replicas).unwrap_or(1),
        ready: status.and_then(|s| s.ready_replicas).unwrap_or(0),
        updated: status.and_then(|s| s.updated_replicas).unwrap_or(0),
        generation: sts.metadata.generation.unwrap_or(0),
        observed_generation: status.and_then(|s| s.observed_generation).unwrap_or(0),
    }
}

/// Deployments count available replicas rather than ready ones
pub fn deployment_status(deploy: &Deployment) -> ReplicaStatus {
    let status = deploy.status.as_ref();
    ReplicaStatus {
        desired: deploy.spec.as_ref().and_then(|s| s.replicas).unwrap_or(1),
        ready: status.and_then(|s| s.available_replicas).unwrap_or(0),
        updated: status.and_then(|s| s.updated_replicas).unwrap_or(0),
        generation: deploy.metadata.generation.unwrap_or(0),
        observed_generation: status.and_then(|s| s.observed_generation).unwrap_or(0),
    }
}

pub fn statefulset_is_ready(sts: &StatefulSet) -> bool {
    statefulset_status(sts).is_ready()
}

pub fn deployment_is_ready(deploy: &Deployment) -> bool {
    deployment_status(deploy).is_ready()
}

/// LoadBalancer services are ready once an ingress point is published
pub fn service_is_ready(svc: &Service) -> bool {
    let service_type = svc.spec.as_ref().and_then(|s| s.type_.as_deref());
    match service_type {
        Some("LoadBalancer") => svc
            .status
            .as_ref()
            .and_then(|s| s.load_balancer.as_ref())
            .and_then(|lb| lb.ingress.as_ref())
            .is_some_and(|ingress| !ingress.is_empty()),
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::api::apps::v1::{
        DeploymentSpec, DeploymentStatus, StatefulSetSpec, StatefulSetStatus,
    };
    use k8s_openapi::api::core::v1::{
        LoadBalancerIngress, LoadBalancerStatus, ServiceSpec, ServiceStatus,
    };
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

    fn statefulset(replicas: Option<i32>, ready: i32, updated: i32, observed: i64) -> StatefulSet {
        StatefulSet {
            metadata: ObjectMeta {
                generation: Some(2),
                ..Default::default()
            },
            spec: Some(StatefulSetSpec {
                replicas,
                ..Default::default()
            }),
            status: Some(StatefulSetStatus {
                ready_replicas: Some(ready),
                updated_replicas: Some(updated),
                observed_generation: Some(observed),
                ..Default::default()
            }),
        }
    }

    #[test]
    fn test_statefulset_ready() {
        assert!(statefulset_is_ready(&statefulset(Some(1), 1, 1, 2)));
        assert!(statefulset_is_ready(&statefulset(None, 1, 1, 2)));
        assert!(statefulset_is_ready(&statefulset(Some(3), 3, 3, 2)));
    }

    #[test]
    fn test_statefulset_not_ready() {
        assert!(!statefulset_is_ready(&statefulset(Some(1), 0, 1, 2)));
        assert!(!statefulset_is_ready(&statefulset(Some(1), 1, 0, 2)));
        assert!(!statefulset_is_ready(&statefulset(Some(1), 1, 1, 1)));
        assert!(!statefulset_is_ready(&StatefulSet::default()));
    }

    #[test]
    fn test_deployment_uses_available_replicas() {
        let mut deploy = Deployment {
            metadata: ObjectMeta {
                generation: Some(1),
                ..Default::default()
            },
            spec: Some(DeploymentSpec {
                replicas: Some(1),
                ..Default::default()
            }),
            status: Some(DeploymentStatus {
                ready_replicas: Some(1),
                updated_replicas: Some(1),
                observed_generation: Some(1),
                ..Default::default()
            }),
        };
        assert!(!deployment_is_ready(&deploy));

        if let Some(status) = deploy.status.as_mut() {
            status.available_replicas = Some(1);
        }
        assert!(deployment_is_ready(&deploy));
        assert_eq!(
            deployment_status(&deploy).to_string(),
            "ready 1/1, updated 1/1, generation 1 observed 1"
        );
    }

    fn service(type_: &str, ingress: Option<Vec<LoadBalancerIngress>>) -> Service {
        Service {
            spec: Some(ServiceSpec {
                type_: Some(type_.to_string()),
                ..Default::default()
            }),
            status: Some(ServiceStatus {
                load_balancer: Some(LoadBalancerStatus { ingress }),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_load_balancer_service_ready() {
        assert!(!service_is_ready(&service("LoadBalancer", None)));
        assert!(!service_is_ready(&service("LoadBalancer", Some(vec![]))));
        assert!(service_is_ready(&service(
            "LoadBalancer",
            Some(vec![LoadBalancerIngress {
                ip: Some("10.0.2.7".into()),
                ..Default::default()
            }])
        )));
    }

    #[test]
    fn test_other_services_always_ready() {
        assert!(service_is_ready(&service("ClusterIP", None)));
        assert!(service_is_ready(&Service::default()));
    }
}
