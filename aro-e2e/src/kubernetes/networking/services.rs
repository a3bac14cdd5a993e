//! Service operations

use k8s_openapi::api::core::v1::{Service, ServicePort, ServiceSpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::api::{Api, PostParams};
use std::collections::BTreeMap;

use crate::kubernetes::client::K8sClient;
use crate::kubernetes::error::{K8sError, K8sResult};
use crate::kubernetes::ready;

/// Annotation that asks the Azure cloud provider for an internal load balancer
pub const AZURE_INTERNAL_LB_ANNOTATION: &str =
    "service.beta.kubernetes.io/azure-load-balancer-internal";

/// Build a LoadBalancer service exposing port 8080
pub fn build_load_balancer_service(
    name: &str,
    namespace: &str,
    annotations: BTreeMap<String, String>,
) -> Service {
    Service {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            annotations: Some(annotations),
            ..Default::default()
        },
        spec: Some(ServiceSpec {
            type_: Some("LoadBalancer".to_string()),
            ports: Some(vec![ServicePort {
                name: Some("port".to_string()),
                port: 8080,
                ..Default::default()
            }]),
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// Annotations for an internal (VNet-only) load balancer
pub fn internal_load_balancer_annotations() -> BTreeMap<String, String> {
    BTreeMap::from([(AZURE_INTERNAL_LB_ANNOTATION.to_string(), "true".to_string())])
}

/// Create a LoadBalancer service
pub async fn create_load_balancer_service(
    client: &K8sClient,
    namespace: &str,
    name: &str,
    annotations: BTreeMap<String, String>,
) -> K8sResult<Service> {
    let services: Api<Service> = Api::namespaced(client.inner().clone(), namespace);
    let created = services
        .create(
            &PostParams::default(),
            &build_load_balancer_service(name, namespace, annotations),
        )
        .await?;

    tracing::info!(namespace, name, "Created load balancer service");
    Ok(created)
}

/// Get a specific Service
pub async fn get_service(client: &K8sClient, namespace: &str, name: &str) -> K8sResult<Service> {
    let services: Api<Service> = Api::namespaced(client.inner().clone(), namespace);
    Ok(services.get(name).await?)
}

/// Fetch the service and fail unless it is ready
pub async fn check_service_ready(client: &K8sClient, namespace: &str, name: &str) -> K8sResult<()> {
    let svc = get_service(client, namespace, name).await?;
    if ready::service_is_ready(&svc) {
        Ok(())
    } else {
        Err(K8sError::not_ready(
            "Service",
            name,
            "no load balancer ingress published",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_external_load_balancer() {
        let svc = build_load_balancer_service("elb", "test-e2e", BTreeMap::new());
        assert_eq!(svc.metadata.name.as_deref(), Some("elb"));
        assert!(svc.metadata.annotations.unwrap().is_empty());

        let spec = svc.spec.unwrap();
        assert_eq!(spec.type_.as_deref(), Some("LoadBalancer"));
        let ports = spec.ports.unwrap();
        assert_eq!(ports.len(), 1);
        assert_eq!(ports[0].name.as_deref(), Some("port"));
        assert_eq!(ports[0].port, 8080);
    }

    #[test]
    fn test_internal_load_balancer() {
        let svc = build_load_balancer_service(
            "ilb",
            "test-e2e",
            internal_load_balancer_annotations(),
        );
        let annotations = svc.metadata.annotations.unwrap();
        assert_eq!(
            annotations.get(AZURE_INTERNAL_LB_ANNOTATION).map(String::as_str),
            Some("true")
        );
    }
}
