//! Deployment operations

use k8s_openapi::api::apps::v1::{Deployment, DeploymentSpec};
use k8s_openapi::api::core::v1::{PodSpec, PodTemplateSpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{LabelSelector, ObjectMeta};
use kube::api::{Api, PostParams};

use super::{labels, sleep_container};
use crate::kubernetes::client::K8sClient;
use crate::kubernetes::error::{K8sError, K8sResult};
use crate::kubernetes::ready;

/// The `oc` CLI image as published by the cluster's own image registry
pub const INTERNAL_REGISTRY_CLI_IMAGE: &str =
    "image-registry.openshift-image-registry.svc:5000/openshift/cli";

/// Build a single-replica deployment running the CLI image from the internal registry
pub fn build_internal_registry_deployment(name: &str, namespace: &str) -> Deployment {
    let app = labels(name);

    Deployment {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            ..Default::default()
        },
        spec: Some(DeploymentSpec {
            replicas: Some(1),
            selector: LabelSelector {
                match_labels: Some(app.clone()),
                ..Default::default()
            },
            template: PodTemplateSpec {
                metadata: Some(ObjectMeta {
                    labels: Some(app),
                    ..Default::default()
                }),
                spec: Some(PodSpec {
                    containers: vec![sleep_container("cli", INTERNAL_REGISTRY_CLI_IMAGE)],
                    ..Default::default()
                }),
            },
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// Create the internal registry deployment
pub async fn create_internal_registry_deployment(
    client: &K8sClient,
    namespace: &str,
    name: &str,
) -> K8sResult<Deployment> {
    let deployments: Api<Deployment> = Api::namespaced(client.inner().clone(), namespace);
    let created = deployments
        .create(
            &PostParams::default(),
            &build_internal_registry_deployment(name, namespace),
        )
        .await?;

    tracing::info!(namespace, name, "Created deployment");
    Ok(created)
}

/// Get a specific Deployment
pub async fn get_deployment(
    client: &K8sClient,
    namespace: &str,
    name: &str,
) -> K8sResult<Deployment> {
    let deployments: Api<Deployment> = Api::namespaced(client.inner().clone(), namespace);
    Ok(deployments.get(name).await?)
}

/// Fetch the deployment and fail unless it is ready
pub async fn check_deployment_ready(
    client: &K8sClient,
    namespace: &str,
    name: &str,
) -> K8sResult<()> {
    let deploy = get_deployment(client, namespace, name).await?;
    let status = ready::deployment_status(&deploy);
    if status.is_ready() {
        Ok(())
    } else {
        Err(K8sError::not_ready("Deployment", name, status.to_string()))
    }
}
