//! StatefulSet operations
//!
//! The suite's stateful set is a single busybox replica with one persistent
//! volume claim, so the storage class under test has to provision and attach
//! a volume before the pod can become ready.

use k8s_openapi::api::apps::v1::{StatefulSet, StatefulSetSpec};
use k8s_openapi::api::core::v1::{
    PersistentVolumeClaim, PersistentVolumeClaimSpec, PodSpec, PodTemplateSpec,
    VolumeMount, VolumeResourceRequirements,
};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{LabelSelector, ObjectMeta};
use kube::api::{Api, PostParams};
use std::collections::BTreeMap;

use super::{labels, sleep_container};
use crate::kubernetes::client::K8sClient;
use crate::kubernetes::error::{K8sError, K8sResult};
use crate::kubernetes::ready;

const VOLUME_NAME: &str = "busybox";
const VOLUME_SIZE: &str = "2Gi";

/// Name of the stateful set created for a storage class
pub fn statefulset_name(storage_class: &str) -> String {
    format!("busybox-{}", storage_class)
}

/// Build the busybox stateful set backed by `storage_class`
pub fn build_statefulset(storage_class: &str) -> StatefulSet {
    let app = labels("busybox");

    let mut container = sleep_container("busybox", "busybox");
    container.volume_mounts = Some(vec![VolumeMount {
        name: VOLUME_NAME.to_string(),
        mount_path: "/data".to_string(),
        read_only: Some(false),
        ..Default::default()
    }]);

    let claim = PersistentVolumeClaim {
        metadata: ObjectMeta {
            name: Some(VOLUME_NAME.to_string()),
            ..Default::default()
        },
        spec: Some(PersistentVolumeClaimSpec {
            access_modes: Some(vec!["ReadWriteOnce".to_string()]),
            storage_class_name: Some(storage_class.to_string()),
            resources: Some(VolumeResourceRequirements {
                requests: Some(BTreeMap::from([(
                    "storage".to_string(),
                    Quantity(VOLUME_SIZE.to_string()),
                )])),
                ..Default::default()
            }),
            ..Default::default()
        }),
        ..Default::default()
    };

    StatefulSet {
        metadata: ObjectMeta {
            name: Some(statefulset_name(storage_class)),
            ..Default::default()
        },
        spec: Some(StatefulSetSpec {
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
                    containers: vec![container],
                    ..Default::default()
                }),
            },
            volume_claim_templates: Some(vec![claim]),
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// Create the busybox stateful set for `storage_class` in `namespace`
pub async fn create_statefulset(
    client: &K8sClient,
    namespace: &str,
    storage_class: &str,
) -> K8sResult<StatefulSet> {
    let sts: Api<StatefulSet> = Api::namespaced(client.inner().clone(), namespace);
    let created = sts
        .create(&PostParams::default(), &build_statefulset(storage_class))
        .await?;

    tracing::info!(
        namespace,
        storage_class,
        name = %statefulset_name(storage_class),
        "Created stateful set"
    );
    Ok(created)
}

/// Get a specific StatefulSet
pub async fn get_statefulset(
    client: &K8sClient,
    namespace: &str,
    name: &str,
) -> K8sResult<StatefulSet> {
    let sts: Api<StatefulSet> = Api::namespaced(client.inner().clone(), namespace);
    Ok(sts.get(name).await?)
}

/// Fetch the stateful set and fail unless it is ready
pub async fn check_statefulset_ready(
    client: &K8sClient,
    namespace: &str,
    name: &str,
) -> K8sResult<()> {
    let sts = get_statefulset(client, namespace, name).await?;
    let status = ready::statefulset_status(&sts);
    if status.is_ready() {
        Ok(())
    } else {
        Err(K8sError::not_ready("StatefulSet", name, status.to_string()))
    }
}
