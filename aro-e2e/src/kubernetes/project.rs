//! OpenShift project lifecycle
//!
//! Each scenario runs in a fresh project. Creation is only complete once the
//! namespace exists, its `default` service account has been provisioned and
//! the project reports phase `Active`.

use k8s_openapi::api::core::v1::{Namespace, ServiceAccount};
use kube::api::{Api, ApiResource, DeleteParams, DynamicObject, GroupVersionKind, PostParams};

use crate::kubernetes::client::K8sClient;
use crate::kubernetes::error::{K8sError, K8sResult};

const PROJECT_KIND: &str = "Project";

fn project_resource() -> ApiResource {
    let gvk = GroupVersionKind::gvk("project.openshift.io", "v1", PROJECT_KIND);
    ApiResource::from_gvk_with_plural(&gvk, "projects")
}

/// A named OpenShift project
#[derive(Debug, Clone)]
pub struct Project {
    client: K8sClient,
    name: String,
}

impl Project {
    pub fn new(client: K8sClient, name: impl Into<String>) -> Self {
        Self {
            client,
            name: name.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn projects(&self) -> Api<DynamicObject> {
        Api::all_with(self.client.inner().clone(), &project_resource())
    }

    /// Create the project
    pub async fn create(&self) -> K8sResult<()> {
        let project = DynamicObject::new(&self.name, &project_resource());
        self.projects()
            .create(&PostParams::default(), &project)
            .await?;

        tracing::info!(project = %self.name, "Created project");
        Ok(())
    }

    /// Check that the project and its default resources are in place
    pub async fn verify(&self) -> K8sResult<()> {
        let namespaces: Api<Namespace> = Api::all(self.client.inner().clone());
        namespaces.get(&self.name).await?;

        let service_accounts: Api<ServiceAccount> =
            Api::namespaced(self.client.inner().clone(), &self.name);
        service_accounts
            .get_opt("default")
            .await?
            .ok_or_else(|| {
                K8sError::not_ready(PROJECT_KIND, &self.name, "default service account missing")
            })?;

        let project = self.projects().get(&self.name).await?;
        let phase = project_phase(&project);
        if phase != Some("Active") {
            return Err(K8sError::not_ready(
                PROJECT_KIND,
                &self.name,
                format!("phase is {}", phase.unwrap_or("unset")),
            ));
        }

        Ok(())
    }

    /// Delete the project
    pub async fn delete(&self) -> K8sResult<()> {
        self.projects()
            .delete(&self.name, &DeleteParams::default())
            .await?;

        tracing::info!(project = %self.name, "Deleted project");
        Ok(())
    }

    /// Succeeds only once the API server no longer knows the project
    pub async fn verify_deleted(&self) -> K8sResult<()> {
        match self.projects().get_opt(&self.name).await? {
            None => Ok(()),
            Some(_) => Err(K8sError::StillExists {
                kind: PROJECT_KIND.to_string(),
                name: self.name.clone(),
            }),
        }
    }
}

fn project_phase(project: &DynamicObject) -> Option<&str> {
    project
        .data
        .get("status")
        .and_then(|s| s.get("phase"))
        .and_then(|p| p.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_resource() {
        let ar = project_resource();
        assert_eq!(ar.group, "project.openshift.io");
        assert_eq!(ar.api_version, "project.openshift.io/v1");
        assert_eq!(ar.plural, "projects");
    }

    #[test]
    fn test_project_phase() {
        let mut project = DynamicObject::new("test-e2e", &project_resource());
        assert_eq!(project_phase(&project), None);

        project.data = serde_json::json!({"status": {"phase": "Terminating"}});
        assert_eq!(project_phase(&project), Some("Terminating"));
    }
}
