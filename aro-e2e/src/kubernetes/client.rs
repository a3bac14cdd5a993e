//! Kubernetes client wrapper
//!
//! Wraps the kube-rs Client with the API server address it talks to.

use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};
use std::path::Path;
use std::time::Duration;

use super::error::{K8sError, K8sResult};
use crate::config::KubernetesConfig;

/// Wrapper around kube-rs Client
#[derive(Clone)]
pub struct K8sClient {
    inner: Client,
    api_server: String,
}

impl K8sClient {
    /// Build a client from suite configuration
    ///
    /// An explicit kubeconfig path wins; otherwise the config is inferred
    /// from `KUBECONFIG`, `~/.kube/config` or the in-cluster service account.
    pub async fn connect(config: &KubernetesConfig) -> K8sResult<Self> {
        let mut kube_config = match &config.kubeconfig {
            Some(path) => Self::config_from_file(path, config.context.as_deref()).await?,
            None => Config::infer().await.map_err(|e| {
                K8sError::InvalidKubeconfig(format!("Failed to infer config: {}", e))
            })?,
        };

        kube_config.connect_timeout = Some(Duration::from_secs(config.connect_timeout_secs));
        kube_config.read_timeout = Some(Duration::from_secs(config.read_timeout_secs));

        Self::from_config(kube_config)
    }

    async fn config_from_file(path: &Path, context: Option<&str>) -> K8sResult<Config> {
        let kubeconfig = Kubeconfig::read_from(path).map_err(|e| {
            K8sError::InvalidKubeconfig(format!("Failed to read {}: {}", path.display(), e))
        })?;

        Config::from_custom_kubeconfig(
            kubeconfig,
            &KubeConfigOptions {
                context: context.map(String::from),
                ..Default::default()
            },
        )
        .await
        .map_err(|e| K8sError::InvalidKubeconfig(format!("Failed to create config: {}", e)))
    }

    /// Build a client from an already-resolved kube config
    pub fn from_config(config: Config) -> K8sResult<Self> {
        let api_server = config.cluster_url.to_string();

        let client = Client::try_from(config)
            .map_err(|e| K8sError::InvalidKubeconfig(format!("Failed to create client: {}", e)))?;

        Ok(Self {
            inner: client,
            api_server,
        })
    }

    /// Get the inner kube-rs Client
    pub fn inner(&self) -> &Client {
        &self.inner
    }

    /// Get API server URL
    pub fn api_server(&self) -> &str {
        &self.api_server
    }

    /// Kubernetes server version, e.g. `v1.25.14+bcb9a60`
    pub async fn server_version(&self) -> K8sResult<String> {
        let version = self.inner.apiserver_version().await?;
        Ok(version.git_version)
    }
}

impl std::fmt::Debug for K8sClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("K8sClient")
            .field("api_server", &self.api_server)
            .finish()
    }
}
