//! Kubernetes error types

use thiserror::Error;

/// Kubernetes-specific errors
#[derive(Debug, Error)]
pub enum K8sError {
    /// Error from kube-rs client
    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),

    /// Invalid kubeconfig
    #[error("Invalid kubeconfig: {0}")]
    InvalidKubeconfig(String),

    /// Resource exists but has not converged yet
    #[error("{kind}/{name} is not ready: {reason}")]
    NotReady {
        kind: String,
        name: String,
        reason: String,
    },

    /// Resource still present when it should be gone
    #[error("{kind}/{name} still exists")]
    StillExists { kind: String, name: String },
}

impl K8sError {
    pub fn not_ready(kind: &str, name: &str, reason: impl Into<String>) -> Self {
        Self::NotReady {
            kind: kind.to_string(),
            name: name.to_string(),
            reason: reason.into(),
        }
    }

    /// Whether the API server answered 404
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::KubeError(kube::Error::Api(e)) if e.code == 404)
    }
}

/// Result type alias for Kubernetes operations
pub type K8sResult<T> = std::result::Result<T, K8sError>;
