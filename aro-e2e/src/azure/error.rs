//! Azure Resource Manager error types

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx answer from ARM, decoded from the standard error envelope
    #[error("ARM request failed with status {status}: {code}: {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Long-running operation finished in a non-success state
    #[error("Operation on {resource} ended in state {status}: {message}")]
    OperationFailed {
        resource: String,
        status: String,
        message: String,
    },

    #[error("Timed out waiting for operation on {0}")]
    Timeout(String),
}

impl ArmError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

/// `{"error": {"code": ..., "message": ...}}`
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorEnvelope {
    #[serde(default)]
    pub error: Option<ErrorBody>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

impl ErrorEnvelope {
    /// Turn a failed response body into an [`ArmError::Api`]
    pub(crate) fn into_error(body: &str, status: u16) -> ArmError {
        let parsed = serde_json::from_str::<ErrorEnvelope>(body)
            .ok()
            .and_then(|e| e.error);

        match parsed {
            Some(ErrorBody { code, message }) => ArmError::Api {
                status,
                code,
                message,
            },
            None => ArmError::Api {
                status,
                code: "Unknown".to_string(),
                message: body.to_string(),
            },
        }
    }
}

pub type ArmResult<T> = std::result::Result<T, ArmError>;
