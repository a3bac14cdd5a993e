//! Suite-level error type
//!
//! Each layer keeps its own error enum; scenarios see them all through
//! [`E2eError`] so they can use `?` freely.

use thiserror::Error;

use crate::admin::AdminError;
use crate::azure::ArmError;
use crate::config::ConfigError;
use crate::kubernetes::K8sError;
use crate::poll::PollError;

#[derive(Debug, Error)]
pub enum E2eError {
    #[error(transparent)]
    Common(#[from] aro_e2e_common::Error),

    #[error(transparent)]
    Kubernetes(#[from] K8sError),

    #[error(transparent)]
    Arm(#[from] ArmError),

    #[error(transparent)]
    Admin(#[from] AdminError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Poll(#[from] PollError),

    /// A scenario expectation did not hold
    #[error("Assertion failed: {0}")]
    Assertion(String),

    /// Cleanup failed after the scenario itself had already failed
    #[error("{primary}; cleanup also failed: {cleanup}")]
    WithCleanup {
        primary: Box<E2eError>,
        cleanup: Box<E2eError>,
    },
}

pub type E2eResult<T> = std::result::Result<T, E2eError>;

/// Fail with an assertion error unless `condition` holds
pub fn ensure(condition: bool, message: impl Into<String>) -> E2eResult<()> {
    if condition {
        Ok(())
    } else {
        Err(E2eError::Assertion(message.into()))
    }
}

impl E2eError {
    /// Combine the result of a scenario body with the result of its cleanup
    ///
    /// The body's error is reported first; a cleanup error alone still fails.
    pub fn combine<T>(result: E2eResult<T>, cleanup: E2eResult<()>) -> E2eResult<T> {
        match (result, cleanup) {
            (Ok(value), Ok(())) => Ok(value),
            (Ok(_), Err(cleanup)) => Err(cleanup),
            (Err(primary), Ok(())) => Err(primary),
            (Err(primary), Err(cleanup)) => Err(E2eError::WithCleanup {
                primary: Box::new(primary),
                cleanup: Box::new(cleanup),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure() {
        assert!(ensure(true, "fine").is_ok());
        let err = ensure(false, "lastAdminUpdateError is not empty").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Assertion failed: lastAdminUpdateError is not empty"
        );
    }

    #[test]
    fn test_combine_orders_primary_first() {
        let result: E2eResult<()> = Err(E2eError::Assertion("rules missing".into()));
        let cleanup: E2eResult<()> = Err(E2eError::Assertion("subnet reset".into()));

        let err = E2eError::combine(result, cleanup).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Assertion failed: rules missing; cleanup also failed: Assertion failed: subnet reset"
        );
    }

    #[test]
    fn test_combine_cleanup_only() {
        let err = E2eError::combine(Ok(1), Err(E2eError::Assertion("x".into()))).unwrap_err();
        assert!(matches!(err, E2eError::Assertion(_)));
        assert_eq!(E2eError::combine(Ok(1), Ok(())).unwrap(), 1);
    }

    #[test]
    fn test_from_layers() {
        let err: E2eError = aro_e2e_common::Error::InvalidSubnetId("bad".into()).into();
        assert!(err.to_string().contains("bad"));

        let err: E2eError = K8sError::not_ready("StatefulSet", "busybox", "0/1").into();
        assert!(matches!(err, E2eError::Kubernetes(_)));
    }
}
