//! Permission error types

use std::time::Duration;

use thiserror::Error;

use super::types::PermissionSet;

/// Errors returned by a permission check
#[derive(Error, Debug)]
pub enum PermissionError {
    /// The user denied one or more of the requested permissions
    #[error("Permissions denied: {}", join(.denied))]
    Denied {
        /// Exactly the requested permissions that were not granted
        denied: PermissionSet,
    },

    /// No usable host appeared within the acquisition budget
    #[error("No permission host available after {waited:?}")]
    HostUnavailable {
        /// How long the coordinator waited before giving up
        waited: Duration,
    },

    /// The host that received the prompt went away without answering and
    /// no usable host took its place within the acquisition budget
    #[error("Permission host lost while awaiting a result, no replacement after {waited:?}")]
    HostLost {
        /// How long the coordinator waited for a replacement
        waited: Duration,
    },

    /// The caller abandoned the request
    #[error("Permission request cancelled")]
    Cancelled,

    /// The host never reported a result within the configured result timeout
    #[error("Timed out waiting for a permission result")]
    ResultTimedOut,

    /// The host failed to present the prompt
    #[error("Host fault: {0}")]
    HostFault(String),

    /// A check was requested for zero permissions
    #[error("Permission request must name at least one permission")]
    EmptyRequest,

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

fn join(set: &PermissionSet) -> String {
    set.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
}

impl PermissionError {
    /// Create a denial error from any collection of permission identifiers
    pub fn denied<I, S>(permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        PermissionError::Denied {
            denied: permissions.into_iter().map(Into::into).collect(),
        }
    }

    /// Create a host fault error
    pub fn host_fault(msg: impl Into<String>) -> Self {
        PermissionError::HostFault(msg.into())
    }

    /// Whether the user said no (as opposed to no UI being available to ask)
    pub fn is_denied(&self) -> bool {
        matches!(self, PermissionError::Denied { .. })
    }

    /// Whether the request was abandoned by its caller
    pub fn is_cancelled(&self) -> bool {
        matches!(self, PermissionError::Cancelled)
    }

    /// The denied subset, if this is a denial
    pub fn denied_permissions(&self) -> Option<&PermissionSet> {
        match self {
            PermissionError::Denied { denied } => Some(denied),
            _ => None,
        }
    }
}

/// Result type alias for coordinator operations
pub type CoordinatorResult<T> = Result<T, PermissionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PermissionError::denied(["camera", "microphone"]);
        assert_eq!(err.to_string(), "Permissions denied: camera, microphone");

        let err = PermissionError::Cancelled;
        assert_eq!(err.to_string(), "Permission request cancelled");
    }

    #[test]
    fn test_denied_accessors() {
        let err = PermissionError::denied(["camera"]);
        assert!(err.is_denied());
        assert!(!err.is_cancelled());
        assert!(err.denied_permissions().unwrap().contains("camera"));

        let err = PermissionError::HostUnavailable {
            waited: Duration::from_millis(1500),
        };
        assert!(!err.is_denied());
        assert!(err.denied_permissions().is_none());

        let err = PermissionError::HostLost {
            waited: Duration::from_millis(1500),
        };
        assert_eq!(
            err.to_string(),
            "Permission host lost while awaiting a result, no replacement after 1.5s"
        );
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: PermissionError = io_err.into();
        assert!(matches!(err, PermissionError::Io(_)));
    }
}
