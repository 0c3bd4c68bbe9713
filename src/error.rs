//! Error types for restart operations

use std::fmt;

/// Cluster API call that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiAction {
    Get,
    Update,
    List,
}

impl fmt::Display for ApiAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiAction::Get => write!(f, "get"),
            ApiAction::Update => write!(f, "update"),
            ApiAction::List => write!(f, "list"),
        }
    }
}

/// Restart errors
#[derive(Debug, thiserror::Error)]
pub enum RestartError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Failed to {action} {kind} {namespace}/{name}: {source}")]
    Api {
        action: ApiAction,
        kind: String,
        namespace: String,
        name: String,
        #[source]
        source: kube::Error,
    },

    #[error("{kind} {namespace}/{name} has no pod template")]
    MissingPodTemplate {
        kind: String,
        namespace: String,
        name: String,
    },

    #[error("Owner chain still unresolved at {kind} {namespace}/{name} after {limit} levels")]
    OwnerChainTooDeep {
        kind: String,
        namespace: String,
        name: String,
        limit: usize,
    },

    #[error("Operation cancelled")]
    Cancelled,
}

impl RestartError {
    /// Whether this is an update rejected because the object changed since it was read
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            RestartError::Api {
                action: ApiAction::Update,
                source: kube::Error::Api(response),
                ..
            } if response.code == 409
        )
    }
}

/// Result type for restart operations
pub type RestartResult<T> = Result<T, RestartError>;
