use std::fmt;
use thiserror::Error;

pub type DiscoveryResult<T> = Result<T, DiscoveryError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Group,
    PermissionSet
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Group => write!(f, "group"),
            Self::PermissionSet => write!(f, "permission set")
        }
    }
}

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("no access to {service} from this execution context")]
    AccessDenied { service: &'static str },

    #[error("no SSO instances found")]
    NoInstances,

    #[error("{kind} not found: {name}")]
    NotFound { kind: ResourceKind, name: String },

    #[error("{operation} failed: {message}")]
    ExternalService {
        operation: &'static str,
        message: String
    },

    #[error("{operation} cancelled")]
    Cancelled { operation: &'static str },

    #[error("Configuration error: {0}")]
    ConfigError(String)
}

impl DiscoveryError {
    pub fn external(operation: &'static str, message: impl ToString) -> Self {
        Self::ExternalService {
            operation,
            message: message.to_string()
        }
    }

    /// Transient service failures are the only errors worth retrying; the
    /// engine itself never retries.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ExternalService { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NoInstances | Self::NotFound { .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}
