//! Domain errors - error types shared by the presence engine and its collaborators

use thiserror::Error;

use crate::status::PresenceStatus;

/// Result type for presence operations
pub type PresenceResult<T> = Result<T, PresenceError>;

/// Reason attached to a failed collaborator operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureCode {
    /// The network call failed or the server refused it
    NetworkFailure,
    /// The provider is not registered with the server
    ProviderNotRegistered,
    /// Anything else
    InternalError,
}

impl FailureCode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NetworkFailure => "network failure",
            Self::ProviderNotRegistered => "provider not registered",
            Self::InternalError => "internal error",
        }
    }
}

impl std::fmt::Display for FailureCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Presence layer errors
#[derive(Debug, Error)]
pub enum PresenceError {
    // =========================================================================
    // Caller Errors
    // =========================================================================
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Status cannot be encoded: {0}")]
    UnsupportedStatus(PresenceStatus),

    // =========================================================================
    // Connection Errors
    // =========================================================================
    #[error("The provider must be registered before it can be used")]
    NotConnected,

    // =========================================================================
    // Collaborator Errors
    // =========================================================================
    #[error("Operation failed ({code}): {message}")]
    OperationFailed { code: FailureCode, message: String },
}

impl PresenceError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::OperationFailed {
            code: FailureCode::NetworkFailure,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::OperationFailed {
            code: FailureCode::InternalError,
            message: message.into(),
        }
    }

    /// Get an error code string for logs and diagnostics
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => "INVALID_ARGUMENT",
            Self::UnsupportedStatus(_) => "UNSUPPORTED_STATUS",
            Self::NotConnected => "NOT_CONNECTED",
            Self::OperationFailed { code, .. } => match code {
                FailureCode::NetworkFailure => "NETWORK_FAILURE",
                FailureCode::ProviderNotRegistered => "PROVIDER_NOT_REGISTERED",
                FailureCode::InternalError => "INTERNAL_ERROR",
            },
        }
    }

    /// Check if the caller passed something the engine cannot act on
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_) | Self::UnsupportedStatus(_))
    }

    /// Check if this error means there is no live connection
    pub fn is_not_connected(&self) -> bool {
        matches!(
            self,
            Self::NotConnected
                | Self::OperationFailed {
                    code: FailureCode::ProviderNotRegistered,
                    ..
                }
        )
    }

    /// Check if this is a network failure reported by a collaborator
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            Self::OperationFailed {
                code: FailureCode::NetworkFailure,
                ..
            }
        )
    }
}
