//! Authorization request and response values

use serde::{Deserialize, Serialize};

/// An authorization request, incoming or outgoing
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AuthorizationRequest {
    pub reason: String,
}

impl AuthorizationRequest {
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Outcome of an authorization decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthorizationResponseCode {
    Accept,
    Reject,
    /// Drop the request without answering
    Ignore,
}

/// Authorization response with an optional reason
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationResponse {
    pub code: AuthorizationResponseCode,
    pub reason: Option<String>,
}

impl AuthorizationResponse {
    #[must_use]
    pub fn new(code: AuthorizationResponseCode, reason: Option<String>) -> Self {
        Self { code, reason }
    }

    #[must_use]
    pub fn accept() -> Self {
        Self::new(AuthorizationResponseCode::Accept, None)
    }

    #[must_use]
    pub fn reject(reason: impl Into<String>) -> Self {
        Self::new(AuthorizationResponseCode::Reject, Some(reason.into()))
    }

    #[must_use]
    pub fn ignore() -> Self {
        Self::new(AuthorizationResponseCode::Ignore, None)
    }
}
