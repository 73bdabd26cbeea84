//! Registration state of the protocol provider

use serde::{Deserialize, Serialize};
use std::fmt;

/// Registration (login) state reported by the protocol stack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationState {
    Registering,
    Registered,
    Unregistering,
    Unregistered,
    AuthenticationFailed,
    ConnectionFailed,
}

impl RegistrationState {
    /// States that end the session
    #[must_use]
    pub fn is_disconnect(self) -> bool {
        matches!(
            self,
            Self::Unregistered | Self::AuthenticationFailed | Self::ConnectionFailed
        )
    }
}

impl fmt::Display for RegistrationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Registering => "registering",
            Self::Registered => "registered",
            Self::Unregistering => "unregistering",
            Self::Unregistered => "unregistered",
            Self::AuthenticationFailed => "authentication_failed",
            Self::ConnectionFailed => "connection_failed",
        };
        f.write_str(name)
    }
}
