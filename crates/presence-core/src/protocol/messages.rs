//! Typed protocol messages exchanged with the protocol stack
//!
//! The stack owns framing and transport; the engine only sees these
//! already-decoded values.

use serde::{Deserialize, Serialize};

use crate::status::StatusBitmask;

/// User information block reported by the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    /// Screen name or numeric identifier
    pub identifier: String,
    /// Reported status bitmask, `UNKNOWN` when absent
    pub status: StatusBitmask,
    /// Away flag, only reported for basic-presence accounts
    pub away: Option<bool>,
    /// Available message carried with the status, if any
    pub status_message: Option<String>,
}

impl UserInfo {
    #[must_use]
    pub fn new(identifier: impl Into<String>, status: StatusBitmask) -> Self {
        Self {
            identifier: identifier.into(),
            status,
            away: None,
            status_message: None,
        }
    }

    #[must_use]
    pub fn with_away(mut self, away: bool) -> Self {
        self.away = Some(away);
        self
    }

    #[must_use]
    pub fn with_status_message(mut self, message: impl Into<String>) -> Self {
        self.status_message = Some(message.into());
        self
    }
}

/// Fire-and-forget commands sent to the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProtocolCommand {
    /// Set our extended status bitmask
    SetExtendedStatus { mask: StatusBitmask },
    /// Set the available message shown next to our status
    SetStatusMessage { message: String },
    /// Show or hide ourselves from other users
    SetVisibility { visible: bool },
    /// Set (`Some`) or clear (`None`) the away message
    SetAwayMessage { message: Option<String> },
    /// Let a contact add us without asking again
    GrantFutureAuthorization { identifier: String, reason: String },
    /// Ask a contact to authorize us
    RequestAuthorization { identifier: String, reason: String },
    /// Answer an incoming authorization request
    AuthorizationReply {
        identifier: String,
        accepted: bool,
        reason: Option<String>,
    },
}

/// Requests that expect a correlated response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProtocolRequest {
    /// Ask the server for a user's status information
    UserInfo { identifier: String },
}

/// Response delivered to a [`ResponseListener`](crate::traits::ResponseListener)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProtocolResponse {
    UserInfo(UserInfo),
    Error { code: u16, message: String },
}

/// Unsolicited notifications pushed by the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProtocolEvent {
    /// Our own user information changed
    OwnInfo(UserInfo),
    /// Our own extra info (available message) was reported
    OwnExtraInfo { status_message: Option<String> },
    /// A buddy's status changed
    BuddyStatus(UserInfo),
    /// A buddy went offline
    BuddyOffline { identifier: String },
    /// A buddy's icon changed, `None` clears it
    BuddyIcon {
        identifier: String,
        icon: Option<Vec<u8>>,
    },
    /// Someone asks us for authorization
    AuthorizationRequestReceived { identifier: String, reason: String },
    /// A contact accepted our authorization request
    AuthorizationAccepted {
        identifier: String,
        reason: Option<String>,
    },
    /// A contact denied our authorization request
    AuthorizationDenied {
        identifier: String,
        reason: Option<String>,
    },
    /// A contact granted us authorization in advance
    FutureAuthorizationGranted { identifier: String, reason: String },
    /// Someone added us to their list
    YouWereAdded { identifier: String },
}

impl ProtocolEvent {
    /// Get the event type name
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::OwnInfo(_) => "OWN_INFO",
            Self::OwnExtraInfo { .. } => "OWN_EXTRA_INFO",
            Self::BuddyStatus(_) => "BUDDY_STATUS",
            Self::BuddyOffline { .. } => "BUDDY_OFFLINE",
            Self::BuddyIcon { .. } => "BUDDY_ICON",
            Self::AuthorizationRequestReceived { .. } => "AUTHORIZATION_REQUEST_RECEIVED",
            Self::AuthorizationAccepted { .. } => "AUTHORIZATION_ACCEPTED",
            Self::AuthorizationDenied { .. } => "AUTHORIZATION_DENIED",
            Self::FutureAuthorizationGranted { .. } => "FUTURE_AUTHORIZATION_GRANTED",
            Self::YouWereAdded { .. } => "YOU_WERE_ADDED",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_serialization_is_tagged() {
        let command = ProtocolCommand::SetVisibility { visible: false };
        let json = serde_json::to_value(&command).unwrap();
        assert_eq!(json["type"], "SET_VISIBILITY");
        assert_eq!(json["visible"], false);
    }

    #[test]
    fn test_event_type() {
        let event = ProtocolEvent::BuddyOffline {
            identifier: "42".to_string(),
        };
        assert_eq!(event.event_type(), "BUDDY_OFFLINE");
    }

    #[test]
    fn test_user_info_builder() {
        let info = UserInfo::new("alice", StatusBitmask::ONLINE)
            .with_away(true)
            .with_status_message("lunch");
        assert_eq!(info.away, Some(true));
        assert_eq!(info.status_message.as_deref(), Some("lunch"));
    }
}
