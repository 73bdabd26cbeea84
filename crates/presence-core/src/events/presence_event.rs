//! Events delivered to application listeners

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::{Contact, ContactGroup};
use crate::status::PresenceStatus;

/// A contact's presence status changed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactPresenceStatusChangeEvent {
    pub contact: Contact,
    pub parent_group: Option<ContactGroup>,
    pub old_status: PresenceStatus,
    pub new_status: PresenceStatus,
    pub occurred_at: DateTime<Utc>,
}

impl ContactPresenceStatusChangeEvent {
    pub fn new(
        contact: Contact,
        parent_group: Option<ContactGroup>,
        old_status: PresenceStatus,
        new_status: PresenceStatus,
    ) -> Self {
        Self {
            contact,
            parent_group,
            old_status,
            new_status,
            occurred_at: Utc::now(),
        }
    }
}

/// Kind of a subscription lifecycle event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubscriptionEventKind {
    Created,
    Removed,
    Resolved,
    Failed { code: u16, reason: String },
}

/// A subscription was created, removed, resolved or failed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionEvent {
    pub kind: SubscriptionEventKind,
    pub contact: Contact,
    pub parent_group: Option<ContactGroup>,
    pub occurred_at: DateTime<Utc>,
}

impl SubscriptionEvent {
    pub fn new(
        kind: SubscriptionEventKind,
        contact: Contact,
        parent_group: Option<ContactGroup>,
    ) -> Self {
        Self {
            kind,
            contact,
            parent_group,
            occurred_at: Utc::now(),
        }
    }
}

/// A contact moved from one group to another
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionMovedEvent {
    pub contact: Contact,
    pub old_parent: ContactGroup,
    pub new_parent: ContactGroup,
    pub occurred_at: DateTime<Utc>,
}

impl SubscriptionMovedEvent {
    pub fn new(contact: Contact, old_parent: ContactGroup, new_parent: ContactGroup) -> Self {
        Self {
            contact,
            old_parent,
            new_parent,
            occurred_at: Utc::now(),
        }
    }
}

/// A property of a contact (display name, image, ...) changed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactPropertyChangeEvent {
    pub contact: Contact,
    pub property: String,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

impl ContactPropertyChangeEvent {
    pub fn new(
        contact: Contact,
        property: impl Into<String>,
        old_value: Option<String>,
        new_value: Option<String>,
    ) -> Self {
        Self {
            contact,
            property: property.into(),
            old_value,
            new_value,
            occurred_at: Utc::now(),
        }
    }
}

/// Our own presence status changed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderPresenceStatusChangeEvent {
    pub old_status: PresenceStatus,
    pub new_status: PresenceStatus,
    pub occurred_at: DateTime<Utc>,
}

impl ProviderPresenceStatusChangeEvent {
    pub fn new(old_status: PresenceStatus, new_status: PresenceStatus) -> Self {
        Self {
            old_status,
            new_status,
            occurred_at: Utc::now(),
        }
    }
}

/// Our own status message changed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusMessageChangeEvent {
    pub old_message: String,
    pub new_message: String,
    pub occurred_at: DateTime<Utc>,
}

impl StatusMessageChangeEvent {
    pub fn new(old_message: impl Into<String>, new_message: impl Into<String>) -> Self {
        Self {
            old_message: old_message.into(),
            new_message: new_message.into(),
            occurred_at: Utc::now(),
        }
    }
}

/// Kind of a server-stored group event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GroupEventKind {
    Created,
    Removed,
    Renamed,
    Resolved,
    CreationFailed,
}

/// A group in the contact list tree changed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerStoredGroupEvent {
    pub kind: GroupEventKind,
    pub group: ContactGroup,
    pub parent_group: Option<ContactGroup>,
    pub occurred_at: DateTime<Utc>,
}

impl ServerStoredGroupEvent {
    pub fn new(kind: GroupEventKind, group: ContactGroup, parent_group: Option<ContactGroup>) -> Self {
        Self {
            kind,
            group,
            parent_group,
            occurred_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscription_kind_serialization() {
        let kind = SubscriptionEventKind::Failed {
            code: 14,
            reason: "not allowed".to_string(),
        };
        let json = serde_json::to_value(&kind).unwrap();
        assert_eq!(json["kind"], "FAILED");
        assert_eq!(json["code"], 14);
    }

    #[test]
    fn test_group_event_serialization() {
        let event = ServerStoredGroupEvent::new(
            GroupEventKind::Created,
            ContactGroup::virtual_group("Awaiting authorization"),
            None,
        );
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["kind"], "CREATED");
        assert_eq!(json["group"]["persistent"], false);
    }
}
