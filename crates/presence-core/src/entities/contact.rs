//! Contact entity

use serde::{Deserialize, Serialize};

use crate::status::PresenceStatus;

/// Snapshot of a contact as tracked by the contact list
///
/// The contact list owns the authoritative copy; the engine reads snapshots
/// and writes changes back through [`ContactList::update_contact`]. Status
/// and image changes use the single-field setters instead.
///
/// [`ContactList::update_contact`]: crate::traits::ContactList::update_contact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    /// Screen name or numeric identifier
    pub identifier: String,
    /// Last known presence status
    pub presence_status: PresenceStatus,
    /// Stored on the server (false for volatile contacts)
    pub persistent: bool,
    /// Confirmed by the server
    pub resolved: bool,
    /// Waiting for the remote user to authorize us
    pub awaiting_authorization: bool,
    /// Group the contact belongs to on the server while it is parked in a
    /// virtual group
    pub structural_parent: Option<String>,
    /// Opaque data stored with unresolved contacts
    pub persistent_data: Option<String>,
    /// Buddy icon bytes
    #[serde(skip)]
    pub image: Option<Vec<u8>>,
}

impl Contact {
    /// Create a server-stored contact that has not been confirmed yet
    #[must_use]
    pub fn unresolved(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            presence_status: PresenceStatus::Offline,
            persistent: true,
            resolved: false,
            awaiting_authorization: false,
            structural_parent: None,
            persistent_data: None,
            image: None,
        }
    }

    /// Create a contact that only lives for this session
    #[must_use]
    pub fn volatile(identifier: impl Into<String>) -> Self {
        Self {
            persistent: false,
            ..Self::unresolved(identifier)
        }
    }

    /// Create a resolved, server-stored contact
    #[must_use]
    pub fn resolved(identifier: impl Into<String>) -> Self {
        Self {
            resolved: true,
            ..Self::unresolved(identifier)
        }
    }

    #[must_use]
    pub fn with_status(mut self, status: PresenceStatus) -> Self {
        self.presence_status = status;
        self
    }

    #[must_use]
    pub fn with_persistent_data(mut self, data: impl Into<String>) -> Self {
        self.persistent_data = Some(data.into());
        self
    }

    #[inline]
    pub fn is_online(&self) -> bool {
        self.presence_status.is_online()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors() {
        let contact = Contact::unresolved("123");
        assert!(contact.persistent);
        assert!(!contact.resolved);
        assert_eq!(contact.presence_status, PresenceStatus::Offline);

        let contact = Contact::volatile("456");
        assert!(!contact.persistent);

        let contact = Contact::resolved("789").with_status(PresenceStatus::Away);
        assert!(contact.resolved);
        assert!(contact.is_online());
    }
}
