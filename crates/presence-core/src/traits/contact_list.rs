//! Server-stored contact list port
//!
//! The contact list owns the tree of groups and contacts and keeps it
//! internally consistent. Lookups and local edits are synchronous; anything
//! that round-trips to the server is async and fallible.

use async_trait::async_trait;

use crate::entities::{Contact, ContactGroup};
use crate::error::PresenceResult;
use crate::listeners::SharedListenerHub;
use crate::status::PresenceStatus;

#[async_trait]
pub trait ContactList: Send + Sync {
    /// Load the server-stored list. Subscription and group events produced
    /// by the list from now on go through `listeners`.
    async fn init(&self, listeners: SharedListenerHub) -> PresenceResult<()>;

    // === Lookups ===

    fn root_group(&self) -> ContactGroup;

    fn find_contact(&self, identifier: &str) -> Option<Contact>;

    fn find_group(&self, name: &str) -> Option<ContactGroup>;

    /// Group currently holding the contact
    fn parent_group(&self, identifier: &str) -> Option<ContactGroup>;

    /// Direct subgroups of a group
    fn subgroups(&self, group: &str) -> Vec<ContactGroup>;

    /// Contacts directly inside a group
    fn contacts(&self, group: &str) -> Vec<Contact>;

    // === Local edits ===

    /// Create a contact the server has not confirmed yet
    fn create_unresolved_contact(
        &self,
        group: &str,
        identifier: &str,
        persistent_data: Option<String>,
    ) -> PresenceResult<Contact>;

    /// Create a session-only contact
    fn create_volatile_contact(&self, identifier: &str) -> Contact;

    /// Create a group the server has not confirmed yet
    fn create_unresolved_group(&self, name: &str, persistent_data: Option<String>) -> ContactGroup;

    /// Add a non-persistent subgroup under the root
    fn add_virtual_group(&self, name: &str) -> ContactGroup;

    /// Move a contact to another group locally, without telling the server
    fn relocate_contact(&self, identifier: &str, group: &str) -> PresenceResult<()>;

    /// Write back a modified contact snapshot
    fn update_contact(&self, contact: &Contact) -> PresenceResult<()>;

    /// Set a contact's presence status in place. Returns the status it had
    /// before, or `None` if the contact is unknown.
    fn set_presence_status(&self, identifier: &str, status: PresenceStatus) -> Option<PresenceStatus>;

    /// Replace a contact's image in place, returning the previous one
    fn set_image(&self, identifier: &str, image: Option<Vec<u8>>) -> Option<Option<Vec<u8>>>;

    /// Drop a contact locally
    fn detach_contact(&self, identifier: &str) -> PresenceResult<()>;

    // === Server operations ===

    /// Add a contact; `None` lets the list pick the group
    async fn add_contact(&self, group: Option<&str>, identifier: &str) -> PresenceResult<()>;

    async fn delete_contact(&self, group: &str, identifier: &str) -> PresenceResult<()>;

    async fn move_contact(&self, identifier: &str, new_group: &str) -> PresenceResult<()>;

    async fn create_group(&self, name: &str) -> PresenceResult<()>;

    async fn remove_group(&self, name: &str) -> PresenceResult<()>;

    async fn rename_group(&self, name: &str, new_name: &str) -> PresenceResult<()>;
}
