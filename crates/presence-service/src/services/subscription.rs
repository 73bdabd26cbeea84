//! Subscription service
//!
//! Contact list operations of the public contract, and the virtual group
//! that parks contacts awaiting authorization.

use tracing::{info, instrument, warn};

use presence_core::{
    Contact, ContactGroup, GroupEventKind, PresenceError, PresenceResult, ServerStoredGroupEvent,
    SubscriptionEvent, SubscriptionEventKind,
};

use super::context::ServiceContext;

/// Subscription service
pub struct SubscriptionService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> SubscriptionService<'a> {
    /// Create a new SubscriptionService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Add a contact to the server-stored list. The outcome arrives later as
    /// a subscription event.
    #[instrument(skip(self))]
    pub async fn subscribe(&self, identifier: &str) -> PresenceResult<()> {
        self.ctx.ensure_connected()?;
        self.ctx.contact_list().add_contact(None, identifier).await
    }

    /// Add a contact to a specific group of the server-stored list
    #[instrument(skip(self))]
    pub async fn subscribe_in_group(&self, group: &str, identifier: &str) -> PresenceResult<()> {
        self.ctx.ensure_connected()?;
        let group = self.require_group(group)?;
        self.ctx
            .contact_list()
            .add_contact(Some(&group.name), identifier)
            .await
    }

    /// Remove a contact
    ///
    /// Volatile contacts are dropped locally. A contact parked in the
    /// awaiting authorization group is deleted from the group it belongs to
    /// on the server.
    #[instrument(skip(self, contact), fields(identifier = %contact.identifier))]
    pub async fn unsubscribe(&self, contact: &Contact) -> PresenceResult<()> {
        self.ctx.ensure_connected()?;

        let list = self.ctx.contact_list();
        let contact = list.find_contact(&contact.identifier).ok_or_else(|| {
            PresenceError::invalid_argument(format!(
                "{} is not a contact of this provider",
                contact.identifier
            ))
        })?;
        let group = list.parent_group(&contact.identifier).ok_or_else(|| {
            PresenceError::invalid_argument(format!(
                "{} is not a member of any group",
                contact.identifier
            ))
        })?;

        if !contact.persistent {
            list.detach_contact(&contact.identifier)?;
            info!("Volatile contact removed");
            self.ctx
                .listeners()
                .fire_subscription_changed(&SubscriptionEvent::new(
                    SubscriptionEventKind::Removed,
                    contact,
                    Some(group),
                ));
            return Ok(());
        }

        if !group.persistent && contact.awaiting_authorization {
            let origin = match contact.structural_parent.as_deref() {
                Some(origin) => origin.to_string(),
                None => {
                    warn!("Awaiting contact has no recorded group, deleting from root");
                    list.root_group().name
                }
            };
            return list.delete_contact(&origin, &contact.identifier).await;
        }

        list.delete_contact(&group.name, &contact.identifier).await
    }

    /// Move a contact to another server-stored group
    #[instrument(skip(self, contact), fields(identifier = %contact.identifier))]
    pub async fn move_contact(&self, contact: &Contact, new_group: &str) -> PresenceResult<()> {
        self.ctx.ensure_connected()?;

        let list = self.ctx.contact_list();
        let awaiting_name = self.awaiting_group_name();

        if list.find_contact(&contact.identifier).is_none() {
            return Err(PresenceError::invalid_argument(format!(
                "{} is not a contact of this provider",
                contact.identifier
            )));
        }
        let target = self.require_group(new_group)?;
        if target.name == awaiting_name {
            return Err(PresenceError::invalid_argument(
                "contacts cannot be moved into the awaiting authorization group",
            ));
        }
        if list
            .parent_group(&contact.identifier)
            .is_some_and(|parent| parent.name == awaiting_name)
        {
            return Err(PresenceError::invalid_argument(
                "contacts awaiting authorization cannot be moved",
            ));
        }

        list.move_contact(&contact.identifier, &target.name).await
    }

    /// Create a group on the server under `parent`
    #[instrument(skip(self))]
    pub async fn create_group(&self, parent: &str, name: &str) -> PresenceResult<()> {
        self.ctx.ensure_connected()?;
        let parent = self.require_group(parent)?;
        if !parent.can_contain_subgroups {
            return Err(PresenceError::invalid_argument(format!(
                "group {} cannot contain subgroups",
                parent.name
            )));
        }
        self.ctx.contact_list().create_group(name).await
    }

    #[instrument(skip(self))]
    pub async fn remove_group(&self, group: &str) -> PresenceResult<()> {
        self.ctx.ensure_connected()?;
        let group = self.require_group(group)?;
        self.ctx.contact_list().remove_group(&group.name).await
    }

    #[instrument(skip(self))]
    pub async fn rename_group(&self, group: &str, new_name: &str) -> PresenceResult<()> {
        self.ctx.ensure_connected()?;
        let group = self.require_group(group)?;
        self.ctx.contact_list().rename_group(&group.name, new_name).await
    }

    /// Create a contact we only know from local storage. It is resolved once
    /// the server-stored list confirms it.
    pub fn create_unresolved_contact(
        &self,
        address: &str,
        persistent_data: Option<String>,
        parent: Option<&str>,
    ) -> PresenceResult<Contact> {
        let list = self.ctx.contact_list();
        let parent = match parent {
            Some(name) => self.require_group(name)?,
            None => list.root_group(),
        };
        list.create_unresolved_contact(&parent.name, address, persistent_data)
    }

    pub fn create_unresolved_group(&self, uid: &str, persistent_data: Option<String>) -> ContactGroup {
        self.ctx
            .contact_list()
            .create_unresolved_group(uid, persistent_data)
    }

    pub fn create_volatile_contact(&self, identifier: &str) -> Contact {
        self.ctx.contact_list().create_volatile_contact(identifier)
    }

    pub fn find_contact(&self, identifier: &str) -> Option<Contact> {
        self.ctx.contact_list().find_contact(identifier)
    }

    pub fn root_group(&self) -> ContactGroup {
        self.ctx.contact_list().root_group()
    }

    // =========================================================================
    // Awaiting authorization group
    // =========================================================================

    pub fn awaiting_group_name(&self) -> &'a str {
        &self.ctx.config().authorization.awaiting_group_name
    }

    /// The awaiting authorization group, if it was created this session
    pub fn awaiting_group(&self) -> Option<ContactGroup> {
        let _guard = self.ctx.awaiting_group_lock().lock();
        self.ctx.contact_list().find_group(self.awaiting_group_name())
    }

    /// The awaiting authorization group, created under the root on first use
    pub fn ensure_awaiting_group(&self) -> ContactGroup {
        let list = self.ctx.contact_list();
        let name = self.awaiting_group_name();

        let created = {
            let _guard = self.ctx.awaiting_group_lock().lock();
            if let Some(group) = list.find_group(name) {
                return group;
            }
            list.add_virtual_group(name)
        };

        info!(group = %created.name, "Created awaiting authorization group");
        self.ctx
            .listeners()
            .fire_group_changed(&ServerStoredGroupEvent::new(
                GroupEventKind::Created,
                created.clone(),
                Some(list.root_group()),
            ));
        created
    }

    fn require_group(&self, name: &str) -> PresenceResult<ContactGroup> {
        self.ctx
            .contact_list()
            .find_group(name)
            .ok_or_else(|| PresenceError::invalid_argument(format!("unknown group {name}")))
    }
}
