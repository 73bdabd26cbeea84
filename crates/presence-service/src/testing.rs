//! In-memory collaborators for tests
//!
//! Enabled for this crate's own tests and, through the `test-utils`
//! feature, for downstream test crates.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use presence_core::traits::{
    AuthorizationHandler, ContactList, ExtendedAuthorization, ProtocolEventHandler, ProtocolStack,
    ResponseListener,
};
use presence_core::{
    AuthorizationRequest, AuthorizationResponse, Contact, ContactGroup,
    ContactPresenceStatusChangeEvent, ContactPresenceStatusListener, ContactPropertyChangeEvent,
    GroupEventKind, PresenceError, PresenceResult, PresenceStatus, ProtocolCommand, ProtocolEvent,
    ProtocolRequest, ProtocolResponse, ProviderPresenceStatusChangeEvent,
    ProviderPresenceStatusListener, ServerStoredGroupEvent, ServerStoredGroupListener,
    SharedListenerHub, StatusBitmask, StatusMessageChangeEvent, SubscriptionEvent,
    SubscriptionEventKind, SubscriptionListener, SubscriptionMovedEvent, UserInfo,
};

// ============================================================================
// Protocol stack
// ============================================================================

/// How the mock stack answers a status query
#[derive(Debug, Clone)]
pub enum QueryBehavior {
    /// Deliver this response immediately
    Respond(ProtocolResponse),
    /// Signal a stack-level timeout immediately
    Timeout,
    /// Never answer; the listener is kept for [`MockProtocol::deliver_pending`]
    Silent,
    /// Fail to send the request
    SendFails,
}

/// Scriptable protocol stack recording everything sent to it
pub struct MockProtocol {
    registered: AtomicBool,
    local_identifier: String,
    fail_commands: AtomicBool,
    commands: Mutex<Vec<ProtocolCommand>>,
    requests: Mutex<Vec<ProtocolRequest>>,
    default_behavior: Mutex<QueryBehavior>,
    behaviors: Mutex<HashMap<String, QueryBehavior>>,
    pending: Mutex<Vec<Arc<dyn ResponseListener>>>,
    handler: Mutex<Option<Arc<dyn ProtocolEventHandler>>>,
}

impl MockProtocol {
    /// A registered stack answering every query with an error
    pub fn new(local_identifier: impl Into<String>) -> Self {
        Self {
            registered: AtomicBool::new(true),
            local_identifier: local_identifier.into(),
            fail_commands: AtomicBool::new(false),
            commands: Mutex::new(Vec::new()),
            requests: Mutex::new(Vec::new()),
            default_behavior: Mutex::new(QueryBehavior::Respond(ProtocolResponse::Error {
                code: 0,
                message: "no status scripted".to_string(),
            })),
            behaviors: Mutex::new(HashMap::new()),
            pending: Mutex::new(Vec::new()),
            handler: Mutex::new(None),
        }
    }

    pub fn set_registered(&self, registered: bool) {
        self.registered.store(registered, Ordering::SeqCst);
    }

    pub fn fail_commands(&self, fail: bool) {
        self.fail_commands.store(fail, Ordering::SeqCst);
    }

    /// Answer queries for `identifier` with a user info block
    pub fn set_status(&self, identifier: &str, status: StatusBitmask) {
        self.set_behavior(
            identifier,
            QueryBehavior::Respond(ProtocolResponse::UserInfo(UserInfo::new(identifier, status))),
        );
    }

    pub fn set_behavior(&self, identifier: &str, behavior: QueryBehavior) {
        self.behaviors.lock().insert(identifier.to_string(), behavior);
    }

    pub fn set_default_behavior(&self, behavior: QueryBehavior) {
        *self.default_behavior.lock() = behavior;
    }

    pub fn commands(&self) -> Vec<ProtocolCommand> {
        self.commands.lock().clone()
    }

    pub fn clear_commands(&self) {
        self.commands.lock().clear();
    }

    pub fn requests(&self) -> Vec<ProtocolRequest> {
        self.requests.lock().clone()
    }

    pub fn has_handler(&self) -> bool {
        self.handler.lock().is_some()
    }

    /// Deliver a response to every query still waiting
    pub fn deliver_pending(&self, response: &ProtocolResponse) -> usize {
        let pending = std::mem::take(&mut *self.pending.lock());
        for listener in &pending {
            listener.on_response(response.clone());
        }
        pending.len()
    }

    /// Push a server notification through the attached handler
    pub async fn emit(&self, event: ProtocolEvent) -> bool {
        let handler = self.handler.lock().clone();
        match handler {
            Some(handler) => {
                handler.handle_event(event).await;
                true
            }
            None => false,
        }
    }

    /// Report that adding `identifier` requires authorization
    pub async fn require_authorization(&self, identifier: &str, group: Option<&str>) -> Option<bool> {
        let handler = self.handler.lock().clone();
        match handler {
            Some(handler) => Some(handler.authorization_required(identifier, group).await),
            None => None,
        }
    }
}

#[async_trait]
impl ProtocolStack for MockProtocol {
    fn is_registered(&self) -> bool {
        self.registered.load(Ordering::SeqCst)
    }

    fn local_identifier(&self) -> String {
        self.local_identifier.clone()
    }

    async fn send_command(&self, command: ProtocolCommand) -> PresenceResult<()> {
        if self.fail_commands.load(Ordering::SeqCst) {
            return Err(PresenceError::network("command rejected"));
        }
        self.commands.lock().push(command);
        Ok(())
    }

    async fn send_request(
        &self,
        request: ProtocolRequest,
        listener: Arc<dyn ResponseListener>,
    ) -> PresenceResult<()> {
        let ProtocolRequest::UserInfo { identifier } = &request;
        let behavior = self
            .behaviors
            .lock()
            .get(identifier)
            .cloned()
            .unwrap_or_else(|| self.default_behavior.lock().clone());
        self.requests.lock().push(request);

        match behavior {
            QueryBehavior::Respond(response) => listener.on_response(response),
            QueryBehavior::Timeout => listener.on_timeout(),
            QueryBehavior::Silent => self.pending.lock().push(listener),
            QueryBehavior::SendFails => return Err(PresenceError::network("request not sent")),
        }
        Ok(())
    }

    async fn attach_listeners(&self, handler: Arc<dyn ProtocolEventHandler>) -> PresenceResult<()> {
        *self.handler.lock() = Some(handler);
        Ok(())
    }
}

// ============================================================================
// Contact list
// ============================================================================

/// Server-side operation recorded by [`InMemoryContactList`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListOperation {
    AddContact { group: Option<String>, identifier: String },
    DeleteContact { group: String, identifier: String },
    MoveContact { identifier: String, group: String },
    CreateGroup { name: String },
    RemoveGroup { name: String },
    RenameGroup { name: String, new_name: String },
}

struct GroupEntry {
    group: ContactGroup,
    parent: Option<String>,
}

struct ListState {
    groups: Vec<GroupEntry>,
    contacts: Vec<(Contact, String)>,
}

impl ListState {
    fn group(&self, name: &str) -> Option<&GroupEntry> {
        self.groups.iter().find(|entry| entry.group.name == name)
    }

    fn contact_mut(&mut self, identifier: &str) -> Option<&mut (Contact, String)> {
        self.contacts
            .iter_mut()
            .find(|(contact, _)| contact.identifier == identifier)
    }
}

/// Contact list tree held in memory; server operations succeed immediately
/// and emit the events a real list would
pub struct InMemoryContactList {
    root: String,
    state: Mutex<ListState>,
    operations: Mutex<Vec<ListOperation>>,
    listeners: Mutex<Option<SharedListenerHub>>,
    init_calls: AtomicUsize,
    fail_server_ops: AtomicBool,
}

impl InMemoryContactList {
    pub fn new(root: impl Into<String>) -> Self {
        let root = root.into();
        Self {
            state: Mutex::new(ListState {
                groups: vec![GroupEntry {
                    group: ContactGroup::root(root.clone()),
                    parent: None,
                }],
                contacts: Vec::new(),
            }),
            root,
            operations: Mutex::new(Vec::new()),
            listeners: Mutex::new(None),
            init_calls: AtomicUsize::new(0),
            fail_server_ops: AtomicBool::new(false),
        }
    }

    /// Add a server-stored group under the root
    pub fn with_group(self, name: &str) -> Self {
        self.state.lock().groups.push(GroupEntry {
            group: ContactGroup::server_stored(name),
            parent: Some(self.root.clone()),
        });
        self
    }

    /// Put a contact into a group
    pub fn with_contact(self, group: &str, contact: Contact) -> Self {
        self.state.lock().contacts.push((contact, group.to_string()));
        self
    }

    pub fn fail_server_operations(&self, fail: bool) {
        self.fail_server_ops.store(fail, Ordering::SeqCst);
    }

    pub fn operations(&self) -> Vec<ListOperation> {
        self.operations.lock().clone()
    }

    pub fn init_calls(&self) -> usize {
        self.init_calls.load(Ordering::SeqCst)
    }

    /// Name of the group holding the contact
    pub fn group_of(&self, identifier: &str) -> Option<String> {
        self.state
            .lock()
            .contacts
            .iter()
            .find(|(contact, _)| contact.identifier == identifier)
            .map(|(_, group)| group.clone())
    }

    fn record(&self, operation: ListOperation) -> PresenceResult<()> {
        if self.fail_server_ops.load(Ordering::SeqCst) {
            return Err(PresenceError::network("server refused the operation"));
        }
        self.operations.lock().push(operation);
        Ok(())
    }

    fn hub(&self) -> Option<SharedListenerHub> {
        self.listeners.lock().clone()
    }

    fn fire_subscription(&self, kind: SubscriptionEventKind, contact: Contact, group: &str) {
        if let Some(hub) = self.hub() {
            let parent = self.find_group(group);
            hub.fire_subscription_changed(&SubscriptionEvent::new(kind, contact, parent));
        }
    }

    fn fire_group(&self, kind: GroupEventKind, group: ContactGroup) {
        if let Some(hub) = self.hub() {
            hub.fire_group_changed(&ServerStoredGroupEvent::new(
                kind,
                group,
                Some(self.root_group()),
            ));
        }
    }
}

#[async_trait]
impl ContactList for InMemoryContactList {
    async fn init(&self, listeners: SharedListenerHub) -> PresenceResult<()> {
        self.init_calls.fetch_add(1, Ordering::SeqCst);
        *self.listeners.lock() = Some(listeners);
        Ok(())
    }

    fn root_group(&self) -> ContactGroup {
        ContactGroup::root(self.root.clone())
    }

    fn find_contact(&self, identifier: &str) -> Option<Contact> {
        self.state
            .lock()
            .contacts
            .iter()
            .find(|(contact, _)| contact.identifier == identifier)
            .map(|(contact, _)| contact.clone())
    }

    fn find_group(&self, name: &str) -> Option<ContactGroup> {
        self.state.lock().group(name).map(|entry| entry.group.clone())
    }

    fn parent_group(&self, identifier: &str) -> Option<ContactGroup> {
        let group = self.group_of(identifier)?;
        self.find_group(&group)
    }

    fn subgroups(&self, group: &str) -> Vec<ContactGroup> {
        self.state
            .lock()
            .groups
            .iter()
            .filter(|entry| entry.parent.as_deref() == Some(group))
            .map(|entry| entry.group.clone())
            .collect()
    }

    fn contacts(&self, group: &str) -> Vec<Contact> {
        self.state
            .lock()
            .contacts
            .iter()
            .filter(|(_, parent)| parent == group)
            .map(|(contact, _)| contact.clone())
            .collect()
    }

    fn create_unresolved_contact(
        &self,
        group: &str,
        identifier: &str,
        persistent_data: Option<String>,
    ) -> PresenceResult<Contact> {
        let mut state = self.state.lock();
        if state.group(group).is_none() {
            return Err(PresenceError::invalid_argument(format!("unknown group {group}")));
        }
        let mut contact = Contact::unresolved(identifier);
        contact.persistent_data = persistent_data;
        state.contacts.push((contact.clone(), group.to_string()));
        Ok(contact)
    }

    fn create_volatile_contact(&self, identifier: &str) -> Contact {
        let contact = Contact::volatile(identifier);
        self.state
            .lock()
            .contacts
            .push((contact.clone(), self.root.clone()));
        contact
    }

    fn create_unresolved_group(&self, name: &str, _persistent_data: Option<String>) -> ContactGroup {
        let group = ContactGroup::unresolved(name);
        self.state.lock().groups.push(GroupEntry {
            group: group.clone(),
            parent: Some(self.root.clone()),
        });
        group
    }

    fn add_virtual_group(&self, name: &str) -> ContactGroup {
        let group = ContactGroup::virtual_group(name);
        self.state.lock().groups.push(GroupEntry {
            group: group.clone(),
            parent: Some(self.root.clone()),
        });
        group
    }

    fn relocate_contact(&self, identifier: &str, group: &str) -> PresenceResult<()> {
        let mut state = self.state.lock();
        if state.group(group).is_none() {
            return Err(PresenceError::invalid_argument(format!("unknown group {group}")));
        }
        let entry = state
            .contact_mut(identifier)
            .ok_or_else(|| PresenceError::invalid_argument(format!("unknown contact {identifier}")))?;
        entry.1 = group.to_string();
        Ok(())
    }

    fn update_contact(&self, contact: &Contact) -> PresenceResult<()> {
        let mut state = self.state.lock();
        let entry = state.contact_mut(&contact.identifier).ok_or_else(|| {
            PresenceError::invalid_argument(format!("unknown contact {}", contact.identifier))
        })?;
        entry.0 = contact.clone();
        Ok(())
    }

    fn set_presence_status(&self, identifier: &str, status: PresenceStatus) -> Option<PresenceStatus> {
        let mut state = self.state.lock();
        let entry = state.contact_mut(identifier)?;
        Some(std::mem::replace(&mut entry.0.presence_status, status))
    }

    fn set_image(&self, identifier: &str, image: Option<Vec<u8>>) -> Option<Option<Vec<u8>>> {
        let mut state = self.state.lock();
        let entry = state.contact_mut(identifier)?;
        Some(std::mem::replace(&mut entry.0.image, image))
    }

    fn detach_contact(&self, identifier: &str) -> PresenceResult<()> {
        let mut state = self.state.lock();
        let before = state.contacts.len();
        state
            .contacts
            .retain(|(contact, _)| contact.identifier != identifier);
        if state.contacts.len() == before {
            return Err(PresenceError::invalid_argument(format!("unknown contact {identifier}")));
        }
        Ok(())
    }

    async fn add_contact(&self, group: Option<&str>, identifier: &str) -> PresenceResult<()> {
        self.record(ListOperation::AddContact {
            group: group.map(str::to_string),
            identifier: identifier.to_string(),
        })?;

        let group = match group {
            Some(group) => group.to_string(),
            None => self
                .subgroups(&self.root)
                .into_iter()
                .find(|group| group.persistent)
                .map_or_else(|| self.root.clone(), |group| group.name),
        };
        let contact = Contact::resolved(identifier);
        self.state.lock().contacts.push((contact.clone(), group.clone()));
        self.fire_subscription(SubscriptionEventKind::Created, contact, &group);
        Ok(())
    }

    async fn delete_contact(&self, group: &str, identifier: &str) -> PresenceResult<()> {
        self.record(ListOperation::DeleteContact {
            group: group.to_string(),
            identifier: identifier.to_string(),
        })?;

        let removed = {
            let mut state = self.state.lock();
            let index = state
                .contacts
                .iter()
                .position(|(contact, _)| contact.identifier == identifier);
            index.map(|index| state.contacts.remove(index))
        };
        if let Some((contact, _)) = removed {
            self.fire_subscription(SubscriptionEventKind::Removed, contact, group);
        }
        Ok(())
    }

    async fn move_contact(&self, identifier: &str, new_group: &str) -> PresenceResult<()> {
        self.record(ListOperation::MoveContact {
            identifier: identifier.to_string(),
            group: new_group.to_string(),
        })?;

        let old_group = self.parent_group(identifier);
        self.relocate_contact(identifier, new_group)?;
        if let (Some(hub), Some(old_group), Some(new_group), Some(contact)) = (
            self.hub(),
            old_group,
            self.find_group(new_group),
            self.find_contact(identifier),
        ) {
            hub.fire_subscription_moved(&SubscriptionMovedEvent::new(contact, old_group, new_group));
        }
        Ok(())
    }

    async fn create_group(&self, name: &str) -> PresenceResult<()> {
        self.record(ListOperation::CreateGroup {
            name: name.to_string(),
        })?;
        let group = ContactGroup::server_stored(name);
        self.state.lock().groups.push(GroupEntry {
            group: group.clone(),
            parent: Some(self.root.clone()),
        });
        self.fire_group(GroupEventKind::Created, group);
        Ok(())
    }

    async fn remove_group(&self, name: &str) -> PresenceResult<()> {
        self.record(ListOperation::RemoveGroup {
            name: name.to_string(),
        })?;
        let removed = {
            let mut state = self.state.lock();
            state.contacts.retain(|(_, group)| group != name);
            let index = state.groups.iter().position(|entry| entry.group.name == name);
            index.map(|index| state.groups.remove(index).group)
        };
        if let Some(group) = removed {
            self.fire_group(GroupEventKind::Removed, group);
        }
        Ok(())
    }

    async fn rename_group(&self, name: &str, new_name: &str) -> PresenceResult<()> {
        self.record(ListOperation::RenameGroup {
            name: name.to_string(),
            new_name: new_name.to_string(),
        })?;
        let renamed = {
            let mut state = self.state.lock();
            for (_, group) in &mut state.contacts {
                if group == name {
                    *group = new_name.to_string();
                }
            }
            state
                .groups
                .iter_mut()
                .find(|entry| entry.group.name == name)
                .map(|entry| {
                    entry.group.name = new_name.to_string();
                    entry.group.clone()
                })
        };
        if let Some(group) = renamed {
            self.fire_group(GroupEventKind::Renamed, group);
        }
        Ok(())
    }
}

// ============================================================================
// Authorization
// ============================================================================

/// Authorization handler answering from a script and recording outcomes
pub struct ScriptedAuthorizationHandler {
    incoming: Mutex<AuthorizationResponse>,
    outgoing: Mutex<Option<AuthorizationRequest>>,
    decisions: Mutex<Vec<String>>,
    outcomes: Mutex<Vec<(AuthorizationResponse, String)>>,
}

impl ScriptedAuthorizationHandler {
    /// Accept incoming requests and send a fixed outgoing request
    pub fn new() -> Self {
        Self {
            incoming: Mutex::new(AuthorizationResponse::accept()),
            outgoing: Mutex::new(Some(AuthorizationRequest::new("Please add me"))),
            decisions: Mutex::new(Vec::new()),
            outcomes: Mutex::new(Vec::new()),
        }
    }

    pub fn answer_incoming_with(&self, response: AuthorizationResponse) {
        *self.incoming.lock() = response;
    }

    pub fn outgoing_request(&self, request: Option<AuthorizationRequest>) {
        *self.outgoing.lock() = request;
    }

    /// Identifiers of contacts we were asked to decide on
    pub fn decisions(&self) -> Vec<String> {
        self.decisions.lock().clone()
    }

    /// Outcomes reported for our own requests
    pub fn outcomes(&self) -> Vec<(AuthorizationResponse, String)> {
        self.outcomes.lock().clone()
    }
}

impl Default for ScriptedAuthorizationHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthorizationHandler for ScriptedAuthorizationHandler {
    fn decide_incoming(
        &self,
        _request: &AuthorizationRequest,
        contact: &Contact,
    ) -> AuthorizationResponse {
        self.decisions.lock().push(contact.identifier.clone());
        self.incoming.lock().clone()
    }

    fn create_outgoing_request(&self, _contact: &Contact) -> Option<AuthorizationRequest> {
        self.outgoing.lock().clone()
    }

    fn notify_outcome(&self, response: &AuthorizationResponse, contact: &Contact) {
        self.outcomes
            .lock()
            .push((response.clone(), contact.identifier.clone()));
    }
}

/// Extended authorization collaborator recording re-requests
#[derive(Default)]
pub struct RecordingExtendedAuthorization {
    calls: Mutex<Vec<(String, String)>>,
    fail: AtomicBool,
}

impl RecordingExtendedAuthorization {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// `(identifier, reason)` of every attempted re-request
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl ExtendedAuthorization for RecordingExtendedAuthorization {
    async fn re_request(
        &self,
        request: &AuthorizationRequest,
        contact: &Contact,
    ) -> PresenceResult<()> {
        self.calls
            .lock()
            .push((contact.identifier.clone(), request.reason.clone()));
        if self.fail.load(Ordering::SeqCst) {
            return Err(PresenceError::network("re-request failed"));
        }
        Ok(())
    }
}

// ============================================================================
// Listeners
// ============================================================================

/// Listener implementing every listener trait and keeping what it receives
#[derive(Default)]
pub struct RecordingListener {
    pub contact_presence: Mutex<Vec<ContactPresenceStatusChangeEvent>>,
    pub subscriptions: Mutex<Vec<SubscriptionEvent>>,
    pub moves: Mutex<Vec<SubscriptionMovedEvent>>,
    pub modifications: Mutex<Vec<ContactPropertyChangeEvent>>,
    pub provider_status: Mutex<Vec<ProviderPresenceStatusChangeEvent>>,
    pub status_messages: Mutex<Vec<StatusMessageChangeEvent>>,
    pub groups: Mutex<Vec<ServerStoredGroupEvent>>,
}

impl RecordingListener {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

impl ContactPresenceStatusListener for RecordingListener {
    fn contact_presence_status_changed(&self, event: &ContactPresenceStatusChangeEvent) {
        self.contact_presence.lock().push(event.clone());
    }
}

impl SubscriptionListener for RecordingListener {
    fn subscription_changed(&self, event: &SubscriptionEvent) {
        self.subscriptions.lock().push(event.clone());
    }

    fn subscription_moved(&self, event: &SubscriptionMovedEvent) {
        self.moves.lock().push(event.clone());
    }

    fn contact_modified(&self, event: &ContactPropertyChangeEvent) {
        self.modifications.lock().push(event.clone());
    }
}

impl ProviderPresenceStatusListener for RecordingListener {
    fn provider_status_changed(&self, event: &ProviderPresenceStatusChangeEvent) {
        self.provider_status.lock().push(event.clone());
    }

    fn provider_status_message_changed(&self, event: &StatusMessageChangeEvent) {
        self.status_messages.lock().push(event.clone());
    }
}

impl ServerStoredGroupListener for RecordingListener {
    fn group_changed(&self, event: &ServerStoredGroupEvent) {
        self.groups.lock().push(event.clone());
    }
}

// ============================================================================
// Harness
// ============================================================================

/// A provider wired to mock collaborators, with a listener registered in
/// all four registries
pub struct ProviderHarness {
    pub protocol: Arc<MockProtocol>,
    pub contacts: Arc<InMemoryContactList>,
    pub handler: Arc<ScriptedAuthorizationHandler>,
    pub extended: Arc<RecordingExtendedAuthorization>,
    pub listener: Arc<RecordingListener>,
    pub provider: crate::PresenceProvider,
}

impl ProviderHarness {
    pub fn new(config: presence_common::PresenceConfig, contacts: InMemoryContactList) -> Self {
        let protocol = Arc::new(MockProtocol::new("100200300"));
        let contacts = Arc::new(contacts);
        let handler = Arc::new(ScriptedAuthorizationHandler::new());
        let extended = Arc::new(RecordingExtendedAuthorization::new());
        let listener = RecordingListener::new();

        let ctx = crate::ServiceContextBuilder::new()
            .protocol(protocol.clone())
            .contact_list(contacts.clone())
            .authorization_handler(handler.clone())
            .extended_authorization(extended.clone())
            .config(config)
            .build()
            .expect("harness context");
        let provider = crate::PresenceProvider::new(ctx);

        provider.add_contact_presence_status_listener(listener.clone());
        provider.add_subscription_listener(listener.clone());
        provider.add_provider_presence_status_listener(listener.clone());
        provider.add_server_stored_group_listener(listener.clone());

        Self {
            protocol,
            contacts,
            handler,
            extended,
            listener,
            provider,
        }
    }

    pub fn ctx(&self) -> &crate::ServiceContext {
        self.provider.context()
    }
}
