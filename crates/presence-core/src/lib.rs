//! # presence-core
//!
//! Domain layer of the presence engine: the status model and its wire codec,
//! contact and group snapshots, listener events and registries, and the
//! traits the engine expects its collaborators to implement.

pub mod entities;
pub mod error;
pub mod events;
pub mod listeners;
pub mod protocol;
pub mod status;
pub mod traits;

// Re-export commonly used types at crate root
pub use entities::{
    AuthorizationRequest, AuthorizationResponse, AuthorizationResponseCode, Contact, ContactGroup,
    RegistrationState,
};
pub use error::{FailureCode, PresenceError, PresenceResult};
pub use events::{
    ContactPresenceStatusChangeEvent, ContactPresenceStatusListener, ContactPropertyChangeEvent,
    GroupEventKind, ProviderPresenceStatusChangeEvent, ProviderPresenceStatusListener,
    ServerStoredGroupEvent, ServerStoredGroupListener, StatusMessageChangeEvent,
    SubscriptionEvent, SubscriptionEventKind, SubscriptionListener, SubscriptionMovedEvent,
};
pub use listeners::{ListenerHub, ListenerRegistry, SharedListenerHub};
pub use protocol::{ProtocolCommand, ProtocolEvent, ProtocolRequest, ProtocolResponse, UserInfo};
pub use status::{AccountMode, PresenceStatus, StatusBitmask, StatusCodec, StatusFlags};
pub use traits::{
    AuthorizationHandler, ContactList, ExtendedAuthorization, ProtocolEventHandler,
    ProtocolStack, ResponseListener,
};
