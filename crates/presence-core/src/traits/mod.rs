//! Collaborator traits (ports)
//!
//! The engine defines what it needs from the protocol stack, the contact
//! list and the application; callers provide the implementations.

mod authorization;
mod contact_list;
mod protocol;

pub use authorization::{AuthorizationHandler, ExtendedAuthorization};
pub use contact_list::ContactList;
pub use protocol::{ProtocolEventHandler, ProtocolStack, ResponseListener};
