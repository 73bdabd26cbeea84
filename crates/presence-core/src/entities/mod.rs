//! Domain entities

mod authorization;
mod contact;
mod group;
mod registration;

pub use authorization::{AuthorizationRequest, AuthorizationResponse, AuthorizationResponseCode};
pub use contact::Contact;
pub use group::ContactGroup;
pub use registration::RegistrationState;
