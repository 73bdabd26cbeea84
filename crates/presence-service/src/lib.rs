//! # presence-service
//!
//! Application layer of the presence engine: own status publishing, buddy
//! status tracking, the authorization handshake, the awaiting authorization
//! poller, and the [`PresenceProvider`] facade tying them together.

pub mod provider;
pub mod router;
pub mod services;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use provider::PresenceProvider;
pub use router::ProtocolEventRouter;
pub use services::{
    AuthorizationService, AwaitingAuthorizationPoller, PollReport, PresenceService,
    RegistrationService, ServiceContext, ServiceContextBuilder, StatusQueryService,
    SubscriptionService,
};
