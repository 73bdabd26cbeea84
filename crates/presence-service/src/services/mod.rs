//! Presence engine services
//!
//! Each service borrows the shared [`ServiceContext`] and covers one area of
//! the provider's behaviour.

pub mod authorization;
pub mod context;
pub mod poller;
pub mod presence;
pub mod registration;
pub mod status_query;
pub mod subscription;

// Re-export all services for convenience
pub use authorization::AuthorizationService;
pub use context::{ProviderPresenceState, ServiceContext, ServiceContextBuilder};
pub use poller::{run_pass, AwaitingAuthorizationPoller, PollReport};
pub use presence::PresenceService;
pub use registration::RegistrationService;
pub use status_query::{StatusQueryService, StatusResponseRetriever};
pub use subscription::SubscriptionService;
