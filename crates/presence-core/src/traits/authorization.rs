//! Authorization ports

use async_trait::async_trait;

use crate::entities::{AuthorizationRequest, AuthorizationResponse, Contact};
use crate::error::PresenceResult;

/// Application policy for authorization requests
///
/// Invoked synchronously from protocol event handling; implementations must
/// not block.
pub trait AuthorizationHandler: Send + Sync {
    /// Decide on a request someone sent us
    fn decide_incoming(
        &self,
        request: &AuthorizationRequest,
        contact: &Contact,
    ) -> AuthorizationResponse;

    /// Build the request we send to a contact that requires authorization.
    /// `None` abandons adding the contact.
    fn create_outgoing_request(&self, contact: &Contact) -> Option<AuthorizationRequest>;

    /// Tell the application how a contact answered our request
    fn notify_outcome(&self, response: &AuthorizationResponse, contact: &Contact);
}

/// Re-sends authorization requests for contacts that never answered
#[async_trait]
pub trait ExtendedAuthorization: Send + Sync {
    async fn re_request(
        &self,
        request: &AuthorizationRequest,
        contact: &Contact,
    ) -> PresenceResult<()>;
}
