//! Protocol stack port
//!
//! The engine never touches the wire. It sends typed commands and requests
//! through this trait and receives server notifications through
//! [`ProtocolEventHandler`].

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::PresenceResult;
use crate::protocol::{ProtocolCommand, ProtocolEvent, ProtocolRequest, ProtocolResponse};

/// Receives the outcome of a single [`ProtocolRequest`]
///
/// The stack calls exactly one of the methods, but a late duplicate must be
/// tolerated by implementors.
pub trait ResponseListener: Send + Sync {
    fn on_response(&self, response: ProtocolResponse);

    fn on_timeout(&self);
}

/// Consumer of unsolicited server notifications
#[async_trait]
pub trait ProtocolEventHandler: Send + Sync {
    /// Handle a server notification
    async fn handle_event(&self, event: ProtocolEvent);

    /// The server refused to add `identifier` without authorization.
    ///
    /// Returns `true` if an authorization request was sent, `false` if the
    /// add should be abandoned.
    async fn authorization_required(&self, identifier: &str, parent_group: Option<&str>) -> bool;
}

#[async_trait]
pub trait ProtocolStack: Send + Sync {
    /// Whether the account is currently registered with the server
    fn is_registered(&self) -> bool;

    /// Our own screen name or identifier
    fn local_identifier(&self) -> String;

    /// Send a command that expects no response
    async fn send_command(&self, command: ProtocolCommand) -> PresenceResult<()>;

    /// Send a request whose outcome is reported to `listener`
    async fn send_request(
        &self,
        request: ProtocolRequest,
        listener: Arc<dyn ResponseListener>,
    ) -> PresenceResult<()>;

    /// Route server notifications to `handler` from now on
    async fn attach_listeners(&self, handler: Arc<dyn ProtocolEventHandler>) -> PresenceResult<()>;
}
