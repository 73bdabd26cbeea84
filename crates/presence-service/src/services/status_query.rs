//! On-demand status queries
//!
//! Turns the stack's request / response / timeout callbacks into a single
//! awaited call with a bounded wait.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use presence_core::traits::ResponseListener;
use presence_core::{PresenceStatus, ProtocolRequest, ProtocolResponse, StatusBitmask};

use super::context::ServiceContext;

/// One-shot correlator for a single status request
///
/// Whichever of response, error or timeout arrives first completes the
/// query; anything after that is ignored.
pub struct StatusResponseRetriever {
    ran: AtomicBool,
    sender: Mutex<Option<oneshot::Sender<StatusBitmask>>>,
}

impl StatusResponseRetriever {
    pub fn new() -> (Self, oneshot::Receiver<StatusBitmask>) {
        let (sender, receiver) = oneshot::channel();
        let retriever = Self {
            ran: AtomicBool::new(false),
            sender: Mutex::new(Some(sender)),
        };
        (retriever, receiver)
    }

    /// Whether a result was delivered or the query was abandoned
    pub fn has_completed(&self) -> bool {
        self.ran.load(Ordering::SeqCst)
    }

    fn complete(&self, mask: StatusBitmask) {
        if self.ran.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Some(sender) = self.sender.lock().take() {
            // The waiter may already be gone; nothing to do then.
            let _ = sender.send(mask);
        }
    }

    /// Stop accepting results, used when the caller gives up waiting
    fn expire(&self) {
        if !self.ran.swap(true, Ordering::SeqCst) {
            self.sender.lock().take();
        }
    }
}

impl ResponseListener for StatusResponseRetriever {
    fn on_response(&self, response: ProtocolResponse) {
        let mask = match response {
            // Any user info answer means the user is connected
            ProtocolResponse::UserInfo(info) if info.status.is_unknown() => StatusBitmask::ONLINE,
            ProtocolResponse::UserInfo(info) => info.status,
            ProtocolResponse::Error { code, message } => {
                debug!(code, message = %message, "Status query answered with an error");
                StatusBitmask::UNKNOWN
            }
        };
        self.complete(mask);
    }

    fn on_timeout(&self) {
        self.complete(StatusBitmask::UNKNOWN);
    }
}

/// Status query service
pub struct StatusQueryService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> StatusQueryService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Ask the server for a user's status bitmask
    ///
    /// Never fails: errors, send failures and timeouts all yield `UNKNOWN`.
    #[instrument(skip(self))]
    pub async fn query_bitmask(&self, identifier: &str) -> StatusBitmask {
        let query_id = Uuid::new_v4();
        let (retriever, receiver) = StatusResponseRetriever::new();
        let retriever = Arc::new(retriever);

        let request = ProtocolRequest::UserInfo {
            identifier: identifier.to_string(),
        };
        if let Err(e) = self.ctx.protocol().send_request(request, retriever.clone()).await {
            warn!(%query_id, identifier, error = %e, "Failed to send status query");
            retriever.expire();
            return StatusBitmask::UNKNOWN;
        }

        match tokio::time::timeout(self.ctx.config().query_timeout(), receiver).await {
            Ok(Ok(mask)) => {
                debug!(%query_id, identifier, mask = %mask, "Status query answered");
                mask
            }
            Ok(Err(_)) => {
                debug!(%query_id, identifier, "Status query dropped by the stack");
                StatusBitmask::UNKNOWN
            }
            Err(_) => {
                retriever.expire();
                debug!(%query_id, identifier, "Status query timed out");
                StatusBitmask::UNKNOWN
            }
        }
    }

    /// Ask the server for a user's presence status
    pub async fn query(&self, identifier: &str) -> PresenceStatus {
        let mask = self.query_bitmask(identifier).await;
        self.ctx.codec().decode(mask)
    }
}
