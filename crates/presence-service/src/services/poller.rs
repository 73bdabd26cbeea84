//! Awaiting authorization poller
//!
//! Contacts that never answered our authorization request sit in the
//! awaiting authorization group. The server does not push their status, so
//! a background task polls it and re-sends the request once a contact is
//! seen online.

use parking_lot::Mutex;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, error, info, instrument};

use presence_core::AuthorizationRequest;

use super::context::ServiceContext;
use super::presence::PresenceService;
use super::status_query::StatusQueryService;
use super::subscription::SubscriptionService;

/// Outcome of one polling pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollReport {
    /// Contacts queried
    pub checked: usize,
    /// Contacts whose status changed
    pub changed: usize,
    /// Authorization requests re-sent
    pub re_requested: usize,
    /// Re-requests that failed
    pub failed: usize,
}

/// Owner of the background polling task
///
/// At most one task runs at a time; starting again replaces it.
#[derive(Debug, Default)]
pub struct AwaitingAuthorizationPoller {
    task: Mutex<Option<JoinHandle<()>>>,
}

impl AwaitingAuthorizationPoller {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start polling after the configured grace delay, cancelling any task
    /// already running
    pub fn start(&self, ctx: Arc<ServiceContext>) {
        let delay = ctx.config().poll_initial_delay();
        let period = ctx.config().poll_interval();

        let handle = tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + delay, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let report = run_pass(&ctx).await;
                debug!(?report, "Awaiting authorization poll finished");
            }
        });

        if let Some(previous) = self.task.lock().replace(handle) {
            previous.abort();
            debug!("Replaced running awaiting authorization poller");
        }
        info!(?delay, ?period, "Awaiting authorization poller started");
    }

    /// Stop polling. Does nothing if no task is running.
    pub fn cancel(&self) {
        if let Some(handle) = self.task.lock().take() {
            handle.abort();
            info!("Awaiting authorization poller stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.task
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for AwaitingAuthorizationPoller {
    fn drop(&mut self) {
        if let Some(handle) = self.task.get_mut().take() {
            handle.abort();
        }
    }
}

/// Run one polling pass over the awaiting authorization group
#[instrument(skip(ctx))]
pub async fn run_pass(ctx: &ServiceContext) -> PollReport {
    let mut report = PollReport::default();

    let Some(group) = SubscriptionService::new(ctx).awaiting_group() else {
        return report;
    };

    let queries = StatusQueryService::new(ctx);
    let presence = PresenceService::new(ctx);
    let reason = &ctx.config().authorization.re_request_reason;

    let awaiting = ctx.contact_list().contacts(&group.name);
    for identifier in awaiting.into_iter().map(|contact| contact.identifier) {
        report.checked += 1;
        let status = queries.query(&identifier).await;

        // The contact may have been accepted or moved while we waited
        let still_awaiting = ctx
            .contact_list()
            .parent_group(&identifier)
            .is_some_and(|parent| parent.name == group.name);
        if !still_awaiting {
            debug!(identifier = %identifier, "Contact left the awaiting group during the query");
            continue;
        }

        if presence.apply_contact_status(&identifier, status, Some(group.clone())) {
            report.changed += 1;
        }

        if !status.is_online() || !ctx.seen_available().insert(identifier.clone()) {
            continue;
        }

        let Some(contact) = ctx.contact_list().find_contact(&identifier) else {
            continue;
        };

        let Some(extended) = ctx.extended_authorization() else {
            debug!(identifier = %identifier, "No extended authorization available");
            continue;
        };

        match extended
            .re_request(&AuthorizationRequest::new(reason.clone()), &contact)
            .await
        {
            Ok(()) => {
                report.re_requested += 1;
                info!(identifier = %identifier, "Authorization re-requested");
            }
            Err(e) => {
                report.failed += 1;
                error!(identifier = %identifier, error = %e, "Failed to re-request authorization");
            }
        }
    }

    report
}
