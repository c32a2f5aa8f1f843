//! Approval entry points and their external side effects.
//!
//! The durable state machine lives in [`ApprovalStore`]; this service wraps
//! it with the two effects a decision owes the outside world: editing the
//! previously delivered notification (controls stripped, approved-by marker
//! appended) and scheduling the post-approval rerun. The rerun runs detached
//! with its own result channel so the interactive caller is answered
//! immediately; rerun failures are logged, never surfaced.

use std::sync::Arc;

use driftgate_core::errors::Result;
use driftgate_core::notify::{Notifier, RerunTrigger};
use driftgate_core_types::EndpointKey;
use driftgate_store::{ApprovalStore, CachedNotification};

use crate::render::{append_approved_marker, strip_interactive_controls};

/// Handles approve/defer callbacks from the notification channel
pub struct ApprovalService<'a> {
    store: &'a ApprovalStore,
    notifier: &'a dyn Notifier,
    rerun: Arc<dyn RerunTrigger>,
}

impl<'a> ApprovalService<'a> {
    pub fn new(
        store: &'a ApprovalStore,
        notifier: &'a dyn Notifier,
        rerun: Arc<dyn RerunTrigger>,
    ) -> Self {
        Self {
            store,
            notifier,
            rerun,
        }
    }

    /// Approve the staged candidate for a key
    ///
    /// On success, promotes the candidate, edits the delivered notification
    /// in place, and kicks off a detached rerun. Edit and rerun failures are
    /// logged only.
    ///
    /// # Errors
    ///
    /// Returns `DgErrorKind::Validation` on a PIN mismatch, with no state
    /// mutated and no side effects run.
    pub fn approve(&self, key: &EndpointKey, supplied_pin: &str, identity: &str) -> Result<()> {
        let effects = self.store.approve(key, supplied_pin, identity)?;

        if let Some(notification) = effects.notification {
            let edited = append_approved_marker(
                &strip_interactive_controls(&notification.payload),
                &effects.approved_by,
            );
            match self.notifier.update(&notification.message_id, &edited) {
                Ok(()) => {
                    let cached = CachedNotification {
                        payload: edited,
                        message_id: notification.message_id,
                    };
                    if let Err(err) = self.store.cache_notification(key, &cached) {
                        tracing::error!(
                            endpoint_key = key.as_str(),
                            error = %err,
                            "failed to re-cache edited notification"
                        );
                    }
                }
                Err(err) => {
                    tracing::error!(
                        endpoint_key = key.as_str(),
                        error = %err,
                        "failed to edit delivered notification"
                    );
                }
            }
        }

        self.spawn_rerun(key);
        Ok(())
    }

    /// Postpone the decision for a key (idempotent)
    pub fn defer(&self, key: &EndpointKey) -> Result<()> {
        self.store.defer(key)?;
        tracing::info!(endpoint_key = key.as_str(), "approval deferred");
        Ok(())
    }

    /// Kick off the post-approval rerun without blocking the caller
    ///
    /// The worker reports through a dedicated channel; a monitor task logs
    /// the result so a failed rerun is never silently dropped.
    fn spawn_rerun(&self, key: &EndpointKey) {
        let rerun = Arc::clone(&self.rerun);
        let reason = format!("post-approval rerun for {}", key.as_str());
        let (tx, rx) = tokio::sync::oneshot::channel();

        tokio::spawn(async move {
            let _ = tx.send(rerun.trigger_rerun(&reason));
        });

        let endpoint_key = key.as_str().to_string();
        tokio::spawn(async move {
            match rx.await {
                Ok(Ok(())) => {
                    tracing::info!(endpoint_key, "post-approval rerun triggered");
                }
                Ok(Err(err)) => {
                    tracing::error!(endpoint_key, error = %err, "post-approval rerun failed");
                }
                Err(_) => {
                    tracing::error!(endpoint_key, "post-approval rerun worker dropped");
                }
            }
        });
    }
}
