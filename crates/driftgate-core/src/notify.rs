//! Notifier and rerun seam traits.
//!
//! The chat/notification channel and the run scheduler are external
//! collaborators. The pipeline only sees these two traits; production wiring
//! injects real implementations, tests inject recording fakes.

use driftgate_core_types::EndpointKey;
use serde_json::Value;

use crate::errors::{DgError, DgErrorKind, Result};
use crate::model::RunReport;

/// A message the notifier actually delivered for one drifted endpoint
///
/// The payload/message-id pair is cached so the message can be edited later
/// (interactive controls stripped, approved-by marker appended).
#[derive(Debug, Clone, PartialEq)]
pub struct SentMessage {
    /// Endpoint the section belongs to
    pub key: EndpointKey,
    /// Rendered block payload as it was sent
    pub payload: Value,
    /// Channel-specific identifier of the delivered message
    pub message_id: String,
}

/// Outbound notification channel.
pub trait Notifier: Send + Sync {
    /// Deliver a paginated run report.
    ///
    /// Returns one [`SentMessage`] per drifted-endpoint section so the caller
    /// can cache payloads for later in-place edits.
    ///
    /// # Errors
    ///
    /// Returns `DgErrorKind::ExternalService` if delivery fails.
    fn publish(&self, report: &RunReport, pages: &[Value]) -> Result<Vec<SentMessage>>;

    /// Re-render a previously delivered message in place.
    ///
    /// # Errors
    ///
    /// Returns `DgErrorKind::ExternalService` if the edit fails.
    fn update(&self, message_id: &str, payload: &Value) -> Result<()>;
}

/// Noop notifier: publishes nothing and reports no sent messages.
/// Used as default when no channel is configured.
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn publish(&self, _: &RunReport, _: &[Value]) -> Result<Vec<SentMessage>> {
        Ok(Vec::new())
    }

    fn update(&self, _: &str, _: &Value) -> Result<()> {
        Ok(())
    }
}

/// Hook for scheduling a full rerun after a successful approval.
pub trait RerunTrigger: Send + Sync {
    /// Request a full run. Must not block the caller; failures are logged
    /// by the approval service and never surfaced to the approving user.
    ///
    /// # Errors
    ///
    /// Returns `DgErrorKind::ExternalService` if no runner is configured or
    /// the request cannot be queued.
    fn trigger_rerun(&self, reason: &str) -> Result<()>;
}

/// Noop trigger: always reports that no runner is configured.
pub struct NoopRerunTrigger;

impl RerunTrigger for NoopRerunTrigger {
    fn trigger_rerun(&self, _: &str) -> Result<()> {
        Err(DgError::new(DgErrorKind::ExternalService)
            .with_op("trigger_rerun")
            .with_message("No rerun trigger configured"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use driftgate_core_types::RunId;

    #[test]
    fn test_noop_notifier_reports_nothing_sent() {
        let report = RunReport {
            run_id: RunId::new(),
            results: vec![],
            version_signals: vec![],
            started_at: Utc::now(),
            finished_at: Utc::now(),
        };
        let sent = NoopNotifier.publish(&report, &[]).unwrap();
        assert!(sent.is_empty());
    }

    #[test]
    fn test_noop_rerun_trigger_is_unavailable() {
        let result = NoopRerunTrigger.trigger_rerun("approval");
        assert_eq!(
            result.unwrap_err().kind(),
            DgErrorKind::ExternalService
        );
    }
}
