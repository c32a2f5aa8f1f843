//! Run orchestration.
//!
//! Walks the endpoint list in declared order: probe for a bumped version
//! first, otherwise execute and diff, staging a normalized candidate on
//! drift. A failure inside one endpoint is contained at that endpoint's
//! boundary as a critical outcome; the run always visits every endpoint.
//! Calls are strictly sequential with a configurable pause between them.

use std::time::{Duration, Instant};

use chrono::Utc;
use driftgate_core::errors::Result;
use driftgate_core::model::{EndpointDescriptor, RunReport, TestOutcome, VersionSignal};
use driftgate_core::notify::Notifier;
use driftgate_core::schema::{merge_shapes, normalize};
use driftgate_core::{log_op_end, log_op_start};
use driftgate_core_types::RunId;
use driftgate_store::{ApprovalStore, CachedNotification};
use serde_json::Value;

use crate::executor::{EndpointExecutor, Execution};
use crate::http::HttpTransport;
use crate::prober::probe_next_version;
use crate::render::render_report;
use crate::resolve::RunParams;

/// Tunables for one run
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Pause between consecutive endpoint calls
    pub pacing: Duration,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            pacing: Duration::ZERO,
        }
    }
}

/// Drives a full monitoring run over a list of endpoint descriptors
pub struct Orchestrator<'a> {
    transport: &'a dyn HttpTransport,
    store: &'a ApprovalStore,
    notifier: &'a dyn Notifier,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        transport: &'a dyn HttpTransport,
        store: &'a ApprovalStore,
        notifier: &'a dyn Notifier,
    ) -> Self {
        Self {
            transport,
            store,
            notifier,
        }
    }

    /// Run every endpoint and publish the report
    ///
    /// Per-endpoint failures are contained as critical outcomes. Publication
    /// and timestamp-write failures are logged and do not fail the run; the
    /// report is returned regardless.
    pub async fn run(
        &self,
        endpoints: &[EndpointDescriptor],
        params: &RunParams,
        options: &RunOptions,
    ) -> Result<RunReport> {
        let run_id = RunId::new();
        let started = Instant::now();
        let started_at = Utc::now();
        log_op_start!("run_endpoints", run_id = %run_id, endpoint_count = endpoints.len());

        let executor = EndpointExecutor::new(self.transport, self.store.schemas());
        let mut results: Vec<TestOutcome> = Vec::new();
        let mut version_signals: Vec<VersionSignal> = Vec::new();

        for (index, descriptor) in endpoints.iter().enumerate() {
            if index > 0 && !options.pacing.is_zero() {
                tokio::time::sleep(options.pacing).await;
            }

            if let Some(signal) = probe_next_version(descriptor, params, self.transport).await {
                version_signals.push(signal);
                continue;
            }

            match self.process_endpoint(&executor, descriptor, params).await {
                Ok(Some(outcome)) => results.push(outcome),
                Ok(None) => {}
                Err(err) => {
                    tracing::error!(
                        run_id = %run_id,
                        endpoint = descriptor.name,
                        error = %err,
                        "endpoint processing failed, recording critical outcome"
                    );
                    results.push(TestOutcome::critical(
                        &descriptor.name,
                        descriptor.method,
                        None,
                        err.to_string(),
                    ));
                }
            }
        }

        let finished_at = Utc::now();
        if let Err(err) = self.store.set_last_run_timestamp(&finished_at) {
            tracing::error!(run_id = %run_id, error = %err, "failed to record run timestamp");
        }

        let report = RunReport {
            run_id,
            results,
            version_signals,
            started_at,
            finished_at,
        };

        self.publish(&report);

        log_op_end!(
            "run_endpoints",
            duration_ms = started.elapsed().as_millis() as u64,
            run_id = %report.run_id,
            result_count = report.results.len(),
            signal_count = report.version_signals.len()
        );
        Ok(report)
    }

    /// Execute one endpoint; Ok(None) means the endpoint was skipped
    async fn process_endpoint(
        &self,
        executor: &EndpointExecutor<'_>,
        descriptor: &EndpointDescriptor,
        params: &RunParams,
    ) -> Result<Option<TestOutcome>> {
        let (mut outcome, body) = match executor.execute(descriptor, params).await? {
            Execution::Completed { outcome, body } => (outcome, body),
            Execution::Skipped { reason } => {
                tracing::info!(endpoint = descriptor.name, reason, "endpoint skipped");
                return Ok(None);
            }
        };

        if outcome.has_drift() {
            let key = descriptor.key();
            let observed = normalize(&body.unwrap_or(Value::Null));
            // Fold into any previously staged candidate so repeated
            // observations accumulate instead of ping-ponging.
            let candidate = match self.store.pending_candidate(&key)? {
                Some(previous) => merge_shapes(&previous, &observed),
                None => observed,
            };
            self.store.stage_candidate(&key, &candidate)?;
            outcome.staged_candidate = Some(candidate);
        }

        Ok(Some(outcome))
    }

    /// Deliver the report and cache what the notifier sent
    ///
    /// Delivery failures never fail the run; the report already exists.
    fn publish(&self, report: &RunReport) {
        let pages = render_report(report);
        match self.notifier.publish(report, &pages) {
            Ok(sent) => {
                for message in sent {
                    let cached = CachedNotification {
                        payload: message.payload,
                        message_id: message.message_id,
                    };
                    if let Err(err) = self.store.cache_notification(&message.key, &cached) {
                        tracing::error!(
                            endpoint_key = message.key.as_str(),
                            error = %err,
                            "failed to cache delivered notification"
                        );
                    }
                }
            }
            Err(err) => {
                tracing::error!(run_id = %report.run_id, error = %err, "report delivery failed");
            }
        }
    }
}
