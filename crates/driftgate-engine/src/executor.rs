//! Endpoint execution and outcome classification.
//!
//! Classification rules:
//! - transport failure -> `{success: false, is_critical: true, status: None}`
//! - non-2xx status    -> `{success: false, is_critical: true, status: code}`
//! - 2xx, no expected schema configured -> immediate success, no diff
//! - 2xx, expected schema configured    -> diff; success iff the report is
//!   empty. An unreadable schema reference is flagged, not thrown.

use driftgate_core::diff::diff_shapes;
use driftgate_core::errors::{DgErrorKind, Result};
use driftgate_core::model::{EndpointDescriptor, TestOutcome};
use driftgate_store::SchemaDir;
use serde_json::Value;

use crate::http::HttpTransport;
use crate::resolve::{prepare, Resolution, RunParams};

/// Result of attempting one endpoint
#[derive(Debug)]
pub enum Execution {
    /// The call ran; the outcome and (when available) the parsed body
    Completed {
        outcome: TestOutcome,
        body: Option<Value>,
    },
    /// The endpoint needs an identifier and none was resolvable
    Skipped { reason: String },
}

/// Resolves descriptors into calls and classifies what comes back
pub struct EndpointExecutor<'a> {
    transport: &'a dyn HttpTransport,
    schemas: &'a SchemaDir,
}

impl<'a> EndpointExecutor<'a> {
    pub fn new(transport: &'a dyn HttpTransport, schemas: &'a SchemaDir) -> Self {
        Self { transport, schemas }
    }

    /// Execute one endpoint and classify the outcome
    ///
    /// # Errors
    ///
    /// Only resolution failures (bad templates) surface as errors; transport
    /// and status failures are captured inside the returned outcome.
    pub async fn execute(
        &self,
        descriptor: &EndpointDescriptor,
        params: &RunParams,
    ) -> Result<Execution> {
        let request = match prepare(descriptor, params)? {
            Resolution::Ready(request) => request,
            Resolution::SkippedMissingIdentifier => {
                return Ok(Execution::Skipped {
                    reason: "no identifier resolvable".to_string(),
                });
            }
        };

        let response = match self.transport.execute(&request).await {
            Ok(response) => response,
            Err(err) => {
                return Ok(Execution::Completed {
                    outcome: TestOutcome::critical(
                        &descriptor.name,
                        descriptor.method,
                        None,
                        err.to_string(),
                    ),
                    body: None,
                });
            }
        };

        if !response.is_success() {
            return Ok(Execution::Completed {
                outcome: TestOutcome::critical(
                    &descriptor.name,
                    descriptor.method,
                    Some(response.status),
                    format!("unexpected status {}", response.status),
                ),
                body: response.body_json(),
            });
        }

        let Some(schema_ref) = &descriptor.expected_schema_ref else {
            // Reachability-only endpoint: 2xx is all we ask.
            return Ok(Execution::Completed {
                outcome: TestOutcome::passed(&descriptor.name, descriptor.method, response.status),
                body: response.body_json(),
            });
        };

        let expected = match self.schemas.read_expected(schema_ref) {
            Ok(expected) => expected,
            Err(err) if err.kind() == DgErrorKind::SchemaMissing => {
                let mut outcome =
                    TestOutcome::passed(&descriptor.name, descriptor.method, response.status);
                outcome.success = false;
                outcome.expected_schema_ref = Some(schema_ref.clone());
                outcome.expected_schema_missing = true;
                outcome.error_message = Some(format!("expected schema missing: {}", schema_ref));
                return Ok(Execution::Completed {
                    outcome,
                    body: response.body_json(),
                });
            }
            Err(err) => return Err(err),
        };

        // A non-JSON body diffs as null, which reads as a root-level drift.
        let body = response.body_json();
        let actual = body.clone().unwrap_or(Value::Null);
        let diff = diff_shapes(&expected, &actual);

        let mut outcome = TestOutcome::passed(&descriptor.name, descriptor.method, response.status);
        outcome.expected_schema_ref = Some(schema_ref.clone());
        outcome.success = diff.is_empty();
        if !diff.is_empty() {
            outcome.error_message = Some(format!(
                "response shape drifted: {} finding(s)",
                diff.finding_count()
            ));
        }
        outcome.diff = diff;

        Ok(Execution::Completed { outcome, body })
    }
}
