use chrono::{DateTime, Utc};
use driftgate_core_types::RunId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::diff::DiffReport;
use crate::model::endpoint::HttpMethod;

/// Per-endpoint result of one monitoring run
///
/// Produced for every endpoint that was actually executed (version-bumped
/// endpoints emit a [`VersionSignal`] instead, skipped endpoints emit
/// nothing).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestOutcome {
    /// Endpoint name as declared
    pub endpoint: String,

    /// Method that was called
    pub method: HttpMethod,

    /// True iff the call succeeded and no drift was found
    pub success: bool,

    /// True for transport failures and non-2xx statuses; drift alone is
    /// not critical
    pub is_critical: bool,

    /// HTTP status code; None when the transport failed before a status
    pub status: Option<u16>,

    /// Human-readable failure description, when any
    pub error_message: Option<String>,

    /// Drift findings against the stored expected shape
    #[serde(flatten)]
    pub diff: DiffReport,

    /// Candidate shape staged for approval when drift was found
    pub staged_candidate: Option<Value>,

    /// The expected-schema reference that was used as the diff baseline
    pub expected_schema_ref: Option<String>,

    /// True when a schema reference was configured but unreadable
    pub expected_schema_missing: bool,
}

impl TestOutcome {
    /// A passing outcome with no drift
    pub fn passed(endpoint: &str, method: HttpMethod, status: u16) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            method,
            success: true,
            is_critical: false,
            status: Some(status),
            error_message: None,
            diff: DiffReport::new(),
            staged_candidate: None,
            expected_schema_ref: None,
            expected_schema_missing: false,
        }
    }

    /// A critical failure outcome (transport or status failure)
    pub fn critical(
        endpoint: &str,
        method: HttpMethod,
        status: Option<u16>,
        error_message: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            method,
            success: false,
            is_critical: true,
            status,
            error_message: Some(error_message.into()),
            diff: DiffReport::new(),
            staged_candidate: None,
            expected_schema_ref: None,
            expected_schema_missing: false,
        }
    }

    /// True iff this outcome carries drift findings
    pub fn has_drift(&self) -> bool {
        !self.diff.is_empty()
    }
}

/// A discovered next-integer version of an endpoint's URL
///
/// Produced instead of a [`TestOutcome`] for that endpoint in that run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionSignal {
    /// Endpoint name as declared
    pub endpoint: String,
    /// The bumped URL that answered successfully
    pub new_url: String,
    /// Expected-schema reference carried over unchanged
    pub expected_schema_ref: Option<String>,
}

/// Aggregated result of one full run, handed to the external notifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// Correlation id of this run
    pub run_id: RunId,
    /// Per-endpoint outcomes, in declared endpoint order
    pub results: Vec<TestOutcome>,
    /// Version discoveries, in declared endpoint order
    pub version_signals: Vec<VersionSignal>,
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// When the run finished
    pub finished_at: DateTime<Utc>,
}

impl RunReport {
    /// Number of failed (non-success) outcomes
    pub fn failure_count(&self) -> usize {
        self.results.iter().filter(|r| !r.success).count()
    }

    /// Number of outcomes carrying drift findings
    pub fn drift_count(&self) -> usize {
        self.results.iter().filter(|r| r.has_drift()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passed_outcome() {
        let outcome = TestOutcome::passed("Get Balance", HttpMethod::Get, 200);
        assert!(outcome.success);
        assert!(!outcome.is_critical);
        assert_eq!(outcome.status, Some(200));
        assert!(!outcome.has_drift());
    }

    #[test]
    fn test_critical_outcome_without_status() {
        let outcome =
            TestOutcome::critical("Get Balance", HttpMethod::Get, None, "connection refused");
        assert!(!outcome.success);
        assert!(outcome.is_critical);
        assert_eq!(outcome.status, None);
        assert_eq!(outcome.error_message.as_deref(), Some("connection refused"));
    }

    #[test]
    fn test_diff_fields_flatten_into_outcome_json() {
        let outcome = TestOutcome::passed("Get Balance", HttpMethod::Get, 200);
        let json = serde_json::to_value(&outcome).unwrap();
        assert!(json.get("missing_fields").is_some());
        assert!(json.get("extra_fields").is_some());
        assert!(json.get("type_mismatches").is_some());
    }

    #[test]
    fn test_report_counters() {
        let mut drifted = TestOutcome::passed("A", HttpMethod::Get, 200);
        drifted.success = false;
        drifted.diff.missing_fields.push("b".to_string());
        let report = RunReport {
            run_id: RunId::new(),
            results: vec![TestOutcome::passed("B", HttpMethod::Get, 200), drifted],
            version_signals: vec![],
            started_at: Utc::now(),
            finished_at: Utc::now(),
        };
        assert_eq!(report.failure_count(), 1);
        assert_eq!(report.drift_count(), 1);
    }
}
