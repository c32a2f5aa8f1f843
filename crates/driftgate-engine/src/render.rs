//! Notification block rendering.
//!
//! Produces the JSON block payloads the external notifier delivers: a header
//! block, one section per endpoint outcome, an interactive approve/defer
//! block for each drifted endpoint, and an aggregate-statistics block. Pages
//! are capped at [`MAX_BLOCKS_PER_PAGE`] blocks; the header only ever lands
//! on the first page and the statistics block on the last.
//!
//! Delivery itself stays behind the [`driftgate_core::notify::Notifier`]
//! seam; this module only shapes payloads.

use driftgate_core::model::{RunReport, TestOutcome, VersionSignal};
use driftgate_core::schema::shape_digest;
use driftgate_core_types::EndpointKey;
use serde_json::{json, Value};

/// Hard cap on rendered content blocks per notification page
pub const MAX_BLOCKS_PER_PAGE: usize = 50;

/// Render a full run report into notification pages
pub fn render_report(report: &RunReport) -> Vec<Value> {
    let mut blocks = Vec::new();
    blocks.push(header_block(report));

    for signal in &report.version_signals {
        blocks.push(version_signal_block(signal));
    }
    for outcome in &report.results {
        blocks.extend(render_endpoint_section(outcome));
    }

    blocks.push(stats_block(report));
    paginate(blocks)
}

/// Render one endpoint's outcome as a block list
///
/// A drifted endpoint additionally gets its interactive approve/defer block,
/// both controls keyed by the endpoint-key.
pub fn render_endpoint_section(outcome: &TestOutcome) -> Vec<Value> {
    let mut blocks = vec![section_block(outcome)];
    if outcome.has_drift() {
        blocks.push(actions_block(&EndpointKey::from_name(&outcome.endpoint)));
    }
    blocks
}

/// Drop every interactive block from a delivered payload
///
/// Used when editing a message after a decision was taken, so the controls
/// cannot fire twice. Non-array payloads pass through unchanged.
pub fn strip_interactive_controls(payload: &Value) -> Value {
    match payload.as_array() {
        Some(blocks) => Value::Array(
            blocks
                .iter()
                .filter(|block| block.get("type").and_then(Value::as_str) != Some("actions"))
                .cloned()
                .collect(),
        ),
        None => payload.clone(),
    }
}

/// Append an "approved by" context marker to a block payload
pub fn append_approved_marker(payload: &Value, identity: &str) -> Value {
    let marker = json!({
        "type": "context",
        "elements": [{
            "type": "mrkdwn",
            "text": format!(":white_check_mark: approved by {}", identity),
        }],
    });
    match payload.as_array() {
        Some(blocks) => {
            let mut blocks = blocks.clone();
            blocks.push(marker);
            Value::Array(blocks)
        }
        None => Value::Array(vec![payload.clone(), marker]),
    }
}

fn paginate(blocks: Vec<Value>) -> Vec<Value> {
    if blocks.is_empty() {
        return Vec::new();
    }
    blocks
        .chunks(MAX_BLOCKS_PER_PAGE)
        .map(|page| Value::Array(page.to_vec()))
        .collect()
}

fn header_block(report: &RunReport) -> Value {
    json!({
        "type": "header",
        "text": {
            "type": "plain_text",
            "text": format!("API drift report ({})", report.finished_at.format("%Y-%m-%d %H:%M UTC")),
        },
    })
}

fn stats_block(report: &RunReport) -> Value {
    json!({
        "type": "context",
        "elements": [{
            "type": "mrkdwn",
            "text": format!(
                "{} endpoint(s) checked, {} failed, {} drifted, {} new version(s) discovered",
                report.results.len(),
                report.failure_count(),
                report.drift_count(),
                report.version_signals.len(),
            ),
        }],
    })
}

fn section_block(outcome: &TestOutcome) -> Value {
    let status_icon = if outcome.success {
        ":large_green_circle:"
    } else if outcome.is_critical {
        ":red_circle:"
    } else {
        ":large_yellow_circle:"
    };
    let mut lines = vec![format!(
        "{} *{}* `{}`{}",
        status_icon,
        outcome.endpoint,
        outcome.method,
        match outcome.status {
            Some(code) => format!(" ({})", code),
            None => " (no response)".to_string(),
        },
    )];
    if let Some(message) = &outcome.error_message {
        lines.push(message.clone());
    }
    if !outcome.diff.missing_fields.is_empty() {
        lines.push(format!("missing: {}", outcome.diff.missing_fields.join(", ")));
    }
    if !outcome.diff.extra_fields.is_empty() {
        lines.push(format!("extra: {}", outcome.diff.extra_fields.join(", ")));
    }
    for mismatch in &outcome.diff.type_mismatches {
        lines.push(format!(
            "type changed at `{}`: {} -> {}",
            mismatch.path, mismatch.expected, mismatch.actual
        ));
    }
    if outcome.expected_schema_missing {
        lines.push("expected schema file is missing".to_string());
    }
    if let Some(candidate) = &outcome.staged_candidate {
        lines.push(format!(
            "staged candidate `{}`",
            &shape_digest(candidate)[..12]
        ));
    }
    json!({
        "type": "section",
        "text": {"type": "mrkdwn", "text": lines.join("\n")},
    })
}

fn version_signal_block(signal: &VersionSignal) -> Value {
    json!({
        "type": "section",
        "text": {
            "type": "mrkdwn",
            "text": format!(
                ":rocket: *{}*: a newer API version answered at `{}`",
                signal.endpoint, signal.new_url
            ),
        },
    })
}

fn actions_block(key: &EndpointKey) -> Value {
    json!({
        "type": "actions",
        "elements": [
            {
                "type": "button",
                "action_id": "approve",
                "value": key.as_str(),
                "text": {"type": "plain_text", "text": "Approve"},
                "style": "primary",
            },
            {
                "type": "button",
                "action_id": "defer",
                "value": key.as_str(),
                "text": {"type": "plain_text", "text": "Defer"},
            },
        ],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use driftgate_core::model::HttpMethod;
    use driftgate_core_types::RunId;

    fn drifted(name: &str) -> TestOutcome {
        let mut outcome = TestOutcome::passed(name, HttpMethod::Get, 200);
        outcome.success = false;
        outcome.diff.missing_fields.push("balance".to_string());
        outcome
    }

    fn report(results: Vec<TestOutcome>) -> RunReport {
        RunReport {
            run_id: RunId::new(),
            results,
            version_signals: vec![],
            started_at: Utc::now(),
            finished_at: Utc::now(),
        }
    }

    fn block_types(page: &Value) -> Vec<&str> {
        page.as_array()
            .unwrap()
            .iter()
            .map(|b| b["type"].as_str().unwrap())
            .collect()
    }

    #[test]
    fn test_header_first_and_stats_last() {
        let pages = render_report(&report(vec![
            TestOutcome::passed("A", HttpMethod::Get, 200),
            drifted("B"),
        ]));
        assert_eq!(pages.len(), 1);
        let types = block_types(&pages[0]);
        assert_eq!(types.first(), Some(&"header"));
        assert_eq!(types.last(), Some(&"context"));
    }

    #[test]
    fn test_drifted_endpoint_gets_actions_keyed_by_endpoint_key() {
        let blocks = render_endpoint_section(&drifted("Get Balance"));
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[1]["type"], "actions");
        for element in blocks[1]["elements"].as_array().unwrap() {
            assert_eq!(element["value"], "Get_Balance");
        }
    }

    #[test]
    fn test_passing_endpoint_has_no_actions() {
        let blocks = render_endpoint_section(&TestOutcome::passed("A", HttpMethod::Get, 200));
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0]["type"], "section");
    }

    #[test]
    fn test_pagination_cap() {
        let outcomes: Vec<TestOutcome> = (0..120)
            .map(|i| TestOutcome::passed(&format!("ep-{i}"), HttpMethod::Get, 200))
            .collect();
        let pages = render_report(&report(outcomes));
        // 122 blocks total (header + 120 sections + stats) -> 3 pages.
        assert_eq!(pages.len(), 3);
        for page in &pages {
            assert!(page.as_array().unwrap().len() <= MAX_BLOCKS_PER_PAGE);
        }
        assert_eq!(block_types(&pages[0])[0], "header");
        assert_eq!(*block_types(&pages[2]).last().unwrap(), "context");
        assert!(!block_types(&pages[1]).contains(&"header"));
    }

    #[test]
    fn test_strip_interactive_controls_drops_actions_only() {
        let payload = json!([
            {"type": "section", "text": {"type": "mrkdwn", "text": "x"}},
            {"type": "actions", "elements": []},
        ]);
        let stripped = strip_interactive_controls(&payload);
        let types: Vec<&str> = stripped
            .as_array()
            .unwrap()
            .iter()
            .map(|b| b["type"].as_str().unwrap())
            .collect();
        assert_eq!(types, vec!["section"]);
    }

    #[test]
    fn test_append_approved_marker() {
        let payload = json!([{"type": "section"}]);
        let edited = append_approved_marker(&payload, "alice");
        let blocks = edited.as_array().unwrap();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[1]["type"], "context");
        assert!(blocks[1]["elements"][0]["text"]
            .as_str()
            .unwrap()
            .contains("approved by alice"));
    }
}
