//! Speculative next-version probing.
//!
//! For a URL template carrying a `/v<N>/` segment, the prober substitutes
//! `N+1`, resolves the remaining placeholders, and issues a GET. A candidate
//! is valid iff the call succeeds with a 2xx status and the body does not
//! carry a conventional non-zero error envelope.
//!
//! The prober never looks beyond `N+1` in a single cycle and never raises:
//! every failure degrades to "no new version".

use driftgate_core::model::{EndpointDescriptor, VersionSignal};
use serde_json::Value;

use crate::http::{HttpTransport, PreparedRequest};
use crate::resolve::{prepare, resolve_template, Resolution, RunParams};

/// Substitute the next integer version into the first `/v<N>/` segment
///
/// Returns None when the URL carries no version segment.
pub fn bump_version(url: &str) -> Option<String> {
    let mut search_from = 0;
    while let Some(found) = url[search_from..].find("/v") {
        let start = search_from + found + 2;
        let digits: String = url[start..]
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .collect();
        let after = start + digits.len();
        let terminated = url[after..].is_empty() || url[after..].starts_with('/');
        if !digits.is_empty() && terminated {
            let version: u64 = digits.parse().ok()?;
            return Some(format!(
                "{}{}{}",
                &url[..start],
                version + 1,
                &url[after..]
            ));
        }
        search_from = start;
    }
    None
}

/// True if a body looks like a conventional non-zero error envelope
///
/// An object body with a non-null/non-false `error` field, or a non-zero
/// numeric `code`/`errorCode`, is treated as an error envelope. Anything
/// else (including non-object bodies) is not.
pub fn is_error_envelope(body: &Value) -> bool {
    let Some(map) = body.as_object() else {
        return false;
    };
    if let Some(error) = map.get("error") {
        if !matches!(error, Value::Null | Value::Bool(false)) {
            return true;
        }
    }
    for field in ["code", "errorCode"] {
        if let Some(code) = map.get(field).and_then(Value::as_i64) {
            if code != 0 {
                return true;
            }
        }
    }
    false
}

/// Probe the next integer version of an endpoint's URL
///
/// Returns a [`VersionSignal`] carrying the bumped URL and the unchanged
/// expected-schema reference when the probe answers validly; None otherwise.
/// The caller must skip normal diffing for the endpoint on a signal.
pub async fn probe_next_version(
    descriptor: &EndpointDescriptor,
    params: &RunParams,
    transport: &dyn HttpTransport,
) -> Option<VersionSignal> {
    let bumped_template = bump_version(&descriptor.url_template)?;

    if descriptor.requires_identifier && params.effective_identifier().is_none() {
        return None;
    }

    // Resolve placeholders with the same rules as the real call; a probe is
    // always a GET with the endpoint's headers attached.
    let url = match resolve_template(&bumped_template, params) {
        Ok(url) => url,
        Err(err) => {
            tracing::debug!(
                endpoint = descriptor.name,
                error = %err,
                "version probe could not resolve template"
            );
            return None;
        }
    };

    let mut request = PreparedRequest::get(url.clone());
    if let Ok(Resolution::Ready(resolved)) = prepare(descriptor, params) {
        request.headers = resolved.headers;
        request.query = resolved.query;
    }

    let response = match transport.execute(&request).await {
        Ok(response) => response,
        Err(err) => {
            tracing::debug!(
                endpoint = descriptor.name,
                error = %err,
                "version probe failed at transport level"
            );
            return None;
        }
    };

    if !response.is_success() {
        return None;
    }
    if let Some(body) = response.body_json() {
        if is_error_envelope(&body) {
            return None;
        }
    }

    tracing::info!(
        endpoint = descriptor.name,
        new_url = url,
        "discovered working next API version"
    );

    Some(VersionSignal {
        endpoint: descriptor.name.clone(),
        new_url: url,
        expected_schema_ref: descriptor.expected_schema_ref.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bump_version_simple() {
        assert_eq!(
            bump_version("https://api.example.com/v1/foo").as_deref(),
            Some("https://api.example.com/v2/foo")
        );
    }

    #[test]
    fn test_bump_version_multi_digit() {
        assert_eq!(
            bump_version("https://api.example.com/v19/foo").as_deref(),
            Some("https://api.example.com/v20/foo")
        );
    }

    #[test]
    fn test_bump_version_at_end_of_url() {
        assert_eq!(
            bump_version("https://api.example.com/v3").as_deref(),
            Some("https://api.example.com/v4")
        );
    }

    #[test]
    fn test_no_version_segment_yields_none() {
        assert_eq!(bump_version("https://api.example.com/foo"), None);
        // "/vault" is not a version segment.
        assert_eq!(bump_version("https://api.example.com/vault/foo"), None);
    }

    #[test]
    fn test_only_first_version_segment_is_bumped() {
        assert_eq!(
            bump_version("https://api.example.com/v1/foo/v2/bar").as_deref(),
            Some("https://api.example.com/v2/foo/v2/bar")
        );
    }

    #[test]
    fn test_error_envelope_detection() {
        assert!(is_error_envelope(&json!({"error": "not found"})));
        assert!(is_error_envelope(&json!({"error": {"msg": "x"}})));
        assert!(is_error_envelope(&json!({"code": 17})));
        assert!(is_error_envelope(&json!({"errorCode": -1})));

        assert!(!is_error_envelope(&json!({"error": null})));
        assert!(!is_error_envelope(&json!({"error": false})));
        assert!(!is_error_envelope(&json!({"code": 0})));
        assert!(!is_error_envelope(&json!({"data": []})));
        assert!(!is_error_envelope(&json!([1, 2, 3])));
        assert!(!is_error_envelope(&json!("plain")));
    }
}
