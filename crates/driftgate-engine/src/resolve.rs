//! Placeholder and identifier resolution.
//!
//! URL templates and header values may carry `{TOKEN}` placeholders. Tokens
//! resolve from the run's secret map first, then from the process
//! environment. The reserved token `{IDENTIFIER}` resolves from the
//! externally supplied identifier, falling back to the stored default; an
//! endpoint that requires one but has none resolvable is skipped, never
//! failed.

use std::collections::BTreeMap;

use driftgate_core::errors::{DgError, DgErrorKind, Result};
use driftgate_core::model::EndpointDescriptor;
use serde_json::Value;

use crate::http::PreparedRequest;

/// Reserved placeholder token for the per-run identifier
pub const IDENTIFIER_TOKEN: &str = "IDENTIFIER";

/// Per-run resolution inputs
#[derive(Debug, Default, Clone)]
pub struct RunParams {
    /// Placeholder values taking precedence over the environment
    pub secrets: BTreeMap<String, String>,
    /// Identifier supplied by the caller of this run
    pub identifier: Option<String>,
    /// Stored default identifier, used when no override is supplied
    pub default_identifier: Option<String>,
    /// Stored request bodies, keyed by body reference
    pub bodies: BTreeMap<String, Value>,
}

impl RunParams {
    /// The identifier in effect for this run: override first, then default
    pub fn effective_identifier(&self) -> Option<&str> {
        self.identifier
            .as_deref()
            .or(self.default_identifier.as_deref())
    }
}

/// Outcome of resolving one endpoint descriptor
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// The call is fully resolved and ready to execute
    Ready(PreparedRequest),
    /// The endpoint needs an identifier and none is resolvable
    SkippedMissingIdentifier,
}

/// Resolve a descriptor into a concrete request
///
/// # Errors
///
/// Returns `DgErrorKind::InvalidInput` for an unresolvable placeholder or a
/// malformed template.
pub fn prepare(descriptor: &EndpointDescriptor, params: &RunParams) -> Result<Resolution> {
    if descriptor.requires_identifier && params.effective_identifier().is_none() {
        return Ok(Resolution::SkippedMissingIdentifier);
    }

    let url = resolve_template(&descriptor.url_template, params)
        .map_err(|e| e.with_endpoint(&descriptor.name))?;

    let mut headers = Vec::new();
    for (name, template) in &descriptor.headers {
        let value =
            resolve_template(template, params).map_err(|e| e.with_endpoint(&descriptor.name))?;
        headers.push((name.clone(), value));
    }

    let query: Vec<(String, String)> = descriptor
        .query
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    let body = descriptor
        .body_ref
        .as_ref()
        .and_then(|r| params.bodies.get(r).cloned());

    Ok(Resolution::Ready(PreparedRequest {
        method: descriptor.method,
        url,
        query,
        headers,
        body,
    }))
}

/// Substitute every `{TOKEN}` in a template
pub fn resolve_template(template: &str, params: &RunParams) -> Result<String> {
    let mut result = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        result.push_str(&rest[..open]);
        let after_open = &rest[open + 1..];
        let Some(close) = after_open.find('}') else {
            return Err(DgError::new(DgErrorKind::InvalidInput)
                .with_op("resolve_template")
                .with_message(format!("unclosed placeholder in template: {}", template)));
        };
        let token = &after_open[..close];
        result.push_str(&resolve_token(token, params)?);
        rest = &after_open[close + 1..];
    }
    result.push_str(rest);
    Ok(result)
}

fn resolve_token(token: &str, params: &RunParams) -> Result<String> {
    if token == IDENTIFIER_TOKEN {
        return params
            .effective_identifier()
            .map(str::to_string)
            .ok_or_else(|| {
                DgError::new(DgErrorKind::InvalidInput)
                    .with_op("resolve_template")
                    .with_message("no identifier resolvable for {IDENTIFIER}")
            });
    }
    if let Some(value) = params.secrets.get(token) {
        return Ok(value.clone());
    }
    if let Ok(value) = std::env::var(token) {
        return Ok(value);
    }
    Err(DgError::new(DgErrorKind::InvalidInput)
        .with_op("resolve_template")
        .with_message(format!("unresolvable placeholder: {{{}}}", token)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use driftgate_core::model::HttpMethod;

    fn params_with(token: &str, value: &str) -> RunParams {
        let mut params = RunParams::default();
        params.secrets.insert(token.to_string(), value.to_string());
        params
    }

    fn descriptor(url: &str) -> EndpointDescriptor {
        EndpointDescriptor {
            name: "Get Balance".to_string(),
            url_template: url.to_string(),
            method: HttpMethod::Get,
            requires_identifier: false,
            expected_schema_ref: None,
            query: BTreeMap::new(),
            headers: BTreeMap::new(),
            body_ref: None,
        }
    }

    #[test]
    fn test_plain_template_passes_through() {
        let params = RunParams::default();
        let url = resolve_template("https://api.example.com/v1/balance", &params).unwrap();
        assert_eq!(url, "https://api.example.com/v1/balance");
    }

    #[test]
    fn test_secret_placeholder_resolves() {
        let params = params_with("API_HOST", "api.example.com");
        let url = resolve_template("https://{API_HOST}/v1/x", &params).unwrap();
        assert_eq!(url, "https://api.example.com/v1/x");
    }

    #[test]
    fn test_identifier_placeholder_uses_override_then_default() {
        let mut params = RunParams {
            default_identifier: Some("default-7".to_string()),
            ..RunParams::default()
        };
        let template = "https://api.example.com/v1/accounts/{IDENTIFIER}";
        assert_eq!(
            resolve_template(template, &params).unwrap(),
            "https://api.example.com/v1/accounts/default-7"
        );
        params.identifier = Some("override-9".to_string());
        assert_eq!(
            resolve_template(template, &params).unwrap(),
            "https://api.example.com/v1/accounts/override-9"
        );
    }

    #[test]
    fn test_unresolvable_placeholder_is_invalid_input() {
        let params = RunParams::default();
        let err = resolve_template("https://{NO_SUCH_TOKEN_SET}/x", &params).unwrap_err();
        assert_eq!(err.kind(), DgErrorKind::InvalidInput);
    }

    #[test]
    fn test_missing_identifier_skips_endpoint() {
        let mut ep = descriptor("https://api.example.com/v1/accounts/{IDENTIFIER}");
        ep.requires_identifier = true;
        let resolution = prepare(&ep, &RunParams::default()).unwrap();
        assert_eq!(resolution, Resolution::SkippedMissingIdentifier);
    }

    #[test]
    fn test_prepare_carries_headers_and_query() {
        let mut ep = descriptor("https://api.example.com/v1/balance");
        ep.headers
            .insert("Authorization".to_string(), "Bearer {TOKEN}".to_string());
        ep.query.insert("limit".to_string(), "10".to_string());
        let params = params_with("TOKEN", "abc123");

        let Resolution::Ready(request) = prepare(&ep, &params).unwrap() else {
            panic!("expected ready");
        };
        assert_eq!(
            request.headers,
            vec![("Authorization".to_string(), "Bearer abc123".to_string())]
        );
        assert_eq!(request.query, vec![("limit".to_string(), "10".to_string())]);
    }
}
