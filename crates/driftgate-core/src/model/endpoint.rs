use std::collections::BTreeMap;

use driftgate_core_types::EndpointKey;
use serde::{Deserialize, Serialize};

/// HTTP method of an endpoint under watch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    /// Canonical uppercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// EndpointDescriptor - one HTTP API endpoint under contract watch
///
/// Loaded once per run from the config provider and immutable during it.
/// The URL template may embed a version path segment (`/v1/`) and
/// `{PLACEHOLDER}` tokens resolved from secrets or run parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointDescriptor {
    /// Unique human-readable name; its whitespace-collapsed form is the
    /// join key across all persisted state maps
    pub name: String,

    /// URL template, possibly carrying a `/v<N>/` segment and placeholders
    pub url_template: String,

    /// HTTP method used for the contract call
    pub method: HttpMethod,

    /// If true, the call needs an identifier substituted into the template;
    /// endpoints without a resolvable identifier are skipped, not failed
    #[serde(default)]
    pub requires_identifier: bool,

    /// Reference to the stored expected shape (endpoint-key file stem);
    /// None means the endpoint is only checked for reachability
    #[serde(default)]
    pub expected_schema_ref: Option<String>,

    /// Optional query parameters appended to every call
    #[serde(default)]
    pub query: BTreeMap<String, String>,

    /// Optional header templates (values may carry placeholders)
    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    /// Optional reference to a stored request body
    #[serde(default)]
    pub body_ref: Option<String>,
}

impl EndpointDescriptor {
    /// Derive the join key for this endpoint
    pub fn key(&self) -> EndpointKey {
        EndpointKey::from_name(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_key_derivation() {
        let ep = EndpointDescriptor {
            name: "List Open Orders".to_string(),
            url_template: "https://api.example.com/v1/orders".to_string(),
            method: HttpMethod::Get,
            requires_identifier: false,
            expected_schema_ref: Some("List_Open_Orders".to_string()),
            query: BTreeMap::new(),
            headers: BTreeMap::new(),
            body_ref: None,
        };
        assert_eq!(ep.key().as_str(), "List_Open_Orders");
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let ep: EndpointDescriptor = serde_json::from_value(json!({
            "name": "Get Balance",
            "url_template": "https://api.example.com/v2/balance",
            "method": "GET"
        }))
        .unwrap();
        assert!(!ep.requires_identifier);
        assert!(ep.expected_schema_ref.is_none());
        assert!(ep.query.is_empty());
        assert!(ep.headers.is_empty());
    }

    #[test]
    fn test_method_round_trip() {
        let m: HttpMethod = serde_json::from_value(json!("POST")).unwrap();
        assert_eq!(m, HttpMethod::Post);
        assert_eq!(serde_json::to_value(m).unwrap(), json!("POST"));
    }
}
