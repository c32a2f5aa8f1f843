use driftgate_core_types::{EndpointKey, RunId};

/// Result type alias using DgError
pub type Result<T> = std::result::Result<T, DgError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// This taxonomy provides a stable, structured classification of all errors
/// in the drift pipeline. Each kind maps to a stable error code that can be
/// used for programmatic error handling, testing, and external API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DgErrorKind {
    // Run classification
    /// Network/HTTP failure before a status code was obtained
    Transport,
    /// Non-2xx HTTP status response
    HttpStatus,
    /// Configured expected-schema reference is unreadable
    SchemaMissing,
    /// One endpoint's failure, contained at the endpoint boundary
    PartialRun,

    // Approval / callback
    /// Bad PIN or malformed interactive payload
    Validation,

    // Structural
    InvalidInput,
    NotFound,
    AlreadyExists,

    // Integration/IO
    Io,
    Serialization,
    Persistence,
    ExternalService,
    Timeout,
    Concurrency,

    // Internal
    Internal,
}

impl DgErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            DgErrorKind::Transport => "ERR_TRANSPORT",
            DgErrorKind::HttpStatus => "ERR_HTTP_STATUS",
            DgErrorKind::SchemaMissing => "ERR_SCHEMA_MISSING",
            DgErrorKind::PartialRun => "ERR_PARTIAL_RUN",
            DgErrorKind::Validation => "ERR_VALIDATION",
            DgErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            DgErrorKind::NotFound => "ERR_NOT_FOUND",
            DgErrorKind::AlreadyExists => "ERR_ALREADY_EXISTS",
            DgErrorKind::Io => "ERR_IO",
            DgErrorKind::Serialization => "ERR_SERIALIZATION",
            DgErrorKind::Persistence => "ERR_PERSISTENCE",
            DgErrorKind::ExternalService => "ERR_EXTERNAL_SERVICE",
            DgErrorKind::Timeout => "ERR_TIMEOUT",
            DgErrorKind::Concurrency => "ERR_CONCURRENCY",
            DgErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// Provides a structured representation of errors with classification fields
/// for programmatic handling and rich context for debugging.
#[derive(Debug, Clone)]
pub struct DgError {
    kind: DgErrorKind,
    op: Option<String>,
    endpoint: Option<String>,
    endpoint_key: Option<EndpointKey>,
    status: Option<u16>,
    run_id: Option<RunId>,
    message: String,
    source: Option<Box<DgError>>,
}

impl DgError {
    /// Create a new error with the specified kind
    pub fn new(kind: DgErrorKind) -> Self {
        Self {
            kind,
            op: None,
            endpoint: None,
            endpoint_key: None,
            status: None,
            run_id: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add endpoint name context
    pub fn with_endpoint(mut self, name: impl Into<String>) -> Self {
        self.endpoint = Some(name.into());
        self
    }

    /// Add endpoint key context
    pub fn with_endpoint_key(mut self, key: EndpointKey) -> Self {
        self.endpoint_key = Some(key);
        self
    }

    /// Add HTTP status context
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Add run ID context
    pub fn with_run_id(mut self, run_id: RunId) -> Self {
        self.run_id = Some(run_id);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: DgError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> DgErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Get the operation context, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the endpoint name context, if any
    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }

    /// Get the endpoint key context, if any
    pub fn endpoint_key(&self) -> Option<&EndpointKey> {
        self.endpoint_key.as_ref()
    }

    /// Get the HTTP status context, if any
    pub fn status(&self) -> Option<u16> {
        self.status
    }

    /// Get the run ID context, if any
    pub fn run_id(&self) -> Option<&RunId> {
        self.run_id.as_ref()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the source error, if any
    pub fn source_error(&self) -> Option<&DgError> {
        self.source.as_deref()
    }
}

impl std::fmt::Display for DgError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(endpoint) = &self.endpoint {
            write!(f, " (endpoint: {})", endpoint)?;
        }
        if let Some(key) = &self.endpoint_key {
            write!(f, " (endpoint_key: {})", key)?;
        }
        if let Some(status) = self.status {
            write!(f, " (status: {})", status)?;
        }
        Ok(())
    }
}

impl std::error::Error for DgError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|s| s as &(dyn std::error::Error + 'static))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_are_stable() {
        assert_eq!(DgErrorKind::Transport.code(), "ERR_TRANSPORT");
        assert_eq!(DgErrorKind::Validation.code(), "ERR_VALIDATION");
        assert_eq!(DgErrorKind::SchemaMissing.code(), "ERR_SCHEMA_MISSING");
    }

    #[test]
    fn test_builder_context() {
        let err = DgError::new(DgErrorKind::HttpStatus)
            .with_op("execute_endpoint")
            .with_endpoint("Get Balance")
            .with_status(503)
            .with_message("service unavailable");
        assert_eq!(err.kind(), DgErrorKind::HttpStatus);
        assert_eq!(err.op(), Some("execute_endpoint"));
        assert_eq!(err.endpoint(), Some("Get Balance"));
        assert_eq!(err.status(), Some(503));
    }

    #[test]
    fn test_display_includes_code_and_context() {
        let err = DgError::new(DgErrorKind::Transport)
            .with_op("probe_version")
            .with_message("connection refused");
        let rendered = err.to_string();
        assert!(rendered.contains("ERR_TRANSPORT"));
        assert!(rendered.contains("probe_version"));
        assert!(rendered.contains("connection refused"));
    }

    #[test]
    fn test_source_chain() {
        let inner = DgError::new(DgErrorKind::Io).with_message("disk full");
        let outer = DgError::new(DgErrorKind::Persistence).with_source(inner);
        assert_eq!(outer.source_error().unwrap().kind(), DgErrorKind::Io);
    }
}
