use bytes::Bytes;
use std::fmt;
use thiserror::Error;

/// The error type for stacksign operations
#[derive(Error, Debug)]
#[error("{message}")]
pub struct Error {
    kind: ErrorKind,
    code: Option<u32>,
    message: String,
    #[source]
    source: Option<anyhow::Error>,
    context: Vec<String>,
    body: Option<Bytes>,
}

/// The kind of error that occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Endpoint or credentials are missing or invalid.
    ConfigInvalid,

    /// The cloud rejected our credentials (HTTP 401/403).
    AuthenticationFailed,

    /// The cloud reported a structured failure, including failed async jobs.
    ServiceError,

    /// The response body is not well-formed XML.
    ResponseMalformed,

    /// Network level failure: connection refused, reset, timed out.
    Transport,

    /// The caller abandoned the operation.
    Cancelled,

    /// The operation did not finish within its configured deadline.
    Timeout,

    /// Unexpected errors.
    Unexpected,
}

impl Error {
    /// Create a new error with the given kind and message
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            code: None,
            message: message.into(),
            source: None,
            context: Vec::new(),
            body: None,
        }
    }

    /// Add a source error
    pub fn with_source(mut self, source: impl Into<anyhow::Error>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Attach the numeric code reported by the cloud or the HTTP status.
    pub fn with_code(mut self, code: u32) -> Self {
        self.code = Some(code);
        self
    }

    /// Add a context line such as `command: listZones`.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context.push(context.into());
        self
    }

    /// Keep the raw response body for diagnostics.
    pub fn with_body(mut self, body: Bytes) -> Self {
        self.body = Some(body);
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Get the numeric code.
    ///
    /// Always present for errors built from an HTTP response or a job result.
    pub fn code(&self) -> Option<u32> {
        self.code
    }

    /// Get the human readable message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the context lines attached while the error bubbled up.
    pub fn context(&self) -> &[String] {
        &self.context
    }

    /// Get the raw response body, if the error was built from one.
    pub fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    /// Check if this is an authentication error
    pub fn is_authentication_error(&self) -> bool {
        self.kind == ErrorKind::AuthenticationFailed
    }
}

// Convenience constructors
impl Error {
    /// Create a config invalid error
    pub fn config_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ConfigInvalid, message)
    }

    /// Create an authentication failed error with the HTTP status as code
    pub fn authentication_failed(code: u32, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::AuthenticationFailed, message).with_code(code)
    }

    /// Create a service error carrying the cloud's error code
    pub fn service(code: u32, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ServiceError, message).with_code(code)
    }

    /// Create a response malformed error carrying the HTTP status and raw body
    pub fn response_malformed(status: u32, message: impl Into<String>, body: Bytes) -> Self {
        Self::new(ErrorKind::ResponseMalformed, message)
            .with_code(status)
            .with_body(body)
    }

    /// Create a transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Transport, message)
    }

    /// Create a cancelled error
    pub fn cancelled(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Cancelled, message)
    }

    /// Create a timeout error
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Timeout, message)
    }

    /// Create an unexpected error
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unexpected, message)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::ConfigInvalid => write!(f, "invalid configuration"),
            ErrorKind::AuthenticationFailed => write!(f, "authentication failed"),
            ErrorKind::ServiceError => write!(f, "cloud api error"),
            ErrorKind::ResponseMalformed => write!(f, "malformed response"),
            ErrorKind::Transport => write!(f, "transport error"),
            ErrorKind::Cancelled => write!(f, "cancelled"),
            ErrorKind::Timeout => write!(f, "timed out"),
            ErrorKind::Unexpected => write!(f, "unexpected error"),
        }
    }
}

/// Convenience type alias for Results
pub type Result<T> = std::result::Result<T, Error>;

// Common From implementations
impl From<std::fmt::Error> for Error {
    fn from(err: std::fmt::Error) -> Self {
        Self::unexpected(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<http::Error> for Error {
    fn from(err: http::Error) -> Self {
        Self::unexpected(err.to_string()).with_source(anyhow::Error::from(err))
    }
}
