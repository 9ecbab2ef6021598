//! Error types for external interview service calls.

/// Failure of a single external service call.
///
/// Every call the orchestrator issues can fail independently; the variants
/// distinguish where in the round trip the failure happened so the transcript
/// can explain the degradation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    /// The request never produced a response (connection refused, reset, timeout).
    #[error("network error: {0}")]
    Transport(String),

    /// The service answered with a non-success HTTP status.
    #[error("service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body was not valid JSON for the expected schema.
    #[error("could not decode response: {0}")]
    Decode(String),

    /// The response decoded but violated the contract (e.g. `passed > total`).
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Result alias for service calls.
pub type ServiceResult<T> = std::result::Result<T, ServiceError>;
