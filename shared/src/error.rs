//! Error types for the smart home Lambda.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while handling a directive.
#[derive(Error, Debug)]
pub enum Error {
    /// AWS SDK error
    #[error("AWS error: {0}")]
    Aws(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Inbound directive is missing a field the selected branch needs
    #[error("Malformed directive: missing {0}")]
    MalformedDirective(String),

    /// Response kind carries no endpoint section
    #[error("Response {0} has no endpoint section")]
    MissingEndpoint(String),

    /// Discovery payload has no endpoint with the given id
    #[error("Endpoint not found: {0}")]
    EndpointNotFound(String),

    /// Payload cannot hold discovery endpoints
    #[error("Cannot add discovery endpoints to {0} payload")]
    IncompatiblePayload(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = Error::MalformedDirective("directive.header.correlationToken".to_string());
        assert_eq!(
            err.to_string(),
            "Malformed directive: missing directive.header.correlationToken"
        );
        assert_eq!(
            Error::EndpointNotFound("endpoint-002".to_string()).to_string(),
            "Endpoint not found: endpoint-002"
        );
    }
}
