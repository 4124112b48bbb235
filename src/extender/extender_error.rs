//! Extender error types.

use std::time::Duration;

use thiserror::Error;

/// Failures of a single extender round trip.
///
/// [`ExtenderError::Rejected`] carries an error message the remote party
/// returned on purpose and [`ExtenderError::Client`] happens before any call
/// is made. Every other variant is a transport failure.
#[derive(Debug, Error)]
pub enum ExtenderError {
    #[error("failed to build extender HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("invalid extender URL {url:?}: {source}")]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },

    #[error("failed to encode {verb} request: {source}")]
    Encode {
        verb: String,
        source: serde_json::Error,
    },

    #[error("failed {verb} with extender at URL {url}: {source}")]
    Transport {
        verb: String,
        url: String,
        source: reqwest::Error,
    },

    #[error("{verb} with extender at URL {url} timed out after {timeout:?}")]
    Timeout {
        verb: String,
        url: String,
        timeout: Duration,
    },

    #[error("failed {verb} with extender at URL {url}, code {status}")]
    Status {
        verb: String,
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("{verb} response from extender exceeds {limit} bytes")]
    BodyTooLarge { verb: String, limit: usize },

    #[error("failed to decode {verb} response: {source}")]
    Decode {
        verb: String,
        source: serde_json::Error,
    },

    #[error("{0}")]
    Rejected(String),
}

impl ExtenderError {
    pub fn is_transport(&self) -> bool {
        !matches!(self, Self::Rejected(_) | Self::Client(_))
    }
}

pub type ExtenderResult<T> = Result<T, ExtenderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_setup_failure_is_not_a_transport_failure() {
        let source = reqwest::Client::new()
            .post("not a url")
            .build()
            .unwrap_err();
        let error = ExtenderError::Client(source);

        assert!(!error.is_transport());
        assert!(error.to_string().starts_with("failed to build extender HTTP client"));
    }

    #[test]
    fn rejection_is_an_application_error() {
        let error = ExtenderError::Rejected("quota exceeded".to_string());

        assert!(!error.is_transport());
        assert_eq!(error.to_string(), "quota exceeded");
    }
}
