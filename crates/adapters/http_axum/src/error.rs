//! Transport error mapping.

use webtest_app::ports::{ApplicationError, DispatchError};
use webtest_domain::error::DomainError;

/// Failures while carrying one request to the service and back.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The descriptor cannot be expressed as an `http::Request`.
    #[error("invalid request: {0}")]
    Request(#[from] axum::http::Error),

    /// The service returned an error instead of a response.
    #[error("service failed: {0}")]
    Service(#[source] ApplicationError),

    /// The response body failed while being read.
    #[error("response body failed: {0}")]
    Body(#[source] ApplicationError),

    /// The HTTP/1.1 exchange over the in-memory pipe broke down.
    #[error("in-memory HTTP exchange failed: {0}")]
    Connection(#[from] hyper::Error),

    /// The server side could not put the response on the wire.
    #[error("response cannot be framed as HTTP/1.1: {0}")]
    Framing(#[source] hyper::Error),

    /// The declared `Content-Length` disagrees with the body.
    #[error("content-length {declared:?} does not match the {actual}-byte body")]
    ContentLength { declared: String, actual: usize },

    /// The response cannot be represented as a descriptor.
    #[error("invalid response: {0}")]
    Response(#[source] DomainError),
}

impl From<TransportError> for DispatchError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Request(_) => Self::Request(err.to_string()),
            TransportError::Service(source) | TransportError::Body(source) => {
                Self::Application(source)
            }
            TransportError::Connection(_) => Self::Application(Box::new(err)),
            TransportError::Framing(_)
            | TransportError::ContentLength { .. }
            | TransportError::Response(_) => Self::Contract(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_keep_service_error_as_application_error() {
        let err = TransportError::Service("boom".into());
        match DispatchError::from(err) {
            DispatchError::Application(source) => assert_eq!(source.to_string(), "boom"),
            other => panic!("expected application error, got {other:?}"),
        }
    }

    #[test]
    fn should_map_bad_response_to_contract_violation() {
        let err = TransportError::Response(DomainError::InvalidStatus(42));
        assert!(matches!(
            DispatchError::from(err),
            DispatchError::Contract(message) if message.contains("42")
        ));
    }

    #[test]
    fn should_map_length_mismatch_to_contract_violation() {
        let err = TransportError::ContentLength {
            declared: "10".to_string(),
            actual: 5,
        };
        match DispatchError::from(err) {
            DispatchError::Contract(message) => {
                assert_eq!(message, r#"content-length "10" does not match the 5-byte body"#);
            }
            other => panic!("expected contract violation, got {other:?}"),
        }
    }
}
