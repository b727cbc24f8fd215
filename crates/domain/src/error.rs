//! Domain error types.
//!
//! Every variant carries the offending value so a failing test prints
//! something actionable.

/// Errors raised while building or decoding descriptors.
#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    /// The request path does not start with `/`.
    #[error("request path must start with '/', got {0:?}")]
    InvalidPath(String),

    /// The HTTP method is empty or contains non-token characters.
    #[error("invalid HTTP method {0:?}")]
    InvalidMethod(String),

    /// A header name is empty or contains characters outside the token set.
    #[error("invalid header name {0:?}")]
    InvalidHeaderName(String),

    /// The status code is outside `100..=999`.
    #[error("invalid status code {0}: expected a value in 100..=999")]
    InvalidStatus(u16),

    /// The response declares a charset the bridge cannot decode.
    #[error("unsupported charset {0:?}")]
    UnsupportedCharset(String),

    /// The body is not valid for the declared charset.
    #[error("response body is not valid {charset}")]
    Decode {
        charset: &'static str,
        #[source]
        source: std::string::FromUtf8Error,
    },

    /// JSON (de)serialisation failure.
    #[error("invalid JSON body")]
    Json(#[from] serde_json::Error),
}
