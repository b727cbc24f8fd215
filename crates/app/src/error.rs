//! Bridge error taxonomy.

use webtest_domain::error::DomainError;

use crate::ports::ApplicationError;

/// Everything that can go wrong between a blocking call and its response.
///
/// Variants fall into four groups: configuration
/// ([`MissingExecutionContext`](Self::MissingExecutionContext),
/// [`Runtime`](Self::Runtime)), concurrency misuse
/// ([`ConcurrentInvocation`](Self::ConcurrentInvocation),
/// [`NestedRuntime`](Self::NestedRuntime)), application faults
/// ([`Application`](Self::Application)) and contract violations
/// ([`InvalidResponse`](Self::InvalidResponse)). The rest are raised by the
/// test client itself.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// Neither the caller nor the application supplied an execution context.
    #[error("no execution context: pass one explicitly or wrap an application that carries one")]
    MissingExecutionContext,

    /// The async runtime could not be started.
    #[error("failed to start the execution context")]
    Runtime(#[source] std::io::Error),

    /// Another request is still in flight on the same execution context.
    #[error("client cannot start while another request is running on the same execution context")]
    ConcurrentInvocation,

    /// The caller is itself running inside an async runtime.
    #[error("client cannot start from inside a running async runtime; call it from a plain thread")]
    NestedRuntime,

    /// The application failed without producing a response.
    #[error("unhandled application error: {0}")]
    Application(#[source] ApplicationError),

    /// The application produced something that is not a valid response.
    #[error("application returned an invalid response: {0}")]
    InvalidResponse(String),

    /// The request could not be expressed in the application's representation.
    #[error("request cannot be sent to the application: {0}")]
    InvalidRequest(String),

    /// The response status did not match what the caller expected.
    #[error("bad response: {status_line} (expected {expected})\n{body}")]
    UnexpectedStatus {
        status: u16,
        status_line: String,
        expected: String,
        body: String,
    },

    /// Descriptor construction or decoding failure.
    #[error(transparent)]
    Domain(#[from] DomainError),
}
