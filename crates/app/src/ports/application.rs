//! Async application port: one request in, one buffered response out.

use std::future::Future;
use std::net::SocketAddr;
use std::str::FromStr;

use serde::Deserialize;

use webtest_domain::request::RequestDescriptor;
use webtest_domain::response::ResponseDescriptor;

use crate::context::ExecutionContext;

/// Boxed error raised by the wrapped application.
pub type ApplicationError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// HTTP version presented to the application.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum HttpVersion {
    #[serde(rename = "1.0")]
    Http10,
    #[default]
    #[serde(rename = "1.1")]
    Http11,
}

impl FromStr for HttpVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().trim_start_matches("HTTP/") {
            "1.0" => Ok(Self::Http10),
            "1.1" => Ok(Self::Http11),
            other => Err(format!("unsupported HTTP version {other:?}")),
        }
    }
}

/// Connection-level facts the application may observe.
///
/// There is no real socket; these values are what the in-process exchange
/// reports to the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionInfo {
    pub http_version: HttpVersion,
    /// `Host` header sent when the request has none.
    pub host: String,
    /// Peer address exposed to the application.
    pub remote_addr: SocketAddr,
}

/// Why a dispatch produced no response.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// The application itself failed.
    #[error(transparent)]
    Application(ApplicationError),

    /// The application answered with something that is not a valid response.
    #[error("{0}")]
    Contract(String),

    /// The request could not be translated for the application.
    #[error("{0}")]
    Request(String),
}

/// An asynchronous web application that can serve one request at a time.
///
/// Routing, middleware and handler dispatch are entirely the
/// implementation's concern.
pub trait AsyncApplication: Send + Sync {
    /// Run one full request cycle and return the buffered response.
    ///
    /// The returned future must only resolve after the response body has been
    /// read to the end and any per-request resources are closed.
    fn dispatch(
        &self,
        request: RequestDescriptor,
        connection: &ConnectionInfo,
    ) -> impl Future<Output = Result<ResponseDescriptor, DispatchError>> + Send;

    /// The execution context this application is bound to, if any.
    fn execution_context(&self) -> Option<ExecutionContext> {
        None
    }
}

impl<T: AsyncApplication> AsyncApplication for std::sync::Arc<T> {
    fn dispatch(
        &self,
        request: RequestDescriptor,
        connection: &ConnectionInfo,
    ) -> impl Future<Output = Result<ResponseDescriptor, DispatchError>> + Send {
        (**self).dispatch(request, connection)
    }

    fn execution_context(&self) -> Option<ExecutionContext> {
        (**self).execution_context()
    }
}
