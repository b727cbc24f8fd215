//! `AsyncApplication` implementation for axum routers and tower services.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response};
use tower::Service;
use tower_http::trace::TraceLayer;

use webtest_app::context::ExecutionContext;
use webtest_app::ports::{
    ApplicationError, AsyncApplication, ConnectionInfo, DispatchError,
};
use webtest_domain::request::RequestDescriptor;
use webtest_domain::response::ResponseDescriptor;

use crate::transport::{self, Transport};
use crate::translate;

/// An axum [`Router`] (or any clonable tower service answering
/// `Response<Body>`) exposed through the [`AsyncApplication`] port.
///
/// The service is cloned for every request, the way axum's own server
/// clones it per connection.
#[derive(Clone)]
pub struct AxumApp<S = Router> {
    service: S,
    transport: Transport,
    context: Option<ExecutionContext>,
}

impl AxumApp<Router> {
    /// Wrap a router.
    #[must_use]
    pub fn new(router: Router) -> Self {
        Self::from_service(router)
    }

    /// Log every request at `DEBUG` with [`TraceLayer`].
    #[must_use]
    pub fn traced(mut self) -> Self {
        self.service = self.service.layer(TraceLayer::new_for_http());
        self
    }
}

impl<S> AxumApp<S> {
    /// Wrap any tower service.
    #[must_use]
    pub fn from_service(service: S) -> Self {
        Self {
            service,
            transport: Transport::default(),
            context: None,
        }
    }

    #[must_use]
    pub fn with_transport(mut self, transport: Transport) -> Self {
        self.transport = transport;
        self
    }

    /// Bind the application to an execution context so it can be wrapped
    /// without passing one separately.
    #[must_use]
    pub fn with_context(mut self, context: ExecutionContext) -> Self {
        self.context = Some(context);
        self
    }

    #[must_use]
    pub fn transport(&self) -> Transport {
        self.transport
    }
}

impl<S> AsyncApplication for AxumApp<S>
where
    S: Service<Request<Body>, Response = Response<Body>> + Clone + Send + Sync + 'static,
    S::Future: Send,
    S::Error: Into<ApplicationError>,
{
    async fn dispatch(
        &self,
        request: RequestDescriptor,
        connection: &ConnectionInfo,
    ) -> Result<ResponseDescriptor, DispatchError> {
        let http_request = translate::to_http_request(request, connection)?;
        let service = self.service.clone();
        let (parts, body) = match self.transport {
            Transport::Direct => transport::direct(service, http_request).await?,
            Transport::Duplex => {
                transport::duplex(service, http_request, connection.remote_addr).await?
            }
        };
        Ok(translate::to_descriptor(&parts, &body)?)
    }

    fn execution_context(&self) -> Option<ExecutionContext> {
        self.context.clone()
    }
}
