//! Synchronous bridge: one blocking call, one async request cycle.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

use webtest_domain::request::RequestDescriptor;
use webtest_domain::response::ResponseDescriptor;

use crate::config::{BridgeConfig, ErrorPolicy};
use crate::context::ExecutionContext;
use crate::error::BridgeError;
use crate::ports::{ApplicationError, AsyncApplication, DispatchError, SyncApplication};

/// A panic inside the application, captured as an error.
#[derive(Debug, thiserror::Error)]
#[error("handler panicked: {0}")]
pub struct HandlerPanic(pub String);

/// Drives requests through an [`AsyncApplication`] on an [`ExecutionContext`].
///
/// Each [`handle`](Self::handle) call claims the context, blocks until the
/// application has produced and flushed a complete response, and releases
/// the context before returning, whether the call succeeded, failed or
/// panicked.
pub struct BridgeAdapter<A> {
    app: A,
    context: ExecutionContext,
    config: BridgeConfig,
}

impl<A: AsyncApplication> BridgeAdapter<A> {
    /// Bind `app` to an explicit execution context.
    pub fn new(app: A, context: ExecutionContext, config: BridgeConfig) -> Self {
        Self {
            app,
            context,
            config,
        }
    }

    /// Bind `app` to the execution context it carries.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::MissingExecutionContext`] if the application has
    /// none.
    pub fn from_application(app: A, config: BridgeConfig) -> Result<Self, BridgeError> {
        let context = app
            .execution_context()
            .ok_or(BridgeError::MissingExecutionContext)?;
        Ok(Self::new(app, context, config))
    }

    #[must_use]
    pub fn application(&self) -> &A {
        &self.app
    }

    #[must_use]
    pub fn context(&self) -> &ExecutionContext {
        &self.context
    }

    #[must_use]
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Serve one request synchronously.
    ///
    /// # Errors
    ///
    /// - [`BridgeError::ConcurrentInvocation`] or [`BridgeError::NestedRuntime`]
    ///   if the context cannot be claimed; nothing is dispatched.
    /// - [`BridgeError::Application`] when the application fails and the
    ///   policy is [`ErrorPolicy::Propagate`].
    /// - [`BridgeError::InvalidResponse`] / [`BridgeError::InvalidRequest`]
    ///   for translation failures on either side.
    ///
    /// # Panics
    ///
    /// Re-raises a handler panic on the calling thread when the policy is
    /// [`ErrorPolicy::Propagate`].
    #[tracing::instrument(
        skip(self, request),
        fields(method = %request.method(), path = %request.path())
    )]
    pub fn handle(&self, request: RequestDescriptor) -> Result<ResponseDescriptor, BridgeError> {
        let session = self.context.enter()?;
        let connection = self.config.connection_info();
        let started = Instant::now();

        let outcome = match self.config.error_policy {
            ErrorPolicy::Propagate => session.block_on(self.app.dispatch(request, &connection)),
            ErrorPolicy::InternalServerError => {
                let dispatched = panic::catch_unwind(AssertUnwindSafe(|| {
                    session.block_on(self.app.dispatch(request, &connection))
                }));
                dispatched.unwrap_or_else(|payload| {
                    Err(DispatchError::Application(Box::new(HandlerPanic(
                        panic_message(payload.as_ref()),
                    ))))
                })
            }
        };
        drop(session);

        let response = match outcome {
            Ok(response) => response,
            Err(DispatchError::Application(err)) => self.recover(err)?,
            Err(DispatchError::Contract(message)) => {
                return Err(BridgeError::InvalidResponse(message));
            }
            Err(DispatchError::Request(message)) => {
                return Err(BridgeError::InvalidRequest(message));
            }
        };

        tracing::debug!(
            status = response.status(),
            elapsed = ?started.elapsed(),
            "request bridged"
        );
        Ok(response)
    }

    fn recover(&self, err: ApplicationError) -> Result<ResponseDescriptor, BridgeError> {
        match self.config.error_policy {
            ErrorPolicy::Propagate => Err(BridgeError::Application(err)),
            ErrorPolicy::InternalServerError => {
                tracing::error!(error = %err, "application error answered with 500");
                Ok(internal_server_error()?)
            }
        }
    }
}

impl<A: AsyncApplication> SyncApplication for BridgeAdapter<A> {
    fn call(&self, request: RequestDescriptor) -> Result<ResponseDescriptor, BridgeError> {
        self.handle(request)
    }
}

fn internal_server_error() -> Result<ResponseDescriptor, webtest_domain::error::DomainError> {
    ResponseDescriptor::new(
        500,
        "Internal Server Error",
        vec![(
            b"content-type".to_vec(),
            b"text/plain; charset=utf-8".to_vec(),
        )],
        b"Internal Server Error".to_vec(),
    )
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;
    use std::sync::{Arc, Mutex};
    use std::thread;

    use tokio::sync::Notify;

    use super::*;
    use crate::ports::ConnectionInfo;

    fn get(target: &str) -> RequestDescriptor {
        RequestDescriptor::builder("GET", target).build().unwrap()
    }

    fn ok(body: &[u8]) -> ResponseDescriptor {
        ResponseDescriptor::new(200, "OK", vec![], body.to_vec()).unwrap()
    }

    /// Records what it was given and echoes the body back.
    #[derive(Default)]
    struct EchoApp {
        seen: Mutex<Vec<(RequestDescriptor, ConnectionInfo)>>,
    }

    impl AsyncApplication for EchoApp {
        async fn dispatch(
            &self,
            request: RequestDescriptor,
            connection: &ConnectionInfo,
        ) -> Result<ResponseDescriptor, DispatchError> {
            tokio::task::yield_now().await;
            let body = request.body().to_vec();
            self.seen
                .lock()
                .unwrap()
                .push((request, connection.clone()));
            Ok(ok(&body))
        }
    }

    struct FailingApp;

    impl AsyncApplication for FailingApp {
        async fn dispatch(
            &self,
            _request: RequestDescriptor,
            _connection: &ConnectionInfo,
        ) -> Result<ResponseDescriptor, DispatchError> {
            Err(DispatchError::Application("database unreachable".into()))
        }
    }

    struct PanickingApp;

    impl AsyncApplication for PanickingApp {
        async fn dispatch(
            &self,
            _request: RequestDescriptor,
            _connection: &ConnectionInfo,
        ) -> Result<ResponseDescriptor, DispatchError> {
            panic!("handler exploded")
        }
    }

    struct ContractBreakingApp;

    impl AsyncApplication for ContractBreakingApp {
        async fn dispatch(
            &self,
            _request: RequestDescriptor,
            _connection: &ConnectionInfo,
        ) -> Result<ResponseDescriptor, DispatchError> {
            Err(DispatchError::Contract(
                "handler should return a response, got a string".to_string(),
            ))
        }
    }

    struct SelfContainedApp {
        context: ExecutionContext,
    }

    impl AsyncApplication for SelfContainedApp {
        async fn dispatch(
            &self,
            _request: RequestDescriptor,
            _connection: &ConnectionInfo,
        ) -> Result<ResponseDescriptor, DispatchError> {
            Ok(ok(b"self-contained"))
        }

        fn execution_context(&self) -> Option<ExecutionContext> {
            Some(self.context.clone())
        }
    }

    /// Signals when a request starts and holds it until released.
    struct GateApp {
        started: mpsc::Sender<()>,
        release: Arc<Notify>,
    }

    impl AsyncApplication for GateApp {
        async fn dispatch(
            &self,
            _request: RequestDescriptor,
            _connection: &ConnectionInfo,
        ) -> Result<ResponseDescriptor, DispatchError> {
            let _ = self.started.send(());
            self.release.notified().await;
            Ok(ok(b"released"))
        }
    }

    fn adapter<A: AsyncApplication>(app: A, policy: ErrorPolicy) -> BridgeAdapter<A> {
        BridgeAdapter::new(
            app,
            ExecutionContext::current_thread().unwrap(),
            BridgeConfig {
                error_policy: policy,
                ..BridgeConfig::default()
            },
        )
    }

    #[test]
    fn should_deliver_request_unchanged_to_application() {
        let bridge = adapter(EchoApp::default(), ErrorPolicy::Propagate);
        let request = RequestDescriptor::builder("POST", "/echo?x=1")
            .header("X-Foo", "Bar")
            .header("x-foo", "Baz")
            .body(b"\x00raw\xffbytes".to_vec())
            .build()
            .unwrap();

        let response = bridge.handle(request.clone()).unwrap();

        assert_eq!(response.status(), 200);
        assert_eq!(response.body(), b"\x00raw\xffbytes");
        let seen = bridge.application().seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, request);
        assert_eq!(seen[0].1, BridgeConfig::default().connection_info());
    }

    #[test]
    fn should_serve_sequential_requests_on_same_context() {
        let bridge = adapter(EchoApp::default(), ErrorPolicy::Propagate);
        for _ in 0..3 {
            bridge.handle(get("/")).unwrap();
        }
        assert_eq!(bridge.application().seen.lock().unwrap().len(), 3);
        assert!(!bridge.context().is_busy());
    }

    #[test]
    fn should_propagate_application_error() {
        let bridge = adapter(FailingApp, ErrorPolicy::Propagate);
        match bridge.handle(get("/")) {
            Err(BridgeError::Application(err)) => {
                assert_eq!(err.to_string(), "database unreachable");
            }
            other => panic!("expected application error, got {other:?}"),
        }
        assert!(!bridge.context().is_busy());
    }

    #[test]
    fn should_answer_500_when_policy_converts_errors() {
        let bridge = adapter(FailingApp, ErrorPolicy::InternalServerError);
        let response = bridge.handle(get("/")).unwrap();
        assert_eq!(response.status(), 500);
        assert_eq!(response.reason(), "Internal Server Error");
        assert_eq!(response.content_type().as_deref(), Some("text/plain"));
    }

    #[test]
    fn should_reraise_handler_panic_when_propagating() {
        let bridge = adapter(PanickingApp, ErrorPolicy::Propagate);
        let result = panic::catch_unwind(AssertUnwindSafe(|| bridge.handle(get("/"))));
        let payload = result.unwrap_err();
        assert_eq!(panic_message(payload.as_ref()), "handler exploded");
        assert!(!bridge.context().is_busy());
    }

    #[test]
    fn should_answer_500_for_handler_panic_when_policy_converts_errors() {
        let bridge = adapter(PanickingApp, ErrorPolicy::InternalServerError);
        let response = bridge.handle(get("/")).unwrap();
        assert_eq!(response.status(), 500);
        assert!(!bridge.context().is_busy());
    }

    #[test]
    fn should_surface_contract_violation_regardless_of_policy() {
        let bridge = adapter(ContractBreakingApp, ErrorPolicy::InternalServerError);
        match bridge.handle(get("/")) {
            Err(BridgeError::InvalidResponse(message)) => {
                assert!(message.contains("should return a response"));
            }
            other => panic!("expected contract violation, got {other:?}"),
        }
    }

    #[test]
    fn should_use_context_carried_by_application() {
        let context = ExecutionContext::current_thread().unwrap();
        let bridge = BridgeAdapter::from_application(
            SelfContainedApp {
                context: context.clone(),
            },
            BridgeConfig::default(),
        )
        .unwrap();
        assert!(bridge.context().same_as(&context));
        assert_eq!(bridge.handle(get("/")).unwrap().body(), b"self-contained");
    }

    #[test]
    fn should_fail_without_any_execution_context() {
        let result = BridgeAdapter::from_application(FailingApp, BridgeConfig::default());
        assert!(matches!(result, Err(BridgeError::MissingExecutionContext)));
    }

    #[test]
    fn should_reject_concurrent_invocation_instead_of_blocking() {
        let (started_tx, started_rx) = mpsc::channel();
        let release = Arc::new(Notify::new());
        let bridge = Arc::new(adapter(
            GateApp {
                started: started_tx,
                release: Arc::clone(&release),
            },
            ErrorPolicy::Propagate,
        ));

        let worker = {
            let bridge = Arc::clone(&bridge);
            thread::spawn(move || bridge.handle(get("/slow")))
        };
        started_rx.recv().unwrap();

        assert!(matches!(
            bridge.handle(get("/fast")),
            Err(BridgeError::ConcurrentInvocation)
        ));

        release.notify_one();
        let response = worker.join().unwrap().unwrap();
        assert_eq!(response.body(), b"released");
        assert!(!bridge.context().is_busy());
    }
}
