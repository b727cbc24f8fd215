//! `TestApp`: blocking test client in the WebTest style.

use std::sync::Arc;

use serde::Serialize;

use webtest_domain::error::DomainError;
use webtest_domain::headers::Headers;
use webtest_domain::query::QueryParams;
use webtest_domain::request::{RequestBuilder, RequestDescriptor};

use crate::bridge::BridgeAdapter;
use crate::config::BridgeConfig;
use crate::context::ExecutionContext;
use crate::error::BridgeError;
use crate::ports::{AsyncApplication, SyncApplication};
use crate::response::TestResponse;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
const JSON_CONTENT_TYPE: &str = "application/json";

/// Synchronous test client over either a synchronous or an async application.
///
/// Cloning is cheap; clones share the wrapped application and, for async
/// applications, its execution context.
#[derive(Clone)]
pub struct TestApp {
    app: Arc<dyn SyncApplication>,
    default_headers: Headers,
    bridged: bool,
}

impl TestApp {
    /// Wrap an application that already speaks the blocking convention.
    pub fn new(app: impl SyncApplication + 'static) -> Self {
        Self {
            app: Arc::new(app),
            default_headers: Headers::new(),
            bridged: false,
        }
    }

    /// Wrap an async application behind a [`BridgeAdapter`].
    ///
    /// `context` wins over the one the application carries.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::MissingExecutionContext`] when neither source
    /// provides an execution context. No request is attempted.
    pub fn from_async<A>(
        app: A,
        context: Option<ExecutionContext>,
        config: BridgeConfig,
    ) -> Result<Self, BridgeError>
    where
        A: AsyncApplication + 'static,
    {
        let context = context
            .or_else(|| app.execution_context())
            .ok_or(BridgeError::MissingExecutionContext)?;
        tracing::debug!(?context, "bridging async application");
        Ok(Self {
            app: Arc::new(BridgeAdapter::new(app, context, config)),
            default_headers: Headers::new(),
            bridged: true,
        })
    }

    /// Whether requests go through the async bridge.
    #[must_use]
    pub fn is_bridged(&self) -> bool {
        self.bridged
    }

    /// Send `name: value` on every request that does not set `name` itself.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Domain`] if `name` is not a valid header name.
    pub fn with_default_header(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<Self, BridgeError> {
        self.default_headers.append(name, value)?;
        Ok(self)
    }

    /// Start a request with an arbitrary method.
    #[must_use]
    pub fn request(&self, method: &str, target: &str) -> TestRequest<'_> {
        TestRequest {
            client: self,
            builder: RequestDescriptor::builder(method, target),
            expect: Expect::Success,
            error: None,
        }
    }

    #[must_use]
    pub fn get(&self, target: &str) -> TestRequest<'_> {
        self.request("GET", target)
    }

    #[must_use]
    pub fn post(&self, target: &str) -> TestRequest<'_> {
        self.request("POST", target)
    }

    #[must_use]
    pub fn put(&self, target: &str) -> TestRequest<'_> {
        self.request("PUT", target)
    }

    #[must_use]
    pub fn patch(&self, target: &str) -> TestRequest<'_> {
        self.request("PATCH", target)
    }

    #[must_use]
    pub fn delete(&self, target: &str) -> TestRequest<'_> {
        self.request("DELETE", target)
    }

    #[must_use]
    pub fn head(&self, target: &str) -> TestRequest<'_> {
        self.request("HEAD", target)
    }

    #[must_use]
    pub fn options(&self, target: &str) -> TestRequest<'_> {
        self.request("OPTIONS", target)
    }

    /// `POST` a form-encoded body.
    ///
    /// # Errors
    ///
    /// See [`TestRequest::send`].
    pub fn post_form<I, K, V>(&self, target: &str, params: I) -> Result<TestResponse, BridgeError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.post(target).form(params).send()
    }

    /// `POST` a JSON body.
    ///
    /// # Errors
    ///
    /// See [`TestRequest::send`].
    pub fn post_json<T>(&self, target: &str, value: &T) -> Result<TestResponse, BridgeError>
    where
        T: Serialize + ?Sized,
    {
        self.post(target).json(value).send()
    }

    /// `PUT` a JSON body.
    ///
    /// # Errors
    ///
    /// See [`TestRequest::send`].
    pub fn put_json<T>(&self, target: &str, value: &T) -> Result<TestResponse, BridgeError>
    where
        T: Serialize + ?Sized,
    {
        self.put(target).json(value).send()
    }

    /// `PATCH` a JSON body.
    ///
    /// # Errors
    ///
    /// See [`TestRequest::send`].
    pub fn patch_json<T>(&self, target: &str, value: &T) -> Result<TestResponse, BridgeError>
    where
        T: Serialize + ?Sized,
    {
        self.patch(target).json(value).send()
    }

    /// `DELETE` with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`TestRequest::send`].
    pub fn delete_json<T>(&self, target: &str, value: &T) -> Result<TestResponse, BridgeError>
    where
        T: Serialize + ?Sized,
    {
        self.delete(target).json(value).send()
    }

    /// Send a prepared descriptor as-is: no default headers, no status check.
    ///
    /// # Errors
    ///
    /// Whatever the wrapped application returns.
    pub fn call(&self, request: RequestDescriptor) -> Result<TestResponse, BridgeError> {
        self.app.call(request).map(TestResponse::new)
    }
}

/// Which statuses a request accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Expect {
    /// `2xx` and `3xx`.
    Success,
    Any,
    Status(Vec<u16>),
}

impl Expect {
    fn check(&self, response: &TestResponse) -> Result<(), BridgeError> {
        let status = response.status_code();
        let (accepted, expected) = match self {
            Self::Success => ((200..400).contains(&status), "2xx or 3xx".to_string()),
            Self::Any => (true, String::new()),
            Self::Status(codes) => (
                codes.contains(&status),
                codes
                    .iter()
                    .map(u16::to_string)
                    .collect::<Vec<_>>()
                    .join(" or "),
            ),
        };
        if accepted {
            return Ok(());
        }
        Err(BridgeError::UnexpectedStatus {
            status,
            status_line: response.status(),
            expected,
            body: String::from_utf8_lossy(response.body()).into_owned(),
        })
    }
}

/// A request being assembled by [`TestApp`].
#[must_use = "requests do nothing until `send` is called"]
pub struct TestRequest<'a> {
    client: &'a TestApp,
    builder: RequestBuilder,
    expect: Expect,
    error: Option<BridgeError>,
}

impl TestRequest<'_> {
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.builder = self.builder.header(name, value);
        self
    }

    pub fn headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (name, value) in headers {
            self.builder = self.builder.header(name, value);
        }
        self
    }

    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.builder = self.builder.query(name, value);
        self
    }

    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.builder = self.builder.set_header("Content-Type", content_type);
        self
    }

    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.builder = self.builder.body(body);
        self
    }

    /// Form-encode `params` as the body.
    pub fn form<I, K, V>(self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let params: QueryParams = params.into_iter().collect();
        self.content_type(FORM_CONTENT_TYPE)
            .body(params.encode().into_bytes())
    }

    /// Serialise `value` as the JSON body.
    pub fn json<T: Serialize + ?Sized>(mut self, value: &T) -> Self {
        match serde_json::to_vec(value) {
            Ok(body) => self.content_type(JSON_CONTENT_TYPE).body(body),
            Err(err) => {
                self.error
                    .get_or_insert(BridgeError::Domain(DomainError::Json(err)));
                self
            }
        }
    }

    /// Accept `status`; may be called several times.
    pub fn expect_status(mut self, status: u16) -> Self {
        match &mut self.expect {
            Expect::Status(codes) => codes.push(status),
            other => *other = Expect::Status(vec![status]),
        }
        self
    }

    /// Accept any status, including `4xx` and `5xx`.
    pub fn expect_errors(mut self) -> Self {
        self.expect = Expect::Any;
        self
    }

    /// Send the request and wait for the complete response.
    ///
    /// # Errors
    ///
    /// - [`BridgeError::Domain`] if the request could not be built
    /// - any error from the wrapped application or bridge
    /// - [`BridgeError::UnexpectedStatus`] if the status is not accepted
    pub fn send(self) -> Result<TestResponse, BridgeError> {
        if let Some(err) = self.error {
            return Err(err);
        }

        let mut builder = self.builder;
        let defaults: Vec<(&str, &str)> = self
            .client
            .default_headers
            .iter()
            .filter(|(name, _)| !builder.has_header(name))
            .collect();
        for (name, value) in defaults {
            builder = builder.header(name, value);
        }

        let request = builder.build()?;
        let response = self.client.call(request)?;
        self.expect.check(&response)?;
        Ok(response)
    }
}
