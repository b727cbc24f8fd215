//! Response wrapper returned by the test client.

use serde::de::DeserializeOwned;

use webtest_domain::response::ResponseDescriptor;

use crate::error::BridgeError;

/// A complete response, with helpers for assertions.
#[derive(Debug, Clone)]
pub struct TestResponse {
    inner: ResponseDescriptor,
}

impl TestResponse {
    #[must_use]
    pub fn new(inner: ResponseDescriptor) -> Self {
        Self { inner }
    }

    #[must_use]
    pub fn status_code(&self) -> u16 {
        self.inner.status()
    }

    /// Status line such as `200 OK`.
    #[must_use]
    pub fn status(&self) -> String {
        self.inner.status_line()
    }

    #[must_use]
    pub fn reason(&self) -> &str {
        self.inner.reason()
    }

    /// Header pairs in wire order, decoded as ISO-8859-1.
    #[must_use]
    pub fn headers(&self) -> Vec<(String, String)> {
        self.inner.headers_latin1()
    }

    #[must_use]
    pub fn header(&self, name: &str) -> Option<String> {
        self.inner.header(name)
    }

    #[must_use]
    pub fn content_type(&self) -> Option<String> {
        self.inner.content_type()
    }

    #[must_use]
    pub fn charset(&self) -> Option<String> {
        self.inner.charset()
    }

    #[must_use]
    pub fn body(&self) -> &[u8] {
        self.inner.body()
    }

    /// Body decoded with the declared charset (UTF-8 by default).
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Domain`] if the body cannot be decoded.
    pub fn text(&self) -> Result<String, BridgeError> {
        Ok(self.inner.text()?)
    }

    /// Body parsed as JSON into `T`.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Domain`] if the body is not valid JSON for `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, BridgeError> {
        Ok(self.inner.json()?)
    }

    /// Body parsed as an untyped JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Domain`] if the body is not valid JSON.
    pub fn json_value(&self) -> Result<serde_json::Value, BridgeError> {
        self.json()
    }

    #[must_use]
    pub fn descriptor(&self) -> &ResponseDescriptor {
        &self.inner
    }

    #[must_use]
    pub fn into_descriptor(self) -> ResponseDescriptor {
        self.inner
    }
}

impl From<ResponseDescriptor> for TestResponse {
    fn from(inner: ResponseDescriptor) -> Self {
        Self::new(inner)
    }
}
