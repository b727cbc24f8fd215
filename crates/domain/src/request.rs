//! Inbound request descriptor.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::headers::Headers;
use crate::query::QueryParams;

/// One request as expressed by the synchronous caller.
///
/// Immutable once built; use [`RequestDescriptor::builder`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestDescriptor {
    method: String,
    path: String,
    /// Query string exactly as it will be sent, without the `?`.
    query_string: String,
    query: QueryParams,
    headers: Headers,
    body: Vec<u8>,
}

impl RequestDescriptor {
    /// Start building a request for `method` and `target`.
    ///
    /// `target` may carry a query string (`/search?q=x`). It is sent
    /// verbatim, followed by any pairs added with [`RequestBuilder::query`].
    #[must_use]
    pub fn builder(method: impl Into<String>, target: impl Into<String>) -> RequestBuilder {
        RequestBuilder::new(method.into(), target.into())
    }

    /// Upper-cased method name.
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Path without the query string.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Decoded query parameters.
    #[must_use]
    pub fn query(&self) -> &QueryParams {
        &self.query
    }

    /// Raw query string, without the leading `?`.
    #[must_use]
    pub fn query_string(&self) -> &str {
        &self.query_string
    }

    #[must_use]
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Path followed by `?query` when there is a query string.
    #[must_use]
    pub fn path_qs(&self) -> String {
        if self.query_string.is_empty() {
            self.path.clone()
        } else {
            format!("{}?{}", self.path, self.query_string)
        }
    }

    /// Split into owned parts.
    #[must_use]
    pub fn into_parts(self) -> (String, String, QueryParams, Headers, Vec<u8>) {
        (self.method, self.path, self.query, self.headers, self.body)
    }
}

/// Step-by-step builder for [`RequestDescriptor`].
///
/// Header errors are deferred to [`RequestBuilder::build`] so calls chain.
#[derive(Debug)]
pub struct RequestBuilder {
    method: String,
    target: String,
    query: QueryParams,
    headers: Headers,
    body: Vec<u8>,
    error: Option<DomainError>,
}

impl RequestBuilder {
    fn new(method: String, target: String) -> Self {
        Self {
            method,
            target,
            query: QueryParams::new(),
            headers: Headers::new(),
            body: Vec::new(),
            error: None,
        }
    }

    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        if let Err(err) = self.headers.append(name, value) {
            self.error.get_or_insert(err);
        }
        self
    }

    /// Replace any existing value of `name`.
    #[must_use]
    pub fn set_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        if let Err(err) = self.headers.insert(name, value) {
            self.error.get_or_insert(err);
        }
        self
    }

    #[must_use]
    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.append(name, value);
        self
    }

    #[must_use]
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Whether a header named `name` has been added.
    #[must_use]
    pub fn has_header(&self, name: &str) -> bool {
        self.headers.contains(name)
    }

    /// Consume the builder, validate, and return a [`RequestDescriptor`].
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidMethod`] for an empty or non-token
    /// method, [`DomainError::InvalidPath`] when the target does not start
    /// with `/`, or the first header error encountered while building.
    pub fn build(self) -> Result<RequestDescriptor, DomainError> {
        if let Some(err) = self.error {
            return Err(err);
        }

        let method = self.method.to_ascii_uppercase();
        if method.is_empty() || !method.bytes().all(|b| b.is_ascii_alphabetic() || b == b'-') {
            return Err(DomainError::InvalidMethod(self.method));
        }

        let (path, raw_query) = match self.target.split_once('?') {
            Some((path, query)) => (path.to_string(), Some(query)),
            None => (self.target.clone(), None),
        };
        if !path.starts_with('/') {
            return Err(DomainError::InvalidPath(self.target.clone()));
        }

        let query_string = match (raw_query.unwrap_or_default(), self.query.is_empty()) {
            (raw, true) => raw.to_string(),
            ("", false) => self.query.encode(),
            (raw, false) => format!("{raw}&{}", self.query.encode()),
        };
        let query = QueryParams::parse(&query_string);

        Ok(RequestDescriptor {
            method,
            path,
            query_string,
            query,
            headers: self.headers,
            body: self.body,
        })
    }
}
