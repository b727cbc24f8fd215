//! # webtest-domain
//!
//! Plain-data description of one HTTP exchange as seen by a synchronous
//! test client.
//!
//! ## Responsibilities
//! - [`RequestDescriptor`](request::RequestDescriptor): method, path, query
//!   parameters, headers and body of an inbound request
//! - [`ResponseDescriptor`](response::ResponseDescriptor): status, reason,
//!   raw header pairs, content type, charset and buffered body
//! - [`Headers`](headers::Headers): ordered, case-insensitive header multimap
//! - [`QueryParams`](query::QueryParams): ordered query/form pairs with duplicates
//! - ISO-8859-1 decoding of header bytes
//!
//! ## Dependency rule
//! This crate has **no internal dependencies** and never imports an async
//! runtime or an HTTP framework. The `app` crate builds on these types and
//! adapters translate them to and from their framework's representation.

pub mod error;
pub mod headers;
pub mod latin1;
pub mod query;
pub mod request;
pub mod response;
