//! # webtest-adapter-http-axum
//!
//! Async application adapter built on [axum](https://docs.rs/axum) and
//! [tower](https://docs.rs/tower).
//!
//! ## Responsibilities
//! - Implement `AsyncApplication` for an axum `Router` or any clonable
//!   `tower::Service<Request<Body>>` ([`AxumApp`](app::AxumApp))
//! - Map request descriptors into `http::Request` values, keeping body bytes
//!   and every header pair (driving direction)
//! - Map `http::Response` values back into buffered response descriptors
//! - Carry the request over one of two in-process transports
//!   ([`Transport`](transport::Transport)):
//!   - `direct`: `tower::ServiceExt::oneshot`, no serialisation
//!   - `duplex`: real HTTP/1.1 framing over `tokio::io::duplex`, served by
//!     hyper exactly as a socket connection would be
//!
//! ## Dependency rule
//! Depends on `webtest-app` (port traits) and `webtest-domain` (descriptors).
//! Never leaks axum or hyper types through the port.

pub mod app;
pub mod error;
pub mod transport;

mod translate;

pub use app::AxumApp;
pub use transport::Transport;
