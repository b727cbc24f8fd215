//! # webtest-app
//!
//! Application layer: the synchronous test client and the bridge that
//! turns one blocking call into one async request cycle.
//!
//! ## Responsibilities
//! - Define **port traits**:
//!   - `AsyncApplication`: what an async web application must offer
//!     (driven port, implemented by adapters)
//!   - `SyncApplication`: the blocking request/response convention the
//!     test client speaks (implemented by the bridge and by plain closures)
//! - Own the `ExecutionContext` that runs async work to completion and
//!   refuses reentrant use
//! - Provide `BridgeAdapter`, which drives exactly one request per call
//! - Provide `TestApp`, the WebTest-style client (`get`, `post_form`,
//!   `post_json`, status expectations, default headers)
//!
//! ## Dependency rule
//! Depends on `webtest-domain` and on `tokio`'s runtime only.
//! Never imports an HTTP framework; adapters depend on *this* crate.

pub mod bridge;
pub mod config;
pub mod context;
pub mod error;
pub mod ports;
pub mod response;
pub mod test_app;
