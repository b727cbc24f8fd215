//! # webtest-axum
//!
//! Composition root that wires an axum router into the blocking test client.
//!
//! ## Responsibilities
//! - Load configuration (`webtest.toml`, environment variables)
//! - Install the tracing subscriber
//! - Create the execution context that drives every request
//! - Wrap the router in the axum adapter and the bridge, and hand back a
//!   ready [`TestApp`]
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer; no bridging logic belongs here.
//!
//! ```no_run
//! use axum::{Router, routing::get};
//!
//! let client = webtest_axum::test_app(Router::new().route("/", get(|| async { "hi" })))?;
//! let response = client.get("/").send()?;
//! assert_eq!(response.text()?, "hi");
//! # Ok::<(), webtest_axum::Error>(())
//! ```

pub mod config;
pub mod logging;

use axum::Router;

pub use webtest_adapter_http_axum::{AxumApp, Transport};
pub use webtest_app::config::{BridgeConfig, ErrorPolicy};
pub use webtest_app::context::ExecutionContext;
pub use webtest_app::error::BridgeError;
pub use webtest_app::ports::{AsyncApplication, HttpVersion, SyncApplication};
pub use webtest_app::response::TestResponse;
pub use webtest_app::test_app::{TestApp, TestRequest};
pub use webtest_domain::request::RequestDescriptor;
pub use webtest_domain::response::ResponseDescriptor;

use crate::config::{Config, ConfigError};

/// Failure to build a client.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Bridge(#[from] BridgeError),
}

/// Build a client for `router` using [`Config::load`].
///
/// # Errors
///
/// Returns [`Error::Config`] if the configuration is invalid, or
/// [`Error::Bridge`] if the execution context cannot be started.
pub fn test_app(router: Router) -> Result<TestApp, Error> {
    let config = Config::load()?;
    Ok(test_app_with(router, &config)?)
}

/// Build a client for `router` with an explicit configuration.
///
/// Each client owns a fresh current-thread runtime; requests are traced
/// through `tower_http`'s `TraceLayer`.
///
/// # Errors
///
/// Returns [`BridgeError::Runtime`] if the runtime cannot be started.
pub fn test_app_with(router: Router, config: &Config) -> Result<TestApp, BridgeError> {
    logging::init_tracing(&config.logging.filter);
    let context = ExecutionContext::current_thread()?;
    let app = AxumApp::new(router)
        .traced()
        .with_transport(config.transport.kind);
    tracing::debug!(transport = ?config.transport.kind, "building test client");
    TestApp::from_async(app, Some(context), config.bridge.clone())
}
