//! Synchronous application port: the blocking convention.

use webtest_domain::request::RequestDescriptor;
use webtest_domain::response::ResponseDescriptor;

use crate::error::BridgeError;

/// Anything that answers a request by blocking until the response is complete.
pub trait SyncApplication: Send + Sync {
    /// Serve one request.
    ///
    /// # Errors
    ///
    /// Implementation-specific; the bridge returns the [`BridgeError`]
    /// taxonomy.
    fn call(&self, request: RequestDescriptor) -> Result<ResponseDescriptor, BridgeError>;
}

/// Plain closures are synchronous applications and pass straight through.
impl<F> SyncApplication for F
where
    F: Fn(RequestDescriptor) -> ResponseDescriptor + Send + Sync,
{
    fn call(&self, request: RequestDescriptor) -> Result<ResponseDescriptor, BridgeError> {
        Ok(self(request))
    }
}
