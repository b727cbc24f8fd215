//! Execution context: the runtime that drives async work to completion.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::runtime::{Builder, Handle, Runtime};

use crate::error::BridgeError;

/// A tokio runtime that can be driven synchronously, one call at a time.
///
/// Either owns a current-thread [`Runtime`] or holds a [`Handle`] to a
/// runtime driven elsewhere. Clones share the runtime *and* the busy flag, so
/// every adapter bound to the same context is serialised.
///
/// A handle to a current-thread runtime cannot drive IO or timers on its own;
/// prefer [`ExecutionContext::current_thread`] unless the runtime is
/// multi-threaded.
#[derive(Clone)]
pub struct ExecutionContext {
    inner: Arc<Inner>,
}

struct Inner {
    runtime: Option<Runtime>,
    handle: Handle,
    busy: AtomicBool,
}

impl ExecutionContext {
    /// Start a fresh current-thread runtime owned by this context.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Runtime`] if the runtime cannot be built.
    pub fn current_thread() -> Result<Self, BridgeError> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(BridgeError::Runtime)?;
        Ok(Self::from_runtime(runtime))
    }

    /// Take ownership of an existing runtime.
    #[must_use]
    pub fn from_runtime(runtime: Runtime) -> Self {
        let handle = runtime.handle().clone();
        Self {
            inner: Arc::new(Inner {
                runtime: Some(runtime),
                handle,
                busy: AtomicBool::new(false),
            }),
        }
    }

    /// Drive work through a handle to a runtime owned elsewhere.
    #[must_use]
    pub fn from_handle(handle: Handle) -> Self {
        Self {
            inner: Arc::new(Inner {
                runtime: None,
                handle,
                busy: AtomicBool::new(false),
            }),
        }
    }

    /// Handle to the underlying runtime.
    #[must_use]
    pub fn handle(&self) -> &Handle {
        &self.inner.handle
    }

    /// Whether a call is currently being driven on this context.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.inner.busy.load(Ordering::Acquire)
    }

    /// Whether both values refer to the same context.
    #[must_use]
    pub fn same_as(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Claim the context for one call.
    ///
    /// The returned [`Session`] releases the claim when dropped, including
    /// during unwinding.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::ConcurrentInvocation`] if another call holds the
    /// context, or [`BridgeError::NestedRuntime`] if the current thread is
    /// already inside an async runtime.
    pub fn enter(&self) -> Result<Session<'_>, BridgeError> {
        if self
            .inner
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::warn!("execution context is busy; refusing concurrent invocation");
            return Err(BridgeError::ConcurrentInvocation);
        }
        let session = Session { context: self };
        if Handle::try_current().is_ok() {
            tracing::warn!("synchronous client called from inside an async runtime");
            return Err(BridgeError::NestedRuntime);
        }
        Ok(session)
    }
}

impl fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("owned", &self.inner.runtime.is_some())
            .field("busy", &self.is_busy())
            .finish()
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        // A runtime must not be dropped from inside another runtime.
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}

/// Exclusive claim on an [`ExecutionContext`] for the duration of one call.
#[must_use = "the context is released as soon as the session is dropped"]
pub struct Session<'a> {
    context: &'a ExecutionContext,
}

impl Session<'_> {
    /// Block the current thread until `future` completes.
    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        let inner = &self.context.inner;
        match &inner.runtime {
            Some(runtime) => runtime.block_on(future),
            None => inner.handle.block_on(future),
        }
    }
}

impl Drop for Session<'_> {
    fn drop(&mut self) {
        self.context.inner.busy.store(false, Ordering::Release);
    }
}
