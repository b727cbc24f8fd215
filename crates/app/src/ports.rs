//! Port definitions: traits on either side of the bridge.
//!
//! [`AsyncApplication`] is implemented by adapters that know how to hand a
//! request to a concrete async framework. [`SyncApplication`] is the blocking
//! convention the test client calls into.

pub mod application;
pub mod sync_application;

pub use application::{
    ApplicationError, AsyncApplication, ConnectionInfo, DispatchError, HttpVersion,
};
pub use sync_application::SyncApplication;
