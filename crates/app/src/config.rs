//! Bridge behaviour knobs.

use std::net::{Ipv4Addr, SocketAddr};
use std::str::FromStr;

use serde::Deserialize;

use crate::ports::{ConnectionInfo, HttpVersion};

/// What to do when the application fails without producing a response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    /// Return the failure to the caller; panics are re-raised.
    #[default]
    Propagate,
    /// Answer with a plain-text `500 Internal Server Error` instead.
    InternalServerError,
}

impl FromStr for ErrorPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "propagate" => Ok(Self::Propagate),
            "internal_server_error" | "500" => Ok(Self::InternalServerError),
            other => Err(format!("unknown error policy {other:?}")),
        }
    }
}

/// Settings for one [`BridgeAdapter`](crate::bridge::BridgeAdapter).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    pub error_policy: ErrorPolicy,
    pub http_version: HttpVersion,
    /// `Host` header used when a request does not carry one.
    pub host: String,
    /// Peer address reported to the application.
    pub remote_addr: SocketAddr,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            error_policy: ErrorPolicy::default(),
            http_version: HttpVersion::default(),
            host: "localhost:80".to_string(),
            remote_addr: SocketAddr::from((Ipv4Addr::LOCALHOST, 80)),
        }
    }
}

impl BridgeConfig {
    /// Connection facts handed to the application on every dispatch.
    #[must_use]
    pub fn connection_info(&self) -> ConnectionInfo {
        ConnectionInfo {
            http_version: self.http_version,
            host: self.host.clone(),
            remote_addr: self.remote_addr,
        }
    }
}
