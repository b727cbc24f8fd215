//! In-process transports between the bridge and the service.

use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::{Arc, Mutex, PoisonError};

use axum::body::{Body, Bytes};
use axum::extract::ConnectInfo;
use axum::http::header::CONTENT_LENGTH;
use axum::http::{Method, Request, Response, StatusCode, response};
use http_body_util::BodyExt;
use hyper::body::Incoming;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use serde::Deserialize;
use tower::{Service, ServiceExt};

use webtest_app::ports::ApplicationError;

use crate::error::TransportError;

/// Capacity of each direction of the in-memory pipe.
const DUPLEX_BUFFER: usize = 64 * 1024;

/// How a request reaches the service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transport {
    /// Call the service directly with `oneshot`.
    Direct,
    /// Serialise to HTTP/1.1 and serve it over an in-memory duplex pipe.
    #[default]
    Duplex,
}

impl FromStr for Transport {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "direct" => Ok(Self::Direct),
            "duplex" => Ok(Self::Duplex),
            other => Err(format!("unknown transport {other:?}")),
        }
    }
}

/// Placeholder error handed to hyper; the real cause is kept aside.
#[derive(Debug, thiserror::Error)]
#[error("service failed")]
struct ServiceFailed;

/// Call `service` once and buffer the whole response.
///
/// A declared `Content-Length` must match the buffered body, except where
/// HTTP says the body is absent (`HEAD`, `1xx`, `204`, `304`).
pub(crate) async fn direct<S>(
    service: S,
    request: Request<Body>,
) -> Result<(response::Parts, Bytes), TransportError>
where
    S: Service<Request<Body>, Response = Response<Body>>,
    S::Error: Into<ApplicationError>,
{
    let method = request.method().clone();
    let response = service
        .oneshot(request)
        .await
        .map_err(|err| TransportError::Service(err.into()))?;
    let (parts, body) = response.into_parts();
    let body = body
        .collect()
        .await
        .map_err(|err| TransportError::Body(Box::new(err)))?
        .to_bytes();
    check_content_length(&method, &parts, body.len())?;
    Ok((parts, body))
}

fn check_content_length(
    method: &Method,
    parts: &response::Parts,
    actual: usize,
) -> Result<(), TransportError> {
    let bodiless = method == Method::HEAD
        || parts.status.is_informational()
        || parts.status == StatusCode::NO_CONTENT
        || parts.status == StatusCode::NOT_MODIFIED;
    if bodiless {
        return Ok(());
    }
    let Some(value) = parts.headers.get(CONTENT_LENGTH) else {
        return Ok(());
    };
    let declared = value
        .to_str()
        .ok()
        .and_then(|text| text.trim().parse::<u64>().ok());
    if declared.is_some_and(|declared| u64::try_from(actual) == Ok(declared)) {
        return Ok(());
    }
    Err(TransportError::ContentLength {
        declared: String::from_utf8_lossy(value.as_bytes()).into_owned(),
        actual,
    })
}

/// Serve exactly one HTTP/1.1 exchange between a hyper client and a hyper
/// server joined by an in-memory pipe.
///
/// The server side buffers and checks the response with [`direct`] before
/// hyper frames it, so both transports reject the same responses. Resolves
/// only once the response body has been fully read and both ends of the
/// connection have shut down. Keep-alive is off, so the server closes the
/// connection after the first response.
pub(crate) async fn duplex<S>(
    service: S,
    request: Request<Body>,
    remote_addr: SocketAddr,
) -> Result<(response::Parts, Bytes), TransportError>
where
    S: Service<Request<Body>, Response = Response<Body>> + Clone + Send + 'static,
    S::Future: Send,
    S::Error: Into<ApplicationError>,
{
    let (client_io, server_io) = tokio::io::duplex(DUPLEX_BUFFER);

    // hyper only reports "user service error"; keep the original.
    let failure: Arc<Mutex<Option<TransportError>>> = Arc::default();

    let server = {
        let failure = Arc::clone(&failure);
        let handler = service_fn(move |mut request: Request<Incoming>| {
            let service = service.clone();
            let failure = Arc::clone(&failure);
            request.extensions_mut().insert(ConnectInfo(remote_addr));
            async move {
                match direct(service, request.map(Body::new)).await {
                    Ok((parts, body)) => Ok(Response::from_parts(parts, Body::from(body))),
                    Err(err) => {
                        *failure.lock().unwrap_or_else(PoisonError::into_inner) = Some(err);
                        Err(ServiceFailed)
                    }
                }
            }
        });
        hyper::server::conn::http1::Builder::new()
            .keep_alive(false)
            .serve_connection(TokioIo::new(server_io), handler)
    };

    let client = async move {
        let (mut sender, connection) =
            hyper::client::conn::http1::handshake::<_, Body>(TokioIo::new(client_io)).await?;
        let exchange = async move {
            sender.ready().await?;
            let response = sender.send_request(request).await?;
            let (parts, body) = response.into_parts();
            let body = body.collect().await?.to_bytes();
            Ok::<_, hyper::Error>((parts, body))
        };
        let (closed, exchanged) = tokio::join!(connection, exchange);
        let received = exchanged?;
        closed?;
        Ok::<_, hyper::Error>(received)
    };

    let (served, received) = tokio::join!(server, client);

    if let Some(err) = failure
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .take()
    {
        return Err(err);
    }
    if let Err(err) = served {
        tracing::debug!(error = %err, "in-memory server could not frame the response");
        return Err(TransportError::Framing(err));
    }
    Ok(received?)
}
