//! Descriptor ↔ `http` type conversions.

use axum::body::{Body, Bytes};
use axum::extract::ConnectInfo;
use axum::http::header::HOST;
use axum::http::{Request, Version, response};

use webtest_app::ports::{ConnectionInfo, HttpVersion};
use webtest_domain::latin1;
use webtest_domain::request::RequestDescriptor;
use webtest_domain::response::ResponseDescriptor;

use crate::error::TransportError;

/// Build the request the service will see.
///
/// Header values are written as ISO-8859-1 bytes so every value that came
/// from a response header can be sent back unchanged. The remote address is
/// exposed as [`ConnectInfo`].
pub(crate) fn to_http_request(
    request: RequestDescriptor,
    connection: &ConnectionInfo,
) -> Result<Request<Body>, TransportError> {
    let target = request.path_qs();
    let (method, _, _, headers, body) = request.into_parts();

    let mut builder = Request::builder()
        .method(method.as_str())
        .uri(target)
        .version(match connection.http_version {
            HttpVersion::Http10 => Version::HTTP_10,
            HttpVersion::Http11 => Version::HTTP_11,
        });

    if !headers.contains(HOST.as_str()) {
        builder = builder.header(HOST, connection.host.as_str());
    }
    for (name, value) in headers.iter() {
        let bytes = latin1::encode(value).unwrap_or_else(|| value.as_bytes().to_vec());
        builder = builder.header(name, bytes);
    }

    let mut http_request = builder.body(Body::from(body))?;
    http_request
        .extensions_mut()
        .insert(ConnectInfo(connection.remote_addr));
    Ok(http_request)
}

/// Build the descriptor handed back to the caller.
pub(crate) fn to_descriptor(
    parts: &response::Parts,
    body: &Bytes,
) -> Result<ResponseDescriptor, TransportError> {
    let headers = parts
        .headers
        .iter()
        .map(|(name, value)| (name.as_str().as_bytes().to_vec(), value.as_bytes().to_vec()))
        .collect();
    ResponseDescriptor::new(
        parts.status.as_u16(),
        parts.status.canonical_reason().unwrap_or_default(),
        headers,
        body.to_vec(),
    )
    .map_err(TransportError::Response)
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;

    use axum::http::{Method, Response, StatusCode};

    use super::*;

    fn connection() -> ConnectionInfo {
        ConnectionInfo {
            http_version: HttpVersion::Http11,
            host: "localhost:80".to_string(),
            remote_addr: SocketAddr::from(([127, 0, 0, 1], 80)),
        }
    }

    #[test]
    fn should_carry_method_target_and_version() {
        let request = RequestDescriptor::builder("PATCH", "/items/7?verbose=true")
            .build()
            .unwrap();
        let http = to_http_request(
            request,
            &ConnectionInfo {
                http_version: HttpVersion::Http10,
                ..connection()
            },
        )
        .unwrap();

        assert_eq!(http.method(), Method::PATCH);
        assert_eq!(http.uri(), "/items/7?verbose=true");
        assert_eq!(http.version(), Version::HTTP_10);
    }

    #[test]
    fn should_add_default_host_only_when_missing() {
        let without = RequestDescriptor::builder("GET", "/").build().unwrap();
        let http = to_http_request(without, &connection()).unwrap();
        assert_eq!(http.headers()[HOST], "localhost:80");

        let with = RequestDescriptor::builder("GET", "/")
            .header("Host", "api.example.test")
            .build()
            .unwrap();
        let http = to_http_request(with, &connection()).unwrap();
        let hosts: Vec<_> = http.headers().get_all(HOST).iter().collect();
        assert_eq!(hosts, vec!["api.example.test"]);
    }

    #[test]
    fn should_keep_duplicate_headers() {
        let request = RequestDescriptor::builder("GET", "/")
            .header("X-Dup", "a")
            .header("x-dup", "b")
            .build()
            .unwrap();
        let http = to_http_request(request, &connection()).unwrap();
        let values: Vec<_> = http.headers().get_all("x-dup").iter().collect();
        assert_eq!(values, vec!["a", "b"]);
    }

    #[test]
    fn should_write_header_values_as_latin1_bytes() {
        let request = RequestDescriptor::builder("GET", "/")
            .header("X-Name", "café")
            .build()
            .unwrap();
        let http = to_http_request(request, &connection()).unwrap();
        assert_eq!(http.headers()["x-name"].as_bytes(), b"caf\xe9");
    }

    #[test]
    fn should_expose_remote_addr_as_connect_info() {
        let request = RequestDescriptor::builder("GET", "/").build().unwrap();
        let http = to_http_request(request, &connection()).unwrap();
        let ConnectInfo(addr) = http.extensions().get::<ConnectInfo<SocketAddr>>().unwrap();
        assert_eq!(addr.to_string(), "127.0.0.1:80");
    }

    #[test]
    fn should_reject_target_that_is_not_a_valid_uri() {
        let request = RequestDescriptor::builder("GET", "/has space")
            .build()
            .unwrap();
        assert!(matches!(
            to_http_request(request, &connection()),
            Err(TransportError::Request(_))
        ));
    }

    #[test]
    fn should_translate_response_parts_in_order() {
        let response = Response::builder()
            .status(StatusCode::CREATED)
            .header("content-type", "application/json")
            .header("set-cookie", "a=1")
            .header("set-cookie", "b=2")
            .body(())
            .unwrap();
        let (parts, ()) = response.into_parts();

        let descriptor = to_descriptor(&parts, &Bytes::from_static(b"{}")).unwrap();

        assert_eq!(descriptor.status(), 201);
        assert_eq!(descriptor.reason(), "Created");
        assert_eq!(descriptor.content_type().as_deref(), Some("application/json"));
        assert_eq!(
            descriptor.headers_latin1(),
            vec![
                ("content-type".to_string(), "application/json".to_string()),
                ("set-cookie".to_string(), "a=1".to_string()),
                ("set-cookie".to_string(), "b=2".to_string()),
            ]
        );
        assert_eq!(descriptor.body(), b"{}");
    }
}
