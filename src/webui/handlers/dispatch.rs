use crate::{
    proxy::{ProxyError, ProxyRule},
    webui::DevServer,
};
use axum::{
    body::{Body, to_bytes},
    extract::{Extension, Request},
    http::{HeaderMap, StatusCode, Uri, header},
    response::{IntoResponse, Response},
};
use http_body_util::LengthLimitError;
use std::sync::Arc;
use tower::ServiceExt;
use tracing::{debug, error, instrument, warn};

// Upper bound for buffered request bodies (profile photos go through here).
const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

// RFC 9110 connection-specific headers, never forwarded.
const HOP_BY_HOP: [&str; 8] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Fallback handler: forward API prefixes, serve the app for the rest.
#[instrument(skip(server, request), fields(method = %request.method(), uri = %request.uri()))]
pub async fn dispatch(Extension(server): Extension<Arc<DevServer>>, request: Request) -> Response {
    let path_and_query = request
        .uri()
        .path_and_query()
        .map_or_else(|| request.uri().path().to_string(), ToString::to_string);

    if let Some(rule) = server.proxy().find(&path_and_query) {
        return forward(&server, rule, &path_and_query, request).await;
    }

    serve_app(&server, request).await
}

async fn forward(
    server: &DevServer,
    rule: &ProxyRule,
    path_and_query: &str,
    request: Request,
) -> Response {
    let url = match rule.forward_url(path_and_query) {
        Ok(url) => url,
        Err(e @ ProxyError::Rewritten { .. }) => {
            warn!("Refusing to forward: {e}");
            return (StatusCode::BAD_REQUEST, e.to_string()).into_response();
        }
        Err(e) => {
            error!("Could not build backend URL: {e}");
            return (StatusCode::BAD_GATEWAY, e.to_string()).into_response();
        }
    };

    let (parts, body) = request.into_parts();
    let body = match to_bytes(body, MAX_BODY_BYTES).await {
        Ok(body) => body,
        Err(e) => {
            let message = e.to_string();
            let status = body_error_status(e);
            warn!("Could not read request body ({status}): {message}");
            return (status, message).into_response();
        }
    };

    let mut headers = strip_hop_by_hop(&parts.headers);
    headers.remove(header::HOST);
    headers.remove(header::CONTENT_LENGTH);

    debug!("forwarding {} {path_and_query} to {url}", parts.method);

    let upstream = match server
        .client()
        .request(parts.method, url.clone())
        .headers(headers)
        .body(body)
        .send()
        .await
    {
        Ok(upstream) => upstream,
        Err(e) => {
            warn!("Backend {url} unavailable: {e}");
            return (StatusCode::BAD_GATEWAY, format!("backend unavailable: {e}")).into_response();
        }
    };

    let status = upstream.status();
    let headers = strip_hop_by_hop(upstream.headers());

    let mut response = Response::new(Body::from_stream(upstream.bytes_stream()));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}

async fn serve_app(server: &DevServer, request: Request) -> Response {
    let (mut parts, body) = request.into_parts();

    let Some(path) = server.base().strip(parts.uri.path()) else {
        debug!("{} is outside base {}", parts.uri.path(), server.base().as_str());
        return StatusCode::NOT_FOUND.into_response();
    };

    let rebased = match parts.uri.query() {
        Some(query) => format!("{path}?{query}"),
        None => path,
    };
    match rebased.parse::<Uri>() {
        Ok(uri) => parts.uri = uri,
        Err(e) => return (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    }

    match server.files().oneshot(Request::<Body>::from_parts(parts, body)).await {
        Ok(response) => response.into_response(),
        Err(never) => match never {},
    }
}

// 413 for the size limit, 400 for any other read failure.
fn body_error_status(e: axum::Error) -> StatusCode {
    let inner = e.into_inner();
    let mut source: Option<&(dyn std::error::Error + 'static)> = Some(inner.as_ref());
    while let Some(err) = source {
        if err.is::<LengthLimitError>() {
            return StatusCode::PAYLOAD_TOO_LARGE;
        }
        source = err.source();
    }
    StatusCode::BAD_REQUEST
}

fn strip_hop_by_hop(headers: &HeaderMap) -> HeaderMap {
    let mut filtered = headers.clone();
    for name in HOP_BY_HOP {
        filtered.remove(name);
    }
    filtered
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[tokio::test]
    async fn oversized_body_is_payload_too_large() -> anyhow::Result<()> {
        let result = to_bytes(Body::from(vec![0_u8; 32]), 16).await;
        let status = result.err().map(body_error_status);
        assert_eq!(status, Some(StatusCode::PAYLOAD_TOO_LARGE));
        Ok(())
    }

    #[test]
    fn broken_body_is_bad_request() {
        let reset = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset by peer");
        assert_eq!(
            body_error_status(axum::Error::new(reset)),
            StatusCode::BAD_REQUEST
        );
    }

    #[tokio::test]
    async fn dot_segments_are_not_forwarded() -> anyhow::Result<()> {
        use crate::{navigation::BasePath, proxy::ProxyTable, webui};
        use axum::http::Request as HttpRequest;

        let dist = tempfile::tempdir()?;
        let server = DevServer::new(
            ProxyTable::wasatext(crate::proxy::DEFAULT_BACKEND)?,
            dist.path(),
            BasePath::new("/"),
        )?;

        for uri in ["/conversations/../admin", "/conversations/%2e%2e/session"] {
            let response = webui::router(Arc::new(server.clone()))
                .oneshot(HttpRequest::builder().uri(uri).body(Body::empty())?)
                .await?;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
        }
        Ok(())
    }

    #[test]
    fn hop_by_hop_headers_are_dropped() {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
        headers.insert(header::TRANSFER_ENCODING, HeaderValue::from_static("chunked"));
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer 3"));
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let filtered = strip_hop_by_hop(&headers);
        assert!(filtered.get(header::CONNECTION).is_none());
        assert!(filtered.get(header::TRANSFER_ENCODING).is_none());
        assert_eq!(
            filtered.get(header::AUTHORIZATION),
            Some(&HeaderValue::from_static("Bearer 3"))
        );
        assert_eq!(filtered.len(), 2);
    }
}
