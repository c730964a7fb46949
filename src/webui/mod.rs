//! Development server for the web UI.
//!
//! Forwards the API prefixes to the backend and serves the built application
//! for everything else, falling back to `index.html` so client-side routes
//! load the app on a hard refresh.

pub mod handlers;

use crate::{APP_USER_AGENT, navigation::BasePath, proxy::ProxyTable};
use anyhow::{Context, Result};
use axum::{
    Extension, Router,
    body::Body,
    http::{HeaderName, HeaderValue, Method, Request, header},
    routing::get,
};
use std::{
    future::Future,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::PropagateRequestIdLayer,
    services::{ServeDir, ServeFile},
    set_header::SetRequestHeaderLayer,
    trace::TraceLayer,
};
use tracing::{Span, debug_span, error, info};
use ulid::Ulid;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub dist: PathBuf,
    pub base: BasePath,
    pub proxy: ProxyTable,
}

/// Shared state of the development server.
#[derive(Debug, Clone)]
pub struct DevServer {
    proxy: ProxyTable,
    base: BasePath,
    client: reqwest::Client,
    files: ServeDir<ServeFile>,
}

impl DevServer {
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(proxy: ProxyTable, dist: &Path, base: BasePath) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(APP_USER_AGENT)
            // backend redirects belong to the browser
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .context("Failed to build HTTP client")?;

        let files = ServeDir::new(dist).fallback(ServeFile::new(dist.join("index.html")));

        Ok(Self {
            proxy,
            base,
            client,
            files,
        })
    }

    #[must_use]
    pub const fn proxy(&self) -> &ProxyTable {
        &self.proxy
    }

    #[must_use]
    pub const fn base(&self) -> &BasePath {
        &self.base
    }

    #[must_use]
    pub const fn client(&self) -> &reqwest::Client {
        &self.client
    }

    #[must_use]
    pub fn files(&self) -> ServeDir<ServeFile> {
        self.files.clone()
    }
}

/// Build the router with the request-id, tracing and CORS layers.
pub fn router(server: Arc<DevServer>) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_origin(Any)
        .max_age(Duration::from_secs(1));

    Router::new()
        .route(
            "/health",
            get(handlers::health::health).options(handlers::health::health),
        )
        .fallback(handlers::dispatch::dispatch)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static("x-request-id"),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    "x-request-id",
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(cors)
                .layer(Extension(server)),
        )
}

/// Bind and serve until Ctrl-C.
///
/// # Errors
/// Returns an error if the port cannot be bound or the server fails.
pub async fn new(config: Config) -> Result<()> {
    let listener = TcpListener::bind(format!("::0:{}", config.port))
        .await
        .with_context(|| format!("Failed to bind port {}", config.port))?;

    info!("Listening on [::]:{}", config.port);

    serve(listener, config, shutdown_signal()).await
}

/// Serve on an already bound listener until `shutdown` resolves.
///
/// # Errors
/// Returns an error if the server fails.
pub async fn serve<F>(listener: TcpListener, config: Config, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    info!(
        "Serving {} under {}, forwarding {}",
        config.dist.display(),
        config.base.as_str(),
        config
            .proxy
            .rules()
            .iter()
            .map(|rule| format!("{} -> {}", rule.prefix(), rule.target()))
            .collect::<Vec<_>>()
            .join(", ")
    );

    let server = Arc::new(DevServer::new(config.proxy, &config.dist, config.base)?);
    let app = router(server);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {e}");
    }
    info!("Gracefully shutdown");
}

// span
fn make_span(request: &Request<Body>) -> Span {
    let headers = request.headers();
    let path = request.uri().path();
    let request_id = headers
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");

    debug_span!("http-request", path, ?headers, request_id)
}
