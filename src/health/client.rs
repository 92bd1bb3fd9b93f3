// ABOUTME: Minimal HTTP/1 client for health and validation probes.
// ABOUTME: One connection per request, bounded by a per-request timeout.

use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::header::{CONTENT_TYPE, HOST};
use hyper::{Method, Request, Uri};
use hyper_util::rt::TokioIo;
use std::time::Duration;
use tokio::net::TcpStream;

/// Status and body of a completed HTTP exchange.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Bytes,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Transport-level probe failures. HTTP error statuses are not errors.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    #[error("connection failed: {0}")]
    Connect(#[source] std::io::Error),

    #[error("http error: {0}")]
    Http(#[from] hyper::Error),

    #[error("failed to build request: {0}")]
    Request(#[from] hyper::http::Error),

    #[error("failed to encode request body: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),
}

#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Send one request; `body` is sent as JSON when present.
    async fn request(
        &self,
        method: Method,
        url: &str,
        body: Option<&serde_json::Value>,
        timeout: Duration,
    ) -> Result<HttpResponse, ProbeError>;
}

/// [`HttpClient`] over plain TCP using hyper's HTTP/1 connection API.
#[derive(Debug, Clone, Default)]
pub struct HyperClient;

#[async_trait]
impl HttpClient for HyperClient {
    async fn request(
        &self,
        method: Method,
        url: &str,
        body: Option<&serde_json::Value>,
        timeout: Duration,
    ) -> Result<HttpResponse, ProbeError> {
        tokio::time::timeout(timeout, send(method, url, body))
            .await
            .map_err(|_| ProbeError::Timeout(timeout))?
    }
}

async fn send(
    method: Method,
    url: &str,
    body: Option<&serde_json::Value>,
) -> Result<HttpResponse, ProbeError> {
    let uri: Uri = url
        .parse()
        .map_err(|e| ProbeError::InvalidUrl(format!("{}: {}", url, e)))?;
    let host = uri
        .host()
        .ok_or_else(|| ProbeError::InvalidUrl(format!("{}: missing host", url)))?;
    let port = uri.port_u16().unwrap_or(80);

    let stream = TcpStream::connect((host, port))
        .await
        .map_err(ProbeError::Connect)?;

    let (mut sender, conn) =
        hyper::client::conn::http1::handshake::<_, Full<Bytes>>(TokioIo::new(stream)).await?;

    tokio::spawn(async move {
        if let Err(e) = conn.await {
            tracing::debug!("probe connection error: {}", e);
        }
    });

    let path = uri.path_and_query().map_or("/", |p| p.as_str());
    let mut builder = Request::builder()
        .method(method)
        .uri(path)
        .header(HOST, format!("{}:{}", host, port));

    let payload = match body {
        Some(json) => {
            builder = builder.header(CONTENT_TYPE, "application/json");
            Bytes::from(serde_json::to_vec(json)?)
        }
        None => Bytes::new(),
    };

    let resp = sender.send_request(builder.body(Full::new(payload))?).await?;
    let status = resp.status().as_u16();
    let body = resp.into_body().collect().await?.to_bytes();

    Ok(HttpResponse { status, body })
}
