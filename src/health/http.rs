// ABOUTME: Health probe that GETs an instance's health endpoint over HTTP/1.
// ABOUTME: 2xx means healthy, other statuses unhealthy, connection failures starting.

use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::Empty;
use hyper::{Request, StatusCode, Uri};
use hyper_util::rt::TokioIo;
use std::collections::HashMap;
use std::time::Duration;
use tokio::net::TcpStream;

use super::HealthProbe;
use crate::config::HealthConfig;
use crate::runtime::InstanceHealth;
use crate::types::Color;

#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("invalid health url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("no health url configured for {0}")]
    MissingUrl(Color),

    #[error("connection failed: {0}")]
    Connect(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] hyper::Error),

    #[error("failed to build request: {0}")]
    Request(String),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),
}

pub struct HttpProbe {
    urls: HashMap<Color, Uri>,
    request_timeout: Duration,
}

impl HttpProbe {
    pub fn new(urls: HashMap<Color, Uri>) -> Self {
        Self {
            urls,
            request_timeout: Duration::from_secs(5),
        }
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn from_config(config: &HealthConfig) -> Result<Self, ProbeError> {
        let mut urls = HashMap::new();
        for color in Color::ALL {
            let raw = config.urls.get(&color).ok_or(ProbeError::MissingUrl(color))?;
            urls.insert(color, parse_http_url(raw)?);
        }
        // Never let one request outlive a poll interval by much.
        let timeout = config.interval.max(Duration::from_secs(1));
        Ok(Self::new(urls).request_timeout(timeout))
    }

    async fn get_status(&self, uri: &Uri) -> Result<StatusCode, ProbeError> {
        match tokio::time::timeout(self.request_timeout, get(uri)).await {
            Ok(result) => result,
            Err(_) => Err(ProbeError::Timeout(self.request_timeout)),
        }
    }
}

#[async_trait]
impl HealthProbe for HttpProbe {
    async fn probe(&self, color: Color) -> InstanceHealth {
        let Some(uri) = self.urls.get(&color) else {
            tracing::warn!("No health url for {}", color);
            return InstanceHealth::Unknown;
        };

        match self.get_status(uri).await {
            Ok(status) if status.is_success() => InstanceHealth::Healthy,
            Ok(status) => {
                tracing::debug!("{} returned {}", uri, status);
                InstanceHealth::Unhealthy
            }
            Err(e) => {
                tracing::debug!("{} not answering: {}", uri, e);
                InstanceHealth::Starting
            }
        }
    }
}

fn parse_http_url(raw: &str) -> Result<Uri, ProbeError> {
    let invalid = |reason: &str| ProbeError::InvalidUrl {
        url: raw.to_string(),
        reason: reason.to_string(),
    };
    let uri = raw.parse::<Uri>().map_err(|e| invalid(&e.to_string()))?;
    if uri.scheme_str() != Some("http") {
        return Err(invalid("only http:// urls are supported"));
    }
    if uri.host().is_none() {
        return Err(invalid("missing host"));
    }
    Ok(uri)
}

/// Host to dial. IPv6 literals come back from `Uri::host` still bracketed.
fn connect_host(uri: &Uri) -> &str {
    let host = uri.host().unwrap_or("localhost");
    host.strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(host)
}

async fn get(uri: &Uri) -> Result<StatusCode, ProbeError> {
    let host = connect_host(uri);
    let port = uri.port_u16().unwrap_or(80);

    let stream = TcpStream::connect((host, port)).await?;
    let io = TokioIo::new(stream);
    let (mut sender, conn) = hyper::client::conn::http1::handshake(io).await?;

    // Spawn connection handler
    tokio::spawn(async move {
        if let Err(e) = conn.await {
            tracing::debug!("health probe connection error: {}", e);
        }
    });

    let path = uri.path_and_query().map(|p| p.as_str()).unwrap_or("/");
    let authority = uri.authority().map(|a| a.as_str()).unwrap_or(host);
    let req = Request::builder()
        .method("GET")
        .uri(path)
        .header("Host", authority)
        .body(Empty::<Bytes>::new())
        .map_err(|e| ProbeError::Request(e.to_string()))?;

    // Only the status matters; the body is dropped unread.
    let resp = sender.send_request(req).await?;
    Ok(resp.status())
}
