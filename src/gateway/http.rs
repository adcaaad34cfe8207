use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use super::{Body, Method, Transport, TransportError, WireRequest, WireResponse};
use crate::error::{Result, VibeError};

const SEQ_HEADER: &str = "x-request-seq";

/// reqwest-backed transport
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(concat!("vibe-control/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| VibeError::Http(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: WireRequest) -> std::result::Result<WireResponse, TransportError> {
        let builder = match request.method {
            Method::Get => self.client.get(request.url),
            Method::Post => self.client.post(request.url),
            Method::Delete => self.client.delete(request.url),
        };

        let mut builder = builder.header(SEQ_HEADER, request.seq);
        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token.expose());
        }
        builder = match &request.body {
            Body::Empty => builder,
            Body::Json(value) => builder.json(value),
            Body::Form(fields) => builder.form(fields),
        };

        let response = builder.send().await.map_err(|e| TransportError {
            message: e.to_string(),
        })?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| TransportError {
            message: e.to_string(),
        })?;

        Ok(WireResponse { status, body })
    }
}
