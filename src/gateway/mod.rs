//! RequestGateway - the single path to the four backend collaborators
//!
//! Attaches the bearer token when one is present, numbers every call, and
//! folds transport and HTTP outcomes into `Result<Response, Failure>`.
//! Stale-response suppression is the caller's job; the gateway never drops
//! a response.

mod http;
#[cfg(test)]
pub mod mock;

pub use http::HttpTransport;

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::config::{SecretString, ServicesConfig};
use crate::error::{Result as AppResult, VibeError};
use crate::session::SessionStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collaborator {
    Auth,
    Recommender,
    Analytics,
    Playlist,
}

impl Collaborator {
    pub const ALL: [Collaborator; 4] = [
        Collaborator::Auth,
        Collaborator::Recommender,
        Collaborator::Analytics,
        Collaborator::Playlist,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Collaborator::Auth => "auth",
            Collaborator::Recommender => "recommender",
            Collaborator::Analytics => "analytics",
            Collaborator::Playlist => "playlist",
        }
    }
}

impl fmt::Display for Collaborator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Delete => "DELETE",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Empty,
    Json(serde_json::Value),
    /// Form-encoded fields (only the login call uses this)
    Form(Vec<(String, String)>),
}

/// One outbound call, described independently of the transport.
#[derive(Debug, Clone)]
pub struct Call {
    pub collaborator: Collaborator,
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Body,
    pub needs_auth: bool,
}

impl Call {
    pub fn new(collaborator: Collaborator, method: Method, path: impl Into<String>) -> Self {
        Self {
            collaborator,
            method,
            path: path.into(),
            query: Vec::new(),
            body: Body::Empty,
            needs_auth: false,
        }
    }

    pub fn get(collaborator: Collaborator, path: impl Into<String>) -> Self {
        Self::new(collaborator, Method::Get, path)
    }

    pub fn post(collaborator: Collaborator, path: impl Into<String>) -> Self {
        Self::new(collaborator, Method::Post, path)
    }

    pub fn delete(collaborator: Collaborator, path: impl Into<String>) -> Self {
        Self::new(collaborator, Method::Delete, path)
    }

    pub fn authed(mut self) -> Self {
        self.needs_auth = true;
        self
    }

    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    pub fn json<T: Serialize>(mut self, body: &T) -> Result<Self, Failure> {
        let value = serde_json::to_value(body).map_err(|e| Failure::ValidationError {
            message: format!("Could not encode request body: {}", e),
        })?;
        self.body = Body::Json(value);
        Ok(self)
    }

    pub fn form(mut self, fields: &[(&str, &str)]) -> Self {
        self.body = Body::Form(
            fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        );
        self
    }
}

/// What actually goes over the wire
#[derive(Debug, Clone)]
pub struct WireRequest {
    pub seq: u64,
    pub method: Method,
    pub url: Url,
    pub bearer: Option<SecretString>,
    pub body: Body,
}

#[derive(Debug, Clone)]
pub struct WireResponse {
    pub status: u16,
    pub body: String,
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct TransportError {
    pub message: String,
}

/// HTTP seam. `HttpTransport` is the real one; tests script their own.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: WireRequest) -> Result<WireResponse, TransportError>;
}

/// Successful response with its call's sequence number
#[derive(Debug, Clone)]
pub struct Response {
    pub seq: u64,
    pub status: u16,
    pub body: serde_json::Value,
}

impl Response {
    /// Decode against an explicit schema. A mismatch is a `ValidationError`.
    pub fn json<T: DeserializeOwned>(self) -> Result<T, Failure> {
        serde_json::from_value(self.body).map_err(|e| Failure::ValidationError {
            message: format!("Malformed response: {}", e),
        })
    }
}

/// Client-observable failure classes
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Failure {
    #[error("Network error: {message}")]
    NetworkError { message: String },

    /// `session_ended` is set only when this 401 cleared the session that was
    /// current when the call went out.
    #[error("Not authenticated: {message}")]
    Unauthenticated { message: String, session_ended: bool },

    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Invalid request: {message}")]
    ValidationError { message: String },

    #[error("Server error ({status}): {message}")]
    ServerError { status: u16, message: String },

    #[error("Unexpected response ({status}): {message}")]
    Unknown { status: u16, message: String },
}

impl Failure {
    /// Classify a non-2xx response.
    pub fn classify(status: u16, body: &str) -> Self {
        let parsed: Option<serde_json::Value> = serde_json::from_str(body).ok();
        let structured = matches!(parsed, Some(serde_json::Value::Object(_)));
        let message = parsed
            .as_ref()
            .and_then(extract_detail)
            .unwrap_or_else(|| fallback_message(status, body));

        match status {
            401 => Failure::Unauthenticated {
                message,
                session_ended: false,
            },
            403 => Failure::Forbidden { message },
            404 => Failure::NotFound { message },
            400..=499 if structured => Failure::ValidationError { message },
            500..=599 => Failure::ServerError { status, message },
            _ => Failure::Unknown { status, message },
        }
    }

    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, Failure::Unauthenticated { .. })
    }

    /// True when this failure is what signed the user out.
    pub fn ended_session(&self) -> bool {
        matches!(
            self,
            Failure::Unauthenticated {
                session_ended: true,
                ..
            }
        )
    }

    /// The server-provided detail, without the class prefix.
    pub fn message(&self) -> &str {
        match self {
            Failure::NetworkError { message }
            | Failure::Unauthenticated { message, .. }
            | Failure::Forbidden { message }
            | Failure::NotFound { message }
            | Failure::ValidationError { message }
            | Failure::ServerError { message, .. }
            | Failure::Unknown { message, .. } => message,
        }
    }
}

/// FastAPI puts the reason in `detail`, either a string or a list of `{msg}`.
fn extract_detail(value: &serde_json::Value) -> Option<String> {
    match value.get("detail")? {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Array(items) => {
            let msgs: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(|m| m.as_str()))
                .collect();
            if msgs.is_empty() {
                None
            } else {
                Some(msgs.join("; "))
            }
        }
        other => Some(other.to_string()),
    }
}

fn fallback_message(status: u16, body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        format!("HTTP {}", status)
    } else {
        trimmed.chars().take(200).collect()
    }
}

/// Resolved base URL (including the API prefix) per collaborator
#[derive(Debug, Clone)]
pub struct ServiceUrls {
    auth: Url,
    recommender: Url,
    analytics: Url,
    playlist: Url,
}

impl ServiceUrls {
    pub fn from_config(services: &ServicesConfig) -> AppResult<Self> {
        let resolve = |collaborator: Collaborator| -> AppResult<Url> {
            let base = services.base_for(collaborator);
            let joined = format!(
                "{}/{}",
                base.trim_end_matches('/'),
                services.api_prefix.trim_matches('/')
            );
            Url::parse(joined.trim_end_matches('/')).map_err(|e| {
                VibeError::Config(format!("Invalid {} service URL '{}': {}", collaborator, base, e))
            })
        };

        Ok(Self {
            auth: resolve(Collaborator::Auth)?,
            recommender: resolve(Collaborator::Recommender)?,
            analytics: resolve(Collaborator::Analytics)?,
            playlist: resolve(Collaborator::Playlist)?,
        })
    }

    pub fn base(&self, collaborator: Collaborator) -> &Url {
        match collaborator {
            Collaborator::Auth => &self.auth,
            Collaborator::Recommender => &self.recommender,
            Collaborator::Analytics => &self.analytics,
            Collaborator::Playlist => &self.playlist,
        }
    }

    pub fn url_for(&self, call: &Call) -> Result<Url, Failure> {
        let base = self.base(call.collaborator);
        let raw = format!("{}{}", base.as_str().trim_end_matches('/'), call.path);
        let mut url = Url::parse(&raw).map_err(|e| Failure::Unknown {
            status: 0,
            message: format!("Bad URL '{}': {}", raw, e),
        })?;
        if !call.query.is_empty() {
            url.query_pairs_mut().extend_pairs(call.query.iter());
        }
        Ok(url)
    }
}

pub struct RequestGateway {
    services: ServiceUrls,
    transport: Arc<dyn Transport>,
    session: SessionStore,
    seq: AtomicU64,
}

impl RequestGateway {
    pub fn new(services: ServiceUrls, transport: Arc<dyn Transport>, session: SessionStore) -> Self {
        Self {
            services,
            transport,
            session,
            seq: AtomicU64::new(0),
        }
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Sequence number of the most recent call
    pub fn last_seq(&self) -> u64 {
        self.seq.load(Ordering::SeqCst)
    }

    pub async fn call(&self, call: Call) -> Result<Response, Failure> {
        let bearer = self.session.token();
        if call.needs_auth && bearer.is_none() {
            tracing::debug!(
                collaborator = %call.collaborator,
                path = %call.path,
                "Refusing authenticated call without a session"
            );
            return Err(Failure::Unauthenticated {
                message: "No active session".to_string(),
                session_ended: false,
            });
        }

        let seq = self.seq.fetch_add(1, Ordering::SeqCst) + 1;
        let url = self.services.url_for(&call)?;
        tracing::debug!(
            seq,
            collaborator = %call.collaborator,
            method = call.method.as_str(),
            path = %call.path,
            "Gateway call"
        );

        let request = WireRequest {
            seq,
            method: call.method,
            url,
            bearer: bearer.clone(),
            body: call.body,
        };

        let response = match self.transport.send(request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!(seq, "Gateway call failed: {}", e);
                return Err(Failure::NetworkError { message: e.message });
            }
        };
        tracing::debug!(seq, status = response.status, "Gateway response");

        if (200..300).contains(&response.status) {
            let body = if response.body.trim().is_empty() {
                serde_json::Value::Null
            } else {
                serde_json::from_str(&response.body).map_err(|e| Failure::ValidationError {
                    message: format!("Malformed response: {}", e),
                })?
            };
            return Ok(Response {
                seq,
                status: response.status,
                body,
            });
        }

        let mut failure = Failure::classify(response.status, &response.body);
        if let Failure::Unauthenticated { session_ended, .. } = &mut failure {
            if call.needs_auth {
                *session_ended = bearer
                    .as_ref()
                    .is_some_and(|token| self.session.invalidate_token(token));
            }
        }
        Err(failure)
    }
}
