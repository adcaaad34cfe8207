//! Typed endpoint client over the request gateway.
//!
//! One `impl Backend` block per collaborator; every method builds a `Call`,
//! sends it through the gateway, and decodes against an explicit schema.

mod analytics;
mod auth;
mod playlist;
mod recommender;
mod types;

pub use playlist::PlaylistSeed;
pub use types::*;

use std::sync::Arc;

use crate::gateway::RequestGateway;

#[derive(Clone)]
pub struct Backend {
    gateway: Arc<RequestGateway>,
}

impl Backend {
    pub fn new(gateway: Arc<RequestGateway>) -> Self {
        Self { gateway }
    }

    pub fn gateway(&self) -> &RequestGateway {
        &self.gateway
    }
}

/// Encode one path segment (genre and mood names may hold spaces or slashes).
pub(crate) fn segment(raw: &str) -> String {
    urlencoding::encode(raw).into_owned()
}
