//! SessionStore - owner of the bearer token and the authenticated user
//!
//! Lifecycle: `Absent -> PendingValidation -> Valid -> Invalidated`.
//! The store is a cheap clonable handle; the controller writes it and the
//! request gateway reads the token and may invalidate it on a 401.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::api::User;
use crate::config::{SecretString, SessionManager};
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// No token at all
    Absent,
    /// Token stored, waiting for the who-am-I call
    PendingValidation,
    /// Token confirmed, user known
    Valid,
    /// Token dropped by logout or a 401
    Invalidated,
}

#[derive(Debug)]
struct SessionInner {
    status: SessionStatus,
    token: Option<SecretString>,
    user: Option<User>,
}

#[derive(Debug, Clone)]
pub struct SessionStore {
    inner: Arc<RwLock<SessionInner>>,
    persistence: SessionManager,
}

impl SessionStore {
    pub fn new(persistence: SessionManager) -> Self {
        Self {
            inner: Arc::new(RwLock::new(SessionInner {
                status: SessionStatus::Absent,
                token: None,
                user: None,
            })),
            persistence,
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, SessionInner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, SessionInner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Pick up a token persisted by a previous run. Returns true if one was found,
    /// in which case the store is pending validation.
    pub fn restore(&self) -> bool {
        match self.persistence.load() {
            Some(token) => {
                let mut inner = self.write();
                inner.token = Some(token);
                inner.user = None;
                inner.status = SessionStatus::PendingValidation;
                true
            }
            None => false,
        }
    }

    /// Store a fresh token. The caller must follow up with a who-am-I call.
    ///
    /// The in-memory session is updated even if persisting fails; the error is
    /// returned so the caller can report it.
    pub fn set_token(&self, token: SecretString) -> Result<()> {
        let persisted = self.persistence.save(&token);
        {
            let mut inner = self.write();
            inner.token = Some(token);
            inner.user = None;
            inner.status = SessionStatus::PendingValidation;
        }
        tracing::info!("Session token set, pending validation");
        persisted
    }

    /// Confirm the pending token with the user returned by who-am-I.
    /// Returns false if there is no token to confirm.
    pub fn validate(&self, user: User) -> bool {
        let mut inner = self.write();
        if inner.token.is_none() {
            return false;
        }
        tracing::info!(user_id = user.id, "Session validated for {}", user.email);
        inner.user = Some(user);
        inner.status = SessionStatus::Valid;
        true
    }

    /// Remove token and user. Idempotent.
    pub fn clear_session(&self) {
        {
            let mut inner = self.write();
            inner.token = None;
            inner.user = None;
            if inner.status != SessionStatus::Absent {
                inner.status = SessionStatus::Invalidated;
            }
        }
        if let Err(e) = self.persistence.clear() {
            tracing::warn!("Failed to remove persisted session: {}", e);
        }
    }

    /// Clear the session only if it still holds `token`.
    ///
    /// A 401 for a request sent with an old token must not log out a session
    /// that has since been replaced.
    pub fn invalidate_token(&self, token: &SecretString) -> bool {
        let matches = self.read().token.as_ref() == Some(token);
        if matches {
            tracing::info!("Session invalidated by 401");
            self.clear_session();
        }
        matches
    }

    pub fn current_user(&self) -> Option<User> {
        self.read().user.clone()
    }

    pub fn token(&self) -> Option<SecretString> {
        self.read().token.clone()
    }

    pub fn status(&self) -> SessionStatus {
        self.read().status
    }

    pub fn is_valid(&self) -> bool {
        self.status() == SessionStatus::Valid
    }
}
