// Session lifecycle dispatch
// Domain: restore, login, signup, who-am-I validation, logout, session loss

use crate::action::{Action, Loaded};
use crate::gateway::Failure;

use super::super::{App, Mode, Slot};

/// User-facing text for a failed credential exchange.
pub(crate) fn login_failure_message(failure: &Failure) -> String {
    match failure {
        Failure::Unauthenticated { .. } => "Login failed: Invalid credentials".to_string(),
        other => format!("Login failed: {}", other),
    }
}

impl App {
    pub(super) fn dispatch_session(&mut self, action: Action) {
        match action {
            Action::RestoreSession => {
                if self.session.restore() {
                    tracing::info!("Found a saved session, validating");
                    self.request_whoami();
                } else {
                    tracing::debug!("No saved session");
                }
            }
            Action::Login { email, password } => {
                if email.trim().is_empty() || password.is_empty() {
                    self.set_error("Email and password are required");
                    return;
                }
                self.state.error = None;
                let backend = self.backend.clone();
                self.request(Slot::Auth, async move {
                    Loaded::LoggedIn(backend.login(email.trim(), &password).await)
                });
            }
            Action::Signup { email, password } => {
                if email.trim().is_empty() || password.is_empty() {
                    self.set_error("Email and password are required");
                    return;
                }
                self.state.error = None;
                let backend = self.backend.clone();
                self.request(Slot::Auth, async move {
                    let email = email.trim();
                    let result = match backend.signup(email, &password).await {
                        Ok(user) => {
                            tracing::info!(user_id = user.id, "Account created, logging in");
                            backend.login(email, &password).await
                        }
                        Err(e) => Err(e),
                    };
                    Loaded::SignedUp(result)
                });
            }
            Action::Logout => {
                self.session.clear_session();
                self.forget_inflight();
                self.state.reset();
                self.state.notice = Some("Logged out".to_string());
                tracing::info!("Logged out");
            }
            _ => {}
        }
    }

    fn request_whoami(&mut self) {
        let backend = self.backend.clone();
        self.request(Slot::Auth, async move { Loaded::Whoami(backend.me().await) });
    }

    pub(super) fn complete_session(&mut self, loaded: Loaded) {
        match loaded {
            Loaded::LoggedIn(Ok(token)) | Loaded::SignedUp(Ok(token)) => {
                if let Err(e) = self.session.set_token(token) {
                    tracing::warn!("Session not persisted: {}", e);
                }
                self.request_whoami();
            }
            Loaded::LoggedIn(Err(failure)) => self.set_error(login_failure_message(&failure)),
            Loaded::SignedUp(Err(failure)) => self.set_error(format!("Signup failed: {}", failure)),
            Loaded::Whoami(Ok(user)) => {
                if self.session.validate(user) {
                    self.state.clear_for_switch();
                    self.state.mode = Mode::Search;
                } else {
                    tracing::warn!("Who-am-I answered after the session was cleared");
                }
            }
            Loaded::Whoami(Err(failure)) => {
                self.session.clear_session();
                self.set_error(format!("Could not verify session: {}", failure));
            }
            _ => {}
        }
    }

    /// A 401 ended the session: back to the signed-out view with nothing left over.
    pub(super) fn session_lost(&mut self) {
        tracing::info!(mode = %self.state.mode, "Session lost");
        self.session.clear_session();
        self.forget_inflight();
        self.state.reset();
        self.state.error = Some("Session expired. Please log in again.".to_string());
    }
}
