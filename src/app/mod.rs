// App module - the orchestration controller, split into submodules
// - mod.rs: App struct, constructors, ticketing, accessors
// - state.rs: ViewState container (modes, working set, caches)
// - event_loop.rs: REPL run() loop over stdin and completions
// - handlers/: action dispatch grouped by domain

mod event_loop;
mod handlers;
mod state;

pub use state::{Mode, ResultList, ResultOrigin, Slot, Ticket, ViewState};

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::action::{Action, Loaded, TrackRef};
use crate::api::{Backend, User};
use crate::config::{AppConfig, LimitsConfig};
use crate::error::{Result, VibeError};
use crate::gateway::{HttpTransport, RequestGateway, ServiceUrls, Transport};
use crate::session::SessionStore;

pub struct App {
    state: ViewState,
    session: SessionStore,
    backend: Backend,
    limits: LimitsConfig,
    event_tx: mpsc::UnboundedSender<Action>,
    event_rx: mpsc::UnboundedReceiver<Action>,
    next_ticket: u64,
    /// Newest ticket id per slot; a slot is absent once its request settled
    inflight: HashMap<Slot, u64>,
    /// Spawned tasks whose completion has not been received yet
    outstanding: usize,
    should_quit: bool,
}

impl App {
    pub fn new(config: &AppConfig, session: SessionStore) -> Result<Self> {
        let transport = HttpTransport::new(config.general.request_timeout_secs)?;
        Self::with_transport(config, Arc::new(transport), session)
    }

    pub fn with_transport(
        config: &AppConfig,
        transport: Arc<dyn Transport>,
        session: SessionStore,
    ) -> Result<Self> {
        let services = ServiceUrls::from_config(&config.services)?;
        for collaborator in crate::gateway::Collaborator::ALL {
            tracing::debug!(%collaborator, base = %services.base(collaborator), "Service address");
        }
        let gateway = RequestGateway::new(services, transport, session.clone());
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        Ok(Self {
            state: ViewState::default(),
            session,
            backend: Backend::new(Arc::new(gateway)),
            limits: config.limits.clone(),
            event_tx,
            event_rx,
            next_ticket: 0,
            inflight: HashMap::new(),
            outstanding: 0,
            should_quit: false,
        })
    }

    // ---- Accessors ----

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn mode(&self) -> Mode {
        self.state.mode
    }

    pub fn current_user(&self) -> Option<User> {
        self.session.current_user()
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// True while any current ticketed request is outstanding.
    pub fn is_loading(&self) -> bool {
        !self.inflight.is_empty()
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    // ---- Tickets and tasks ----

    fn issue_ticket(&mut self, slot: Slot) -> Ticket {
        self.next_ticket += 1;
        self.inflight.insert(slot, self.next_ticket);
        Ticket {
            id: self.next_ticket,
            mode: self.state.mode,
            slot,
        }
    }

    /// A completion applies only if its mode is still active and no newer
    /// request took its slot.
    fn is_current(&self, ticket: &Ticket) -> bool {
        ticket.mode == self.state.mode && self.inflight.get(&ticket.slot) == Some(&ticket.id)
    }

    fn spawn<F>(&mut self, task: F)
    where
        F: Future<Output = Action> + Send + 'static,
    {
        self.outstanding += 1;
        let tx = self.event_tx.clone();
        tokio::spawn(async move {
            let action = task.await;
            if tx.send(action).is_err() {
                tracing::debug!("Controller gone, dropping completion");
            }
        });
    }

    /// Run `task` in the background under a fresh ticket for `slot`.
    fn request<F>(&mut self, slot: Slot, task: F)
    where
        F: Future<Output = Loaded> + Send + 'static,
    {
        let ticket = self.issue_ticket(slot);
        tracing::debug!(ticket = ticket.id, ?slot, mode = %ticket.mode, "Request issued");
        self.spawn(async move { Action::Loaded(ticket, task.await) });
    }

    /// Drop every pending ticket so late responses are discarded.
    fn forget_inflight(&mut self) {
        self.inflight.clear();
    }

    // ---- Completions ----

    /// Apply one finished background task.
    pub fn complete(&mut self, action: Action) -> Result<()> {
        self.outstanding = self.outstanding.saturating_sub(1);
        self.dispatch(action)
    }

    /// Wait for and apply the next completion.
    pub async fn pump_one(&mut self) -> Result<()> {
        let action = self.event_rx.recv().await.ok_or(VibeError::ChannelClosed)?;
        self.complete(action)
    }

    /// Apply completions until no spawned task is outstanding.
    pub async fn settle(&mut self) -> Result<()> {
        while self.outstanding > 0 {
            self.pump_one().await?;
        }
        Ok(())
    }

    // ---- Helpers shared by handlers ----

    /// Resolve a track reference to `(track_id, display name)`.
    fn resolve_track(&self, track: &TrackRef, prefer_side: bool) -> Option<(String, String)> {
        match track {
            TrackRef::Index(n) => {
                let list = self.state.pick_list(prefer_side);
                n.checked_sub(1)
                    .and_then(|i| list.get(i))
                    .map(|t| (t.track.track_id.clone(), t.track.track_name.clone()))
            }
            TrackRef::Id(id) => Some(
                self.state
                    .find_track(id)
                    .map(|t| (t.track.track_id.clone(), t.track.track_name.clone()))
                    .unwrap_or_else(|| (id.clone(), id.clone())),
            ),
        }
    }

    fn set_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::info!(mode = %self.state.mode, "{}", message);
        self.state.error = Some(message);
    }
}
