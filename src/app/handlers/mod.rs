// Action dispatch handlers, grouped by domain

mod recommend;
mod session;
mod views;
mod playlist;

#[cfg(test)]
mod tests;

use crate::action::{Action, Loaded};
use crate::error::Result;

use super::{App, Mode, Ticket};

impl App {
    /// Main dispatch router. The single exhaustive match over `Action`.
    pub fn dispatch(&mut self, action: Action) -> Result<()> {
        if self.state.mode == Mode::Unauthenticated && !Self::allowed_signed_out(&action) {
            self.set_error("Please log in first");
            return Ok(());
        }

        match action {
            Action::Noop | Action::Help | Action::Show => {}
            Action::Quit => self.should_quit = true,

            // 1. Session lifecycle
            Action::RestoreSession | Action::Login { .. } | Action::Signup { .. } | Action::Logout => {
                self.dispatch_session(action)
            }

            // 2. Recommendation triggers
            Action::Search(_)
            | Action::SelectTrack(_)
            | Action::SelectMood(_)
            | Action::SetVibe { .. }
            | Action::VibeCheck
            | Action::SelectGenre(_)
            | Action::PersonalizedDiscovery
            | Action::GenerateWorkout { .. }
            | Action::ResetWorkout
            | Action::PlayTrack(_) => self.dispatch_recommend(action),

            // 3. Modes and mode-seeded views
            Action::SwitchMode(_)
            | Action::Classify
            | Action::RefreshPreferences
            | Action::SavePreference(_)
            | Action::ApplyPreference(_)
            | Action::DeletePreference(_) => self.dispatch_views(action),

            // 4. Playlists
            Action::SelectPlaylist(_)
            | Action::SavePlaylist(_)
            | Action::AddToPlaylist { .. }
            | Action::CreateAndAdd { .. } => self.dispatch_playlist(action),

            // 5. Completions
            Action::Loaded(ticket, loaded) => self.dispatch_loaded(ticket, loaded),
            Action::PlayRecorded { track_id, result } => match result {
                Ok(()) => tracing::debug!(%track_id, "Play recorded"),
                Err(failure) if failure.ended_session() => {
                    self.session_lost();
                }
                Err(failure) => tracing::warn!(%track_id, "Play event not recorded: {}", failure),
            },
        }
        Ok(())
    }

    fn allowed_signed_out(action: &Action) -> bool {
        matches!(
            action,
            Action::Noop
                | Action::Help
                | Action::Show
                | Action::Quit
                | Action::RestoreSession
                | Action::Login { .. }
                | Action::Signup { .. }
                | Action::Logout
                | Action::Loaded(..)
                | Action::PlayRecorded { .. }
        )
    }

    /// Gate every completion: session loss first, then staleness.
    fn dispatch_loaded(&mut self, ticket: Ticket, loaded: Loaded) {
        if loaded.ended_session() {
            self.session_lost();
            return;
        }

        if !self.is_current(&ticket) {
            tracing::warn!(
                ticket = ticket.id,
                slot = ?ticket.slot,
                issued_in = %ticket.mode,
                now_in = %self.state.mode,
                "Discarding stale response"
            );
            return;
        }
        self.inflight.remove(&ticket.slot);

        match loaded {
            Loaded::LoggedIn(_) | Loaded::SignedUp(_) | Loaded::Whoami(_) => self.complete_session(loaded),

            Loaded::Tracks { .. } | Loaded::Genre { .. } | Loaded::Workout(_) => self.complete_recommend(loaded),

            Loaded::Genres(_)
            | Loaded::Summary(_)
            | Loaded::Trends(_)
            | Loaded::Prediction(_)
            | Loaded::Preferences(_)
            | Loaded::PreferenceSaved(_)
            | Loaded::PreferenceDeleted { .. } => self.complete_views(loaded),

            Loaded::Playlists(_)
            | Loaded::PlaylistDetail(_)
            | Loaded::PlaylistCreated(_)
            | Loaded::TrackAdded { .. } => self.complete_playlist(loaded),
        }
    }
}
