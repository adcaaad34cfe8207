// Mode transitions and mode-seeded views
// Domain: switch_mode reset rules, default fetches, analytics, trends, classify, preference profiles

use crate::action::{Action, Loaded};
use crate::api::NewPreferenceProfile;

use super::super::{App, Mode, Slot};

impl App {
    pub(super) fn dispatch_views(&mut self, action: Action) {
        match action {
            Action::SwitchMode(next) => self.switch_mode(next),
            Action::Classify => {
                self.ensure_mode(Mode::Classify);
                if let Err(message) = self.state.vibe.validate() {
                    self.set_error(message);
                    return;
                }
                self.state.prediction = None;
                self.state.error = None;
                let backend = self.backend.clone();
                let vibe = self.state.vibe.clone();
                self.request(Slot::Prediction, async move {
                    Loaded::Prediction(backend.classify(&vibe).await)
                });
            }
            Action::RefreshPreferences => self.request_preferences(),
            Action::SavePreference(name) => {
                let name = name.trim().to_string();
                if name.is_empty() {
                    self.set_error("Profile name is required");
                    return;
                }
                if let Err(message) = self.state.vibe.validate() {
                    self.set_error(message);
                    return;
                }
                let backend = self.backend.clone();
                let profile = NewPreferenceProfile::from_vibe(name, self.state.vibe.clone());
                self.request(Slot::Preferences, async move {
                    Loaded::PreferenceSaved(backend.save_preference(&profile).await)
                });
            }
            Action::ApplyPreference(id) => {
                let profile = self
                    .state
                    .preferences
                    .as_ref()
                    .and_then(|profiles| profiles.iter().find(|p| p.id == id))
                    .cloned();
                match profile {
                    Some(profile) => {
                        self.state.vibe = profile.vibe;
                        self.state.error = None;
                        self.state.notice = Some(format!("Applied profile '{}'", profile.name));
                    }
                    None => self.set_error(format!("No saved profile with id {}", id)),
                }
            }
            Action::DeletePreference(id) => {
                let backend = self.backend.clone();
                self.request(Slot::Preferences, async move {
                    Loaded::PreferenceDeleted {
                        id,
                        result: backend.delete_preference(id).await,
                    }
                });
            }
            _ => {}
        }
    }

    /// Leave the current mode: selection, results, error and pending
    /// requests all go, then the new mode seeds its own data.
    pub(crate) fn switch_mode(&mut self, next: Mode) {
        if next == Mode::Unauthenticated {
            self.set_error("Use logout to sign out");
            return;
        }
        let from = self.state.mode;
        self.state.clear_for_switch();
        self.forget_inflight();
        self.state.mode = next;
        tracing::info!(%from, to = %next, "Mode switched");

        match next {
            Mode::Genres if self.state.genres.is_none() => {
                let backend = self.backend.clone();
                self.request(Slot::Genres, async move { Loaded::Genres(backend.genres().await) });
            }
            Mode::Discovery => self.request_personalized(),
            Mode::Analytics => {
                let backend = self.backend.clone();
                self.request(Slot::Summary, async move { Loaded::Summary(backend.summary().await) });
            }
            Mode::Trends if self.state.trends.is_none() => {
                let backend = self.backend.clone();
                self.request(Slot::Trends, async move { Loaded::Trends(backend.trends().await) });
            }
            Mode::Playlists => self.request_playlists(),
            Mode::Vibe if self.state.preferences.is_none() => self.request_preferences(),
            _ => {}
        }
    }

    /// Switch only if not already there, so a trigger keeps its mode's state.
    pub(crate) fn ensure_mode(&mut self, mode: Mode) {
        if self.state.mode != mode {
            self.switch_mode(mode);
        }
    }

    fn request_preferences(&mut self) {
        let backend = self.backend.clone();
        self.request(Slot::Preferences, async move {
            Loaded::Preferences(backend.preferences().await)
        });
    }

    pub(super) fn complete_views(&mut self, loaded: Loaded) {
        match loaded {
            Loaded::Genres(result) => match result {
                Ok(genres) => {
                    tracing::info!(count = genres.len(), "Genre list cached");
                    self.state.genres = Some(genres);
                }
                Err(failure) => self.set_error(format!("Could not load genres: {}", failure)),
            },
            Loaded::Summary(result) => match result {
                Ok(summary) => self.state.summary = Some(summary),
                Err(failure) => self.set_error(format!("Could not load analytics: {}", failure)),
            },
            Loaded::Trends(result) => match result {
                Ok(trends) => self.state.trends = Some(trends),
                Err(failure) => self.set_error(format!("Could not load trends: {}", failure)),
            },
            Loaded::Prediction(result) => match result {
                Ok(prediction) => {
                    tracing::info!(genre = %prediction.top_prediction.genre, "Vibe classified");
                    self.state.prediction = Some(prediction);
                }
                Err(failure) => self.set_error(format!("Classification failed: {}", failure)),
            },
            Loaded::Preferences(result) => match result {
                Ok(profiles) => self.state.preferences = Some(profiles),
                Err(failure) => self.set_error(format!("Could not load saved profiles: {}", failure)),
            },
            Loaded::PreferenceSaved(result) => match result {
                Ok(profile) => {
                    self.state.notice = Some(format!("Saved profile '{}'", profile.name));
                    self.state.preferences.get_or_insert_with(Vec::new).push(profile);
                }
                Err(failure) => self.set_error(format!("Could not save profile: {}", failure)),
            },
            Loaded::PreferenceDeleted { id, result } => match result {
                Ok(()) => {
                    if let Some(profiles) = self.state.preferences.as_mut() {
                        profiles.retain(|p| p.id != id);
                    }
                    self.state.notice = Some(format!("Deleted profile {}", id));
                }
                Err(failure) => self.set_error(format!("Could not delete profile: {}", failure)),
            },
            _ => {}
        }
    }
}
