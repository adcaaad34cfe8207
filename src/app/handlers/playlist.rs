// Playlist composition and the playlists view
// Domain: save the active result list, append a track, create-and-append, list and detail

use crate::action::{Action, Loaded, TrackRef};
use crate::api::{CustomPlaylistRequest, PlaylistSeed};

use super::super::{App, Mode, ResultList, ResultOrigin, Slot};

/// How the active result list becomes a playlist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaylistPlan {
    /// The service regenerates matches from the seed.
    FromSeed { name: String, seed: PlaylistSeed, limit: u32 },
    /// The visible list is frozen as is.
    Custom(CustomPlaylistRequest),
}

/// Lists that came from a mood or a single track are regenerated from that
/// seed; every other list is saved exactly as shown.
pub fn plan_playlist(results: &ResultList, name: Option<&str>, limit: u32) -> Result<PlaylistPlan, String> {
    if results.is_empty() {
        return Err("Nothing to save yet. Get some recommendations first.".to_string());
    }
    let name = match name.map(str::trim).filter(|n| !n.is_empty()) {
        Some(name) => name.to_string(),
        None => default_name(&results.origin),
    };

    Ok(match &results.origin {
        ResultOrigin::Mood { mood } => PlaylistPlan::FromSeed {
            name,
            seed: PlaylistSeed::Mood(*mood),
            limit,
        },
        ResultOrigin::Similar { seed_track_id, .. } => PlaylistPlan::FromSeed {
            name,
            seed: PlaylistSeed::Track(seed_track_id.clone()),
            limit,
        },
        _ => PlaylistPlan::Custom(CustomPlaylistRequest {
            name,
            track_ids: results.track_ids(),
        }),
    })
}

fn default_name(origin: &ResultOrigin) -> String {
    match origin {
        ResultOrigin::Mood { mood } => {
            let mood = mood.as_str();
            let mut chars = mood.chars();
            match chars.next() {
                Some(first) => format!("{}{} Mix", first.to_ascii_uppercase(), chars.as_str()),
                None => "Mood Mix".to_string(),
            }
        }
        ResultOrigin::Similar { seed_name, .. } => format!("Similar to {}", seed_name),
        ResultOrigin::Search { query } => format!("Search: {}", query),
        ResultOrigin::Genre { genre } => format!("{} Picks", genre),
        ResultOrigin::Personalized => "Discover Weekly".to_string(),
        ResultOrigin::Workout => "Workout Mix".to_string(),
        ResultOrigin::Vibe | ResultOrigin::None => "Custom Vibe Mix".to_string(),
    }
}

impl App {
    pub(super) fn dispatch_playlist(&mut self, action: Action) {
        match action {
            Action::SelectPlaylist(id) => {
                self.ensure_mode(Mode::Playlists);
                self.state.selected_playlist = Some(id);
                self.state.playlist_detail = None;
                self.state.error = None;
                let backend = self.backend.clone();
                self.request(Slot::PlaylistDetail, async move {
                    Loaded::PlaylistDetail(backend.playlist(id).await)
                });
            }
            Action::SavePlaylist(name) => {
                let plan = match plan_playlist(&self.state.results, name.as_deref(), self.limits.playlist) {
                    Ok(plan) => plan,
                    Err(message) => {
                        self.set_error(message);
                        return;
                    }
                };
                self.compose(plan);
            }
            Action::AddToPlaylist { playlist_id, track } => {
                let Some((track_id, _)) = self.resolve_playlist_track(&track) else {
                    return;
                };
                let backend = self.backend.clone();
                self.request(Slot::Composer, async move {
                    Loaded::TrackAdded {
                        playlist_id,
                        result: backend.add_track(playlist_id, &track_id).await,
                    }
                });
            }
            Action::CreateAndAdd { name, track } => {
                let name = name.trim().to_string();
                if name.is_empty() {
                    self.set_error("Playlist name is required");
                    return;
                }
                let Some((track_id, _)) = self.resolve_playlist_track(&track) else {
                    return;
                };
                self.compose(PlaylistPlan::Custom(CustomPlaylistRequest {
                    name,
                    track_ids: vec![track_id],
                }));
            }
            _ => {}
        }
    }

    fn resolve_playlist_track(&mut self, track: &TrackRef) -> Option<(String, String)> {
        let resolved = match (track, &self.state.playlist_detail) {
            // In the playlists view positions count into the open playlist.
            (TrackRef::Index(n), Some(detail)) if self.state.results.is_empty() => n
                .checked_sub(1)
                .and_then(|i| detail.tracks.get(i))
                .map(|t| (t.track_id.clone(), t.track_name.clone())),
            _ => self.resolve_track(track, false),
        };
        if resolved.is_none() {
            self.set_error(format!("No track at position {}", track_label(track)));
        }
        resolved
    }

    fn compose(&mut self, plan: PlaylistPlan) {
        self.state.error = None;
        let backend = self.backend.clone();
        match plan {
            PlaylistPlan::FromSeed { name, seed, limit } => {
                tracing::info!(%name, ?seed, "Generating playlist from seed");
                self.request(Slot::Composer, async move {
                    Loaded::PlaylistCreated(backend.generate_from_seed(&name, &seed, limit).await)
                });
            }
            PlaylistPlan::Custom(request) => {
                tracing::info!(name = %request.name, tracks = request.track_ids.len(), "Saving custom playlist");
                self.request(Slot::Composer, async move {
                    Loaded::PlaylistCreated(backend.generate_custom(&request).await)
                });
            }
        }
    }

    pub(super) fn request_playlists(&mut self) {
        let backend = self.backend.clone();
        self.request(Slot::Playlists, async move { Loaded::Playlists(backend.playlists().await) });
    }

    pub(super) fn complete_playlist(&mut self, loaded: Loaded) {
        match loaded {
            Loaded::Playlists(result) => match result {
                Ok(playlists) => self.state.playlists = playlists,
                Err(failure) => self.set_error(format!("Could not load playlists: {}", failure)),
            },
            Loaded::PlaylistDetail(result) => match result {
                Ok(detail) => self.state.playlist_detail = Some(detail),
                Err(failure) => self.set_error(format!("Could not open playlist: {}", failure)),
            },
            Loaded::PlaylistCreated(result) => match result {
                Ok(created) => {
                    tracing::info!(id = created.playlist_id, "Playlist created");
                    self.state.notice = Some(format!(
                        "Created playlist '{}' with {} tracks",
                        created.name,
                        created.len()
                    ));
                    if self.state.mode == Mode::Playlists {
                        self.request_playlists();
                    }
                }
                Err(failure) => self.set_error(format!("Could not create playlist: {}", failure)),
            },
            Loaded::TrackAdded { playlist_id, result } => match result {
                Ok(()) => {
                    self.state.notice = Some(format!("Added to playlist {}", playlist_id));
                    if self.state.mode == Mode::Playlists {
                        self.request_playlists();
                        if self.state.selected_playlist == Some(playlist_id) {
                            let backend = self.backend.clone();
                            self.request(Slot::PlaylistDetail, async move {
                                Loaded::PlaylistDetail(backend.playlist(playlist_id).await)
                            });
                        }
                    }
                }
                Err(failure) => self.set_error(format!("Could not add track: {}", failure)),
            },
            _ => {}
        }
    }
}

fn track_label(track: &TrackRef) -> String {
    match track {
        TrackRef::Index(n) => n.to_string(),
        TrackRef::Id(id) => id.clone(),
    }
}
