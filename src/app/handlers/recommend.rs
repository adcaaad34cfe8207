// Recommendation triggers and their completions
// Every trigger clears the prior result list and error, issues its calls under
// one ticket, and stores either the normalized track list or a scoped error.

use crate::action::{Action, Loaded, TrackRef};
use crate::api::{ScoredTrack, WorkoutSpec};

use super::super::{App, Mode, ResultList, ResultOrigin, Slot};

impl App {
    pub(super) fn dispatch_recommend(&mut self, action: Action) {
        match action {
            Action::Search(query) => self.search(query),
            Action::SelectTrack(track) => self.select_track(&track),
            Action::SelectMood(mood) => {
                self.ensure_mode(Mode::Mood);
                self.state.selected_mood = Some(mood);
                self.state.begin_results();
                let backend = self.backend.clone();
                let limit = self.limits.recommendations;
                self.request(Slot::Results, async move {
                    Loaded::Tracks {
                        origin: ResultOrigin::Mood { mood },
                        result: backend.by_mood(mood, limit).await,
                    }
                });
            }
            Action::SetVibe { feature, value } => match self.state.vibe.set(&feature, value) {
                Ok(()) => self.state.error = None,
                Err(message) => self.set_error(message),
            },
            Action::VibeCheck => {
                self.ensure_mode(Mode::Vibe);
                if let Err(message) = self.state.vibe.validate() {
                    self.set_error(message);
                    return;
                }
                self.state.begin_results();
                let backend = self.backend.clone();
                let vibe = self.state.vibe.clone();
                let limit = self.limits.recommendations;
                self.request(Slot::Results, async move {
                    Loaded::Tracks {
                        origin: ResultOrigin::Vibe,
                        result: backend.by_vector(&vibe, limit).await,
                    }
                });
            }
            Action::SelectGenre(genre) => self.select_genre(genre),
            Action::PersonalizedDiscovery => {
                if self.state.mode == Mode::Discovery {
                    self.request_personalized();
                } else {
                    // Entering discovery requests personalized picks by itself.
                    self.switch_mode(Mode::Discovery);
                }
            }
            Action::GenerateWorkout {
                duration_minutes,
                intensity,
            } => {
                self.ensure_mode(Mode::Workout);
                let spec = match WorkoutSpec::new(duration_minutes, intensity) {
                    Ok(spec) => spec,
                    Err(message) => {
                        self.set_error(message);
                        return;
                    }
                };
                self.state.workout = spec;
                self.state.workout_result = None;
                self.state.begin_results();
                let backend = self.backend.clone();
                self.request(Slot::Results, async move { Loaded::Workout(backend.workout(&spec).await) });
            }
            Action::ResetWorkout => {
                self.inflight.remove(&Slot::Results);
                self.state.workout_result = None;
                self.state.begin_results();
            }
            Action::PlayTrack(track) => self.play(&track),
            _ => {}
        }
    }

    fn search(&mut self, query: String) {
        let query = query.trim().to_string();
        if query.is_empty() {
            return;
        }
        self.ensure_mode(Mode::Search);
        self.state.query = query.clone();
        self.state.selected_track = None;
        self.state.search_results.clear();
        self.state.begin_results();

        let backend = self.backend.clone();
        let limit = self.limits.search;
        self.request(Slot::Results, async move {
            let result = backend.search(&query, limit).await;
            Loaded::Tracks {
                origin: ResultOrigin::Search { query },
                result,
            }
        });
    }

    fn select_track(&mut self, track: &TrackRef) {
        // In search mode positions count into the search list shown beside the results.
        let prefer_side = self.state.mode == Mode::Search;
        let Some((track_id, name)) = self.resolve_track(track, prefer_side) else {
            self.set_error(no_such_track(track));
            return;
        };
        self.state.selected_track = Some(track_id.clone());
        self.state.begin_results();

        let backend = self.backend.clone();
        let limit = self.limits.recommendations;
        self.request(Slot::Results, async move {
            let result = backend.similar_to(&track_id, limit).await;
            Loaded::Tracks {
                origin: ResultOrigin::Similar {
                    seed_track_id: track_id,
                    seed_name: name,
                },
                result,
            }
        });
    }

    fn select_genre(&mut self, genre: String) {
        let genre = genre.trim().to_string();
        if genre.is_empty() {
            return;
        }
        self.ensure_mode(Mode::Genres);
        self.state.selected_genre = Some(genre.clone());
        self.state.genre_stats = None;
        self.state.begin_results();

        let backend = self.backend.clone();
        let limit = self.limits.recommendations;
        self.request(Slot::Results, async move {
            let (tracks, stats) = tokio::join!(backend.tracks_of(&genre, limit), backend.genre_stats(&genre));
            Loaded::Genre { genre, tracks, stats }
        });
    }

    pub(super) fn request_personalized(&mut self) {
        if !self.session.is_valid() {
            self.set_error("Log in to get personalized recommendations");
            return;
        }
        self.state.begin_results();
        let backend = self.backend.clone();
        let limit = self.limits.recommendations;
        self.request(Slot::Results, async move {
            Loaded::Tracks {
                origin: ResultOrigin::Personalized,
                result: backend.personalized(limit).await,
            }
        });
    }

    /// Fire-and-forget play event. Only a lost session is ever surfaced.
    fn play(&mut self, track: &TrackRef) {
        let Some((track_id, name)) = self.resolve_track(track, false) else {
            self.set_error(no_such_track(track));
            return;
        };
        self.state.notice = Some(format!("Playing {}", name));
        let backend = self.backend.clone();
        self.spawn(async move {
            let result = backend.record_play(&track_id).await;
            Action::PlayRecorded { track_id, result }
        });
    }

    pub(super) fn complete_recommend(&mut self, loaded: Loaded) {
        match loaded {
            Loaded::Tracks { origin, result } => match result {
                Ok(tracks) => {
                    tracing::info!(origin = %origin.describe(), count = tracks.len(), "Results loaded");
                    if matches!(origin, ResultOrigin::Search { .. }) {
                        self.state.search_results = tracks.clone();
                    }
                    self.state.results = ResultList::new(origin, tracks);
                }
                Err(failure) => {
                    let scope = match &origin {
                        ResultOrigin::Search { .. } => "Search failed".to_string(),
                        ResultOrigin::Similar { seed_name, .. } => {
                            format!("Could not load tracks similar to {}", seed_name)
                        }
                        ResultOrigin::Mood { mood } => format!("Could not load {} recommendations", mood),
                        ResultOrigin::Vibe => "Vibe check failed".to_string(),
                        ResultOrigin::Personalized => "Could not load your recommendations".to_string(),
                        _ => "Could not load recommendations".to_string(),
                    };
                    self.set_error(format!("{}: {}", scope, failure));
                }
            },
            Loaded::Genre { genre, tracks, stats } => {
                match tracks {
                    Ok(tracks) => {
                        tracing::info!(%genre, count = tracks.len(), "Genre tracks loaded");
                        self.state.results = ResultList::new(ResultOrigin::Genre { genre: genre.clone() }, tracks);
                    }
                    Err(failure) => self.set_error(format!("Could not load {} tracks: {}", genre, failure)),
                }
                // Partial success: the stats panel is simply left out.
                match stats {
                    Ok(stats) => self.state.genre_stats = Some(stats),
                    Err(failure) => tracing::warn!(%genre, "Genre analytics unavailable: {}", failure),
                }
            }
            Loaded::Workout(result) => match result {
                Ok(workout) => {
                    tracing::info!(tracks = workout.tracks.len(), "Workout generated");
                    let tracks: Vec<ScoredTrack> = workout.tracks.iter().cloned().map(ScoredTrack::from).collect();
                    self.state.results = ResultList::new(ResultOrigin::Workout, tracks);
                    self.state.workout_result = Some(workout);
                }
                Err(failure) => self.set_error(format!("Workout generation failed: {}", failure)),
            },
            _ => {}
        }
    }
}

fn no_such_track(track: &TrackRef) -> String {
    match track {
        TrackRef::Index(n) => format!("No track at position {}", n),
        TrackRef::Id(id) => format!("Unknown track {}", id),
    }
}
