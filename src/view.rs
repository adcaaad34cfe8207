//! Plain-text rendering of the controller state for the REPL.

use std::fmt::Write as _;

use crate::api::{ScoredTrack, Track, User, VibeVector};
use crate::app::{Mode, ViewState};
use crate::workout;

/// Strong-match threshold for the "matches on" hint under a track.
const MATCH_THRESHOLD: f64 = 0.8;
const MATCH_HINTS: usize = 3;

/// Render the active mode. `loading` adds a pending marker instead of
/// an empty-state message.
pub fn render(state: &ViewState, user: Option<&User>, loading: bool) -> String {
    let mut out = String::new();
    header(&mut out, state, user);

    match state.mode {
        Mode::Unauthenticated => {
            let _ = writeln!(out, "Log in with 'login <email> <password>' or create an account with 'signup'.");
        }
        Mode::Search => {
            if !state.search_results.is_empty() {
                let _ = writeln!(out, "Search: \"{}\"", state.query);
                track_list(&mut out, &state.search_results);
            }
            if !state.results.is_empty() && state.selected_track.is_some() {
                let _ = writeln!(out, "\n{}", state.results.origin.describe());
                track_list(&mut out, &state.results.tracks);
            }
        }
        Mode::Mood => {
            if state.selected_mood.is_none() {
                let moods: Vec<&str> = crate::api::Mood::ALL.iter().map(|m| m.as_str()).collect();
                let _ = writeln!(out, "Moods: {}", moods.join(", "));
            }
            results(&mut out, state);
        }
        Mode::Vibe => {
            vibe(&mut out, &state.vibe);
            if let Some(profiles) = &state.preferences {
                if !profiles.is_empty() {
                    let _ = writeln!(out, "Saved profiles:");
                    for profile in profiles {
                        let _ = writeln!(out, "  [{}] {}", profile.id, profile.name);
                    }
                }
            }
            results(&mut out, state);
        }
        Mode::Genres => {
            match (&state.selected_genre, &state.genres) {
                (None, Some(genres)) => {
                    let _ = writeln!(out, "Genres ({}): {}", genres.len(), genres.join(", "));
                }
                (Some(genre), _) => {
                    let _ = writeln!(out, "Genre: {}", genre);
                    if let Some(stats) = &state.genre_stats {
                        let _ = writeln!(out, "  Average popularity: {:.1}", stats.popularity_stats.avg);
                        let artists: Vec<&str> =
                            stats.top_artists.iter().take(5).map(|a| a.name.as_str()).collect();
                        if !artists.is_empty() {
                            let _ = writeln!(out, "  Top artists: {}", artists.join(", "));
                        }
                    }
                }
                (None, None) => {}
            }
            results(&mut out, state);
        }
        Mode::Discovery => results(&mut out, state),
        Mode::Workout => {
            let _ = writeln!(
                out,
                "Workout: {} min, {} intensity",
                state.workout.duration_minutes,
                state.workout.intensity.as_str()
            );
            if let Some(result) = &state.workout_result {
                let _ = writeln!(
                    out,
                    "{} ({} tracks)",
                    result.name,
                    result.total_tracks.unwrap_or(result.tracks.len())
                );
                workout_tracks(&mut out, &result.tracks);
            }
        }
        Mode::Classify => {
            vibe(&mut out, &state.vibe);
            if let Some(prediction) = &state.prediction {
                let top = &prediction.top_prediction;
                let _ = writeln!(out, "Predicted genre: {} ({:.0}%)", top.genre, top.confidence * 100.0);
                for guess in &prediction.all_predictions {
                    let _ = writeln!(out, "  {:<20} {:>5.1}%", guess.genre, guess.confidence * 100.0);
                }
            }
        }
        Mode::Analytics => {
            if let Some(summary) = &state.summary {
                let _ = writeln!(out, "Total plays: {}", summary.total_plays);
                if summary.top_genres.is_empty() {
                    let _ = writeln!(out, "No listening history yet. Play a few tracks first.");
                }
                for genre in &summary.top_genres {
                    let _ = writeln!(out, "  {:<20} {}", genre.genre, genre.count);
                }
            }
        }
        Mode::Trends => {
            if let Some(trends) = &state.trends {
                let _ = writeln!(out, "Rising genres:");
                for rising in &trends.rising_genres {
                    let _ = writeln!(out, "  {:<20} {:.1}", rising.genre, rising.popularity);
                }
                if !trends.correlations.is_empty() {
                    let _ = writeln!(out, "Feature correlations:");
                    for (pair, value) in &trends.correlations {
                        let _ = writeln!(out, "  {:<28} {:+.2}", pair, value);
                    }
                }
            }
        }
        Mode::Playlists => {
            if let Some(detail) = &state.playlist_detail {
                let _ = writeln!(out, "Playlist [{}] {}", detail.id, detail.name);
                for (i, track) in detail.tracks.iter().enumerate() {
                    let _ = writeln!(out, "  {:>2}. {}", i + 1, track_line(track));
                }
            } else if state.playlists.is_empty() {
                if !loading {
                    let _ = writeln!(out, "No playlists yet. Use 'save' on any result list.");
                }
            } else {
                for playlist in &state.playlists {
                    let created = playlist
                        .created_at
                        .map(|at| at.format("%Y-%m-%d").to_string())
                        .unwrap_or_default();
                    let _ = writeln!(
                        out,
                        "  [{}] {} ({} tracks) {}",
                        playlist.id, playlist.name, playlist.track_count, created
                    );
                }
            }
        }
    }

    if loading {
        let _ = writeln!(out, "... loading");
    }
    if let Some(notice) = &state.notice {
        let _ = writeln!(out, "{}", notice);
    }
    if let Some(error) = &state.error {
        let _ = writeln!(out, "Error: {}", error);
    }
    out
}

fn header(out: &mut String, state: &ViewState, user: Option<&User>) {
    let who = user.map(|u| u.email.as_str()).unwrap_or("not signed in");
    let _ = writeln!(out, "== {} | {} ==", state.mode, who);
}

fn results(out: &mut String, state: &ViewState) {
    if state.results.is_empty() {
        return;
    }
    let _ = writeln!(out, "{}", state.results.origin.describe());
    track_list(out, &state.results.tracks);
}

fn track_list(out: &mut String, tracks: &[ScoredTrack]) {
    for (i, scored) in tracks.iter().enumerate() {
        let _ = write!(out, "  {:>2}. {}", i + 1, track_line(&scored.track));
        if let Some(score) = scored.similarity_score {
            let _ = write!(out, "  {:.0}% match", score * 100.0);
        }
        let _ = writeln!(out);

        let strong = scored.strong_matches(MATCH_THRESHOLD, MATCH_HINTS);
        if !strong.is_empty() {
            let _ = writeln!(out, "      matches on {}", strong.join(", "));
        }
    }
}

fn workout_tracks(out: &mut String, tracks: &[Track]) {
    for (i, (phase, track)) in workout::label(tracks).enumerate() {
        let tempo = track
            .tempo
            .map(|bpm| format!("{:.0} BPM", bpm))
            .unwrap_or_else(|| "- BPM".to_string());
        let _ = writeln!(
            out,
            "  {:>2}. {:<9} {:>8}  {}",
            i + 1,
            phase.label(),
            tempo,
            track_line(track)
        );
    }
}

fn track_line(track: &Track) -> String {
    match &track.track_genre {
        Some(genre) => format!("{} - {} [{}]", track.track_name, track.artists, genre),
        None => format!("{} - {}", track.track_name, track.artists),
    }
}

fn vibe(out: &mut String, vibe: &VibeVector) {
    let _ = writeln!(out, "Vibe:");
    for (name, value) in VibeVector::FEATURES.iter().zip(vibe.values()) {
        let filled = (value * 10.0).round().clamp(0.0, 10.0) as usize;
        let _ = writeln!(
            out,
            "  {:<17} {}{} {:.2}",
            name,
            "#".repeat(filled),
            ".".repeat(10 - filled),
            value
        );
    }
}
