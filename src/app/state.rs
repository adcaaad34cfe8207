// View state container - modes, per-mode working set, and caches
// Mutated only by App's dispatchers; presentation reads it through accessors.

use std::fmt;
use std::str::FromStr;

use crate::api::{
    AnalyticsSummary, GenreStats, Mood, PlaylistDetail, PlaylistSummary, Prediction,
    PreferenceProfile, ScoredTrack, Trends, VibeVector, WorkoutResult, WorkoutSpec,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mode {
    #[default]
    Unauthenticated,
    Search,
    Mood,
    Vibe,
    Genres,
    Playlists,
    Classify,
    Analytics,
    Workout,
    Trends,
    Discovery,
}

impl Mode {
    /// Modes reachable by `switch_mode`, in tab order.
    pub const TABS: [Mode; 10] = [
        Mode::Search,
        Mode::Mood,
        Mode::Vibe,
        Mode::Genres,
        Mode::Playlists,
        Mode::Classify,
        Mode::Analytics,
        Mode::Workout,
        Mode::Trends,
        Mode::Discovery,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Unauthenticated => "unauthenticated",
            Mode::Search => "search",
            Mode::Mood => "mood",
            Mode::Vibe => "vibe",
            Mode::Genres => "genres",
            Mode::Playlists => "playlists",
            Mode::Classify => "classify",
            Mode::Analytics => "analytics",
            Mode::Workout => "workout",
            Mode::Trends => "trends",
            Mode::Discovery => "discovery",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mode::TABS
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown mode: {}", s))
    }
}

/// Which trigger produced the active result list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ResultOrigin {
    #[default]
    None,
    Search { query: String },
    Similar { seed_track_id: String, seed_name: String },
    Mood { mood: Mood },
    Vibe,
    Genre { genre: String },
    Personalized,
    Workout,
}

impl ResultOrigin {
    pub fn describe(&self) -> String {
        match self {
            ResultOrigin::None => String::new(),
            ResultOrigin::Search { query } => format!("Results for \"{}\"", query),
            ResultOrigin::Similar { seed_name, .. } => format!("Similar to {}", seed_name),
            ResultOrigin::Mood { mood } => format!("Mood: {}", mood),
            ResultOrigin::Vibe => "Vibe match".to_string(),
            ResultOrigin::Genre { genre } => format!("Genre: {}", genre),
            ResultOrigin::Personalized => "Picked for you".to_string(),
            ResultOrigin::Workout => "Workout".to_string(),
        }
    }
}

/// The single active result list.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResultList {
    pub origin: ResultOrigin,
    pub tracks: Vec<ScoredTrack>,
}

impl ResultList {
    pub fn new(origin: ResultOrigin, tracks: Vec<ScoredTrack>) -> Self {
        Self { origin, tracks }
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn track_ids(&self) -> Vec<String> {
        self.tracks.iter().map(|t| t.track.track_id.clone()).collect()
    }
}

/// Request categories. Only the newest ticket per slot may apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Auth,
    Results,
    Genres,
    Summary,
    Trends,
    Prediction,
    Preferences,
    Playlists,
    PlaylistDetail,
    Composer,
}

/// Issued for every ticketed request; compared against current state on completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    pub id: u64,
    pub mode: Mode,
    pub slot: Slot,
}

#[derive(Debug, Clone, Default)]
pub struct ViewState {
    pub mode: Mode,

    // Selection
    pub query: String,
    pub selected_track: Option<String>,
    pub selected_mood: Option<Mood>,
    pub selected_genre: Option<String>,
    pub selected_playlist: Option<i64>,

    // Results (cleared on every mode switch)
    pub results: ResultList,
    pub search_results: Vec<ScoredTrack>,
    pub genre_stats: Option<GenreStats>,
    pub workout_result: Option<WorkoutResult>,
    pub prediction: Option<Prediction>,
    pub summary: Option<AnalyticsSummary>,
    pub playlist_detail: Option<PlaylistDetail>,

    // Working values that survive mode switches
    pub vibe: VibeVector,
    pub workout: WorkoutSpec,

    // Caches (cleared only when the session ends)
    pub genres: Option<Vec<String>>,
    pub trends: Option<Trends>,
    pub preferences: Option<Vec<PreferenceProfile>>,
    pub playlists: Vec<PlaylistSummary>,

    pub error: Option<String>,
    pub notice: Option<String>,
}

impl ViewState {
    /// Reset applied on every mode transition.
    pub fn clear_for_switch(&mut self) {
        self.query.clear();
        self.selected_track = None;
        self.selected_mood = None;
        self.selected_genre = None;
        self.selected_playlist = None;
        self.results = ResultList::default();
        self.search_results.clear();
        self.genre_stats = None;
        self.workout_result = None;
        self.prediction = None;
        self.summary = None;
        self.playlist_detail = None;
        self.error = None;
        self.notice = None;
    }

    /// Everything tied to the signed-in user goes.
    pub fn reset(&mut self) {
        *self = ViewState::default();
    }

    /// Start of a result-list trigger: prior list and error go first.
    pub fn begin_results(&mut self) {
        self.results = ResultList::default();
        self.error = None;
        self.notice = None;
    }

    /// Tracks that `TrackRef::Index` counts into for this command.
    pub fn pick_list(&self, prefer_side: bool) -> &[ScoredTrack] {
        if prefer_side && !self.search_results.is_empty() {
            return &self.search_results;
        }
        if self.results.is_empty() {
            &self.search_results
        } else {
            &self.results.tracks
        }
    }

    pub fn find_track(&self, track_id: &str) -> Option<&ScoredTrack> {
        self.results
            .tracks
            .iter()
            .chain(self.search_results.iter())
            .find(|t| t.track.track_id == track_id)
    }
}
