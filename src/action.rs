use crate::api::{
    AnalyticsSummary, CreatedPlaylist, GenreStats, Intensity, Mood, PlaylistDetail, PlaylistSummary,
    Prediction, PreferenceProfile, ScoredTrack, Trends, User, WorkoutResult,
};
use crate::app::{Mode, ResultOrigin, Ticket};
use crate::config::SecretString;
use crate::gateway::Failure;

/// A track named by its 1-based position in the visible list, or by id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackRef {
    Index(usize),
    Id(String),
}

/// Every user gesture is one named action; every finished request comes back
/// as `Loaded` carrying the ticket it was issued under.
#[derive(Debug, Clone)]
pub enum Action {
    Noop,
    Quit,
    Help,
    Show,

    // Session
    RestoreSession,
    Login { email: String, password: String },
    Signup { email: String, password: String },
    Logout,

    // Modes
    SwitchMode(Mode),

    // Recommendation triggers
    Search(String),
    SelectTrack(TrackRef),
    SelectMood(Mood),
    SetVibe { feature: String, value: f64 },
    VibeCheck,
    SelectGenre(String),
    PersonalizedDiscovery,
    GenerateWorkout { duration_minutes: u32, intensity: Intensity },
    ResetWorkout,
    Classify,
    PlayTrack(TrackRef),

    // Preference profiles
    RefreshPreferences,
    SavePreference(String),
    ApplyPreference(i64),
    DeletePreference(i64),

    // Playlists
    SelectPlaylist(i64),
    SavePlaylist(Option<String>),
    AddToPlaylist { playlist_id: i64, track: TrackRef },
    CreateAndAdd { name: String, track: TrackRef },

    // Completions
    Loaded(Ticket, Loaded),
    PlayRecorded { track_id: String, result: Result<(), Failure> },
}

/// Outcome of one ticketed request.
#[derive(Debug, Clone)]
pub enum Loaded {
    LoggedIn(Result<SecretString, Failure>),
    SignedUp(Result<SecretString, Failure>),
    Whoami(Result<User, Failure>),
    Tracks {
        origin: ResultOrigin,
        result: Result<Vec<ScoredTrack>, Failure>,
    },
    Genre {
        genre: String,
        tracks: Result<Vec<ScoredTrack>, Failure>,
        stats: Result<GenreStats, Failure>,
    },
    Workout(Result<WorkoutResult, Failure>),
    Genres(Result<Vec<String>, Failure>),
    Summary(Result<AnalyticsSummary, Failure>),
    Trends(Result<Trends, Failure>),
    Prediction(Result<Prediction, Failure>),
    Preferences(Result<Vec<PreferenceProfile>, Failure>),
    PreferenceSaved(Result<PreferenceProfile, Failure>),
    PreferenceDeleted { id: i64, result: Result<(), Failure> },
    Playlists(Result<Vec<PlaylistSummary>, Failure>),
    PlaylistDetail(Result<PlaylistDetail, Failure>),
    PlaylistCreated(Result<CreatedPlaylist, Failure>),
    TrackAdded { playlist_id: i64, result: Result<(), Failure> },
}

impl Loaded {
    /// The primary failure carried by this outcome.
    fn failure(&self) -> Option<&Failure> {
        match self {
            Loaded::LoggedIn(r) | Loaded::SignedUp(r) => r.as_ref().err(),
            Loaded::Whoami(r) => r.as_ref().err(),
            Loaded::Tracks { result, .. } => result.as_ref().err(),
            Loaded::Genre { tracks, .. } => tracks.as_ref().err(),
            Loaded::Workout(r) => r.as_ref().err(),
            Loaded::Genres(r) => r.as_ref().err(),
            Loaded::Summary(r) => r.as_ref().err(),
            Loaded::Trends(r) => r.as_ref().err(),
            Loaded::Prediction(r) => r.as_ref().err(),
            Loaded::Preferences(r) => r.as_ref().err(),
            Loaded::PreferenceSaved(r) => r.as_ref().err(),
            Loaded::PreferenceDeleted { result, .. } => result.as_ref().err(),
            Loaded::Playlists(r) => r.as_ref().err(),
            Loaded::PlaylistDetail(r) => r.as_ref().err(),
            Loaded::PlaylistCreated(r) => r.as_ref().err(),
            Loaded::TrackAdded { result, .. } => result.as_ref().err(),
        }
    }

    /// True when one of this request's calls got the 401 that cleared the
    /// current session. Both halves of the genre fan-out count.
    pub fn ended_session(&self) -> bool {
        match self {
            Loaded::Genre { tracks, stats, .. } => [tracks.as_ref().err(), stats.as_ref().err()]
                .into_iter()
                .flatten()
                .any(Failure::ended_session),
            other => other.failure().is_some_and(Failure::ended_session),
        }
    }
}
