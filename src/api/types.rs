//! Request and response schemas for every backend endpoint.
//!
//! Responses are deserialized strictly: a body missing a required field is a
//! `Failure::ValidationError`, never a half-populated value.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: String,
}

/// A catalog track. Identity is `track_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub track_id: String,
    pub track_name: String,
    pub artists: String,
    #[serde(default)]
    pub tempo: Option<f64>,
    #[serde(default)]
    pub energy: Option<f64>,
    #[serde(default)]
    pub track_genre: Option<String>,
    #[serde(default)]
    pub popularity: Option<f64>,
}

/// Track plus whatever score the recommender attached to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredTrack {
    #[serde(flatten)]
    pub track: Track,
    #[serde(default)]
    pub similarity_score: Option<f64>,
    #[serde(default)]
    pub match_details: Option<BTreeMap<String, f64>>,
}

impl ScoredTrack {
    /// Feature names with a match above `threshold`, best first, at most `limit`.
    pub fn strong_matches(&self, threshold: f64, limit: usize) -> Vec<&str> {
        let Some(details) = &self.match_details else {
            return Vec::new();
        };
        let mut matches: Vec<(&str, f64)> = details
            .iter()
            .filter(|(_, v)| **v > threshold)
            .map(|(k, v)| (k.as_str(), *v))
            .collect();
        matches.sort_by(|a, b| b.1.total_cmp(&a.1));
        matches.into_iter().take(limit).map(|(k, _)| k).collect()
    }
}

impl From<Track> for ScoredTrack {
    fn from(track: Track) -> Self {
        Self {
            track,
            similarity_score: None,
            match_details: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VibeVector {
    pub danceability: f64,
    pub energy: f64,
    pub valence: f64,
    pub acousticness: f64,
    pub instrumentalness: f64,
}

impl Default for VibeVector {
    fn default() -> Self {
        Self {
            danceability: 0.5,
            energy: 0.5,
            valence: 0.5,
            acousticness: 0.5,
            instrumentalness: 0.5,
        }
    }
}

impl VibeVector {
    pub const FEATURES: [&'static str; 5] = [
        "danceability",
        "energy",
        "valence",
        "acousticness",
        "instrumentalness",
    ];

    pub fn values(&self) -> [f64; 5] {
        [
            self.danceability,
            self.energy,
            self.valence,
            self.acousticness,
            self.instrumentalness,
        ]
    }

    /// Every component must lie in [0, 1].
    pub fn validate(&self) -> Result<(), String> {
        for (name, value) in Self::FEATURES.iter().zip(self.values()) {
            if !(0.0..=1.0).contains(&value) {
                return Err(format!("{} must be between 0 and 1 (got {})", name, value));
            }
        }
        Ok(())
    }

    pub fn set(&mut self, feature: &str, value: f64) -> Result<(), String> {
        let slot = match feature {
            "danceability" => &mut self.danceability,
            "energy" => &mut self.energy,
            "valence" => &mut self.valence,
            "acousticness" => &mut self.acousticness,
            "instrumentalness" => &mut self.instrumentalness,
            other => return Err(format!("Unknown feature: {}", other)),
        };
        if !(0.0..=1.0).contains(&value) {
            return Err(format!("{} must be between 0 and 1 (got {})", feature, value));
        }
        *slot = value;
        Ok(())
    }
}

const DEFAULT_SPEECHINESS: f64 = 0.05;
const DEFAULT_LIVENESS: f64 = 0.1;

/// A named, server-persisted vibe snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreferenceProfile {
    pub id: i64,
    pub name: String,
    #[serde(flatten)]
    pub vibe: VibeVector,
    #[serde(default)]
    pub speechiness: Option<f64>,
    #[serde(default)]
    pub liveness: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewPreferenceProfile {
    pub name: String,
    #[serde(flatten)]
    pub vibe: VibeVector,
    pub speechiness: f64,
    pub liveness: f64,
}

impl NewPreferenceProfile {
    pub fn from_vibe(name: impl Into<String>, vibe: VibeVector) -> Self {
        Self {
            name: name.into(),
            vibe,
            speechiness: DEFAULT_SPEECHINESS,
            liveness: DEFAULT_LIVENESS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mood {
    Happy,
    Sad,
    Energetic,
    Calm,
    Focused,
}

impl Mood {
    pub const ALL: [Mood; 5] = [Mood::Happy, Mood::Sad, Mood::Energetic, Mood::Calm, Mood::Focused];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Happy => "happy",
            Mood::Sad => "sad",
            Mood::Energetic => "energetic",
            Mood::Calm => "calm",
            Mood::Focused => "focused",
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mood {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mood::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown mood: {}", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intensity {
    Low,
    Medium,
    High,
}

impl Intensity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intensity::Low => "low",
            Intensity::Medium => "medium",
            Intensity::High => "high",
        }
    }
}

impl FromStr for Intensity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Intensity::Low),
            "medium" => Ok(Intensity::Medium),
            "high" => Ok(Intensity::High),
            other => Err(format!("Unknown intensity: {}", other)),
        }
    }
}

pub const WORKOUT_MIN_MINUTES: u32 = 15;
pub const WORKOUT_MAX_MINUTES: u32 = 90;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WorkoutSpec {
    pub duration_minutes: u32,
    pub intensity: Intensity,
}

impl Default for WorkoutSpec {
    fn default() -> Self {
        Self {
            duration_minutes: 30,
            intensity: Intensity::Medium,
        }
    }
}

impl WorkoutSpec {
    pub fn new(duration_minutes: u32, intensity: Intensity) -> Result<Self, String> {
        if !(WORKOUT_MIN_MINUTES..=WORKOUT_MAX_MINUTES).contains(&duration_minutes) {
            return Err(format!(
                "Duration must be between {} and {} minutes",
                WORKOUT_MIN_MINUTES, WORKOUT_MAX_MINUTES
            ));
        }
        Ok(Self {
            duration_minutes,
            intensity,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WorkoutResult {
    pub name: String,
    #[serde(default)]
    pub total_tracks: Option<usize>,
    #[serde(default)]
    pub duration_requested: Option<u32>,
    pub tracks: Vec<Track>,
}

impl WorkoutResult {
    /// Fill the fields the service may leave out.
    pub fn complete(mut self, spec: &WorkoutSpec) -> Self {
        self.total_tracks.get_or_insert(self.tracks.len());
        self.duration_requested.get_or_insert(spec.duration_minutes);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenreConfidence {
    pub genre: String,
    pub confidence: f64,
}

/// Classifier output. `all_predictions` keeps the server's order.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Prediction {
    pub top_prediction: GenreConfidence,
    pub all_predictions: Vec<GenreConfidence>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PopularityStats {
    pub avg: f64,
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ArtistCount {
    pub name: String,
    pub track_count: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GenreStats {
    pub popularity_stats: PopularityStats,
    #[serde(default)]
    pub top_artists: Vec<ArtistCount>,
    #[serde(default)]
    pub average_features: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GenreCount {
    pub genre: String,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AnalyticsSummary {
    pub total_plays: u64,
    #[serde(default)]
    pub top_genres: Vec<GenreCount>,
    #[serde(default)]
    pub average_features: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GenrePopularity {
    pub genre: String,
    pub popularity: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GenreTimeline {
    pub genre: String,
    pub data: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct SimulatedTimeline {
    #[serde(default)]
    pub months: Vec<String>,
    #[serde(default)]
    pub trends: Vec<GenreTimeline>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Trends {
    #[serde(default)]
    pub rising_genres: Vec<GenrePopularity>,
    #[serde(default)]
    pub correlations: BTreeMap<String, f64>,
    /// Keyed by the explicit flag as the service serializes it.
    #[serde(default)]
    pub explicit_popularity: serde_json::Value,
    #[serde(default)]
    pub simulated_timeline: SimulatedTimeline,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PlaylistSummary {
    pub id: i64,
    pub name: String,
    pub track_count: u32,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub created_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PlaylistDetail {
    pub id: i64,
    pub name: String,
    pub tracks: Vec<Track>,
}

/// Response of `POST /playlists/generate` and `POST /playlists/custom`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CreatedPlaylist {
    pub playlist_id: i64,
    pub name: String,
    #[serde(default)]
    pub track_count: Option<u32>,
    #[serde(default)]
    pub tracks: Vec<ScoredTrack>,
}

impl CreatedPlaylist {
    pub fn len(&self) -> usize {
        self.track_count
            .map(|n| n as usize)
            .unwrap_or(self.tracks.len())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomPlaylistRequest {
    pub name: String,
    pub track_ids: Vec<String>,
}

/// Either naive (`2024-05-01T10:00:00.123`) or offset-qualified timestamps.
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    let Some(raw) = raw else {
        return Ok(None);
    };
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(&raw) {
        return Ok(Some(dt.naive_utc()));
    }
    NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(Some)
        .map_err(serde::de::Error::custom)
}

// Envelopes the services wrap their payloads in.

#[derive(Debug, Deserialize)]
pub(crate) struct SearchEnvelope {
    pub results: Vec<ScoredTrack>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RecommendationsEnvelope {
    pub recommendations: Vec<ScoredTrack>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GenresEnvelope {
    pub genres: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GenreTracksEnvelope {
    pub tracks: Vec<ScoredTrack>,
}
