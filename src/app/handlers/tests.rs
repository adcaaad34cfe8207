use std::sync::Arc;

use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::{json, Value};
use tempfile::TempDir;

use crate::action::{Action, TrackRef};
use crate::api::{Intensity, Mood};
use crate::app::testing::{app_with, signed_in};
use crate::app::{App, Mode, ResultOrigin};
use crate::config::{AppConfig, SecretString, SessionManager};
use crate::gateway::mock::MockTransport;
use crate::gateway::{Body, Method};
use crate::session::{SessionStatus, SessionStore};

fn tracks(ids: &[&str]) -> Value {
    Value::Array(
        ids.iter()
            .map(|id| {
                json!({
                    "track_id": id,
                    "track_name": id.to_uppercase(),
                    "artists": "Artist",
                    "tempo": 120.0,
                    "similarity_score": 0.9
                })
            })
            .collect(),
    )
}

fn result_ids(app: &App) -> Vec<String> {
    app.state().results.track_ids()
}

// ---- Session ----

#[tokio::test]
async fn test_login_then_whoami_enters_search() {
    let mock = Arc::new(MockTransport::new());
    mock.reply(Method::Post, "/auth/login", 200, json!({ "access_token": "jwt", "token_type": "bearer" }));
    mock.reply(Method::Get, "/auth/me", 200, json!({ "id": 7, "email": "ada@example.com" }));
    let mut app = app_with(mock.clone());

    app.dispatch(Action::Login {
        email: "ada@example.com".to_string(),
        password: "secret".to_string(),
    })
    .unwrap();
    assert!(app.is_loading());
    app.settle().await.unwrap();

    assert_eq!(app.mode(), Mode::Search);
    assert_eq!(app.current_user().unwrap().id, 7);
    assert_eq!(app.session().token().unwrap().expose(), "jwt");
    assert_eq!(app.state().error, None);
    assert!(!app.is_loading());

    let me = mock.requests().into_iter().find(|r| r.path.ends_with("/auth/me")).unwrap();
    assert_eq!(me.bearer.as_deref(), Some("jwt"));
}

#[tokio::test]
async fn test_login_with_bad_credentials() {
    let mock = Arc::new(MockTransport::new());
    mock.reply(Method::Post, "/auth/login", 401, json!({ "detail": "Incorrect email or password" }));
    let mut app = app_with(mock.clone());

    app.dispatch(Action::Login {
        email: "ada@example.com".to_string(),
        password: "wrong".to_string(),
    })
    .unwrap();
    app.settle().await.unwrap();

    assert_eq!(app.state().error.as_deref(), Some("Login failed: Invalid credentials"));
    assert_eq!(app.mode(), Mode::Unauthenticated);
    assert!(app.session().token().is_none());
    assert_eq!(mock.count(Method::Get, "/auth/me"), 0);
}

#[tokio::test]
async fn test_signup_logs_in_with_same_credentials() {
    let mock = Arc::new(MockTransport::new());
    mock.reply(Method::Post, "/auth/signup", 200, json!({ "id": 2, "email": "new@example.com" }));
    mock.reply(Method::Post, "/auth/login", 200, json!({ "access_token": "fresh" }));
    mock.reply(Method::Get, "/auth/me", 200, json!({ "id": 2, "email": "new@example.com" }));
    let mut app = app_with(mock.clone());

    app.dispatch(Action::Signup {
        email: "new@example.com".to_string(),
        password: "pw".to_string(),
    })
    .unwrap();
    app.settle().await.unwrap();

    assert_eq!(app.mode(), Mode::Search);
    assert_eq!(mock.count(Method::Post, "/auth/login"), 1);
}

#[tokio::test]
async fn test_signup_conflict_is_scoped_error() {
    let mock = Arc::new(MockTransport::new());
    mock.reply(Method::Post, "/auth/signup", 400, json!({ "detail": "Email already registered" }));
    let mut app = app_with(mock.clone());

    app.dispatch(Action::Signup {
        email: "taken@example.com".to_string(),
        password: "pw".to_string(),
    })
    .unwrap();
    app.settle().await.unwrap();

    assert_eq!(
        app.state().error.as_deref(),
        Some("Signup failed: Invalid request: Email already registered")
    );
    assert_eq!(mock.count(Method::Post, "/auth/login"), 0);
}

#[tokio::test]
async fn test_restore_saved_session() {
    let dir = TempDir::new().unwrap();
    let manager = SessionManager::with_path(dir.path().join("session.toml"));
    manager.save(&SecretString::new("saved")).unwrap();

    let mock = Arc::new(MockTransport::new());
    mock.reply(Method::Get, "/auth/me", 200, json!({ "id": 3, "email": "back@example.com" }));
    let mut app = App::with_transport(&AppConfig::default(), mock.clone(), SessionStore::new(manager)).unwrap();

    app.dispatch(Action::RestoreSession).unwrap();
    app.settle().await.unwrap();

    assert_eq!(app.mode(), Mode::Search);
    assert_eq!(mock.requests()[0].bearer.as_deref(), Some("saved"));
}

#[tokio::test]
async fn test_expired_saved_session_is_removed() {
    let dir = TempDir::new().unwrap();
    let manager = SessionManager::with_path(dir.path().join("session.toml"));
    manager.save(&SecretString::new("stale")).unwrap();

    let mock = Arc::new(MockTransport::new());
    mock.reply(Method::Get, "/auth/me", 401, json!({ "detail": "Could not validate credentials" }));
    let mut app =
        App::with_transport(&AppConfig::default(), mock, SessionStore::new(manager.clone())).unwrap();

    app.dispatch(Action::RestoreSession).unwrap();
    app.settle().await.unwrap();

    assert_eq!(app.mode(), Mode::Unauthenticated);
    assert!(app.current_user().is_none());
    assert!(!manager.exists());
}

#[tokio::test]
async fn test_actions_rejected_while_signed_out() {
    let mock = Arc::new(MockTransport::new());
    let mut app = app_with(mock.clone());

    app.dispatch(Action::SwitchMode(Mode::Genres)).unwrap();
    app.dispatch(Action::Search("miles".to_string())).unwrap();

    assert_eq!(app.mode(), Mode::Unauthenticated);
    assert_eq!(app.state().error.as_deref(), Some("Please log in first"));
    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn test_logout_clears_everything() {
    let mock = Arc::new(MockTransport::new());
    mock.reply(Method::Get, "/genres", 200, json!({ "genres": ["rock"] }));
    let mut app = signed_in(mock);
    app.dispatch(Action::SwitchMode(Mode::Genres)).unwrap();
    app.settle().await.unwrap();
    assert!(app.state().genres.is_some());

    app.dispatch(Action::Logout).unwrap();

    assert_eq!(app.mode(), Mode::Unauthenticated);
    assert_eq!(app.session().status(), SessionStatus::Invalidated);
    assert_eq!(app.state().genres, None);
    assert_eq!(app.state().notice.as_deref(), Some("Logged out"));
}

#[rstest]
#[case(Mode::Analytics, Method::Get, "/analytics/summary")]
#[case(Mode::Trends, Method::Get, "/analytics/trends")]
#[case(Mode::Playlists, Method::Get, "/playlists")]
#[case(Mode::Discovery, Method::Post, "/recommendations/personalized")]
#[case(Mode::Vibe, Method::Get, "/preferences")]
#[tokio::test]
async fn test_401_from_any_collaborator_signs_out(
    #[case] mode: Mode,
    #[case] method: Method,
    #[case] path: &str,
) {
    let mock = Arc::new(MockTransport::new());
    mock.reply(method, path, 401, json!({ "detail": "Token expired" }));
    let mut app = signed_in(mock);

    app.dispatch(Action::SwitchMode(mode)).unwrap();
    app.settle().await.unwrap();

    assert_eq!(app.mode(), Mode::Unauthenticated);
    assert!(app.current_user().is_none());
    assert!(app.session().token().is_none());
    assert_eq!(app.state().error.as_deref(), Some("Session expired. Please log in again."));
}

#[tokio::test]
async fn test_401_for_replaced_token_keeps_new_session() {
    let mock = Arc::new(MockTransport::new());
    let gate = mock.reply_held(Method::Get, "/analytics/summary", 401, json!({ "detail": "expired" }));
    let mut app = signed_in(mock.clone());

    app.dispatch(Action::SwitchMode(Mode::Analytics)).unwrap();
    while mock.requests().is_empty() {
        tokio::task::yield_now().await;
    }
    // A new login lands before the old request fails.
    app.session.set_token(SecretString::new("token-2")).unwrap();
    gate.send(()).unwrap();
    app.settle().await.unwrap();

    assert_eq!(app.mode(), Mode::Analytics);
    assert_eq!(app.session().token().unwrap().expose(), "token-2");
}

#[tokio::test]
async fn test_401_after_logout_does_not_cancel_new_login() {
    let mock = Arc::new(MockTransport::new());
    let summary_gate = mock.reply_held(Method::Get, "/analytics/summary", 401, json!({ "detail": "expired" }));
    let login_gate = mock.reply_held(Method::Post, "/auth/login", 200, json!({ "access_token": "jwt2" }));
    mock.reply(Method::Get, "/auth/me", 200, json!({ "id": 1, "email": "ada@example.com" }));
    let mut app = signed_in(mock.clone());

    app.dispatch(Action::SwitchMode(Mode::Analytics)).unwrap();
    while mock.requests().is_empty() {
        tokio::task::yield_now().await;
    }
    app.dispatch(Action::Logout).unwrap();
    app.dispatch(Action::Login {
        email: "ada@example.com".to_string(),
        password: "secret".to_string(),
    })
    .unwrap();

    // The old request fails after the user already signed out.
    summary_gate.send(()).unwrap();
    app.pump_one().await.unwrap();
    assert_eq!(app.mode(), Mode::Unauthenticated);
    assert_eq!(app.state().error, None);
    assert!(app.is_loading());

    login_gate.send(()).unwrap();
    app.settle().await.unwrap();

    assert_eq!(app.mode(), Mode::Search);
    assert_eq!(app.current_user().unwrap().id, 1);
    assert_eq!(app.session().token().unwrap().expose(), "jwt2");
    assert_eq!(app.state().error, None);
}

// ---- Stale responses ----

#[tokio::test]
async fn test_late_similar_tracks_are_discarded() {
    let mock = Arc::new(MockTransport::new());
    let gate_a = mock.reply_held(
        Method::Get,
        "/recommendations/a",
        200,
        json!({ "recommendations": tracks(&["a1", "a2"]) }),
    );
    mock.reply(
        Method::Get,
        "/recommendations/b",
        200,
        json!({ "recommendations": tracks(&["b1"]) }),
    );
    let mut app = signed_in(mock);

    app.dispatch(Action::SelectTrack(TrackRef::Id("a".to_string()))).unwrap();
    app.dispatch(Action::SelectTrack(TrackRef::Id("b".to_string()))).unwrap();

    app.pump_one().await.unwrap();
    assert_eq!(result_ids(&app), vec!["b1"]);

    gate_a.send(()).unwrap();
    app.pump_one().await.unwrap();

    assert_eq!(result_ids(&app), vec!["b1"]);
    assert_eq!(app.state().selected_track.as_deref(), Some("b"));
    assert!(!app.is_loading());
}

#[tokio::test]
async fn test_response_after_mode_switch_is_discarded() {
    let mock = Arc::new(MockTransport::new());
    let gate = mock.reply_held(Method::Get, "/search", 200, json!({ "results": tracks(&["s1"]) }));
    let mut app = signed_in(mock);

    app.dispatch(Action::Search("so what".to_string())).unwrap();
    assert!(app.is_loading());
    app.dispatch(Action::SwitchMode(Mode::Mood)).unwrap();
    assert!(!app.is_loading());

    gate.send(()).unwrap();
    app.settle().await.unwrap();

    assert_eq!(app.mode(), Mode::Mood);
    assert!(app.state().results.is_empty());
    assert!(app.state().search_results.is_empty());
}

#[tokio::test]
async fn test_empty_search_is_ignored() {
    let mock = Arc::new(MockTransport::new());
    let mut app = signed_in(mock.clone());

    app.dispatch(Action::Search("   ".to_string())).unwrap();

    assert!(!app.is_loading());
    assert!(mock.requests().is_empty());
}

// ---- Modes ----

#[tokio::test]
async fn test_switch_mode_clears_results_and_selection() {
    let mock = Arc::new(MockTransport::new());
    mock.reply(
        Method::Get,
        "/recommendations/mood/happy",
        200,
        json!({ "recommendations": tracks(&["h1", "h2"]) }),
    );
    mock.reply(Method::Get, "/preferences", 200, json!([]));
    let mut app = signed_in(mock);

    app.dispatch(Action::SelectMood(Mood::Happy)).unwrap();
    app.settle().await.unwrap();
    assert_eq!(app.mode(), Mode::Mood);
    assert_eq!(result_ids(&app), vec!["h1", "h2"]);

    app.dispatch(Action::SwitchMode(Mode::Vibe)).unwrap();

    assert!(app.state().results.is_empty());
    assert_eq!(app.state().selected_mood, None);
    assert_eq!(app.state().error, None);
}

#[tokio::test]
async fn test_genre_list_is_fetched_once() {
    let mock = Arc::new(MockTransport::new());
    mock.reply(Method::Get, "/genres", 200, json!({ "genres": ["jazz", "rock"] }));
    let mut app = signed_in(mock.clone());

    app.dispatch(Action::SwitchMode(Mode::Genres)).unwrap();
    app.settle().await.unwrap();
    app.dispatch(Action::SwitchMode(Mode::Search)).unwrap();
    app.dispatch(Action::SwitchMode(Mode::Genres)).unwrap();
    app.settle().await.unwrap();

    assert_eq!(mock.count(Method::Get, "/genres"), 1);
    assert_eq!(app.state().genres, Some(vec!["jazz".to_string(), "rock".to_string()]));
}

#[tokio::test]
async fn test_playlists_are_fetched_on_every_entry() {
    let mock = Arc::new(MockTransport::new());
    mock.reply(
        Method::Get,
        "/playlists",
        200,
        json!([{ "id": 1, "name": "Mine", "track_count": 3, "created_at": "2024-05-01T10:00:00.123" }]),
    );
    let mut app = signed_in(mock.clone());

    app.dispatch(Action::SwitchMode(Mode::Playlists)).unwrap();
    app.settle().await.unwrap();
    app.dispatch(Action::SwitchMode(Mode::Search)).unwrap();
    app.dispatch(Action::SwitchMode(Mode::Playlists)).unwrap();
    app.settle().await.unwrap();

    assert_eq!(mock.count(Method::Get, "/playlists"), 2);
    assert_eq!(app.state().playlists[0].name, "Mine");
}

#[tokio::test]
async fn test_discovery_needs_validated_session() {
    let mock = Arc::new(MockTransport::new());
    let mut app = app_with(mock.clone());
    app.session.set_token(SecretString::new("pending")).unwrap();
    app.state.mode = Mode::Search;

    app.dispatch(Action::PersonalizedDiscovery).unwrap();

    assert_eq!(app.mode(), Mode::Discovery);
    assert_eq!(
        app.state().error.as_deref(),
        Some("Log in to get personalized recommendations")
    );
    assert!(mock.requests().is_empty());
}

// ---- Recommendation triggers ----

#[tokio::test]
async fn test_genre_tracks_render_when_analytics_fails() {
    let mock = Arc::new(MockTransport::new());
    mock.reply(Method::Get, "/genres", 200, json!({ "genres": ["rock"] }));
    mock.reply(Method::Get, "/genres/rock/tracks", 200, json!({ "tracks": tracks(&["r1", "r2"]) }));
    mock.reply(Method::Get, "/genres/rock/analytics", 500, json!({ "detail": "boom" }));
    let mut app = signed_in(mock.clone());

    app.dispatch(Action::SelectGenre("rock".to_string())).unwrap();
    app.settle().await.unwrap();

    assert_eq!(mock.count(Method::Get, "/genres/rock/tracks"), 1);
    assert_eq!(mock.count(Method::Get, "/genres/rock/analytics"), 1);
    assert_eq!(result_ids(&app), vec!["r1", "r2"]);
    assert_eq!(app.state().genre_stats, None);
    assert_eq!(app.state().error, None);
}

#[tokio::test]
async fn test_genre_analytics_401_signs_out() {
    let mock = Arc::new(MockTransport::new());
    mock.reply(Method::Get, "/genres", 200, json!({ "genres": ["rock"] }));
    mock.reply(Method::Get, "/genres/rock/tracks", 200, json!({ "tracks": tracks(&["r1", "r2"]) }));
    mock.reply(Method::Get, "/genres/rock/analytics", 401, json!({ "detail": "Token expired" }));
    let mut app = signed_in(mock.clone());

    app.dispatch(Action::SelectGenre("rock".to_string())).unwrap();
    app.settle().await.unwrap();

    assert_eq!(mock.count(Method::Get, "/genres/rock/analytics"), 1);
    assert_eq!(app.mode(), Mode::Unauthenticated);
    assert!(app.session().token().is_none());
    assert!(app.state().results.is_empty());
    assert_eq!(app.state().error.as_deref(), Some("Session expired. Please log in again."));
}

#[tokio::test]
async fn test_genre_stats_shown_when_both_succeed() {
    let mock = Arc::new(MockTransport::new());
    mock.reply(Method::Get, "/genres", 200, json!({ "genres": ["rock"] }));
    mock.reply(Method::Get, "/genres/rock/tracks", 200, json!({ "tracks": tracks(&["r1"]) }));
    mock.reply(
        Method::Get,
        "/genres/rock/analytics",
        200,
        json!({
            "popularity_stats": { "avg": 41.5, "min": 0.0, "max": 98.0 },
            "top_artists": [{ "name": "Queen", "track_count": 12 }],
            "average_features": { "energy": 0.7 }
        }),
    );
    let mut app = signed_in(mock);

    app.dispatch(Action::SelectGenre("rock".to_string())).unwrap();
    app.settle().await.unwrap();

    let stats = app.state().genre_stats.as_ref().unwrap();
    assert_eq!(stats.top_artists[0].name, "Queen");
    assert_eq!(app.state().selected_genre.as_deref(), Some("rock"));
}

#[tokio::test]
async fn test_search_failure_is_scoped() {
    let mock = Arc::new(MockTransport::new());
    mock.fail(Method::Get, "/search", "connection refused");
    let mut app = signed_in(mock);

    app.dispatch(Action::Search("blue".to_string())).unwrap();
    app.settle().await.unwrap();

    assert_eq!(app.mode(), Mode::Search);
    assert_eq!(
        app.state().error.as_deref(),
        Some("Search failed: Network error: connection refused")
    );
    assert!(!app.is_loading());
}

#[tokio::test]
async fn test_search_results_stay_beside_similar_tracks() {
    let mock = Arc::new(MockTransport::new());
    mock.reply(Method::Get, "/search", 200, json!({ "results": tracks(&["s1", "s2"]) }));
    mock.reply(
        Method::Get,
        "/recommendations/s2",
        200,
        json!({ "recommendations": tracks(&["x1"]) }),
    );
    let mut app = signed_in(mock);

    app.dispatch(Action::Search("kind of blue".to_string())).unwrap();
    app.settle().await.unwrap();
    app.dispatch(Action::SelectTrack(TrackRef::Index(2))).unwrap();
    app.settle().await.unwrap();

    assert_eq!(result_ids(&app), vec!["x1"]);
    assert_eq!(app.state().search_results.len(), 2);
    assert_eq!(
        app.state().results.origin,
        ResultOrigin::Similar {
            seed_track_id: "s2".to_string(),
            seed_name: "S2".to_string(),
        }
    );
}

#[tokio::test]
async fn test_vibe_out_of_range_is_rejected_locally() {
    let mock = Arc::new(MockTransport::new());
    let mut app = signed_in(mock.clone());

    app.dispatch(Action::SetVibe {
        feature: "energy".to_string(),
        value: 1.5,
    })
    .unwrap();

    assert!(app.state().error.is_some());
    assert_eq!(app.state().vibe.energy, 0.5);
}

#[tokio::test]
async fn test_vibe_check_sends_working_vector() {
    let mock = Arc::new(MockTransport::new());
    mock.reply(Method::Get, "/preferences", 200, json!([]));
    mock.reply(
        Method::Post,
        "/recommendations/custom",
        200,
        json!({ "recommendations": tracks(&["v1"]) }),
    );
    let mut app = signed_in(mock.clone());

    app.dispatch(Action::SetVibe {
        feature: "energy".to_string(),
        value: 0.9,
    })
    .unwrap();
    app.dispatch(Action::VibeCheck).unwrap();
    app.settle().await.unwrap();

    assert_eq!(app.mode(), Mode::Vibe);
    assert_eq!(result_ids(&app), vec!["v1"]);
    let request = mock
        .requests()
        .into_iter()
        .find(|r| r.path.ends_with("/recommendations/custom"))
        .unwrap();
    match request.body {
        Body::Json(value) => assert_eq!(value["energy"], 0.9),
        other => panic!("Expected JSON body, got {:?}", other),
    }
}

#[tokio::test]
async fn test_workout_keeps_server_order() {
    let mock = Arc::new(MockTransport::new());
    mock.reply(
        Method::Post,
        "/playlists/workout",
        200,
        json!({ "name": "Workout", "tracks": tracks(&["w3", "w1", "w2"]) }),
    );
    let mut app = signed_in(mock);

    app.dispatch(Action::GenerateWorkout {
        duration_minutes: 30,
        intensity: Intensity::High,
    })
    .unwrap();
    app.settle().await.unwrap();

    assert_eq!(app.mode(), Mode::Workout);
    assert_eq!(result_ids(&app), vec!["w3", "w1", "w2"]);
    let workout = app.state().workout_result.as_ref().unwrap();
    assert_eq!(workout.total_tracks, Some(3));
    assert_eq!(workout.duration_requested, Some(30));

    app.dispatch(Action::ResetWorkout).unwrap();
    assert!(app.state().workout_result.is_none());
    assert!(app.state().results.is_empty());
}

#[tokio::test]
async fn test_workout_duration_out_of_range() {
    let mock = Arc::new(MockTransport::new());
    let mut app = signed_in(mock.clone());

    app.dispatch(Action::GenerateWorkout {
        duration_minutes: 10,
        intensity: Intensity::Low,
    })
    .unwrap();

    assert_eq!(
        app.state().error.as_deref(),
        Some("Duration must be between 15 and 90 minutes")
    );
    assert_eq!(mock.count(Method::Post, "/playlists/workout"), 0);
}

#[tokio::test]
async fn test_play_event_failure_is_silent() {
    let mock = Arc::new(MockTransport::new());
    mock.reply(Method::Get, "/search", 200, json!({ "results": tracks(&["p1"]) }));
    mock.reply(Method::Post, "/history", 500, json!({ "detail": "db down" }));
    let mut app = signed_in(mock.clone());

    app.dispatch(Action::Search("anything".to_string())).unwrap();
    app.settle().await.unwrap();
    app.dispatch(Action::PlayTrack(TrackRef::Index(1))).unwrap();
    app.settle().await.unwrap();

    assert_eq!(mock.count(Method::Post, "/history"), 1);
    assert_eq!(app.state().error, None);
    assert_eq!(app.state().notice.as_deref(), Some("Playing P1"));
}

// ---- Classify and preference profiles ----

#[tokio::test]
async fn test_classify_keeps_prediction_order() {
    let mock = Arc::new(MockTransport::new());
    mock.reply(
        Method::Post,
        "/classify",
        200,
        json!({
            "top_prediction": { "genre": "edm", "confidence": 0.81 },
            "all_predictions": [
                { "genre": "edm", "confidence": 0.81 },
                { "genre": "house", "confidence": 0.12 },
                { "genre": "pop", "confidence": 0.07 }
            ]
        }),
    );
    let mut app = signed_in(mock);

    app.dispatch(Action::Classify).unwrap();
    app.settle().await.unwrap();

    assert_eq!(app.mode(), Mode::Classify);
    let genres: Vec<String> = app
        .state()
        .prediction
        .as_ref()
        .unwrap()
        .all_predictions
        .iter()
        .map(|p| p.genre.clone())
        .collect();
    assert_eq!(genres, vec!["edm", "house", "pop"]);
}

#[tokio::test]
async fn test_apply_saved_profile_to_vibe() {
    let mock = Arc::new(MockTransport::new());
    mock.reply(
        Method::Get,
        "/preferences",
        200,
        json!([{
            "id": 3,
            "name": "Chill",
            "danceability": 0.2,
            "energy": 0.3,
            "valence": 0.4,
            "acousticness": 0.8,
            "instrumentalness": 0.6,
            "speechiness": 0.05,
            "liveness": 0.1
        }]),
    );
    let mut app = signed_in(mock.clone());

    app.dispatch(Action::SwitchMode(Mode::Vibe)).unwrap();
    app.settle().await.unwrap();
    app.dispatch(Action::ApplyPreference(3)).unwrap();

    assert_eq!(app.state().vibe.acousticness, 0.8);
    assert_eq!(app.state().notice.as_deref(), Some("Applied profile 'Chill'"));

    app.dispatch(Action::SwitchMode(Mode::Search)).unwrap();
    app.dispatch(Action::SwitchMode(Mode::Vibe)).unwrap();
    assert_eq!(mock.count(Method::Get, "/preferences"), 1);
}

#[tokio::test]
async fn test_save_and_delete_profile_update_cache() {
    let mock = Arc::new(MockTransport::new());
    mock.reply(Method::Get, "/preferences", 200, json!([]));
    mock.reply(
        Method::Post,
        "/preferences",
        200,
        json!({
            "id": 9, "name": "Gym",
            "danceability": 0.5, "energy": 0.5, "valence": 0.5,
            "acousticness": 0.5, "instrumentalness": 0.5
        }),
    );
    mock.reply(Method::Delete, "/preferences/9", 200, json!({ "message": "Profile deleted" }));
    let mut app = signed_in(mock.clone());

    app.dispatch(Action::SwitchMode(Mode::Vibe)).unwrap();
    app.settle().await.unwrap();
    app.dispatch(Action::SavePreference("Gym".to_string())).unwrap();
    app.settle().await.unwrap();
    assert_eq!(app.state().preferences.as_ref().unwrap().len(), 1);

    let saved = mock
        .requests()
        .into_iter()
        .find(|r| r.method == Method::Post && r.path.ends_with("/preferences"))
        .unwrap();
    match saved.body {
        Body::Json(value) => {
            assert_eq!(value["name"], "Gym");
            assert_eq!(value["speechiness"], 0.05);
            assert_eq!(value["liveness"], 0.1);
        }
        other => panic!("Expected JSON body, got {:?}", other),
    }

    app.dispatch(Action::DeletePreference(9)).unwrap();
    app.settle().await.unwrap();
    assert!(app.state().preferences.as_ref().unwrap().is_empty());
}

// ---- Playlists ----

#[tokio::test]
async fn test_save_mood_list_generates_from_seed() {
    let mock = Arc::new(MockTransport::new());
    mock.reply(
        Method::Get,
        "/recommendations/mood/energetic",
        200,
        json!({ "recommendations": tracks(&["e1", "e2"]) }),
    );
    mock.reply(
        Method::Post,
        "/playlists/generate",
        200,
        json!({ "playlist_id": 5, "name": "Energetic Mix", "track_count": 20, "tracks": [] }),
    );
    let mut app = signed_in(mock.clone());

    app.dispatch(Action::SelectMood(Mood::Energetic)).unwrap();
    app.settle().await.unwrap();
    app.dispatch(Action::SavePlaylist(None)).unwrap();
    app.settle().await.unwrap();

    assert_eq!(mock.count(Method::Post, "/playlists/custom"), 0);
    let request = mock
        .requests()
        .into_iter()
        .find(|r| r.path.ends_with("/playlists/generate"))
        .unwrap();
    assert_eq!(
        request.query.as_deref(),
        Some("name=Energetic+Mix&limit=20&mood=energetic")
    );
    assert_eq!(
        app.state().notice.as_deref(),
        Some("Created playlist 'Energetic Mix' with 20 tracks")
    );
}

#[tokio::test]
async fn test_save_workout_list_freezes_tracks() {
    let mock = Arc::new(MockTransport::new());
    mock.reply(
        Method::Post,
        "/playlists/workout",
        200,
        json!({ "name": "Workout", "tracks": tracks(&["w1", "w2"]) }),
    );
    mock.reply(
        Method::Post,
        "/playlists/custom",
        200,
        json!({ "playlist_id": 6, "name": "Leg day", "tracks": [] }),
    );
    let mut app = signed_in(mock.clone());

    app.dispatch(Action::GenerateWorkout {
        duration_minutes: 45,
        intensity: Intensity::Medium,
    })
    .unwrap();
    app.settle().await.unwrap();
    app.dispatch(Action::SavePlaylist(Some("Leg day".to_string()))).unwrap();
    app.settle().await.unwrap();

    assert_eq!(mock.count(Method::Post, "/playlists/generate"), 0);
    let request = mock
        .requests()
        .into_iter()
        .find(|r| r.path.ends_with("/playlists/custom"))
        .unwrap();
    assert_eq!(
        request.body,
        Body::Json(json!({ "name": "Leg day", "track_ids": ["w1", "w2"] }))
    );
}

#[tokio::test]
async fn test_save_with_nothing_to_save() {
    let mock = Arc::new(MockTransport::new());
    let mut app = signed_in(mock.clone());

    app.dispatch(Action::SavePlaylist(Some("Empty".to_string()))).unwrap();

    assert!(app.state().error.is_some());
    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn test_adding_in_playlists_view_refreshes_list_and_detail() {
    let mock = Arc::new(MockTransport::new());
    mock.reply(Method::Get, "/playlists", 200, json!([{ "id": 1, "name": "Mine", "track_count": 1 }]));
    mock.reply(
        Method::Get,
        "/playlists/1",
        200,
        json!({ "id": 1, "name": "Mine", "tracks": tracks(&["t1"]) }),
    );
    mock.reply(Method::Post, "/playlists/2/tracks", 200, json!({ "message": "Track added" }));
    let mut app = signed_in(mock.clone());

    app.dispatch(Action::SelectPlaylist(1)).unwrap();
    app.settle().await.unwrap();
    assert_eq!(app.state().playlist_detail.as_ref().unwrap().tracks.len(), 1);

    app.dispatch(Action::AddToPlaylist {
        playlist_id: 2,
        track: TrackRef::Index(1),
    })
    .unwrap();
    app.settle().await.unwrap();

    let added = mock
        .requests()
        .into_iter()
        .find(|r| r.path.ends_with("/playlists/2/tracks"))
        .unwrap();
    assert_eq!(added.query.as_deref(), Some("track_id=t1"));
    assert_eq!(mock.count(Method::Get, "/playlists"), 2);
    assert_eq!(app.state().notice.as_deref(), Some("Added to playlist 2"));
}

#[tokio::test]
async fn test_create_and_add_sends_single_track() {
    let mock = Arc::new(MockTransport::new());
    mock.reply(Method::Get, "/search", 200, json!({ "results": tracks(&["q1", "q2"]) }));
    mock.reply(
        Method::Post,
        "/playlists/custom",
        200,
        json!({ "playlist_id": 8, "name": "Fresh", "track_count": 1 }),
    );
    let mut app = signed_in(mock.clone());

    app.dispatch(Action::Search("q".to_string())).unwrap();
    app.settle().await.unwrap();
    app.dispatch(Action::CreateAndAdd {
        name: "Fresh".to_string(),
        track: TrackRef::Index(2),
    })
    .unwrap();
    app.settle().await.unwrap();

    let request = mock
        .requests()
        .into_iter()
        .find(|r| r.path.ends_with("/playlists/custom"))
        .unwrap();
    assert_eq!(request.body, Body::Json(json!({ "name": "Fresh", "track_ids": ["q2"] })));
    assert_eq!(app.state().notice.as_deref(), Some("Created playlist 'Fresh' with 1 tracks"));
}

#[rstest]
#[case::generate_from_seed(
    vec![Action::SelectMood(Mood::Energetic), Action::SavePlaylist(None)],
    "/playlists/generate"
)]
#[case::custom(
    vec![
        Action::Search("q".to_string()),
        Action::CreateAndAdd { name: "Fresh".to_string(), track: TrackRef::Index(1) },
    ],
    "/playlists/custom"
)]
#[case::workout(
    vec![Action::GenerateWorkout { duration_minutes: 45, intensity: Intensity::High }],
    "/playlists/workout"
)]
#[tokio::test]
async fn test_401_from_playlist_service_signs_out(#[case] steps: Vec<Action>, #[case] path: &str) {
    let mock = Arc::new(MockTransport::new());
    mock.reply(Method::Get, "/search", 200, json!({ "results": tracks(&["q1"]) }));
    mock.reply(
        Method::Get,
        "/recommendations/mood/energetic",
        200,
        json!({ "recommendations": tracks(&["e1"]) }),
    );
    mock.reply(Method::Post, path, 401, json!({ "detail": "Token expired" }));
    let mut app = signed_in(mock.clone());

    for step in steps {
        app.dispatch(step).unwrap();
        app.settle().await.unwrap();
    }

    assert_eq!(mock.count(Method::Post, path), 1);
    assert_eq!(app.mode(), Mode::Unauthenticated);
    assert!(app.current_user().is_none());
    assert!(app.session().token().is_none());
    assert_eq!(app.state().error.as_deref(), Some("Session expired. Please log in again."));
}
