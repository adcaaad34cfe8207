//! REPL command parsing. Each line maps to exactly one controller action.

use crate::action::{Action, TrackRef};
use crate::api::{Intensity, Mood};
use crate::app::Mode;

pub const HELP: &str = "\
Session:     login <email> <password> | signup <email> <password> | logout
Modes:       mode <name> | search | mood | vibe | genres | playlists | classify
             analytics | trends | workout | discover
Search:      search <query> | select <n|track_id> | play <n|track_id>
Mood:        mood <happy|sad|energetic|calm|focused>
Vibe:        set <feature> <0..1> | check | classify
Profiles:    profiles | profile save <name> | profile apply <id> | profile delete <id>
Genres:      genre <name>
Workout:     workout <minutes> <low|medium|high> | workout reset
Playlists:   playlist <id> | save [name] | add <n|track_id> <playlist_id>
             new <n|track_id> <name>
Other:       show | help | quit";

/// Parse one input line. Blank lines are a no-op.
pub fn parse(line: &str) -> Result<Action, String> {
    let line = line.trim();
    let (command, rest) = match line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    };
    let args: Vec<&str> = rest.split_whitespace().collect();

    let action = match command.to_ascii_lowercase().as_str() {
        "" => Action::Noop,
        "help" | "?" => Action::Help,
        "show" | "ls" => Action::Show,
        "quit" | "exit" | "q" => Action::Quit,

        "login" | "signup" => {
            let [email, password] = args[..] else {
                return Err(format!("Usage: {} <email> <password>", command));
            };
            let (email, password) = (email.to_string(), password.to_string());
            if command.eq_ignore_ascii_case("login") {
                Action::Login { email, password }
            } else {
                Action::Signup { email, password }
            }
        }
        "logout" => Action::Logout,

        "mode" | "tab" => Action::SwitchMode(rest.parse::<Mode>()?),
        "discover" | "discovery" => Action::PersonalizedDiscovery,

        "search" if rest.is_empty() => Action::SwitchMode(Mode::Search),
        "search" | "find" => Action::Search(rest.to_string()),
        "select" => Action::SelectTrack(track_ref(rest)?),
        "play" => Action::PlayTrack(track_ref(rest)?),

        "mood" if rest.is_empty() => Action::SwitchMode(Mode::Mood),
        "mood" => Action::SelectMood(rest.parse::<Mood>()?),

        "vibe" if rest.is_empty() => Action::SwitchMode(Mode::Vibe),
        "vibe" if rest.eq_ignore_ascii_case("check") => Action::VibeCheck,
        "check" => Action::VibeCheck,
        "set" | "vibe" => {
            let [feature, value] = args[..] else {
                return Err("Usage: set <feature> <value>".to_string());
            };
            Action::SetVibe {
                feature: feature.to_ascii_lowercase(),
                value: value
                    .parse::<f64>()
                    .map_err(|_| format!("Not a number: {}", value))?,
            }
        }
        "classify" => Action::Classify,

        "profiles" => Action::RefreshPreferences,
        "profile" => match args.as_slice() {
            ["save", ..] if args.len() > 1 => Action::SavePreference(args[1..].join(" ")),
            ["apply", id] => Action::ApplyPreference(number(id)?),
            ["delete", id] => Action::DeletePreference(number(id)?),
            _ => return Err("Usage: profile save <name> | profile apply <id> | profile delete <id>".to_string()),
        },

        "genres" => Action::SwitchMode(Mode::Genres),
        "genre" if rest.is_empty() => Action::SwitchMode(Mode::Genres),
        "genre" => Action::SelectGenre(rest.to_string()),

        "workout" if rest.is_empty() => Action::SwitchMode(Mode::Workout),
        "workout" if rest.eq_ignore_ascii_case("reset") => Action::ResetWorkout,
        "workout" => {
            let [minutes, intensity] = args[..] else {
                return Err("Usage: workout <minutes> <low|medium|high>".to_string());
            };
            Action::GenerateWorkout {
                duration_minutes: number(minutes)?,
                intensity: intensity.parse::<Intensity>()?,
            }
        }

        "analytics" => Action::SwitchMode(Mode::Analytics),
        "trends" => Action::SwitchMode(Mode::Trends),

        "playlists" => Action::SwitchMode(Mode::Playlists),
        "playlist" if rest.is_empty() => Action::SwitchMode(Mode::Playlists),
        "playlist" => Action::SelectPlaylist(number(rest)?),
        "save" => Action::SavePlaylist(Some(rest.to_string()).filter(|name| !name.is_empty())),
        "add" => {
            let [track, playlist_id] = args[..] else {
                return Err("Usage: add <n|track_id> <playlist_id>".to_string());
            };
            Action::AddToPlaylist {
                playlist_id: number(playlist_id)?,
                track: track_ref(track)?,
            }
        }
        "new" => {
            let Some((track, name)) = rest.split_once(char::is_whitespace) else {
                return Err("Usage: new <n|track_id> <name>".to_string());
            };
            Action::CreateAndAdd {
                name: name.trim().to_string(),
                track: track_ref(track)?,
            }
        }

        other => return Err(format!("Unknown command: {} (try 'help')", other)),
    };
    Ok(action)
}

/// A bare number is a 1-based position; anything else is a track id.
fn track_ref(raw: &str) -> Result<TrackRef, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err("Which track? Give a position or a track id".to_string());
    }
    match raw.parse::<usize>() {
        Ok(0) => Err("Positions start at 1".to_string()),
        Ok(n) => Ok(TrackRef::Index(n)),
        Err(_) => Ok(TrackRef::Id(raw.to_string())),
    }
}

fn number<T: std::str::FromStr>(raw: &str) -> Result<T, String> {
    raw.trim().parse::<T>().map_err(|_| format!("Not a number: {}", raw))
}
