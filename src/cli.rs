use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Vibe-Control: terminal client for a music intelligence backend
#[derive(Parser, Debug, Clone)]
#[command(name = "vibe-control")]
#[command(author = "RidgetopAI")]
#[command(version)]
#[command(about = "Search, recommendations, workout mixes and playlists from the terminal", long_about = None)]
pub struct Cli {
    /// Config file to load instead of the platform default
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error). Overrides config; RUST_LOG overrides both.
    #[arg(long)]
    pub log_level: Option<String>,

    /// Base URL used by every backend service without its own address
    #[arg(long, env = "VIBE_API_BASE")]
    pub api_base: Option<String>,

    /// Auth service address
    #[arg(long, env = "VIBE_AUTH_SERVICE")]
    pub auth_service: Option<String>,

    /// Recommender service address
    #[arg(long, env = "VIBE_RECOMMENDER_SERVICE")]
    pub recommender_service: Option<String>,

    /// Analytics service address
    #[arg(long, env = "VIBE_ANALYTICS_SERVICE")]
    pub analytics_service: Option<String>,

    /// Playlist service address
    #[arg(long, env = "VIBE_PLAYLIST_SERVICE")]
    pub playlist_service: Option<String>,

    /// Where the session token is persisted
    #[arg(long, value_name = "FILE")]
    pub session_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Interactive session (default)
    Run,
    /// Log in and persist the session token
    Login { email: String, password: String },
    /// Forget the persisted session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Write a default config file if none exists
    InitConfig,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Run)
    }
}
