mod action;
mod api;
mod app;
mod cli;
mod config;
mod error;
mod gateway;
mod input;
mod logging;
mod session;
mod view;
mod workout;

use color_eyre::eyre::{eyre, Result};

use action::Action;
use app::App;
use cli::{Cli, Command};
use config::{ConfigManager, SessionManager};
use session::SessionStore;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse_args();
    let config = ConfigManager::from_cli(&cli)?;
    let _log_guard = logging::init(&config.app_config().general)?;
    tracing::info!(config = %config.config_path().display(), "Starting vibe-control");

    let persistence = match &cli.session_file {
        Some(path) => SessionManager::with_path(path.clone()),
        None => SessionManager::new()?,
    };

    match cli.command() {
        Command::InitConfig => {
            if config.write_default_config()? {
                println!("Wrote {}", config.config_path().display());
            } else {
                println!("{} already exists", config.config_path().display());
            }
        }
        Command::Logout => {
            if persistence.exists() {
                persistence.clear()?;
                println!("Logged out");
            } else {
                println!("No saved session");
            }
        }
        Command::Login { email, password } => {
            let mut app = App::new(config.app_config(), SessionStore::new(persistence))?;
            app.dispatch(Action::Login { email, password })?;
            app.settle().await?;
            match app.current_user() {
                Some(user) => println!("Logged in as {}", user.email),
                None => return Err(eyre!(app.state().error.clone().unwrap_or_else(|| "Login failed".to_string()))),
            }
        }
        Command::Whoami => {
            let mut app = App::new(config.app_config(), SessionStore::new(persistence))?;
            app.dispatch(Action::RestoreSession)?;
            app.settle().await?;
            match app.current_user() {
                Some(user) => println!("{} (id {})", user.email, user.id),
                None => println!("Not logged in"),
            }
        }
        Command::Run => {
            let mut app = App::new(config.app_config(), SessionStore::new(persistence))?;
            app.run().await?;
        }
    }

    Ok(())
}
