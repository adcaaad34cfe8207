// Event loop - main run() method over stdin lines and background completions

use std::io::Write as _;

use tokio::io::{AsyncBufReadExt, BufReader};

use super::App;
use crate::action::Action;
use crate::error::Result;
use crate::input;
use crate::view;

const PROMPT: &str = "vibe> ";

impl App {
    pub async fn run(&mut self) -> Result<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        self.dispatch(Action::RestoreSession)?;
        self.draw_if_loading()?;
        let mut needs_render = true;

        loop {
            // ---- 1. Draw once everything pending has landed ----

            if needs_render && !self.is_loading() {
                self.draw()?;
                needs_render = false;
            }

            if self.should_quit {
                break;
            }

            // ---- 2. Wait for a command or a completion ----

            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line? else {
                        tracing::debug!("stdin closed");
                        break;
                    };
                    match input::parse(&line) {
                        Ok(Action::Help) => {
                            println!("{}", input::HELP);
                            self.prompt()?;
                        }
                        Ok(Action::Noop) => self.prompt()?,
                        Ok(action) => {
                            self.dispatch(action)?;
                            // Show the pending marker now; the full view follows once settled.
                            self.draw_if_loading()?;
                            needs_render = true;
                        }
                        Err(message) => {
                            println!("{}", message);
                            self.prompt()?;
                        }
                    }
                }
                Some(action) = self.event_rx.recv() => {
                    // Play events are fire-and-forget; nothing on screen changes.
                    let visible = !matches!(action, Action::PlayRecorded { .. });
                    self.complete(action)?;
                    needs_render |= visible;
                }
            }
        }

        Ok(())
    }

    fn frame(&self) -> String {
        let user = self.current_user();
        view::render(&self.state, user.as_ref(), self.is_loading())
    }

    /// The frame to print right after a command, while its requests are in flight.
    fn loading_frame(&self) -> Option<String> {
        self.is_loading().then(|| self.frame())
    }

    fn draw(&self) -> Result<()> {
        print!("{}", self.frame());
        self.prompt()
    }

    fn draw_if_loading(&self) -> Result<()> {
        if let Some(frame) = self.loading_frame() {
            print!("{}", frame);
        }
        Ok(())
    }

    fn prompt(&self) -> Result<()> {
        let mut stdout = std::io::stdout();
        write!(stdout, "{}", PROMPT)?;
        stdout.flush()?;
        Ok(())
    }
}
