//! graphbot-tui: Terminal chat client for GraphBot
//!
//! This crate provides the interactive layer:
//! - The chat screen (transcript, input bar, status bar, help)
//! - Markdown rendering for bot replies
//! - The event loop that runs requests and image fetches in the background

mod app;
mod conversation;
mod event;
mod images;
mod input;
mod layout;
mod screen;
#[cfg(test)]
pub mod test_utils;
mod text;
mod theme;
mod widgets;

pub use app::App;
pub use event::{Action, Event, EventHandler};
pub use graphbot_engine;
pub use theme::Theme;

use std::io::{self, stdout};
use std::sync::Arc;

use crossterm::{
    cursor::Show as ShowCursor,
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use graphbot_engine::{
    BackendError, ChatBackend, Config, GenerateResponse, ImagePayload, PendingRequest,
    RequestToken,
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::task::JoinHandle;

/// Tick interval; drives the thinking animation and notification expiry.
const TICK_RATE_MS: u64 = 250;

/// RAII guard for terminal state restoration.
struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(stdout(), DisableMouseCapture, LeaveAlternateScreen, ShowCursor);
    }
}

/// Background work started by the loop.
///
/// Each request task carries its token, so a task that dies without a
/// result can still be completed and the input re-enabled.
#[derive(Default)]
struct Tasks {
    requests: Vec<(RequestToken, JoinHandle<Result<GenerateResponse, BackendError>>)>,
    images: Vec<(String, JoinHandle<Result<ImagePayload, BackendError>>)>,
}

impl Tasks {
    fn spawn_request(&mut self, backend: &Arc<dyn ChatBackend>, pending: PendingRequest) {
        let backend = Arc::clone(backend);
        let request = pending.request();
        let handle = tokio::spawn(async move { backend.generate(&request).await });
        self.requests.push((pending.token, handle));
    }

    fn spawn_image(&mut self, backend: &Arc<dyn ChatBackend>, image_id: String) {
        let backend = Arc::clone(backend);
        let id = image_id.clone();
        let handle = tokio::spawn(async move { backend.fetch_image(&id).await });
        self.images.push((image_id, handle));
    }

    /// Hand finished results to the app.
    async fn collect(&mut self, app: &mut App) {
        let mut i = 0;
        while i < self.requests.len() {
            if self.requests[i].1.is_finished() {
                let (token, handle) = self.requests.remove(i);
                let outcome = handle
                    .await
                    .unwrap_or_else(|e| Err(BackendError::Interrupted(e.to_string())));
                app.complete_request(token, outcome);
            } else {
                i += 1;
            }
        }

        let mut i = 0;
        while i < self.images.len() {
            if self.images[i].1.is_finished() {
                let (image_id, handle) = self.images.remove(i);
                let outcome = handle
                    .await
                    .unwrap_or_else(|e| Err(BackendError::Interrupted(e.to_string())));
                app.resolve_image(&image_id, outcome);
            } else {
                i += 1;
            }
        }
    }

    fn abort_all(self) {
        for (_, handle) in self.requests {
            handle.abort();
        }
        for (_, handle) in self.images {
            handle.abort();
        }
    }
}

/// Run the TUI application.
///
/// Sets up the terminal, runs the event loop until the user quits, and
/// restores the terminal on exit.
pub async fn run_tui(
    config: &Config,
    backend: Arc<dyn ChatBackend>,
) -> Result<(), Box<dyn std::error::Error>> {
    enable_raw_mode()?;
    let _guard = TerminalGuard;

    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let mut app = App::new(config);
    let mut events = EventHandler::new(TICK_RATE_MS);

    tracing::info!(
        session = %app.conversation.session_id(),
        api = %config.api_base_url,
        "Chat session started"
    );

    let result = run_loop(&mut terminal, &mut app, &mut events, &backend).await;

    terminal.show_cursor()?;
    result
}

async fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &mut EventHandler,
    backend: &Arc<dyn ChatBackend>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut tasks = Tasks::default();

    loop {
        terminal.draw(|frame| screen::render(app, frame.area(), frame.buffer_mut()))?;

        if let Some(event) = events.next().await {
            match event {
                Event::Key(key) => {
                    if let Some(pending) = app.handle_key(key) {
                        tasks.spawn_request(backend, pending);
                    }
                }
                Event::Mouse(mouse) => app.handle_mouse(mouse),
                Event::Tick => app.tick(),
                Event::Resize(_, _) => {}
            }
        }

        tasks.collect(app).await;
        for image_id in app.claim_image_fetches() {
            tasks.spawn_image(backend, image_id);
        }

        if app.should_quit {
            tasks.abort_all();
            break;
        }
    }

    tracing::info!(session = %app.conversation.session_id(), "Chat session ended");
    Ok(())
}

/// Get the TUI version.
pub fn tui_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
