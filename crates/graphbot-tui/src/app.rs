//! Application state for the chat TUI.
//!
//! [`App`] owns no network handles: it hands out [`PendingRequest`]s and
//! image ids for the run loop to execute, and takes their results back.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use graphbot_engine::{
    image_url, BackendError, Completion, CompletionStatus, Config, Conversation, GenerateResponse,
    ImagePayload, PendingRequest, RecordKind, RequestToken,
};

use crate::conversation::{TranscriptScroll, SCROLL_SPEED};
use crate::event::{key_to_action, Action};
use crate::images::ImageCache;
use crate::input::TextInputState;
use crate::theme::Theme;

/// Ticks a notification stays visible (about three seconds at 4 Hz).
const NOTIFICATION_TICKS: usize = 12;

/// Main application state.
pub struct App {
    pub conversation: Conversation,
    pub input: TextInputState,
    pub scroll: TranscriptScroll,
    pub images: ImageCache,
    pub theme: Theme,
    pub api_base_url: String,
    pub show_help: bool,
    pub should_quit: bool,
    /// Tick counter for animations.
    pub tick: usize,
    notification: Option<String>,
    /// Ticks remaining until the notification is cleared.
    notification_ttl: usize,
    /// Conversation revision the view was last scrolled for.
    seen_revision: u64,
}

impl App {
    pub fn new(config: &Config) -> Self {
        let conversation = Conversation::new(config.stale_responses);
        let seen_revision = conversation.revision();
        Self {
            conversation,
            input: TextInputState::new(),
            scroll: TranscriptScroll::new(),
            images: ImageCache::new(),
            theme: Theme::from_choice(config.theme),
            api_base_url: config.api_base_url.clone(),
            show_help: false,
            should_quit: false,
            tick: 0,
            notification: None,
            notification_ttl: 0,
            seen_revision,
        }
    }

    /// Whether a response is pending; the input is disabled meanwhile.
    pub fn awaiting_response(&self) -> bool {
        self.conversation.awaiting_response()
    }

    pub fn notification(&self) -> Option<&str> {
        self.notification.as_deref()
    }

    /// Handle a key press. Returns a request to send if the key submitted one.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<PendingRequest> {
        if self.show_help {
            // Any key closes help; Ctrl+C still quits.
            self.show_help = false;
            if key_to_action(key) == Action::Quit && key.code != KeyCode::Esc {
                self.should_quit = true;
            }
            return None;
        }

        let action = key_to_action(key);
        if action == Action::None {
            self.handle_text_key(key);
            return None;
        }
        self.handle_action(action)
    }

    /// Apply an action. Returns a request to send for [`Action::Submit`].
    pub fn handle_action(&mut self, action: Action) -> Option<PendingRequest> {
        match action {
            Action::Quit => self.should_quit = true,
            Action::Help => self.show_help = !self.show_help,
            Action::Submit => return self.submit(),
            Action::Clear => self.clear(),
            Action::Copy => self.copy_last_reply(),
            Action::Paste => self.paste(),
            Action::Newline => {
                if !self.awaiting_response() {
                    self.input.insert('\n');
                }
            }
            Action::HistoryPrev => {
                if !self.awaiting_response() {
                    self.input.history_prev();
                }
            }
            Action::HistoryNext => {
                if !self.awaiting_response() {
                    self.input.history_next();
                }
            }
            Action::PageUp => self.scroll.page_up(),
            Action::PageDown => self.scroll.page_down(),
            Action::ScrollTop => self.scroll.to_top(),
            Action::ScrollBottom => self.scroll.follow(),
            Action::None => {}
        }
        None
    }

    /// Editing keys for the input bar. Ignored while a response is pending.
    fn handle_text_key(&mut self, key: KeyEvent) {
        if self.awaiting_response() {
            return;
        }
        if key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
            return;
        }
        match key.code {
            KeyCode::Char(c) => self.input.insert(c),
            KeyCode::Backspace => self.input.backspace(),
            KeyCode::Delete => self.input.delete(),
            KeyCode::Left => self.input.move_left(),
            KeyCode::Right => self.input.move_right(),
            KeyCode::Home => self.input.move_home(),
            KeyCode::End => self.input.move_end(),
            _ => {}
        }
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        match mouse.kind {
            MouseEventKind::ScrollUp => self.scroll.scroll_up(SCROLL_SPEED),
            MouseEventKind::ScrollDown => self.scroll.scroll_down(SCROLL_SPEED),
            _ => {}
        }
    }

    /// Send the input text if it is non-blank and nothing is pending.
    ///
    /// On success the input is cleared and the user record is already shown.
    pub fn submit(&mut self) -> Option<PendingRequest> {
        if !self.conversation.can_submit(self.input.content()) {
            return None;
        }
        let pending = self.conversation.begin_submit(self.input.content())?;
        self.input.submit();
        self.sync_scroll();
        Some(pending)
    }

    /// Apply the outcome of the request identified by `token`.
    pub fn complete_request(
        &mut self,
        token: RequestToken,
        outcome: Result<GenerateResponse, BackendError>,
    ) -> Completion {
        let completion = self.conversation.complete(token, outcome);
        if !completion.ignored_parts.is_empty() {
            self.set_notification(format!(
                "Skipped unsupported reply part: {}",
                completion.ignored_parts.join(", ")
            ));
        }
        if completion.status == CompletionStatus::Stale {
            tracing::debug!(seq = token.seq, "Reply arrived after clear and was dropped");
        }
        self.sync_scroll();
        completion
    }

    /// Remove every record. A pending request stays pending.
    pub fn clear(&mut self) {
        self.conversation.clear();
        self.images.retain_referenced(self.conversation.records());
        self.sync_scroll();
    }

    /// Image ids that need fetching; each is handed out once.
    pub fn claim_image_fetches(&mut self) -> Vec<String> {
        self.images.claim_unfetched(self.conversation.records())
    }

    pub fn resolve_image(&mut self, image_id: &str, outcome: Result<ImagePayload, BackendError>) {
        self.images.resolve(image_id, outcome);
    }

    /// Text of the latest bot reply: markdown for text, the URL for images.
    pub fn last_reply_text(&self) -> Option<String> {
        let record = self.conversation.last_bot_record()?;
        match record.kind() {
            RecordKind::BotImage => record
                .image_id()
                .map(|id| image_url(&self.api_base_url, id)),
            _ => record.text().map(str::to_string),
        }
    }

    fn copy_last_reply(&mut self) {
        let Some(text) = self.last_reply_text() else {
            self.set_notification("Nothing to copy yet".to_string());
            return;
        };
        match arboard::Clipboard::new().and_then(|mut c| c.set_text(text)) {
            Ok(()) => self.set_notification("Copied last reply".to_string()),
            Err(e) => {
                tracing::warn!(error = %e, "Clipboard unavailable");
                self.set_notification("Clipboard unavailable".to_string());
            }
        }
    }

    fn paste(&mut self) {
        if self.awaiting_response() {
            return;
        }
        if let Ok(text) = arboard::Clipboard::new().and_then(|mut c| c.get_text()) {
            self.input.insert_str(&text.replace("\r\n", "\n"));
        }
    }

    /// Keep the newest record in view after every change to the record list.
    fn sync_scroll(&mut self) {
        let revision = self.conversation.revision();
        if revision != self.seen_revision {
            self.seen_revision = revision;
            self.scroll.follow();
        }
    }

    /// Show a temporary message in the status bar.
    pub fn set_notification(&mut self, msg: String) {
        self.notification = Some(msg);
        self.notification_ttl = NOTIFICATION_TICKS;
    }

    /// Advance animations and expire notifications.
    pub fn tick(&mut self) {
        self.tick = self.tick.wrapping_add(1);
        if self.notification_ttl > 0 {
            self.notification_ttl -= 1;
            if self.notification_ttl == 0 {
                self.notification = None;
            }
        }
    }
}
