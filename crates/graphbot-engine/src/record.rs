//! Display records: the rendered turns of a conversation.
//!
//! A [`DisplayRecord`] is created once and never mutated. The constructors
//! guarantee which fields are present for each [`RecordKind`].

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

/// Kind of a display record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecordKind {
    /// Text typed by the user.
    User,
    /// Markdown text returned by the server.
    BotText,
    /// Reference to a generated graph image.
    BotImage,
    /// A failed turn.
    Error,
}

impl RecordKind {
    /// Short label used in transcript headers and plain output.
    pub fn label(self) -> &'static str {
        match self {
            Self::User => "You",
            Self::BotText | Self::BotImage => "GraphBot",
            Self::Error => "Error",
        }
    }

    /// Whether this record was produced by the server.
    pub fn is_bot(self) -> bool {
        matches!(self, Self::BotText | Self::BotImage)
    }
}

/// One rendered turn in the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayRecord {
    id: u64,
    kind: RecordKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_id: Option<String>,
    at: DateTime<Utc>,
}

impl DisplayRecord {
    fn new(id: u64, kind: RecordKind, text: Option<String>, image_id: Option<String>) -> Self {
        Self {
            id,
            kind,
            text,
            image_id,
            at: Utc::now(),
        }
    }

    /// Create a user record.
    pub fn user(id: u64, text: impl Into<String>) -> Self {
        Self::new(id, RecordKind::User, Some(text.into()), None)
    }

    /// Create a bot text record (markdown).
    pub fn bot_text(id: u64, text: impl Into<String>) -> Self {
        Self::new(id, RecordKind::BotText, Some(text.into()), None)
    }

    /// Create a bot image record.
    pub fn bot_image(id: u64, image_id: impl Into<String>) -> Self {
        Self::new(id, RecordKind::BotImage, None, Some(image_id.into()))
    }

    /// Create an error record.
    pub fn error(id: u64, text: impl Into<String>) -> Self {
        Self::new(id, RecordKind::Error, Some(text.into()), None)
    }

    /// Sequence number within the owning conversation.
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    /// Text content. `None` only for [`RecordKind::BotImage`].
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Image identifier. `Some` only for [`RecordKind::BotImage`].
    pub fn image_id(&self) -> Option<&str> {
        self.image_id.as_deref()
    }

    /// Arrival time formatted for display (HH:MM in local time).
    pub fn time_str(&self) -> String {
        let local: DateTime<Local> = self.at.into();
        local.format("%H:%M").to_string()
    }
}
