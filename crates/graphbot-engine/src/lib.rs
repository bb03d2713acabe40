//! graphbot-engine: Headless conversation engine for the GraphBot chat client
//!
//! This crate provides everything below the terminal UI:
//! - Display records and the wire protocol of the response service
//! - The conversation state machine (submit, complete, clear)
//! - The HTTP backend and its trait seam
//! - Configuration loading

pub mod backend;
pub mod config;
pub mod conversation;
pub mod protocol;
pub mod record;

// Re-export commonly used types
pub use backend::{BackendError, ChatBackend, HttpBackend, ImagePayload};
pub use config::{
    Config, ConfigError, StaleResponsePolicy, ThemeChoice, CONFIG_FILE, GRAPHBOT_DIR,
};
pub use conversation::{
    Completion, CompletionStatus, Conversation, PendingRequest, RequestToken, SubmissionPhase,
};
pub use protocol::{
    image_url, GenerateRequest, GenerateResponse, MessagePart, PartKind, FALLBACK_ERROR_TEXT,
    IMAGE_FAILED_TEXT, TRANSPORT_ERROR_TEXT,
};
pub use record::{DisplayRecord, RecordKind};

/// Returns the engine version.
pub fn engine_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
