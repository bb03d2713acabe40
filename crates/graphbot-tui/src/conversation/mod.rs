//! Conversation transcript.
//!
//! - [`TranscriptView`] - turns records into styled lines
//! - [`TranscriptScroll`] - line scroll with follow mode
//! - [`ConversationPane`] - bordered widget showing the visible slice

mod placeholder;
mod scroll;
mod transcript;
mod widget;

pub use placeholder::input_placeholder;
pub use scroll::{TranscriptScroll, SCROLL_SPEED};
pub use transcript::TranscriptView;
pub use widget::ConversationPane;
