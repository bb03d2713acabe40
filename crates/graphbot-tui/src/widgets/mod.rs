//! UI widgets for the chat screen.
//!
//! - [`InputBar`] - Message entry, disabled while a response is pending
//! - [`StatusBar`] - Bottom line with submission state and key hints
//! - [`HelpOverlay`] - Keybinding reference

mod help;
mod input_bar;
mod status_bar;

pub use help::HelpOverlay;
pub use input_bar::InputBar;
pub use status_bar::StatusBar;
