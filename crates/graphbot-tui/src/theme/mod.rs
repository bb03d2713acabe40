//! Theme components for the TUI.
//!
//! - [`Theme`] - Color palette (Catppuccin Mocha/Latte/High Contrast)

mod colors;

pub use colors::Theme;
