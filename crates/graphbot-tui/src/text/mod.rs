//! Text rendering utilities.
//!
//! - [`render_markdown`] - Render bot markdown to styled ratatui Lines
//! - [`wrap_text`], [`wrap_lines`], [`indent_lines`] - Wrapping helpers
//! - [`visual_width`], [`truncate_to_width`] - Cell-width helpers

mod markdown;
mod styles;
mod width;
mod wrap;

pub use markdown::render_markdown;
pub use width::{truncate_to_width, visual_width};
pub use wrap::{indent_lines, wrap_lines, wrap_text};
