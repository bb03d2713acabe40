//! Layout helpers for the chat screen.

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Smallest terminal the chat screen is drawn in.
pub const MIN_WIDTH: u16 = 40;
pub const MIN_HEIGHT: u16 = 10;

/// Height of the input bar including borders.
pub const INPUT_HEIGHT: u16 = 3;

/// Areas of the chat screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChatLayout {
    pub transcript: Rect,
    pub input: Rect,
    pub status: Rect,
}

/// Split the screen: transcript on top, then input bar, then status bar.
pub fn chat_layout(area: Rect) -> ChatLayout {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),
            Constraint::Length(INPUT_HEIGHT),
            Constraint::Length(1),
        ])
        .split(area);
    ChatLayout {
        transcript: chunks[0],
        input: chunks[1],
        status: chunks[2],
    }
}

/// Whether `area` is too small to draw the chat screen.
pub fn is_too_small(area: Rect) -> bool {
    area.width < MIN_WIDTH || area.height < MIN_HEIGHT
}

/// Create a centered rect with fixed dimensions.
pub fn centered_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}
