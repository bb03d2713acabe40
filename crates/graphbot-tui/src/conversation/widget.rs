//! Conversation pane widget.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph, Widget},
};

use crate::theme::Theme;

use super::scroll::TranscriptScroll;
use super::transcript::TranscriptView;

/// Bordered transcript pane.
///
/// ```text
/// ┌ GraphBot Chat ─────────────── [Ctrl+L] Clear ┐
/// │You  14:02                                    │
/// │  bar chart of monthly sales                  │
/// │                                              │
/// │GraphBot  14:02                               │
/// │  Here is your chart:                         │
/// └──────────────────────────────── ↓ 12 more ───┘
/// ```
pub struct ConversationPane<'a> {
    view: TranscriptView<'a>,
    scroll: &'a TranscriptScroll,
    theme: &'a Theme,
}

impl<'a> ConversationPane<'a> {
    pub fn new(view: TranscriptView<'a>, scroll: &'a TranscriptScroll, theme: &'a Theme) -> Self {
        Self {
            view,
            scroll,
            theme,
        }
    }
}

impl Widget for ConversationPane<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.border))
            .title(Line::styled(
                " GraphBot Chat ",
                Style::default()
                    .fg(self.theme.primary)
                    .add_modifier(Modifier::BOLD),
            ))
            .title_top(
                Line::styled(" [Ctrl+L] Clear ", Style::default().fg(self.theme.muted))
                    .right_aligned(),
            );
        if !self.scroll.is_following() {
            block = block.title_bottom(
                Line::styled(
                    format!(" ↓ {} more ", self.scroll.hidden_below()),
                    Style::default().fg(self.theme.warning),
                )
                .right_aligned(),
            );
        }

        let inner = block.inner(area);
        block.render(area, buf);
        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let lines = self.view.lines(usize::from(inner.width));
        let height = usize::from(inner.height);
        let start = self.scroll.visible_start(lines.len(), height);
        let visible: Vec<Line<'static>> = lines.into_iter().skip(start).take(height).collect();

        Paragraph::new(visible).render(inner, buf);
    }
}
