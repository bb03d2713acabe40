//! Full-width input bar widget.
//!
//! Supports multi-line input with Ctrl+J for newlines. While a response is
//! pending the bar is disabled and shows the placeholder instead.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use crate::input::TextInputState;
use crate::theme::Theme;

/// Full-width input bar for text entry.
pub struct InputBar<'a> {
    input: &'a TextInputState,
    theme: &'a Theme,
    placeholder: &'a str,
    disabled: bool,
}

impl<'a> InputBar<'a> {
    pub fn new(input: &'a TextInputState, theme: &'a Theme) -> Self {
        Self {
            input,
            theme,
            placeholder: "",
            disabled: false,
        }
    }

    #[must_use]
    pub fn placeholder(mut self, placeholder: &'a str) -> Self {
        self.placeholder = placeholder;
        self
    }

    /// Disable editing (a request is in flight).
    #[must_use]
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Lines for the current content and the index of the line with the cursor.
    fn build_input_lines(&self) -> (Vec<Line<'static>>, usize) {
        let cursor_style = Style::default().fg(self.theme.primary);
        let prompt_style = Style::default().fg(self.theme.primary);

        if self.input.is_empty() {
            let line = Line::from(vec![
                Span::styled("> ", prompt_style),
                Span::styled("█", cursor_style),
                Span::styled(
                    self.placeholder.to_string(),
                    Style::default().fg(self.theme.muted),
                ),
            ]);
            return (vec![line], 0);
        }

        let cursor = self.input.cursor();
        let mut lines = Vec::new();
        let mut cursor_line = 0;
        // Characters before the current line, newlines included.
        let mut offset = 0;

        for (idx, text) in self.input.content().split('\n').enumerate() {
            let prefix = if idx == 0 { "> " } else { "  " };
            let mut spans = vec![Span::styled(prefix, prompt_style)];
            let len = text.chars().count();

            if (offset..=offset + len).contains(&cursor) {
                let col = cursor - offset;
                spans.push(Span::raw(text.chars().take(col).collect::<String>()));
                spans.push(Span::styled("█", cursor_style));
                spans.push(Span::raw(text.chars().skip(col).collect::<String>()));
                cursor_line = idx;
            } else {
                spans.push(Span::raw(text.to_string()));
            }
            lines.push(Line::from(spans));
            offset += len + 1;
        }

        (lines, cursor_line)
    }
}

impl Widget for InputBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border_style = if self.disabled {
            Style::default().fg(self.theme.border)
        } else {
            Style::default().fg(self.theme.border_focused)
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style);

        let paragraph = if self.disabled {
            Paragraph::new(format!("● {}", self.placeholder))
                .block(block)
                .style(
                    Style::default()
                        .fg(self.theme.muted)
                        .add_modifier(Modifier::ITALIC),
                )
        } else {
            let inner_height = usize::from(area.height.saturating_sub(2));
            let (lines, cursor_line) = self.build_input_lines();
            let scroll_offset = if lines.len() <= inner_height {
                0
            } else {
                cursor_line.saturating_sub(inner_height.saturating_sub(1))
            };

            Paragraph::new(lines)
                .block(block)
                .style(Style::default().fg(self.theme.text))
                .scroll((u16::try_from(scroll_offset).unwrap_or(u16::MAX), 0))
        };

        paragraph.render(area, buf);
    }
}
