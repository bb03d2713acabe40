//! Keybinding help overlay.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget},
};

use crate::layout::centered_fixed;
use crate::theme::Theme;

const BINDINGS: [(&str, &str); 11] = [
    ("Enter", "Send message"),
    ("Ctrl+J", "Insert newline"),
    ("Up / Down", "Message history"),
    ("PgUp / PgDn", "Scroll transcript"),
    ("Ctrl+Home / End", "Oldest / newest"),
    ("Mouse wheel", "Scroll transcript"),
    ("Ctrl+L", "Clear chat"),
    ("Ctrl+Y", "Copy last reply"),
    ("F1", "Toggle this help"),
    ("Esc", "Close help / quit"),
    ("Ctrl+C", "Quit"),
];

/// Centered help box listing the chat keybindings.
pub struct HelpOverlay<'a> {
    theme: &'a Theme,
}

impl<'a> HelpOverlay<'a> {
    pub fn new(theme: &'a Theme) -> Self {
        Self { theme }
    }
}

impl Widget for HelpOverlay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let key_style = Style::default()
            .fg(self.theme.primary)
            .add_modifier(Modifier::BOLD);
        let label_style = Style::default().fg(self.theme.text);

        let mut lines = vec![Line::default()];
        lines.extend(BINDINGS.iter().map(|(key, label)| {
            Line::from(vec![
                Span::styled(format!("  {key:<17}"), key_style),
                Span::styled(*label, label_style),
            ])
        }));
        lines.push(Line::default());
        lines.push(Line::styled(
            "  [Press any key to close]",
            Style::default().fg(self.theme.muted),
        ));

        let height = u16::try_from(lines.len() + 2).unwrap_or(u16::MAX);
        let overlay = centered_fixed(44.min(area.width.saturating_sub(4)), height, area);
        Clear.render(overlay, buf);

        let block = Block::default()
            .title(" Help ")
            .title_style(key_style)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.border_focused))
            .style(Style::default().bg(self.theme.base));

        Paragraph::new(lines).block(block).render(overlay, buf);
    }
}
