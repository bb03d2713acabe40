//! Bottom status bar.
//!
//! Format: ` ● Ready  [Enter] send [Ctrl+L] clear ...        origin `

use graphbot_engine::SubmissionPhase;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Widget,
};

use crate::text::{truncate_to_width, visual_width};
use crate::theme::Theme;

/// A single keybinding hint.
#[derive(Debug, Clone, Copy)]
pub struct KeyHint {
    pub key: &'static str,
    pub label: &'static str,
}

impl KeyHint {
    pub const fn new(key: &'static str, label: &'static str) -> Self {
        Self { key, label }
    }
}

/// Hints shown on the chat screen.
pub const CHAT_HINTS: [KeyHint; 5] = [
    KeyHint::new("Enter", "send"),
    KeyHint::new("Ctrl+L", "clear"),
    KeyHint::new("Ctrl+Y", "copy"),
    KeyHint::new("F1", "help"),
    KeyHint::new("Esc", "quit"),
];

/// Status bar widget displayed at the bottom of the screen.
///
/// A live notification replaces the key hints. Otherwise hints are dropped
/// from the right until they fit, and the server origin is shown only when
/// it fits in full.
pub struct StatusBar<'a> {
    phase: SubmissionPhase,
    notification: Option<&'a str>,
    origin: Option<&'a str>,
    theme: &'a Theme,
}

impl<'a> StatusBar<'a> {
    pub fn new(phase: SubmissionPhase, theme: &'a Theme) -> Self {
        Self {
            phase,
            notification: None,
            origin: None,
            theme,
        }
    }

    /// Transient message shown in place of the key hints.
    #[must_use]
    pub fn notification(mut self, text: Option<&'a str>) -> Self {
        self.notification = text;
        self
    }

    /// Server address, right-aligned.
    #[must_use]
    pub fn origin(mut self, text: &'a str) -> Self {
        self.origin = Some(text);
        self
    }

    fn phase_span(&self) -> Span<'static> {
        let (label, color) = match self.phase {
            SubmissionPhase::Idle => ("Ready", self.theme.muted),
            SubmissionPhase::Pending { .. } => ("Waiting", self.theme.warning),
            SubmissionPhase::Succeeded { .. } => ("Ready", self.theme.success),
            SubmissionPhase::Failed { .. } => ("Failed", self.theme.error),
        };
        Span::styled(
            format!(" ● {label} "),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )
    }

    /// Hint spans that fit in `budget` cells, in order.
    fn hint_spans(&self, budget: usize, bar_style: Style) -> Vec<Span<'static>> {
        let mut spans = Vec::new();
        let mut used = 0;
        for hint in &CHAT_HINTS {
            let key = format!(" [{}]", hint.key);
            let label = format!(" {}", hint.label);
            let width = visual_width(&key) + visual_width(&label);
            if used + width > budget {
                break;
            }
            used += width;
            spans.push(Span::styled(key, Style::default().fg(self.theme.primary)));
            spans.push(Span::styled(label, bar_style));
        }
        spans
    }
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height < 1 {
            return;
        }

        let bar_style = Style::default().bg(self.theme.surface).fg(self.theme.subtext);
        buf.set_style(Rect { height: 1, ..area }, bar_style);

        let width = usize::from(area.width);
        let phase = self.phase_span();
        let rest = width.saturating_sub(phase.width());
        let mut spans = vec![phase];

        if let Some(text) = self.notification {
            let text = truncate_to_width(text, rest.saturating_sub(2));
            spans.push(Span::styled(
                format!(" {text}"),
                Style::default().fg(self.theme.info),
            ));
            buf.set_line(area.x, area.y, &Line::from(spans), area.width);
            return;
        }

        spans.extend(self.hint_spans(rest, bar_style));
        let left = Line::from(spans);
        let left_width = left.width();
        buf.set_line(area.x, area.y, &left, area.width);

        if let Some(origin) = self.origin {
            let origin_width = visual_width(origin);
            // Two cells of gap on the left, one of padding on the right.
            if left_width + 2 + origin_width + 1 <= width {
                let x = area.x + u16::try_from(width - origin_width - 1).unwrap_or(0);
                buf.set_string(x, area.y, origin, bar_style);
            }
        }
    }
}
