//! Record rendering.
//!
//! Each record gets a header (speaker label and time) followed by an
//! indented body whose form depends on the record kind:
//!
//! - user and error text: plain, wrapped, newlines kept
//! - bot text: markdown
//! - bot image: fetch status and retrieval URL, or the fixed failure notice

use graphbot_engine::{image_url, DisplayRecord, RecordKind, IMAGE_FAILED_TEXT};
use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
};

use crate::images::{format_size, ImageCache, ImageStatus};
use crate::text::{indent_lines, render_markdown, wrap_lines, wrap_text};
use crate::theme::Theme;

/// Shown while the transcript is empty.
pub const WELCOME_TEXT: &str =
    "Welcome to GraphBot! Ask me to create any graph or visualization for you.";

const BODY_INDENT: &str = "  ";

/// Animated waiting text; never stored as a record.
pub fn thinking_text(tick: usize) -> String {
    format!("Thinking{}", ".".repeat((tick / 3) % 4))
}

/// Everything needed to lay out the transcript.
pub struct TranscriptView<'a> {
    records: &'a [DisplayRecord],
    images: &'a ImageCache,
    api_base_url: &'a str,
    theme: &'a Theme,
    awaiting: bool,
    tick: usize,
}

impl<'a> TranscriptView<'a> {
    pub fn new(
        records: &'a [DisplayRecord],
        images: &'a ImageCache,
        api_base_url: &'a str,
        theme: &'a Theme,
    ) -> Self {
        Self {
            records,
            images,
            api_base_url,
            theme,
            awaiting: false,
            tick: 0,
        }
    }

    /// Show the thinking indicator after the last record.
    #[must_use]
    pub fn awaiting(mut self, awaiting: bool, tick: usize) -> Self {
        self.awaiting = awaiting;
        self.tick = tick;
        self
    }

    /// All transcript lines for a viewport `width` cells wide.
    pub fn lines(&self, width: usize) -> Vec<Line<'static>> {
        let mut lines = Vec::new();

        if self.records.is_empty() {
            lines.extend(
                wrap_text(WELCOME_TEXT, width)
                    .into_iter()
                    .map(|l| Line::from(Span::styled(l, self.muted().add_modifier(Modifier::ITALIC)))),
            );
        }

        for record in self.records {
            if !lines.is_empty() {
                lines.push(Line::default());
            }
            lines.extend(self.record_lines(record, width));
        }

        if self.awaiting {
            if !lines.is_empty() {
                lines.push(Line::default());
            }
            lines.push(self.header(RecordKind::BotText, None));
            lines.push(Line::from(vec![
                Span::raw(BODY_INDENT),
                Span::styled(
                    thinking_text(self.tick),
                    self.muted().add_modifier(Modifier::ITALIC),
                ),
            ]));
        }

        lines
    }

    /// Header plus body for one record.
    pub fn record_lines(&self, record: &DisplayRecord, width: usize) -> Vec<Line<'static>> {
        let body_width = width.saturating_sub(BODY_INDENT.len()).max(1);
        let text = record.text().unwrap_or_default();

        let body = match record.kind() {
            RecordKind::User => plain_lines(text, body_width, Style::default().fg(self.theme.text)),
            RecordKind::Error => plain_lines(text, body_width, Style::default().fg(self.theme.error)),
            RecordKind::BotText => {
                wrap_lines(render_markdown(text, body_width, self.theme), body_width)
            }
            RecordKind::BotImage => self.image_body(record.image_id().unwrap_or_default(), body_width),
        };

        let mut lines = vec![self.header(record.kind(), Some(record.time_str()))];
        lines.extend(indent_lines(body, BODY_INDENT, Style::default()));
        lines
    }

    fn header(&self, kind: RecordKind, time: Option<String>) -> Line<'static> {
        let mut spans = vec![Span::styled(
            kind.label(),
            Style::default()
                .fg(self.theme.speaker(kind))
                .add_modifier(Modifier::BOLD),
        )];
        if let Some(time) = time {
            spans.push(Span::styled(format!("  {time}"), self.muted()));
        }
        Line::from(spans)
    }

    fn image_body(&self, image_id: &str, width: usize) -> Vec<Line<'static>> {
        let url_line = Line::from(Span::styled(
            image_url(self.api_base_url, image_id),
            Style::default()
                .fg(self.theme.info)
                .add_modifier(Modifier::UNDERLINED),
        ));

        let status_line = match self.images.status(image_id) {
            None | Some(ImageStatus::Loading) => {
                Line::from(Span::styled("◌ Loading graph image...", self.muted()))
            }
            Some(ImageStatus::Loaded { content_type, size }) => Line::from(vec![
                Span::styled("▣ ", Style::default().fg(self.theme.success)),
                Span::styled("Generated graph", Style::default().fg(self.theme.text)),
                Span::styled(
                    format!(" · {content_type} · {}", format_size(*size)),
                    self.muted(),
                ),
            ]),
            Some(ImageStatus::Failed) => {
                return plain_lines(
                    IMAGE_FAILED_TEXT,
                    width,
                    Style::default().fg(self.theme.error),
                );
            }
        };

        wrap_lines(vec![status_line, url_line], width)
    }

    fn muted(&self) -> Style {
        Style::default().fg(self.theme.muted)
    }
}

/// Wrapped plain text in a single style.
fn plain_lines(text: &str, width: usize, style: Style) -> Vec<Line<'static>> {
    wrap_text(text, width)
        .into_iter()
        .map(|l| Line::from(Span::styled(l, style)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use graphbot_engine::{BackendError, ImagePayload};

    const BASE: &str = "http://localhost:5001";

    fn plain(lines: &[Line<'_>]) -> Vec<String> {
        lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn test_empty_transcript_shows_welcome() {
        let theme = Theme::default();
        let images = ImageCache::new();
        let lines = TranscriptView::new(&[], &images, BASE, &theme).lines(200);
        assert_eq!(plain(&lines), vec![WELCOME_TEXT]);
    }

    #[test]
    fn test_welcome_stays_while_first_request_is_pending() {
        let theme = Theme::default();
        let images = ImageCache::new();
        let lines = TranscriptView::new(&[], &images, BASE, &theme)
            .awaiting(true, 0)
            .lines(200);
        assert_eq!(plain(&lines), vec![WELCOME_TEXT, "", "GraphBot", "  Thinking"]);
    }

    #[test]
    fn test_user_and_bot_records() {
        let theme = Theme::default();
        let images = ImageCache::new();
        let records = vec![
            DisplayRecord::user(1, "plot sin(x)\nfrom 0 to 10"),
            DisplayRecord::bot_text(2, "Here is **your** chart"),
        ];
        let lines = TranscriptView::new(&records, &images, BASE, &theme).lines(80);
        let text = plain(&lines);

        assert!(text[0].starts_with("You  "));
        assert_eq!(text[1], "  plot sin(x)");
        assert_eq!(text[2], "  from 0 to 10");
        assert_eq!(text[3], "");
        assert!(text[4].starts_with("GraphBot  "));
        assert_eq!(text[5], "  Here is your chart");
        assert_eq!(text.len(), 6);
    }

    #[test]
    fn test_user_text_is_not_markdown() {
        let theme = Theme::default();
        let images = ImageCache::new();
        let records = vec![DisplayRecord::user(1, "**not bold**")];
        let lines = TranscriptView::new(&records, &images, BASE, &theme).lines(80);
        assert_eq!(plain(&lines)[1], "  **not bold**");
    }

    #[test]
    fn test_error_record_uses_error_color() {
        let theme = Theme::default();
        let images = ImageCache::new();
        let record = DisplayRecord::error(1, "boom");
        let view = TranscriptView::new(&[], &images, BASE, &theme);
        let lines = view.record_lines(&record, 80);

        assert_eq!(lines[0].spans[0].content, "Error");
        assert_eq!(lines[0].spans[0].style.fg, Some(theme.error));
        assert_eq!(lines[1].spans[1].style.fg, Some(theme.error));
    }

    #[test]
    fn test_image_record_states() {
        let theme = Theme::default();
        let mut images = ImageCache::new();
        let record = DisplayRecord::bot_image(1, "g42");

        let loading = plain(&TranscriptView::new(&[], &images, BASE, &theme).record_lines(&record, 80));
        assert_eq!(loading[1], "  ◌ Loading graph image...");
        assert_eq!(loading[2], "  http://localhost:5001/generated_graphs/g42.png");

        images.claim_unfetched(std::slice::from_ref(&record));
        images.resolve(
            "g42",
            Ok(ImagePayload {
                content_type: "image/png".into(),
                bytes: vec![0; 2048],
            }),
        );
        let loaded = plain(&TranscriptView::new(&[], &images, BASE, &theme).record_lines(&record, 80));
        assert_eq!(loaded[1], "  ▣ Generated graph · image/png · 2.0 KiB");

        images.resolve("g42", Err(BackendError::Status(404)));
        let failed = plain(&TranscriptView::new(&[], &images, BASE, &theme).record_lines(&record, 80));
        assert_eq!(failed.len(), 2);
        assert_eq!(failed[1], format!("  {IMAGE_FAILED_TEXT}"));
    }

    #[test]
    fn test_long_text_wraps_within_width() {
        let theme = Theme::default();
        let images = ImageCache::new();
        let records = vec![DisplayRecord::bot_text(1, &"word ".repeat(40))];
        let lines = TranscriptView::new(&records, &images, BASE, &theme).lines(30);
        assert!(lines.len() > 3);
        for line in plain(&lines) {
            assert!(crate::text::visual_width(&line) <= 30, "too wide: {line:?}");
        }
    }

    #[test]
    fn test_thinking_text_cycles() {
        assert_eq!(thinking_text(0), "Thinking");
        assert_eq!(thinking_text(3), "Thinking.");
        assert_eq!(thinking_text(9), "Thinking...");
        assert_eq!(thinking_text(12), "Thinking");
    }
}
