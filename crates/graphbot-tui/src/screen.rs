//! The chat screen.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::Line,
    widgets::{Paragraph, Widget, Wrap},
};

use crate::app::App;
use crate::conversation::{input_placeholder, ConversationPane, TranscriptView};
use crate::layout::{chat_layout, is_too_small, MIN_HEIGHT, MIN_WIDTH};
use crate::widgets::{HelpOverlay, InputBar, StatusBar};

/// Draw the whole chat screen for `app`.
pub fn render(app: &App, area: Rect, buf: &mut Buffer) {
    if is_too_small(area) {
        render_too_small(app, area, buf);
        return;
    }

    let layout = chat_layout(area);
    let awaiting = app.awaiting_response();

    let view = TranscriptView::new(
        app.conversation.records(),
        &app.images,
        &app.api_base_url,
        &app.theme,
    )
    .awaiting(awaiting, app.tick);
    ConversationPane::new(view, &app.scroll, &app.theme).render(layout.transcript, buf);

    InputBar::new(&app.input, &app.theme)
        .placeholder(input_placeholder(app.conversation.phase()))
        .disabled(awaiting)
        .render(layout.input, buf);

    StatusBar::new(app.conversation.phase(), &app.theme)
        .notification(app.notification())
        .origin(&app.api_base_url)
        .render(layout.status, buf);

    if app.show_help {
        HelpOverlay::new(&app.theme).render(area, buf);
    }
}

fn render_too_small(app: &App, area: Rect, buf: &mut Buffer) {
    let lines = vec![
        Line::styled("Terminal too small", Style::default().fg(app.theme.warning)),
        Line::styled(
            format!("Resize to at least {MIN_WIDTH}x{MIN_HEIGHT}"),
            Style::default().fg(app.theme.muted),
        ),
    ];
    Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .render(area, buf);
}
