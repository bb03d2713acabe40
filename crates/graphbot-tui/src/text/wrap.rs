//! Wrapping for plain strings and styled ratatui Lines.

use ratatui::style::Style;
use ratatui::text::{Line, Span};

use super::width::visual_width;

/// Wrap a plain text string to `width` cells.
///
/// Embedded newlines are kept as line breaks; blank lines survive as empty strings.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return text.lines().map(str::to_string).collect();
    }
    text.split('\n')
        .flat_map(|paragraph| {
            let paragraph = paragraph.trim_end_matches('\r');
            if paragraph.is_empty() {
                vec![String::new()]
            } else {
                textwrap::wrap(paragraph, width)
                    .into_iter()
                    .map(std::borrow::Cow::into_owned)
                    .collect()
            }
        })
        .collect()
}

/// Wrap Lines to fit within `width` cells, preserving span styles.
pub fn wrap_lines(lines: Vec<Line<'static>>, width: usize) -> Vec<Line<'static>> {
    if width == 0 {
        return lines;
    }
    lines
        .into_iter()
        .flat_map(|line| wrap_line(line, width))
        .collect()
}

/// Prefix every line with `prefix` in `style`.
pub fn indent_lines(lines: Vec<Line<'static>>, prefix: &str, style: Style) -> Vec<Line<'static>> {
    lines
        .into_iter()
        .map(|line| {
            let mut spans = Vec::with_capacity(line.spans.len() + 1);
            spans.push(Span::styled(prefix.to_string(), style));
            spans.extend(line.spans);
            Line::from(spans)
        })
        .collect()
}

fn line_width(line: &Line<'_>) -> usize {
    line.spans.iter().map(|s| visual_width(&s.content)).sum()
}

/// Wrap a single Line, returning one or more Lines with the original styling.
fn wrap_line(line: Line<'static>, width: usize) -> Vec<Line<'static>> {
    if line_width(&line) <= width {
        return vec![line];
    }

    let styled_chars: Vec<(char, Style)> = line
        .spans
        .iter()
        .flat_map(|span| span.content.chars().map(move |ch| (ch, span.style)))
        .collect();
    let plain: String = styled_chars.iter().map(|(ch, _)| ch).collect();

    let mut result = Vec::new();
    let mut idx = 0;

    for piece in textwrap::wrap(&plain, width) {
        // Whitespace consumed at the break point is not part of any piece.
        while idx < styled_chars.len()
            && styled_chars[idx].0.is_whitespace()
            && !piece.starts_with(styled_chars[idx].0)
        {
            idx += 1;
        }

        let mut spans: Vec<Span<'static>> = Vec::new();
        let mut run = String::new();
        let mut run_style: Option<Style> = None;

        for expected in piece.chars() {
            let (ch, style) = styled_chars
                .get(idx)
                .copied()
                .unwrap_or((expected, Style::default()));
            idx += 1;

            if let Some(s) = run_style.filter(|s| *s != style) {
                spans.push(Span::styled(std::mem::take(&mut run), s));
            }
            run_style = Some(style);
            run.push(ch);
        }

        if let Some(s) = run_style {
            spans.push(Span::styled(run, s));
        }
        if !spans.is_empty() {
            result.push(Line::from(spans));
        }
    }

    if result.is_empty() {
        result.push(Line::from(""));
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::style::Color;

    fn text_of(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_wrap_text_short() {
        assert_eq!(wrap_text("Hello", 10), vec!["Hello"]);
    }

    #[test]
    fn test_wrap_text_long() {
        let lines = wrap_text("Hello world this is a long line", 10);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(visual_width(line) <= 10);
        }
    }

    #[test]
    fn test_wrap_text_keeps_newlines() {
        assert_eq!(wrap_text("one\n\ntwo", 20), vec!["one", "", "two"]);
    }

    #[test]
    fn test_wrap_line_short() {
        assert_eq!(wrap_line(Line::from("Short"), 20).len(), 1);
    }

    #[test]
    fn test_wrap_line_preserves_style() {
        let line = Line::from(vec![
            Span::styled("Hello ", Style::default().fg(Color::Red)),
            Span::styled("world", Style::default().fg(Color::Blue)),
        ]);
        let wrapped = wrap_line(line, 8);
        assert_eq!(wrapped.len(), 2);
        assert_eq!(text_of(&wrapped[0]), "Hello");
        assert_eq!(wrapped[0].spans[0].style.fg, Some(Color::Red));
        assert_eq!(text_of(&wrapped[1]), "world");
        assert_eq!(wrapped[1].spans[0].style.fg, Some(Color::Blue));
    }

    #[test]
    fn test_wrap_line_counts_wide_chars_as_two_cells() {
        // Eight chars but sixteen cells.
        let wrapped = wrap_line(Line::from("你好世界 你好世界"), 10);
        assert_eq!(wrapped.len(), 2);
    }

    #[test]
    fn test_wrap_lines_multiple() {
        let lines = vec![
            Line::from("Short line"),
            Line::from("This is a very long line that should definitely be wrapped to fit"),
        ];
        assert!(wrap_lines(lines, 20).len() > 2);
    }

    #[test]
    fn test_indent_lines() {
        let lines = indent_lines(vec![Line::from("a"), Line::from("b")], "  ", Style::default());
        assert_eq!(text_of(&lines[0]), "  a");
        assert_eq!(text_of(&lines[1]), "  b");
    }

    #[test]
    fn test_wrap_line_emoji_sequence() {
        let line = Line::from(vec![
            Span::styled("Family: 👨‍👩‍👧‍👦 ", Style::default().fg(Color::Green)),
            Span::styled("Wave: 👋🏽", Style::default().fg(Color::Yellow)),
        ]);
        let all: String = wrap_line(line, 12).iter().map(text_of).collect();
        assert!(all.contains("Wave"));
    }
}
