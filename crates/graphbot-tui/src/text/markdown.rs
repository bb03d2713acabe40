//! Markdown rendering using pulldown-cmark.
//!
//! Bot text parts are markdown; [`render_markdown`] turns them into styled
//! Lines. Wrapping is left to [`super::wrap_lines`].

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use ratatui::{
    style::Style,
    text::{Line, Span},
};

use crate::theme::Theme;

use super::styles::MarkdownStyles;

/// Render markdown text to styled ratatui Lines.
///
/// Blocks are separated by one blank line; there is no trailing blank line.
/// Rules are drawn `rule_width` cells wide.
pub fn render_markdown(input: &str, rule_width: usize, theme: &Theme) -> Vec<Line<'static>> {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    options.insert(Options::ENABLE_TABLES);

    let mut renderer = MarkdownRenderer::new(MarkdownStyles::from_theme(theme), rule_width);
    renderer.run(Parser::new_ext(input, options));

    let mut lines = renderer.lines;
    while lines.last().is_some_and(|l| l.spans.is_empty()) {
        lines.pop();
    }
    lines
}

struct MarkdownRenderer {
    lines: Vec<Line<'static>>,
    styles: MarkdownStyles,
    rule_width: usize,
    /// Stack of active styles for nested inline formatting.
    style_stack: Vec<Style>,
    current_spans: Vec<Span<'static>>,
    /// One entry per open list: next number for ordered lists, None for bullets.
    lists: Vec<Option<u64>>,
    in_code_block: bool,
    blockquote_depth: usize,
    pending_list_marker: Option<String>,
    /// Destination of the open link, shown after its text.
    link_dest: Option<String>,
    /// Set once the current table row has a cell.
    row_has_cell: bool,
}

impl MarkdownRenderer {
    fn new(styles: MarkdownStyles, rule_width: usize) -> Self {
        Self {
            lines: Vec::new(),
            styles,
            rule_width,
            style_stack: Vec::new(),
            current_spans: Vec::new(),
            lists: Vec::new(),
            in_code_block: false,
            blockquote_depth: 0,
            pending_list_marker: None,
            link_dest: None,
            row_has_cell: false,
        }
    }

    fn run<'a>(&mut self, parser: impl Iterator<Item = Event<'a>>) {
        for event in parser {
            self.handle_event(event);
        }
        self.flush_line();
    }

    #[allow(clippy::too_many_lines)]
    fn handle_event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(Tag::Heading { level, .. }) => {
                self.flush_line();
                self.style_stack.push(self.heading_style(level));
            }
            Event::End(TagEnd::Heading(_)) => {
                self.flush_line();
                self.style_stack.pop();
                self.block_gap();
            }

            Event::Start(Tag::Emphasis) => self.style_stack.push(self.styles.emphasis),
            Event::Start(Tag::Strong) => self.style_stack.push(self.styles.strong),
            Event::Start(Tag::Strikethrough) => self.style_stack.push(self.styles.strikethrough),
            Event::End(TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough) => {
                self.style_stack.pop();
            }

            Event::Start(Tag::Link { dest_url, .. }) => {
                self.style_stack.push(self.styles.link);
                self.link_dest = Some(dest_url.to_string());
            }
            Event::End(TagEnd::Link) => {
                self.style_stack.pop();
                if let Some(dest) = self.link_dest.take() {
                    let shown = self
                        .current_spans
                        .last()
                        .is_some_and(|s| s.content.as_ref() == dest);
                    if !dest.is_empty() && !shown {
                        self.current_spans
                            .push(Span::styled(format!(" ({dest})"), self.styles.list_marker));
                    }
                }
            }

            Event::Start(Tag::CodeBlock(kind)) => {
                self.flush_line();
                self.in_code_block = true;
                if let CodeBlockKind::Fenced(lang) = kind {
                    if !lang.is_empty() {
                        self.lines.push(Line::from(Span::styled(
                            format!("  {lang}"),
                            self.styles.code_lang,
                        )));
                    }
                }
            }
            Event::End(TagEnd::CodeBlock) => {
                self.flush_line();
                self.in_code_block = false;
                self.block_gap();
            }

            Event::Start(Tag::List(start)) => {
                self.flush_line();
                self.lists.push(start);
            }
            Event::End(TagEnd::List(_)) => {
                self.lists.pop();
                if self.lists.is_empty() {
                    self.block_gap();
                }
            }
            Event::Start(Tag::Item) => {
                self.flush_line();
                let indent = "  ".repeat(self.lists.len().saturating_sub(1));
                let marker = match self.lists.last_mut() {
                    Some(Some(n)) => {
                        let marker = format!("{indent}{n}. ");
                        *n += 1;
                        marker
                    }
                    _ => format!("{indent}• "),
                };
                self.pending_list_marker = Some(marker);
            }
            Event::End(TagEnd::Item) => self.flush_line(),
            Event::TaskListMarker(checked) => {
                let checkbox = if checked { "[x] " } else { "[ ] " };
                self.take_list_marker();
                self.current_spans
                    .push(Span::styled(checkbox, self.styles.list_marker));
            }

            Event::Start(Tag::BlockQuote) => {
                self.flush_line();
                self.blockquote_depth += 1;
            }
            Event::End(TagEnd::BlockQuote) => {
                self.flush_line();
                self.blockquote_depth = self.blockquote_depth.saturating_sub(1);
            }

            Event::End(TagEnd::Paragraph) => {
                self.flush_line();
                // Paragraphs inside list items stay tight.
                if self.lists.is_empty() {
                    self.block_gap();
                }
            }

            Event::Start(Tag::TableCell) => {
                if self.row_has_cell {
                    self.current_spans
                        .push(Span::styled(" │ ", self.styles.rule));
                }
                self.row_has_cell = true;
            }
            Event::End(TagEnd::TableHead | TagEnd::TableRow) => {
                self.flush_line();
                self.row_has_cell = false;
            }
            Event::End(TagEnd::Table) => self.block_gap(),

            Event::Rule => {
                self.flush_line();
                self.lines.push(Line::from(Span::styled(
                    "─".repeat(self.rule_width.max(3)),
                    self.styles.rule,
                )));
                self.block_gap();
            }

            Event::Text(text) => self.add_text(&text),
            Event::Code(code) => {
                self.take_list_marker();
                self.current_spans
                    .push(Span::styled(format!("`{code}`"), self.styles.code));
            }
            Event::SoftBreak => self.add_text(" "),
            Event::HardBreak => self.flush_line(),

            Event::Start(
                Tag::Paragraph
                | Tag::Image { .. }
                | Tag::Table(_)
                | Tag::TableHead
                | Tag::TableRow
                | Tag::FootnoteDefinition(_)
                | Tag::MetadataBlock(_)
                | Tag::HtmlBlock,
            )
            | Event::End(
                TagEnd::Image
                | TagEnd::TableCell
                | TagEnd::FootnoteDefinition
                | TagEnd::MetadataBlock(_)
                | TagEnd::HtmlBlock,
            )
            | Event::Html(_)
            | Event::InlineHtml(_)
            | Event::FootnoteReference(_) => {}
        }
    }

    fn add_text(&mut self, text: &str) {
        if self.in_code_block {
            let indent = "  ".repeat(self.lists.len());
            for line in text.lines() {
                self.current_spans.push(Span::styled(
                    format!("{indent}  {line}"),
                    self.styles.code_block,
                ));
                self.flush_line();
            }
            return;
        }

        self.take_list_marker();
        if self.blockquote_depth > 0 && self.current_spans.is_empty() {
            self.current_spans.push(Span::styled(
                "> ".repeat(self.blockquote_depth),
                self.styles.blockquote,
            ));
        }

        let style = self.current_style();
        self.current_spans.push(Span::styled(text.to_string(), style));
    }

    fn take_list_marker(&mut self) {
        if let Some(marker) = self.pending_list_marker.take() {
            self.current_spans
                .push(Span::styled(marker, self.styles.list_marker));
        }
    }

    fn current_style(&self) -> Style {
        let base = if self.blockquote_depth > 0 {
            self.styles.text.patch(self.styles.blockquote)
        } else {
            self.styles.text
        };
        self.style_stack.iter().fold(base, |acc, s| acc.patch(*s))
    }

    fn heading_style(&self, level: HeadingLevel) -> Style {
        match level {
            HeadingLevel::H1 => self.styles.h1,
            HeadingLevel::H2 => self.styles.h2,
            _ => self.styles.h3,
        }
    }

    /// Blank separator line, never doubled.
    fn block_gap(&mut self) {
        if self.lines.last().is_some_and(|l| !l.spans.is_empty()) {
            self.lines.push(Line::default());
        }
    }

    fn flush_line(&mut self) {
        if !self.current_spans.is_empty() {
            let spans = std::mem::take(&mut self.current_spans);
            self.lines.push(Line::from(spans));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(lines: &[Line<'_>]) -> Vec<String> {
        lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    fn render(md: &str) -> Vec<String> {
        plain(&render_markdown(md, 10, &Theme::default()))
    }

    #[test]
    fn test_render_simple_text() {
        assert_eq!(render("Hello, world!"), vec!["Hello, world!"]);
    }

    #[test]
    fn test_render_empty() {
        assert!(render("").is_empty());
    }

    #[test]
    fn test_heading_is_styled() {
        let theme = Theme::default();
        let lines = render_markdown("# Title", 80, &theme);
        assert_eq!(plain(&lines), vec!["Title"]);
        assert_eq!(lines[0].spans[0].style.fg, Some(theme.primary));
    }

    #[test]
    fn test_render_inline_code() {
        assert_eq!(render("Use `code` here"), vec!["Use `code` here"]);
    }

    #[test]
    fn test_render_code_block_with_language() {
        let lines = render("```python\nplt.plot(x)\nplt.show()\n```");
        assert_eq!(lines, vec!["  python", "  plt.plot(x)", "  plt.show()"]);
    }

    #[test]
    fn test_render_bullet_list() {
        assert_eq!(render("- Item 1\n- Item 2"), vec!["• Item 1", "• Item 2"]);
    }

    #[test]
    fn test_render_ordered_list() {
        assert_eq!(
            render("3. three\n4. four"),
            vec!["3. three", "4. four"]
        );
    }

    #[test]
    fn test_render_nested_list() {
        assert_eq!(
            render("- outer\n  - inner"),
            vec!["• outer", "  • inner"]
        );
    }

    #[test]
    fn test_render_checkbox() {
        assert_eq!(
            render("- [ ] todo\n- [x] done"),
            vec!["• [ ] todo", "• [x] done"]
        );
    }

    #[test]
    fn test_render_blockquote() {
        assert_eq!(render("> quoted"), vec!["> quoted"]);
    }

    #[test]
    fn test_link_shows_destination() {
        assert_eq!(
            render("see [docs](https://example.test)"),
            vec!["see docs (https://example.test)"]
        );
        assert_eq!(
            render("<https://example.test>"),
            vec!["https://example.test"]
        );
    }

    #[test]
    fn test_paragraphs_separated_without_trailing_blank() {
        assert_eq!(
            render("First paragraph.\n\nSecond paragraph."),
            vec!["First paragraph.", "", "Second paragraph."]
        );
    }

    #[test]
    fn test_rule() {
        assert_eq!(render("a\n\n---\n\nb"), vec!["a", "", "──────────", "", "b"]);
    }

    #[test]
    fn test_table_cells_are_separated() {
        let lines = render("| x | y |\n|---|---|\n| 1 | 2 |");
        assert_eq!(lines, vec!["x │ y", "1 │ 2"]);
    }
}
