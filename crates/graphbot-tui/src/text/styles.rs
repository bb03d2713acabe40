//! Markdown styling configuration.

use ratatui::style::{Modifier, Style};

use crate::theme::Theme;

/// Styles for rendering markdown elements.
#[derive(Debug, Clone)]
pub struct MarkdownStyles {
    pub h1: Style,
    pub h2: Style,
    /// H3 and deeper.
    pub h3: Style,
    pub code: Style,
    pub code_block: Style,
    /// Language tag shown above fenced code.
    pub code_lang: Style,
    pub emphasis: Style,
    pub strong: Style,
    /// List marker (bullet/number) style.
    pub list_marker: Style,
    pub link: Style,
    pub blockquote: Style,
    pub rule: Style,
    pub text: Style,
    pub strikethrough: Style,
}

impl MarkdownStyles {
    /// Create styles from a theme.
    pub fn from_theme(theme: &Theme) -> Self {
        Self {
            h1: Style::default()
                .fg(theme.primary)
                .add_modifier(Modifier::BOLD),
            h2: Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
            h3: Style::default()
                .fg(theme.subtext)
                .add_modifier(Modifier::BOLD),
            code: Style::default().fg(theme.secondary).bg(theme.surface),
            code_block: Style::default().fg(theme.secondary).bg(theme.surface),
            code_lang: Style::default()
                .fg(theme.muted)
                .add_modifier(Modifier::ITALIC),
            emphasis: Style::default().add_modifier(Modifier::ITALIC),
            strong: Style::default().add_modifier(Modifier::BOLD),
            list_marker: Style::default().fg(theme.muted),
            link: Style::default()
                .fg(theme.info)
                .add_modifier(Modifier::UNDERLINED),
            blockquote: Style::default()
                .fg(theme.subtext)
                .add_modifier(Modifier::ITALIC),
            rule: Style::default().fg(theme.border),
            text: Style::default().fg(theme.text),
            strikethrough: Style::default().add_modifier(Modifier::CROSSED_OUT),
        }
    }
}

impl Default for MarkdownStyles {
    fn default() -> Self {
        Self::from_theme(&Theme::default())
    }
}
