//! Line-based transcript scrolling.
//!
//! Position is kept as a distance from the bottom, so "following" the
//! newest record is simply distance zero. The widget reports the viewport
//! during render, which bounds later scroll requests.

use std::cell::Cell;

/// Lines scrolled per mouse wheel tick.
pub const SCROLL_SPEED: usize = 3;

/// Transcript scroll state.
#[derive(Debug, Default)]
pub struct TranscriptScroll {
    /// Lines between the bottom of the viewport and the end of the transcript.
    from_bottom: usize,
    /// Largest useful `from_bottom` as of the last render.
    max_from_bottom: Cell<usize>,
    /// Viewport height as of the last render.
    viewport: Cell<usize>,
}

impl TranscriptScroll {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the newest line is pinned to the bottom of the viewport.
    pub fn is_following(&self) -> bool {
        self.from_bottom == 0
    }

    /// Lines hidden below the viewport.
    pub fn hidden_below(&self) -> usize {
        self.from_bottom
    }

    pub fn scroll_up(&mut self, lines: usize) {
        self.from_bottom = (self.from_bottom + lines).min(self.max_from_bottom.get());
    }

    pub fn scroll_down(&mut self, lines: usize) {
        self.from_bottom = self.from_bottom.saturating_sub(lines);
    }

    pub fn page_up(&mut self) {
        self.scroll_up(self.page_size());
    }

    pub fn page_down(&mut self) {
        self.scroll_down(self.page_size());
    }

    pub fn to_top(&mut self) {
        self.from_bottom = self.max_from_bottom.get();
    }

    /// Pin the view to the newest line.
    pub fn follow(&mut self) {
        self.from_bottom = 0;
    }

    fn page_size(&self) -> usize {
        self.viewport.get().saturating_sub(1).max(1)
    }

    /// Index of the first visible line for a transcript of `total` lines
    /// shown in `height` rows. Remembers the viewport for later scrolling.
    pub fn visible_start(&self, total: usize, height: usize) -> usize {
        let max = total.saturating_sub(height);
        self.max_from_bottom.set(max);
        self.viewport.set(height);
        max - self.from_bottom.min(max)
    }
}
