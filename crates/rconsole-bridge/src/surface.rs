//! Display surfaces: where rendered output lines go.

use std::io::Write;

pub trait DisplaySurface {
    /// Append one line as the last child of the surface.
    fn append_line(&mut self, text: &str);
    /// Move the scroll offset to its maximum so the last line is visible.
    fn scroll_to_bottom(&mut self);
}

// ---------------------------------------------------------------------------
// LineBuffer
// ---------------------------------------------------------------------------

/// Append-only, unbounded list of lines with a scrollable viewport.
#[derive(Debug, Clone)]
pub struct LineBuffer {
    lines: Vec<String>,
    viewport_rows: usize,
    scroll_offset: usize,
}

impl LineBuffer {
    pub fn new(viewport_rows: usize) -> Self {
        Self {
            lines: Vec::new(),
            viewport_rows: viewport_rows.max(1),
            scroll_offset: 0,
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    /// Largest valid scroll offset: the first row shown when at the bottom.
    pub fn max_scroll(&self) -> usize {
        self.lines.len().saturating_sub(self.viewport_rows)
    }

    pub fn is_at_bottom(&self) -> bool {
        self.scroll_offset == self.max_scroll()
    }

    /// Scroll to `offset`, clamped to `[0, max_scroll]`.
    pub fn scroll_to(&mut self, offset: usize) {
        self.scroll_offset = offset.min(self.max_scroll());
    }

    pub fn visible_lines(&self) -> &[String] {
        let end = (self.scroll_offset + self.viewport_rows).min(self.lines.len());
        &self.lines[self.scroll_offset..end]
    }
}

impl DisplaySurface for LineBuffer {
    fn append_line(&mut self, text: &str) {
        self.lines.push(text.to_string());
    }

    fn scroll_to_bottom(&mut self) {
        self.scroll_offset = self.max_scroll();
    }
}

// ---------------------------------------------------------------------------
// StdoutSurface
// ---------------------------------------------------------------------------

/// Writes each line to a terminal-like writer; the terminal does the scrolling.
pub struct StdoutSurface<W: Write> {
    writer: W,
}

impl<W: Write> StdoutSurface<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> DisplaySurface for StdoutSurface<W> {
    fn append_line(&mut self, text: &str) {
        // The line boundary is ours; drop one trailing newline the remote sent.
        let text = text
            .strip_suffix('\n')
            .map(|t| t.strip_suffix('\r').unwrap_or(t))
            .unwrap_or(text);
        if let Err(e) = writeln!(self.writer, "{text}") {
            tracing::debug!(error = %e, "Failed to write console line");
        }
    }

    fn scroll_to_bottom(&mut self) {
        if let Err(e) = self.writer.flush() {
            tracing::debug!(error = %e, "Failed to flush console");
        }
    }
}
