//! Captured tracing output for TUI mode
//!
//! `LogBuffer` implements `MakeWriter`, so tracing-subscriber writes here
//! instead of stderr while the alternate screen is active. `LogPane` drains
//! it each frame and renders the F12 pane.

use std::collections::VecDeque;
use std::io::Write;
use std::sync::{Arc, Mutex};

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};
use tracing::Level;
use tracing_subscriber::fmt::MakeWriter;

/// Lines held between two frames.
const RING_BUFFER_CAPACITY: usize = 500;

/// Scroll history kept by the pane.
const MAX_HISTORY: usize = 1000;

/// Height of the pane when visible.
pub const LOG_PANE_HEIGHT: u16 = 10;

/// One formatted event, already redacted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    /// `None` for continuation lines and anything without a level token.
    pub level: Option<Level>,
    pub text: String,
}

impl LogLine {
    fn parse(raw: &str) -> Self {
        let text = redact_bearer(raw.trim_end_matches('\r'));
        let level = text
            .split_whitespace()
            .take(2)
            .filter(|token| token.bytes().all(|b| b.is_ascii_uppercase()))
            .find_map(|token| token.parse::<Level>().ok());
        Self { level, text }
    }
}

/// Shared ring buffer the subscriber writes into and the pane drains.
#[derive(Clone)]
pub struct LogBuffer {
    inner: Arc<Mutex<VecDeque<LogLine>>>,
}

impl LogBuffer {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(VecDeque::with_capacity(RING_BUFFER_CAPACITY))),
        }
    }

    /// Store a raw line; the oldest line goes once the ring is full.
    pub fn push(&self, raw: &str) {
        self.push_line(LogLine::parse(raw));
    }

    fn push_line(&self, line: LogLine) {
        // A panic elsewhere must not silence logging.
        let mut ring = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        while ring.len() >= RING_BUFFER_CAPACITY {
            ring.pop_front();
        }
        ring.push_back(line);
    }

    /// Take every buffered line, oldest first.
    pub fn drain(&self) -> Vec<LogLine> {
        let mut ring = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        ring.drain(..).collect()
    }
}

impl Default for LogBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Replace whatever follows "Bearer " up to the next whitespace.
fn redact_bearer(line: &str) -> String {
    const MARKER: &str = "Bearer ";
    let mut out = String::with_capacity(line.len());
    let mut rest = line;
    while let Some(pos) = rest.find(MARKER) {
        let (head, tail) = rest.split_at(pos + MARKER.len());
        out.push_str(head);
        let end = tail.find(char::is_whitespace).unwrap_or(tail.len());
        if end > 0 {
            out.push_str("***");
        }
        rest = &tail[end..];
    }
    out.push_str(rest);
    out
}

/// Per-event writer handed out by `make_writer`. Bytes are held until a
/// newline so multi-byte characters split across writes survive.
pub struct EventWriter {
    target: LogBuffer,
    partial: Vec<u8>,
}

impl EventWriter {
    fn emit(&self, bytes: &[u8]) {
        let text = String::from_utf8_lossy(bytes);
        if !text.trim().is_empty() {
            self.target.push(&text);
        }
    }
}

impl Write for EventWriter {
    fn write(&mut self, bytes: &[u8]) -> std::io::Result<usize> {
        self.partial.extend_from_slice(bytes);
        if let Some(last_newline) = self.partial.iter().rposition(|&b| b == b'\n') {
            let complete: Vec<u8> = self.partial.drain(..=last_newline).collect();
            for line in complete.split(|&b| b == b'\n') {
                self.emit(line);
            }
        }
        Ok(bytes.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        let rest = std::mem::take(&mut self.partial);
        self.emit(&rest);
        Ok(())
    }
}

impl Drop for EventWriter {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = EventWriter;

    fn make_writer(&'a self) -> Self::Writer {
        EventWriter {
            target: self.clone(),
            partial: Vec::new(),
        }
    }
}

/// State of the log pane.
pub struct LogPane {
    buffer: LogBuffer,
    lines: Vec<LogLine>,
    pub visible: bool,
    /// 0 = pinned to the newest line
    scroll_offset: usize,
}

impl LogPane {
    pub fn new(buffer: LogBuffer) -> Self {
        Self {
            buffer,
            lines: Vec::new(),
            visible: false,
            scroll_offset: 0,
        }
    }

    /// Pull new lines from the ring buffer. Called once per frame.
    pub fn refresh(&mut self) {
        let new_lines = self.buffer.drain();
        if new_lines.is_empty() {
            return;
        }
        self.lines.extend(new_lines);
        if self.lines.len() > MAX_HISTORY {
            let excess = self.lines.len() - MAX_HISTORY;
            self.lines.drain(..excess);
            self.scroll_offset = self.scroll_offset.saturating_sub(excess);
        }
    }

    pub fn toggle(&mut self) {
        self.visible = !self.visible;
        if self.visible {
            self.scroll_offset = 0;
        }
    }

    pub fn scroll_up(&mut self, n: usize) {
        let max_offset = self.lines.len().saturating_sub(1);
        self.scroll_offset = self.scroll_offset.saturating_add(n).min(max_offset);
    }

    pub fn scroll_down(&mut self, n: usize) {
        self.scroll_offset = self.scroll_offset.saturating_sub(n);
    }

    /// Newest captured line, shown in the status bar when the pane is hidden.
    pub fn last_line(&self) -> Option<&str> {
        self.lines.last().map(|line| line.text.as_str())
    }
}

pub fn render(area: Rect, buf: &mut Buffer, pane: &LogPane) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            " Log (F12 to hide, PgUp/PgDn to scroll) ",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ));

    let inner = block.inner(area);
    block.render(area, buf);

    if inner.height == 0 || inner.width == 0 {
        return;
    }

    let end = pane.lines.len().saturating_sub(pane.scroll_offset);
    let start = end.saturating_sub(inner.height as usize);

    let lines: Vec<Line> = pane.lines[start..end]
        .iter()
        .map(|line| {
            Line::from(Span::styled(
                line.text.clone(),
                Style::default().fg(level_color(line.level)),
            ))
        })
        .collect();

    Paragraph::new(lines).render(inner, buf);
}

fn level_color(level: Option<Level>) -> Color {
    match level {
        Some(Level::ERROR) => Color::Red,
        Some(Level::WARN) => Color::Yellow,
        Some(Level::INFO) => Color::Green,
        _ => Color::DarkGray,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn texts(lines: Vec<LogLine>) -> Vec<String> {
        lines.into_iter().map(|l| l.text).collect()
    }

    #[test]
    fn test_ring_buffer_drops_oldest() {
        let buf = LogBuffer::new();
        for i in 0..600 {
            buf.push(&format!("line {}", i));
        }

        let lines = buf.drain();
        assert_eq!(lines.len(), RING_BUFFER_CAPACITY);
        assert_eq!(lines[0].text, "line 100");
        assert!(buf.drain().is_empty());
    }

    #[test]
    fn test_writer_splits_lines_and_flushes_partial_on_drop() {
        let buf = LogBuffer::new();
        {
            let mut writer = buf.make_writer();
            write!(writer, "first\r\n\nsecond\nthi").unwrap();
            assert_eq!(texts(buf.drain()), vec!["first", "second"]);
            write!(writer, "rd").unwrap();
            assert!(buf.drain().is_empty());
        }
        assert_eq!(texts(buf.drain()), vec!["third"]);
    }

    #[test]
    fn test_writer_keeps_multibyte_chars_split_across_writes() {
        let buf = LogBuffer::new();
        let mut writer = buf.make_writer();
        let bytes = "Zürich\n".as_bytes();
        writer.write_all(&bytes[..2]).unwrap();
        writer.write_all(&bytes[2..]).unwrap();
        assert_eq!(texts(buf.drain()), vec!["Zürich"]);
    }

    #[test]
    fn test_level_is_parsed_from_formatted_line() {
        let buf = LogBuffer::new();
        let mut writer = buf.make_writer();
        write!(
            writer,
            "2026-03-10T09:00:00.000000Z  WARN Location lookup failed\n\
             2026-03-10T09:00:01.000000Z ERROR Flight search failed\n\
             continuation without a level\n"
        )
        .unwrap();

        let levels: Vec<_> = buf.drain().into_iter().map(|l| l.level).collect();
        assert_eq!(levels, vec![Some(Level::WARN), Some(Level::ERROR), None]);
        assert_eq!(level_color(Some(Level::WARN)), Color::Yellow);
        assert_eq!(level_color(None), Color::DarkGray);
    }

    #[test]
    fn test_bearer_tokens_are_masked() {
        assert_eq!(
            redact_bearer("GET /v2 Authorization: Bearer abc.def.ghi sent"),
            "GET /v2 Authorization: Bearer *** sent"
        );
        assert_eq!(redact_bearer("no secrets here"), "no secrets here");
        assert_eq!(redact_bearer("trailing Bearer "), "trailing Bearer ");

        let buf = LogBuffer::new();
        let mut writer = buf.make_writer();
        write!(writer, "DEBUG header Bearer xyz\n").unwrap();
        assert_eq!(texts(buf.drain()), vec!["DEBUG header Bearer ***"]);
    }

    #[test]
    fn test_pane_refresh_and_scroll() {
        let buffer = LogBuffer::new();
        for i in 0..20 {
            buffer.push(&format!("line {}", i));
        }
        let mut pane = LogPane::new(buffer.clone());
        pane.refresh();
        assert_eq!(pane.last_line(), Some("line 19"));

        pane.scroll_up(5);
        pane.scroll_down(3);
        assert_eq!(pane.scroll_offset, 2);

        pane.scroll_up(100);
        assert_eq!(pane.scroll_offset, 19);

        pane.toggle();
        assert!(pane.visible);
        assert_eq!(pane.scroll_offset, 0);
    }
}
