use crossterm::event::KeyEvent;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::{Paragraph, Widget},
};

/// Counters shown on the debug line.
#[derive(Debug, Default)]
pub struct DebugState {
    pub enabled: bool,
    pub num_events: usize,
    pub num_frames: usize,
    pub last_key: Option<String>,
    pub filtered_rows: usize,
    pub total_rows: usize,
}

impl DebugState {
    pub fn on_key(&mut self, event: &KeyEvent) {
        self.last_key = Some(format!("{:?} {:?}", event.code, event.modifiers));
    }

    pub fn text(&self) -> String {
        format!(
            "events: {} | frames: {} | rows: {}/{} | last key: {}",
            self.num_events,
            self.num_frames,
            self.filtered_rows,
            self.total_rows,
            self.last_key.as_deref().unwrap_or("-")
        )
    }

    pub fn render(&self, area: Rect, buf: &mut Buffer) {
        Paragraph::new(self.text())
            .style(Style::default().fg(Color::DarkGray))
            .render(area, buf);
    }
}
