use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style, Stylize},
    widgets::{Paragraph, Widget},
};

use crate::table::format_thousands;

const NORMAL_CONTROLS: [(&str, &str); 7] = [
    ("←→", "Column"),
    ("f", "Filter"),
    ("s", "Sort"),
    ("n/p", "Page"),
    ("x", "Clear"),
    ("c", "Clear All"),
    ("q", "Quit"),
];

const FILTERING_CONTROLS: [(&str, &str); 4] = [
    ("type", "Search"),
    ("↑↓", "Move"),
    ("Space", "Toggle"),
    ("Esc", "Close"),
];

pub struct Controls {
    pub row_count: Option<usize>,
    pub filtering: bool,
    pub bg: Color,
    pub fg: Color,
}

impl Default for Controls {
    fn default() -> Self {
        Self {
            row_count: None,
            filtering: false,
            bg: Color::DarkGray,
            fg: Color::White,
        }
    }
}

impl Controls {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_row_count(row_count: usize) -> Self {
        Self {
            row_count: Some(row_count),
            ..Self::default()
        }
    }

    pub fn with_filtering(mut self, filtering: bool) -> Self {
        self.filtering = filtering;
        self
    }

    pub fn with_colors(mut self, bg: Color, fg: Color) -> Self {
        self.bg = bg;
        self.fg = fg;
        self
    }

    fn controls(&self) -> &'static [(&'static str, &'static str)] {
        if self.filtering {
            &FILTERING_CONTROLS
        } else {
            &NORMAL_CONTROLS
        }
    }
}

impl Widget for &Controls {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let controls = self.controls();
        let mut constraints = controls.iter().fold(vec![], |mut acc, (key, action)| {
            acc.push(Constraint::Length(key.chars().count() as u16 + 2));
            acc.push(Constraint::Length(action.chars().count() as u16 + 1));
            acc
        });

        let row_count_text = self
            .row_count
            .map(|count| format!("Rows: {}", format_thousands(count as i64)));
        if let Some(text) = &row_count_text {
            constraints.push(Constraint::Length(text.chars().count() as u16 + 2));
        }
        constraints.push(Constraint::Fill(1));

        let layout = Layout::new(Direction::Horizontal, constraints).split(area);
        let base_style = Style::default();

        for (i, (key, action)) in controls.iter().enumerate() {
            let j = i * 2;
            Paragraph::new(*key)
                .style(base_style.bold())
                .centered()
                .render(layout[j], buf);
            Paragraph::new(*action)
                .style(base_style.bg(self.bg))
                .render(layout[j + 1], buf);
        }

        let mut fill_start_idx = controls.len() * 2;
        if let Some(text) = row_count_text {
            Paragraph::new(text)
                .style(base_style.bg(self.bg).fg(self.fg))
                .right_aligned()
                .render(layout[fill_start_idx], buf);
            fill_start_idx += 1;
        }

        Paragraph::new("")
            .style(base_style.bg(self.bg))
            .render(layout[fill_start_idx], buf);
    }
}
