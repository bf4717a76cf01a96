//! Filter bar buttons and the option panel for one column.

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{
        Block, Borders, Clear, List, ListItem, ListState, Paragraph, StatefulWidget, Widget,
    },
};

use crate::filter_engine::ColumnFilter;
use crate::filter_options::{format_count, FilterOption};

pub const SEARCH_PLACEHOLDER: &str = "Type to search...";
pub const NO_OPTIONS: &str = "No options found";

/// Text of the button for `filter`: display text, a clear marker when
/// something is selected, then an open/closed chevron.
pub fn button_text(filter: &ColumnFilter) -> String {
    let mut text = filter.display_text(&filter.column);
    if filter.is_active() {
        text.push_str(" ×");
    }
    text.push_str(if filter.is_open { " ▴" } else { " ▾" });
    text
}

/// One button per column, left to right.
pub struct FilterBar<'a> {
    filters: &'a [ColumnFilter],
    focused: usize,
    pub active_fg: Color,
    pub focused_fg: Color,
    pub dimmed_fg: Color,
}

impl<'a> FilterBar<'a> {
    pub fn new(filters: &'a [ColumnFilter], focused: usize) -> Self {
        Self {
            filters,
            focused,
            active_fg: Color::Cyan,
            focused_fg: Color::Yellow,
            dimmed_fg: Color::DarkGray,
        }
    }

    pub fn with_colors(mut self, active_fg: Color, focused_fg: Color, dimmed_fg: Color) -> Self {
        self.active_fg = active_fg;
        self.focused_fg = focused_fg;
        self.dimmed_fg = dimmed_fg;
        self
    }
}

impl Widget for FilterBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut spans: Vec<Span> = vec![Span::styled(
            "Filters: ",
            Style::default().fg(self.dimmed_fg),
        )];
        for (i, filter) in self.filters.iter().enumerate() {
            let mut style = Style::default();
            if filter.is_active() {
                style = style.fg(self.active_fg);
            }
            if i == self.focused {
                style = style
                    .fg(self.focused_fg)
                    .add_modifier(Modifier::BOLD | Modifier::UNDERLINED);
            }
            spans.push(Span::styled(format!("[ {} ]", button_text(filter)), style));
            spans.push(Span::raw(" "));
        }
        Paragraph::new(Line::from(spans)).render(area, buf);
    }
}

/// Dropdown body for an open column: search line and option list.
pub struct FilterPanel<'a> {
    filter: &'a ColumnFilter,
    options: &'a [FilterOption],
    pub border_fg: Color,
    pub selected_fg: Color,
    pub dimmed_fg: Color,
}

impl<'a> FilterPanel<'a> {
    pub fn new(filter: &'a ColumnFilter, options: &'a [FilterOption]) -> Self {
        Self {
            filter,
            options,
            border_fg: Color::Yellow,
            selected_fg: Color::Cyan,
            dimmed_fg: Color::DarkGray,
        }
    }

    pub fn with_colors(mut self, border_fg: Color, selected_fg: Color, dimmed_fg: Color) -> Self {
        self.border_fg = border_fg;
        self.selected_fg = selected_fg;
        self.dimmed_fg = dimmed_fg;
        self
    }

    fn option_item(&self, option: &FilterOption, width: usize) -> ListItem<'static> {
        let selected = self.filter.is_selected(&option.value);
        let checkbox = if selected { "[x] " } else { "[ ] " };
        let count = format_count(option.count);
        let used = checkbox.chars().count() + option.label.chars().count() + count.chars().count();
        let gap = width.saturating_sub(used).max(1);
        let label_style = if selected {
            Style::default().fg(self.selected_fg)
        } else {
            Style::default()
        };
        ListItem::new(Line::from(vec![
            Span::styled(checkbox, label_style),
            Span::styled(option.label.clone(), label_style),
            Span::raw(" ".repeat(gap)),
            Span::styled(count, Style::default().fg(self.dimmed_fg)),
        ]))
    }
}

impl StatefulWidget for FilterPanel<'_> {
    type State = ListState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        Clear.render(area, buf);
        let title = format!(" {} ", self.filter.display_text(&self.filter.column));
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.border_fg))
            .title(title)
            .title_bottom(Line::from(" Space toggle · Esc close ").right_aligned());
        let inner = block.inner(area);
        block.render(area, buf);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Fill(1),
            ])
            .split(inner);

        let search = if self.filter.search_term.is_empty() {
            Line::from(vec![
                Span::raw("/ "),
                Span::styled(SEARCH_PLACEHOLDER, Style::default().fg(self.dimmed_fg)),
            ])
        } else {
            Line::from(vec![
                Span::raw("/ "),
                Span::raw(self.filter.search_term.as_str()),
                Span::styled("_", Style::default().add_modifier(Modifier::SLOW_BLINK)),
            ])
        };
        Paragraph::new(search).render(chunks[0], buf);
        Paragraph::new("─".repeat(chunks[1].width as usize))
            .style(Style::default().fg(self.dimmed_fg))
            .render(chunks[1], buf);

        if self.options.is_empty() {
            Paragraph::new(NO_OPTIONS)
                .style(Style::default().fg(self.dimmed_fg))
                .centered()
                .render(chunks[2], buf);
            return;
        }

        let width = chunks[2].width as usize;
        let items: Vec<ListItem> = self
            .options
            .iter()
            .map(|option| self.option_item(option, width))
            .collect();
        StatefulWidget::render(
            List::new(items).highlight_style(Style::default().add_modifier(Modifier::REVERSED)),
            chunks[2],
            buf,
            state,
        );
    }
}
