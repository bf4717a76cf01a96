use color_eyre::Result;
use polars::prelude::*;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{
        Block, Borders, Padding, Paragraph, Row, StatefulWidget, Table, TableState, Widget,
    },
};
use std::borrow::Cow;

use crate::dataset::data_columns;
use crate::table::{
    format_thousands, paginate, sort_rows, Pagination, SortConfig, DEFAULT_PAGE_SIZE,
};

/// Sorted, paged view over the filtered rows plus the row cursor.
pub struct DataTableState {
    rows: DataFrame,
    sorted: DataFrame,
    page: DataFrame,
    sort: Option<SortConfig>,
    pagination: Pagination,
    pub table_state: TableState,
    pub row_numbers: bool,
    pub row_start_index: usize,
    visible_rows: usize,
}

impl Default for DataTableState {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE, true, 1)
    }
}

impl DataTableState {
    pub fn new(page_size: usize, row_numbers: bool, row_start_index: usize) -> Self {
        Self {
            rows: DataFrame::default(),
            sorted: DataFrame::default(),
            page: DataFrame::default(),
            sort: None,
            pagination: Pagination::new(0, page_size, 1),
            table_state: TableState::default(),
            row_numbers,
            row_start_index,
            visible_rows: 0,
        }
    }

    /// Show `rows` from the first page, keeping the current sort.
    pub fn set_rows(&mut self, rows: &DataFrame) -> Result<()> {
        self.rows = rows.clone();
        self.sorted = sort_rows(&self.rows, self.sort.as_ref())?;
        self.pagination = Pagination::new(self.sorted.height(), self.pagination.page_size, 1);
        self.refresh_page();
        Ok(())
    }

    /// Sort by `column`, flipping direction when it is already the ascending
    /// sort column.
    pub fn sort_by(&mut self, column: &str) -> Result<()> {
        let next = SortConfig::next(self.sort.as_ref(), column);
        log::debug!("sorting by {} {:?}", next.column, next.direction);
        self.sorted = sort_rows(&self.rows, Some(&next))?;
        self.sort = Some(next);
        self.refresh_page();
        Ok(())
    }

    pub fn next_page(&mut self) {
        self.go_to(self.pagination.next_page());
    }

    pub fn previous_page(&mut self) {
        self.go_to(self.pagination.previous_page());
    }

    pub fn select_next(&mut self) {
        let len = self.page.height();
        if len == 0 {
            return;
        }
        let next = self.table_state.selected().map_or(0, |i| (i + 1).min(len - 1));
        self.table_state.select(Some(next));
    }

    pub fn select_previous(&mut self) {
        if self.page.height() == 0 {
            return;
        }
        let previous = self
            .table_state
            .selected()
            .map_or(0, |i| i.saturating_sub(1));
        self.table_state.select(Some(previous));
    }

    pub fn sort(&self) -> Option<&SortConfig> {
        self.sort.as_ref()
    }

    pub fn pagination(&self) -> &Pagination {
        &self.pagination
    }

    /// Rows on the current page, in display order.
    pub fn page(&self) -> &DataFrame {
        &self.page
    }

    pub fn visible_rows(&self) -> usize {
        self.visible_rows
    }

    fn go_to(&mut self, pagination: Pagination) {
        if pagination != self.pagination {
            self.pagination = pagination;
            self.refresh_page();
        }
    }

    fn refresh_page(&mut self) {
        self.page = paginate(&self.sorted, &self.pagination);
        self.table_state = TableState::default();
        if self.page.height() > 0 {
            self.table_state.select(Some(0));
        }
    }
}

/// Text shown in a cell. Integers get thousands separators.
pub fn cell_text(value: &AnyValue) -> Cow<'static, str> {
    match value {
        AnyValue::Null => Cow::Borrowed(""),
        AnyValue::Int64(v) => Cow::Owned(format_thousands(*v)),
        AnyValue::Int32(v) => Cow::Owned(format_thousands(*v as i64)),
        other => Cow::Owned(other.str_value().into_owned()),
    }
}

pub struct DataTable {
    pub header_fg: Color,
    pub row_numbers_fg: Color,
    pub border_fg: Color,
    pub dimmed_fg: Color,
    pub selected: Style,
    pub alternate_row_bg: Option<Color>,
    pub table_cell_padding: u16,
}

impl Default for DataTable {
    fn default() -> Self {
        Self {
            header_fg: Color::White,
            row_numbers_fg: Color::DarkGray,
            border_fg: Color::Cyan,
            dimmed_fg: Color::DarkGray,
            selected: Style::default().add_modifier(Modifier::REVERSED),
            alternate_row_bg: None,
            table_cell_padding: 2,
        }
    }
}

impl DataTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_colors(
        mut self,
        header_fg: Color,
        row_numbers_fg: Color,
        border_fg: Color,
        dimmed_fg: Color,
    ) -> Self {
        self.header_fg = header_fg;
        self.row_numbers_fg = row_numbers_fg;
        self.border_fg = border_fg;
        self.dimmed_fg = dimmed_fg;
        self
    }

    /// Selected-row style. `Color::Reset` means reverse video.
    pub fn with_selected_color(mut self, color: Color) -> Self {
        self.selected = if color == Color::Reset {
            Style::default().add_modifier(Modifier::REVERSED)
        } else {
            Style::default().bg(color)
        };
        self
    }

    pub fn with_alternate_row_bg(mut self, color: Option<Color>) -> Self {
        self.alternate_row_bg = color;
        self
    }

    fn render_empty(&self, area: Rect, buf: &mut Buffer) {
        let lines = vec![
            Line::from("No data found").style(Style::default().add_modifier(Modifier::BOLD)),
            Line::from("Try adjusting your filters").style(Style::default().fg(self.dimmed_fg)),
        ];
        Paragraph::new(lines)
            .centered()
            .block(Block::default().padding(Padding::top(area.height.saturating_sub(2) / 2)))
            .render(area, buf);
    }

    fn render_footer(&self, pagination: &Pagination, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Fill(1), Constraint::Fill(1)])
            .split(area);
        let range = format!(
            "{} - {} / {}",
            format_thousands(pagination.start_index() as i64),
            format_thousands(pagination.end_index() as i64),
            format_thousands(pagination.total_items as i64)
        );
        Paragraph::new(range)
            .style(Style::default().fg(self.dimmed_fg))
            .render(chunks[0], buf);

        let prev = if pagination.has_previous() { "◀ p" } else { "   " };
        let next = if pagination.has_next() { "n ▶" } else { "   " };
        let page = format!(
            "{}  Page {} of {}  {}",
            prev, pagination.current_page, pagination.total_pages, next
        );
        Paragraph::new(page)
            .style(Style::default().fg(self.dimmed_fg))
            .right_aligned()
            .render(chunks[1], buf);
    }
}

impl StatefulWidget for DataTable {
    type State = DataTableState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.border_fg));
        let inner = block.inner(area);
        block.render(area, buf);

        if state.pagination.total_items == 0 {
            state.visible_rows = 0;
            self.render_empty(inner, buf);
            return;
        }

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Fill(1), Constraint::Length(1)])
            .split(inner);
        let table_area = chunks[0];
        state.visible_rows = table_area.height.saturating_sub(1) as usize;

        let columns = data_columns(&state.page);
        let first_number = state.pagination.offset() + state.row_start_index;
        let last_number = first_number + state.page.height().saturating_sub(1);

        let mut widths: Vec<Constraint> = Vec::with_capacity(columns.len() + 1);
        let mut header: Vec<Span> = Vec::with_capacity(columns.len() + 1);
        if state.row_numbers {
            widths.push(Constraint::Length(last_number.to_string().len() as u16));
            header.push(Span::raw("#"));
        }

        let mut cells: Vec<Vec<Cow<str>>> = vec![Vec::new(); state.page.height()];
        for name in &columns {
            let label = format!("{} {}", name, SortConfig::indicator(state.sort(), name));
            let mut width = label.chars().count();
            if let Ok(column) = state.page.column(name) {
                for (row_index, row) in cells.iter_mut().enumerate() {
                    let text = column
                        .get(row_index)
                        .map(|value| cell_text(&value))
                        .unwrap_or(Cow::Borrowed(""));
                    width = width.max(text.chars().count());
                    row.push(text);
                }
            }
            widths.push(Constraint::Length(width as u16));
            header.push(Span::raw(label));
        }

        let rows: Vec<Row> = cells
            .into_iter()
            .enumerate()
            .map(|(row_index, values)| {
                let mut row_cells: Vec<Line> = Vec::with_capacity(values.len() + 1);
                if state.row_numbers {
                    row_cells.push(
                        Line::from((first_number + row_index).to_string())
                            .style(Style::default().fg(self.row_numbers_fg))
                            .right_aligned(),
                    );
                }
                row_cells.extend(values.into_iter().map(|v| Line::from(v).right_aligned()));
                let style = match self.alternate_row_bg {
                    Some(bg) if row_index % 2 == 1 => Style::default().bg(bg),
                    _ => Style::default(),
                };
                Row::new(row_cells).style(style)
            })
            .collect();

        let header_style = Style::default()
            .fg(self.header_fg)
            .add_modifier(Modifier::BOLD);

        StatefulWidget::render(
            Table::new(rows, widths)
                .column_spacing(self.table_cell_padding)
                .header(Row::new(header).style(header_style))
                .row_highlight_style(self.selected),
            table_area,
            buf,
            &mut state.table_state,
        );

        self.render_footer(&state.pagination, chunks[1], buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> DataFrame {
        df!(
            "id" => ["row-0", "row-1", "row-2", "row-3", "row-4"],
            "number" => [30i64, 10, 50, 20, 40]
        )
        .unwrap()
    }

    fn page_numbers(state: &DataTableState) -> Vec<Option<i64>> {
        state
            .page()
            .column("number")
            .unwrap()
            .as_materialized_series()
            .i64()
            .unwrap()
            .into_iter()
            .collect()
    }

    #[test]
    fn test_set_rows_resets_page() {
        let mut state = DataTableState::new(2, true, 1);
        state.set_rows(&frame()).unwrap();
        assert_eq!(state.pagination().total_pages, 3);
        state.next_page();
        state.next_page();
        assert_eq!(state.pagination().current_page, 3);
        assert_eq!(state.page().height(), 1);

        state.set_rows(&frame()).unwrap();
        assert_eq!(state.pagination().current_page, 1);
        assert_eq!(state.table_state.selected(), Some(0));
    }

    #[test]
    fn test_sort_by_toggles_and_survives_new_rows() {
        let mut state = DataTableState::new(10, true, 1);
        state.set_rows(&frame()).unwrap();
        state.sort_by("number").unwrap();
        assert_eq!(
            page_numbers(&state),
            vec![Some(10), Some(20), Some(30), Some(40), Some(50)]
        );
        state.sort_by("number").unwrap();
        assert_eq!(page_numbers(&state)[0], Some(50));

        let fewer = frame().head(Some(2));
        state.set_rows(&fewer).unwrap();
        assert_eq!(page_numbers(&state), vec![Some(30), Some(10)]);
    }

    #[test]
    fn test_selection_clamped_to_page() {
        let mut state = DataTableState::new(2, false, 0);
        state.set_rows(&frame()).unwrap();
        state.select_next();
        state.select_next();
        assert_eq!(state.table_state.selected(), Some(1));
        state.select_previous();
        state.select_previous();
        assert_eq!(state.table_state.selected(), Some(0));
    }

    #[test]
    fn test_cell_text() {
        assert_eq!(cell_text(&AnyValue::Int64(49650)), "49,650");
        assert_eq!(cell_text(&AnyValue::Null), "");
        assert_eq!(cell_text(&AnyValue::String("row-1")), "row-1");
    }

    #[test]
    fn test_render_empty_state() {
        let mut state = DataTableState::default();
        state.set_rows(&frame().clear()).unwrap();
        let area = Rect::new(0, 0, 40, 8);
        let mut buf = Buffer::empty(area);
        DataTable::new().render(area, &mut buf, &mut state);
        let text: String = buf.content().iter().map(|c| c.symbol()).collect();
        assert!(text.contains("No data found"));
        assert!(text.contains("Try adjusting your filters"));
    }

    #[test]
    fn test_render_footer() {
        let mut state = DataTableState::new(2, true, 1);
        state.set_rows(&frame()).unwrap();
        let area = Rect::new(0, 0, 60, 8);
        let mut buf = Buffer::empty(area);
        DataTable::new().render(area, &mut buf, &mut state);
        let text: String = buf.content().iter().map(|c| c.symbol()).collect();
        assert!(text.contains("1 - 2 / 5"));
        assert!(text.contains("Page 1 of 3"));
        assert!(text.contains("number ↕"));
    }
}
