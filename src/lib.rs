use color_eyre::eyre::eyre;
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use log::LevelFilter;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, ListState, Padding, Paragraph, StatefulWidget, Widget},
};
use std::str::FromStr;
use std::sync::mpsc::Sender;

pub mod cache;
pub mod config;
pub mod dataset;
pub mod filter_engine;
pub mod filter_options;
pub mod table;
pub mod widgets;

pub use cache::CacheManager;
pub use config::{
    rgb_to_256_color, rgb_to_basic_ansi, AppConfig, ColorParser, ConfigManager, Theme,
};
pub use facetui_cli::{Args, DatasetSize};
pub use filter_engine::{ColumnFilter, FilterEngine, FilterState};
pub use filter_options::{FilterOption, FilterValue};

use table::format_thousands;
use widgets::controls::Controls;
use widgets::datatable::{DataTable, DataTableState};
use widgets::debug::DebugState;
use widgets::filter_dropdown::{FilterBar, FilterPanel};

/// Application name used for config and cache directories
pub const APP_NAME: &str = "facetui";

const TITLE: &str = "Business Intelligence Dashboard";
const SUBTITLE: &str = "Advanced data filtering and analytics";

/// Startup settings resolved from the command line and the config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardOptions {
    pub size: DatasetSize,
    pub page_size: usize,
    pub row_numbers: bool,
    pub row_start_index: usize,
    pub debug: bool,
    pub log_level: String,
    pub event_poll_interval_ms: u64,
}

impl Default for DashboardOptions {
    fn default() -> Self {
        Self::from_args_and_config(&Args::default(), &AppConfig::default())
    }
}

impl DashboardOptions {
    /// Create DashboardOptions from CLI args and config, with CLI args taking precedence
    pub fn from_args_and_config(args: &Args, config: &AppConfig) -> Self {
        let size = args
            .size
            .or_else(|| DatasetSize::parse(&config.data.size))
            .unwrap_or_default();
        let page_size = args
            .page_size
            .filter(|n| *n > 0)
            .unwrap_or(config.display.page_size)
            .max(1);

        Self {
            size,
            page_size,
            row_numbers: args.row_numbers.unwrap_or(config.display.row_numbers),
            row_start_index: args
                .row_start_index
                .unwrap_or(config.display.row_start_index),
            debug: args.debug || config.debug.enabled,
            log_level: args
                .log_level
                .clone()
                .unwrap_or_else(|| config.logging.level.clone()),
            event_poll_interval_ms: config.performance.event_poll_interval_ms,
        }
    }

    pub fn log_level_filter(&self) -> Result<LevelFilter> {
        LevelFilter::from_str(self.log_level.trim())
            .map_err(|_| eyre!("Invalid log level: {}", self.log_level))
    }
}

impl From<&Args> for DashboardOptions {
    fn from(args: &Args) -> Self {
        Self::from_args_and_config(args, &AppConfig::default())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    Key(KeyEvent),
    /// Install the empty filter engine
    Init,
    /// Generate the dataset and hand it to the engine
    Load(DatasetSize),
    UpdateSelection(String, Vec<FilterValue>),
    UpdateSearch(String, String),
    ToggleFilter(String),
    ClearFilters,
    Sort(String),
    NextPage,
    PreviousPage,
    /// Re-read the filtered rows into the table
    Update,
    Exit,
    Crash(String),
    Resize(u16, u16), // resized (width, height)
}

#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
pub enum InputMode {
    #[default]
    Normal,
    Filtering,
}

pub struct App {
    events: Sender<AppEvent>,
    engine: Option<FilterEngine>,
    pub table_state: DataTableState,
    pub input_mode: InputMode,
    focus: usize,
    option_state: ListState,
    options: Vec<FilterOption>,
    loading: bool,
    theme: Theme,
    debug: DebugState,
}

impl App {
    pub fn new(events: Sender<AppEvent>) -> App {
        let theme = Theme::from_config(&AppConfig::default().theme).unwrap_or_else(|e| {
            log::warn!("Failed to create default theme: {}. Using fallback.", e);
            Theme::default()
        });

        Self::new_with_options(events, theme, &DashboardOptions::default())
    }

    pub fn new_with_options(
        events: Sender<AppEvent>,
        theme: Theme,
        options: &DashboardOptions,
    ) -> App {
        App {
            events,
            engine: None,
            table_state: DataTableState::new(
                options.page_size,
                options.row_numbers,
                options.row_start_index,
            ),
            input_mode: InputMode::Normal,
            focus: 0,
            option_state: ListState::default(),
            options: Vec::new(),
            loading: false,
            theme,
            debug: DebugState {
                enabled: options.debug,
                ..DebugState::default()
            },
        }
    }

    pub fn send_event(&mut self, event: AppEvent) -> Result<()> {
        self.events.send(event)?;
        Ok(())
    }

    pub fn enable_debug(&mut self) {
        self.debug.enabled = true;
    }

    /// The filter engine; an error until `AppEvent::Init` has installed it.
    pub fn engine(&self) -> Result<&FilterEngine> {
        self.engine
            .as_ref()
            .ok_or_else(|| eyre!("Filter engine accessed before initialization"))
    }

    pub fn engine_mut(&mut self) -> Result<&mut FilterEngine> {
        self.engine
            .as_mut()
            .ok_or_else(|| eyre!("Filter engine accessed before initialization"))
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Column whose filter button has focus.
    pub fn focused_column(&self) -> Option<String> {
        self.engine
            .as_ref()
            .and_then(|engine| engine.columns().get(self.focus).cloned())
    }

    /// Options shown in the open panel.
    pub fn panel_options(&self) -> &[FilterOption] {
        &self.options
    }

    pub fn option_cursor(&self) -> Option<usize> {
        self.option_state.selected()
    }

    fn color(&self, name: &str) -> Color {
        self.theme.get(name)
    }

    fn column_count(&self) -> usize {
        self.engine.as_ref().map_or(0, |e| e.columns().len())
    }

    fn open_column(&self) -> Option<String> {
        let engine = self.engine.as_ref()?;
        engine
            .state()
            .filters()
            .iter()
            .find(|f| f.is_open)
            .map(|f| f.column.clone())
    }

    /// Recompute the open panel's options and keep the cursor on a row.
    fn refresh_options(&mut self) -> Result<()> {
        self.options = match self.open_column() {
            Some(column) => self.engine()?.facet_options(&column)?,
            None => Vec::new(),
        };
        let cursor = match self.option_state.selected() {
            _ if self.options.is_empty() => None,
            Some(i) => Some(i.min(self.options.len() - 1)),
            None => Some(0),
        };
        self.option_state.select(cursor);
        Ok(())
    }

    fn key(&mut self, event: &KeyEvent) -> Option<AppEvent> {
        self.debug.on_key(event);
        if event.kind == KeyEventKind::Release {
            return None;
        }

        if self.input_mode == InputMode::Filtering {
            return self.filtering_key(event);
        }

        let column = self.focused_column();
        let n = self.column_count();
        match event.code {
            KeyCode::Char('q') | KeyCode::Esc => Some(AppEvent::Exit),
            KeyCode::Char('c') if event.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(AppEvent::Exit)
            }
            KeyCode::Right | KeyCode::Tab | KeyCode::Char('l') if n > 0 => {
                self.focus = (self.focus + 1) % n;
                None
            }
            KeyCode::Left | KeyCode::BackTab | KeyCode::Char('h') if n > 0 => {
                self.focus = (self.focus + n - 1) % n;
                None
            }
            KeyCode::Enter | KeyCode::Char('f') => column.map(AppEvent::ToggleFilter),
            KeyCode::Char('s') => column.map(AppEvent::Sort),
            KeyCode::Char('x') => column.map(|c| AppEvent::UpdateSelection(c, Vec::new())),
            KeyCode::Char('c') => Some(AppEvent::ClearFilters),
            KeyCode::Char('n') | KeyCode::PageDown => Some(AppEvent::NextPage),
            KeyCode::Char('p') | KeyCode::PageUp => Some(AppEvent::PreviousPage),
            KeyCode::Down | KeyCode::Char('j') => {
                self.table_state.select_next();
                None
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.table_state.select_previous();
                None
            }
            _ => None,
        }
    }

    fn filtering_key(&mut self, event: &KeyEvent) -> Option<AppEvent> {
        let Some(column) = self.open_column() else {
            self.input_mode = InputMode::Normal;
            return None;
        };
        let filter = self.engine.as_ref()?.filter(&column)?.clone();

        match event.code {
            KeyCode::Esc | KeyCode::Tab => Some(AppEvent::ToggleFilter(column)),
            KeyCode::Down => {
                if !self.options.is_empty() {
                    let next = self
                        .option_state
                        .selected()
                        .map_or(0, |i| (i + 1).min(self.options.len() - 1));
                    self.option_state.select(Some(next));
                }
                None
            }
            KeyCode::Up => {
                if !self.options.is_empty() {
                    let previous = self
                        .option_state
                        .selected()
                        .map_or(0, |i| i.saturating_sub(1));
                    self.option_state.select(Some(previous));
                }
                None
            }
            KeyCode::Char(' ') | KeyCode::Enter => {
                let option = self.options.get(self.option_state.selected()?)?;
                Some(AppEvent::UpdateSelection(
                    column,
                    filter.toggled(&option.value),
                ))
            }
            KeyCode::Backspace => {
                let mut term = filter.search_term;
                term.pop()?;
                Some(AppEvent::UpdateSearch(column, term))
            }
            KeyCode::Char(c) if !event.modifiers.contains(KeyModifiers::CONTROL) => {
                let mut term = filter.search_term;
                term.push(c);
                Some(AppEvent::UpdateSearch(column, term))
            }
            _ => None,
        }
    }

    /// Open `column`'s panel (closing any other) or close it.
    fn toggle_filter(&mut self, column: &str) -> Result<()> {
        let engine = self.engine_mut()?;
        let opening = engine.filter(column).is_some_and(|f| !f.is_open);
        let others: Vec<String> = engine
            .state()
            .filters()
            .iter()
            .filter(|f| f.is_open && f.column != column)
            .map(|f| f.column.clone())
            .collect();
        for other in others {
            engine.toggle_open(&other);
        }
        engine.toggle_open(column);
        let position = engine.columns().iter().position(|c| c == column);

        if let Some(index) = position {
            self.focus = index;
        }
        self.input_mode = if opening {
            InputMode::Filtering
        } else {
            InputMode::Normal
        };
        self.option_state = ListState::default();
        self.refresh_options()
    }

    fn handle(&mut self, event: &AppEvent) -> Result<Option<AppEvent>> {
        match event {
            AppEvent::Key(key) => Ok(self.key(key)),
            AppEvent::Init => {
                self.engine = Some(FilterEngine::new());
                self.loading = true;
                Ok(None)
            }
            AppEvent::Load(size) => {
                let data = dataset::generate(*size)?;
                self.engine_mut()?.set_data(data);
                self.loading = false;
                self.focus = 0;
                self.input_mode = InputMode::Normal;
                Ok(Some(AppEvent::Update))
            }
            AppEvent::UpdateSelection(column, values) => {
                self.engine_mut()?.update_selection(column, values.clone())?;
                Ok(Some(AppEvent::Update))
            }
            AppEvent::UpdateSearch(column, term) => {
                self.engine_mut()?.update_search(column, term);
                self.refresh_options()?;
                Ok(None)
            }
            AppEvent::ToggleFilter(column) => {
                self.toggle_filter(column)?;
                Ok(None)
            }
            AppEvent::ClearFilters => {
                self.engine_mut()?.clear_all();
                self.input_mode = InputMode::Normal;
                Ok(Some(AppEvent::Update))
            }
            AppEvent::Sort(column) => {
                self.table_state.sort_by(column)?;
                Ok(None)
            }
            AppEvent::NextPage => {
                self.table_state.next_page();
                Ok(None)
            }
            AppEvent::PreviousPage => {
                self.table_state.previous_page();
                Ok(None)
            }
            AppEvent::Update => {
                let engine = self.engine()?;
                let filtered = engine.filtered_data().clone();
                let total_rows = engine.data().height();
                self.debug.filtered_rows = filtered.height();
                self.debug.total_rows = total_rows;
                self.table_state.set_rows(&filtered)?;
                self.refresh_options()?;
                Ok(None)
            }
            AppEvent::Resize(_, _) | AppEvent::Exit | AppEvent::Crash(_) => Ok(None),
        }
    }

    pub fn event(&mut self, event: &AppEvent) -> Option<AppEvent> {
        self.debug.num_events += 1;
        match self.handle(event) {
            Ok(next) => next,
            Err(e) => {
                log::error!("error handling {:?}: {}", event, e);
                Some(AppEvent::Crash(e.to_string()))
            }
        }
    }

    fn render_header(&self, area: Rect, buf: &mut Buffer, active: bool) {
        let mut spans = vec![
            Span::styled(
                TITLE,
                Style::default()
                    .fg(self.color("text_primary"))
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(SUBTITLE, Style::default().fg(self.color("text_secondary"))),
        ];
        if active {
            spans.push(Span::raw("  "));
            spans.push(Span::styled(
                " Active ",
                Style::default()
                    .bg(self.color("badge"))
                    .fg(self.color("text_primary")),
            ));
        }
        Paragraph::new(Line::from(spans)).render(area, buf);

        if active {
            Paragraph::new("✕ Clear All (c)")
                .style(Style::default().fg(self.color("error")))
                .right_aligned()
                .render(area, buf);
        }
    }

    fn render_summary(&self, engine: &FilterEngine, area: Rect, buf: &mut Buffer) {
        let (showing, applied) = results_summary(engine);
        Paragraph::new(showing)
            .style(Style::default().fg(self.color("text_secondary")))
            .render(area, buf);
        if let Some(applied) = applied {
            Paragraph::new(applied)
                .style(Style::default().fg(self.color("primary")))
                .right_aligned()
                .render(area, buf);
        }
    }
}

/// "Showing N results", with "(filtered)" when any filter applies, and the
/// "K filters applied" note.
pub fn results_summary(engine: &FilterEngine) -> (String, Option<String>) {
    let mut showing = format!(
        "Showing {} results",
        format_thousands(engine.total_count() as i64)
    );
    if engine.has_active_filters() {
        showing.push_str(" (filtered)");
        let applied = format!("{} filters applied", engine.applied_filter_count());
        (showing, Some(applied))
    } else {
        (showing, None)
    }
}

impl Widget for &mut App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.debug.num_frames += 1;

        let mut constraints = vec![
            Constraint::Length(1), // header
            Constraint::Length(1), // filter bar
            Constraint::Length(1), // summary
            Constraint::Fill(1),   // table and panel
            Constraint::Length(1), // controls
        ];
        if self.debug.enabled {
            constraints.push(Constraint::Length(1));
        }
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);

        let Some(engine) = self.engine.as_ref().filter(|_| !self.loading) else {
            self.render_header(layout[0], buf, false);
            Paragraph::new("Loading data...")
                .centered()
                .block(Block::default().padding(Padding::top(layout[3].height / 2)))
                .render(layout[3], buf);
            (&Controls::new().with_colors(self.color("controls_bg"), self.color("text_primary")))
                .render(layout[4], buf);
            return;
        };

        let active = engine.has_active_filters();
        self.render_header(layout[0], buf, active);
        FilterBar::new(engine.state().filters(), self.focus)
            .with_colors(
                self.color("primary"),
                self.color("secondary"),
                self.color("dimmed"),
            )
            .render(layout[1], buf);
        self.render_summary(engine, layout[2], buf);

        let open = engine.state().filters().iter().find(|f| f.is_open).cloned();
        let row_count = engine.total_count();

        let mut table_area = layout[3];
        if let Some(filter) = &open {
            let chunks = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Min(0), Constraint::Length(40)])
                .split(layout[3]);
            table_area = chunks[0];
            FilterPanel::new(filter, &self.options)
                .with_colors(
                    self.color("panel_border_active"),
                    self.color("primary"),
                    self.color("dimmed"),
                )
                .render(chunks[1], buf, &mut self.option_state);
        }

        let alternate = self.theme.get_optional("table_row_alt");
        DataTable::new()
            .with_colors(
                self.color("table_header"),
                self.color("dimmed"),
                self.color("table_border"),
                self.color("dimmed"),
            )
            .with_selected_color(self.color("table_selected"))
            .with_alternate_row_bg(alternate)
            .render(table_area, buf, &mut self.table_state);

        (&Controls::with_row_count(row_count)
            .with_filtering(self.input_mode == InputMode::Filtering)
            .with_colors(self.color("controls_bg"), self.color("text_primary")))
            .render(layout[4], buf);

        if self.debug.enabled && layout.len() > 5 {
            self.debug.render(layout[5], buf);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc::channel;

    fn key(code: KeyCode) -> AppEvent {
        AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn test_options_cli_overrides_config() {
        let mut config = AppConfig::default();
        config.data.size = "large".to_string();
        config.display.page_size = 50;
        config.logging.level = "warn".to_string();

        let opts = DashboardOptions::from_args_and_config(&Args::default(), &config);
        assert_eq!(opts.size, DatasetSize::Large);
        assert_eq!(opts.page_size, 50);
        assert_eq!(opts.log_level_filter().unwrap(), LevelFilter::Warn);

        let args = Args {
            size: Some(DatasetSize::Small),
            page_size: Some(10),
            row_numbers: Some(false),
            log_level: Some("trace".to_string()),
            ..Args::default()
        };
        let opts = DashboardOptions::from_args_and_config(&args, &config);
        assert_eq!(opts.size, DatasetSize::Small);
        assert_eq!(opts.page_size, 10);
        assert!(!opts.row_numbers);
        assert_eq!(opts.log_level_filter().unwrap(), LevelFilter::Trace);
    }

    #[test]
    fn test_engine_before_init_is_an_error() {
        let (tx, _rx) = channel();
        let mut app = App::new(tx);
        assert!(app.engine().is_err());
        let next = app.event(&AppEvent::ClearFilters);
        assert!(matches!(next, Some(AppEvent::Crash(_))));
    }

    #[test]
    fn test_init_installs_empty_engine() {
        let (tx, _rx) = channel();
        let mut app = App::new(tx);
        assert_eq!(app.event(&AppEvent::Init), None);
        let engine = app.engine().unwrap();
        assert_eq!(engine.total_count(), 0);
        assert!(engine.columns().is_empty());
        assert!(app.is_loading());
        assert_eq!(app.event(&key(KeyCode::Char('f'))), None);
    }

    #[test]
    fn test_focus_wraps() {
        let (tx, _rx) = channel();
        let mut app = App::new(tx);
        app.event(&AppEvent::Init);
        app.event(&AppEvent::Load(DatasetSize::Small));
        assert_eq!(app.focused_column().as_deref(), Some("number"));
        app.event(&key(KeyCode::Left));
        assert_eq!(app.focused_column().as_deref(), Some("mod8000"));
        app.event(&key(KeyCode::Right));
        app.event(&key(KeyCode::Right));
        assert_eq!(app.focused_column().as_deref(), Some("mod20002"));
    }

    #[test]
    fn test_quit_keys() {
        let (tx, _rx) = channel();
        let mut app = App::new(tx);
        assert_eq!(app.event(&key(KeyCode::Char('q'))), Some(AppEvent::Exit));
        assert_eq!(app.event(&key(KeyCode::Esc)), Some(AppEvent::Exit));
    }
}
