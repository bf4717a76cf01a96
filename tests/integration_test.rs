use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use facetui::{results_summary, App, AppEvent, DatasetSize, FilterValue, InputMode};
use std::sync::mpsc;

mod common;
use common::i64_values;

fn press(app: &mut App, code: KeyCode) {
    let mut next = app.event(&AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE)));
    while let Some(event) = next {
        next = app.event(&event);
    }
}

/// Run `event` and everything it triggers, as the main loop would.
fn drive(app: &mut App, event: AppEvent) {
    let mut next = Some(event);
    while let Some(event) = next {
        assert!(
            !matches!(event, AppEvent::Crash(_)),
            "unexpected crash: {:?}",
            event
        );
        next = app.event(&event);
    }
}

fn loaded_app() -> App {
    let (tx, _rx) = mpsc::channel();
    let mut app = App::new(tx);
    drive(&mut app, AppEvent::Init);
    drive(&mut app, AppEvent::Load(DatasetSize::Small));
    app
}

#[test]
fn test_app_creation() {
    let (tx, _) = mpsc::channel();
    let app = App::new(tx);
    assert_eq!(app.input_mode, InputMode::Normal);
    assert!(app.engine().is_err());
}

#[test]
fn test_load_before_init_crashes() {
    let (tx, _) = mpsc::channel();
    let mut app = App::new(tx);
    let next = app.event(&AppEvent::Load(DatasetSize::Small));
    assert!(matches!(
        next,
        Some(AppEvent::Crash(msg)) if msg.contains("before initialization")
    ));
}

#[test]
fn test_load_fills_table() {
    let app = loaded_app();
    assert!(!app.is_loading());
    assert_eq!(app.engine().unwrap().total_count(), 143);
    let pagination = app.table_state.pagination();
    assert_eq!(pagination.total_pages, 2);
    assert_eq!(pagination.end_index(), 100);
    assert_eq!(app.table_state.page().height(), 100);
}

#[test]
fn test_full_workflow() {
    let mut app = loaded_app();

    // Open the `number` panel
    press(&mut app, KeyCode::Char('f'));
    assert_eq!(app.input_mode, InputMode::Filtering);
    assert!(app.engine().unwrap().filter("number").unwrap().is_open);
    assert_eq!(app.panel_options().len(), 143);

    // Search narrows the options to values containing "4965"
    for c in "4965".chars() {
        press(&mut app, KeyCode::Char(c));
    }
    assert_eq!(
        app.engine().unwrap().filter("number").unwrap().search_term,
        "4965"
    );
    let labels: Vec<&str> = app
        .panel_options()
        .iter()
        .map(|o| o.label.as_str())
        .collect();
    assert_eq!(labels, vec!["49650"]);

    // Toggle it on
    press(&mut app, KeyCode::Char(' '));
    let engine = app.engine().unwrap();
    assert_eq!(engine.total_count(), 1);
    assert_eq!(
        engine.filter("number").unwrap().selected_values,
        vec![FilterValue::Number(49650)]
    );
    let (showing, applied) = results_summary(engine);
    assert_eq!(showing, "Showing 1 results (filtered)");
    assert_eq!(applied.as_deref(), Some("1 filters applied"));
    assert_eq!(i64_values(app.table_state.page(), "number"), vec![49650]);

    // Backspace edits the search, Esc closes the panel
    press(&mut app, KeyCode::Backspace);
    assert_eq!(
        app.engine().unwrap().filter("number").unwrap().search_term,
        "496"
    );
    press(&mut app, KeyCode::Esc);
    assert_eq!(app.input_mode, InputMode::Normal);
    assert!(!app.engine().unwrap().filter("number").unwrap().is_open);

    // Clear all
    press(&mut app, KeyCode::Char('c'));
    let engine = app.engine().unwrap();
    assert_eq!(engine.total_count(), 143);
    assert!(!engine.has_active_filters());
    assert_eq!(results_summary(engine).1, None);
}

#[test]
fn test_filter_change_returns_to_first_page_and_keeps_sort() {
    let mut app = loaded_app();

    press(&mut app, KeyCode::Char('s'));
    let first = i64_values(app.table_state.page(), "number")[0];
    assert_eq!(first, 50000 - 142 * 350);
    press(&mut app, KeyCode::Char('n'));
    assert_eq!(app.table_state.pagination().current_page, 2);

    drive(
        &mut app,
        AppEvent::UpdateSelection(
            "mod8000".to_string(),
            vec![
                FilterValue::Number(2000),
                FilterValue::Number(1650),
                FilterValue::Number(1300),
            ],
        ),
    );
    assert_eq!(app.table_state.pagination().current_page, 1);
    let sort = app.table_state.sort().unwrap();
    assert_eq!(sort.column, "number");
    assert_eq!(
        i64_values(app.table_state.page(), "number"),
        vec![49300, 49650, 50000]
    );
}

#[test]
fn test_only_one_panel_open() {
    let mut app = loaded_app();
    drive(&mut app, AppEvent::ToggleFilter("number".to_string()));
    drive(&mut app, AppEvent::ToggleFilter("mod8000".to_string()));

    let engine = app.engine().unwrap();
    assert!(!engine.filter("number").unwrap().is_open);
    assert!(engine.filter("mod8000").unwrap().is_open);
    assert_eq!(app.focused_column().as_deref(), Some("mod8000"));
    assert_eq!(app.panel_options().len(), 143);
}

#[test]
fn test_clear_focused_column() {
    let mut app = loaded_app();
    drive(
        &mut app,
        AppEvent::UpdateSelection("number".to_string(), vec![FilterValue::Number(50000)]),
    );
    assert_eq!(app.engine().unwrap().total_count(), 1);

    press(&mut app, KeyCode::Char('x'));
    assert_eq!(app.engine().unwrap().total_count(), 143);
}

#[test]
fn test_render_loaded_app() {
    use ratatui::{buffer::Buffer, layout::Rect, widgets::Widget};

    let mut app = loaded_app();
    let area = Rect::new(0, 0, 120, 30);
    let mut buf = Buffer::empty(area);
    (&mut app).render(area, &mut buf);
    let text: String = buf.content().iter().map(|c| c.symbol()).collect();

    assert!(text.contains("Business Intelligence Dashboard"));
    assert!(text.contains("Showing 143 results"));
    assert!(text.contains("Page 1 of 2"));
    assert!(text.contains("50,000"));
}
