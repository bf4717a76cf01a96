use facetui::config::{rgb_to_256_color, rgb_to_basic_ansi, AppConfig, ColorParser, Theme};
use facetui::{App, AppEvent, DashboardOptions};
use ratatui::style::Color;
use std::sync::mpsc::channel;

// Color parsing returns Reset for everything when NO_COLOR is set
fn ensure_colors_enabled() {
    std::env::remove_var("NO_COLOR");
}

#[test]
fn test_parse_named_colors() {
    ensure_colors_enabled();
    let parser = ColorParser::new();

    assert_eq!(parser.parse("cyan").unwrap(), Color::Cyan);
    assert_eq!(parser.parse("RED").unwrap(), Color::Red);
    assert_eq!(parser.parse("  blue  ").unwrap(), Color::Blue);
    assert_eq!(parser.parse("bright_green").unwrap(), Color::Indexed(10));
    assert_eq!(parser.parse("dark gray").unwrap(), Color::Indexed(8));
    assert_eq!(parser.parse("reversed").unwrap(), Color::Reset);
}

#[test]
fn test_parse_indexed_colors() {
    ensure_colors_enabled();
    let parser = ColorParser::new();

    assert_eq!(parser.parse("indexed(236)").unwrap(), Color::Indexed(236));
    assert_eq!(parser.parse("Indexed(0)").unwrap(), Color::Indexed(0));
    assert!(parser.parse("indexed(256)").is_err());
    assert!(parser.parse("indexed(abc)").is_err());
}

#[test]
fn test_parse_hex_and_unknown() {
    ensure_colors_enabled();
    let parser = ColorParser::new();

    assert!(parser.parse("#1e90ff").is_ok());
    assert!(parser.parse("#12345").is_err());
    assert!(parser.parse("#zzzzzz").is_err());
    assert!(parser.parse("chartreuse-ish").is_err());
}

#[test]
fn test_rgb_conversions() {
    assert_eq!(rgb_to_256_color(0, 0, 0), 16);
    assert_eq!(rgb_to_256_color(255, 255, 255), 231);
    assert_eq!(rgb_to_256_color(255, 0, 0), 196);
    assert_eq!(rgb_to_basic_ansi(0, 200, 200), Color::Cyan);
    assert_eq!(rgb_to_basic_ansi(20, 20, 20), Color::Black);
}

#[test]
fn test_theme_from_default_config() {
    ensure_colors_enabled();
    let theme = Theme::from_config(&AppConfig::default().theme).unwrap();

    assert_eq!(theme.get("primary"), Color::Cyan);
    assert_eq!(theme.get("controls_bg"), Color::Indexed(236));
    assert_eq!(theme.get("table_row_alt"), Color::Indexed(235));
    assert_eq!(theme.get("not_a_color"), Color::Reset);
    assert!(theme.get_optional("not_a_color").is_none());
}

#[test]
fn test_app_accepts_custom_theme() {
    ensure_colors_enabled();
    let mut config = AppConfig::default();
    config.theme.colors.badge = "magenta".to_string();
    config.theme.colors.table_row_alt = "#202020".to_string();
    let theme = Theme::from_config(&config.theme).unwrap();
    assert_eq!(theme.get("badge"), Color::Magenta);

    let (tx, _rx) = channel::<AppEvent>();
    let mut app = App::new_with_options(tx, theme, &DashboardOptions::default());
    app.event(&AppEvent::Init);
    assert!(app.engine().is_ok());
}
