use color_eyre::eyre::eyre;
use color_eyre::Result;
use log::LevelFilter;
use ratatui::style::Color;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use supports_color::Stream;

use crate::DatasetSize;

/// Manages config directory and config file operations
#[derive(Clone)]
pub struct ConfigManager {
    pub(crate) config_dir: PathBuf,
}

impl ConfigManager {
    /// Create a ConfigManager with a custom config directory (primarily for testing)
    pub fn with_dir(config_dir: PathBuf) -> Self {
        Self { config_dir }
    }

    /// Create a new ConfigManager for the given app name
    pub fn new(app_name: &str) -> Result<Self> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| eyre!("Could not determine config directory"))?
            .join(app_name);

        Ok(Self { config_dir })
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Get path to a specific config file
    pub fn config_path(&self, path: &str) -> PathBuf {
        self.config_dir.join(path)
    }

    pub fn ensure_config_dir(&self) -> Result<()> {
        if !self.config_dir.exists() {
            std::fs::create_dir_all(&self.config_dir)?;
        }
        Ok(())
    }

    /// Default configuration template with comments
    pub fn generate_default_config(&self) -> String {
        DEFAULT_CONFIG_TEMPLATE.to_string()
    }

    /// Write the default template to config.toml, refusing to overwrite
    /// an existing file unless `force` is set.
    pub fn write_default_config(&self, force: bool) -> Result<PathBuf> {
        let config_path = self.config_path("config.toml");

        if config_path.exists() && !force {
            return Err(eyre!(
                "Config file already exists at {}. Use --force to overwrite.",
                config_path.display()
            ));
        }

        self.ensure_config_dir()?;
        std::fs::write(&config_path, DEFAULT_CONFIG_TEMPLATE)?;

        Ok(config_path)
    }

    /// Read and parse config.toml from this directory. A missing file gives
    /// the defaults.
    pub fn read_config(&self) -> Result<AppConfig> {
        let config_path = self.config_path("config.toml");

        if !config_path.exists() {
            return Ok(AppConfig::default());
        }

        let content = std::fs::read_to_string(&config_path).map_err(|e| {
            eyre!(
                "Failed to read config file at {}: {}",
                config_path.display(),
                e
            )
        })?;

        toml::from_str(&content).map_err(|e| {
            eyre!(
                "Failed to parse config file at {}: {}",
                config_path.display(),
                e
            )
        })
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Configuration format version (for future compatibility)
    pub version: String,
    pub data: DataConfig,
    pub display: DisplayConfig,
    pub performance: PerformanceConfig,
    pub theme: ThemeConfig,
    pub logging: LoggingConfig,
    pub debug: DebugConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// "small" (143 rows) or "large" (50001 rows)
    pub size: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub page_size: usize,
    pub row_numbers: bool,
    pub row_start_index: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceConfig {
    pub event_poll_interval_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    pub color_mode: String,
    pub colors: ColorConfig,
}

/// Declares `ColorConfig` with its default, merge and key listing from one
/// `name = default` table.
macro_rules! color_config {
    ($($name:ident = $default:literal),* $(,)?) => {
        #[derive(Debug, Clone, Serialize, Deserialize)]
        #[serde(default)]
        pub struct ColorConfig {
            $(pub $name: String,)*
        }

        impl Default for ColorConfig {
            fn default() -> Self {
                Self {
                    $($name: $default.to_string(),)*
                }
            }
        }

        impl ColorConfig {
            /// `(key, value)` for every color, in declaration order.
            pub fn entries(&self) -> Vec<(&'static str, &str)> {
                vec![$((stringify!($name), self.$name.as_str()),)*]
            }

            /// Take each color from `other` that differs from its default.
            pub fn merge(&mut self, other: Self) {
                $(
                    if other.$name != $default {
                        self.$name = other.$name;
                    }
                )*
            }
        }
    };
}

color_config! {
    primary = "cyan",
    secondary = "yellow",
    error = "red",
    dimmed = "dark_gray",
    controls_bg = "indexed(236)",
    text_primary = "white",
    text_secondary = "dark_gray",
    badge = "blue",
    table_header = "white",
    table_border = "cyan",
    table_selected = "reversed",
    table_row_alt = "indexed(235)",
    panel_border_active = "yellow",
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// off, error, warn, info, debug or trace
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DebugConfig {
    pub enabled: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: "0.1".to_string(),
            data: DataConfig::default(),
            display: DisplayConfig::default(),
            performance: PerformanceConfig::default(),
            theme: ThemeConfig::default(),
            logging: LoggingConfig::default(),
            debug: DebugConfig::default(),
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            size: DatasetSize::default().as_str().to_string(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            page_size: crate::table::DEFAULT_PAGE_SIZE,
            row_numbers: true,
            row_start_index: 1,
        }
    }
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            event_poll_interval_ms: 25,
        }
    }
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            color_mode: "auto".to_string(),
            colors: ColorConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from all layers (default → user)
    pub fn load(app_name: &str) -> Result<Self> {
        Self::load_from(&ConfigManager::new(app_name)?)
    }

    /// Load from the config.toml managed by `manager`. A missing file gives
    /// the defaults; a file that cannot be read or parsed is an error.
    pub fn load_from(manager: &ConfigManager) -> Result<Self> {
        let mut config = AppConfig::default();
        config.merge(manager.read_config()?);
        config.validate()?;

        Ok(config)
    }

    /// Merge another config into this one (other takes precedence)
    pub fn merge(&mut self, other: AppConfig) {
        if other.version != AppConfig::default().version {
            self.version = other.version;
        }

        self.data.merge(other.data);
        self.display.merge(other.display);
        self.performance.merge(other.performance);
        self.theme.merge(other.theme);
        self.logging.merge(other.logging);
        self.debug.merge(other.debug);
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if !self.version.starts_with("0.1") {
            return Err(eyre!(
                "Unsupported config version: {}. Expected 0.1.x",
                self.version
            ));
        }

        self.data.dataset_size()?;

        if self.display.page_size == 0 {
            return Err(eyre!("page_size must be greater than 0"));
        }

        if self.performance.event_poll_interval_ms == 0 {
            return Err(eyre!("event_poll_interval_ms must be greater than 0"));
        }

        match self.theme.color_mode.as_str() {
            "light" | "dark" | "auto" => {}
            _ => {
                return Err(eyre!(
                    "Invalid color_mode: {}. Must be 'light', 'dark', or 'auto'",
                    self.theme.color_mode
                ))
            }
        }

        let parser = ColorParser::new();
        self.theme.colors.validate(&parser)?;

        self.logging.level_filter()?;

        Ok(())
    }
}

impl DataConfig {
    pub fn merge(&mut self, other: Self) {
        if other.size != DataConfig::default().size {
            self.size = other.size;
        }
    }

    pub fn dataset_size(&self) -> Result<DatasetSize> {
        DatasetSize::parse(&self.size).ok_or_else(|| {
            eyre!(
                "Invalid dataset size: {}. Must be 'small' or 'large'",
                self.size
            )
        })
    }
}

impl DisplayConfig {
    pub fn merge(&mut self, other: Self) {
        let default = DisplayConfig::default();
        if other.page_size != default.page_size {
            self.page_size = other.page_size;
        }
        if other.row_numbers != default.row_numbers {
            self.row_numbers = other.row_numbers;
        }
        if other.row_start_index != default.row_start_index {
            self.row_start_index = other.row_start_index;
        }
    }
}

impl PerformanceConfig {
    pub fn merge(&mut self, other: Self) {
        let default = PerformanceConfig::default();
        if other.event_poll_interval_ms != default.event_poll_interval_ms {
            self.event_poll_interval_ms = other.event_poll_interval_ms;
        }
    }
}

impl ThemeConfig {
    pub fn merge(&mut self, other: Self) {
        let default = ThemeConfig::default();
        if other.color_mode != default.color_mode {
            self.color_mode = other.color_mode;
        }
        self.colors.merge(other.colors);
    }
}

impl ColorConfig {
    fn validate(&self, parser: &ColorParser) -> Result<()> {
        for (name, value) in self.entries() {
            parser
                .parse(value)
                .map_err(|e| eyre!("Invalid color value for '{}': {}", name, e))?;
        }
        Ok(())
    }
}

impl LoggingConfig {
    pub fn merge(&mut self, other: Self) {
        if other.level != LoggingConfig::default().level {
            self.level = other.level;
        }
    }

    pub fn level_filter(&self) -> Result<LevelFilter> {
        LevelFilter::from_str(self.level.trim()).map_err(|_| {
            eyre!(
                "Invalid log level: {}. Must be one of off, error, warn, info, debug, trace",
                self.level
            )
        })
    }
}

impl DebugConfig {
    pub fn merge(&mut self, other: Self) {
        if other.enabled != DebugConfig::default().enabled {
            self.enabled = other.enabled;
        }
    }
}

/// Named colors accepted in the theme, keyed by their normalized spelling.
const NAMED_COLORS: &[(&str, Color)] = &[
    ("black", Color::Black),
    ("red", Color::Red),
    ("green", Color::Green),
    ("yellow", Color::Yellow),
    ("blue", Color::Blue),
    ("magenta", Color::Magenta),
    ("cyan", Color::Cyan),
    ("white", Color::White),
    ("bright_black", Color::Indexed(8)),
    ("bright_red", Color::Indexed(9)),
    ("bright_green", Color::Indexed(10)),
    ("bright_yellow", Color::Indexed(11)),
    ("bright_blue", Color::Indexed(12)),
    ("bright_magenta", Color::Indexed(13)),
    ("bright_cyan", Color::Indexed(14)),
    ("bright_white", Color::Indexed(15)),
    ("gray", Color::Indexed(8)),
    ("dark_gray", Color::Indexed(8)),
    ("light_gray", Color::Indexed(7)),
    // Modifiers are applied at render time
    ("reset", Color::Reset),
    ("reversed", Color::Reset),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColorDepth {
    Disabled,
    Basic,
    Indexed,
    TrueColor,
}

/// Resolves theme color strings, downgrading hex colors to what the
/// terminal on stdout can show.
pub struct ColorParser {
    depth: ColorDepth,
}

impl ColorParser {
    pub fn new() -> Self {
        let depth = if std::env::var_os("NO_COLOR").is_some() {
            ColorDepth::Disabled
        } else {
            match supports_color::on(Stream::Stdout) {
                Some(level) if level.has_16m => ColorDepth::TrueColor,
                Some(level) if level.has_256 => ColorDepth::Indexed,
                _ => ColorDepth::Basic,
            }
        };
        Self { depth }
    }

    /// Parse `#rrggbb`, `indexed(n)` or a color name. Names ignore case and
    /// accept spaces for underscores and "grey" for "gray".
    pub fn parse(&self, s: &str) -> Result<Color> {
        if self.depth == ColorDepth::Disabled {
            return Ok(Color::Reset);
        }

        let spec = s.trim();
        if spec.starts_with('#') {
            let (r, g, b) = parse_hex(spec)?;
            return Ok(match self.depth {
                ColorDepth::TrueColor => Color::Rgb(r, g, b),
                ColorDepth::Indexed => Color::Indexed(rgb_to_256_color(r, g, b)),
                _ => rgb_to_basic_ansi(r, g, b),
            });
        }

        let lower = spec.to_lowercase();
        if let Some(index) = lower
            .strip_prefix("indexed(")
            .and_then(|rest| rest.strip_suffix(')'))
        {
            return index
                .trim()
                .parse::<u8>()
                .map(Color::Indexed)
                .map_err(|_| eyre!("Invalid indexed color '{}', expected indexed(0-255)", spec));
        }

        let key = lower.replace(' ', "_").replace("grey", "gray");
        NAMED_COLORS
            .iter()
            .find(|(name, _)| *name == key)
            .map(|(_, color)| *color)
            .ok_or_else(|| {
                eyre!(
                    "Unknown color '{}'. Use a name such as red or bright_blue, \
                     indexed(0-255) or #rrggbb",
                    spec
                )
            })
    }
}

impl Default for ColorParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Split `#rrggbb` into its components.
fn parse_hex(s: &str) -> Result<(u8, u8, u8)> {
    let invalid = || eyre!("Invalid hex color '{}', expected #rrggbb", s);
    let digits = s
        .strip_prefix('#')
        .filter(|d| d.len() == 6 && d.chars().all(|c| c.is_ascii_hexdigit()))
        .ok_or_else(invalid)?;
    let value = u32::from_str_radix(digits, 16).map_err(|_| invalid())?;
    Ok(((value >> 16) as u8, (value >> 8) as u8, value as u8))
}

/// Nearest xterm 256-color palette index: the gray ramp for near-neutral
/// colors, the 6x6x6 cube otherwise.
pub fn rgb_to_256_color(r: u8, g: u8, b: u8) -> u8 {
    if r.max(g).max(b) - r.min(g).min(b) < 10 {
        let gray = (u16::from(r) + u16::from(g) + u16::from(b)) / 3;
        return match gray {
            0..=7 => 16,
            248..=u16::MAX => 231,
            _ => 232 + ((gray - 8) * 24 / 240) as u8,
        };
    }

    let level = |c: u8| (u16::from(c) * 5 / 255) as u8;
    16 + 36 * level(r) + 6 * level(g) + level(b)
}

/// Nearest of the 8 basic ANSI colors.
pub fn rgb_to_basic_ansi(r: u8, g: u8, b: u8) -> Color {
    if r.max(g).max(b) - r.min(g).min(b) < 30 {
        let avg = (u16::from(r) + u16::from(g) + u16::from(b)) / 3;
        return if avg < 64 { Color::Black } else { Color::White };
    }

    const PALETTE: [Color; 8] = [
        Color::Black,
        Color::Red,
        Color::Green,
        Color::Yellow,
        Color::Blue,
        Color::Magenta,
        Color::Cyan,
        Color::White,
    ];
    let bit = |c: u8, shift: u8| usize::from(c > 128) << shift;
    PALETTE[bit(r, 0) | bit(g, 1) | bit(b, 2)]
}

/// Theme containing parsed colors ready for use
#[derive(Debug, Clone, Default)]
pub struct Theme {
    pub colors: HashMap<String, Color>,
}

impl Theme {
    /// Create a Theme from a ThemeConfig by parsing all color strings
    pub fn from_config(config: &ThemeConfig) -> Result<Self> {
        let parser = ColorParser::new();
        let colors = config
            .colors
            .entries()
            .into_iter()
            .map(|(name, value)| {
                let color = parser.parse(value)?;
                Ok::<_, color_eyre::Report>((name.to_string(), color))
            })
            .collect::<Result<HashMap<_, _>>>()?;
        Ok(Self { colors })
    }

    /// Get a color by name, returns Reset if not found
    pub fn get(&self, name: &str) -> Color {
        self.colors.get(name).copied().unwrap_or(Color::Reset)
    }

    pub fn get_optional(&self, name: &str) -> Option<Color> {
        self.colors.get(name).copied()
    }
}

const DEFAULT_CONFIG_TEMPLATE: &str = include_str!("../config/default.toml");
