//! Shared CLI definitions for facetui.
//!
//! Used by the main application and by the build script (manpage) and
//! gen_docs binary (command-line-options markdown).

use clap::{CommandFactory, Parser, ValueEnum};

/// Size of the generated sample dataset
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
pub enum DatasetSize {
    /// 143 rows, base values stepping down by 350
    #[default]
    Small,
    /// 50001 rows, base values stepping down by 1
    Large,
}

impl DatasetSize {
    /// Parse a size name ("small" or "large"), ignoring case.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "small" => Some(Self::Small),
            "large" => Some(Self::Large),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Large => "large",
        }
    }

    /// Number of rows generated for this size
    pub fn row_count(&self) -> usize {
        match self {
            Self::Small => 143,
            Self::Large => 50001,
        }
    }

    /// Base value of the row at `index` (0-based, in generation order)
    pub fn base_value(&self, index: usize) -> i64 {
        let index = index as i64;
        match self {
            Self::Small => 50000 - index * 350,
            Self::Large => 50000 - index,
        }
    }
}

/// Command-line arguments for facetui
#[derive(Clone, Parser, Debug, Default)]
#[command(
    name = "facetui",
    version,
    about = "Faceted data exploration in the terminal"
)]
pub struct Args {
    /// Size of the generated dataset (small: 143 rows, large: 50001 rows)
    #[arg(long = "size", value_enum)]
    pub size: Option<DatasetSize>,

    /// Number of rows per table page (default: 100)
    #[arg(long = "page-size", value_name = "N")]
    pub page_size: Option<usize>,

    /// Display row numbers on the left side of the table (default: true)
    #[arg(long = "row-numbers", value_name = "BOOL", value_parser = clap::value_parser!(bool))]
    pub row_numbers: Option<bool>,

    /// Starting index for row numbers (default: 1)
    #[arg(long = "row-start-index", value_name = "N")]
    pub row_start_index: Option<usize>,

    /// Enable debug mode to show operational information
    #[arg(long = "debug", action)]
    pub debug: bool,

    /// Log level written to the log file (off, error, warn, info, debug, trace)
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Clear all cache data (including the log file) and exit
    #[arg(long = "clear-cache", action)]
    pub clear_cache: bool,

    /// Generate default configuration file at ~/.config/facetui/config.toml
    #[arg(long = "generate-config", action)]
    pub generate_config: bool,

    /// Force overwrite existing config file when using --generate-config
    #[arg(long = "force", requires = "generate_config", action)]
    pub force: bool,
}

/// Escape `|` and newlines for use in markdown table cells.
fn escape_table_cell(s: &str) -> String {
    s.replace('|', "\\|").replace(['\n', '\r'], " ")
}

/// Render command-line options as markdown.
pub fn render_options_markdown() -> String {
    let mut cmd = Args::command();
    cmd.build();

    let mut out = String::from("# Command Line Options\n\n");

    out.push_str("## Usage\n\n```\n");
    let usage = cmd.render_usage();
    out.push_str(&usage.to_string());
    out.push_str("\n```\n\n");

    out.push_str("## Options\n\n");
    out.push_str("| Option | Description |\n");
    out.push_str("|--------|-------------|\n");

    for arg in cmd.get_arguments() {
        let id = arg.get_id().as_ref().to_string();
        if id == "help" || id == "version" {
            continue;
        }

        let mut parts = Vec::new();
        if let Some(s) = arg.get_short() {
            parts.push(format!("-{s}"));
        }
        if let Some(l) = arg.get_long() {
            parts.push(format!("--{l}"));
        }
        let op = parts.join(", ");
        let placeholder: String = if arg.get_action().takes_values() {
            arg.get_value_names()
                .map(|names| {
                    names
                        .iter()
                        .map(|n: &clap::builder::Str| format!("<{}>", n.as_ref() as &str))
                        .collect::<Vec<_>>()
                        .join(" ")
                })
                .unwrap_or_default()
        } else {
            String::new()
        };
        let option_str = if placeholder.is_empty() {
            op
        } else {
            format!("{op} {placeholder}")
        };

        let help = arg
            .get_help()
            .map(|h| escape_table_cell(&h.to_string()))
            .unwrap_or_else(|| "-".to_string());

        out.push_str(&format!("| `{option_str}` | {help} |\n"));
    }

    out
}
