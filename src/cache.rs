use color_eyre::eyre::eyre;
use color_eyre::Result;
use log::LevelFilter;
use simplelog::{Config, WriteLogger};
use std::fs::{self, File};
use std::path::{Path, PathBuf};

/// Log file written inside the cache directory
pub const LOG_FILE: &str = "facetui.log";

/// Registry of known cache files
const CACHE_FILES: &[&str] = &[LOG_FILE];

/// Manages cache directory and cache file operations
#[derive(Clone)]
pub struct CacheManager {
    pub(crate) cache_dir: PathBuf,
}

impl CacheManager {
    /// Create a CacheManager with a custom cache directory (primarily for testing)
    pub fn with_dir(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    /// Create a new CacheManager for the given app name
    pub fn new(app_name: &str) -> Result<Self> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| eyre!("Could not determine cache directory"))?
            .join(app_name);

        Ok(Self { cache_dir })
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Get path to a specific cache file
    pub fn cache_file(&self, filename: &str) -> PathBuf {
        self.cache_dir.join(filename)
    }

    pub fn log_file(&self) -> PathBuf {
        self.cache_file(LOG_FILE)
    }

    pub fn ensure_cache_dir(&self) -> Result<()> {
        if !self.cache_dir.exists() {
            fs::create_dir_all(&self.cache_dir)?;
        }
        Ok(())
    }

    /// Route the `log` facade into a fresh log file at `level`.
    ///
    /// The terminal belongs to the UI, so nothing is logged to stdout or
    /// stderr. With `LevelFilter::Off` no file is created.
    pub fn init_logging(&self, level: LevelFilter) -> Result<()> {
        if level == LevelFilter::Off {
            return Ok(());
        }
        self.ensure_cache_dir()?;
        let path = self.log_file();
        let log_file = File::create(&path)
            .map_err(|e| eyre!("Could not create log file {}: {}", path.display(), e))?;
        WriteLogger::init(level, Config::default(), log_file)?;
        log::info!("logging at {} to {}", level, path.display());
        Ok(())
    }

    /// Clear all registered cache files
    pub fn clear_all(&self) -> Result<()> {
        for filename in CACHE_FILES {
            let file_path = self.cache_file(filename);
            if file_path.exists() {
                if let Err(e) = fs::remove_file(&file_path) {
                    eprintln!("Warning: Could not remove cache file {}: {}", filename, e);
                }
            }
        }

        Ok(())
    }
}
