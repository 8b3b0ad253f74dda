//! Reader configuration
//!
//! Settings come from three layers, later ones winning: built-in defaults, a
//! TOML file, and `COMIC_READER_*` environment variables.

use comic_reader_cache::DEFAULT_RECENCY_CAPACITY;
use comic_reader_container::MediaFilter;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

const ENV_RECENCY_CAPACITY: &str = "COMIC_READER_RECENCY_CAPACITY";
const ENV_BURST_GAP_MS: &str = "COMIC_READER_BURST_GAP_MS";
const ENV_SCROLL_POLARITY: &str = "COMIC_READER_SCROLL_POLARITY";

/// Top-level reader settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    /// Responses remembered per remote service
    pub recency_capacity: usize,
    /// Extensions that mark a file as an archive container
    pub archive_extensions: Vec<String>,
    /// Extensions that mark a file or archive entry as a page image
    pub image_extensions: Vec<String>,
    /// Move to the neighbouring archive when paging past either end
    pub advance_across_containers: bool,
    pub scroll: ScrollConfig,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        let filter = MediaFilter::default();
        Self {
            recency_capacity: DEFAULT_RECENCY_CAPACITY,
            archive_extensions: filter.archive_extensions,
            image_extensions: filter.image_extensions,
            advance_across_containers: true,
            scroll: ScrollConfig::default(),
        }
    }
}

/// Wheel rate limiting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollConfig {
    /// A pause longer than this starts a new burst
    pub burst_gap_ms: u64,
    /// Speed curve over burst duration, in ascending threshold order
    pub tiers: Vec<SpeedTier>,
    pub polarity: ScrollPolarity,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            burst_gap_ms: 500,
            tiers: vec![SpeedTier::below(800, 4.0), SpeedTier::beyond(10.0)],
            polarity: ScrollPolarity::UpIsPrevious,
        }
    }
}

impl ScrollConfig {
    /// Slower start: 3 pages/s for the first second, 6 in the next, then 10
    pub fn three_tier() -> Self {
        Self {
            tiers: vec![
                SpeedTier::below(1000, 3.0),
                SpeedTier::below(2000, 6.0),
                SpeedTier::beyond(10.0),
            ],
            ..Self::default()
        }
    }

    pub fn burst_gap(&self) -> Duration {
        Duration::from_millis(self.burst_gap_ms)
    }
}

/// One step of the scroll speed curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedTier {
    /// Applies while the burst is shorter than this; `None` means forever
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub below_ms: Option<u64>,
    pub pages_per_second: f64,
}

impl SpeedTier {
    pub fn below(below_ms: u64, pages_per_second: f64) -> Self {
        Self { below_ms: Some(below_ms), pages_per_second }
    }

    pub fn beyond(pages_per_second: f64) -> Self {
        Self { below_ms: None, pages_per_second }
    }
}

/// Which wheel direction turns to the previous page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollPolarity {
    #[default]
    UpIsPrevious,
    UpIsNext,
}

impl std::str::FromStr for ScrollPolarity {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "up_is_previous" => Ok(Self::UpIsPrevious),
            "up_is_next" => Ok(Self::UpIsNext),
            _ => Err(ConfigError::InvalidValue("scroll.polarity".to_string())),
        }
    }
}

impl ReaderConfig {
    /// Location of the user config file, if the platform has a config dir
    ///
    /// - Linux: ~/.config/comic-reader/config.toml
    /// - macOS: ~/Library/Application Support/comic-reader/config.toml
    /// - Windows: %APPDATA%\comic-reader\config.toml
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("comic-reader").join("config.toml"))
    }

    /// Load all layers
    ///
    /// With `explicit` set, that file must exist. Otherwise the default file
    /// is read when present and silently skipped when not.
    ///
    /// # Errors
    /// Returns an error if a file cannot be read or parsed, or if the
    /// resulting configuration fails [`validate`](Self::validate).
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path() {
                Some(path) if path.is_file() => Self::from_file(path)?,
                _ => Self::default(),
            },
        };

        config.apply_env(|name| std::env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults overridden by environment variables
    ///
    /// Environment variables:
    /// - `COMIC_READER_RECENCY_CAPACITY`: remembered remote responses (default: 3)
    /// - `COMIC_READER_BURST_GAP_MS`: scroll burst gap in ms (default: 500)
    /// - `COMIC_READER_SCROLL_POLARITY`: `up_is_previous` or `up_is_next`
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// Loads configuration from a TOML file.
    ///
    /// Expected file format (every key optional):
    /// ```toml
    /// recency_capacity = 3
    /// archive_extensions = ["zip", "cbz"]
    /// advance_across_containers = true
    ///
    /// [scroll]
    /// burst_gap_ms = 500
    /// polarity = "up_is_previous"
    /// tiers = [
    ///     { below_ms = 800, pages_per_second = 4.0 },
    ///     { pages_per_second = 10.0 },
    /// ]
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path.as_ref())?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Override fields from variables resolved by `lookup`
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup(ENV_RECENCY_CAPACITY) {
            self.recency_capacity = val
                .trim()
                .parse::<usize>()
                .map_err(|_| ConfigError::InvalidValue(ENV_RECENCY_CAPACITY.to_string()))?;
        }

        if let Some(val) = lookup(ENV_BURST_GAP_MS) {
            self.scroll.burst_gap_ms = val
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidValue(ENV_BURST_GAP_MS.to_string()))?;
        }

        if let Some(val) = lookup(ENV_SCROLL_POLARITY) {
            self.scroll.polarity = val
                .parse()
                .map_err(|_| ConfigError::InvalidValue(ENV_SCROLL_POLARITY.to_string()))?;
        }

        Ok(())
    }

    /// Reject settings the engine cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.recency_capacity == 0 {
            return Err(ConfigError::InvalidValue("recency_capacity".to_string()));
        }

        let tiers = &self.scroll.tiers;
        if tiers.is_empty() {
            return Err(ConfigError::InvalidValue("scroll.tiers".to_string()));
        }

        for tier in tiers {
            if !tier.pages_per_second.is_finite() || tier.pages_per_second <= 0.0 {
                return Err(ConfigError::InvalidValue("scroll.tiers.pages_per_second".to_string()));
            }
        }

        // The curve must never slow down as a burst goes on.
        for pair in tiers.windows(2) {
            let ordered = match (pair[0].below_ms, pair[1].below_ms) {
                (Some(a), Some(b)) => a < b,
                (Some(_), None) => true,
                (None, _) => false,
            };
            if !ordered || pair[1].pages_per_second < pair[0].pages_per_second {
                return Err(ConfigError::InvalidValue("scroll.tiers".to_string()));
            }
        }

        Ok(())
    }

    pub fn media_filter(&self) -> MediaFilter {
        MediaFilter {
            archive_extensions: self.archive_extensions.clone(),
            image_extensions: self.image_extensions.clone(),
        }
    }
}

/// Errors that can occur during configuration operations.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Invalid value for a configuration parameter
    #[error("invalid configuration value: {0}")]
    InvalidValue(String),

    #[error("failed to read configuration: {0}")]
    Io(#[from] io::Error),

    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = ReaderConfig::default();
        assert_eq!(config.recency_capacity, 3);
        assert_eq!(config.archive_extensions, vec!["zip", "cbz"]);
        assert!(config.advance_across_containers);
        assert_eq!(config.scroll.burst_gap(), Duration::from_millis(500));
        assert_eq!(config.scroll.polarity, ScrollPolarity::UpIsPrevious);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_toml_partial() {
        let config = ReaderConfig::from_toml(
            r#"
            recency_capacity = 5

            [scroll]
            polarity = "up_is_next"
            tiers = [
                { below_ms = 1000, pages_per_second = 3.0 },
                { pages_per_second = 8.0 },
            ]
            "#,
        )
        .expect("valid toml");

        assert_eq!(config.recency_capacity, 5);
        assert_eq!(config.scroll.polarity, ScrollPolarity::UpIsNext);
        assert_eq!(config.scroll.burst_gap_ms, 500);
        assert_eq!(config.scroll.tiers[1], SpeedTier::beyond(8.0));
        assert_eq!(config.image_extensions, ReaderConfig::default().image_extensions);
    }

    #[test]
    fn test_from_file() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let path = temp.path().join("config.toml");
        fs::write(&path, "advance_across_containers = false\n").expect("write config");

        let config = ReaderConfig::load(Some(&path)).expect("load should succeed");
        assert!(!config.advance_across_containers);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let result = ReaderConfig::from_file(temp.path().join("absent.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_malformed_toml() {
        let result = ReaderConfig::from_toml("recency_capacity = \"many\"");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = ReaderConfig::default();
        config
            .apply_env(env(&[
                ("COMIC_READER_RECENCY_CAPACITY", "7"),
                ("COMIC_READER_BURST_GAP_MS", "300"),
                ("COMIC_READER_SCROLL_POLARITY", "up_is_next"),
            ]))
            .expect("valid overrides");

        assert_eq!(config.recency_capacity, 7);
        assert_eq!(config.scroll.burst_gap_ms, 300);
        assert_eq!(config.scroll.polarity, ScrollPolarity::UpIsNext);
    }

    #[test]
    fn test_env_invalid_value() {
        let mut config = ReaderConfig::default();
        let result = config.apply_env(env(&[("COMIC_READER_BURST_GAP_MS", "soon")]));
        assert!(
            matches!(result, Err(ConfigError::InvalidValue(name)) if name == "COMIC_READER_BURST_GAP_MS")
        );
    }

    #[test]
    fn test_validate_rejects_bad_curves() {
        let mut config = ReaderConfig::default();
        config.scroll.tiers.clear();
        assert!(config.validate().is_err());

        config.scroll.tiers = vec![SpeedTier::below(800, 0.0), SpeedTier::beyond(10.0)];
        assert!(config.validate().is_err());

        config.scroll.tiers = vec![SpeedTier::below(800, 10.0), SpeedTier::beyond(4.0)];
        assert!(config.validate().is_err());

        config.scroll.tiers = vec![SpeedTier::beyond(4.0), SpeedTier::below(800, 10.0)];
        assert!(config.validate().is_err());

        config.scroll = ScrollConfig::three_tier();
        assert!(config.validate().is_ok());

        config.recency_capacity = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_media_filter_follows_config() {
        let config = ReaderConfig { archive_extensions: vec!["cbz".into()], ..Default::default() };
        let filter = config.media_filter();
        assert!(filter.is_archive(Path::new("book.CBZ")));
        assert!(!filter.is_archive(Path::new("book.zip")));
    }
}
