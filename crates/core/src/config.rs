//! Viewer configuration
//!
//! Central configuration for the strip viewer: the page library location
//! and naming convention, plus the timing constants for scroll settling
//! and the end-of-chapter dialog. Configuration can be loaded from a
//! file, from environment variables, or created programmatically.

use std::fs;
use std::path::{Path, PathBuf};

use crate::library::DEFAULT_MISS_LIMIT;

/// A storefront platform advertised by the end-of-chapter dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformLink {
    pub id: String,
    pub url: String,
}

/// Configuration for a viewing session.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerConfig {
    /// Page library directory. `None` until chosen by CLI argument,
    /// config, or the folder picker.
    pub library_dir: Option<PathBuf>,
    /// Asset file extension (without the dot)
    pub extension: String,
    /// Zero-pad width of the sequential filenames
    pub pad_width: usize,
    /// Consecutive misses that end discovery
    pub miss_limit: u32,
    /// Scroll quiescence window before re-evaluating the current page
    pub debounce_ms: u64,
    /// Pause between completion detection and the dialog appearing
    pub completion_delay_ms: u64,
    /// How close (px) the strip bottom must be to the viewport bottom
    pub completion_tolerance_px: f32,
    /// Vertical gap between pages in the strip
    pub page_spacing_px: f32,
    /// Storefront buttons shown in the end-of-chapter dialog
    pub platform_links: Vec<PlatformLink>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            library_dir: None,
            extension: "png".to_string(),
            pad_width: 3,
            miss_limit: DEFAULT_MISS_LIMIT,
            debounce_ms: 100,
            completion_delay_ms: 1000,
            completion_tolerance_px: 100.0,
            page_spacing_px: 16.0,
            platform_links: vec![
                PlatformLink { id: "mechacomic".into(), url: "https://mechacomic.jp/".into() },
                PlatformLink { id: "piccoma".into(), url: "https://piccoma.com/".into() },
                PlatformLink { id: "kindle".into(), url: "https://amazon.co.jp/kindle".into() },
                PlatformLink { id: "bookstore".into(), url: "https://japan-revival.com".into() },
            ],
        }
    }
}

impl ViewerConfig {
    /// Sets the library directory.
    pub fn with_library_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.library_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Sets the asset file extension.
    pub fn with_extension(mut self, extension: &str) -> Self {
        self.extension = extension.trim_start_matches('.').to_string();
        self
    }

    /// Sets the number of consecutive misses that end discovery.
    pub fn with_miss_limit(mut self, miss_limit: u32) -> Self {
        self.miss_limit = miss_limit;
        self
    }

    /// Returns the default configuration file path for the current platform.
    ///
    /// - macOS: ~/Library/Application Support/inkstrip/config.toml
    /// - Linux: ~/.config/inkstrip/config.toml
    /// - Windows: %APPDATA%\inkstrip\config.toml
    pub fn default_config_path() -> PathBuf {
        if let Some(config_dir) = dirs::config_dir() {
            config_dir.join("inkstrip").join("config.toml")
        } else {
            PathBuf::from("config.toml")
        }
    }

    /// Loads configuration from environment variables on top of defaults.
    ///
    /// Environment variables:
    /// - `INKSTRIP_LIBRARY_DIR`: page library directory
    /// - `INKSTRIP_EXTENSION`: asset file extension (default: png)
    /// - `INKSTRIP_PAD_WIDTH`: filename zero-pad width (default: 3)
    /// - `INKSTRIP_MISS_LIMIT`: consecutive misses ending discovery (default: 3)
    /// - `INKSTRIP_DEBOUNCE_MS`: scroll settle window in ms (default: 100)
    ///
    /// # Errors
    /// Returns an error if any environment variable contains an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env()?;
        Ok(config)
    }

    /// Applies environment variable overrides to this configuration.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        if let Ok(val) = std::env::var("INKSTRIP_LIBRARY_DIR") {
            self.library_dir = Some(PathBuf::from(val));
        }

        if let Ok(val) = std::env::var("INKSTRIP_EXTENSION") {
            self.extension = val.trim_start_matches('.').to_string();
        }

        if let Ok(val) = std::env::var("INKSTRIP_PAD_WIDTH") {
            self.pad_width = val
                .parse::<usize>()
                .map_err(|_| ConfigError::InvalidValue("INKSTRIP_PAD_WIDTH".to_string()))?;
        }

        if let Ok(val) = std::env::var("INKSTRIP_MISS_LIMIT") {
            self.miss_limit = val
                .parse::<u32>()
                .map_err(|_| ConfigError::InvalidValue("INKSTRIP_MISS_LIMIT".to_string()))?;
        }

        if let Ok(val) = std::env::var("INKSTRIP_DEBOUNCE_MS") {
            self.debounce_ms = val
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidValue("INKSTRIP_DEBOUNCE_MS".to_string()))?;
        }

        Ok(())
    }

    /// Loads configuration from a TOML file.
    ///
    /// Expected file format:
    /// ```toml
    /// library_dir = "/scans/chapter-12"
    /// extension = "png"
    /// pad_width = 3
    /// miss_limit = 3
    /// debounce_ms = 100
    /// completion_delay_ms = 1000
    /// link.kindle = "https://amazon.co.jp/kindle"
    /// ```
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path.as_ref())?;
        Self::from_toml(&contents)
    }

    /// Parses configuration from a TOML string.
    fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let mut links_overridden = false;

        for line in toml_str.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim();
            let value = value.trim().trim_matches('"');

            if let Some(id) = key.strip_prefix("link.") {
                // The first link line replaces the built-in storefronts.
                if !links_overridden {
                    config.platform_links.clear();
                    links_overridden = true;
                }
                config.platform_links.push(PlatformLink {
                    id: id.to_string(),
                    url: value.to_string(),
                });
                continue;
            }

            match key {
                "library_dir" => {
                    config.library_dir = Some(PathBuf::from(value));
                }
                "extension" => {
                    config.extension = value.trim_start_matches('.').to_string();
                }
                "pad_width" => {
                    config.pad_width = value
                        .parse::<usize>()
                        .map_err(|_| ConfigError::InvalidValue(key.to_string()))?;
                }
                "miss_limit" => {
                    config.miss_limit = value
                        .parse::<u32>()
                        .map_err(|_| ConfigError::InvalidValue(key.to_string()))?;
                }
                "debounce_ms" => {
                    config.debounce_ms = value
                        .parse::<u64>()
                        .map_err(|_| ConfigError::InvalidValue(key.to_string()))?;
                }
                "completion_delay_ms" => {
                    config.completion_delay_ms = value
                        .parse::<u64>()
                        .map_err(|_| ConfigError::InvalidValue(key.to_string()))?;
                }
                "completion_tolerance_px" => {
                    config.completion_tolerance_px = value
                        .parse::<f32>()
                        .map_err(|_| ConfigError::InvalidValue(key.to_string()))?;
                }
                "page_spacing_px" => {
                    config.page_spacing_px = value
                        .parse::<f32>()
                        .map_err(|_| ConfigError::InvalidValue(key.to_string()))?;
                }
                _ => {} // Ignore unknown keys
            }
        }

        Ok(config)
    }

    /// Saves configuration to a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be written.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        fs::write(path.as_ref(), self.to_toml())?;
        Ok(())
    }

    /// Converts configuration to TOML format.
    fn to_toml(&self) -> String {
        let mut toml = String::from("# InkStrip Viewer Configuration\n");

        if let Some(dir) = &self.library_dir {
            toml.push_str(&format!("library_dir = \"{}\"\n", dir.display()));
        }
        toml.push_str(&format!("extension = \"{}\"\n", self.extension));
        toml.push_str(&format!("pad_width = {}\n", self.pad_width));
        toml.push_str(&format!("miss_limit = {}\n", self.miss_limit));
        toml.push_str(&format!("debounce_ms = {}\n", self.debounce_ms));
        toml.push_str(&format!("completion_delay_ms = {}\n", self.completion_delay_ms));
        toml.push_str(&format!("completion_tolerance_px = {}\n", self.completion_tolerance_px));
        toml.push_str(&format!("page_spacing_px = {}\n", self.page_spacing_px));
        for link in &self.platform_links {
            toml.push_str(&format!("link.{} = \"{}\"\n", link.id, link.url));
        }

        toml
    }

    /// Loads the effective configuration: defaults, overlaid by the
    /// default config file when present, overlaid by the environment.
    /// Parse problems are logged and skipped rather than fatal.
    pub fn load() -> Self {
        let mut config = Self::default();

        let path = Self::default_config_path();
        if path.exists() {
            match Self::from_file(&path) {
                Ok(loaded) => config = loaded,
                Err(e) => log::warn!("ignoring config file {}: {}", path.display(), e),
            }
        }

        if let Err(e) = config.apply_env() {
            log::warn!("ignoring environment override: {}", e);
        }

        config
    }
}

/// Errors that can occur during configuration operations.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Invalid value for a configuration parameter
    #[error("invalid value for configuration key: {0}")]
    InvalidValue(String),
    /// I/O error reading or writing the configuration file
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    const ENV_KEYS: [&str; 5] = [
        "INKSTRIP_LIBRARY_DIR",
        "INKSTRIP_EXTENSION",
        "INKSTRIP_PAD_WIDTH",
        "INKSTRIP_MISS_LIMIT",
        "INKSTRIP_DEBOUNCE_MS",
    ];

    /// Saves and restores environment variables to avoid test pollution.
    struct EnvGuard {
        saved: Vec<(&'static str, Option<String>)>,
    }

    impl EnvGuard {
        fn new(keys: &[&'static str]) -> Self {
            let saved = keys.iter().map(|&k| (k, env::var(k).ok())).collect();
            for key in keys {
                env::remove_var(key);
            }
            Self { saved }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            for (key, value) in &self.saved {
                match value {
                    Some(v) => env::set_var(key, v),
                    None => env::remove_var(key),
                }
            }
        }
    }

    #[test]
    fn default_config_values() {
        let config = ViewerConfig::default();
        assert_eq!(config.extension, "png");
        assert_eq!(config.pad_width, 3);
        assert_eq!(config.miss_limit, 3);
        assert_eq!(config.debounce_ms, 100);
        assert_eq!(config.completion_delay_ms, 1000);
        assert_eq!(config.completion_tolerance_px, 100.0);
        assert_eq!(config.platform_links.len(), 4);
    }

    #[test]
    fn builder_methods() {
        let config = ViewerConfig::default()
            .with_library_dir("/scans/ch01")
            .with_extension(".jpg")
            .with_miss_limit(5);

        assert_eq!(config.library_dir, Some(PathBuf::from("/scans/ch01")));
        assert_eq!(config.extension, "jpg");
        assert_eq!(config.miss_limit, 5);
    }

    #[test]
    fn toml_round_trip() {
        let config = ViewerConfig::default().with_library_dir("/tmp/pages");
        let parsed = ViewerConfig::from_toml(&config.to_toml()).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn from_toml_overrides_and_ignores_unknown_keys() {
        let toml = r#"
            # chapter settings
            library_dir = "/scans/ch07"
            extension = "webp"
            debounce_ms = 250
            some_future_knob = 9
        "#;

        let config = ViewerConfig::from_toml(toml).unwrap();
        assert_eq!(config.library_dir, Some(PathBuf::from("/scans/ch07")));
        assert_eq!(config.extension, "webp");
        assert_eq!(config.debounce_ms, 250);
        assert_eq!(config.miss_limit, 3);
    }

    #[test]
    fn link_lines_replace_default_storefronts() {
        let toml = "link.pixiv = \"https://example.com/a\"\nlink.zine = \"https://example.com/b\"\n";

        let config = ViewerConfig::from_toml(toml).unwrap();
        let ids: Vec<&str> = config.platform_links.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["pixiv", "zine"]);
    }

    #[test]
    fn invalid_numeric_value_is_rejected() {
        let err = ViewerConfig::from_toml("miss_limit = lots\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(key) if key == "miss_limit"));
    }

    #[test]
    fn save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let config = ViewerConfig::default().with_library_dir("/scans/ch02");
        config.save_to_file(&path).unwrap();

        let reloaded = ViewerConfig::from_file(&path).unwrap();
        assert_eq!(reloaded, config);
    }

    #[test]
    #[serial]
    fn env_overrides_apply() {
        let _guard = EnvGuard::new(&ENV_KEYS);

        env::set_var("INKSTRIP_LIBRARY_DIR", "/tmp/pages");
        env::set_var("INKSTRIP_EXTENSION", "jpg");
        env::set_var("INKSTRIP_MISS_LIMIT", "4");

        let config = ViewerConfig::from_env().unwrap();
        assert_eq!(config.library_dir, Some(PathBuf::from("/tmp/pages")));
        assert_eq!(config.extension, "jpg");
        assert_eq!(config.miss_limit, 4);
        // Untouched knobs keep their defaults.
        assert_eq!(config.debounce_ms, 100);
    }

    #[test]
    #[serial]
    fn invalid_env_value_is_an_error() {
        let _guard = EnvGuard::new(&ENV_KEYS);

        env::set_var("INKSTRIP_DEBOUNCE_MS", "soon");
        let err = ViewerConfig::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(key) if key == "INKSTRIP_DEBOUNCE_MS"));
    }
}
