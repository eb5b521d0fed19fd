//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across threads.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::AppPaths;

// ---------------------------------------------------------------------------
// RecognitionConfig
// ---------------------------------------------------------------------------

/// Settings for the speech recognition session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecognitionConfig {
    /// Restart recognition automatically when the engine ends spontaneously.
    pub continuous: bool,
    /// Surface interim (not-yet-final) transcript fragments.
    pub interim_results: bool,
    /// BCP-47 language tag passed to the engine (e.g. `"en-US"`).
    pub language: String,
    /// Milliseconds of silence after which the session force-stops.
    /// `0` disables the inactivity timeout.
    pub inactivity_timeout_ms: u64,
    /// Hard ceiling on session length in milliseconds, regardless of
    /// activity.  `0` disables the ceiling.
    pub max_session_ms: u64,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            continuous: true,
            interim_results: true,
            language: "en-US".into(),
            inactivity_timeout_ms: 8_000,
            max_session_ms: 60_000,
        }
    }
}

// ---------------------------------------------------------------------------
// AccumulatorConfig
// ---------------------------------------------------------------------------

/// Settings for transcript debouncing and spoken stop commands.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccumulatorConfig {
    /// Quiet period in milliseconds before buffered fragments are released
    /// as one utterance.
    pub debounce_ms: u64,
    /// Phrases that end the session when heard (matched case-insensitively
    /// at word boundaries).
    pub stop_phrases: Vec<String>,
}

impl Default for AccumulatorConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 500,
            stop_phrases: vec![
                "that's it".into(),
                "that is it".into(),
                "done".into(),
                "finished".into(),
                "stop".into(),
                "i'm done".into(),
            ],
        }
    }
}

// ---------------------------------------------------------------------------
// CatalogConfig
// ---------------------------------------------------------------------------

/// Settings for grocery catalog lookup and name normalization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Whether catalog normalization runs at all.
    pub enabled: bool,
    /// Reject parsed items with no catalog match instead of passing them
    /// through verbatim.
    pub require_catalog_match: bool,
    /// Explicit catalog file path — `None` means the platform default
    /// location, falling back to the built-in catalog.
    pub catalog_path: Option<std::path::PathBuf>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            require_catalog_match: false,
            catalog_path: None,
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// # Persistence
///
/// ```rust,no_run
/// use voice_list::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load().unwrap();
///
/// // Modify and save
/// // config.save().unwrap();
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Speech recognition session settings.
    pub recognition: RecognitionConfig,
    /// Transcript debounce and stop-phrase settings.
    pub accumulator: AccumulatorConfig,
    /// Catalog lookup settings.
    pub catalog: CatalogConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet
    /// (first-run scenario) so callers never need to special-case a missing
    /// file.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path (useful for tests).
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path (useful for tests).
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Returns `true` when no `settings.toml` file exists yet.
    pub fn is_first_run() -> bool {
        !AppPaths::new().settings_file.exists()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
