//! Cross-platform application paths using the `dirs` crate.
//!
//! Layout:
//!
//! Config dir (settings + catalog):
//!   Windows: %APPDATA%\voice-list\
//!   macOS:   ~/Library/Application Support/voice-list/
//!   Linux:   ~/.config/voice-list/
//!
//! Data dir (saved shopping lists):
//!   Windows: %LOCALAPPDATA%\voice-list\
//!   macOS:   ~/Library/Application Support/voice-list/
//!   Linux:   ~/.local/share/voice-list/

use std::path::PathBuf;

/// Holds all resolved application directory/file paths.
#[derive(Debug, Clone)]
pub struct AppPaths {
    /// Directory for `settings.toml` and `catalog.json`.
    pub config_dir: PathBuf,
    /// Full path to `settings.toml`.
    pub settings_file: PathBuf,
    /// Full path to the user-editable grocery catalog, `catalog.json`.
    pub catalog_file: PathBuf,
    /// Directory for exported list files.
    pub lists_dir: PathBuf,
}

impl AppPaths {
    const APP_NAME: &'static str = "voice-list";

    /// Resolves all paths using the `dirs` crate.
    ///
    /// Falls back to the current directory if the platform cannot provide a
    /// standard path (should be extremely rare in practice).
    pub fn new() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME);

        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME);

        let settings_file = config_dir.join("settings.toml");
        let catalog_file = config_dir.join("catalog.json");
        let lists_dir = data_dir.join("lists");

        Self {
            config_dir,
            settings_file,
            catalog_file,
            lists_dir,
        }
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_are_non_empty() {
        let paths = AppPaths::new();
        assert!(paths.config_dir.to_str().is_some_and(|s| !s.is_empty()));
        assert!(paths.lists_dir.to_str().is_some_and(|s| !s.is_empty()));
        assert!(paths
            .settings_file
            .file_name()
            .is_some_and(|n| n == "settings.toml"));
        assert!(paths
            .catalog_file
            .file_name()
            .is_some_and(|n| n == "catalog.json"));
    }
}
