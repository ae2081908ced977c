//! Backend configuration
//!
//! Settings shared by the locators, read from JSON, from the environment,
//! or built in code.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::Result;

/// Configuration for the font backends
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Application key, names the per-user cache and config folders
    #[serde(alias = "app-key")]
    pub app_key: String,
    /// Root of the web font download cache
    #[serde(alias = "fonts-cache-dir")]
    pub fonts_cache_dir: Option<PathBuf>,
    /// `fc-list` output to use instead of scanning font folders
    #[serde(alias = "fontconfig-list")]
    pub fontconfig_list: Option<PathBuf>,
    #[serde(alias = "google-fonts-api-key")]
    pub google_fonts_api_key: Option<String>,
    /// Directory of fonts shipped with the application
    #[serde(alias = "packaged-fonts-dir")]
    pub packaged_fonts_dir: Option<PathBuf>,
}

impl BackendConfig {
    pub fn new(app_key: &str) -> Self {
        Self {
            app_key: app_key.to_string(),
            ..Default::default()
        }
    }

    /// Parse a JSON configuration object
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a JSON configuration file
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Defaults overlaid with the process environment
    pub fn from_env() -> Self {
        Self::default().with_env()
    }

    /// Overlay the process environment onto this configuration
    pub fn with_env(self) -> Self {
        self.overlay(|key| std::env::var(key).ok())
    }

    /// Overlay variables from `lookup`; empty values are ignored
    pub fn overlay(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| lookup(key).filter(|v| !v.is_empty());
        if let Some(key) = var("FONTFIND_APP_KEY") {
            self.app_key = key;
        }
        if let Some(dir) = var("FONTFIND_FONTS_CACHE_DIR") {
            self.fonts_cache_dir = Some(PathBuf::from(dir));
        }
        if let Some(list) = var("FONTFIND_FONTCONFIG_LIST") {
            self.fontconfig_list = Some(PathBuf::from(list));
        }
        if let Some(dir) = var("FONTFIND_PACKAGED_FONTS") {
            self.packaged_fonts_dir = Some(PathBuf::from(dir));
        }
        if let Some(key) = var("GOOGLE_FONTS_API_KEY") {
            self.google_fonts_api_key = Some(key);
        }
        self
    }

    /// Location of the fontconfig list file
    ///
    /// The configured path if any, else
    /// `<user config dir>/<app key>/fontconfig/fontconfig.txt`.
    pub fn fontconfig_list_path(&self) -> Option<PathBuf> {
        if let Some(path) = &self.fontconfig_list {
            return Some(path.clone());
        }
        if self.app_key.is_empty() {
            return None;
        }
        user_config_dir().map(|dir| dir.join(&self.app_key).join("fontconfig").join("fontconfig.txt"))
    }
}

/// Per-user cache directory of the platform
pub fn user_cache_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        env_dir("LOCALAPPDATA")
    }
    #[cfg(target_os = "macos")]
    {
        env_dir("HOME").map(|home| home.join("Library").join("Caches"))
    }
    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        env_dir("XDG_CACHE_HOME").or_else(|| env_dir("HOME").map(|home| home.join(".cache")))
    }
}

/// Per-user configuration directory of the platform
pub fn user_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        env_dir("APPDATA")
    }
    #[cfg(target_os = "macos")]
    {
        env_dir("HOME").map(|home| home.join("Library").join("Application Support"))
    }
    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        env_dir("XDG_CONFIG_HOME").or_else(|| env_dir("HOME").map(|home| home.join(".config")))
    }
}

fn env_dir(key: &str) -> Option<PathBuf> {
    std::env::var_os(key)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_from_json() {
        let config = BackendConfig::from_json(
            r#"{"app_key": "tyse", "fonts_cache_dir": "/tmp/fonts", "google_fonts_api_key": "k"}"#,
        )
        .unwrap();
        assert_eq!(config.app_key, "tyse");
        assert_eq!(config.fonts_cache_dir, Some(PathBuf::from("/tmp/fonts")));
        assert_eq!(config.google_fonts_api_key.as_deref(), Some("k"));
        assert!(config.packaged_fonts_dir.is_none());
    }

    #[test]
    fn test_from_json_kebab_keys() {
        let config = BackendConfig::from_json(r#"{"app-key": "tyse", "fonts-cache-dir": "/c"}"#).unwrap();
        assert_eq!(config.app_key, "tyse");
        assert_eq!(config.fonts_cache_dir, Some(PathBuf::from("/c")));
    }

    #[test]
    fn test_from_json_invalid() {
        assert!(BackendConfig::from_json("{app_key").is_err());
    }

    #[test]
    fn test_overlay() {
        let env: HashMap<&str, &str> = [
            ("FONTFIND_APP_KEY", "env-app"),
            ("FONTFIND_PACKAGED_FONTS", "/opt/fonts"),
            ("GOOGLE_FONTS_API_KEY", ""),
        ]
        .into_iter()
        .collect();
        let config = BackendConfig::new("code-app")
            .overlay(|key| env.get(key).map(|v| v.to_string()));
        assert_eq!(config.app_key, "env-app");
        assert_eq!(config.packaged_fonts_dir, Some(PathBuf::from("/opt/fonts")));
        assert!(config.google_fonts_api_key.is_none());
    }

    #[test]
    fn test_fontconfig_list_path() {
        let mut config = BackendConfig::default();
        assert!(config.fontconfig_list_path().is_none());

        config.fontconfig_list = Some(PathBuf::from("/etc/fc.txt"));
        assert_eq!(config.fontconfig_list_path(), Some(PathBuf::from("/etc/fc.txt")));
    }
}
