//! Editor configuration persistence
//!
//! Stores user preferences in `~/.config/anuencia/config.yaml`

use serde::{Deserialize, Serialize};

use crate::template::DEFAULT_CITY;

/// Editor configuration that persists across sessions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Selected theme id (e.g., "claro", "escuro")
    #[serde(default = "default_theme")]
    pub theme: String,
    /// City used in freshly inserted declaration headers
    #[serde(default = "default_city")]
    pub default_city: String,
    /// Editor font size in points
    #[serde(default = "default_font_size")]
    pub font_size: f32,
}

fn default_theme() -> String {
    "claro".to_string()
}

fn default_city() -> String {
    DEFAULT_CITY.to_string()
}

fn default_font_size() -> f32 {
    14.0
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            default_city: default_city(),
            font_size: default_font_size(),
        }
    }
}

impl EditorConfig {
    /// Load config from disk, or return defaults if not found
    pub fn load() -> Self {
        let Some(path) = crate::config_paths::config_file() else {
            tracing::debug!("No config directory available, using defaults");
            return Self::default();
        };

        if !path.exists() {
            tracing::debug!(
                "Config file not found at {}, using defaults",
                path.display()
            );
            return Self::default();
        }

        match std::fs::read_to_string(&path) {
            Ok(content) => match serde_yaml::from_str(&content) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse config at {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read config at {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Save config to disk
    ///
    /// Creates the config directory if it doesn't exist.
    pub fn save(&self) -> Result<(), String> {
        let path = crate::config_paths::config_file()
            .ok_or_else(|| "No config directory available".to_string())?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create config directory: {}", e))?;
        }

        let content = serde_yaml::to_string(self)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;

        std::fs::write(&path, content)
            .map_err(|e| format!("Failed to write config to {}: {}", path.display(), e))?;

        tracing::info!("Saved config to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_expected_values() {
        let config = EditorConfig::default();
        assert_eq!(config.theme, "claro");
        assert_eq!(config.default_city, "Toledo");
        assert_eq!(config.font_size, 14.0);
    }

    #[test]
    fn partial_yaml_fills_in_defaults() {
        let config: EditorConfig = serde_yaml::from_str("theme: escuro\n").unwrap();
        assert_eq!(config.theme, "escuro");
        assert_eq!(config.default_city, "Toledo");
        assert_eq!(config.font_size, 14.0);
    }

    #[test]
    fn round_trips_through_yaml() {
        let mut config = EditorConfig::default();
        config.default_city = "Cascavel".to_string();
        config.font_size = 16.0;

        let yaml = serde_yaml::to_string(&config).unwrap();
        let parsed: EditorConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.default_city, "Cascavel");
        assert_eq!(parsed.font_size, 16.0);
    }
}
