use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_url: String,
    /// Base of the share link; its fragment carries the selection.
    pub share_url: String,
    pub default_group: String,
    pub extramural: bool,
    pub allow_multiple: bool,
    pub probe_interval_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: "https://api.ystuty.ru".into(),
            share_url: "https://ystuty.ru/".into(),
            default_group: "ЭИС-46".into(),
            extramural: false,
            allow_multiple: false,
            probe_interval_secs: 30,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let mut config = match Self::config_path() {
            Some(path) if path.exists() => {
                let contents = std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read config at {}", path.display()))?;
                Self::parse(&contents)?
            }
            _ => Config::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).with_context(|| "Failed to parse config.toml")
    }

    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(url) = var("SCHEDULE_API_URL").filter(|v| !v.trim().is_empty()) {
            self.api_url = url;
        }
        if let Some(group) = var("SCHEDULE_DEFAULT_GROUP").filter(|v| !v.trim().is_empty()) {
            self.default_group = group;
        }
    }

    pub fn generate_default() -> Result<PathBuf> {
        let path = Self::config_path()
            .with_context(|| "Could not determine config directory")?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let toml_str = toml::to_string_pretty(&Config::default())?;
        std::fs::write(&path, toml_str)?;
        Ok(path)
    }

    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("schedule-tui").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config = Config::parse("default_group = \"ИВТ-21\"\nextramural = true\n").unwrap();
        assert_eq!(config.default_group, "ИВТ-21");
        assert!(config.extramural);
        assert_eq!(config.api_url, "https://api.ystuty.ru");
        assert_eq!(config.probe_interval_secs, 30);
    }

    #[test]
    fn env_overrides_file_values() {
        let mut config = Config::default();
        config.apply_env(|key| match key {
            "SCHEDULE_API_URL" => Some("http://localhost:8080".into()),
            "SCHEDULE_DEFAULT_GROUP" => Some("  ".into()),
            _ => None,
        });
        assert_eq!(config.api_url, "http://localhost:8080");
        assert_eq!(config.default_group, "ЭИС-46");
    }

    #[test]
    fn default_survives_toml() {
        let text = toml::to_string_pretty(&Config::default()).unwrap();
        assert_eq!(Config::parse(&text).unwrap(), Config::default());
    }
}
