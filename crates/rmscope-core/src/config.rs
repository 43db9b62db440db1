use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Root configuration, loaded from `~/.config/rmscope/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub profile: ProfileConfig,
    pub fetch: FetchConfig,
    pub extract: ExtractConfig,
}

/// Whose records are fetched, and from where.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileConfig {
    pub permalink: String,
    pub lang: String,
    pub api_base_url: String,
    /// Links into this domain (or any subdomain) are never offered as external links.
    pub platform_domain: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub page_size: usize,
    pub page_delay_ms: u64,
    pub category_delay_ms: u64,
    pub max_retries: u32,
    pub backoff_initial_ms: u64,
    pub backoff_cap_ms: u64,
    pub retry_after_cap_secs: u64,
    pub user_agent: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    /// Tried in order after the profile language.
    pub fallback_languages: Vec<String>,
    /// The only language key the strict resolver consults besides the profile language.
    pub strict_language: String,
    /// Inclusive code point ranges rejected by the strict resolver.
    pub disallowed_ranges: Vec<(u32, u32)>,
    pub no_title: String,
    pub default_degree_line: String,
}

// ─── Defaults ──────────────────────────────────────────────

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            permalink: "tokuo".to_string(),
            lang: "en".to_string(),
            api_base_url: "https://api.researchmap.jp".to_string(),
            platform_domain: "researchmap.jp".to_string(),
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            page_size: 200,
            page_delay_ms: 250,
            category_delay_ms: 800,
            max_retries: 5,
            backoff_initial_ms: 500,
            backoff_cap_ms: 12_000,
            retry_after_cap_secs: 60,
            user_agent: format!("rmscope/{}", env!("CARGO_PKG_VERSION")),
            timeout_secs: 30,
        }
    }
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            fallback_languages: vec!["en".to_string(), "ja".to_string()],
            strict_language: "en".to_string(),
            // Hiragana + Katakana, CJK Extension A, CJK Unified Ideographs
            disallowed_ranges: vec![(0x3040, 0x30FF), (0x3400, 0x4DBF), (0x4E00, 0x9FFF)],
            no_title: "(no title)".to_string(),
            default_degree_line: "Doctor (Human and Environmental Studies, Kyoto University)"
                .to_string(),
        }
    }
}

impl FetchConfig {
    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }

    pub fn category_delay(&self) -> Duration {
        Duration::from_millis(self.category_delay_ms)
    }

    pub fn backoff_initial(&self) -> Duration {
        Duration::from_millis(self.backoff_initial_ms)
    }

    pub fn backoff_cap(&self) -> Duration {
        Duration::from_millis(self.backoff_cap_ms)
    }

    pub fn retry_after_cap(&self) -> Duration {
        Duration::from_secs(self.retry_after_cap_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Same settings with every wait zeroed. Used by tests and `--no-delay`.
    pub fn without_delays(mut self) -> Self {
        self.page_delay_ms = 0;
        self.category_delay_ms = 0;
        self.backoff_initial_ms = 0;
        self.backoff_cap_ms = 0;
        self.retry_after_cap_secs = 0;
        self
    }
}

// ─── Load / Save ───────────────────────────────────────────

impl AppConfig {
    /// Standard config file path: `~/.config/rmscope/config.toml`
    pub fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var("RMSCOPE_CONFIG") {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("rmscope")
            .join("config.toml")
    }

    /// Load config from disk, falling back to defaults if the file doesn't exist.
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let toml_str = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_str)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.profile.permalink.trim().is_empty() {
            return Err(CoreError::ConfigError("profile.permalink is empty".to_string()));
        }
        if self.fetch.page_size == 0 {
            return Err(CoreError::ConfigError("fetch.page_size must be at least 1".to_string()));
        }
        if let Some((lo, hi)) = self.extract.disallowed_ranges.iter().find(|(lo, hi)| lo > hi) {
            return Err(CoreError::ConfigError(format!(
                "extract.disallowed_ranges: {lo:#x} > {hi:#x}"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_is_valid() {
        let cfg = AppConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.fetch.page_size, 200);
        assert_eq!(cfg.fetch.max_retries, 5);
        assert_eq!(cfg.extract.fallback_languages, vec!["en", "ja"]);
    }

    #[test]
    fn test_config_toml_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        let mut cfg = AppConfig::default();
        cfg.profile.permalink = "someone".to_string();
        cfg.save_to(&path).unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded.profile.permalink, "someone");
        assert_eq!(loaded.extract.disallowed_ranges, cfg.extract.disallowed_ranges);
        assert_eq!(loaded.fetch.backoff_cap_ms, 12_000);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[profile]\nlang = \"ja\"\n").unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded.profile.lang, "ja");
        assert_eq!(loaded.profile.permalink, "tokuo");
        assert_eq!(loaded.fetch.page_delay_ms, 250);
    }

    #[test]
    fn test_load_nonexistent_returns_default() {
        let cfg = AppConfig::load_from(Path::new("/tmp/nonexistent_rmscope_config.toml")).unwrap();
        assert_eq!(cfg.profile.api_base_url, "https://api.researchmap.jp");
    }

    #[test]
    fn test_zero_page_size_rejected() {
        let mut cfg = AppConfig::default();
        cfg.fetch.page_size = 0;
        assert!(matches!(cfg.validate(), Err(CoreError::ConfigError(_))));
    }

    #[test]
    fn test_without_delays_zeroes_waits() {
        let fetch = FetchConfig::default().without_delays();
        assert_eq!(fetch.page_delay(), Duration::ZERO);
        assert_eq!(fetch.backoff_cap(), Duration::ZERO);
        assert_eq!(fetch.max_retries, 5);
    }
}
