use anyhow::{Context, Result};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use studyplan_core::time::parse_timezone;
use studyplan_core::{PlannerConfig, StudyError};

use crate::llm::Provider;

/// On-disk configuration (`~/.studyplan/config.toml`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Overrides RUST_LOG; `--log-level` overrides this.
    pub log_level: Option<String>,
    pub llm: LlmSection,
    pub planner: PlannerSection,
    pub webhook: WebhookSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSection {
    /// "openai" or "anthropic"
    pub provider: String,
    pub model: String,
    /// Defaults to the provider's public endpoint.
    pub base_url: Option<String>,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub weekly_max_tokens: u32,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerSection {
    /// IANA zone name; system local time when unset.
    pub timezone: Option<String>,
    pub weekly_goal_hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebhookSection {
    /// Schedules are posted here when set.
    pub url: Option<String>,
    pub timeout_secs: u64,
}

impl Default for LlmSection {
    fn default() -> Self {
        let planner = PlannerConfig::default();
        Self {
            provider: "openai".to_string(),
            model: planner.model,
            base_url: None,
            api_key_env: "OPENAI_API_KEY".to_string(),
            temperature: planner.temperature,
            max_tokens: planner.max_tokens,
            weekly_max_tokens: planner.weekly_max_tokens,
            timeout_secs: 30,
        }
    }
}

impl Default for PlannerSection {
    fn default() -> Self {
        Self {
            timezone: None,
            weekly_goal_hours: 20.0,
        }
    }
}

impl Default for WebhookSection {
    fn default() -> Self {
        Self {
            url: None,
            timeout_secs: 10,
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    toml::from_str(&s).with_context(|| format!("parse {}", path.display()))
}

pub fn save_config(path: &Path, cfg: &Config) -> Result<()> {
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(path, s).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

/// Write the default config unless one already exists. Returns whether a
/// file was written.
pub fn init_config(path: &Path) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    save_config(path, &Config::default())?;
    Ok(true)
}

/// Everything the process needs, resolved once at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    pub provider: Provider,
    pub base_url: String,
    pub api_key: String,
    pub request_timeout: Duration,
    pub planner: PlannerConfig,
    pub weekly_goal_hours: f64,
    pub webhook_url: Option<String>,
    pub webhook_timeout: Duration,
}

impl Settings {
    /// Resolve from the process environment.
    pub fn resolve(cfg: &Config) -> Result<Self, StudyError> {
        Self::resolve_with(cfg, |name| std::env::var(name).ok())
    }

    pub fn resolve_with(cfg: &Config, env: impl Fn(&str) -> Option<String>) -> Result<Self, StudyError> {
        let provider = Provider::parse(&cfg.llm.provider)?;

        let api_key = env(&cfg.llm.api_key_env)
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                StudyError::configuration(format!("environment variable {} is not set", cfg.llm.api_key_env))
            })?;

        if !(0.0..=2.0).contains(&cfg.llm.temperature) {
            return Err(StudyError::configuration(format!(
                "temperature must be between 0 and 2, got {}",
                cfg.llm.temperature
            )));
        }
        if cfg.llm.max_tokens == 0 || cfg.llm.weekly_max_tokens == 0 {
            return Err(StudyError::configuration("max_tokens must be positive"));
        }

        let timezone: Option<Tz> = cfg.planner.timezone.as_deref().map(parse_timezone).transpose()?;

        let base_url = cfg
            .llm
            .base_url
            .clone()
            .unwrap_or_else(|| provider.default_base_url().to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            provider,
            base_url,
            api_key,
            request_timeout: Duration::from_secs(cfg.llm.timeout_secs.max(1)),
            planner: PlannerConfig {
                model: cfg.llm.model.clone(),
                temperature: cfg.llm.temperature,
                max_tokens: cfg.llm.max_tokens,
                weekly_max_tokens: cfg.llm.weekly_max_tokens,
                timezone,
            },
            weekly_goal_hours: cfg.planner.weekly_goal_hours.max(0.0),
            webhook_url: cfg.webhook.url.clone().filter(|u| !u.trim().is_empty()),
            webhook_timeout: Duration::from_secs(cfg.webhook.timeout_secs.max(1)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn env_with_key(name: &str) -> Option<String> {
        (name == "OPENAI_API_KEY").then(|| "sk-test".to_string())
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let cfg = load_config(&dir.path().join("config.toml")).unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.llm.model, "gpt-3.5-turbo");
        assert_eq!(cfg.llm.max_tokens, 500);
        assert_eq!(cfg.planner.weekly_goal_hours, 20.0);
    }

    #[test]
    fn test_init_then_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        assert!(init_config(&path).unwrap());
        assert!(!init_config(&path).unwrap());
        assert_eq!(load_config(&path).unwrap(), Config::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
log_level = "debug"

[llm]
provider = "anthropic"
model = "claude-3-5-haiku-latest"
api_key_env = "ANTHROPIC_API_KEY"

[planner]
timezone = "Europe/Paris"
"#,
        )
        .unwrap();

        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.log_level.as_deref(), Some("debug"));
        assert_eq!(cfg.llm.provider, "anthropic");
        assert_eq!(cfg.llm.temperature, 0.7);
        assert_eq!(cfg.webhook.timeout_secs, 10);

        let settings =
            Settings::resolve_with(&cfg, |n| (n == "ANTHROPIC_API_KEY").then(|| "key".to_string())).unwrap();
        assert_eq!(settings.provider, Provider::Anthropic);
        assert_eq!(settings.base_url, "https://api.anthropic.com");
        assert_eq!(settings.planner.timezone, Some(chrono_tz::Europe::Paris));
    }

    #[test]
    fn test_invalid_toml_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[llm\nmodel = 3").unwrap();
        assert!(load_config(&path).is_err());
    }

    #[test]
    fn test_missing_api_key_is_configuration_error() {
        let err = Settings::resolve_with(&Config::default(), |_| None).unwrap_err();
        assert!(matches!(err, StudyError::Configuration(_)));
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn test_resolve_rejects_bad_values() {
        let mut cfg = Config::default();
        cfg.llm.provider = "palm".to_string();
        assert!(Settings::resolve_with(&cfg, env_with_key).is_err());

        let mut cfg = Config::default();
        cfg.planner.timezone = Some("Mars/Olympus".to_string());
        assert!(Settings::resolve_with(&cfg, env_with_key).is_err());

        let mut cfg = Config::default();
        cfg.llm.temperature = 3.5;
        assert!(Settings::resolve_with(&cfg, env_with_key).is_err());
    }

    #[test]
    fn test_resolve_defaults() {
        let mut cfg = Config::default();
        cfg.llm.base_url = Some("http://localhost:8080/".to_string());
        cfg.webhook.url = Some("  ".to_string());

        let s = Settings::resolve_with(&cfg, env_with_key).unwrap();
        assert_eq!(s.api_key, "sk-test");
        assert_eq!(s.base_url, "http://localhost:8080");
        assert_eq!(s.request_timeout, Duration::from_secs(30));
        assert_eq!(s.webhook_url, None);
        assert_eq!(s.planner.max_tokens, 500);
        assert_eq!(s.planner.weekly_max_tokens, 1500);
    }
}
