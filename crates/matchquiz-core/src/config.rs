//! Game configuration.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::Duration;

use anyhow::{Context, Result};
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::session::SessionConfig;

/// Where finished results are posted.
///
/// Custom Debug impl masks the URL, which usually embeds a secret hook id.
#[derive(Clone, Serialize, Deserialize)]
pub struct WebhookConfig {
    pub url: String,
    #[serde(default = "default_game_name")]
    pub game_name: String,
    #[serde(default = "default_element_id")]
    pub element_id: String,
    #[serde(default)]
    pub location: String,
    /// Request timeout in seconds.
    #[serde(default = "default_webhook_timeout")]
    pub timeout_secs: u64,
}

impl std::fmt::Debug for WebhookConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookConfig")
            .field("url", &"***")
            .field("game_name", &self.game_name)
            .field("element_id", &self.element_id)
            .field("location", &self.location)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

fn default_game_name() -> String {
    "Ads Memory".to_string()
}
fn default_element_id() -> String {
    "03".to_string()
}
fn default_webhook_timeout() -> u64 {
    10
}

/// Top-level matchquiz configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizConfig {
    /// Countdown for the matching screen.
    #[serde(default = "default_matching_limit")]
    pub matching_time_limit_secs: u32,
    /// Countdown for the memorizing screen.
    #[serde(default = "default_memorizing_time")]
    pub memorizing_time_secs: u32,
    /// How long a wrong-drop marker stays visible.
    #[serde(default = "default_wrong_feedback")]
    pub wrong_feedback_ms: u64,
    /// Delay between the final match and submission.
    #[serde(default = "default_completion_grace")]
    pub completion_grace_ms: u64,
    /// Countdown before the results screen returns to registration.
    #[serde(default = "default_results_restart")]
    pub results_restart_secs: u32,
    /// Optional external content bank; the built-in bank is used otherwise.
    #[serde(default)]
    pub content_path: Option<PathBuf>,
    #[serde(default)]
    pub webhook: Option<WebhookConfig>,
}

fn default_matching_limit() -> u32 {
    120
}
fn default_memorizing_time() -> u32 {
    90
}
fn default_wrong_feedback() -> u64 {
    1000
}
fn default_completion_grace() -> u64 {
    1000
}
fn default_results_restart() -> u32 {
    5
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            matching_time_limit_secs: default_matching_limit(),
            memorizing_time_secs: default_memorizing_time(),
            wrong_feedback_ms: default_wrong_feedback(),
            completion_grace_ms: default_completion_grace(),
            results_restart_secs: default_results_restart(),
            content_path: None,
            webhook: None,
        }
    }
}

impl QuizConfig {
    /// Engine timings derived from this config.
    pub fn session(&self) -> SessionConfig {
        SessionConfig {
            time_limit_secs: self.matching_time_limit_secs,
            wrong_feedback: Duration::from_millis(self.wrong_feedback_ms),
            completion_grace: Duration::from_millis(self.completion_grace_ms),
        }
    }
}

static ENV_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("valid env reference regex"));

/// Resolve environment variable references like `${VAR_NAME}` in a string.
///
/// Unset variables resolve to empty. Substituted values are not expanded again.
fn resolve_env_vars(s: &str) -> String {
    ENV_REF
        .replace_all(s, |caps: &Captures| std::env::var(&caps[1]).unwrap_or_default())
        .into_owned()
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `matchquiz.toml` in the current directory
/// 2. `~/.config/matchquiz/config.toml`
///
/// `MATCHQUIZ_WEBHOOK_URL` overrides the webhook URL.
pub fn load_config() -> Result<QuizConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<QuizConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("matchquiz.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<QuizConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => QuizConfig::default(),
    };

    if let Ok(url) = std::env::var("MATCHQUIZ_WEBHOOK_URL") {
        match config.webhook.as_mut() {
            Some(webhook) => webhook.url = url,
            None => {
                config.webhook = Some(WebhookConfig {
                    url,
                    game_name: default_game_name(),
                    element_id: default_element_id(),
                    location: String::new(),
                    timeout_secs: default_webhook_timeout(),
                })
            }
        }
    }

    if let Some(webhook) = config.webhook.as_mut() {
        webhook.url = resolve_env_vars(&webhook.url);
        webhook.location = resolve_env_vars(&webhook.location);
    }

    anyhow::ensure!(
        config.matching_time_limit_secs > 0,
        "matching_time_limit_secs must be at least 1"
    );

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("matchquiz"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_env_vars_basic() {
        std::env::set_var("_MATCHQUIZ_TEST_VAR", "hello");
        assert_eq!(resolve_env_vars("${_MATCHQUIZ_TEST_VAR}"), "hello");
        assert_eq!(
            resolve_env_vars("prefix_${_MATCHQUIZ_TEST_VAR}_suffix"),
            "prefix_hello_suffix"
        );
        assert_eq!(resolve_env_vars("no vars"), "no vars");
        std::env::remove_var("_MATCHQUIZ_TEST_VAR");
    }

    #[test]
    fn resolve_env_vars_does_not_expand_values() {
        std::env::set_var("_MATCHQUIZ_SELF_REF", "${_MATCHQUIZ_SELF_REF}");
        assert_eq!(
            resolve_env_vars("https://x/${_MATCHQUIZ_SELF_REF}"),
            "https://x/${_MATCHQUIZ_SELF_REF}"
        );
        std::env::remove_var("_MATCHQUIZ_SELF_REF");

        assert_eq!(resolve_env_vars("${_MATCHQUIZ_UNSET_VAR}/hook"), "/hook");
        assert_eq!(resolve_env_vars("unterminated ${oops"), "unterminated ${oops");
    }

    #[test]
    fn default_config() {
        let config = QuizConfig::default();
        assert_eq!(config.matching_time_limit_secs, 120);
        assert_eq!(config.memorizing_time_secs, 90);
        assert!(config.webhook.is_none());

        let session = config.session();
        assert_eq!(session.time_limit_secs, 120);
        assert_eq!(session.wrong_feedback, Duration::from_secs(1));
        assert_eq!(session.completion_grace, Duration::from_secs(1));
    }

    #[test]
    fn parse_partial_config() {
        let toml_str = r#"
matching_time_limit_secs = 60

[webhook]
url = "https://hooks.example.com/abc"
location = "surat"
"#;
        let config: QuizConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.matching_time_limit_secs, 60);
        assert_eq!(config.results_restart_secs, 5);
        let webhook = config.webhook.unwrap();
        assert_eq!(webhook.game_name, "Ads Memory");
        assert_eq!(webhook.location, "surat");
        assert!(!format!("{webhook:?}").contains("hooks.example.com"));
    }

    #[test]
    fn load_from_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("matchquiz.toml");
        std::fs::write(&path, "memorizing_time_secs = 30\n").unwrap();
        let config = load_config_from(Some(&path)).unwrap();
        assert_eq!(config.memorizing_time_secs, 30);

        assert!(load_config_from(Some(&dir.path().join("missing.toml"))).is_err());
    }

    #[test]
    fn rejects_zero_time_limit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("matchquiz.toml");
        std::fs::write(&path, "matching_time_limit_secs = 0\n").unwrap();
        assert!(load_config_from(Some(&path)).is_err());
    }
}
