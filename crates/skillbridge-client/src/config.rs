//! Client configuration and backend factory.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use skillbridge_core::catalog::load_catalog;
use skillbridge_core::traits::LearningBackend;

use crate::auth::StaticToken;
use crate::http::{HttpBackend, HttpOptions, DEFAULT_API_URL, DEFAULT_TIMEOUT_SECS};
use crate::mock::MockBackend;

/// Top-level SkillBridge client configuration.
///
/// Note: Custom Debug impl masks the token to prevent accidental exposure in logs.
#[derive(Clone, Serialize, Deserialize)]
pub struct SkillbridgeConfig {
    /// REST API base URL.
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Host for full lesson documents and assessments (defaults to `api_url`).
    #[serde(default)]
    pub content_url: Option<String>,
    /// Base URL for callable functions.
    #[serde(default)]
    pub functions_url: Option<String>,
    /// ID token sent as the bearer credential.
    #[serde(default)]
    pub token: Option<String>,
    /// Author name attached to posts and replies.
    #[serde(default)]
    pub display_name: Option<String>,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Chat refresh interval in seconds.
    #[serde(default = "default_chat_poll")]
    pub chat_poll_secs: u64,
    /// JSON file holding the offline learner profile between catalog runs.
    /// Without it, offline progress lasts one process.
    #[serde(default)]
    pub offline_profile: Option<PathBuf>,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}
fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}
fn default_chat_poll() -> u64 {
    5
}

impl Default for SkillbridgeConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            content_url: None,
            functions_url: None,
            token: None,
            display_name: None,
            timeout_secs: default_timeout(),
            chat_poll_secs: default_chat_poll(),
            offline_profile: None,
        }
    }
}

impl std::fmt::Debug for SkillbridgeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SkillbridgeConfig")
            .field("api_url", &self.api_url)
            .field("content_url", &self.content_url)
            .field("functions_url", &self.functions_url)
            .field("token", &self.token.as_ref().map(|_| "***"))
            .field("display_name", &self.display_name)
            .field("timeout_secs", &self.timeout_secs)
            .field("chat_poll_secs", &self.chat_poll_secs)
            .field("offline_profile", &self.offline_profile)
            .finish()
    }
}

impl SkillbridgeConfig {
    pub fn http_options(&self) -> HttpOptions {
        HttpOptions {
            api_url: self.api_url.clone(),
            content_url: self.content_url.clone(),
            functions_url: self.functions_url.clone(),
            timeout_secs: self.timeout_secs,
        }
    }

    fn resolve(mut self) -> Self {
        self.api_url = resolve_env_vars(&self.api_url);
        self.content_url = self.content_url.as_deref().map(resolve_env_vars);
        self.functions_url = self.functions_url.as_deref().map(resolve_env_vars);
        self.token = self
            .token
            .as_deref()
            .map(resolve_env_vars)
            .filter(|t| !t.trim().is_empty());
        self.display_name = self.display_name.as_deref().map(resolve_env_vars);
        self
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
/// Unset variables resolve to the empty string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(len) = rest[start..].find('}') else {
            break;
        };
        result.push_str(&rest[..start]);
        let var_name = &rest[start + 2..start + len];
        result.push_str(&std::env::var(var_name).unwrap_or_default());
        rest = &rest[start + len + 1..];
    }
    result.push_str(rest);
    result
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `skillbridge.toml` in the current directory
/// 2. `~/.config/skillbridge/config.toml`
///
/// Environment variable overrides: `SKILLBRIDGE_TOKEN`, `SKILLBRIDGE_API_URL`.
pub fn load_config() -> Result<SkillbridgeConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<SkillbridgeConfig> {
    let config_path = match path {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => anyhow::bail!("config file not found: {}", p.display()),
        None => {
            let local = PathBuf::from("skillbridge.toml");
            if local.exists() {
                Some(local)
            } else {
                dirs_path()
                    .map(|dir| dir.join("config.toml"))
                    .filter(|global| global.exists())
            }
        }
    };

    let config = match config_path {
        Some(path) => {
            tracing::debug!("loading config from {}", path.display());
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<SkillbridgeConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => SkillbridgeConfig::default(),
    };

    Ok(apply_env_overrides(config).resolve())
}

fn apply_env_overrides(mut config: SkillbridgeConfig) -> SkillbridgeConfig {
    if let Ok(token) = std::env::var("SKILLBRIDGE_TOKEN") {
        config.token = Some(token);
    }
    if let Ok(url) = std::env::var("SKILLBRIDGE_API_URL") {
        config.api_url = url;
    }
    config
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("skillbridge"))
}

/// Starter config written by `skillbridge init`.
pub const CONFIG_TEMPLATE: &str = r#"# SkillBridge client configuration

api_url = "https://skillbridge-backend-2-gq5c.onrender.com"
# content_url = "https://skillsphere-backend-uur2.onrender.com"
# functions_url = "https://us-central1-skillbridge.cloudfunctions.net"

# ID token for the signed-in learner. Prefer SKILLBRIDGE_TOKEN.
token = "${SKILLBRIDGE_TOKEN}"
# display_name = "Your Name"

timeout_secs = 30
chat_poll_secs = 5
"#;

/// Create a backend: in-memory from a catalog when one is given, else HTTP.
pub fn create_backend(
    config: &SkillbridgeConfig,
    catalog: Option<&Path>,
) -> Result<Arc<dyn LearningBackend>> {
    if let Some(path) = catalog {
        let catalog = load_catalog(path)?;
        tracing::info!(
            "offline mode: {} topics, {} lessons from {}",
            catalog.topics.len(),
            catalog.lessons.len(),
            path.display()
        );
        let mut backend = MockBackend::from_catalog(catalog);
        if let Some(profile) = &config.offline_profile {
            backend = backend.with_profile_file(profile)?;
        }
        if let Some(name) = &config.display_name {
            backend = backend.with_display_name(name);
        }
        return Ok(Arc::new(backend));
    }

    let tokens = Arc::new(StaticToken::from(config.token.clone()));
    Ok(Arc::new(HttpBackend::new(config.http_options(), tokens)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_env_vars_basic() {
        std::env::set_var("_SKILLBRIDGE_TEST_VAR", "hello");
        assert_eq!(resolve_env_vars("${_SKILLBRIDGE_TEST_VAR}"), "hello");
        assert_eq!(
            resolve_env_vars("prefix_${_SKILLBRIDGE_TEST_VAR}_suffix"),
            "prefix_hello_suffix"
        );
        assert_eq!(resolve_env_vars("${_SKILLBRIDGE_UNSET_VAR}"), "");
        assert_eq!(resolve_env_vars("broken ${OPEN"), "broken ${OPEN");
        std::env::remove_var("_SKILLBRIDGE_TEST_VAR");
    }

    #[test]
    fn default_config() {
        let config = SkillbridgeConfig::default();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.chat_poll_secs, 5);
        assert!(config.token.is_none());
    }

    #[test]
    fn parse_partial_config() {
        let config: SkillbridgeConfig = toml::from_str(
            r#"
api_url = "http://localhost:8080"
token = "abc"
chat_poll_secs = 2
"#,
        )
        .unwrap();
        assert_eq!(config.api_url, "http://localhost:8080");
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.chat_poll_secs, 2);
        assert_eq!(config.http_options().content_url, None);
    }

    #[test]
    fn debug_masks_token() {
        let config = SkillbridgeConfig {
            token: Some("very-secret".into()),
            ..Default::default()
        };
        let printed = format!("{config:?}");
        assert!(!printed.contains("very-secret"));
        assert!(printed.contains("***"));
    }

    #[test]
    fn blank_resolved_token_is_signed_out() {
        let config = SkillbridgeConfig {
            token: Some("${_SKILLBRIDGE_NEVER_SET}".into()),
            ..Default::default()
        }
        .resolve();
        assert!(config.token.is_none());
    }

    #[test]
    fn template_parses() {
        let config: SkillbridgeConfig = toml::from_str(CONFIG_TEMPLATE).unwrap();
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn explicit_missing_path_is_an_error() {
        let err = load_config_from(Some(Path::new("/definitely/not/here.toml"))).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }

    #[test]
    fn explicit_path_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("skillbridge.toml");
        std::fs::write(&path, "api_url = \"http://127.0.0.1:9\"\ntimeout_secs = 3\n").unwrap();
        let config = load_config_from(Some(&path)).unwrap();
        assert_eq!(config.timeout_secs, 3);
    }

    #[test]
    fn catalog_path_selects_mock_backend() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.toml");
        std::fs::write(
            &path,
            "[[topics]]\nid = \"t\"\nname = \"T\"\n\n[[lessons]]\nid = \"l1\"\ntopic = \"t\"\ntitle = \"L1\"\n",
        )
        .unwrap();
        let backend = create_backend(&SkillbridgeConfig::default(), Some(&path)).unwrap();
        assert_eq!(backend.name(), "mock");

        let backend = create_backend(&SkillbridgeConfig::default(), None).unwrap();
        assert_eq!(backend.name(), "http");
        assert!(!backend.is_authenticated());
    }

    #[tokio::test]
    async fn offline_profile_is_loaded_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = dir.path().join("catalog.toml");
        std::fs::write(
            &catalog,
            "[[topics]]\nid = \"t\"\nname = \"T\"\n\n[[lessons]]\nid = \"l1\"\ntopic = \"t\"\ntitle = \"L1\"\n",
        )
        .unwrap();
        let profile = dir.path().join("profile.json");
        std::fs::write(&profile, r#"{"userId":"offline-learner","totalXp":40,"completedLessons":["l1"]}"#)
            .unwrap();

        let config = SkillbridgeConfig {
            offline_profile: Some(profile),
            ..Default::default()
        };
        let backend = create_backend(&config, Some(&catalog)).unwrap();
        let loaded = backend.user_profile().await.unwrap();
        assert_eq!(loaded.total_xp, 40);
        assert!(loaded.completed_lessons.contains("l1"));
    }
}
