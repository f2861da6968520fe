//! Deployment environment resolution.
//!
//! Everything that differs between local, studio, development and production
//! deployments is decided here once, at startup. Clients receive the resolved
//! [`AppConfig`] and never inspect the environment themselves.

use std::fs;
use std::path::{Path, PathBuf};

use reqwest::Url;
use serde::Deserialize;

pub const DEV_API_BASE_URL: &str = "https://www.dev.humanizeiq.ai/api/r2-explorer";
pub const PROD_API_BASE_URL: &str = "https://www.humanizeiq.ai/api/r2-explorer";
pub const TICKET_ENDPOINT: &str =
    "https://www.dev.humanizeiq.ai/api/ai_studio_manager_api/app-builder/create-defect-issue";
pub const AI_PROXY_BASE_URL: &str = "https://www.dev.humanizeiq.ai/api-proxy";
pub const GOOGLE_AI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_LOCATION: &str = "http://localhost";
pub const DEFAULT_COOKIE_FILE: &str = "local_cookie.json";

/// Sent in place of a real key when the proxy injects credentials.
const PROXY_API_KEY_PLACEHOLDER: &str = "NOT_SET";
const STUDIO_COOKIE_PARAM: &str = "X-Studio-Cookie";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Local,
    /// Sandboxed execution; backend calls carry a locally supplied cookie.
    Studio,
    Development,
    Production,
}

impl Environment {
    pub fn detect(location: &str) -> Self {
        let host = Url::parse(location)
            .ok()
            .and_then(|url| url.host_str().map(str::to_owned))
            .unwrap_or_default();

        if location.contains(".goog") {
            Self::Studio
        } else if host == "localhost" || host == "127.0.0.1" {
            Self::Local
        } else if location.contains("dev")
            || location.contains("non prod")
            || location.contains("nonprod")
        {
            Self::Development
        } else {
            Self::Production
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Studio => "studio",
            Self::Development => "development",
            Self::Production => "production",
        }
    }

    pub fn is_studio(&self) -> bool {
        matches!(self, Self::Studio)
    }
}

/// Raw inputs gathered from flags and environment variables.
#[derive(Debug, Clone)]
pub struct ConfigInputs {
    pub location: String,
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub cookie_file: PathBuf,
}

impl Default for ConfigInputs {
    fn default() -> Self {
        Self {
            location: DEFAULT_LOCATION.to_string(),
            api_key: None,
            model: None,
            cookie_file: PathBuf::from(DEFAULT_COOKIE_FILE),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AiConfig {
    pub base_url: String,
    /// `None` when running in studio mode without a key; AI calls then fail.
    pub api_key: Option<String>,
    pub model: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: Environment,
    pub api_base_url: String,
    pub ticket_endpoint: String,
    pub ai: AiConfig,
    pub studio_cookie: Option<String>,
}

impl AppConfig {
    pub fn resolve(inputs: ConfigInputs) -> Self {
        let environment = Environment::detect(&inputs.location);

        let api_base_url = match environment {
            Environment::Production => PROD_API_BASE_URL,
            _ => DEV_API_BASE_URL,
        }
        .to_string();

        let api_key = inputs.api_key.filter(|key| !key.trim().is_empty());
        let ai = if environment.is_studio() {
            if api_key.is_none() {
                tracing::warn!("No API key in the environment; AI features will not work in studio mode");
            }
            AiConfig {
                base_url: GOOGLE_AI_BASE_URL.to_string(),
                api_key,
                model: inputs.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            }
        } else {
            AiConfig {
                base_url: AI_PROXY_BASE_URL.to_string(),
                api_key: Some(api_key.unwrap_or_else(|| PROXY_API_KEY_PLACEHOLDER.to_string())),
                model: inputs.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            }
        };

        let studio_cookie = if environment.is_studio() {
            load_studio_cookie(&inputs.cookie_file)
        } else {
            None
        };

        tracing::info!(
            environment = environment.as_str(),
            api_base_url = %api_base_url,
            studio_cookie = studio_cookie.is_some(),
            "Resolved configuration"
        );

        Self {
            environment,
            api_base_url,
            ticket_endpoint: TICKET_ENDPOINT.to_string(),
            ai,
            studio_cookie,
        }
    }

    pub fn files_url(&self) -> String {
        self.with_studio_auth(&format!("{}/files", self.api_base_url))
    }

    pub fn ticket_url(&self) -> String {
        self.with_studio_auth(&self.ticket_endpoint)
    }

    /// Append the studio cookie as a query parameter, when one was loaded.
    pub fn with_studio_auth(&self, url: &str) -> String {
        let Some(cookie) = &self.studio_cookie else {
            return url.to_string();
        };
        match Url::parse(url) {
            Ok(mut parsed) => {
                parsed
                    .query_pairs_mut()
                    .append_pair(STUDIO_COOKIE_PARAM, cookie);
                parsed.to_string()
            }
            Err(e) => {
                tracing::warn!("Not adding studio auth to unparseable URL {url}: {e}");
                url.to_string()
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct CookieFile {
    cookie: Option<serde_json::Value>,
}

/// Read `{"cookie": "..."}` from `path`. Problems are logged, never fatal.
pub fn load_studio_cookie(path: &Path) -> Option<String> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) => {
            tracing::error!("Failed to read {}: {e}", path.display());
            return None;
        }
    };
    match serde_json::from_str::<CookieFile>(&raw) {
        Ok(CookieFile {
            cookie: Some(serde_json::Value::String(cookie)),
        }) => Some(cookie),
        Ok(_) => {
            tracing::error!(
                "Invalid format for {}. Expected {{ \"cookie\": \"...\" }}",
                path.display()
            );
            None
        }
        Err(e) => {
            tracing::error!("Error parsing {}: {e}", path.display());
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn studio_inputs(dir: &TempDir, cookie_json: Option<&str>) -> ConfigInputs {
        let cookie_file = dir.path().join("local_cookie.json");
        if let Some(json) = cookie_json {
            fs::write(&cookie_file, json).unwrap();
        }
        ConfigInputs {
            location: "https://abc123.studio.goog/app".into(),
            api_key: Some("secret".into()),
            model: None,
            cookie_file,
        }
    }

    #[test]
    fn detects_environments() {
        assert_eq!(Environment::detect("http://localhost:5173"), Environment::Local);
        assert_eq!(Environment::detect("http://127.0.0.1"), Environment::Local);
        assert_eq!(Environment::detect("https://x.sandbox.goog/"), Environment::Studio);
        assert_eq!(
            Environment::detect("https://tools.dev.humanizeiq.ai/tasks"),
            Environment::Development
        );
        assert_eq!(
            Environment::detect("https://tools.humanizeiq.ai/tasks"),
            Environment::Production
        );
    }

    #[test]
    fn production_uses_production_backend_and_proxy() {
        let config = AppConfig::resolve(ConfigInputs {
            location: "https://tools.humanizeiq.ai".into(),
            ..Default::default()
        });
        assert_eq!(config.api_base_url, PROD_API_BASE_URL);
        assert_eq!(config.ai.base_url, AI_PROXY_BASE_URL);
        assert_eq!(config.ai.api_key.as_deref(), Some("NOT_SET"));
        assert_eq!(config.ai.model, DEFAULT_MODEL);
        assert!(config.studio_cookie.is_none());
    }

    #[test]
    fn local_uses_dev_backend() {
        let config = AppConfig::resolve(ConfigInputs::default());
        assert_eq!(config.environment, Environment::Local);
        assert_eq!(config.api_base_url, DEV_API_BASE_URL);
        assert_eq!(config.files_url(), format!("{DEV_API_BASE_URL}/files"));
    }

    #[test]
    fn studio_talks_to_google_with_cookie() {
        let dir = TempDir::new().unwrap();
        let config = AppConfig::resolve(studio_inputs(&dir, Some(r#"{"cookie": "a b&c"}"#)));

        assert_eq!(config.environment, Environment::Studio);
        assert_eq!(config.ai.base_url, GOOGLE_AI_BASE_URL);
        assert_eq!(config.ai.api_key.as_deref(), Some("secret"));
        assert_eq!(config.studio_cookie.as_deref(), Some("a b&c"));

        let url = config.ticket_url();
        let parsed = Url::parse(&url).unwrap();
        let cookie: Vec<_> = parsed
            .query_pairs()
            .filter(|(k, _)| k == "X-Studio-Cookie")
            .map(|(_, v)| v.into_owned())
            .collect();
        assert_eq!(cookie, vec!["a b&c".to_string()]);
    }

    #[test]
    fn studio_auth_preserves_existing_query() {
        let dir = TempDir::new().unwrap();
        let config = AppConfig::resolve(studio_inputs(&dir, Some(r#"{"cookie": "tok"}"#)));

        let url = config.with_studio_auth("https://example.com/x?page=2");
        assert_eq!(url, "https://example.com/x?page=2&X-Studio-Cookie=tok");
    }

    #[test]
    fn studio_without_key_has_no_key() {
        let dir = TempDir::new().unwrap();
        let mut inputs = studio_inputs(&dir, None);
        inputs.api_key = Some("  ".into());
        let config = AppConfig::resolve(inputs);
        assert!(config.ai.api_key.is_none());
    }

    #[test]
    fn missing_or_malformed_cookie_is_ignored() {
        let dir = TempDir::new().unwrap();
        assert!(AppConfig::resolve(studio_inputs(&dir, None)).studio_cookie.is_none());

        let dir = TempDir::new().unwrap();
        let config = AppConfig::resolve(studio_inputs(&dir, Some(r#"{"token": "x"}"#)));
        assert!(config.studio_cookie.is_none());
        assert_eq!(config.ticket_url(), TICKET_ENDPOINT);

        let dir = TempDir::new().unwrap();
        let config = AppConfig::resolve(studio_inputs(&dir, Some("not json")));
        assert!(config.studio_cookie.is_none());
    }

    #[test]
    fn cookie_is_only_loaded_in_studio() {
        let dir = TempDir::new().unwrap();
        let cookie_file = dir.path().join("local_cookie.json");
        fs::write(&cookie_file, r#"{"cookie": "tok"}"#).unwrap();

        let config = AppConfig::resolve(ConfigInputs {
            cookie_file,
            ..Default::default()
        });
        assert!(config.studio_cookie.is_none());
    }
}
