//! Worker configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};
use url::Url;

/// Errors raised while loading or validating a [`WorkerConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Failed to parse JSON config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Configuration for one version of the edge cache controller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Version identifier; also the name of this version's snapshot store.
    #[serde(default = "default_version")]
    pub version: String,

    /// Origin the worker is registered for. Same-origin checks compare against it.
    #[serde(default = "default_scope")]
    pub scope: Url,

    /// Ordered asset paths snapshotted at install time.
    #[serde(default = "default_manifest")]
    pub manifest: Vec<String>,

    /// Root document served to offline navigations.
    #[serde(default = "default_fallback_document")]
    pub fallback_document: String,

    /// Request classification rules.
    #[serde(default)]
    pub routing: RoutingConfig,

    /// Push notification presentation.
    #[serde(default)]
    pub push: PushConfig,

    /// Network settings.
    #[serde(default)]
    pub network: NetworkConfig,

    /// Attach `X-Cache-*` debug headers to served responses.
    #[serde(default)]
    pub explain_headers: bool,
}

fn default_version() -> String {
    "app-shell-v1".to_string()
}

fn default_scope() -> Url {
    Url::parse("http://localhost/").expect("static scope URL is valid")
}

fn default_manifest() -> Vec<String> {
    [
        "/",
        "/index.html",
        "/css/mobile.css",
        "/js/app.js",
        "/manifest.json",
    ]
    .iter()
    .map(|p| p.to_string())
    .collect()
}

fn default_fallback_document() -> String {
    "/".to_string()
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            scope: default_scope(),
            manifest: default_manifest(),
            fallback_document: default_fallback_document(),
            routing: RoutingConfig::default(),
            push: PushConfig::default(),
            network: NetworkConfig::default(),
            explain_headers: false,
        }
    }
}

impl WorkerConfig {
    /// Create a config for a version and scope, keeping every other default.
    pub fn new(version: impl Into<String>, scope: Url) -> Self {
        Self {
            version: version.into(),
            scope,
            ..Default::default()
        }
    }

    /// Replace the asset manifest.
    pub fn with_manifest(mut self, paths: &[&str]) -> Self {
        self.manifest = paths.iter().map(|p| p.to_string()).collect();
        self
    }

    /// Set the offline navigation document.
    pub fn with_fallback_document(mut self, path: impl Into<String>) -> Self {
        self.fallback_document = path.into();
        self
    }

    /// Enable or disable debug headers.
    pub fn with_explain_headers(mut self, enabled: bool) -> Self {
        self.explain_headers = enabled;
        self
    }

    /// Load config from a file. `.json` files are parsed as JSON, everything else as TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let config: Self = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content)?
        } else {
            toml::from_str(&content)?
        };

        config.validate()?;
        Ok(config)
    }

    /// Check invariants that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version.trim().is_empty() {
            return Err(ConfigError::Invalid("version must not be empty".to_string()));
        }

        if let Some(path) = self.manifest.iter().find(|p| !p.starts_with('/')) {
            return Err(ConfigError::Invalid(format!(
                "manifest path '{}' must start with '/'",
                path
            )));
        }

        if !self.manifest.contains(&self.fallback_document) {
            return Err(ConfigError::Invalid(format!(
                "fallback document '{}' is not in the manifest",
                self.fallback_document
            )));
        }

        Ok(())
    }

    /// Resolve a scope-relative path to an absolute URL.
    pub fn resolve(&self, path: &str) -> Result<Url, url::ParseError> {
        self.scope.join(path)
    }
}

/// Rules that route requests around the snapshot store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingConfig {
    /// Path segments that mark dynamic API requests (e.g. `api` matches `/api/sleep`).
    #[serde(default = "default_api_segments")]
    pub api_segments: Vec<String>,

    /// Backend data hosts. Exact names or `*.suffix` patterns.
    #[serde(default)]
    pub backend_hosts: Vec<String>,
}

fn default_api_segments() -> Vec<String> {
    vec!["api".to_string()]
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            api_segments: default_api_segments(),
            backend_hosts: Vec::new(),
        }
    }
}

/// Push notification presentation defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushConfig {
    /// Title used when the payload carries none.
    #[serde(default = "default_title")]
    pub default_title: String,

    /// Notification icon.
    #[serde(default = "default_icon")]
    pub icon: String,

    /// Monochrome badge.
    #[serde(default = "default_badge")]
    pub badge: String,

    /// Vibration pattern in milliseconds.
    #[serde(default = "default_vibrate")]
    pub vibrate: Vec<u32>,

    /// Target URL when the payload carries none.
    #[serde(default = "default_url")]
    pub default_url: String,
}

fn default_title() -> String {
    "New notification".to_string()
}

fn default_icon() -> String {
    "/icons/icon-192.png".to_string()
}

fn default_badge() -> String {
    "/icons/badge-72.png".to_string()
}

fn default_vibrate() -> Vec<u32> {
    vec![100, 50, 100]
}

fn default_url() -> String {
    "/".to_string()
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            default_title: default_title(),
            icon: default_icon(),
            badge: default_badge(),
            vibrate: default_vibrate(),
            default_url: default_url(),
        }
    }
}

/// Network settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Total time allowed for a network fetch before it counts as unavailable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_timeout_ms() -> u64 {
    10_000
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = WorkerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.fallback_document, "/");
        assert_eq!(config.routing.api_segments, vec!["api"]);
    }

    #[test]
    fn test_toml_with_partial_fields() {
        let config: WorkerConfig = toml::from_str(
            r#"
            version = "shell-v7"
            scope = "https://sleep.example.com/"
            manifest = ["/", "/css/mobile.css"]

            [routing]
            backend_hosts = ["*.supabase.co"]

            [push]
            default_title = "Sleep tracker"
            "#,
        )
        .unwrap();

        assert_eq!(config.version, "shell-v7");
        assert_eq!(config.scope.as_str(), "https://sleep.example.com/");
        assert_eq!(config.routing.api_segments, vec!["api"]);
        assert_eq!(config.routing.backend_hosts, vec!["*.supabase.co"]);
        assert_eq!(config.push.default_title, "Sleep tracker");
        assert_eq!(config.push.default_url, "/");
        assert_eq!(config.network.timeout_ms, 10_000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_json_config() {
        let config: WorkerConfig =
            serde_json::from_str(r#"{"version":"v2","explain_headers":true}"#).unwrap();
        assert_eq!(config.version, "v2");
        assert!(config.explain_headers);
    }

    #[test]
    fn test_validate_rejects_relative_manifest_path() {
        let config = WorkerConfig::default().with_manifest(&["/", "css/app.css"]);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("css/app.css"));
    }

    #[test]
    fn test_validate_rejects_missing_fallback_document() {
        let config = WorkerConfig::default()
            .with_manifest(&["/css/mobile.css"])
            .with_fallback_document("/");
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_validate_rejects_empty_version() {
        let mut config = WorkerConfig::default();
        config.version = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_resolve_against_scope() {
        let config = WorkerConfig::new(
            "v1",
            Url::parse("https://app.example.com/").unwrap(),
        );
        assert_eq!(
            config.resolve("/css/mobile.css").unwrap().as_str(),
            "https://app.example.com/css/mobile.css"
        );
    }

    #[test]
    fn test_load_missing_file() {
        let err = WorkerConfig::load("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
