use std::path::Path;
use std::time::Duration;

use encoding_rs::Encoding;
use serde::Deserialize;

use crate::error::ConfigError;

/// Where the registry export is read from and how it is decoded.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct SourceConfig {
    /// Local path or http(s) URL of the CSV export.
    pub source: String,
    /// Encoding tried first (a UTF-8 BOM is stripped when present).
    pub primary_encoding: String,
    /// Legacy encoding tried once when the primary fails.
    pub fallback_encoding: String,
    /// Upper bound on a remote fetch.
    pub fetch_timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            source: "lukka68.csv".to_string(),
            primary_encoding: "utf-8".to_string(),
            fallback_encoding: "tis-620".to_string(),
            fetch_timeout_secs: 30,
        }
    }
}

impl SourceConfig {
    pub fn for_source(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            ..Self::default()
        }
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// Resolve both encoding labels, primary first.
    pub fn encodings(&self) -> Result<(&'static Encoding, &'static Encoding), ConfigError> {
        Ok((
            resolve_encoding(&self.primary_encoding)?,
            resolve_encoding(&self.fallback_encoding)?,
        ))
    }
}

/// URL templates for the external public-registry lookup. `{name}` is
/// replaced with the percent-encoded company name.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct RegistryConfig {
    pub search_url: Option<String>,
    pub profile_url: Option<String>,
}

/// Top-level configuration shared by the binaries.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    #[serde(flatten)]
    pub source: SourceConfig,
    /// Snapshot lifetime before a read triggers a reload.
    pub cache_ttl_secs: u64,
    pub registry: RegistryConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            source: SourceConfig::default(),
            cache_ttl_secs: 3600,
            registry: RegistryConfig::default(),
        }
    }
}

impl AppConfig {
    /// Defaults, then the JSON file (if any), then `REGISTRY_*` variables.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|name| std::env::var(name).ok())?;
        config.source.encodings()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let display = path.display().to_string();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: display.clone(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: display,
            source,
        })
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Apply overrides from a variable lookup. Taking the lookup as a closure
    /// keeps tests away from the process environment.
    pub fn apply_env<F>(&mut self, var: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = var("REGISTRY_SOURCE") {
            self.source.source = v;
        }
        if let Some(v) = var("REGISTRY_PRIMARY_ENCODING") {
            self.source.primary_encoding = v;
        }
        if let Some(v) = var("REGISTRY_FALLBACK_ENCODING") {
            self.source.fallback_encoding = v;
        }
        if let Some(v) = var("REGISTRY_FETCH_TIMEOUT_SECS") {
            self.source.fetch_timeout_secs = parse_secs("REGISTRY_FETCH_TIMEOUT_SECS", v)?;
        }
        if let Some(v) = var("REGISTRY_CACHE_TTL_SECS") {
            self.cache_ttl_secs = parse_secs("REGISTRY_CACHE_TTL_SECS", v)?;
        }
        if let Some(v) = var("REGISTRY_SEARCH_URL") {
            self.registry.search_url = Some(v);
        }
        if let Some(v) = var("REGISTRY_PROFILE_URL") {
            self.registry.profile_url = Some(v);
        }
        Ok(())
    }
}

fn parse_secs(name: &'static str, value: String) -> Result<u64, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidEnv { name, value })
}

/// Map a WHATWG label ("utf-8", "tis-620", "windows-874", ...) to an encoding.
pub fn resolve_encoding(label: &str) -> Result<&'static Encoding, ConfigError> {
    Encoding::for_label(label.trim().as_bytes())
        .ok_or_else(|| ConfigError::UnknownEncoding(label.to_string()))
}
