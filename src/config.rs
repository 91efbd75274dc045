//! Settings file support
//!
//! Keys, endpoints and identifiers for the four hosted services are read from
//! a JSON `appsettings.json` before any client is constructed.

use crate::error::ConfigError;
use serde::Deserialize;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use url::Url;
use uuid::Uuid;

pub const SETTINGS_FILE: &str = "appsettings.json";

/// Environment variable naming an explicit settings file
pub const SETTINGS_ENV: &str = "KUSTBOT_SETTINGS";

pub const DEFAULT_SLOT: &str = "Production";
pub const DEFAULT_PIVOT_LANGUAGE: &str = "en";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Text analytics (language detection)
    #[serde(default)]
    pub cog_ser_key: String,
    #[serde(default)]
    pub cog_ser_endpoint: String,

    /// Intent prediction
    #[serde(default)]
    pub luis_key: String,
    #[serde(default)]
    pub luis_endpoint: String,
    #[serde(default)]
    pub luis_id: String,
    #[serde(default = "default_slot")]
    pub luis_slot: String,

    /// Translator
    #[serde(default)]
    pub translator_key: String,
    #[serde(default)]
    pub translator_endpoint: String,
    #[serde(default)]
    pub location: String,

    /// Knowledge base
    #[serde(default)]
    pub primary_query_endpoint_key: String,
    #[serde(default, rename = "queryingURL")]
    pub querying_url: String,
    #[serde(default)]
    pub kb_id: String,

    #[serde(default = "default_pivot_language")]
    pub pivot_language: String,
}

fn default_slot() -> String {
    DEFAULT_SLOT.to_string()
}

fn default_pivot_language() -> String {
    DEFAULT_PIVOT_LANGUAGE.to_string()
}

/// Settings path from `KUSTBOT_SETTINGS`, if set
pub fn settings_override() -> Option<PathBuf> {
    override_path(std::env::var_os(SETTINGS_ENV))
}

fn override_path(value: Option<OsString>) -> Option<PathBuf> {
    value.filter(|v| !v.is_empty()).map(PathBuf::from)
}

impl Settings {
    /// Locate, read and validate the settings file
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = Self::resolve_path(explicit)?;
        let contents = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        Self::from_json(&contents)
    }

    /// Parse and validate settings from JSON text
    pub fn from_json(contents: &str) -> Result<Self, ConfigError> {
        let settings: Settings = serde_json::from_str(contents)?;
        settings.validate()?;
        Ok(settings)
    }

    /// An explicit path wins. Otherwise the working directory is tried first,
    /// then the per-user config directory.
    pub fn resolve_path(explicit: Option<&Path>) -> Result<PathBuf, ConfigError> {
        if let Some(path) = explicit {
            return Ok(path.to_path_buf());
        }

        let candidates = Self::candidate_paths();
        candidates
            .iter()
            .find(|p| p.is_file())
            .cloned()
            .ok_or(ConfigError::NotFound(candidates))
    }

    fn candidate_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(SETTINGS_FILE)];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("kustbot").join(SETTINGS_FILE));
        }
        paths
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("cogSerKey", &self.cog_ser_key),
            ("cogSerEndpoint", &self.cog_ser_endpoint),
            ("luisKey", &self.luis_key),
            ("luisEndpoint", &self.luis_endpoint),
            ("luisId", &self.luis_id),
            ("luisSlot", &self.luis_slot),
            ("translatorKey", &self.translator_key),
            ("translatorEndpoint", &self.translator_endpoint),
            ("location", &self.location),
            ("primaryQueryEndpointKey", &self.primary_query_endpoint_key),
            ("queryingURL", &self.querying_url),
            ("kbId", &self.kb_id),
            ("pivotLanguage", &self.pivot_language),
        ];
        for (key, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::Missing(key));
            }
        }

        let endpoints = [
            ("cogSerEndpoint", &self.cog_ser_endpoint),
            ("luisEndpoint", &self.luis_endpoint),
            ("translatorEndpoint", &self.translator_endpoint),
            ("queryingURL", &self.querying_url),
        ];
        for (key, value) in endpoints {
            parse_endpoint(key, value)?;
        }

        self.luis_app_id()?;
        Ok(())
    }

    /// Prediction app id as a GUID
    pub fn luis_app_id(&self) -> Result<Uuid, ConfigError> {
        Uuid::parse_str(self.luis_id.trim()).map_err(|_| ConfigError::InvalidGuid {
            key: "luisId",
            value: self.luis_id.clone(),
        })
    }
}

fn parse_endpoint(key: &'static str, value: &str) -> Result<Url, ConfigError> {
    match Url::parse(value.trim()) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(url),
        _ => Err(ConfigError::InvalidUrl {
            key,
            value: value.to_string(),
        }),
    }
}

/// Join a route onto a configured endpoint without doubling the slash
pub(crate) fn endpoint_url(endpoint: &str, route: &str) -> String {
    format!(
        "{}/{}",
        endpoint.trim().trim_end_matches('/'),
        route.trim_start_matches('/')
    )
}
