//! Immutable client configuration.

use std::env;
use std::fmt;

use thiserror::Error;

pub const DEFAULT_CLIENT_VERSION: &str = "1.0.0";

pub const ENV_BASE_URL: &str = "JADUGAR_BASE_URL";
pub const ENV_API_KEY: &str = "JADUGAR_API_KEY";
pub const ENV_CLIENT_VERSION: &str = "JADUGAR_CLIENT_VERSION";

/// Platform tag sent as `X-Client-Platform`. Fixed by the adapter crate,
/// never chosen by the caller at request time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Web,
    Ios,
    Android,
}

impl Platform {
    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Web => "web",
            Platform::Ios => "ios",
            Platform::Android => "android",
        }
    }

    /// The mobile platform of the current build target.
    pub fn mobile() -> Self {
        if cfg!(target_os = "android") {
            Platform::Android
        } else {
            Platform::Ios
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{ENV_BASE_URL} is not set")]
    MissingBaseUrl,
}

/// Settings shared by every request of one client.
///
/// The trailing `/` of the base URL is trimmed so endpoints can always be
/// written with a leading `/`. An empty API key counts as no key.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    base_url: String,
    api_key: Option<String>,
    version: String,
    platform: Platform,
}

impl ClientConfig {
    pub fn new(base_url: &str, platform: Platform) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: None,
            version: DEFAULT_CLIENT_VERSION.to_string(),
            platform,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into()).filter(|k| !k.is_empty());
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Read `JADUGAR_BASE_URL`, `JADUGAR_API_KEY` and
    /// `JADUGAR_CLIENT_VERSION` from the process environment.
    pub fn from_env(platform: Platform) -> Result<Self, ConfigError> {
        Self::from_lookup(platform, |name| env::var(name).ok())
    }

    pub fn from_lookup<F>(platform: Platform, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup(ENV_BASE_URL)
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::MissingBaseUrl)?;
        let mut config = Self::new(&base_url, platform);
        if let Some(key) = lookup(ENV_API_KEY) {
            config = config.with_api_key(key);
        }
        if let Some(version) = lookup(ENV_CLIENT_VERSION).filter(|v| !v.is_empty()) {
            config = config.with_version(version);
        }
        Ok(config)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }
}

// Keeps the API key out of logs and panic messages.
impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("version", &self.version)
            .field("platform", &self.platform)
            .finish()
    }
}
