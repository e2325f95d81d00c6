//! Configuration loading.
//!
//! Values come from the process environment, after loading a `.env` file if
//! one exists. The data-store endpoint and its access key are required; the
//! `EXPO_PUBLIC_`-prefixed names used by the mobile build are accepted too.

use std::time::Duration;

use menuiserie_observability::LogFormat;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid data store url '{0}'")]
    InvalidUrl(String),

    #[error("invalid environment: {0}")]
    Env(#[from] envy::Error),
}

/// Raw environment, before required values are resolved.
#[derive(Debug, Deserialize)]
struct Env {
    supabase_url: Option<String>,
    expo_public_supabase_url: Option<String>,
    supabase_anon_key: Option<String>,
    expo_public_supabase_anon_key: Option<String>,
    request_timeout_secs: Option<u64>,
    #[serde(default)]
    log_format: LogFormat,
}

#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    /// Project URL, without trailing slash.
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub request_timeout: Option<Duration>,
    pub log_format: LogFormat,
}

// The key is a credential; keep it out of logs.
impl core::fmt::Debug for Config {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Config")
            .field("supabase_url", &self.supabase_url)
            .field("supabase_anon_key", &"<redacted>")
            .field("request_timeout", &self.request_timeout)
            .field("log_format", &self.log_format)
            .finish()
    }
}

impl Config {
    /// Load `.env` (if present) then read the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::resolve(envy::from_env::<Env>()?)
    }

    /// Read configuration from explicit `(NAME, value)` pairs.
    pub fn from_pairs<I>(pairs: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Self::resolve(envy::from_iter::<_, Env>(pairs)?)
    }

    fn resolve(env: Env) -> Result<Self, ConfigError> {
        let url = non_blank(env.supabase_url)
            .or_else(|| non_blank(env.expo_public_supabase_url))
            .ok_or(ConfigError::Missing("SUPABASE_URL"))?;
        let key = non_blank(env.supabase_anon_key)
            .or_else(|| non_blank(env.expo_public_supabase_anon_key))
            .ok_or(ConfigError::Missing("SUPABASE_ANON_KEY"))?;

        if !(url.starts_with("https://") || url.starts_with("http://")) {
            return Err(ConfigError::InvalidUrl(url));
        }

        Ok(Self {
            supabase_url: url.trim_end_matches('/').to_string(),
            supabase_anon_key: key,
            request_timeout: env
                .request_timeout_secs
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs),
            log_format: env.log_format,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
