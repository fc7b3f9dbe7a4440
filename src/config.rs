//! Configuration: YAML file with environment overrides.
//!
//! Lookup order for credentials:
//! 1. `SWITCHBOT_TOKEN` + `SWITCHBOT_SECRET` (cloud API)
//! 2. `SWITCHBOT_PROXY_URL` + `SWITCHBOT_PROXY_KEY` (self-hosted relay)
//! 3. `credentials` in the config file
//!
//! The file lives at `$SWITCHBOT_BRIDGE_CONFIG`, falling back to
//! `<config dir>/switchbot-bridge/config.yaml`.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::pool::quota::DEFAULT_DAILY_REQUEST_CEILING;

pub const CONFIG_PATH_ENV: &str = "SWITCHBOT_BRIDGE_CONFIG";

/// Upstream credentials, one variant per client.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum Credentials {
    Direct { token: String, secret: String },
    Proxy { url: String, key: String },
}

// Secrets stay out of logs.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Direct { .. } => f.debug_struct("Direct").finish_non_exhaustive(),
            Self::Proxy { url, .. } => f.debug_struct("Proxy").field("url", url).finish_non_exhaustive(),
        }
    }
}

impl Credentials {
    pub fn mode(&self) -> &'static str {
        match self {
            Self::Direct { .. } => "direct",
            Self::Proxy { .. } => "proxy",
        }
    }

    fn validate(&mut self) -> Result<()> {
        match self {
            Self::Direct { token, secret } => {
                if token.trim().is_empty() || secret.trim().is_empty() {
                    bail!("direct mode requires a non-empty token and secret");
                }
            }
            Self::Proxy { url, key } => {
                if key.trim().is_empty() {
                    bail!("proxy mode requires a non-empty API key");
                }
                if !(url.starts_with("http://") || url.starts_with("https://")) {
                    bail!("proxy url must start with http:// or https:// (got '{}')", url);
                }
                let trimmed = url.trim_end_matches('/').to_string();
                *url = trimmed;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub credentials: Option<Credentials>,
    #[serde(default = "default_ceiling")]
    pub daily_request_ceiling: NonZeroU32,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_tick_interval")]
    pub tick_interval_secs: u64,
}

fn default_ceiling() -> NonZeroU32 {
    NonZeroU32::new(DEFAULT_DAILY_REQUEST_CEILING).unwrap_or(NonZeroU32::MIN)
}

fn default_request_timeout() -> u64 {
    10
}

fn default_tick_interval() -> u64 {
    30
}

impl Default for Config {
    fn default() -> Self {
        Self {
            credentials: None,
            daily_request_ceiling: default_ceiling(),
            request_timeout_secs: default_request_timeout(),
            tick_interval_secs: default_tick_interval(),
        }
    }
}

impl Config {
    /// Load from the environment, reading the config file if present.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let path = resolve_path(&lookup)?;
        let base = if path.exists() {
            Self::read_file(&path)?
        } else {
            Self::default()
        };
        base.with_overrides(lookup)
    }

    /// Load a config file, applying no environment overrides.
    pub fn load(path: &Path) -> Result<Self> {
        Self::read_file(path)?.with_overrides(|_| None)
    }

    fn read_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_yaml::from_str(&raw)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Apply overrides from `lookup` (normally the process environment)
    /// and validate the result.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let (Some(token), Some(secret)) = (lookup("SWITCHBOT_TOKEN"), lookup("SWITCHBOT_SECRET")) {
            self.credentials = Some(Credentials::Direct { token, secret });
        } else if let (Some(url), Some(key)) =
            (lookup("SWITCHBOT_PROXY_URL"), lookup("SWITCHBOT_PROXY_KEY"))
        {
            self.credentials = Some(Credentials::Proxy { url, key });
        }

        if let Some(limit) = lookup("SWITCHBOT_DAILY_LIMIT") {
            self.daily_request_ceiling = limit
                .trim()
                .parse()
                .with_context(|| format!("SWITCHBOT_DAILY_LIMIT must be a positive integer (got '{}')", limit))?;
        }

        self.validate()?;
        Ok(self)
    }

    fn validate(&mut self) -> Result<()> {
        match self.credentials.as_mut() {
            Some(creds) => creds.validate()?,
            None => bail!(
                "no credentials configured: set SWITCHBOT_TOKEN/SWITCHBOT_SECRET, \
                 SWITCHBOT_PROXY_URL/SWITCHBOT_PROXY_KEY, or `credentials` in the config file"
            ),
        }
        if self.request_timeout_secs == 0 {
            bail!("request_timeout_secs must be greater than zero");
        }
        if self.tick_interval_secs == 0 {
            bail!("tick_interval_secs must be greater than zero");
        }
        Ok(())
    }

    /// Validated credentials.
    pub fn credentials(&self) -> Result<&Credentials> {
        self.credentials.as_ref().context("no credentials configured")
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(self.tick_interval_secs)
    }
}

/// Resolve the config file location.
pub fn default_path() -> Result<PathBuf> {
    resolve_path(|name| std::env::var(name).ok())
}

fn resolve_path<F>(lookup: F) -> Result<PathBuf>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(path) = lookup(CONFIG_PATH_ENV) {
        return Ok(PathBuf::from(path));
    }
    let dir = dirs::config_dir().context("Cannot determine config directory")?;
    Ok(dir.join("switchbot-bridge").join("config.yaml"))
}
