//! Typed configuration parsed from environment variables.
//!
//! `.env` is loaded by the binary before [`Settings::from_env`] runs. Every
//! numeric knob falls back to its default when unset or unparseable.

#[cfg(test)]
#[path = "settings_test.rs"]
mod settings_test;

use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;

pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("no platform data directory; set FLOORPLAN_DATA_DIR")]
    NoDataDir,
    #[error("invalid {var}: {value}")]
    Invalid { var: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Timeouts {
    #[must_use]
    pub fn request(&self) -> Duration {
        Duration::from_secs(self.request_secs)
    }

    #[must_use]
    pub fn connect(&self) -> Duration {
        Duration::from_secs(self.connect_secs)
    }
}

impl Default for Timeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

/// Connection details for the remote layout API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteSettings {
    /// Base URL without a trailing slash.
    pub base_url: String,
    pub token: Option<String>,
    pub cache_ttl: Duration,
    pub timeouts: Timeouts,
}

impl RemoteSettings {
    /// Remote settings with default cache and timeouts.
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_owned(),
            token: None,
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            timeouts: Timeouts::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Directory holding local canvas snapshots.
    pub data_dir: PathBuf,
    /// Present when `FLOORPLAN_API_BASE_URL` is set.
    pub remote: Option<RemoteSettings>,
    pub timeouts: Timeouts,
}

impl Settings {
    /// Build settings from the process environment.
    ///
    /// Optional:
    /// - `FLOORPLAN_DATA_DIR`: platform data dir when absent
    /// - `FLOORPLAN_API_BASE_URL`: enables the remote backend
    /// - `FLOORPLAN_API_TOKEN`: bearer token for the remote backend
    /// - `FLOORPLAN_CACHE_TTL_SECS`: default 300
    /// - `FLOORPLAN_REQUEST_TIMEOUT_SECS`: default 30
    /// - `FLOORPLAN_CONNECT_TIMEOUT_SECS`: default 10
    ///
    /// # Errors
    ///
    /// Fails when no data directory can be determined or the base URL is not
    /// an http(s) URL.
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Settings::from_env`], reading variables through `lookup`.
    ///
    /// # Errors
    ///
    /// See [`Settings::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, SettingsError> {
        let data_dir = match non_empty(lookup("FLOORPLAN_DATA_DIR")) {
            Some(dir) => PathBuf::from(dir),
            None => default_data_dir().ok_or(SettingsError::NoDataDir)?,
        };

        let timeouts = Timeouts {
            request_secs: parse_or(&lookup, "FLOORPLAN_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: parse_or(&lookup, "FLOORPLAN_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
        };

        let remote = match non_empty(lookup("FLOORPLAN_API_BASE_URL")) {
            Some(url) => {
                if !(url.starts_with("http://") || url.starts_with("https://")) {
                    return Err(SettingsError::Invalid { var: "FLOORPLAN_API_BASE_URL", value: url });
                }
                Some(RemoteSettings {
                    base_url: url.trim_end_matches('/').to_owned(),
                    token: non_empty(lookup("FLOORPLAN_API_TOKEN")),
                    cache_ttl: Duration::from_secs(parse_or(&lookup, "FLOORPLAN_CACHE_TTL_SECS", DEFAULT_CACHE_TTL_SECS)),
                    timeouts,
                })
            }
            None => None,
        };

        Ok(Self { data_dir, remote, timeouts })
    }
}

/// Platform data directory, e.g. `~/.local/share/floorplan` on Linux.
#[must_use]
pub fn default_data_dir() -> Option<PathBuf> {
    ProjectDirs::from("com", "floorplan", "floorplan").map(|dirs| dirs.data_dir().to_path_buf())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_owned()).filter(|v| !v.is_empty())
}

fn parse_or<T: std::str::FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    lookup(key)
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}
