//! Harness configuration from environment variables.
//!
//! | variable              | default                                 |
//! |-----------------------|-----------------------------------------|
//! | `API_BASE_URL`        | `https://jsonplaceholder.typicode.com`  |
//! | `API_TIMEOUT_MS`      | `10000`                                 |
//! | `API_MAX_RESPONSE_MS` | `2000`                                  |
//! | `API_FIXTURES_DIR`    | `fixtures`                              |
//! | `API_DURABLE_WRITES`  | `false`                                 |

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://jsonplaceholder.typicode.com";
const DEFAULT_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_MAX_RESPONSE_MS: u64 = 2_000;
const DEFAULT_FIXTURES_DIR: &str = "fixtures";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} must be a whole number of milliseconds, got {value:?}")]
    InvalidMillis { name: &'static str, value: String },

    #[error("{name} must not be empty")]
    Empty { name: &'static str },

    #[error("{name} must be one of 1, 0, true, false, got {value:?}")]
    InvalidFlag { name: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessConfig {
    pub base_url: String,
    /// Global transport timeout for one request.
    pub timeout: Duration,
    /// Budget used by response-time assertions.
    pub max_response_time: Duration,
    pub fixtures_dir: PathBuf,
    /// The backend stores writes, so created resources can be read back.
    pub durable_writes: bool,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            max_response_time: Duration::from_millis(DEFAULT_MAX_RESPONSE_MS),
            fixtures_dir: PathBuf::from(DEFAULT_FIXTURES_DIR),
            durable_writes: false,
        }
    }
}

impl HarnessConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source; unset variables keep their
    /// defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(url) = lookup("API_BASE_URL") {
            let url = url.trim();
            if url.is_empty() {
                return Err(ConfigError::Empty { name: "API_BASE_URL" });
            }
            config.base_url = url.to_string();
        }
        if let Some(ms) = millis(&lookup, "API_TIMEOUT_MS")? {
            config.timeout = ms;
        }
        if let Some(ms) = millis(&lookup, "API_MAX_RESPONSE_MS")? {
            config.max_response_time = ms;
        }
        if let Some(dir) = lookup("API_FIXTURES_DIR") {
            config.fixtures_dir = PathBuf::from(dir);
        }
        if let Some(value) = lookup("API_DURABLE_WRITES") {
            config.durable_writes = match value.trim().to_ascii_lowercase().as_str() {
                "1" | "true" => true,
                "0" | "false" | "" => false,
                _ => {
                    return Err(ConfigError::InvalidFlag {
                        name: "API_DURABLE_WRITES",
                        value,
                    })
                }
            };
        }
        Ok(config)
    }
}

fn millis<F>(lookup: &F, name: &'static str) -> Result<Option<Duration>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(value) = lookup(name) else {
        return Ok(None);
    };
    value
        .trim()
        .parse::<u64>()
        .map(|ms| Some(Duration::from_millis(ms)))
        .map_err(|_| ConfigError::InvalidMillis { name, value })
}
