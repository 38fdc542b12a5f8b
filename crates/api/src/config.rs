use std::str::FromStr;
use std::time::Duration;

use stager_hosting::chain::HostKind;
use stager_reimagine::api::DEFAULT_API_URL;
use stager_reimagine::poller::PollConfig;

/// A configuration value that could not be used.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} has invalid value '{value}': {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development. Without
/// `REIMAGINEHOME_API_KEY` the server starts but refuses staging requests.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `5000`).
    pub port: u16,
    /// Base URL the staging provider and image hosts use to reach this
    /// server (default: `http://localhost:{PORT}`).
    pub public_base_url: String,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    /// A single `*` allows any origin.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Largest accepted request body (default: 20 MiB).
    pub max_body_bytes: usize,
    pub reimagine_api_url: String,
    pub reimagine_api_key: Option<String>,
    /// Delay between segmentation status queries (default: `2`).
    pub mask_poll_interval_secs: u64,
    /// Status queries before a job times out (default: `20`).
    pub mask_poll_max_attempts: u32,
    /// Ranked image hosts (default: `self`).
    pub image_hosts: Vec<HostKind>,
    pub imgbb_api_key: Option<String>,
    /// How long settled jobs and hosted images are kept (default: `3600`).
    pub job_retention_secs: u64,
    /// Emit JSON log lines (`LOG_FORMAT=json`).
    pub log_json: bool,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default                          |
    /// |---------------------------|----------------------------------|
    /// | `HOST`                    | `0.0.0.0`                        |
    /// | `PORT`                    | `5000`                           |
    /// | `PUBLIC_BASE_URL`         | `http://localhost:{PORT}`        |
    /// | `CORS_ORIGINS`            | `http://localhost:5173`          |
    /// | `REQUEST_TIMEOUT_SECS`    | `30`                             |
    /// | `MAX_BODY_BYTES`          | `20971520`                       |
    /// | `REIMAGINEHOME_API_URL`   | `https://api.reimaginehome.ai/v1`|
    /// | `REIMAGINEHOME_API_KEY`   | unset                            |
    /// | `MASK_POLL_INTERVAL_SECS` | `2`                              |
    /// | `MASK_POLL_MAX_ATTEMPTS`  | `20`                             |
    /// | `IMAGE_HOSTS`             | `self`                           |
    /// | `IMGBB_API_KEY`           | unset                            |
    /// | `JOB_RETENTION_SECS`      | `3600`                           |
    /// | `LOG_FORMAT`              | `text`                           |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load configuration through `lookup` instead of the process
    /// environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        // Blank values count as unset.
        let get = |var: &str| {
            lookup(var)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let host = get("HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port: u16 = parse_or("PORT", get("PORT"), 5000)?;

        let public_base_url = get("PUBLIC_BASE_URL")
            .unwrap_or_else(|| format!("http://localhost:{port}"))
            .trim_end_matches('/')
            .to_string();
        if !public_base_url.starts_with("http://") && !public_base_url.starts_with("https://") {
            return Err(ConfigError::Invalid {
                var: "PUBLIC_BASE_URL",
                value: public_base_url,
                reason: "must start with http:// or https://".into(),
            });
        }

        let cors_origins = split_list(&get("CORS_ORIGINS").unwrap_or_else(|| "http://localhost:5173".into()));
        for origin in &cors_origins {
            if origin != "*" && axum::http::HeaderValue::from_str(origin).is_err() {
                return Err(ConfigError::Invalid {
                    var: "CORS_ORIGINS",
                    value: origin.clone(),
                    reason: "not a valid header value".into(),
                });
            }
        }

        let image_hosts = split_list(&get("IMAGE_HOSTS").unwrap_or_else(|| "self".into()))
            .iter()
            .map(|name| {
                HostKind::from_str(name).map_err(|reason| ConfigError::Invalid {
                    var: "IMAGE_HOSTS",
                    value: name.clone(),
                    reason,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mask_poll_max_attempts = parse_or("MASK_POLL_MAX_ATTEMPTS", get("MASK_POLL_MAX_ATTEMPTS"), 20)?;
        if mask_poll_max_attempts == 0 {
            return Err(ConfigError::Invalid {
                var: "MASK_POLL_MAX_ATTEMPTS",
                value: "0".into(),
                reason: "must be at least 1".into(),
            });
        }

        Ok(Self {
            host,
            port,
            public_base_url,
            cors_origins,
            request_timeout_secs: parse_or("REQUEST_TIMEOUT_SECS", get("REQUEST_TIMEOUT_SECS"), 30)?,
            max_body_bytes: parse_or("MAX_BODY_BYTES", get("MAX_BODY_BYTES"), 20 * 1024 * 1024)?,
            reimagine_api_url: get("REIMAGINEHOME_API_URL")
                .unwrap_or_else(|| DEFAULT_API_URL.into())
                .trim_end_matches('/')
                .to_string(),
            reimagine_api_key: get("REIMAGINEHOME_API_KEY"),
            mask_poll_interval_secs: parse_or("MASK_POLL_INTERVAL_SECS", get("MASK_POLL_INTERVAL_SECS"), 2)?,
            mask_poll_max_attempts,
            image_hosts,
            imgbb_api_key: get("IMGBB_API_KEY"),
            job_retention_secs: parse_or("JOB_RETENTION_SECS", get("JOB_RETENTION_SECS"), 3600)?,
            log_json: get("LOG_FORMAT").is_some_and(|v| v.eq_ignore_ascii_case("json")),
        })
    }

    /// Whether a staging provider API key is configured.
    pub fn api_configured(&self) -> bool {
        self.reimagine_api_key.is_some()
    }

    pub fn poll_config(&self) -> PollConfig {
        PollConfig {
            interval: Duration::from_secs(self.mask_poll_interval_secs),
            max_attempts: self.mask_poll_max_attempts,
        }
    }

    pub fn job_retention(&self) -> Duration {
        Duration::from_secs(self.job_retention_secs)
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_or<T>(var: &'static str, value: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        None => Ok(default),
        Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
            var,
            reason: e.to_string(),
            value: raw,
        }),
    }
}
