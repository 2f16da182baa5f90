//! Configuration module
//!
//! Client and polling settings, loaded from the environment (with `.env`
//! support) or built directly in code.

use std::env;
use std::time::Duration;

const DEFAULT_ENDPOINT: &str = "https://cca-eu-west-1.saas-stage.infomaker.io";
const REQUEST_TIMEOUT_SECS: u64 = 60;
const POLL_INTERVAL_MS: u64 = 1000;
const POLL_BACKOFF_MULTIPLIER: f64 = 1.0;
const POLL_MAX_INTERVAL_MS: u64 = 30_000;
const MIN_POLL_INTERVAL_MS: u64 = 10;

/// What the poll loop does when the service reports `ERROR`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ErrorStatusPolicy {
    /// Treat `ERROR` as transient and keep polling (historical client behavior).
    #[default]
    Retry,
    /// Stop polling and fail the upload with the service's message.
    Fail,
}

/// Timing policy for the status poll loop.
///
/// Defaults reproduce a fixed one second interval with no backoff and no
/// overall limit; cancellation is then the only way to bound an upload.
#[derive(Debug, Clone, PartialEq)]
pub struct PollConfig {
    pub interval: Duration,
    /// Factor applied to the delay after every non-terminal poll. 1.0 = fixed interval.
    pub backoff_multiplier: f64,
    pub max_interval: Duration,
    /// Upper bound on time spent polling. `None` polls until a terminal status.
    pub max_duration: Option<Duration>,
    pub error_policy: ErrorStatusPolicy,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(POLL_INTERVAL_MS),
            backoff_multiplier: POLL_BACKOFF_MULTIPLIER,
            max_interval: Duration::from_millis(POLL_MAX_INTERVAL_MS),
            max_duration: None,
            error_policy: ErrorStatusPolicy::Retry,
        }
    }
}

impl PollConfig {
    /// Fixed-interval config, mostly useful in tests.
    pub fn with_interval(interval: Duration) -> Self {
        Self {
            interval,
            ..Self::default()
        }
    }

    /// Delay before the poll following the `attempt`-th (zero based) non-terminal status.
    ///
    /// Never shorter than 10ms, so a config that skipped `validate()` cannot spin.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let floor = Duration::from_millis(MIN_POLL_INTERVAL_MS);
        if self.backoff_multiplier.is_nan() || self.backoff_multiplier <= 1.0 {
            return self.interval.max(floor);
        }

        let factor = self.backoff_multiplier.powi(attempt.min(i32::MAX as u32) as i32);
        let delay = self.interval.as_secs_f64() * factor;
        if !delay.is_finite() || delay >= self.max_interval.as_secs_f64() {
            return self.max_interval.max(self.interval).max(floor);
        }

        Duration::from_secs_f64(delay).max(floor)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.interval.is_zero() {
            return Err(anyhow::anyhow!("Poll interval must be greater than zero"));
        }

        if !self.backoff_multiplier.is_finite() || self.backoff_multiplier < 1.0 {
            return Err(anyhow::anyhow!(
                "Poll backoff multiplier must be a finite number >= 1.0"
            ));
        }

        if let Some(max) = self.max_duration {
            if max.is_zero() {
                return Err(anyhow::anyhow!(
                    "Poll max duration must be greater than zero when set"
                ));
            }
        }

        Ok(())
    }
}

/// Settings for talking to the files service.
#[derive(Clone)]
pub struct ClientConfig {
    pub endpoint: String,
    /// Pre-acquired bearer token. Acquiring it is the caller's business.
    pub access_token: Option<String>,
    pub request_timeout: Duration,
    pub poll: PollConfig,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("endpoint", &self.endpoint)
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("request_timeout", &self.request_timeout)
            .field("poll", &self.poll)
            .finish()
    }
}

impl ClientConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            access_token: None,
            request_timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
            poll: PollConfig::default(),
        }
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Load from environment: CCA_ENDPOINT, CCA_ACCESS_TOKEN, CCA_REQUEST_TIMEOUT_SECS,
    /// CCA_POLL_INTERVAL_MS, CCA_POLL_BACKOFF, CCA_POLL_MAX_INTERVAL_MS,
    /// CCA_POLL_MAX_DURATION_SECS, CCA_FAIL_ON_ERROR_STATUS.
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. `from_env` uses the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let endpoint = lookup("CCA_ENDPOINT")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

        let access_token = lookup("CCA_ACCESS_TOKEN").filter(|v| !v.is_empty());

        let request_timeout = Duration::from_secs(
            lookup("CCA_REQUEST_TIMEOUT_SECS")
                .unwrap_or_else(|| REQUEST_TIMEOUT_SECS.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("CCA_REQUEST_TIMEOUT_SECS must be a valid number"))?,
        );

        let interval = Duration::from_millis(
            lookup("CCA_POLL_INTERVAL_MS")
                .unwrap_or_else(|| POLL_INTERVAL_MS.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("CCA_POLL_INTERVAL_MS must be a valid number"))?,
        );

        let backoff_multiplier: f64 = lookup("CCA_POLL_BACKOFF")
            .unwrap_or_else(|| POLL_BACKOFF_MULTIPLIER.to_string())
            .parse()
            .map_err(|_| anyhow::anyhow!("CCA_POLL_BACKOFF must be a valid number"))?;

        let max_interval = Duration::from_millis(
            lookup("CCA_POLL_MAX_INTERVAL_MS")
                .unwrap_or_else(|| POLL_MAX_INTERVAL_MS.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("CCA_POLL_MAX_INTERVAL_MS must be a valid number"))?,
        );

        let max_duration = match lookup("CCA_POLL_MAX_DURATION_SECS") {
            Some(v) if !v.trim().is_empty() => Some(Duration::from_secs(v.parse().map_err(
                |_| anyhow::anyhow!("CCA_POLL_MAX_DURATION_SECS must be a valid number"),
            )?)),
            _ => None,
        };

        let error_policy = match lookup("CCA_FAIL_ON_ERROR_STATUS")
            .map(|v| v.to_lowercase())
            .as_deref()
        {
            Some("true") | Some("1") | Some("yes") => ErrorStatusPolicy::Fail,
            Some("false") | Some("0") | Some("no") | Some("") | None => ErrorStatusPolicy::Retry,
            Some(other) => {
                return Err(anyhow::anyhow!(
                    "CCA_FAIL_ON_ERROR_STATUS must be true or false, got {}",
                    other
                ))
            }
        };

        let config = Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            access_token,
            request_timeout,
            poll: PollConfig {
                interval,
                backoff_multiplier,
                max_interval,
                max_duration,
                error_policy,
            },
        };
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !(self.endpoint.starts_with("http://") || self.endpoint.starts_with("https://")) {
            return Err(anyhow::anyhow!(
                "CCA_ENDPOINT must be an http(s) URL, got {}",
                self.endpoint
            ));
        }

        self.poll.validate()
    }
}
