//! Process configuration from the environment.
//!
//! Every setting has a default; a value that fails to parse is replaced by
//! its default and reported as a [`ConfigError`].

use std::time::Duration;

use localcode_core::LogLevel;
use localcode_proxy::DEFAULT_BACKEND_URL;

use crate::commands::ServeArgs;
use crate::error::ConfigError;

pub const DEFAULT_PORT: u16 = 4242;
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Resolved settings for one run of the binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Backend base URL without trailing slash.
    pub backend_url: String,
    pub log_level: LogLevel,
    /// Empty means requests are sent without `Authorization`.
    pub api_key: String,
    pub upstream_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            log_level: LogLevel::Info,
            api_key: String::new(),
            upstream_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl Config {
    /// Load from process environment variables.
    ///
    /// Call `dotenvy::dotenv()` first for `.env` support.
    pub fn from_env() -> (Self, Vec<ConfigError>) {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> (Self, Vec<ConfigError>)
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let mut problems = Vec::new();

        if let Some(raw) = lookup("PORT") {
            match raw.trim().parse::<u16>() {
                Ok(port) if port > 0 => config.port = port,
                Ok(_) => problems.push(ConfigError::invalid("PORT", &raw, "port must be non-zero")),
                Err(e) => problems.push(ConfigError::invalid("PORT", &raw, e)),
            }
        }

        if let Some(raw) = lookup("HOST") {
            let host = raw.trim();
            if !host.is_empty() {
                config.host = host.to_string();
            }
        }

        if let Some(raw) = lookup("BACKEND_URL") {
            match normalize_backend_url(&raw) {
                Some(url) => config.backend_url = url,
                None => problems.push(ConfigError::invalid(
                    "BACKEND_URL",
                    &raw,
                    "expected an http(s) URL",
                )),
            }
        }

        if let Some(raw) = lookup("LOG_LEVEL") {
            match raw.parse::<LogLevel>() {
                Ok(level) => config.log_level = level,
                Err(e) => problems.push(ConfigError::invalid("LOG_LEVEL", &raw, e)),
            }
        }

        if let Some(raw) = lookup("API_KEY") {
            config.api_key = raw.trim().to_string();
        }

        if let Some(raw) = lookup("UPSTREAM_TIMEOUT_SECS") {
            match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => config.upstream_timeout = Duration::from_secs(secs),
                Ok(_) => problems.push(ConfigError::invalid(
                    "UPSTREAM_TIMEOUT_SECS",
                    &raw,
                    "timeout must be non-zero",
                )),
                Err(e) => problems.push(ConfigError::invalid("UPSTREAM_TIMEOUT_SECS", &raw, e)),
            }
        }

        (config, problems)
    }

    /// Apply `serve` flags on top of the environment.
    pub fn apply_serve_args(&mut self, args: &ServeArgs) {
        if let Some(host) = &args.host {
            self.host.clone_from(host);
        }
        if let Some(port) = args.port {
            self.port = port;
        }
        self.apply_backend_override(args.backend_url.as_deref());
    }

    /// Replace the backend URL when a usable override is given.
    pub fn apply_backend_override(&mut self, backend_url: Option<&str>) {
        if let Some(url) = backend_url.and_then(normalize_backend_url) {
            self.backend_url = url;
        }
    }

    /// `host:port` to bind.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn normalize_backend_url(raw: &str) -> Option<String> {
    let url = raw.trim().trim_end_matches('/');
    (url.starts_with("http://") || url.starts_with("https://")).then(|| url.to_string())
}
