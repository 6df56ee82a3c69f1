// ABOUTME: Environment-based server configuration with fatal validation of Supabase credentials
// ABOUTME: Reads .env, process environment, then a TOML secrets file for SUPABASE_URL / SUPABASE_KEY
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Trainer Portal Contributors

//! Server configuration
//!
//! The two Supabase connection parameters are mandatory. They are read from
//! the process environment (after loading an optional `.env` file) and, for
//! each value still missing, from a TOML secrets file. Absence of either is a
//! fatal startup error carrying remediation steps for the operator.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::errors::{AppError, AppResult};

/// Environment variable holding the Supabase project URL
pub const SUPABASE_URL_VAR: &str = "SUPABASE_URL";
/// Environment variable holding the Supabase API key
pub const SUPABASE_KEY_VAR: &str = "SUPABASE_KEY";
/// Environment variable overriding the secrets file location
pub const SECRETS_FILE_VAR: &str = "PORTAL_SECRETS_FILE";
/// Secrets file used when `PORTAL_SECRETS_FILE` is unset
pub const DEFAULT_SECRETS_FILE: &str = ".secrets.toml";

const DEFAULT_HTTP_PORT: u16 = 8501;
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_SESSION_CAPACITY: usize = 10_000;
const DEFAULT_SESSION_MAX_AGE_SECS: i64 = 60 * 60 * 24 * 7;

/// Output format for log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Pretty,
    /// One JSON object per line
    Json,
}

impl LogFormat {
    /// Parse `pretty` / `json`, defaulting to pretty
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Pretty,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LoggingConfig {
    /// `RUST_LOG` directive, e.g. `trainer_portal=debug`, when set
    pub filter: Option<String>,
    /// Line format
    pub format: LogFormat,
    /// Lower the default level to debug when no directive is set
    pub verbose: bool,
}

impl LoggingConfig {
    /// Directive handed to `EnvFilter`
    #[must_use]
    pub fn directive(&self) -> &str {
        self.filter
            .as_deref()
            .unwrap_or(if self.verbose { "debug" } else { "info" })
    }
}

/// Connection parameters for the hosted Supabase project
#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    /// Project URL, e.g. `https://abc.supabase.co`
    pub url: Url,
    /// Anon (or service) API key sent as `apikey`
    pub api_key: String,
    /// Per-request timeout owned by the HTTP client
    pub timeout: Duration,
}

/// Browser session settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Maximum number of live sessions kept in memory
    pub capacity: usize,
    /// Cookie lifetime in seconds
    pub max_age_secs: i64,
    /// Whether the session cookie carries the `Secure` flag
    pub secure_cookies: bool,
}

/// Complete server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Interface to bind
    pub host: String,
    /// HTTP port
    pub http_port: u16,
    /// Supabase connection
    pub supabase: SupabaseConfig,
    /// Session cookie and table settings
    pub session: SessionConfig,
    /// Logging settings
    pub logging: LoggingConfig,
}

#[derive(Debug, Default, Deserialize)]
struct SecretsFile {
    #[serde(rename = "SUPABASE_URL")]
    supabase_url: Option<String>,
    #[serde(rename = "SUPABASE_KEY")]
    supabase_key: Option<String>,
}

impl ServerConfig {
    /// Load configuration from `.env`, the process environment and the secrets file
    ///
    /// # Errors
    ///
    /// Returns a fatal configuration error when the Supabase URL or key is
    /// missing, or when a value cannot be parsed.
    pub fn from_env() -> AppResult<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            debug!(path = %path.display(), "Loaded .env file");
        }
        let vars: HashMap<String, String> = env::vars().collect();
        Self::from_vars(&vars)
    }

    /// Build configuration from an explicit variable map
    ///
    /// # Errors
    ///
    /// Same as [`ServerConfig::from_env`].
    pub fn from_vars(vars: &HashMap<String, String>) -> AppResult<Self> {
        let get = |key: &str| {
            vars.get(key)
                .map(|v| v.trim().to_owned())
                .filter(|v| !v.is_empty())
        };

        let secrets_path =
            get(SECRETS_FILE_VAR).map_or_else(|| PathBuf::from(DEFAULT_SECRETS_FILE), PathBuf::from);

        let mut url = get(SUPABASE_URL_VAR);
        let mut key = get(SUPABASE_KEY_VAR);
        if url.is_none() || key.is_none() {
            let secrets = read_secrets_file(&secrets_path)?;
            url = url.or_else(|| non_blank(secrets.supabase_url));
            key = key.or_else(|| non_blank(secrets.supabase_key));
        }

        let (Some(url), Some(api_key)) = (url, key) else {
            return Err(AppError::config(missing_credentials_message(&secrets_path)));
        };

        let url = Url::parse(&url).map_err(|e| {
            AppError::config_invalid(format!("{SUPABASE_URL_VAR} is not a valid URL: {e}"))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(AppError::config_invalid(format!(
                "{SUPABASE_URL_VAR} must use http or https, got '{}'",
                url.scheme()
            )));
        }

        let http_port = parse_or(get("HTTP_PORT"), "HTTP_PORT", DEFAULT_HTTP_PORT)?;
        let timeout_secs = parse_or(
            get("SUPABASE_TIMEOUT_SECS"),
            "SUPABASE_TIMEOUT_SECS",
            DEFAULT_TIMEOUT_SECS,
        )?;
        let capacity = parse_or(
            get("SESSION_CAPACITY"),
            "SESSION_CAPACITY",
            DEFAULT_SESSION_CAPACITY,
        )?;
        // Only an explicit http:// public URL drops the Secure flag
        let secure_cookies = get("BASE_URL").map_or(true, |u| !u.starts_with("http://"));

        Ok(Self {
            host: get("HOST").unwrap_or_else(|| DEFAULT_HOST.to_owned()),
            http_port,
            supabase: SupabaseConfig {
                url,
                api_key,
                timeout: Duration::from_secs(timeout_secs),
            },
            session: SessionConfig {
                capacity,
                max_age_secs: DEFAULT_SESSION_MAX_AGE_SECS,
                secure_cookies,
            },
            logging: LoggingConfig {
                filter: get("RUST_LOG"),
                format: get("LOG_FORMAT")
                    .map(|v| LogFormat::parse(&v))
                    .unwrap_or_default(),
                verbose: false,
            },
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

fn read_secrets_file(path: &Path) -> AppResult<SecretsFile> {
    if !path.exists() {
        return Ok(SecretsFile::default());
    }
    let content = fs::read_to_string(path).map_err(|e| {
        AppError::config_invalid(format!(
            "Failed to read secrets file {}: {e}",
            path.display()
        ))
    })?;
    toml::from_str(&content).map_err(|e| {
        AppError::config_invalid(format!(
            "Secrets file {} is not valid TOML: {e}",
            path.display()
        ))
    })
}

fn parse_or<T: std::str::FromStr>(value: Option<String>, name: &str, default: T) -> AppResult<T> {
    value.map_or(Ok(default), |v| {
        v.parse()
            .map_err(|_| AppError::config_invalid(format!("{name} has an invalid value: '{v}'")))
    })
}

fn missing_credentials_message(secrets_path: &Path) -> String {
    format!(
        "Please set {SUPABASE_URL_VAR} and {SUPABASE_KEY_VAR} in your .env file or secrets file.\n\
         For local development: create a .env file with your Supabase credentials (see .env.example).\n\
         For hosted deployments: set them in the environment or in {}.",
        secrets_path.display()
    )
}
