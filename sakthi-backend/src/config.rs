use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use serde::Deserialize;
use thiserror::Error;

use crate::password::HashCost;
use crate::sessions::MAX_SESSION_TTL;

const DEFAULT_SESSION_TTL: &str = "31d";
const DEFAULT_PURGE_INTERVAL: &str = "10m";
const MIN_SECRET_LEN: usize = 32;
const SECURE_COOKIE_ENV: &str = "SAKTHI_SECURE_COOKIE";

#[derive(Debug, Parser)]
#[command(
    name = "sakthi-backend",
    version,
    about = "Session-authenticated catalog API for the Sakthi Sai Biotech site"
)]
pub struct Cli {
    #[arg(long, value_name = "ADDR")]
    pub bind: Option<SocketAddr>,

    #[arg(long, value_name = "FILE")]
    pub seed_file: Option<PathBuf>,

    /// Session lifetime, e.g. `31d` or `12h`.
    #[arg(long, value_name = "DURATION")]
    pub session_ttl: Option<String>,

    #[arg(long, short = 'c', value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind: SocketAddr,
    pub seed_file: Option<PathBuf>,
    pub session_secret: Option<String>,
    pub session_ttl: Duration,
    pub session_purge_interval: Duration,
    pub secure_cookie: bool,
    pub password_cost: HashCost,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid config in {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
    #[error("env var {key} is not valid unicode")]
    NonUnicodeEnv { key: String },
    #[error("invalid boolean value for env var {key}: {value}")]
    InvalidEnvBool { key: String, value: String },
    #[error("invalid duration for {key}: {value}")]
    InvalidDuration { key: &'static str, value: String },
    #[error("{key} must be between 1s and {max}, got {value}")]
    DurationOutOfRange {
        key: &'static str,
        value: String,
        max: String,
    },
    #[error("session secret must be at least {MIN_SECRET_LEN} bytes")]
    SecretTooShort,
}

#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    bind: Option<SocketAddr>,
    seed_file: Option<PathBuf>,
    session_secret: Option<String>,
    session_ttl: Option<String>,
    session_purge_interval: Option<String>,
    secure_cookie: Option<bool>,
    password: Option<HashCost>,
}

impl AppConfig {
    pub fn from_cli(cli: Cli) -> Result<Self, ConfigError> {
        let from_file = read_file_config(cli.config.as_deref())?;

        let bind = cli
            .bind
            .or(from_file.bind)
            .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 5000)));
        let seed_file = cli.seed_file.or(from_file.seed_file);

        let session_secret = read_env_string("SAKTHI_SESSION_SECRET")?
            .or(from_file.session_secret)
            .filter(|secret| !secret.is_empty());
        if session_secret
            .as_ref()
            .is_some_and(|secret| secret.len() < MIN_SECRET_LEN)
        {
            return Err(ConfigError::SecretTooShort);
        }

        let session_ttl = parse_session_ttl(
            cli.session_ttl
                .as_deref()
                .or(from_file.session_ttl.as_deref())
                .unwrap_or(DEFAULT_SESSION_TTL),
        )?;
        let session_purge_interval = parse_duration(
            "session_purge_interval",
            from_file
                .session_purge_interval
                .as_deref()
                .unwrap_or(DEFAULT_PURGE_INTERVAL),
        )?
        .max(Duration::from_secs(1));

        let secure_cookie = read_env_flag(SECURE_COOKIE_ENV)?
            .or(from_file.secure_cookie)
            .unwrap_or(false);

        Ok(Self {
            bind,
            seed_file,
            session_secret,
            session_ttl,
            session_purge_interval,
            secure_cookie,
            password_cost: from_file.password.unwrap_or_default(),
        })
    }
}

fn read_file_config(path: Option<&Path>) -> Result<FileConfig, ConfigError> {
    let Some(path) = path else {
        return Ok(FileConfig::default());
    };

    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;

    toml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })
}

fn parse_duration(key: &'static str, raw: &str) -> Result<Duration, ConfigError> {
    humantime::parse_duration(raw.trim()).map_err(|_| ConfigError::InvalidDuration {
        key,
        value: String::from(raw),
    })
}

/// Session lifetimes must be non-zero and fit the store's cap.
fn parse_session_ttl(raw: &str) -> Result<Duration, ConfigError> {
    let ttl = parse_duration("session_ttl", raw)?;
    if ttl.is_zero() || ttl > MAX_SESSION_TTL {
        return Err(ConfigError::DurationOutOfRange {
            key: "session_ttl",
            value: String::from(raw.trim()),
            max: humantime::format_duration(MAX_SESSION_TTL).to_string(),
        });
    }
    Ok(ttl)
}

fn read_env_string(key: &str) -> Result<Option<String>, ConfigError> {
    match std::env::var(key) {
        Ok(value) => Ok(Some(value)),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(std::env::VarError::NotUnicode(_)) => Err(ConfigError::NonUnicodeEnv {
            key: String::from(key),
        }),
    }
}

fn read_env_flag(key: &str) -> Result<Option<bool>, ConfigError> {
    match read_env_string(key)? {
        Some(raw) => parse_flag(key, &raw).map(Some),
        None => Ok(None),
    }
}

/// On/off switch from an env var. Matching is case-insensitive and ignores padding.
fn parse_flag(key: &str, raw: &str) -> Result<bool, ConfigError> {
    const ON: [&str; 4] = ["1", "true", "yes", "on"];
    const OFF: [&str; 4] = ["0", "false", "no", "off"];

    let value = raw.trim();
    if ON.iter().any(|on| value.eq_ignore_ascii_case(on)) {
        Ok(true)
    } else if OFF.iter().any(|off| value.eq_ignore_ascii_case(off)) {
        Ok(false)
    } else {
        Err(ConfigError::InvalidEnvBool {
            key: String::from(key),
            value: String::from(raw),
        })
    }
}
