//! Configuration layer: typed settings with layered precedence (file → env → CLI).

use std::{
    num::NonZeroUsize,
    str::FromStr,
    time::Duration,
};

use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use url::Url;

mod cli;

pub use cli::{CliArgs, Command, CreateArgs, GlobalOverrides, ShowArgs};

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "blogspace";
const DEFAULT_API_BASE_URL: &str = "http://localhost:3001";
const DEFAULT_STALE_TIME_SECS: u64 = 5 * 60;
const DEFAULT_RETRY: u32 = 2;
const MAX_RETRY: u32 = 10;
const DEFAULT_RETRY_DELAY_MS: u64 = 1000;
const DEFAULT_MAX_RETRY_DELAY_MS: u64 = 30_000;
const DEFAULT_DETAIL_ENTRY_LIMIT: u64 = 100;
const DEFAULT_WIDTH: u64 = 80;
const MIN_WIDTH: u64 = 40;
const MAX_WIDTH: u64 = 400;

/// Fully-resolved settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub api: ApiSettings,
    pub cache: CacheSettings,
    pub layout: LayoutSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub base_url: Url,
    /// Base of the links produced by the share action.
    pub share_base_url: Url,
}

#[derive(Debug, Clone)]
pub struct CacheSettings {
    pub stale_time: Duration,
    pub retry: u32,
    pub retry_delay: Duration,
    pub max_retry_delay: Duration,
    pub detail_entry_limit: NonZeroUsize,
}

#[derive(Debug, Clone, Copy)]
pub struct LayoutSettings {
    pub narrow: bool,
    pub width: usize,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix("BLOGSPACE").separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;
    raw.apply_overrides(&cli.overrides);

    Settings::from_raw(raw)
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    api: RawApiSettings,
    cache: RawCacheSettings,
    layout: RawLayoutSettings,
    logging: RawLoggingSettings,
}

impl RawSettings {
    fn apply_overrides(&mut self, overrides: &GlobalOverrides) {
        if let Some(url) = overrides.api_base_url.as_ref() {
            self.api.base_url = Some(url.clone());
        }
        if let Some(url) = overrides.share_base_url.as_ref() {
            self.api.share_base_url = Some(url.clone());
        }
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
        if let Some(narrow) = overrides.narrow {
            self.layout.narrow = Some(narrow);
        }
        if let Some(width) = overrides.width {
            self.layout.width = Some(width);
        }
        if let Some(retry) = overrides.cache_retry {
            self.cache.retry = Some(retry);
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            api,
            cache,
            layout,
            logging,
        } = raw;

        let api = build_api_settings(api)?;
        let cache = build_cache_settings(cache)?;
        let layout = build_layout_settings(layout)?;
        let logging = build_logging_settings(logging)?;

        Ok(Self {
            api,
            cache,
            layout,
            logging,
        })
    }
}

fn build_api_settings(api: RawApiSettings) -> Result<ApiSettings, LoadError> {
    let base_url = parse_http_url(
        api.base_url.as_deref().unwrap_or(DEFAULT_API_BASE_URL),
        "api.base_url",
    )?;
    let share_base_url = match api.share_base_url.as_deref() {
        Some(value) => parse_http_url(value, "api.share_base_url")?,
        None => base_url.clone(),
    };

    Ok(ApiSettings {
        base_url,
        share_base_url,
    })
}

fn build_cache_settings(cache: RawCacheSettings) -> Result<CacheSettings, LoadError> {
    let retry = cache.retry.unwrap_or(DEFAULT_RETRY);
    if retry > MAX_RETRY {
        return Err(LoadError::invalid(
            "cache.retry",
            format!("must not exceed {MAX_RETRY}"),
        ));
    }

    let retry_delay = Duration::from_millis(cache.retry_delay_ms.unwrap_or(DEFAULT_RETRY_DELAY_MS));
    let max_retry_delay = Duration::from_millis(
        cache
            .max_retry_delay_ms
            .unwrap_or(DEFAULT_MAX_RETRY_DELAY_MS),
    );
    if max_retry_delay < retry_delay {
        return Err(LoadError::invalid(
            "cache.max_retry_delay_ms",
            "must not be smaller than cache.retry_delay_ms",
        ));
    }

    let detail_entry_limit = non_zero_usize(
        cache
            .detail_entry_limit
            .unwrap_or(DEFAULT_DETAIL_ENTRY_LIMIT),
        "cache.detail_entry_limit",
    )?;

    Ok(CacheSettings {
        stale_time: Duration::from_secs(
            cache.stale_time_seconds.unwrap_or(DEFAULT_STALE_TIME_SECS),
        ),
        retry,
        retry_delay,
        max_retry_delay,
        detail_entry_limit,
    })
}

fn build_layout_settings(layout: RawLayoutSettings) -> Result<LayoutSettings, LoadError> {
    let width = layout.width.unwrap_or(DEFAULT_WIDTH);
    if !(MIN_WIDTH..=MAX_WIDTH).contains(&width) {
        return Err(LoadError::invalid(
            "layout.width",
            format!("must be between {MIN_WIDTH} and {MAX_WIDTH} columns"),
        ));
    }
    let width = usize::try_from(width)
        .map_err(|_| LoadError::invalid("layout.width", "value exceeds supported range"))?;

    Ok(LayoutSettings {
        narrow: layout.narrow.unwrap_or(false),
        width,
    })
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::WARN,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawApiSettings {
    base_url: Option<String>,
    share_base_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawCacheSettings {
    stale_time_seconds: Option<u64>,
    retry: Option<u32>,
    retry_delay_ms: Option<u64>,
    max_retry_delay_ms: Option<u64>,
    detail_entry_limit: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLayoutSettings {
    narrow: Option<bool>,
    width: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

fn parse_http_url(value: &str, key: &'static str) -> Result<Url, LoadError> {
    let url = Url::parse(value.trim())
        .map_err(|err| LoadError::invalid(key, format!("invalid URL `{value}`: {err}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(LoadError::invalid(
            key,
            format!("unsupported scheme `{other}`; expected http or https"),
        )),
    }
}

fn non_zero_usize(value: u64, key: &'static str) -> Result<NonZeroUsize, LoadError> {
    let value: usize = value
        .try_into()
        .map_err(|_| LoadError::invalid(key, "value exceeds supported range for usize"))?;
    NonZeroUsize::new(value).ok_or_else(|| LoadError::invalid(key, "must be greater than zero"))
}

/// Resolve configuration using the process arguments, returning both for downstream use.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    use clap::Parser;

    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}
