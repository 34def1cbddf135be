use crate::api::RedditCredentials;
use crate::error::{Result, ScannerError};
use crate::notifier::DEFAULT_HEADER;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    File(PathBuf),
    Sqlite(String),
    Redis { url: String, key: String },
}

/// 一轮扫描的固定参数
#[derive(Debug, Clone)]
pub struct ScanSettings {
    pub scope: String,
    pub query: String,
    pub limit: u32,
    pub header: String,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            scope: "all".to_string(),
            query: "Sora invite code".to_string(),
            limit: 10,
            header: DEFAULT_HEADER.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub credentials: RedditCredentials,
    pub webhook_url: String,
    pub scan: ScanSettings,
    pub storage: StorageBackend,
    pub interval: Duration,
    pub poll_tick: Duration,
    pub http_timeout: Duration,
    pub run_on_start: bool,
}

impl Config {
    /// 从环境变量读取配置（调用方负责先加载 `.env`）
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &str| {
            get(key).ok_or_else(|| ScannerError::Config(format!("缺少环境变量 {}", key)))
        };

        let credentials = RedditCredentials {
            client_id: required("REDDIT_CLIENT_ID")?,
            client_secret: required("REDDIT_CLIENT_SECRET")?,
            user_agent: get("REDDIT_USER_AGENT").unwrap_or_else(|| "sora-scanner/0.1".to_string()),
        };
        let webhook_url = required("DISCORD_WEBHOOK_URL")?;

        let defaults = ScanSettings::default();
        let scan = ScanSettings {
            scope: get("SUBREDDIT").unwrap_or(defaults.scope),
            query: get("SEARCH_QUERY").unwrap_or(defaults.query),
            limit: parse_positive(&get, "POST_LIMIT", defaults.limit)?,
            header: get("NOTIFY_HEADER").unwrap_or(defaults.header),
        };

        let storage_type = get("STORAGE_TYPE").unwrap_or_else(|| "file".to_string());
        let storage = match storage_type.to_ascii_lowercase().as_str() {
            "file" => StorageBackend::File(PathBuf::from(
                get("CODES_FILE").unwrap_or_else(|| "codes.txt".to_string()),
            )),
            "sqlite" => StorageBackend::Sqlite(
                get("DATABASE_URL").unwrap_or_else(|| "sqlite:codes.db?mode=rwc".to_string()),
            ),
            "redis" => StorageBackend::Redis {
                url: get("REDIS_URL").unwrap_or_else(|| "redis://127.0.0.1:6379".to_string()),
                key: get("REDIS_KEY").unwrap_or_else(|| "sora:codes".to_string()),
            },
            other => {
                return Err(ScannerError::Config(format!("未知的存储后端: {}", other)));
            }
        };

        Ok(Self {
            credentials,
            webhook_url,
            scan,
            storage,
            interval: Duration::from_secs(parse_positive(&get, "SCAN_INTERVAL_SECS", 3600)?),
            poll_tick: Duration::from_secs(parse_positive(&get, "POLL_TICK_SECS", 60)?),
            http_timeout: Duration::from_secs(parse_positive(&get, "HTTP_TIMEOUT_SECS", 30)?),
            run_on_start: parse_or(&get, "RUN_ON_START", true)?,
        })
    }
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| ScannerError::Config(format!("{} 无效 ({:?}): {}", key, raw, e))),
        None => Ok(default),
    }
}

fn parse_positive<T, G>(get: &G, key: &str, default: T) -> Result<T>
where
    T: FromStr + PartialEq + Default,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    let value: T = parse_or(get, key, default)?;
    if value == T::default() {
        return Err(ScannerError::Config(format!("{} 必须大于 0", key)));
    }
    Ok(value)
}
