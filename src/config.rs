// 运行配置
//
// 从环境变量读取（main 中先加载 .env），时间常量和布局阈值也集中在这里

use std::time::Duration;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("TMDB_API_KEY is not configured")]
    MissingApiKey,

    #[error("Invalid {name}: {value} ({reason})")]
    InvalidUrl {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("Invalid {name}: {value}")]
    InvalidNumber { name: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct DiscoverConfig {
    /// 每个请求都会带上的静态凭证
    pub api_key: String,
    pub base_url: String,
    pub image_base_url: String,
    pub language: String,
    pub keyword_debounce: Duration,
    pub resize_debounce: Duration,
    /// 小于等于该宽度使用紧凑（横向）卡片
    pub compact_breakpoint: u32,
    pub suggestion_limit: usize,
    pub overview_limit: usize,
    pub viewport_width: u32,
    pub viewport_height: u32,
}

impl DiscoverConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: "https://api.themoviedb.org/3".to_string(),
            image_base_url: "https://image.tmdb.org/t/p/w500".to_string(),
            language: "en-US".to_string(),
            keyword_debounce: Duration::from_millis(300),
            resize_debounce: Duration::from_millis(250),
            compact_breakpoint: 768,
            suggestion_limit: 5,
            overview_limit: 150,
            viewport_width: 1024,
            viewport_height: 768,
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// 通过任意查找函数读取配置，便于测试
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("TMDB_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        let mut config = Self::new(api_key.trim());

        if let Some(base_url) = lookup("TMDB_BASE_URL") {
            config.base_url = parse_url("TMDB_BASE_URL", &base_url)?;
        }
        if let Some(image_base_url) = lookup("TMDB_IMAGE_BASE_URL") {
            config.image_base_url = parse_url("TMDB_IMAGE_BASE_URL", &image_base_url)?;
        }
        if let Some(language) = lookup("TMDB_LANGUAGE").filter(|l| !l.trim().is_empty()) {
            config.language = language.trim().to_string();
        }
        if let Some(width) = lookup("DISCOVER_VIEWPORT_WIDTH") {
            config.viewport_width = parse_number("DISCOVER_VIEWPORT_WIDTH", &width)?;
        }
        if let Some(height) = lookup("DISCOVER_VIEWPORT_HEIGHT") {
            config.viewport_height = parse_number("DISCOVER_VIEWPORT_HEIGHT", &height)?;
        }

        Ok(config)
    }
}

fn parse_url(name: &'static str, value: &str) -> Result<String, ConfigError> {
    let url = Url::parse(value.trim()).map_err(|e| ConfigError::InvalidUrl {
        name,
        value: value.to_string(),
        reason: e.to_string(),
    })?;
    Ok(url.as_str().trim_end_matches('/').to_string())
}

fn parse_number(name: &'static str, value: &str) -> Result<u32, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidNumber {
        name,
        value: value.to_string(),
    })
}
