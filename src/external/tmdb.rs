use chrono::NaiveDate;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::error::FetchError;
use crate::config::DiscoverConfig;
use crate::models::{CatalogQuery, Country, KeywordSuggestion, MovieRecord, ResultPage};

/// 关键词搜索的最短输入长度
pub const MIN_KEYWORD_QUERY_LEN: usize = 2;

/// TMDB API客户端
#[derive(Clone)]
pub struct TmdbClient {
    client: Client,
    api_key: String,
    base_url: String,
    language: String,
}

impl TmdbClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: "https://api.themoviedb.org/3".to_string(),
            language: "en-US".to_string(),
        }
    }

    pub fn from_config(config: &DiscoverConfig) -> Self {
        Self::new(config.api_key.clone())
            .with_base_url(config.base_url.clone())
            .with_language(config.language.clone())
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// 发送 GET 请求并解析 JSON，凭证参数附加在每个请求上
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, FetchError> {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str())])
            .query(params)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FetchError::Http(response.status().as_u16()));
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// 按筛选条件发现电影
    pub async fn discover_movies(&self, query: &CatalogQuery) -> Result<ResultPage, FetchError> {
        let mut params = vec![("language", self.language.clone())];
        params.extend(query.to_params());
        tracing::debug!("Discover request params: {:?}", params);

        let response: TmdbDiscoverResponse = self.get_json("/discover/movie", &params).await?;
        Ok(TmdbConverter::discover_to_page(response))
    }

    /// 获取国家列表，按英文名排序
    pub async fn list_countries(&self) -> Result<Vec<Country>, FetchError> {
        let countries: Vec<TmdbCountry> = self.get_json("/configuration/countries", &[]).await?;
        Ok(TmdbConverter::countries_sorted(countries))
    }

    /// 搜索关键词；输入过短时直接返回空列表
    pub async fn search_keywords(&self, text: &str) -> Result<Vec<KeywordSuggestion>, FetchError> {
        let text = text.trim();
        if text.chars().count() < MIN_KEYWORD_QUERY_LEN {
            return Ok(Vec::new());
        }

        let response: TmdbKeywordSearchResponse = self
            .get_json("/search/keyword", &[("query", text.to_string())])
            .await?;
        Ok(response
            .results
            .into_iter()
            .map(|k| KeywordSuggestion { id: k.id, name: k.name })
            .collect())
    }
}

/// TMDB发现接口响应
#[derive(Debug, Deserialize, Serialize)]
pub struct TmdbDiscoverResponse {
    pub page: u32,
    #[serde(default)]
    pub results: Vec<TmdbMovie>,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_results: u32,
}

/// TMDB电影基本信息
#[derive(Debug, Deserialize, Serialize)]
pub struct TmdbMovie {
    pub id: u32,
    #[serde(default)]
    pub title: Option<String>,
    pub overview: Option<String>,
    pub release_date: Option<String>,
    pub poster_path: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f64>,
}

/// TMDB国家
#[derive(Debug, Deserialize, Serialize)]
pub struct TmdbCountry {
    pub iso_3166_1: String,
    pub english_name: String,
    #[serde(default)]
    pub native_name: Option<String>,
}

/// TMDB关键词搜索响应
#[derive(Debug, Deserialize, Serialize)]
pub struct TmdbKeywordSearchResponse {
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub results: Vec<TmdbKeyword>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct TmdbKeyword {
    pub id: u32,
    pub name: String,
}

/// 转换器：将TMDB数据转换为内部数据模型
pub struct TmdbConverter;

impl TmdbConverter {
    pub fn discover_to_page(response: TmdbDiscoverResponse) -> ResultPage {
        ResultPage {
            page: response.page.max(1),
            total_pages: response.total_pages.max(1),
            results: response.results.into_iter().map(Self::movie_to_record).collect(),
        }
    }

    /// 缺失或为空字符串的字段统一映射为 None
    pub fn movie_to_record(movie: TmdbMovie) -> MovieRecord {
        let release_date = non_empty(movie.release_date).and_then(|date| {
            NaiveDate::parse_from_str(&date, "%Y-%m-%d")
                .map_err(|e| tracing::debug!("Unparseable release date {:?} for movie {}: {}", date, movie.id, e))
                .ok()
        });

        MovieRecord {
            id: movie.id,
            title: movie.title.unwrap_or_default(),
            overview: non_empty(movie.overview),
            poster_path: non_empty(movie.poster_path),
            release_date,
            vote_average: movie.vote_average.unwrap_or(0.0).clamp(0.0, 10.0),
        }
    }

    pub fn countries_sorted(countries: Vec<TmdbCountry>) -> Vec<Country> {
        let mut countries: Vec<Country> = countries
            .into_iter()
            .map(|c| Country {
                iso_3166_1: c.iso_3166_1,
                english_name: c.english_name,
            })
            .collect();
        countries.sort_by_cached_key(|c| c.english_name.to_lowercase());
        countries
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
