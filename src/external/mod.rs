pub mod cache;
pub mod error;
pub mod tmdb;

use async_trait::async_trait;
use std::sync::Arc;

pub use cache::{CacheStats, SessionCache};
pub use error::FetchError;
pub use tmdb::{TmdbClient, TmdbConverter, MIN_KEYWORD_QUERY_LEN};

use crate::models::{CatalogQuery, Country, KeywordSuggestion, ResultPage};

/// 远程电影目录的三个只读接口
#[async_trait]
pub trait CatalogApi: Send + Sync {
    async fn discover_movies(&self, query: &CatalogQuery) -> Result<ResultPage, FetchError>;

    async fn list_countries(&self) -> Result<Vec<Country>, FetchError>;

    async fn search_keywords(&self, text: &str) -> Result<Vec<KeywordSuggestion>, FetchError>;
}

#[async_trait]
impl CatalogApi for TmdbClient {
    async fn discover_movies(&self, query: &CatalogQuery) -> Result<ResultPage, FetchError> {
        TmdbClient::discover_movies(self, query).await
    }

    async fn list_countries(&self) -> Result<Vec<Country>, FetchError> {
        TmdbClient::list_countries(self).await
    }

    async fn search_keywords(&self, text: &str) -> Result<Vec<KeywordSuggestion>, FetchError> {
        TmdbClient::search_keywords(self, text).await
    }
}

/// 目录客户端外观：请求失败在这里被记录并转换为空结果，
/// 调用方无需区分"没有结果"和"请求失败"
#[derive(Clone)]
pub struct Catalog {
    api: Arc<dyn CatalogApi>,
    countries: SessionCache<Vec<Country>>,
}

impl Catalog {
    pub fn new(api: Arc<dyn CatalogApi>) -> Self {
        Self {
            api,
            countries: SessionCache::new(),
        }
    }

    /// 获取一页发现结果；失败时返回 None
    pub async fn discover_movies(&self, query: &CatalogQuery) -> Option<ResultPage> {
        match self.api.discover_movies(query).await {
            Ok(page) => {
                tracing::debug!(
                    "Discover page {}/{} returned {} movies",
                    page.page,
                    page.total_pages,
                    page.results.len()
                );
                Some(page)
            }
            Err(e) => {
                tracing::warn!("Discover request for page {} failed: {}", query.page, e);
                None
            }
        }
    }

    /// 国家列表（会话内只请求一次）
    pub async fn list_countries(&self) -> Vec<Country> {
        let api = self.api.clone();
        match self
            .countries
            .get_or_try_fill(|| async move { api.list_countries().await })
            .await
        {
            Ok(countries) => countries,
            Err(e) => {
                tracing::warn!("Failed to fetch countries: {}", e);
                Vec::new()
            }
        }
    }

    /// 关键词搜索；输入过短或失败时返回空列表
    pub async fn search_keywords(&self, text: &str) -> Vec<KeywordSuggestion> {
        if text.trim().chars().count() < MIN_KEYWORD_QUERY_LEN {
            return Vec::new();
        }

        match self.api.search_keywords(text).await {
            Ok(keywords) => keywords,
            Err(e) => {
                tracing::warn!("Keyword search for {:?} failed: {}", text, e);
                Vec::new()
            }
        }
    }

    pub fn country_cache_stats(&self) -> CacheStats {
        self.countries.stats()
    }
}

#[cfg(test)]
pub(crate) mod fake;
