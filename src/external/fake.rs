// 测试用的内存目录实现

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use super::{CatalogApi, FetchError};
use crate::models::{CatalogQuery, Country, KeywordSuggestion, MovieRecord, ResultPage};

pub fn movie(id: u32, vote_average: f64) -> MovieRecord {
    MovieRecord {
        id,
        title: format!("Movie {}", id),
        overview: Some(format!("Overview of movie {}", id)),
        poster_path: Some(format!("/poster{}.jpg", id)),
        release_date: chrono::NaiveDate::from_ymd_opt(2001, 1, 1),
        vote_average,
    }
}

pub fn page(page: u32, total_pages: u32, ids: std::ops::Range<u32>) -> ResultPage {
    ResultPage {
        page,
        total_pages,
        results: ids.map(|id| movie(id, 7.5)).collect(),
    }
}

#[derive(Default)]
pub struct FakeCatalog {
    pages: Mutex<HashMap<u32, Result<ResultPage, FetchError>>>,
    countries: Mutex<Option<Result<Vec<Country>, FetchError>>>,
    keywords: Mutex<HashMap<String, Vec<KeywordSuggestion>>>,
    discover_delay: Mutex<Duration>,
    keyword_delay: Mutex<Duration>,
    pub discover_calls: Mutex<Vec<CatalogQuery>>,
    pub keyword_calls: Mutex<Vec<String>>,
    pub country_calls: AtomicUsize,
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(self, result: Result<ResultPage, FetchError>, page: u32) -> Self {
        self.pages.lock().unwrap().insert(page, result);
        self
    }

    pub fn with_countries(self, result: Result<Vec<Country>, FetchError>) -> Self {
        *self.countries.lock().unwrap() = Some(result);
        self
    }

    pub fn with_keywords(self, text: &str, keywords: Vec<KeywordSuggestion>) -> Self {
        self.keywords.lock().unwrap().insert(text.to_string(), keywords);
        self
    }

    pub fn with_discover_delay(self, delay: Duration) -> Self {
        *self.discover_delay.lock().unwrap() = delay;
        self
    }

    pub fn with_keyword_delay(self, delay: Duration) -> Self {
        *self.keyword_delay.lock().unwrap() = delay;
        self
    }

    pub fn set_page(&self, page: u32, result: Result<ResultPage, FetchError>) {
        self.pages.lock().unwrap().insert(page, result);
    }

    pub fn discover_count(&self) -> usize {
        self.discover_calls.lock().unwrap().len()
    }

    pub fn keyword_queries(&self) -> Vec<String> {
        self.keyword_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CatalogApi for FakeCatalog {
    async fn discover_movies(&self, query: &CatalogQuery) -> Result<ResultPage, FetchError> {
        self.discover_calls.lock().unwrap().push(query.clone());
        let delay = *self.discover_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.pages
            .lock()
            .unwrap()
            .get(&query.page)
            .cloned()
            .unwrap_or(Err(FetchError::Http(404)))
    }

    async fn list_countries(&self) -> Result<Vec<Country>, FetchError> {
        self.country_calls.fetch_add(1, Ordering::SeqCst);
        self.countries
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn search_keywords(&self, text: &str) -> Result<Vec<KeywordSuggestion>, FetchError> {
        self.keyword_calls.lock().unwrap().push(text.to_string());
        let delay = *self.keyword_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        Ok(self
            .keywords
            .lock()
            .unwrap()
            .get(text)
            .cloned()
            .unwrap_or_default())
    }
}
