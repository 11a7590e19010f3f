use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use crate::external::Catalog;
use crate::models::{FilterState, MovieRecord};

/// 一次翻页/搜索请求的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchOutcome {
    /// 请求成功，结果已合并
    Fetched,
    /// 请求失败，结果按空处理
    Failed,
    /// 已有请求在进行中或没有更多页，未发请求
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageUpdate {
    pub outcome: FetchOutcome,
    pub records: Vec<MovieRecord>,
}

#[derive(Debug)]
struct PageState {
    current_page: u32,
    total_pages: u32,
    accumulated: Vec<MovieRecord>,
    /// 最近一次提交搜索所用的筛选条件，翻页沿用它
    committed: Option<FilterState>,
}

impl Default for PageState {
    fn default() -> Self {
        Self {
            current_page: 1,
            total_pages: 1,
            accumulated: Vec::new(),
            committed: None,
        }
    }
}

/// 请求进行中的标记；离开作用域时自动释放，失败路径也不例外
struct FetchGuard<'a>(&'a AtomicBool);

impl<'a> FetchGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for FetchGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// 分页与结果缓存：累积已加载的页面，窗口变化时直接重新渲染而不重新请求
pub struct ResultCache {
    catalog: Catalog,
    state: Mutex<PageState>,
    fetching: AtomicBool,
}

impl ResultCache {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            state: Mutex::new(PageState::default()),
            fetching: AtomicBool::new(false),
        }
    }

    fn lock(&self) -> MutexGuard<'_, PageState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn skipped(&self) -> PageUpdate {
        PageUpdate {
            outcome: FetchOutcome::Skipped,
            records: self.records(),
        }
    }

    /// 新搜索：回到第一页并丢弃已累积的结果
    pub async fn commit_search(&self, filters: &FilterState) -> PageUpdate {
        let Some(_guard) = FetchGuard::acquire(&self.fetching) else {
            tracing::debug!("Search ignored: a fetch is already in flight");
            return self.skipped();
        };

        {
            let mut state = self.lock();
            state.current_page = 1;
            state.accumulated.clear();
            state.committed = Some(filters.clone());
        }

        let query = filters.to_query(1);
        let page = self.catalog.discover_movies(&query).await;

        let mut state = self.lock();
        let outcome = match page {
            Some(page) => {
                state.total_pages = page.total_pages;
                state.accumulated = page.results;
                tracing::info!(
                    "Search committed: {} movies, {} pages",
                    state.accumulated.len(),
                    state.total_pages
                );
                FetchOutcome::Fetched
            }
            None => {
                // 失败的搜索没有可翻的页
                state.total_pages = 1;
                FetchOutcome::Failed
            }
        };

        PageUpdate {
            outcome,
            records: state.accumulated.clone(),
        }
    }

    /// 加载下一页并追加；请求进行中或已到最后一页时不做任何事
    pub async fn load_more(&self) -> PageUpdate {
        let Some(_guard) = FetchGuard::acquire(&self.fetching) else {
            tracing::debug!("Load more ignored: a fetch is already in flight");
            return self.skipped();
        };

        let (next_page, filters) = {
            let state = self.lock();
            match state.committed {
                Some(ref filters) if state.current_page < state.total_pages => {
                    (state.current_page + 1, filters.clone())
                }
                _ => {
                    return PageUpdate {
                        outcome: FetchOutcome::Skipped,
                        records: state.accumulated.clone(),
                    }
                }
            }
        };

        let query = filters.to_query(next_page);
        let page = self.catalog.discover_movies(&query).await;

        let mut state = self.lock();
        let outcome = match page {
            Some(page) => {
                state.current_page = next_page;
                state.total_pages = page.total_pages;
                state.accumulated.extend(page.results);
                tracing::debug!(
                    "Loaded page {}/{}, {} movies accumulated",
                    state.current_page,
                    state.total_pages,
                    state.accumulated.len()
                );
                FetchOutcome::Fetched
            }
            // 失败时不前进页码，下一次点击会重试同一页
            None => FetchOutcome::Failed,
        };

        PageUpdate {
            outcome,
            records: state.accumulated.clone(),
        }
    }

    pub fn has_more(&self) -> bool {
        let state = self.lock();
        state.current_page < state.total_pages
    }

    pub fn is_fetching(&self) -> bool {
        self.fetching.load(Ordering::Acquire)
    }

    pub fn current_page(&self) -> u32 {
        self.lock().current_page
    }

    pub fn total_pages(&self) -> u32 {
        self.lock().total_pages
    }

    pub fn records(&self) -> Vec<MovieRecord> {
        self.lock().accumulated.clone()
    }

    pub fn len(&self) -> usize {
        self.lock().accumulated.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().accumulated.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::fake::{page, FakeCatalog};
    use crate::external::FetchError;
    use std::sync::Arc;
    use std::time::Duration;

    fn cache(fake: Arc<FakeCatalog>) -> Arc<ResultCache> {
        Arc::new(ResultCache::new(Catalog::new(fake)))
    }

    #[tokio::test]
    async fn test_initial_state() {
        let cache = cache(Arc::new(FakeCatalog::new()));
        assert_eq!(cache.current_page(), 1);
        assert_eq!(cache.total_pages(), 1);
        assert!(!cache.has_more());
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_commit_then_load_more_appends() {
        let fake = Arc::new(
            FakeCatalog::new()
                .with_page(Ok(page(1, 3, 0..20)), 1)
                .with_page(Ok(page(2, 3, 20..40)), 2)
                .with_page(Ok(page(3, 3, 40..45)), 3),
        );
        let cache = cache(fake.clone());
        let filters = FilterState::default();

        let update = cache.commit_search(&filters).await;
        assert_eq!(update.outcome, FetchOutcome::Fetched);
        assert_eq!(update.records.len(), 20);
        assert!(cache.has_more());

        let update = cache.load_more().await;
        assert_eq!(update.outcome, FetchOutcome::Fetched);
        assert_eq!(cache.current_page(), 2);
        assert_eq!(update.records.len(), 40);

        let update = cache.load_more().await;
        assert_eq!(cache.current_page(), 3);
        assert_eq!(update.records.len(), 45);
        assert_eq!(update.records[44].id, 44);
        assert!(!cache.has_more());

        // 最后一页之后不再请求
        let update = cache.load_more().await;
        assert_eq!(update.outcome, FetchOutcome::Skipped);
        assert_eq!(update.records.len(), 45);
        assert_eq!(fake.discover_count(), 3);
    }

    #[tokio::test]
    async fn test_load_more_before_any_search_is_noop() {
        let fake = Arc::new(FakeCatalog::new());
        let cache = cache(fake.clone());
        assert_eq!(cache.load_more().await.outcome, FetchOutcome::Skipped);
        assert_eq!(fake.discover_count(), 0);
    }

    #[tokio::test]
    async fn test_new_search_resets_accumulated() {
        let fake = Arc::new(
            FakeCatalog::new()
                .with_page(Ok(page(1, 2, 0..20)), 1)
                .with_page(Ok(page(2, 2, 20..40)), 2),
        );
        let cache = cache(fake.clone());
        let filters = FilterState::default();

        cache.commit_search(&filters).await;
        cache.load_more().await;
        assert_eq!(cache.len(), 40);

        fake.set_page(1, Ok(page(1, 1, 100..103)));
        let update = cache.commit_search(&filters).await;
        assert_eq!(update.records.len(), 3);
        assert_eq!(cache.current_page(), 1);
        assert_eq!(cache.total_pages(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_requests_are_dropped() {
        let fake = Arc::new(
            FakeCatalog::new()
                .with_page(Ok(page(1, 5, 0..20)), 1)
                .with_page(Ok(page(2, 5, 20..40)), 2)
                .with_discover_delay(Duration::from_millis(200)),
        );
        let cache = cache(fake.clone());
        cache.commit_search(&FilterState::default()).await;

        let first = {
            let cache = cache.clone();
            tokio::spawn(async move { cache.load_more().await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(cache.is_fetching());

        let dropped = cache.load_more().await;
        assert_eq!(dropped.outcome, FetchOutcome::Skipped);
        let dropped = cache.commit_search(&FilterState::default()).await;
        assert_eq!(dropped.outcome, FetchOutcome::Skipped);

        let first = first.await.unwrap();
        assert_eq!(first.outcome, FetchOutcome::Fetched);
        assert_eq!(cache.current_page(), 2);
        assert_eq!(fake.discover_count(), 2);
        assert!(!cache.is_fetching());
    }

    #[tokio::test]
    async fn test_failed_load_more_keeps_page_and_releases_guard() {
        let fake = Arc::new(
            FakeCatalog::new()
                .with_page(Ok(page(1, 2, 0..20)), 1)
                .with_page(Err(FetchError::Network("reset".into())), 2),
        );
        let cache = cache(fake.clone());
        cache.commit_search(&FilterState::default()).await;

        let update = cache.load_more().await;
        assert_eq!(update.outcome, FetchOutcome::Failed);
        assert_eq!(update.records.len(), 20);
        assert_eq!(cache.current_page(), 1);
        assert!(!cache.is_fetching());

        fake.set_page(2, Ok(page(2, 2, 20..30)));
        let update = cache.load_more().await;
        assert_eq!(update.outcome, FetchOutcome::Fetched);
        assert_eq!(update.records.len(), 30);
    }

    #[tokio::test]
    async fn test_failed_search_yields_empty_results() {
        let fake = Arc::new(FakeCatalog::new().with_page(Err(FetchError::Http(401)), 1));
        let cache = cache(fake);
        let update = cache.commit_search(&FilterState::default()).await;
        assert_eq!(update.outcome, FetchOutcome::Failed);
        assert!(update.records.is_empty());
        assert!(!cache.is_fetching());
    }

    #[tokio::test]
    async fn test_failed_search_leaves_nothing_to_load() {
        let fake = Arc::new(FakeCatalog::new().with_page(Ok(page(1, 5, 0..20)), 1));
        let cache = cache(fake.clone());
        cache.commit_search(&FilterState::default()).await;
        assert_eq!(cache.total_pages(), 5);

        fake.set_page(1, Err(FetchError::Http(500)));
        fake.set_page(2, Ok(page(2, 5, 200..202)));
        let update = cache.commit_search(&FilterState::default()).await;
        assert_eq!(update.outcome, FetchOutcome::Failed);
        assert_eq!(cache.total_pages(), 1);
        assert!(!cache.has_more());

        let update = cache.load_more().await;
        assert_eq!(update.outcome, FetchOutcome::Skipped);
        assert!(update.records.is_empty());
        assert_eq!(fake.discover_count(), 2);
    }

    #[tokio::test]
    async fn test_load_more_uses_committed_filters() {
        let fake = Arc::new(
            FakeCatalog::new()
                .with_page(Ok(page(1, 2, 0..20)), 1)
                .with_page(Ok(page(2, 2, 20..40)), 2),
        );
        let cache = cache(fake.clone());
        let mut controls = crate::models::FilterControls::new();
        controls.toggle_genre(99);
        cache.commit_search(&controls.snapshot()).await;
        cache.load_more().await;

        let calls = fake.discover_calls.lock().unwrap();
        assert_eq!(calls[1].page, 2);
        assert_eq!(calls[1].genres, vec![99]);
    }
}
