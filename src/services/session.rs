// 发现会话
//
// 持有一次页面会话中的全部可变状态：筛选控件、变更检测、分页缓存、
// 关键词补全和视口。宿主页面只通过这里的入口操作状态。

use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;

use super::autocomplete::{AutocompleteView, KeywordAutocomplete};
use super::change_detector::{ChangeDetector, ControlPlacement, FilterStatus};
use super::pagination::{FetchOutcome, ResultCache};
use super::renderer::{ResultRenderer, ResultView};
use super::scheduler::Debouncer;
use crate::config::DiscoverConfig;
use crate::external::{Catalog, CatalogApi};
use crate::models::{FilterControls, FilterState, Keyword, SortKey, GENRES};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Activity {
    Idle,
    Searching,
    LoadingMore,
}

/// 下拉框/标签的一个选项
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

/// 宿主页面需要的全部展示数据
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionView {
    pub results: ResultView,
    pub has_more: bool,
    pub activity: Activity,
    pub search_label: &'static str,
    pub load_more_label: &'static str,
    pub status: FilterStatus,
    pub floating_action: bool,
    pub keywords: Vec<Keyword>,
    pub autocomplete: AutocompleteView,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub struct DiscoverSession {
    catalog: Catalog,
    filters: Mutex<FilterControls>,
    detector: Mutex<ChangeDetector>,
    results: Arc<ResultCache>,
    autocomplete: KeywordAutocomplete,
    renderer: Arc<ResultRenderer>,
    viewport_width: Arc<Mutex<u32>>,
    activity: Mutex<Activity>,
    resize_debouncer: Debouncer,
    view_tx: Arc<watch::Sender<ResultView>>,
}

impl DiscoverSession {
    pub fn new(config: &DiscoverConfig, api: Arc<dyn CatalogApi>) -> Self {
        let catalog = Catalog::new(api);
        let renderer = Arc::new(ResultRenderer::new(config));
        let (view_tx, _) = watch::channel(ResultView::empty(renderer.layout_for(config.viewport_width)));

        Self {
            results: Arc::new(ResultCache::new(catalog.clone())),
            autocomplete: KeywordAutocomplete::new(
                catalog.clone(),
                config.keyword_debounce,
                config.suggestion_limit,
            ),
            catalog,
            filters: Mutex::new(FilterControls::new()),
            detector: Mutex::new(ChangeDetector::new(ControlPlacement::new(
                0,
                0,
                config.viewport_height,
            ))),
            renderer,
            viewport_width: Arc::new(Mutex::new(config.viewport_width)),
            activity: Mutex::new(Activity::Idle),
            resize_debouncer: Debouncer::new(config.resize_debounce),
            view_tx: Arc::new(view_tx),
        }
    }

    /// 页面初始化：预取国家列表并执行第一次搜索
    pub async fn initialize(&self) -> SessionView {
        let countries = self.catalog.list_countries().await;
        tracing::info!("Session initialised with {} countries", countries.len());
        self.commit_search().await
    }

    /// 类型标签（初始化时填充）
    pub fn genre_options(&self) -> Vec<SelectOption> {
        let filters = lock(&self.filters);
        GENRES
            .iter()
            .map(|g| SelectOption {
                value: g.id.to_string(),
                label: g.name.to_string(),
                selected: filters.genres().contains(&g.id),
            })
            .collect()
    }

    /// 国家下拉框选项；列表为空时只给出提示项
    pub async fn country_options(&self) -> Vec<SelectOption> {
        let countries = self.catalog.list_countries().await;
        let current = lock(&self.filters).country().map(str::to_string);

        if countries.is_empty() {
            return vec![SelectOption {
                value: String::new(),
                label: "No countries available".to_string(),
                selected: true,
            }];
        }

        let mut options = vec![SelectOption {
            value: String::new(),
            label: "Select Country".to_string(),
            selected: current.is_none(),
        }];
        options.extend(countries.into_iter().map(|c| SelectOption {
            selected: current.as_deref() == Some(c.iso_3166_1.as_str()),
            label: c.label(),
            value: c.iso_3166_1,
        }));
        options
    }

    pub fn snapshot(&self) -> FilterState {
        lock(&self.filters).snapshot()
    }

    /// 修改筛选控件并重新做变更检测
    pub fn update_filters<R>(&self, update: impl FnOnce(&mut FilterControls) -> R) -> R {
        let (result, snapshot) = {
            let mut filters = lock(&self.filters);
            let result = update(&mut filters);
            (result, filters.snapshot())
        };
        lock(&self.detector).evaluate(&snapshot);
        result
    }

    pub fn toggle_genre(&self, genre_id: u32) -> bool {
        self.update_filters(|f| f.toggle_genre(genre_id))
    }

    pub fn set_sort(&self, sort: SortKey) {
        self.update_filters(|f| f.set_sort(sort));
    }

    pub fn remove_keyword(&self, keyword_id: u32) -> bool {
        self.update_filters(|f| f.remove_keyword(keyword_id))
    }

    pub fn on_keyword_input(&self, text: &str) {
        self.autocomplete.on_input(text);
    }

    /// 选中第 `index` 个候选并加入关键词
    pub fn select_suggestion(&self, index: usize) -> bool {
        match self.autocomplete.select(index) {
            Some(keyword) => self.update_filters(|f| f.add_keyword(keyword)),
            None => false,
        }
    }

    /// 回车键：列表可见时选中第一项
    pub fn keyword_enter(&self) -> bool {
        match self.autocomplete.select_first() {
            Some(keyword) => self.update_filters(|f| f.add_keyword(keyword)),
            None => false,
        }
    }

    pub fn dismiss_suggestions(&self) {
        self.autocomplete.dismiss();
    }

    /// 执行新搜索，完成后记录本次搜索所用筛选条件的指纹
    pub async fn commit_search(&self) -> SessionView {
        let snapshot = self.snapshot();
        let previous = self.begin(Activity::Searching);
        let update = self.results.commit_search(&snapshot).await;

        if update.outcome == FetchOutcome::Skipped {
            *lock(&self.activity) = previous;
        } else {
            *lock(&self.activity) = Activity::Idle;
            let live = self.snapshot();
            let mut detector = lock(&self.detector);
            detector.commit(&snapshot);
            // 请求期间又修改过筛选条件时仍然是 Dirty
            detector.evaluate(&live);
        }

        self.publish(&update.records);
        self.view()
    }

    /// 加载下一页并重新渲染全部结果
    pub async fn load_more(&self) -> SessionView {
        let previous = self.begin(Activity::LoadingMore);
        let update = self.results.load_more().await;

        *lock(&self.activity) = if update.outcome == FetchOutcome::Skipped {
            previous
        } else {
            Activity::Idle
        };

        if update.outcome == FetchOutcome::Fetched {
            self.publish(&update.records);
        }
        self.view()
    }

    fn begin(&self, activity: Activity) -> Activity {
        let mut current = lock(&self.activity);
        let previous = *current;
        if previous == Activity::Idle {
            *current = activity;
        }
        previous
    }

    /// 滚动：只重新计算悬浮按钮
    pub fn on_scroll(&self, placement: ControlPlacement) -> bool {
        lock(&self.detector).update_placement(placement)
    }

    /// 窗口尺寸变化：立即更新悬浮按钮，静默期后用已有结果重新渲染
    pub fn on_resize(&self, viewport_width: u32, placement: ControlPlacement) -> bool {
        let floating = self.on_scroll(placement);
        *lock(&self.viewport_width) = viewport_width;

        let results = self.results.clone();
        let renderer = self.renderer.clone();
        let width = self.viewport_width.clone();
        let view_tx = self.view_tx.clone();
        self.resize_debouncer.schedule(async move {
            let records = results.records();
            if records.is_empty() {
                return;
            }
            let width = *lock(&width);
            view_tx.send_replace(renderer.render(&records, width));
        });

        floating
    }

    fn publish(&self, records: &[crate::models::MovieRecord]) {
        let width = *lock(&self.viewport_width);
        self.view_tx.send_replace(self.renderer.render(records, width));
    }

    /// 订阅结果视图的更新（搜索、翻页、窗口变化）
    pub fn subscribe(&self) -> watch::Receiver<ResultView> {
        self.view_tx.subscribe()
    }

    pub fn render_now(&self) -> ResultView {
        let width = *lock(&self.viewport_width);
        self.renderer.render(&self.results.records(), width)
    }

    pub fn status(&self) -> FilterStatus {
        lock(&self.detector).status()
    }

    pub fn is_floating(&self) -> bool {
        lock(&self.detector).is_floating()
    }

    pub fn has_more(&self) -> bool {
        self.results.has_more()
    }

    pub fn current_page(&self) -> u32 {
        self.results.current_page()
    }

    pub fn total_pages(&self) -> u32 {
        self.results.total_pages()
    }

    pub fn view(&self) -> SessionView {
        let activity = *lock(&self.activity);
        let (status, floating_action) = {
            let detector = lock(&self.detector);
            (detector.status(), detector.is_floating())
        };

        SessionView {
            results: self.view_tx.borrow().clone(),
            has_more: self.results.has_more(),
            activity,
            search_label: if activity == Activity::Searching { "Searching..." } else { "Search" },
            load_more_label: if activity == Activity::LoadingMore { "Loading..." } else { "Load More" },
            status,
            floating_action,
            keywords: lock(&self.filters).keywords().to_vec(),
            autocomplete: self.autocomplete.view(),
        }
    }
}
