use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use super::scheduler::Debouncer;
use crate::external::{Catalog, MIN_KEYWORD_QUERY_LEN};
use crate::models::KeywordSuggestion;

/// 关键词输入框与候选列表的展示数据
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AutocompleteView {
    pub input: String,
    pub suggestions: Vec<KeywordSuggestion>,
    pub visible: bool,
}

#[derive(Debug, Default)]
struct AutocompleteState {
    input: String,
    suggestions: Vec<KeywordSuggestion>,
    /// 每次输入变化递增，只有与最新一次调度匹配的响应才会被采用
    generation: u64,
}

fn lock(state: &Mutex<AutocompleteState>) -> MutexGuard<'_, AutocompleteState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// 关键词自动补全：输入防抖、候选列表和选择
pub struct KeywordAutocomplete {
    catalog: Catalog,
    state: Arc<Mutex<AutocompleteState>>,
    debouncer: Debouncer,
    limit: usize,
}

impl KeywordAutocomplete {
    pub fn new(catalog: Catalog, debounce: Duration, limit: usize) -> Self {
        Self {
            catalog,
            state: Arc::new(Mutex::new(AutocompleteState::default())),
            debouncer: Debouncer::new(debounce),
            limit,
        }
    }

    /// 输入变化：取消未发出的查询，静默期后再查
    pub fn on_input(&self, text: &str) {
        let query = text.trim().to_string();
        let generation = {
            let mut state = lock(&self.state);
            state.input = text.to_string();
            state.generation += 1;
            state.generation
        };

        if query.chars().count() < MIN_KEYWORD_QUERY_LEN {
            self.debouncer.cancel();
            lock(&self.state).suggestions.clear();
            return;
        }

        let catalog = self.catalog.clone();
        let state = self.state.clone();
        let limit = self.limit;

        self.debouncer.schedule(async move {
            let results = catalog.search_keywords(&query).await;

            let mut state = lock(&state);
            if state.generation != generation {
                tracing::debug!("Discarding stale keyword suggestions for {:?}", query);
                return;
            }
            state.suggestions = results.into_iter().take(limit).collect();
        });
    }

    pub fn is_visible(&self) -> bool {
        !lock(&self.state).suggestions.is_empty()
    }

    pub fn suggestions(&self) -> Vec<KeywordSuggestion> {
        lock(&self.state).suggestions.clone()
    }

    pub fn input(&self) -> String {
        lock(&self.state).input.clone()
    }

    pub fn view(&self) -> AutocompleteView {
        let state = lock(&self.state);
        AutocompleteView {
            input: state.input.clone(),
            suggestions: state.suggestions.clone(),
            visible: !state.suggestions.is_empty(),
        }
    }

    /// 选中候选：清空输入并关闭列表，正在进行的查询结果将被丢弃
    pub fn select(&self, index: usize) -> Option<KeywordSuggestion> {
        let selected = {
            let mut state = lock(&self.state);
            let selected = state.suggestions.get(index).cloned()?;
            state.input.clear();
            state.suggestions.clear();
            state.generation += 1;
            selected
        };
        self.debouncer.cancel();
        Some(selected)
    }

    /// 回车：列表可见时选中第一项
    pub fn select_first(&self) -> Option<KeywordSuggestion> {
        self.select(0)
    }

    /// 点击输入框和列表以外的区域
    pub fn dismiss(&self) {
        lock(&self.state).suggestions.clear();
    }
}
