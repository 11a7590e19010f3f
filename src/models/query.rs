use chrono::NaiveDate;
use serde::Serialize;

use super::filter::{FilterState, ReleaseType, SortKey, ValueRange, RUNTIME_BOUNDS, SCORE_BOUNDS, VOTE_COUNT_BOUNDS};

/// 发现接口的查询参数
///
/// 只由 [`FilterState::to_query`] 构建；取值等于"不限"边界的维度为 `None`，
/// 不会出现在请求中。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogQuery {
    pub page: u32,
    pub sort_by: SortKey,
    pub genres: Vec<u32>,
    pub score_min: Option<u32>,
    pub score_max: Option<u32>,
    pub vote_count_min: Option<u32>,
    pub vote_count_max: Option<u32>,
    pub runtime_min: Option<u32>,
    pub runtime_max: Option<u32>,
    pub release_from: Option<NaiveDate>,
    pub release_to: Option<NaiveDate>,
    pub region: Option<String>,
    pub release_types: Vec<ReleaseType>,
    pub keywords: Vec<u32>,
}

fn lower_bound(range: ValueRange, noop: u32) -> Option<u32> {
    (range.min > noop).then_some(range.min)
}

fn upper_bound(range: ValueRange, noop: u32) -> Option<u32> {
    (range.max < noop).then_some(range.max)
}

fn join<T: ToString>(values: impl IntoIterator<Item = T>, sep: &str) -> String {
    values
        .into_iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(sep)
}

impl FilterState {
    /// 将筛选快照转换为某一页的查询
    pub fn to_query(&self, page: u32) -> CatalogQuery {
        let (release_from, release_to) = if self.search_all_releases {
            (None, None)
        } else {
            (self.release_window.from, self.release_window.to)
        };

        // 地区与上映类型一起出现：没有地区时上映类型没有意义
        let (region, release_types) = match (&self.region, self.search_all_countries) {
            (Some(code), false) => (Some(code.clone()), self.release_types.iter().copied().collect()),
            _ => (None, Vec::new()),
        };

        CatalogQuery {
            page: page.max(1),
            sort_by: self.sort,
            genres: self.genres.iter().copied().collect(),
            score_min: lower_bound(self.score, SCORE_BOUNDS.lower),
            score_max: upper_bound(self.score, SCORE_BOUNDS.upper),
            vote_count_min: lower_bound(self.vote_count, VOTE_COUNT_BOUNDS.lower),
            vote_count_max: upper_bound(self.vote_count, VOTE_COUNT_BOUNDS.upper),
            runtime_min: lower_bound(self.runtime, RUNTIME_BOUNDS.lower),
            runtime_max: upper_bound(self.runtime, RUNTIME_BOUNDS.upper),
            release_from,
            release_to,
            region,
            release_types,
            keywords: self.keywords.iter().map(|k| k.id).collect(),
        }
    }
}

impl CatalogQuery {
    /// 生成请求参数（顺序固定）
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("page", self.page.to_string()),
            ("sort_by", self.sort_by.as_str().to_string()),
        ];

        if !self.genres.is_empty() {
            params.push(("with_genres", join(&self.genres, ",")));
        }

        let bounds = [
            ("vote_average.gte", self.score_min),
            ("vote_average.lte", self.score_max),
            ("vote_count.gte", self.vote_count_min),
            ("vote_count.lte", self.vote_count_max),
            ("with_runtime.gte", self.runtime_min),
            ("with_runtime.lte", self.runtime_max),
        ];
        for (name, value) in bounds {
            if let Some(v) = value {
                params.push((name, v.to_string()));
            }
        }

        if let Some(from) = self.release_from {
            params.push(("primary_release_date.gte", from.format("%Y-%m-%d").to_string()));
        }
        if let Some(to) = self.release_to {
            params.push(("primary_release_date.lte", to.format("%Y-%m-%d").to_string()));
        }

        if let Some(ref region) = self.region {
            params.push(("region", region.clone()));
            if !self.release_types.is_empty() {
                params.push((
                    "with_release_type",
                    join(self.release_types.iter().map(|t| t.code()), "|"),
                ));
            }
        }

        if !self.keywords.is_empty() {
            params.push(("with_keywords", join(&self.keywords, ",")));
        }

        params
    }
}
