use chrono::NaiveDate;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeSet;

use super::validation::{DateValidator, NumberValidator, StringValidator, ValidationError};

/// 评分滑块边界
pub const SCORE_BOUNDS: RangeBounds = RangeBounds { lower: 0, upper: 10 };
/// 投票数滑块边界
pub const VOTE_COUNT_BOUNDS: RangeBounds = RangeBounds { lower: 0, upper: 500 };
/// 片长滑块边界（分钟）
pub const RUNTIME_BOUNDS: RangeBounds = RangeBounds { lower: 0, upper: 400 };

/// 排序方式，值即为 TMDB 的 sort_by 参数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortKey {
    #[default]
    #[serde(rename = "popularity.desc")]
    PopularityDesc,
    #[serde(rename = "popularity.asc")]
    PopularityAsc,
    #[serde(rename = "vote_average.desc")]
    VoteAverageDesc,
    #[serde(rename = "vote_average.asc")]
    VoteAverageAsc,
    #[serde(rename = "primary_release_date.desc")]
    ReleaseDateDesc,
    #[serde(rename = "primary_release_date.asc")]
    ReleaseDateAsc,
    #[serde(rename = "title.asc")]
    TitleAsc,
    #[serde(rename = "title.desc")]
    TitleDesc,
    #[serde(rename = "revenue.desc")]
    RevenueDesc,
    #[serde(rename = "revenue.asc")]
    RevenueAsc,
    #[serde(rename = "vote_count.desc")]
    VoteCountDesc,
    #[serde(rename = "vote_count.asc")]
    VoteCountAsc,
}

impl SortKey {
    pub const ALL: [SortKey; 12] = [
        SortKey::PopularityDesc,
        SortKey::PopularityAsc,
        SortKey::VoteAverageDesc,
        SortKey::VoteAverageAsc,
        SortKey::ReleaseDateDesc,
        SortKey::ReleaseDateAsc,
        SortKey::TitleAsc,
        SortKey::TitleDesc,
        SortKey::RevenueDesc,
        SortKey::RevenueAsc,
        SortKey::VoteCountDesc,
        SortKey::VoteCountAsc,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::PopularityDesc => "popularity.desc",
            SortKey::PopularityAsc => "popularity.asc",
            SortKey::VoteAverageDesc => "vote_average.desc",
            SortKey::VoteAverageAsc => "vote_average.asc",
            SortKey::ReleaseDateDesc => "primary_release_date.desc",
            SortKey::ReleaseDateAsc => "primary_release_date.asc",
            SortKey::TitleAsc => "title.asc",
            SortKey::TitleDesc => "title.desc",
            SortKey::RevenueDesc => "revenue.desc",
            SortKey::RevenueAsc => "revenue.asc",
            SortKey::VoteCountDesc => "vote_count.desc",
            SortKey::VoteCountAsc => "vote_count.asc",
        }
    }

    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        Self::ALL
            .iter()
            .copied()
            .find(|key| key.as_str() == s.trim())
            .ok_or_else(|| ValidationError::UnknownSortKey(s.to_string()))
    }
}

/// TMDB 上映类型（with_release_type），仅在指定地区时有意义
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReleaseType {
    Premiere,
    TheatricalLimited,
    Theatrical,
    Digital,
    Physical,
    Tv,
}

impl ReleaseType {
    pub fn code(&self) -> u8 {
        match self {
            ReleaseType::Premiere => 1,
            ReleaseType::TheatricalLimited => 2,
            ReleaseType::Theatrical => 3,
            ReleaseType::Digital => 4,
            ReleaseType::Physical => 5,
            ReleaseType::Tv => 6,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(ReleaseType::Premiere),
            2 => Some(ReleaseType::TheatricalLimited),
            3 => Some(ReleaseType::Theatrical),
            4 => Some(ReleaseType::Digital),
            5 => Some(ReleaseType::Physical),
            6 => Some(ReleaseType::Tv),
            _ => None,
        }
    }

    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        s.trim()
            .parse::<u8>()
            .ok()
            .and_then(Self::from_code)
            .ok_or_else(|| ValidationError::UnknownReleaseType(s.to_string()))
    }
}

/// 滑块的固定边界
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeBounds {
    pub lower: u32,
    pub upper: u32,
}

/// 已选中的区间值
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: u32,
    pub max: u32,
}

/// 滑块轨道的填充区间（百分比）
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrackFill {
    pub min_percent: f64,
    pub max_percent: f64,
}

/// 双端滑块：最小值不能超过最大值，反之亦然
#[derive(Debug, Clone, PartialEq)]
pub struct DualRange {
    bounds: RangeBounds,
    min: u32,
    max: u32,
}

impl DualRange {
    pub fn new(bounds: RangeBounds) -> Self {
        Self {
            bounds,
            min: bounds.lower,
            max: bounds.upper,
        }
    }

    pub fn bounds(&self) -> RangeBounds {
        self.bounds
    }

    pub fn value(&self) -> ValueRange {
        ValueRange {
            min: self.min,
            max: self.max,
        }
    }

    /// 设置最小值；超过当前最大值时被压回最大值
    pub fn set_min(&mut self, value: u32) {
        let value = value.clamp(self.bounds.lower, self.bounds.upper);
        self.min = value.min(self.max);
    }

    /// 设置最大值；低于当前最小值时被抬到最小值
    pub fn set_max(&mut self, value: u32) {
        let value = value.clamp(self.bounds.lower, self.bounds.upper);
        self.max = value.max(self.min);
    }

    /// 同时设置两端；先移动会越过另一端的那一侧，避免被对方压回
    pub fn set(&mut self, min: u32, max: u32) -> Result<(), ValidationError> {
        if min > max {
            return Err(ValidationError::InvertedRange { min, max });
        }
        if min > self.max {
            self.set_max(max);
            self.set_min(min);
        } else {
            self.set_min(min);
            self.set_max(max);
        }
        Ok(())
    }

    pub fn set_input(&mut self, min: &str, max: &str) -> Result<(), ValidationError> {
        let min = NumberValidator::parse_bounded(min, self.bounds.lower, self.bounds.upper)?;
        let max = NumberValidator::parse_bounded(max, self.bounds.lower, self.bounds.upper)?;
        self.set(min, max)
    }

    pub fn set_min_input(&mut self, input: &str) -> Result<(), ValidationError> {
        let value = NumberValidator::parse_bounded(input, self.bounds.lower, self.bounds.upper)?;
        self.set_min(value);
        Ok(())
    }

    pub fn set_max_input(&mut self, input: &str) -> Result<(), ValidationError> {
        let value = NumberValidator::parse_bounded(input, self.bounds.lower, self.bounds.upper)?;
        self.set_max(value);
        Ok(())
    }

    pub fn track_fill(&self) -> TrackFill {
        let span = f64::from(self.bounds.upper - self.bounds.lower);
        let percent = |v: u32| f64::from(v - self.bounds.lower) / span * 100.0;
        TrackFill {
            min_percent: percent(self.min),
            max_percent: percent(self.max),
        }
    }
}

/// 关键词（以 id 作为身份）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Keyword {
    pub id: u32,
    pub name: String,
}

/// 上映日期窗口
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseWindow {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

/// 筛选条件快照
///
/// 所有集合字段都是有序的，因此相同的筛选条件无论以何种顺序点选，
/// 得到的指纹都相同。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterState {
    pub sort: SortKey,
    pub score: ValueRange,
    pub vote_count: ValueRange,
    pub runtime: ValueRange,
    pub search_all_releases: bool,
    pub release_window: ReleaseWindow,
    pub search_all_countries: bool,
    pub region: Option<String>,
    pub release_types: BTreeSet<ReleaseType>,
    pub genres: BTreeSet<u32>,
    #[serde(serialize_with = "keyword_ids")]
    pub keywords: Vec<Keyword>,
}

fn keyword_ids<S: Serializer>(keywords: &[Keyword], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(keywords.iter().map(|k| k.id))
}

impl FilterState {
    /// 规范化序列化结果，用作变更检测的指纹
    pub fn fingerprint(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

impl Default for FilterState {
    fn default() -> Self {
        FilterControls::default().snapshot()
    }
}

/// 筛选面板中各控件的当前值
///
/// 多选项按用户点选的顺序保存，排序只在生成快照时进行。
#[derive(Debug, Clone)]
pub struct FilterControls {
    sort: SortKey,
    score: DualRange,
    vote_count: DualRange,
    runtime: DualRange,
    search_all_releases: bool,
    release_from: Option<NaiveDate>,
    release_to: Option<NaiveDate>,
    search_all_countries: bool,
    country: Option<String>,
    release_types: Vec<ReleaseType>,
    genres: Vec<u32>,
    keywords: Vec<Keyword>,
}

impl Default for FilterControls {
    fn default() -> Self {
        Self {
            sort: SortKey::default(),
            score: DualRange::new(SCORE_BOUNDS),
            vote_count: DualRange::new(VOTE_COUNT_BOUNDS),
            runtime: DualRange::new(RUNTIME_BOUNDS),
            search_all_releases: true,
            release_from: None,
            release_to: None,
            search_all_countries: true,
            country: None,
            release_types: Vec::new(),
            genres: Vec::new(),
            keywords: Vec::new(),
        }
    }
}

impl FilterControls {
    pub fn new() -> Self {
        Self::default()
    }

    /// 读取所有控件，生成规范化快照
    pub fn snapshot(&self) -> FilterState {
        let mut keywords = self.keywords.clone();
        keywords.sort_by_key(|k| k.id);

        FilterState {
            sort: self.sort,
            score: self.score.value(),
            vote_count: self.vote_count.value(),
            runtime: self.runtime.value(),
            search_all_releases: self.search_all_releases,
            release_window: ReleaseWindow {
                from: self.release_from,
                to: self.release_to,
            },
            search_all_countries: self.search_all_countries,
            region: self.country.clone(),
            release_types: self.release_types.iter().copied().collect(),
            genres: self.genres.iter().copied().collect(),
            keywords,
        }
    }

    pub fn sort(&self) -> SortKey {
        self.sort
    }

    pub fn set_sort(&mut self, sort: SortKey) {
        self.sort = sort;
    }

    pub fn score(&self) -> &DualRange {
        &self.score
    }

    pub fn score_mut(&mut self) -> &mut DualRange {
        &mut self.score
    }

    pub fn vote_count(&self) -> &DualRange {
        &self.vote_count
    }

    pub fn vote_count_mut(&mut self) -> &mut DualRange {
        &mut self.vote_count
    }

    pub fn runtime(&self) -> &DualRange {
        &self.runtime
    }

    pub fn runtime_mut(&mut self) -> &mut DualRange {
        &mut self.runtime
    }

    pub fn search_all_releases(&self) -> bool {
        self.search_all_releases
    }

    /// 勾选"全部上映日期"时会清空日期输入
    pub fn set_search_all_releases(&mut self, enabled: bool) {
        self.search_all_releases = enabled;
        if enabled {
            self.release_from = None;
            self.release_to = None;
        }
    }

    /// 勾选"全部上映日期"时日期输入处于禁用状态，设置被忽略
    pub fn set_release_from(&mut self, date: Option<NaiveDate>) {
        if !self.search_all_releases {
            self.release_from = date;
        }
    }

    pub fn set_release_to(&mut self, date: Option<NaiveDate>) {
        if !self.search_all_releases {
            self.release_to = date;
        }
    }

    pub fn set_release_from_input(&mut self, input: &str) -> Result<(), ValidationError> {
        let date = DateValidator::parse_optional(input)?;
        self.set_release_from(date);
        Ok(())
    }

    pub fn set_release_to_input(&mut self, input: &str) -> Result<(), ValidationError> {
        let date = DateValidator::parse_optional(input)?;
        self.set_release_to(date);
        Ok(())
    }

    pub fn search_all_countries(&self) -> bool {
        self.search_all_countries
    }

    pub fn set_search_all_countries(&mut self, enabled: bool) {
        self.search_all_countries = enabled;
    }

    pub fn country(&self) -> Option<&str> {
        self.country.as_deref()
    }

    pub fn set_country_input(&mut self, code: &str) -> Result<(), ValidationError> {
        self.country = StringValidator::normalize_country_code(code)?;
        Ok(())
    }

    /// 切换上映类型，返回切换后是否选中
    pub fn toggle_release_type(&mut self, release_type: ReleaseType) -> bool {
        if let Some(pos) = self.release_types.iter().position(|t| *t == release_type) {
            self.release_types.remove(pos);
            false
        } else {
            self.release_types.push(release_type);
            true
        }
    }

    pub fn genres(&self) -> &[u32] {
        &self.genres
    }

    /// 切换类型标签，返回切换后是否选中
    pub fn toggle_genre(&mut self, genre_id: u32) -> bool {
        if self.genres.contains(&genre_id) {
            self.genres.retain(|id| *id != genre_id);
            false
        } else {
            self.genres.push(genre_id);
            true
        }
    }

    pub fn keywords(&self) -> &[Keyword] {
        &self.keywords
    }

    /// 添加关键词；id 已存在时不做任何事并返回 false
    pub fn add_keyword(&mut self, keyword: Keyword) -> bool {
        if self.keywords.iter().any(|k| k.id == keyword.id) {
            return false;
        }
        self.keywords.push(keyword);
        true
    }

    pub fn remove_keyword(&mut self, keyword_id: u32) -> bool {
        let before = self.keywords.len();
        self.keywords.retain(|k| k.id != keyword_id);
        self.keywords.len() != before
    }
}
