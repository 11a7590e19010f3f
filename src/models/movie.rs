use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::filter::Keyword;

/// 自动补全返回的关键词候选，被选中后原样加入筛选条件
pub type KeywordSuggestion = Keyword;

/// 结果卡片所需的电影信息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieRecord {
    pub id: u32,
    pub title: String,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub release_date: Option<NaiveDate>,
    pub vote_average: f64,
}

/// 一页发现结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultPage {
    pub page: u32,
    pub total_pages: u32,
    pub results: Vec<MovieRecord>,
}

/// 国家/地区（ISO 3166-1）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    pub iso_3166_1: String,
    pub english_name: String,
}

impl Country {
    /// 由国家代码拼出国旗 emoji（区域指示符号）
    pub fn flag(&self) -> String {
        self.iso_3166_1
            .to_ascii_uppercase()
            .chars()
            .filter(|c| c.is_ascii_uppercase())
            .filter_map(|c| char::from_u32(0x1F1E6 + (c as u32 - 'A' as u32)))
            .collect()
    }

    /// 下拉框中显示的文本
    pub fn label(&self) -> String {
        format!("{} {}", self.flag(), self.english_name)
    }
}
