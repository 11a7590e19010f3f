// 结果渲染
//
// 把累积的电影列表投影成卡片视图模型。每次都从完整列表重建，
// 相同的 (records, 布局) 输入总是得到相同的输出。

use serde::Serialize;

use crate::config::DiscoverConfig;
use crate::models::MovieRecord;

pub const PLACEHOLDER_POSTER: &str = "https://via.placeholder.com/500x750?text=No+Image";
pub const PLACEHOLDER_OVERVIEW: &str = "No overview available.";

/// 卡片布局
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CardLayout {
    /// 窄屏：横向卡片，带简介
    Compact,
    /// 宽屏：纵向卡片
    Expanded,
}

impl CardLayout {
    pub fn for_width(viewport_width: u32, compact_breakpoint: u32) -> Self {
        if viewport_width <= compact_breakpoint {
            CardLayout::Compact
        } else {
            CardLayout::Expanded
        }
    }
}

/// 评分颜色档位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RatingColor {
    Green,
    Yellow,
    Red,
}

impl RatingColor {
    pub fn for_vote_average(vote_average: f64) -> Self {
        if vote_average >= 7.0 {
            RatingColor::Green
        } else if vote_average >= 4.0 {
            RatingColor::Yellow
        } else {
            RatingColor::Red
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RatingColor::Green => "green",
            RatingColor::Yellow => "yellow",
            RatingColor::Red => "red",
        }
    }
}

pub fn rating_percent(vote_average: f64) -> u32 {
    (vote_average * 10.0).round().clamp(0.0, 100.0) as u32
}

pub fn format_release_date(date: Option<chrono::NaiveDate>) -> String {
    match date {
        Some(date) => date.format("%b %-d, %Y").to_string(),
        None => "N/A".to_string(),
    }
}

/// 超过 `limit` 个字符时截断并加省略号
pub fn truncate_overview(overview: Option<&str>, limit: usize) -> String {
    match overview {
        None => PLACEHOLDER_OVERVIEW.to_string(),
        Some(text) if text.chars().count() > limit => {
            let mut truncated: String = text.chars().take(limit).collect();
            truncated.push_str("...");
            truncated
        }
        Some(text) => text.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovieCard {
    pub id: u32,
    pub layout: CardLayout,
    pub title: String,
    pub poster_url: String,
    pub rating_percent: u32,
    pub rating_color: RatingColor,
    pub release_date: String,
    pub overview: String,
}

impl MovieCard {
    pub fn to_markup(&self) -> String {
        let mut html = String::new();
        let class = match self.layout {
            CardLayout::Compact => "movie-card horizontal",
            CardLayout::Expanded => "movie-card",
        };
        html.push_str(&format!(
            "<div class=\"{}\"><a href=\"#\"><img src=\"{}\" alt=\"{}\" loading=\"lazy\" /></a>\
             <div class=\"movie-info\">\
             <div class=\"rating-container {}\" style=\"--pct: {}%\"><div class=\"rating-inner\">{}<span>%</span></div></div>\
             <h3 class=\"movie-title\">{}</h3>\
             <p class=\"release-date\">{}</p>",
            class,
            escape_html(&self.poster_url),
            escape_html(&self.title),
            self.rating_color.as_str(),
            self.rating_percent,
            self.rating_percent,
            escape_html(&self.title),
            escape_html(&self.release_date),
        ));
        // 宽屏卡片不显示简介
        if self.layout == CardLayout::Compact {
            html.push_str(&format!("<p class=\"movie-overview\">{}</p>", escape_html(&self.overview)));
        }
        html.push_str("</div></div>");
        html
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultView {
    pub layout: CardLayout,
    pub cards: Vec<MovieCard>,
}

impl ResultView {
    pub fn empty(layout: CardLayout) -> Self {
        Self {
            layout,
            cards: Vec::new(),
        }
    }

    pub fn to_markup(&self) -> String {
        self.cards.iter().map(MovieCard::to_markup).collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResultRenderer {
    image_base_url: String,
    compact_breakpoint: u32,
    overview_limit: usize,
}

impl ResultRenderer {
    pub fn new(config: &DiscoverConfig) -> Self {
        Self {
            image_base_url: config.image_base_url.clone(),
            compact_breakpoint: config.compact_breakpoint,
            overview_limit: config.overview_limit,
        }
    }

    pub fn layout_for(&self, viewport_width: u32) -> CardLayout {
        CardLayout::for_width(viewport_width, self.compact_breakpoint)
    }

    /// 从完整的累积结果重建视图
    pub fn render(&self, records: &[MovieRecord], viewport_width: u32) -> ResultView {
        let layout = self.layout_for(viewport_width);
        ResultView {
            layout,
            cards: records.iter().map(|r| self.card(r, layout)).collect(),
        }
    }

    pub fn card(&self, record: &MovieRecord, layout: CardLayout) -> MovieCard {
        let poster_url = match record.poster_path {
            Some(ref path) => format!("{}{}", self.image_base_url, path),
            None => PLACEHOLDER_POSTER.to_string(),
        };

        MovieCard {
            id: record.id,
            layout,
            title: record.title.clone(),
            poster_url,
            rating_percent: rating_percent(record.vote_average),
            rating_color: RatingColor::for_vote_average(record.vote_average),
            release_date: format_release_date(record.release_date),
            overview: truncate_overview(record.overview.as_deref(), self.overview_limit),
        }
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn renderer() -> ResultRenderer {
        ResultRenderer::new(&DiscoverConfig::new("test"))
    }

    fn record(id: u32, vote_average: f64) -> MovieRecord {
        MovieRecord {
            id,
            title: format!("Title {}", id),
            overview: Some("Short overview.".to_string()),
            poster_path: Some(format!("/p{}.jpg", id)),
            release_date: NaiveDate::from_ymd_opt(2019, 4, 24),
            vote_average,
        }
    }

    #[test]
    fn test_rating_buckets_at_boundaries() {
        let renderer = renderer();
        let yellow = renderer.card(&record(1, 6.9), CardLayout::Expanded);
        assert_eq!(yellow.rating_color, RatingColor::Yellow);
        assert_eq!(yellow.rating_percent, 69);

        let green = renderer.card(&record(2, 7.0), CardLayout::Expanded);
        assert_eq!(green.rating_color, RatingColor::Green);
        assert_eq!(green.rating_percent, 70);

        assert_eq!(RatingColor::for_vote_average(4.0), RatingColor::Yellow);
        assert_eq!(RatingColor::for_vote_average(3.99), RatingColor::Red);
        assert_eq!(rating_percent(0.0), 0);
        assert_eq!(rating_percent(10.0), 100);
    }

    #[test]
    fn test_layout_breakpoint() {
        let renderer = renderer();
        assert_eq!(renderer.layout_for(768), CardLayout::Compact);
        assert_eq!(renderer.layout_for(769), CardLayout::Expanded);
        assert_eq!(renderer.layout_for(500), CardLayout::Compact);
        assert_eq!(renderer.layout_for(1024), CardLayout::Expanded);
    }

    #[test]
    fn test_render_is_pure() {
        let renderer = renderer();
        let records: Vec<_> = (0..10).map(|i| record(i, f64::from(i))).collect();

        let first = renderer.render(&records, 1024);
        let second = renderer.render(&records, 1024);
        assert_eq!(first, second);
        assert_eq!(first.to_markup(), second.to_markup());
    }

    #[test]
    fn test_width_changes_every_card_layout() {
        let renderer = renderer();
        let records: Vec<_> = (0..5).map(|i| record(i, 5.0)).collect();

        let narrow = renderer.render(&records, 500);
        let wide = renderer.render(&records, 1024);
        assert_eq!(narrow.cards.len(), wide.cards.len());
        for (n, w) in narrow.cards.iter().zip(wide.cards.iter()) {
            assert_eq!(n.layout, CardLayout::Compact);
            assert_eq!(w.layout, CardLayout::Expanded);
            assert_ne!(n.to_markup(), w.to_markup());
        }
    }

    #[test]
    fn test_missing_fields_use_placeholders() {
        let renderer = renderer();
        let bare = MovieRecord {
            id: 9,
            title: "Untitled".to_string(),
            overview: None,
            poster_path: None,
            release_date: None,
            vote_average: 0.0,
        };
        let card = renderer.card(&bare, CardLayout::Compact);
        assert_eq!(card.poster_url, PLACEHOLDER_POSTER);
        assert_eq!(card.overview, PLACEHOLDER_OVERVIEW);
        assert_eq!(card.release_date, "N/A");
        assert_eq!(card.rating_color, RatingColor::Red);
    }

    #[test]
    fn test_poster_url_and_date_format() {
        let card = renderer().card(&record(3, 8.0), CardLayout::Expanded);
        assert_eq!(card.poster_url, "https://image.tmdb.org/t/p/w500/p3.jpg");
        assert_eq!(card.release_date, "Apr 24, 2019");
        assert_eq!(format_release_date(NaiveDate::from_ymd_opt(1999, 12, 5)), "Dec 5, 1999");
    }

    #[test]
    fn test_overview_truncation() {
        let long = "a".repeat(151);
        let truncated = truncate_overview(Some(&long), 150);
        assert_eq!(truncated.len(), 153);
        assert!(truncated.ends_with("..."));

        let exact = "b".repeat(150);
        assert_eq!(truncate_overview(Some(&exact), 150), exact);

        // 按字符而不是字节截断
        let accented = "é".repeat(151);
        assert_eq!(truncate_overview(Some(&accented), 150).chars().count(), 153);
    }

    #[test]
    fn test_markup_shows_overview_only_when_compact() {
        let renderer = renderer();
        let r = record(4, 7.3);
        let compact = renderer.card(&r, CardLayout::Compact).to_markup();
        let expanded = renderer.card(&r, CardLayout::Expanded).to_markup();

        assert!(compact.contains("movie-card horizontal"));
        assert!(compact.contains("<p class=\"movie-overview\">Short overview.</p>"));
        assert!(!expanded.contains("movie-overview"));
        assert!(expanded.contains("rating-container green"));
        assert!(expanded.contains("73<span>%</span>"));
    }

    #[test]
    fn test_markup_escapes_text() {
        let mut r = record(5, 5.0);
        r.title = "Tom & Jerry <3".to_string();
        let html = renderer().card(&r, CardLayout::Expanded).to_markup();
        assert!(html.contains("Tom &amp; Jerry &lt;3"));
    }
}
