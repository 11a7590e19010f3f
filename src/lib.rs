// 电影发现库
//
// 本库提供电影发现界面的核心逻辑，包括：
// - 远程目录（TMDB）客户端
// - 筛选条件模型与查询构建
// - 变更检测与悬浮搜索按钮
// - 关键词自动补全
// - 分页与结果缓存
// - 结果卡片渲染

pub mod config;
pub mod external;
pub mod models;
pub mod services;

pub use config::{ConfigError, DiscoverConfig};
pub use external::{Catalog, CatalogApi, FetchError, TmdbClient};
pub use services::DiscoverSession;
