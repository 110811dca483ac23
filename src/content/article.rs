use std::hash::{Hash, Hasher};

use chrono::{DateTime, Datelike, Local};
use serde::{Deserialize, Serialize};

/// 未发布文章按年分组时使用的年份
pub const UNPUBLISHED_YEAR: i32 = 0;

/// 文章状态，对应数据库中的 `article_status` 枚举
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "article_status", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum ArticleStatus {
    #[default]
    Draft,
    Published,
}

/// 文章
///
/// 分类字段在读取时联表平铺；`tag_ids` 是文章到标签关系的唯一权威来源，
/// 标签到文章的反向关系由存储层派生。
///
/// 相等性与哈希只看 `id`，因此可以直接放进 [`HashSet`](std::collections::HashSet)。
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Article {
    pub id: i64,
    pub title: String,
    pub body: String,
    pub status: ArticleStatus,
    /// 首次发布时间，草稿为 `None`
    pub publish_time: Option<DateTime<Local>>,
    /// 每次保存都会刷新
    pub modify_time: DateTime<Local>,

    // 平铺字段
    pub category_id: i64,
    pub category_name: String,
    pub tag_ids: Vec<i64>,
}

impl Article {
    /// 发布年份，未发布时为 [`UNPUBLISHED_YEAR`]
    pub fn publish_year(&self) -> i32 {
        self.publish_time
            .map(|t| t.year())
            .unwrap_or(UNPUBLISHED_YEAR)
    }

    /// 是否发布于指定年月，`month` 取值 1–12
    pub fn published_in(&self, year: i32, month: u32) -> bool {
        self.publish_time
            .is_some_and(|t| t.year() == year && t.month() == month)
    }
}

impl PartialEq for Article {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Article {}

impl Hash for Article {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// 保存文章的请求
///
/// `id` 为空时新建，否则更新已有文章。发布时间和修改时间由服务层决定。
#[derive(Debug, Clone, Deserialize)]
pub struct NewArticle {
    #[serde(default)]
    pub id: Option<i64>,
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub status: ArticleStatus,
    pub category_id: i64,
    #[serde(default)]
    pub tag_ids: Vec<i64>,
}

/// 写入存储的文章记录，所有时间字段均已确定
#[derive(Debug, Clone)]
pub struct ArticleRecord {
    pub id: Option<i64>,
    pub title: String,
    pub body: String,
    pub status: ArticleStatus,
    pub publish_time: Option<DateTime<Local>>,
    pub modify_time: DateTime<Local>,
    pub category_id: i64,
    pub tag_ids: Vec<i64>,
}

/// 计算保存后的发布时间
///
/// 已有的发布时间永远保留；否则只有状态为 [`ArticleStatus::Published`] 时才记为 `now`。
pub fn resolve_publish_time(
    existing: Option<&Article>,
    status: ArticleStatus,
    now: DateTime<Local>,
) -> Option<DateTime<Local>> {
    match existing.and_then(|a| a.publish_time) {
        Some(published) => Some(published),
        None if status == ArticleStatus::Published => Some(now),
        None => None,
    }
}
