use chrono::{DateTime, Local};
use serde::Serialize;

/// 分类，名称全局唯一
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

/// 标签，名称全局唯一
///
/// 标签下的文章集合不保存在这里，需要通过
/// [`Store::find_articles_by_tag`](crate::storage::Store::find_articles_by_tag) 派生。
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Tag {
    pub id: i64,
    pub name: String,
    pub create_time: DateTime<Local>,
    pub modify_time: DateTime<Local>,
}
